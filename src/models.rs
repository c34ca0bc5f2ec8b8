//! Core record types shared across the pipeline.

use serde::{Deserialize, Serialize};

/// One paired schedule row: a time of day and the fleet unit assigned to it.
///
/// Immutable once built by the pairer; held in memory for the lifetime of a
/// single extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRecord {
    /// Time of day as recognized, `H:MM`, `HH:MM` or with `:SS` seconds.
    pub time: String,
    /// Fleet unit identifier, a 4-5 digit numeral.
    pub fleet_id: String,
}

impl ScheduleRecord {
    pub fn new(time: impl Into<String>, fleet_id: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            fleet_id: fleet_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_field_names() {
        let record = ScheduleRecord::new("13:00:00", "40167");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"time":"13:00:00","fleetId":"40167"}"#);
    }
}
