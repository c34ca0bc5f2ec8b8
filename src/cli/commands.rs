//! CLI commands implementation.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use console::style;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::{self, Settings};
use crate::export;
use crate::loader;
use crate::models::ScheduleRecord;
use crate::ocr::{self, OcrBackend, TesseractBackend};
use crate::pipeline::{ExtractionOutcome, ExtractionPipeline, PipelineError, PipelineEvent};

use super::progress::PipelineProgress;

#[derive(Parser)]
#[command(name = "frotascan")]
#[command(about = "Fleet schedule extraction from scheduling screenshots")]
#[command(version)]
pub struct Cli {
    /// Settings file (defaults to frotascan.toml in the user config dir)
    #[arg(long, global = true, env = "FROTASCAN_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Extract schedule records from one or more screenshots
    Extract(ExtractArgs),

    /// Validate an image and print its preview data URL
    Inspect {
        /// Image file to inspect
        image: PathBuf,
    },

    /// Check OCR backend availability
    Check,

    /// Print the resolved configuration
    Config,
}

#[derive(Args)]
struct ExtractArgs {
    /// Image files to process
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Copy the records to the system clipboard as TSV
    #[arg(long)]
    copy: bool,

    /// Write an XLSX spreadsheet (a directory gets a dated file name)
    #[arg(long, value_name = "PATH")]
    xlsx: Option<PathBuf>,

    /// Write a TSV file
    #[arg(long, value_name = "PATH")]
    tsv: Option<PathBuf>,

    /// Stdout format (table, json, tsv)
    #[arg(short, long, default_value = "table")]
    format: String,

    /// OCR backend (tesseract, ocrs)
    #[arg(short, long)]
    backend: Option<String>,

    /// OCR language hint (Tesseract language code)
    #[arg(short, long)]
    lang: Option<String>,

    /// Force index-based pairing even when line layout is available
    #[arg(long)]
    positional: bool,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (settings, config_source) = config::load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract(args) => cmd_extract(&settings, args).await,
        Commands::Inspect { image } => cmd_inspect(&image).await,
        Commands::Check => cmd_check(&settings).await,
        Commands::Config => cmd_config(&settings, config_source.as_deref()).await,
    }
}

async fn cmd_extract(settings: &Settings, args: ExtractArgs) -> anyhow::Result<()> {
    if !matches!(args.format.as_str(), "table" | "json" | "tsv") {
        anyhow::bail!("unknown format '{}' (expected table, json or tsv)", args.format);
    }

    let mut ocr_config = settings.ocr_config();
    if let Some(lang) = &args.lang {
        ocr_config.language = lang.clone();
    }
    let backend_name = args
        .backend
        .as_deref()
        .unwrap_or(&settings.ocr.backend)
        .to_string();
    let backend = ocr::backend_for(&backend_name, ocr_config)?;
    if !backend.is_available() {
        anyhow::bail!("{}", backend.availability_hint());
    }

    let pipeline = ExtractionPipeline::new(backend).force_positional(args.positional);
    let cancel = CancellationToken::new();

    let mut records: Vec<ScheduleRecord> = Vec::new();
    let mut failures = 0usize;

    for image in &args.images {
        let (event_tx, mut event_rx) = mpsc::channel::<PipelineEvent>(32);

        let progress = if args.no_progress {
            PipelineProgress::hidden()
        } else {
            PipelineProgress::new(&image.display().to_string())
        };
        let display = tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                progress.update(&event);
            }
            progress
        });

        let result = tokio::select! {
            result = pipeline.run(image, event_tx, cancel.child_token()) => result,
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
                Err(PipelineError::Cancelled)
            }
        };

        if let Ok(progress) = display.await {
            progress.finish();
        }

        match result {
            Ok(outcome) => {
                if args.format == "table" {
                    render_table(settings, &outcome);
                }
                records.extend(outcome.pairing.records);
            }
            Err(PipelineError::Cancelled) => {
                println!(
                    "{} cancelled, discarding in-flight recognition",
                    style("!").yellow()
                );
                break;
            }
            Err(e) => {
                // One bad image ends its own run only; earlier records stay.
                failures += 1;
                println!("{} {}: {}", style("✗").red(), image.display(), e);
            }
        }
    }

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&records)?),
        "tsv" => println!("{}", export::to_tsv(&records)),
        _ => {}
    }

    let mut export_failures = 0usize;
    if args.copy || args.xlsx.is_some() || args.tsv.is_some() {
        if records.is_empty() {
            println!("{} no records to export", style("!").yellow());
        } else {
            export_failures = run_exports(settings, &args, &records);
        }
    }

    if failures > 0 || export_failures > 0 {
        anyhow::bail!(
            "{} of {} image(s) failed, {} export(s) failed",
            failures,
            args.images.len(),
            export_failures
        );
    }
    Ok(())
}

/// Run the requested export sinks; every failure is reported and the
/// in-memory records stay untouched.
fn run_exports(settings: &Settings, args: &ExtractArgs, records: &[ScheduleRecord]) -> usize {
    let mut failed = 0usize;

    if args.copy {
        match export::copy_to_clipboard(records) {
            Ok(()) => println!(
                "{} copied {} record(s) to the clipboard",
                style("✓").green(),
                records.len()
            ),
            Err(e) => {
                failed += 1;
                println!("{} {}", style("✗").red(), e);
            }
        }
    }

    if let Some(path) = &args.xlsx {
        let path = resolve_xlsx_path(path.clone());
        match export::write_xlsx(&path, records, &settings.sheet_options()) {
            Ok(()) => println!(
                "{} wrote {} record(s) to {}",
                style("✓").green(),
                records.len(),
                path.display()
            ),
            Err(e) => {
                failed += 1;
                println!("{} {}", style("✗").red(), e);
            }
        }
    }

    if let Some(path) = &args.tsv {
        match export::write_tsv(path, records) {
            Ok(()) => println!(
                "{} wrote {} record(s) to {}",
                style("✓").green(),
                records.len(),
                path.display()
            ),
            Err(e) => {
                failed += 1;
                println!("{} {}", style("✗").red(), e);
            }
        }
    }

    failed
}

/// A directory target gets a dated default file name.
fn resolve_xlsx_path(path: PathBuf) -> PathBuf {
    if path.is_dir() {
        let name = format!("frota_{}.xlsx", chrono::Local::now().format("%Y-%m-%d"));
        path.join(name)
    } else {
        path
    }
}

fn render_table(settings: &Settings, outcome: &ExtractionOutcome) {
    let pairing = &outcome.pairing;

    println!("\n{}", style(outcome.image.path.display()).bold());
    println!("{}", "-".repeat(24));
    println!(
        "{:<12} {:<8}",
        settings.export.time_column, settings.export.fleet_column
    );
    println!("{}", "-".repeat(24));
    for record in &pairing.records {
        println!("{:<12} {:<8}", record.time, record.fleet_id);
    }
    println!("{}", "-".repeat(24));

    println!(
        "{} {} record(s) via {} pairing ({} time / {} fleet-id token(s))",
        style("✓").green(),
        pairing.records.len(),
        pairing.strategy.as_str(),
        outcome.fields.times.len(),
        outcome.fields.fleet_ids.len()
    );
    if pairing.dropped() > 0 {
        println!(
            "  {} dropped {} time token(s) and {} fleet-id token(s) without a counterpart",
            style("!").yellow(),
            pairing.dropped_times,
            pairing.dropped_ids
        );
    }
    if let Some(confidence) = outcome.recognition.confidence {
        println!(
            "  {} mean OCR confidence {:.0}%",
            style("→").dim(),
            confidence * 100.0
        );
    }
}

async fn cmd_inspect(image: &Path) -> anyhow::Result<()> {
    let loaded = loader::load_image(image)?;

    println!("{} {}", style("✓").green(), image.display());
    println!("{:<10} {}", "MIME:", loaded.mime);
    println!("{:<10} {}", "Size:", format_bytes(loaded.bytes.len() as u64));
    println!("{:<10} {}", "Preview:", loaded.preview_data_url());

    Ok(())
}

async fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    println!("\n{}", style("OCR Backend Status").bold());
    println!("{}", "-".repeat(50));

    let tesseract = TesseractBackend::with_config(settings.ocr_config());
    let status = if tesseract.is_available() {
        style("✓ available").green()
    } else {
        style("✗ not available").red()
    };
    println!("  {:<12} {}", "Tesseract", status);
    println!("               {}", style(tesseract.availability_hint()).dim());

    #[cfg(feature = "ocr-ocrs")]
    {
        use crate::ocr::OcrsBackend;
        let ocrs = OcrsBackend::with_config(settings.ocr_config());
        let status = if ocrs.is_available() {
            style("✓ available").green()
        } else {
            style("○ models will auto-download").yellow()
        };
        println!("  {:<12} {}", "OCRS", status);
        println!("               {}", style(ocrs.availability_hint()).dim());
    }
    #[cfg(not(feature = "ocr-ocrs"))]
    {
        println!(
            "  {:<12} {}",
            "OCRS",
            style("not compiled (enable ocr-ocrs feature)").dim()
        );
    }

    Ok(())
}

async fn cmd_config(settings: &Settings, source: Option<&Path>) -> anyhow::Result<()> {
    match source {
        Some(path) => println!("{} settings from {}", style("→").cyan(), path.display()),
        None => println!(
            "{} built-in defaults (no settings file found)",
            style("→").cyan()
        ),
    }
    print!("\n{}", toml::to_string_pretty(settings)?);
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_000_000 {
        format!("{:.2} MB", bytes as f64 / 1_000_000.0)
    } else if bytes >= 1_000 {
        format!("{:.2} KB", bytes as f64 / 1_000.0)
    } else {
        format!("{} bytes", bytes)
    }
}
