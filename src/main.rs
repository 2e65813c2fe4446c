use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Import from our modularized library
use email_validator_rs::prelude::*;
use email_validator_rs::reporting::report_writer::SUMMARY_FILE_NAME;

#[derive(Parser)]
#[command(name = "email_validator_rs")]
#[command(about = "Deduplicate and validate email addresses across spreadsheets", long_about = None)]
struct Cli {
    /// Input files, in precedence order (default: every spreadsheet in --dir)
    files: Vec<PathBuf>,

    /// Directory scanned for input spreadsheets when no files are given
    #[arg(short, long, default_value = "tabs", env = "EMAIL_VALIDATOR_DIR")]
    dir: PathBuf,

    /// Scan --dir recursively
    #[arg(short, long)]
    recursive: bool,

    /// Consolidated Email/Status table (.xlsx, .csv or .json)
    #[arg(short, long, default_value = SUMMARY_FILE_NAME, env = "EMAIL_VALIDATOR_OUTPUT")]
    output: PathBuf,

    /// Also write a plain-text report
    #[arg(long)]
    report: Option<PathBuf>,

    /// External verifier command; called with the address appended, exit 0 = valid, 1 = invalid
    #[arg(long, env = "EMAIL_VALIDATOR_VERIFY_CMD")]
    verify_cmd: Option<String>,

    /// Disable the pause between batches of checks
    #[arg(long)]
    no_pause: bool,

    /// Pause after every N checks
    #[arg(long, default_value_t = 10)]
    pause_every: usize,

    /// Shortest pause in seconds
    #[arg(long, default_value_t = 1.0)]
    min_pause: f64,

    /// Longest pause in seconds
    #[arg(long, default_value_t = 3.0)]
    max_pause: f64,

    /// Run in batch mode (no progress bar)
    #[arg(long)]
    batch: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn pause_duration(secs: f64, flag: &str) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).with_context(|| format!("Invalid value for {flag}: {secs}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "email_validator_rs=debug"
    } else {
        "email_validator_rs=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Set up graceful shutdown handler
    let shutdown_requested = Arc::new(AtomicBool::new(false));
    let shutdown_flag = shutdown_requested.clone();

    ctrlc::set_handler(move || {
        eprintln!("\n⚠️  Shutdown requested. Finishing current address...");
        shutdown_flag.store(true, Ordering::SeqCst);
    })
    .context("Error setting Ctrl-C handler")?;

    let verifier: Box<dyn Verifier> = match cli.verify_cmd.as_deref() {
        Some(command) => match CommandVerifier::from_command_line(command) {
            Some(v) => Box::new(v),
            None => bail!("--verify-cmd must name a program"),
        },
        None => Box::new(SyntaxVerifier),
    };

    println!("Email Validator (Rust Edition)");
    println!();

    // Explicit files are declared sources; otherwise discover them
    let files = if cli.files.is_empty() {
        let found = collect_spreadsheet_files(&cli.dir, cli.recursive)
            .with_context(|| format!("Failed to scan {}", cli.dir.display()))?;
        exclude_output(found, &cli.output)
    } else {
        cli.files.clone()
    };

    if files.is_empty() {
        println!("No spreadsheet files found in {}", cli.dir.display());
        return Ok(());
    }
    for (idx, path) in files.iter().enumerate() {
        info!(file = idx + 1, path = %path.display(), "input");
    }

    // Any missing input aborts here, before anything is written
    let (record_sets, mut map) = merge_files(&files)?;
    println!("Found {} unique address(es) in {} file(s)", map.len(), record_sets.len());

    // Set up progress bar (skip in batch mode)
    let progress = if cli.batch {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(map.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] Total emails checked: {pos}/{len} {msg}")
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        pb
    };

    let mut pipeline = ValidationPipeline::new(verifier.as_ref())
        .with_progress(progress.clone())
        .with_shutdown(shutdown_requested.clone());
    if !cli.no_pause {
        pipeline = pipeline.with_pacer(RandomPause::new(
            cli.pause_every,
            pause_duration(cli.min_pause, "--min-pause")?,
            pause_duration(cli.max_pause, "--max-pause")?,
        ));
    }
    let summary = pipeline.run(&mut map);

    if summary.cancelled {
        progress.finish_and_clear();
        warn!(checked = summary.checked, total = summary.total, "writing partial results");
        eprintln!("\n⏹️  Graceful shutdown complete");
        eprintln!(
            "📊 Checked {}/{} addresses, the rest stay \"Not validated\"",
            summary.checked, summary.total
        );
    } else {
        progress.finish_with_message("Validation complete!");
    }
    println!();

    // Summary first: it alone holds every result
    write_summary(&map, &cli.output).context("Failed to save summary")?;
    println!("Updated file saved: {}", cli.output.display());

    for set in &record_sets {
        let updated_path = annotated_path(&set.source);
        write_annotated_copy(set, &map, &updated_path)
            .with_context(|| format!("Failed to save {}", updated_path.display()))?;
        println!("Updated file saved: {}", updated_path.display());
    }

    if let Some(ref report_path) = cli.report {
        write_report(report_path, &files, &map, &summary).context("Failed to save report")?;
        println!("Detailed report saved to: {}", report_path.display());
    }

    // Print summary
    println!();
    println!("==================================================");
    println!("VALIDATION {}", if summary.cancelled { "INTERRUPTED" } else { "COMPLETE" });
    println!("==================================================");
    println!("Total rows processed: {}", map.len());
    println!("Valid: {}", summary.valid);
    println!("Invalid: {}", summary.invalid);
    println!("Errors: {}", summary.failed);
    println!();
    println!("Sample of processed data:");
    for entry in map.iter().take(5) {
        println!("{}: file {}, {}", entry.key(), entry.origin_index() + 1, entry.status());
    }

    Ok(())
}
