//! Subtrans - SubRip Subtitle Translation
//!
//! Entry point: `subtrans <FILE.srt> [from:to]` translates the text lines of
//! the file in place and keeps the original next to it.

use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;
use console::style;
use tracing::{Level, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use subtrans::cli::{Args, USAGE_HINT};
use subtrans::config::{Config, LoggingConfig};
use subtrans::error::SubtransError;
use subtrans::progress::{ProgressFactory, format_elapsed};
use subtrans::workflow::{Workflow, ensure_input};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            eprintln!("{}", USAGE_HINT);
            std::process::exit(1);
        }
    };

    // Arguments and input are checked before logging creates any file
    let config = Config::load(args.config.as_deref())?;
    let request = args.request(&config).inspect_err(|e| {
        if matches!(e, SubtransError::Usage(_)) {
            eprintln!("{}", USAGE_HINT);
        }
    })?;
    ensure_input(&request.file)?;

    let _guard = setup_logging(args.verbose, &config.logging)?;
    info!("Starting subtrans");

    println!("File: {}", style(request.file.display()).yellow().bold());
    println!("Direction: {}", style(&request.direction).cyan().bold());
    println!("Starting translation...");

    let workflow = Workflow::new(config);
    if let Err(e) = workflow.translator().check_availability().await {
        warn!("{}", e);
        eprintln!(
            "{}",
            style(format!("Warning: {}; lines will keep their original text", e)).yellow()
        );
    }

    let mut progress = ProgressFactory::create(args.progress);
    let summary = workflow
        .translate_file(&request.file, &request.direction, progress.as_mut())
        .await?;

    info!(
        "Finished in {}: {} lines, {} translated, {} kept, backup at {}",
        format_elapsed(summary.elapsed),
        summary.lines,
        summary.translatable - summary.fallbacks,
        summary.fallbacks,
        summary.backup_path.display()
    );
    Ok(())
}

/// Setup logging to the log file, and to the console when verbose
fn setup_logging(verbose: bool, config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Console output would tear the progress bar, so it is opt-in
    let console_layer = verbose.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
    });

    let (file_layer, guard) = if config.file {
        std::fs::create_dir_all(&config.directory)?;
        let file_appender = rolling::daily(&config.directory, "subtrans.log");
        let (non_blocking_file, guard) = non_blocking(file_appender);

        let layer = fmt::layer()
            .with_writer(non_blocking_file)
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - level: {}, file: {}",
        log_level,
        if config.file {
            config.directory.join("subtrans.log").display().to_string()
        } else {
            "disabled".to_string()
        }
    );

    Ok(guard)
}
