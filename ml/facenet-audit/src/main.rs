//! FaceForge image audit tool
//!
//! Walks a directory tree and decode-checks every image before it reaches a
//! training pipeline.
//!
//! # Usage
//!
//! - `facenet-audit <ROOT>` - audit a dataset tree
//! - `facenet-audit <ROOT> --json` - emit a machine-readable report
//! - `facenet-audit <ROOT> --extensions png,jpg` - restrict the format set
//!
//! Corrupt files are reported, not fatal; the exit code only reflects
//! whether the audit itself could run. Logging is controlled through
//! `RUST_LOG` and defaults to `info`.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use facenet_dataset::{AuditConfig, DEFAULT_PROGRESS_INTERVAL, ImageFormats, audit_images};
use tracing_subscriber::EnvFilter;

/// FaceForge image audit
///
/// Recursively decode-checks every image under a directory.
#[derive(Parser)]
#[command(name = "facenet-audit")]
#[command(about = "Decode-check every image in a dataset tree", long_about = None)]
#[command(version)]
struct Cli {
    /// Root directory to audit
    root: PathBuf,

    /// Scanned-file count between progress log lines (0 disables)
    #[arg(long, default_value_t = DEFAULT_PROGRESS_INTERVAL)]
    progress_interval: usize,

    /// Follow symbolic links while walking
    #[arg(long)]
    follow_links: bool,

    /// Comma-separated extensions to attempt (default: bmp,jpg,jpeg,png)
    #[arg(long, value_delimiter = ',')]
    extensions: Option<Vec<String>>,

    /// Emit the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = AuditConfig::new()
        .with_progress_interval(cli.progress_interval)
        .with_follow_links(cli.follow_links);
    if let Some(extensions) = &cli.extensions {
        config = config.with_formats(ImageFormats::from_extensions(extensions));
    }

    let report = audit_images(&cli.root, &config)?;

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.to_report());
    }

    Ok(())
}
