use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod error;
mod state;
mod sweep;
mod ui;

use error::SweepError;
use state::config::SweepConfig;
use sweep::Pipeline;

/// Clean up a JSON content catalog and its image folder
#[derive(Parser, Debug)]
#[command(name = "content-sweep", version)]
struct Cli {
    /// JSON config file (defaults to the per-user config when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Catalog file [default: content.json]
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Image folder [default: images]
    #[arg(long)]
    images: Option<PathBuf>,
    /// Maximum number of entries to keep [default: 30]
    #[arg(long)]
    limit: Option<usize>,
    /// Image that is never deleted [default: fallbackImage.png]
    #[arg(long)]
    fallback: Option<String>,
    /// Skip deleting images with '%' in their name
    #[arg(long)]
    no_purge: bool,
    /// Keep entries whose image is missing
    #[arg(long)]
    no_filter: bool,
    /// Do not limit the number of entries
    #[arg(long)]
    no_truncate: bool,
    /// Leave title and description untouched
    #[arg(long)]
    no_sanitize: bool,
    /// Keep unused images
    #[arg(long)]
    no_reap: bool,
    /// Report what would change without deleting or saving anything
    #[arg(long)]
    dry_run: bool,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Apply command-line flags on top of the loaded config
    fn apply(&self, config: &mut SweepConfig) {
        if let Some(path) = &self.catalog {
            config.catalog_path = path.clone();
        }
        if let Some(path) = &self.images {
            config.images_dir = path.clone();
        }
        if let Some(limit) = self.limit {
            config.limit = limit;
        }
        if let Some(fallback) = &self.fallback {
            config.fallback_image = fallback.clone();
        }
        config.steps.purge_percent &= !self.no_purge;
        config.steps.filter_missing &= !self.no_filter;
        config.steps.truncate &= !self.no_truncate;
        config.steps.sanitize &= !self.no_sanitize;
        config.steps.reap &= !self.no_reap;
        config.dry_run |= self.dry_run;
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), SweepError> {
    let mut config = SweepConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);

    let pipeline = Pipeline::new(config);
    tracing::debug!(steps = ?pipeline.enabled_steps(), limit = pipeline.config().limit, "pipeline ready");

    let report = pipeline.run()?;

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::warn!(error = %e, "failed to serialize report"),
        }
    } else {
        print!("{}", ui::report::render(&report));
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_load_failure() {
                eprintln!("❌ Error loading catalog: {e}");
            } else {
                eprintln!("❌ {e}");
            }
            ExitCode::FAILURE
        }
    }
}
