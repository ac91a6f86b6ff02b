//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the real main:
//! - parses CLI arguments and sets up logging
//! - loads settings and picks the cache
//! - runs one command through the pipeline
//! - prints, plots, and exports the result

use clap::Parser;
use tracing::{debug, info};

use crate::cache::ResponseCache;
use crate::cli::{Cli, OutputArgs};
use crate::config::Settings;
use crate::error::AppError;
use crate::report::Report;

pub mod pipeline;

pub use pipeline::Pipeline;

/// Entry point for the `finagg` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    crate::logging::init(cli.output.verbose);

    let settings = Settings::from_env()?;
    let cache = cache_for(&settings, &cli.output);
    debug!(cache_dir = ?cache.dir(), "cache selected");

    let pipeline = Pipeline::from_settings(settings, cache)?;
    info!(command = ?cli.command, "running");
    let report = pipeline.run(&cli.command)?;

    emit(&report, &cli.output)
}

/// Flags win over the environment.
pub fn cache_for(settings: &Settings, output: &OutputArgs) -> ResponseCache {
    if output.no_cache || !settings.cache_enabled {
        return ResponseCache::disabled();
    }
    match output.cache_dir.clone().or_else(|| settings.cache_dir.clone()) {
        Some(dir) => ResponseCache::new(dir),
        None => ResponseCache::disabled(),
    }
}

fn emit(report: &Report, output: &OutputArgs) -> Result<(), AppError> {
    if output.json {
        let json = serde_json::to_string_pretty(report)
            .map_err(|e| AppError::io(format!("Failed to serialize result: {e}")))?;
        println!("{json}");
    } else {
        print!("{}", crate::report::format_report(report));
    }

    if output.plot {
        match report.series() {
            Some(series) => println!(
                "\n{}",
                crate::plot::render_series_plot(&series, output.width, output.height)
            ),
            None => debug!("result is not a series; skipping plot"),
        }
    }

    if let Some(path) = &output.export {
        let rows = crate::io::write_report_csv(path, report)?;
        info!(path = %path.display(), rows, "exported");
    }

    Ok(())
}
