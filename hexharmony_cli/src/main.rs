// hexharmony — command-line front end for the harmonic engine.
//
// Usage:
//   hexharmony lut [--edo N] [--weight W] [--bandwidth B]
//   hexharmony heatmap --steps 0,4,7 [--edo N] [--weight W] [--gain G] [--json]
//   hexharmony reference [--max-limit L] [--max-denominator D]
//   hexharmony config [--out PATH]
//
// `--config PATH` (any subcommand) loads an EngineConfig JSON file instead of
// the built-in defaults. Logging goes to stderr; set RUST_LOG=debug to see
// LUT rebuild and recompute timings.

use anyhow::{Context, Result};
use clap::Parser;
use hexharmony_engine::EngineConfig;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Lut {
            edo,
            weight,
            bandwidth,
        } => commands::lut(config, edo, weight, bandwidth),
        Commands::Heatmap {
            edo,
            steps,
            weight,
            gain,
            json,
        } => commands::heatmap(config, edo, &steps, weight, gain, json),
        Commands::Reference {
            max_limit,
            max_denominator,
        } => commands::reference(&config, max_limit, max_denominator),
        Commands::Config { out } => commands::dump_config(&config, out.as_deref()),
    }
}
