// Command-line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hexharmony")]
#[command(about = "Inspect the harmonic tables and heatmaps of a hex microtonal keyboard", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Engine config JSON (defaults to the built-in config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the harmonic lookup table for a tuning
    Lut {
        /// EDO preset
        #[arg(long, default_value_t = 12)]
        edo: u32,

        /// Complexity weight (defaults to the config value)
        #[arg(long)]
        weight: Option<f64>,

        /// Critical-bandwidth scale (defaults to the config value)
        #[arg(long)]
        bandwidth: Option<f64>,
    },

    /// Activate pitch steps and print the resulting heatmap
    Heatmap {
        /// EDO preset
        #[arg(long, default_value_t = 12)]
        edo: u32,

        /// Comma-separated pitch steps to sound, e.g. 0,4,7
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true, required = true)]
        steps: Vec<i64>,

        /// Complexity weight
        #[arg(long)]
        weight: Option<f64>,

        /// Heatmap gain
        #[arg(long)]
        gain: Option<f64>,

        /// Print the full engine snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the just-intonation reference ruler
    Reference {
        /// Highest prime allowed in a ratio
        #[arg(long, default_value_t = 13)]
        max_limit: u64,

        /// Largest denominator
        #[arg(long, default_value_t = 32)]
        max_denominator: u64,
    },

    /// Dump the engine config as JSON
    Config {
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_heatmap_steps() {
        let cli = Cli::try_parse_from(["hexharmony", "heatmap", "--edo", "31", "--steps", "0,-5,18"]).unwrap();
        match cli.command {
            Commands::Heatmap { edo, steps, json, .. } => {
                assert_eq!(edo, 31);
                assert_eq!(steps, vec![0, -5, 18]);
                assert!(!json);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["hexharmony", "lut", "--config", "my.json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("my.json")));
    }

    #[test]
    fn heatmap_requires_steps() {
        assert!(Cli::try_parse_from(["hexharmony", "heatmap"]).is_err());
    }
}
