// Error types for the few fallible boundaries of the engine.
//
// The analysis core itself never fails: degenerate numeric input resolves to
// inert output (unmatched ratios, black cells). Errors only arise when
// loading or validating configuration from outside the process.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid tuning {name:?} ({edo} EDO): {reason}")]
    InvalidTuning {
        name: String,
        edo: u32,
        reason: String,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
