//! Error types for ballistic table generation.

use thiserror::Error;

/// Result type alias using our error type.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while computing a batch of ballistic tables.
///
/// Per-shell variants are recoverable: the scheduler records them in the
/// batch report and continues. Only configuration and input-set errors
/// abort a run.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Velocity decayed below the integration floor before the last
    /// requested sample distance; the table was truncated there.
    #[error(
        "trajectory for '{shell}' diverged at {last_valid_m:.0} m \
         (requested {requested_m:.0} m)"
    )]
    DivergentTrajectory {
        shell: String,
        last_valid_m: f64,
        requested_m: f64,
    },

    /// An indexed-subcaliber shell carried no armor-power series and fell
    /// back to the kinetic formula. Indicates an upstream data gap.
    #[error("'{shell}' has no armor-power series, fell back to kinetic formula")]
    MissingArmorPowerSeries { shell: String },

    /// Non-physical record values; the shell is skipped.
    #[error("invalid record '{shell}': {reason}")]
    InvalidRecord { shell: String, reason: String },

    /// Sensitivity outside (0, 1].
    #[error("sensitivity must be in (0, 1], got {value}")]
    InvalidSensitivity { value: f64 },

    /// The batch contained no vehicles.
    #[error("empty input set: no vehicles to process")]
    EmptyBatch,

    /// Worker pool could not be constructed.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    /// Failed to read input or write a table file.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed vehicle record input.
    #[error("failed to parse records in {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl EngineError {
    /// Create an IO error with path context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a JSON parse error with path context.
    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    /// Create an invalid-record error.
    pub fn invalid_record(shell: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            shell: shell.into(),
            reason: reason.into(),
        }
    }
}
