//! Crate-wide error type

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by training, evaluation, and checkpointing
///
/// Every failure is fatal to the current invocation: nothing in this crate
/// retries, and errors propagate to the entry point unchanged.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration rejected before any side effect
    #[error("configuration error: {0}")]
    Config(String),

    /// Dataset name the entry point does not support
    #[error("unsupported dataset: {0}")]
    UnsupportedDataset(String),

    /// Checkpoint file does not exist
    #[error("checkpoint not found: {}", .0.display())]
    CheckpointNotFound(PathBuf),

    /// Stored parameters do not match the target model architecture
    #[error("shape mismatch for parameter '{name}': expected {expected} values, found {found}")]
    ShapeMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    /// Evaluation over a split with zero examples
    #[error("cannot evaluate an empty split: {0}")]
    EmptySplit(String),

    /// Underlying filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Checkpoint or manifest (de)serialization failure
    #[error("serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Config("epochs must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "configuration error: epochs must be at least 1"
        );

        let err = Error::ShapeMismatch {
            name: "fc1.weight".to_string(),
            expected: 128,
            found: 64,
        };
        assert!(err.to_string().contains("fc1.weight"));
        assert!(err.to_string().contains("128"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
