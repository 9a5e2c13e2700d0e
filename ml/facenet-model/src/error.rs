//! Error types for facenet-model crate.

use thiserror::Error;

/// Errors that can occur in facenet-model operations.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Channel-width list has the wrong length.
    #[error("invalid width list: expected {expected} entries, got {actual}")]
    InvalidWidths {
        /// Expected number of entries.
        expected: usize,
        /// Actual number of entries.
        actual: usize,
    },

    /// Invalid model configuration.
    #[error("invalid model configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load checkpoint.
    #[error("failed to load checkpoint from {path}: {reason}")]
    LoadCheckpoint {
        /// Path to the checkpoint file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to save checkpoint.
    #[error("failed to save checkpoint to {path}: {reason}")]
    SaveCheckpoint {
        /// Path to the checkpoint file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Checkpoint file not found.
    #[error("checkpoint not found: {0}")]
    CheckpointNotFound(String),

    /// Unsupported checkpoint format.
    #[error("unsupported checkpoint format: {0}")]
    UnsupportedFormat(String),
}

impl ModelError {
    /// Creates an invalid widths error.
    #[must_use]
    pub const fn invalid_widths(expected: usize, actual: usize) -> Self {
        Self::InvalidWidths { expected, actual }
    }

    /// Creates an invalid config error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    /// Creates a load checkpoint error.
    #[must_use]
    pub fn load_checkpoint(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LoadCheckpoint {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a save checkpoint error.
    #[must_use]
    pub fn save_checkpoint(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SaveCheckpoint {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a checkpoint not found error.
    #[must_use]
    pub fn checkpoint_not_found(path: impl Into<String>) -> Self {
        Self::CheckpointNotFound(path.into())
    }

    /// Creates an unsupported format error.
    #[must_use]
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat(format.into())
    }
}

/// Result type for facenet-model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_widths() {
        let err = ModelError::invalid_widths(16, 7);
        assert!(err.to_string().contains("16"));
        assert!(err.to_string().contains('7'));
    }

    #[test]
    fn error_invalid_config() {
        let err = ModelError::invalid_config("embedding size must be > 0");
        assert!(err.to_string().contains("embedding size must be > 0"));
    }

    #[test]
    fn error_load_checkpoint() {
        let err = ModelError::load_checkpoint("model.bin", "file corrupted");
        assert!(err.to_string().contains("model.bin"));
        assert!(err.to_string().contains("file corrupted"));
    }

    #[test]
    fn error_save_checkpoint() {
        let err = ModelError::save_checkpoint("output.bin", "disk full");
        assert!(err.to_string().contains("output.bin"));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn error_checkpoint_not_found() {
        let err = ModelError::checkpoint_not_found("/path/to/missing.bin");
        assert!(err.to_string().contains("/path/to/missing.bin"));
    }

    #[test]
    fn error_unsupported_format() {
        let err = ModelError::unsupported_format("xml");
        assert!(err.to_string().contains("xml"));
    }
}
