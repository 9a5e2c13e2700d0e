//! Error types for facenet-dataset crate.

use thiserror::Error;

/// Errors that can occur in facenet-dataset operations.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Audit root does not exist.
    #[error("root directory not found: {0}")]
    RootNotFound(String),

    /// Audit root exists but is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl DatasetError {
    /// Creates a root not found error.
    #[must_use]
    pub fn root_not_found(path: impl Into<String>) -> Self {
        Self::RootNotFound(path.into())
    }

    /// Creates a not-a-directory error.
    #[must_use]
    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory(path.into())
    }

    /// Creates an IO error.
    #[must_use]
    pub fn io(reason: impl Into<String>) -> Self {
        Self::Io(reason.into())
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(reason: impl Into<String>) -> Self {
        Self::Serialization(reason.into())
    }
}

impl From<std::io::Error> for DatasetError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DatasetError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for facenet-dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_root_not_found() {
        let err = DatasetError::root_not_found("/data/images");
        assert!(err.to_string().contains("/data/images"));
    }

    #[test]
    fn error_not_a_directory() {
        let err = DatasetError::not_a_directory("/data/images/cat.png");
        assert!(err.to_string().contains("cat.png"));
    }

    #[test]
    fn error_io() {
        let err = DatasetError::io("permission denied");
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn error_serialization() {
        let err = DatasetError::serialization("invalid JSON");
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let err: DatasetError = io_err.into();
        assert!(matches!(err, DatasetError::Io(_)));
    }

    #[test]
    fn error_from_serde_error() {
        let json_err = match serde_json::from_str::<i32>("invalid") {
            Ok(_) => return,
            Err(e) => e,
        };
        let err: DatasetError = json_err.into();
        assert!(matches!(err, DatasetError::Serialization(_)));
    }
}
