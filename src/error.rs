//! Error Types
//!
//! Failure taxonomy shared by every store engine.

use thiserror::Error;

/// Errors returned by store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Key already present on add
    #[error("Key already exists: {0}")]
    DuplicateKey(String),

    /// Key absent, or present but past its lifetime
    #[error("Key absent or expired: {0}")]
    InvalidKey(String),

    /// Operation or scope this engine cannot express
    #[error("Operation not supported: {0}")]
    Unsupported(&'static str),

    /// Payload could not be encoded from the supplied value or decoded
    /// into the requested type
    #[error("Type mismatch: {0}")]
    TypeMismatch(#[from] serde_json::Error),

    /// Engine-specific failure from a backing store
    #[error("Engine failure: {0}")]
    Engine(String),
}

/// Convenience alias for store results
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_key() {
        let err = StoreError::DuplicateKey("user:1".into());
        assert_eq!(err.to_string(), "Key already exists: user:1");

        let err = StoreError::InvalidKey("user:2".into());
        assert_eq!(err.to_string(), "Key absent or expired: user:2");

        let err = StoreError::Unsupported("lifetime scope `new`");
        assert_eq!(err.to_string(), "Operation not supported: lifetime scope `new`");

        let err = StoreError::Engine("connection reset".into());
        assert_eq!(err.to_string(), "Engine failure: connection reset");
    }

    #[test]
    fn test_codec_error_converts() {
        let json_err = serde_json::from_str::<i64>("not json").unwrap_err();
        let err = StoreError::from(json_err);
        assert!(matches!(err, StoreError::TypeMismatch(_)));
    }
}
