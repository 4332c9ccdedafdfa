//! Error types for the basalt engine.
//!
//! All public APIs return `BasaltResult<T>` — no panics in library code.

use thiserror::Error;

/// Unified error type for all basalt operations.
#[derive(Debug, Error)]
pub enum BasaltError {
    /// Named entity absent from the resource or variable pool
    #[error("'{0}' not found")]
    NotFound(String),

    /// Create on an existing database, table or column
    #[error("'{0}' already exists")]
    AlreadyExists(String),

    /// Type mismatch, size mismatch or unsupported operand
    #[error("invalid operand: {0}")]
    InvalidOperand(String),

    /// Metadata parse failure, short read or malformed command
    #[error("bad format: {0}")]
    BadFormat(String),

    /// Declared operation without an implementation yet
    #[error("not implemented: {0}")]
    Unimplemented(String),

    /// Standard I/O error
    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Wire or metadata codec failure
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for all basalt operations.
pub type BasaltResult<T> = Result<T, BasaltError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_not_found() {
        let err = BasaltError::NotFound("db1.tbl1.a".to_string());
        assert_eq!(err.to_string(), "'db1.tbl1.a' not found");
    }

    #[test]
    fn error_display_already_exists() {
        let err = BasaltError::AlreadyExists("db1".to_string());
        assert_eq!(err.to_string(), "'db1' already exists");
    }

    #[test]
    fn error_display_invalid_operand() {
        let err = BasaltError::InvalidOperand("vectors of different size: 3, 4".to_string());
        assert!(err.to_string().contains("different size"));
    }

    #[test]
    fn error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read");
        let err: BasaltError = io.into();
        assert!(err.to_string().contains("short read"));
    }

    #[test]
    fn basalt_result_err() {
        let result: BasaltResult<i32> = Err(BasaltError::Unimplemented("column delete".into()));
        assert!(result.is_err());
    }
}
