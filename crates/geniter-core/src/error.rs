use thiserror::Error;

/// Errors produced by the transformation pipeline.
///
/// There is no recoverable tier: the tool is a batch compiler, and every
/// variant is fatal to the run. Partial output is never emitted.
#[derive(Debug, Error)]
pub enum TranspileError {
    /// The input source did not parse as Java.
    #[error("parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// The input parsed but does not have the required shape
    /// (e.g. no `generate()` method, more than one top-level type).
    #[error("{0}")]
    Structure(String),

    /// The input uses a construct outside the supported subset.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// An internal invariant was violated. Always a bug in this tool.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TranspileError {
    pub fn structure(msg: impl Into<String>) -> Self {
        TranspileError::Structure(msg.into())
    }

    pub fn not_implemented(msg: impl Into<String>) -> Self {
        TranspileError::NotImplemented(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        TranspileError::Internal(msg.into())
    }
}

/// Result type alias for transformation operations.
pub type Result<T> = std::result::Result<T, TranspileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display_includes_location() {
        let err = TranspileError::Parse {
            line: 3,
            column: 7,
            message: "unexpected token".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("line 3"));
        assert!(rendered.contains("column 7"));
        assert!(rendered.contains("unexpected token"));
    }

    #[test]
    fn not_implemented_display_is_prefixed() {
        let err = TranspileError::not_implemented("three-part for loop");
        assert_eq!(err.to_string(), "not implemented: three-part for loop");
    }
}
