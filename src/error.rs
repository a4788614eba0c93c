/// Unified error type for the profiler
/// Provides structured error handling with categories for different failure modes
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfilerError {
    /// Misuse errors: invalid configuration or schema, caught at run start
    #[error("Misuse: {message}")]
    Misuse { message: String },

    /// Row-shape errors: a row does not match the declared schema
    #[error(
        "Row shape: row {row_index} has {observed} columns, expected {expected} (pass {pass})"
    )]
    RowShape {
        row_index: usize,
        expected: usize,
        observed: usize,
        pass: usize,
    },

    /// Iteration errors: the caller's row source failed mid-pass
    #[error("Row source failed during pass {pass}")]
    Iteration {
        pass: usize,
        #[source]
        source: anyhow::Error,
    },
}

impl ProfilerError {
    pub fn misuse(message: impl Into<String>) -> Self {
        Self::Misuse {
            message: message.into(),
        }
    }

    pub fn row_shape(row_index: usize, expected: usize, observed: usize, pass: usize) -> Self {
        Self::RowShape {
            row_index,
            expected,
            observed,
            pass,
        }
    }

    pub fn iteration(pass: usize, source: anyhow::Error) -> Self {
        Self::Iteration { pass, source }
    }
}

/// Result type alias for profiler operations
pub type ProfilerResult<T> = Result<T, ProfilerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_shape_message_names_both_arities() {
        let err = ProfilerError::row_shape(7, 11, 9, 2);
        let text = err.to_string();
        assert!(text.contains("row 7"));
        assert!(text.contains("expected 11"));
        assert!(text.contains("9 columns"));
        assert!(text.contains("pass 2"));
    }

    #[test]
    fn test_iteration_preserves_source() {
        let err = ProfilerError::iteration(1, anyhow::anyhow!("socket closed"));
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "socket closed");
    }
}
