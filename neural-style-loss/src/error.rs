//! Error types for invoking regularizers on layer outputs.

use thiserror::Error;

/// The error type for [`Regularizer`](crate::Regularizer) invocations.
///
/// Calling a regularizer's `forward` directly treats these conditions as fatal
/// preconditions and panics; going through
/// [`Regularizer::regularize`](crate::Regularizer::regularize) reports them as values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegularizerError {
    /// The layer the regularizer is attached to produced fewer outputs than it consumes.
    #[error("Missing {role} output at index {index}: layer produced {available} output(s)")]
    MissingOutput {
        /// Semantic role of the missing output, e.g. `"content"`.
        role: &'static str,
        /// Position the output was expected at.
        index: usize,
        /// Number of outputs actually available.
        available: usize,
    },

    /// An output tensor does not have the shape the regularizer was built for.
    #[error("Invalid input tensor shape: expected {expected}, got {actual}")]
    InvalidTensorShape {
        /// The expected tensor shape.
        expected: String,
        /// The actual tensor shape.
        actual: String,
    },
}

/// A specialized `Result` type for regularizer invocations.
pub type RegularizerResult<T> = Result<T, RegularizerError>;
