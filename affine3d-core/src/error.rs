/// Error types for the transform kernel
use thiserror::Error;

/// Failures surfaced by kernel operations. None of them are retried; the
/// caller decides whether to abort or substitute a default.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    /// An input lies outside the domain of the operation, e.g. a zero-length
    /// rotation axis or a point at infinity.
    #[error("Domain error: {0}")]
    Domain(String),

    /// Inversion was requested on a matrix with zero determinant.
    #[error("Matrix is singular and cannot be inverted")]
    SingularMatrix,

    /// A matrix or vertex batch does not have the dimensions the operation needs.
    #[error("Shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: String, found: String },
}

impl KernelError {
    pub(crate) fn shape(expected: impl Into<String>, rows: usize, cols: usize) -> Self {
        KernelError::ShapeMismatch {
            expected: expected.into(),
            found: format!("{}x{}", rows, cols),
        }
    }
}

/// Result alias used throughout the kernel
pub type KernelResult<T> = Result<T, KernelError>;
