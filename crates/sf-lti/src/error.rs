//! Error types for LTI operations.

use thiserror::Error;

/// Result type for LTI operations.
pub type LtiResult<T> = Result<T, LtiError>;

/// Errors raised while building, validating, or converting LTI systems.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LtiError {
    /// Denominator is empty or all zeros.
    #[error("Degenerate denominator: {what}")]
    DegenerateDenominator { what: &'static str },

    /// More zeros than poles.
    #[error("Transfer function is not proper ({zeros} zeros, {poles} poles)")]
    Improper { zeros: usize, poles: usize },

    /// A pole with non-negative real part.
    #[error("Transfer function is not stable (pole at {re} + {im}i)")]
    Unstable { re: f64, im: f64 },

    /// Unknown discretization method name.
    #[error("Unsupported discretization method: {name}")]
    UnsupportedMethod { name: String },

    /// Conversion produced a zero leading denominator coefficient.
    #[error("Singular conversion: {what}")]
    Singular { what: &'static str },

    /// Invalid numeric argument.
    #[error("Invalid argument: {0}")]
    InvalidArg(#[from] sf_core::CoreError),

    /// Vector length does not match the system order.
    #[error("Dimension mismatch: {what} (expected {expected}, got {actual})")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}
