//! Error types for block and system operations.

use sf_lti::LtiError;
use thiserror::Error;

/// Result type for block and system operations.
pub type FlowResult<T> = Result<T, FlowError>;

/// Errors that can occur while building or ticking a system.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FlowError {
    /// Transfer function rejected (improper, unstable, degenerate) or
    /// its conversion to discrete time failed.
    #[error("Invalid transfer function: {0}")]
    InvalidTransferFunction(#[from] LtiError),

    /// Number of supplied values disagrees with a declared port count,
    /// or vector signals of different lengths meet at one block.
    #[error("Shape mismatch: {what} (expected {expected}, got {actual})")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Junction sign string contains something other than '+' and '-'.
    #[error("Invalid junction signs '{signs}': only '+' and '-' are allowed")]
    InvalidSign { signs: String },

    /// Referenced block, edge or pseudo-node does not exist.
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// Port index at or beyond the declared port count.
    #[error("Port out of range: {what} (port={port}, count={count})")]
    PortOutOfRange {
        what: String,
        port: usize,
        count: usize,
    },

    /// Input port is already driven by another source.
    #[error("Port conflict: {what}")]
    PortConflict { what: String },

    /// Operation needs configuration that has not been provided.
    #[error("Unconfigured: {what}")]
    Unconfigured { what: &'static str },

    /// Invalid numeric argument (sample period, frequency).
    #[error("Invalid argument: {0}")]
    InvalidArg(#[from] sf_core::CoreError),
}

impl FlowError {
    /// Whether a real-time caller can skip this tick and carry on.
    ///
    /// Only shape errors qualify: they come from a source delivering a
    /// malformed sample, not from a broken configuration.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FlowError::ShapeMismatch { .. })
    }
}
