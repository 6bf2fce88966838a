//! Error type shared by the engine and the network layers built on it.

use thiserror::Error;

/// Failures raised by graph construction and network evaluation.
///
/// Every error is raised synchronously at the point of the offending call.
/// Nothing is retried internally; the caller decides whether to skip the
/// sample, abort training, or report the failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradError {
    /// An input sequence did not match the arity a neuron or network expects.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// An operation was applied outside its mathematical domain (e.g. `log` of a non-positive value).
    #[error("Domain error: {operation} is undefined for {value}")]
    Domain { operation: &'static str, value: f64 },

    /// A network was described with too few layers or incompatible widths.
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    /// Introspection was requested before the state it reads exists.
    #[error("Invalid state: {0}")]
    State(String),
}

impl GradError {
    pub fn topology(message: impl Into<String>) -> Self {
        GradError::InvalidTopology(message.into())
    }

    pub fn state(message: impl Into<String>) -> Self {
        GradError::State(message.into())
    }
}
