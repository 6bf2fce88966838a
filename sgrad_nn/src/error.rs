//! Errors raised by configuration parsing and the training loop.

use sgrad_core::GradError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NnError {
    #[error("Unknown activation '{0}' (expected linear, relu, sigmoid or tanh)")]
    UnknownActivation(String),

    #[error("Unknown loss '{0}' (expected mse or mae)")]
    UnknownLoss(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Non-finite loss {loss} at input {input} (target {target}); parameters not updated")]
    NonFiniteLoss { input: f64, target: f64, loss: f64 },

    #[error(transparent)]
    Engine(#[from] GradError),
}
