//! Loss functions.
//!
//! Losses are composed from the engine's operations, so their gradients come
//! from the same backward pass as everything else.

use std::fmt;
use std::str::FromStr;

use sgrad_core::Value;

use crate::error::NnError;

/// Elementwise loss between one prediction and one numeric target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LossKind {
    /// (prediction - target)^2, unscaled: d/dprediction = 2 * diff.
    #[default]
    MeanSquaredError,
    /// |prediction - target|, built as relu(diff) + relu(-diff).
    MeanAbsoluteError,
}

impl LossKind {
    pub fn compose(self, prediction: &Value, target: f64) -> Value {
        match self {
            LossKind::MeanSquaredError => mse_loss(prediction, target),
            LossKind::MeanAbsoluteError => mae_loss(prediction, target),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LossKind::MeanSquaredError => "mse",
            LossKind::MeanAbsoluteError => "mae",
        }
    }
}

impl fmt::Display for LossKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LossKind {
    type Err = NnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mse" | "mean-squared-error" => Ok(LossKind::MeanSquaredError),
            "mae" | "mean-absolute-error" => Ok(LossKind::MeanAbsoluteError),
            _ => Err(NnError::UnknownLoss(s.to_string())),
        }
    }
}

/// Squared error: (prediction - target) * (prediction - target)
pub fn mse_loss(prediction: &Value, target: f64) -> Value {
    let diff = prediction - target;
    &diff * &diff
}

/// Absolute error: relu(diff) + relu(-diff), which equals |diff| everywhere.
pub fn mae_loss(prediction: &Value, target: f64) -> Value {
    let diff = prediction - target;
    diff.relu() + (-&diff).relu()
}
