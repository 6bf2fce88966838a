//! # sgrad_core - Scalar Reverse-mode Automatic Differentiation
//!
//! Every arithmetic and activation operation performed on a [`Value`] is
//! recorded into a directed acyclic computation graph. Calling
//! [`Value::backward`] on a scalar result (typically a loss) runs the chain
//! rule over that graph in reverse topological order and leaves
//! d(result)/d(node) in every node's `grad`.
//!
//! ## Quick Start
//!
//! ```
//! use sgrad_core::leaf;
//!
//! let x = leaf(2.0);
//! let y = leaf(3.0);
//!
//! // z = x * y + sin(x)
//! let z = &x * &y + x.sin();
//! assert!((z.value() - 6.909297426825682).abs() < 1e-10);
//!
//! z.backward();
//!
//! // dz/dx = y + cos(x), dz/dy = x
//! assert!((x.grad() - 2.5838531634528574).abs() < 1e-10);
//! assert!((y.grad() - 2.0).abs() < 1e-10);
//! ```
//!
//! ## Supported Operations
//!
//! | Category | Operations |
//! |----------|------------|
//! | Arithmetic | `+`, `-`, `*`, `/`, unary `-` (with `f64` on either side) |
//! | Power | [`Value::powf`] (x^c for constant c) |
//! | Transcendental | [`Value::exp`], [`Value::log`], [`Value::sin`], [`Value::cos`] |
//! | Activations | [`Value::relu`], [`Value::sigmoid`], [`Value::tanh`] |
//!
//! ## Gradient accumulation
//!
//! Gradients live on the nodes. Leaves (inputs and parameters) accumulate
//! across backward passes; reset them with [`Value::zero_grad`] before every
//! pass whose gradients will drive a parameter update.

mod backward;
mod error;
mod finite_diff;
mod node;
mod ops;

pub use backward::{backward, topological_order};
pub use error::GradError;
pub use finite_diff::{autodiff_grad, check_gradients, finite_diff_grad, max_grad_error};
pub use node::{NodeId, Op, Value};

/// Create a new leaf (an input or a parameter).
pub fn leaf(value: f64) -> Value {
    Value::leaf(value)
}

/// Lift a raw number into the graph as a constant.
pub fn constant(value: f64) -> Value {
    Value::constant(value)
}
