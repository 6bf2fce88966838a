//! Finite difference utilities for gradient verification.
//!
//! Provides numerical gradient computation for testing autodiff correctness.

use crate::error::GradError;
use crate::node::Value;

/// Compute gradients using central finite differences.
///
/// # Arguments
/// * `f` - Function that takes a slice of variable values and returns a scalar
/// * `point` - The point at which to compute gradients
/// * `eps` - Step size for finite differences (typically 1e-7 to 1e-5)
///
/// # Returns
/// Vector of partial derivatives [df/dx_0, df/dx_1, ...] at the given point
///
/// # Example
/// ```
/// use sgrad_core::finite_diff_grad;
///
/// // f(x, y) = x^2 + y^2
/// let f = |v: &[f64]| v[0] * v[0] + v[1] * v[1];
/// let grads = finite_diff_grad(f, &[3.0, 4.0], 1e-7);
///
/// assert!((grads[0] - 6.0).abs() < 1e-5);
/// assert!((grads[1] - 8.0).abs() < 1e-5);
/// ```
pub fn finite_diff_grad<F>(f: F, point: &[f64], eps: f64) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut grads = Vec::with_capacity(point.len());
    let mut perturbed = point.to_vec();

    for i in 0..point.len() {
        // (f(x + eps) - f(x - eps)) / (2 * eps)
        perturbed[i] = point[i] + eps;
        let f_plus = f(&perturbed);

        perturbed[i] = point[i] - eps;
        let f_minus = f(&perturbed);

        perturbed[i] = point[i];

        grads.push((f_plus - f_minus) / (2.0 * eps));
    }

    grads
}

/// Gradients of a graph-building function at `point`, computed by the engine.
///
/// `f` receives one fresh leaf per coordinate and returns the output node.
pub fn autodiff_grad<F>(f: F, point: &[f64]) -> Result<Vec<f64>, GradError>
where
    F: Fn(&[Value]) -> Result<Value, GradError>,
{
    let leaves: Vec<Value> = point.iter().map(|&v| Value::leaf(v)).collect();
    let out = f(&leaves)?;
    out.backward();
    Ok(leaves.iter().map(Value::grad).collect())
}

/// Largest absolute difference between engine gradients and central finite
/// differences of the same graph-building function.
pub fn check_gradients<F>(f: F, point: &[f64], eps: f64) -> Result<f64, GradError>
where
    F: Fn(&[Value]) -> Result<Value, GradError>,
{
    let analytic = autodiff_grad(&f, point)?;

    // Evaluate the perturbed points up front so a domain error surfaces as an error.
    let mut numeric = Vec::with_capacity(point.len());
    let mut perturbed = point.to_vec();
    for i in 0..point.len() {
        perturbed[i] = point[i] + eps;
        let plus = evaluate(&f, &perturbed)?;
        perturbed[i] = point[i] - eps;
        let minus = evaluate(&f, &perturbed)?;
        perturbed[i] = point[i];
        numeric.push((plus - minus) / (2.0 * eps));
    }

    Ok(max_grad_error(&analytic, &numeric))
}

fn evaluate<F>(f: &F, point: &[f64]) -> Result<f64, GradError>
where
    F: Fn(&[Value]) -> Result<Value, GradError>,
{
    let leaves: Vec<Value> = point.iter().map(|&v| Value::leaf(v)).collect();
    Ok(f(&leaves)?.value())
}

/// Compute the maximum absolute difference between two gradient vectors.
pub fn max_grad_error(grad1: &[f64], grad2: &[f64]) -> f64 {
    assert_eq!(grad1.len(), grad2.len());
    grad1
        .iter()
        .zip(grad2.iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max)
}
