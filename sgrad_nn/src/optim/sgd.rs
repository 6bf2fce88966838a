//! Stochastic Gradient Descent optimizer.

use std::collections::HashMap;

use log::debug;
use sgrad_core::{NodeId, Value};

/// SGD with optional momentum, updating parameters in place.
#[derive(Debug, Clone)]
pub struct Sgd {
    pub lr: f64,
    pub momentum: f64,
    /// Velocity buffers keyed by parameter identity.
    velocities: HashMap<NodeId, f64>,
}

impl Sgd {
    pub fn new(lr: f64) -> Self {
        Sgd::with_momentum(lr, 0.0)
    }

    pub fn with_momentum(lr: f64, momentum: f64) -> Self {
        Sgd {
            lr,
            momentum,
            velocities: HashMap::new(),
        }
    }

    /// Apply one update to every parameter from its current gradient.
    ///
    /// Plain SGD: `value -= lr * grad`. With momentum:
    /// `v = momentum * v + grad; value -= lr * v`.
    pub fn step(&mut self, params: &[Value]) {
        for param in params {
            let grad = param.grad();
            let delta = if self.momentum > 0.0 {
                let velocity = self.velocities.entry(param.id()).or_insert(0.0);
                *velocity = self.momentum * *velocity + grad;
                *velocity
            } else {
                grad
            };
            param.set_value(param.value() - self.lr * delta);
        }
        debug!("sgd step over {} parameters (lr={})", params.len(), self.lr);
    }

    /// Zero the gradient of every parameter.
    pub fn zero_grad(&self, params: &[Value]) {
        for param in params {
            param.zero_grad();
        }
    }

    /// Forget accumulated momentum.
    pub fn reset(&mut self) {
        self.velocities.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_sgd_step() {
        let params: Vec<Value> = [1.0, 2.0, 3.0].iter().map(|&v| Value::leaf(v)).collect();
        for (p, g) in params.iter().zip([0.1, 0.2, 0.3]) {
            p.set_grad(g);
        }

        let mut opt = Sgd::new(0.1);
        opt.step(&params);

        let expected = [0.99, 1.98, 2.97];
        for (p, e) in params.iter().zip(expected) {
            assert_abs_diff_eq!(p.value(), e, epsilon = 1e-12);
        }
        // Gradients are left for the caller to clear.
        assert_eq!(params[0].grad(), 0.1);
    }

    #[test]
    fn test_sgd_with_momentum() {
        let w = Value::leaf(1.0);
        let params = vec![w.clone()];
        let mut opt = Sgd::with_momentum(0.1, 0.9);

        // v = 1, w = 1 - 0.1 = 0.9
        w.set_grad(1.0);
        opt.step(&params);
        assert_abs_diff_eq!(w.value(), 0.9, epsilon = 1e-12);

        // v = 0.9 + 1 = 1.9, w = 0.9 - 0.19 = 0.71
        opt.step(&params);
        assert_abs_diff_eq!(w.value(), 0.71, epsilon = 1e-12);

        opt.reset();
        opt.step(&params);
        assert_abs_diff_eq!(w.value(), 0.61, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_grad() {
        let params = vec![Value::leaf(1.0), Value::leaf(2.0)];
        params[0].set_grad(4.0);
        params[1].set_grad(-1.0);
        Sgd::new(0.1).zero_grad(&params);
        assert!(params.iter().all(|p| p.grad() == 0.0));
    }
}
