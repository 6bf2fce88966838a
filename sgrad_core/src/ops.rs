//! The operation table: forward formulas, local derivatives, and the
//! constructors and operator overloads that build graph nodes.
//!
//! Each operation knows how to compute its local gradients with respect to its
//! operands. The backward pass multiplies these by the upstream gradient and
//! accumulates the products into the operands.

use crate::error::GradError;
use crate::node::{Op, Value};

/// Evaluate `op` on operand values.
pub(crate) fn forward(op: Op, inputs: &[f64]) -> f64 {
    match op {
        // Leaves never go through here; their value is set directly.
        Op::Leaf | Op::Const => 0.0,
        Op::Add => inputs[0] + inputs[1],
        Op::Sub => inputs[0] - inputs[1],
        Op::Mul => inputs[0] * inputs[1],
        Op::Div => inputs[0] / inputs[1],
        Op::Neg => -inputs[0],
        Op::Pow { exponent } => inputs[0].powf(exponent),
        Op::Log => inputs[0].ln(),
        Op::Exp => inputs[0].exp(),
        Op::Sin => inputs[0].sin(),
        Op::Cos => inputs[0].cos(),
        Op::Relu => inputs[0].max(0.0),
        Op::Sigmoid => 1.0 / (1.0 + (-inputs[0]).exp()),
        Op::Tanh => inputs[0].tanh(),
    }
}

/// Local derivatives d(output)/d(operand_i), evaluated at the values frozen
/// when the node was built.
///
/// Unused slots are zero; callers zip the result with the node's operands.
pub(crate) fn local_gradients(op: Op, inputs: &[f64], output: f64) -> [f64; 2] {
    match op {
        // No operands
        Op::Leaf | Op::Const => [0.0, 0.0],

        // z = a + b: dz/da = 1, dz/db = 1
        Op::Add => [1.0, 1.0],

        // z = a - b: dz/da = 1, dz/db = -1
        Op::Sub => [1.0, -1.0],

        // z = a * b: dz/da = b, dz/db = a
        Op::Mul => [inputs[1], inputs[0]],

        // z = a / b: dz/da = 1/b, dz/db = -a/b^2
        Op::Div => {
            let (a, b) = (inputs[0], inputs[1]);
            [1.0 / b, -a / (b * b)]
        }

        // z = -a: dz/da = -1
        Op::Neg => [-1.0, 0.0],

        // z = a^c: dz/da = c * a^(c-1)
        Op::Pow { exponent } => [exponent * inputs[0].powf(exponent - 1.0), 0.0],

        // z = ln(a): dz/da = 1/a
        Op::Log => [1.0 / inputs[0], 0.0],

        // z = exp(a): dz/da = exp(a), already computed as the output
        Op::Exp => [output, 0.0],

        // z = sin(a): dz/da = cos(a)
        Op::Sin => [inputs[0].cos(), 0.0],

        // z = cos(a): dz/da = -sin(a)
        Op::Cos => [-inputs[0].sin(), 0.0],

        // z = max(0, a): dz/da = 1 if a > 0, else 0
        Op::Relu => [if inputs[0] > 0.0 { 1.0 } else { 0.0 }, 0.0],

        // z = sigmoid(a): dz/da = z * (1 - z)
        Op::Sigmoid => [output * (1.0 - output), 0.0],

        // z = tanh(a): dz/da = 1 - z^2
        Op::Tanh => [1.0 - output * output, 0.0],
    }
}

// === Unary operations ===

impl Value {
    /// Raise to a constant power: self^exponent
    pub fn powf(&self, exponent: f64) -> Value {
        Value::from_op(Op::Pow { exponent }, vec![self.clone()])
    }

    /// Natural logarithm.
    ///
    /// Fails with [`GradError::Domain`] when `self` is not strictly positive;
    /// no node is created in that case.
    pub fn log(&self) -> Result<Value, GradError> {
        let value = self.value();
        if value <= 0.0 || value.is_nan() {
            return Err(GradError::Domain {
                operation: "log",
                value,
            });
        }
        Ok(Value::from_op(Op::Log, vec![self.clone()]))
    }

    /// Exponential: e^self
    pub fn exp(&self) -> Value {
        Value::from_op(Op::Exp, vec![self.clone()])
    }

    /// Sine (radians).
    pub fn sin(&self) -> Value {
        Value::from_op(Op::Sin, vec![self.clone()])
    }

    /// Cosine (radians).
    pub fn cos(&self) -> Value {
        Value::from_op(Op::Cos, vec![self.clone()])
    }

    /// Rectified linear unit: max(0, self)
    pub fn relu(&self) -> Value {
        Value::from_op(Op::Relu, vec![self.clone()])
    }

    /// Logistic sigmoid: 1 / (1 + e^-self)
    pub fn sigmoid(&self) -> Value {
        Value::from_op(Op::Sigmoid, vec![self.clone()])
    }

    /// Hyperbolic tangent.
    pub fn tanh(&self) -> Value {
        Value::from_op(Op::Tanh, vec![self.clone()])
    }
}

// === Operator overloads ===

impl std::ops::Neg for &Value {
    type Output = Value;

    fn neg(self) -> Value {
        Value::from_op(Op::Neg, vec![self.clone()])
    }
}

impl std::ops::Neg for Value {
    type Output = Value;

    fn neg(self) -> Value {
        Value::from_op(Op::Neg, vec![self])
    }
}

/// Implements a binary operator for every owned/borrowed combination of
/// `Value`, plus raw `f64` on either side (lifted to a constant leaf).
macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl std::ops::$trait<&Value> for &Value {
            type Output = Value;

            fn $method(self, rhs: &Value) -> Value {
                Value::from_op($op, vec![self.clone(), rhs.clone()])
            }
        }

        impl std::ops::$trait<Value> for &Value {
            type Output = Value;

            fn $method(self, rhs: Value) -> Value {
                Value::from_op($op, vec![self.clone(), rhs])
            }
        }

        impl std::ops::$trait<&Value> for Value {
            type Output = Value;

            fn $method(self, rhs: &Value) -> Value {
                Value::from_op($op, vec![self, rhs.clone()])
            }
        }

        impl std::ops::$trait<Value> for Value {
            type Output = Value;

            fn $method(self, rhs: Value) -> Value {
                Value::from_op($op, vec![self, rhs])
            }
        }

        impl std::ops::$trait<f64> for &Value {
            type Output = Value;

            fn $method(self, rhs: f64) -> Value {
                Value::from_op($op, vec![self.clone(), Value::constant(rhs)])
            }
        }

        impl std::ops::$trait<f64> for Value {
            type Output = Value;

            fn $method(self, rhs: f64) -> Value {
                Value::from_op($op, vec![self, Value::constant(rhs)])
            }
        }

        impl std::ops::$trait<&Value> for f64 {
            type Output = Value;

            fn $method(self, rhs: &Value) -> Value {
                Value::from_op($op, vec![Value::constant(self), rhs.clone()])
            }
        }

        impl std::ops::$trait<Value> for f64 {
            type Output = Value;

            fn $method(self, rhs: Value) -> Value {
                Value::from_op($op, vec![Value::constant(self), rhs])
            }
        }
    };
}

impl_binary_op!(Add, add, Op::Add);
impl_binary_op!(Sub, sub, Op::Sub);
impl_binary_op!(Mul, mul, Op::Mul);
impl_binary_op!(Div, div, Op::Div);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_forward_table() {
        assert_eq!(forward(Op::Add, &[2.0, 3.0]), 5.0);
        assert_eq!(forward(Op::Sub, &[2.0, 3.0]), -1.0);
        assert_eq!(forward(Op::Mul, &[2.0, 3.0]), 6.0);
        assert_eq!(forward(Op::Div, &[3.0, 2.0]), 1.5);
        assert_eq!(forward(Op::Relu, &[-1.0]), 0.0);
        assert_eq!(forward(Op::Relu, &[2.5]), 2.5);
        assert_eq!(forward(Op::Sigmoid, &[0.0]), 0.5);
        assert_abs_diff_eq!(forward(Op::Tanh, &[0.5]), 0.5_f64.tanh(), epsilon = 1e-15);
    }

    #[test]
    fn test_local_gradients_use_frozen_output() {
        // Sigmoid and tanh derive from the output alone.
        assert_eq!(local_gradients(Op::Sigmoid, &[123.0], 0.5), [0.25, 0.0]);
        assert_eq!(local_gradients(Op::Tanh, &[123.0], 0.5), [0.75, 0.0]);
        assert_eq!(local_gradients(Op::Exp, &[123.0], 2.0), [2.0, 0.0]);
    }

    #[test]
    fn test_relu_gradient_at_zero_is_zero() {
        assert_eq!(local_gradients(Op::Relu, &[0.0], 0.0), [0.0, 0.0]);
        assert_eq!(local_gradients(Op::Relu, &[1e-12], 1e-12), [1.0, 0.0]);
    }

    #[test]
    fn test_log_domain_error() {
        let x = Value::leaf(0.0);
        assert_eq!(
            x.log().unwrap_err(),
            GradError::Domain {
                operation: "log",
                value: 0.0
            }
        );
        let y = Value::leaf(-2.0);
        assert!(matches!(y.log(), Err(GradError::Domain { .. })));
        assert!(Value::leaf(f64::NAN).log().is_err());
    }

    #[test]
    fn test_raw_number_lifting() {
        let a = Value::leaf(4.0);
        assert_eq!((&a + 1.0).value(), 5.0);
        assert_eq!((1.0 - &a).value(), -3.0);
        assert_eq!((&a * 0.5).value(), 2.0);
        assert_eq!((2.0 / &a).value(), 0.5);

        let lifted = &a * 3.0;
        assert!(lifted.operands()[1].is_constant());
        assert_eq!(lifted.operands()[1].value(), 3.0);
    }

    #[test]
    fn test_neg() {
        let a = Value::leaf(4.0);
        let n = -&a;
        assert_eq!(n.value(), -4.0);
        assert_eq!(n.op(), Op::Neg);
    }
}
