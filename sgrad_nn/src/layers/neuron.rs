//! A single neuron: activation(sum(w_i * x_i) + b).

use rand::Rng;
use sgrad_core::{GradError, Value};

use crate::activations::Activation;
use crate::init::Init;

/// Owns one weight per input, a bias, and an activation tag.
///
/// Weights and bias are leaves created once and updated in place by the
/// training loop; every `forward` call builds fresh nodes on top of them.
#[derive(Debug)]
pub struct Neuron {
    weights: Vec<Value>,
    bias: Value,
    activation: Activation,
}

impl Neuron {
    /// Create a neuron with `n_inputs` weights drawn from `init` and a zero bias.
    pub fn new<R: Rng + ?Sized>(
        n_inputs: usize,
        fan_out: usize,
        activation: Activation,
        init: Init,
        rng: &mut R,
    ) -> Self {
        let values = init.sample(rng, n_inputs, fan_out, n_inputs);
        Neuron::from_parameters(values, 0.0, activation)
    }

    /// Create a neuron from fixed parameter values.
    pub fn from_parameters(weights: Vec<f64>, bias: f64, activation: Activation) -> Self {
        Neuron {
            weights: weights.into_iter().map(Value::leaf).collect(),
            bias: Value::leaf(bias),
            activation,
        }
    }

    /// Forward pass over `inputs`, one per weight.
    ///
    /// Fails with `DimensionMismatch` before building anything when the arity is wrong.
    pub fn forward(&self, inputs: &[Value]) -> Result<Value, GradError> {
        if inputs.len() != self.weights.len() {
            return Err(GradError::DimensionMismatch {
                expected: self.weights.len(),
                actual: inputs.len(),
            });
        }

        let weighted = self
            .weights
            .iter()
            .zip(inputs)
            .map(|(w, x)| w * x)
            .reduce(|acc, term| acc + term);

        let pre_activation = match weighted {
            Some(sum) => sum + &self.bias,
            None => self.bias.clone(),
        };

        Ok(self.activation.apply(&pre_activation))
    }

    pub fn n_inputs(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[Value] {
        &self.weights
    }

    pub fn bias(&self) -> &Value {
        &self.bias
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Weights in index order, then the bias.
    pub fn parameters(&self) -> Vec<Value> {
        let mut params = self.weights.clone();
        params.push(self.bias.clone());
        params
    }
}
