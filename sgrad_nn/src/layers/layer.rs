//! A layer of independent neurons sharing the same inputs.

use rand::Rng;
use sgrad_core::{GradError, Value};

use crate::activations::Activation;
use crate::init::Init;
use crate::layers::Neuron;

#[derive(Debug)]
pub struct Layer {
    neurons: Vec<Neuron>,
    n_inputs: usize,
}

impl Layer {
    /// Create `n_outputs` neurons, each taking `n_inputs` inputs.
    pub fn new<R: Rng + ?Sized>(
        n_inputs: usize,
        n_outputs: usize,
        activation: Activation,
        init: Init,
        rng: &mut R,
    ) -> Result<Self, GradError> {
        if n_inputs == 0 || n_outputs == 0 {
            return Err(GradError::topology(format!(
                "layer widths must be non-zero (got {} -> {})",
                n_inputs, n_outputs
            )));
        }
        let neurons = (0..n_outputs)
            .map(|_| Neuron::new(n_inputs, n_outputs, activation, init, &mut *rng))
            .collect();
        Ok(Layer { neurons, n_inputs })
    }

    /// Assemble a layer from existing neurons, which must agree on their input arity.
    pub fn from_neurons(neurons: Vec<Neuron>) -> Result<Self, GradError> {
        let n_inputs = match neurons.first() {
            Some(n) => n.n_inputs(),
            None => return Err(GradError::topology("a layer needs at least one neuron")),
        };
        if let Some(bad) = neurons.iter().find(|n| n.n_inputs() != n_inputs) {
            return Err(GradError::topology(format!(
                "neurons in one layer must share input width: {} vs {}",
                n_inputs,
                bad.n_inputs()
            )));
        }
        Ok(Layer { neurons, n_inputs })
    }

    /// Feed the same `inputs` to every neuron; one output per neuron.
    pub fn forward(&self, inputs: &[Value]) -> Result<Vec<Value>, GradError> {
        if inputs.len() != self.n_inputs {
            return Err(GradError::DimensionMismatch {
                expected: self.n_inputs,
                actual: inputs.len(),
            });
        }
        self.neurons.iter().map(|n| n.forward(inputs)).collect()
    }

    pub fn n_inputs(&self) -> usize {
        self.n_inputs
    }

    pub fn n_outputs(&self) -> usize {
        self.neurons.len()
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    /// Parameters neuron by neuron, each neuron's weights then its bias.
    pub fn parameters(&self) -> Vec<Value> {
        self.neurons.iter().flat_map(Neuron::parameters).collect()
    }
}
