//! Multi-layer perceptron: an ordered stack of layers.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sgrad_core::{GradError, Value};

use crate::activations::Activation;
use crate::config::{validate_layer_sizes, NetworkConfig};
use crate::init::Init;
use crate::layers::Layer;

/// Current value and gradient of one parameter, for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterState {
    pub name: String,
    pub value: f64,
    pub gradient: f64,
}

/// A feed-forward network of fully connected layers.
///
/// Besides the layers, the network remembers the input and per-layer
/// activations of its most recent forward pass for introspection. That state
/// plays no part in the math.
#[derive(Debug)]
pub struct Mlp {
    layers: Vec<Layer>,
    last_input: Option<Vec<f64>>,
    last_activations: Option<Vec<Vec<f64>>>,
}

impl Mlp {
    /// Build a network from a configuration.
    ///
    /// Uses a seeded `StdRng` when `config.seed` is set, so the same
    /// configuration always yields the same initial weights.
    pub fn new(config: &NetworkConfig) -> Result<Self, GradError> {
        let activations = config.activations()?;
        match config.seed {
            Some(seed) => {
                let mut rng = StdRng::seed_from_u64(seed);
                Mlp::with_rng(&config.layer_sizes, &activations, config.init, &mut rng)
            }
            None => Mlp::with_rng(
                &config.layer_sizes,
                &activations,
                config.init,
                &mut rand::thread_rng(),
            ),
        }
    }

    /// Build a network with one activation per non-input layer.
    ///
    /// `layer_sizes` starts with the input width. Fails with `InvalidTopology`
    /// when fewer than two widths are given, a width is zero, or the number of
    /// activations is not `layer_sizes.len() - 1`.
    pub fn with_rng<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        activations: &[Activation],
        init: Init,
        rng: &mut R,
    ) -> Result<Self, GradError> {
        validate_layer_sizes(layer_sizes)?;
        if activations.len() != layer_sizes.len() - 1 {
            return Err(GradError::topology(format!(
                "expected {} activations for layer widths {:?}, got {}",
                layer_sizes.len() - 1,
                layer_sizes,
                activations.len()
            )));
        }

        let layers = layer_sizes
            .windows(2)
            .zip(activations)
            .map(|(pair, &activation)| Layer::new(pair[0], pair[1], activation, init, &mut *rng))
            .collect::<Result<Vec<_>, _>>()?;

        let mlp = Mlp::from_layers(layers)?;
        debug!(
            "built mlp {:?} with {} parameters",
            mlp.layer_sizes(),
            mlp.num_parameters()
        );
        Ok(mlp)
    }

    /// Assemble a network from existing layers.
    ///
    /// Layer `i`'s output width must equal layer `i + 1`'s input width.
    pub fn from_layers(layers: Vec<Layer>) -> Result<Self, GradError> {
        if layers.is_empty() {
            return Err(GradError::topology("a network needs at least one layer"));
        }
        for (i, pair) in layers.windows(2).enumerate() {
            if pair[0].n_outputs() != pair[1].n_inputs() {
                return Err(GradError::topology(format!(
                    "layer {} produces {} outputs but layer {} expects {} inputs",
                    i,
                    pair[0].n_outputs(),
                    i + 1,
                    pair[1].n_inputs()
                )));
            }
        }
        Ok(Mlp {
            layers,
            last_input: None,
            last_activations: None,
        })
    }

    /// Run `inputs` through every layer and return the final layer's outputs.
    ///
    /// Records the input and every layer's activation values for
    /// [`Mlp::activations`].
    pub fn forward(&mut self, inputs: &[Value]) -> Result<Vec<Value>, GradError> {
        let expected = self.n_inputs();
        if inputs.len() != expected {
            return Err(GradError::DimensionMismatch {
                expected,
                actual: inputs.len(),
            });
        }

        let input_values: Vec<f64> = inputs.iter().map(Value::value).collect();
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        activations.push(input_values.clone());

        let mut current = inputs.to_vec();
        for layer in &self.layers {
            current = layer.forward(&current)?;
            activations.push(current.iter().map(Value::value).collect());
        }

        self.last_input = Some(input_values);
        self.last_activations = Some(activations);
        Ok(current)
    }

    /// Forward pass on raw numbers, each lifted to a fresh leaf.
    pub fn forward_scalar(&mut self, inputs: &[f64]) -> Result<Vec<Value>, GradError> {
        let leaves: Vec<Value> = inputs.iter().map(|&x| Value::leaf(x)).collect();
        self.forward(&leaves)
    }

    /// Forward pass for networks with a single output.
    ///
    /// Fails with `DimensionMismatch` when the output layer is wider than one.
    pub fn forward_one(&mut self, inputs: &[Value]) -> Result<Value, GradError> {
        let n_outputs = self.n_outputs();
        if n_outputs != 1 {
            return Err(GradError::DimensionMismatch {
                expected: 1,
                actual: n_outputs,
            });
        }
        let mut outputs = self.forward(inputs)?;
        outputs
            .pop()
            .ok_or_else(|| GradError::state("network produced no output"))
    }

    /// Every weight and bias: layer order, then neuron order, then weight
    /// index, with each neuron's bias last.
    pub fn parameters(&self) -> Vec<Value> {
        self.layers.iter().flat_map(Layer::parameters).collect()
    }

    /// [`Mlp::parameters`] paired with names like `layer0.neuron1.w2` and
    /// `layer0.neuron1.bias`, in the same order.
    pub fn named_parameters(&self) -> Vec<(String, Value)> {
        let mut named = Vec::with_capacity(self.num_parameters());
        for (i, layer) in self.layers.iter().enumerate() {
            for (j, neuron) in layer.neurons().iter().enumerate() {
                for (k, w) in neuron.weights().iter().enumerate() {
                    named.push((format!("layer{}.neuron{}.w{}", i, j, k), w.clone()));
                }
                named.push((format!("layer{}.neuron{}.bias", i, j), neuron.bias().clone()));
            }
        }
        named
    }

    pub fn parameter_states(&self) -> Vec<ParameterState> {
        self.named_parameters()
            .into_iter()
            .map(|(name, p)| ParameterState {
                name,
                value: p.value(),
                gradient: p.grad(),
            })
            .collect()
    }

    /// Reset the gradient of every parameter to zero.
    ///
    /// Call before each backward pass whose gradients feed an update;
    /// otherwise gradients from earlier passes are added in.
    pub fn zero_gradients(&self) {
        for p in self.parameters() {
            p.zero_grad();
        }
    }

    /// Activation values from the most recent forward pass.
    ///
    /// Entry 0 is the input; entry `i + 1` holds layer `i`'s outputs. Fails
    /// with `State` before any forward pass.
    pub fn activations(&self) -> Result<&[Vec<f64>], GradError> {
        self.last_activations
            .as_deref()
            .ok_or_else(|| GradError::state("activations requested before any forward pass"))
    }

    /// Input of the most recent forward pass.
    pub fn last_input(&self) -> Result<&[f64], GradError> {
        self.last_input
            .as_deref()
            .ok_or_else(|| GradError::state("input requested before any forward pass"))
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Input width followed by every layer's width.
    pub fn layer_sizes(&self) -> Vec<usize> {
        std::iter::once(self.n_inputs())
            .chain(self.layers.iter().map(Layer::n_outputs))
            .collect()
    }

    pub fn n_inputs(&self) -> usize {
        self.layers[0].n_inputs()
    }

    pub fn n_outputs(&self) -> usize {
        self.layers[self.layers.len() - 1].n_outputs()
    }

    pub fn num_parameters(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.n_outputs() * (l.n_inputs() + 1))
            .sum()
    }
}
