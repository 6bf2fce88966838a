//! Network and training configuration.
//!
//! [`NetworkConfig`] describes the shape of an [`crate::Mlp`]; build it with
//! [`NetworkConfig::builder`], which validates the topology up front.
//! [`TrainConfig`] holds the knobs for [`crate::Trainer`].

use sgrad_core::GradError;

use crate::activations::Activation;
use crate::error::NnError;
use crate::init::Init;
use crate::loss::LossKind;

/// Shape and initialization of a multi-layer perceptron.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkConfig {
    /// Input width followed by every layer's width, e.g. `[1, 8, 8, 1]`.
    pub layer_sizes: Vec<usize>,
    /// Activation for every layer except the last.
    pub hidden_activation: Activation,
    /// Activation for the output layer.
    pub output_activation: Activation,
    pub init: Init,
    /// Seed for reproducible initial weights; `None` draws from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            layer_sizes: vec![1, 8, 8, 1],
            hidden_activation: Activation::Tanh,
            output_activation: Activation::Linear,
            init: Init::Xavier,
            seed: None,
        }
    }
}

impl NetworkConfig {
    pub fn builder() -> NetworkConfigBuilder {
        NetworkConfigBuilder::default()
    }

    /// Check that the widths describe a usable network.
    pub fn validate(&self) -> Result<(), GradError> {
        validate_layer_sizes(&self.layer_sizes)
    }

    /// One activation per non-input layer: hidden layers first, then the output layer.
    pub fn activations(&self) -> Result<Vec<Activation>, GradError> {
        self.validate()?;
        let n_layers = self.layer_sizes.len() - 1;
        let mut activations = vec![self.hidden_activation; n_layers - 1];
        activations.push(self.output_activation);
        Ok(activations)
    }
}

/// Consuming builder for [`NetworkConfig`].
#[derive(Debug, Clone, Default)]
pub struct NetworkConfigBuilder {
    config: NetworkConfig,
}

impl NetworkConfigBuilder {
    pub fn layer_sizes(mut self, sizes: impl Into<Vec<usize>>) -> Self {
        self.config.layer_sizes = sizes.into();
        self
    }

    pub fn hidden_activation(mut self, activation: Activation) -> Self {
        self.config.hidden_activation = activation;
        self
    }

    pub fn output_activation(mut self, activation: Activation) -> Self {
        self.config.output_activation = activation;
        self
    }

    pub fn init(mut self, init: Init) -> Self {
        self.config.init = init;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<NetworkConfig, GradError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Require at least an input and an output width, none of them zero.
pub(crate) fn validate_layer_sizes(sizes: &[usize]) -> Result<(), GradError> {
    if sizes.len() < 2 {
        return Err(GradError::topology(format!(
            "need at least two layer widths (input and output), got {:?}",
            sizes
        )));
    }
    if let Some(i) = sizes.iter().position(|&w| w == 0) {
        return Err(GradError::topology(format!(
            "layer width at position {} is zero in {:?}",
            i, sizes
        )));
    }
    Ok(())
}

/// Optimizer and loop settings for [`crate::Trainer`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    pub learning_rate: f64,
    /// 0.0 gives plain gradient descent.
    pub momentum: f64,
    pub epochs: usize,
    pub loss: LossKind,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            learning_rate: 0.01,
            momentum: 0.0,
            epochs: 100,
            loss: LossKind::MeanSquaredError,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<(), NnError> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(NnError::InvalidConfig(format!(
                "learning rate must be positive and finite, got {}",
                self.learning_rate
            )));
        }
        if !(0.0..1.0).contains(&self.momentum) {
            return Err(NnError::InvalidConfig(format!(
                "momentum must be in [0, 1), got {}",
                self.momentum
            )));
        }
        Ok(())
    }
}
