//! The training loop.
//!
//! Every sample goes through the same fixed sequence:
//! zero gradients, forward, compose loss, backward, update. The graph built
//! for a sample is dropped at the end of its step.

use log::{info, warn};
use sgrad_core::Value;

use crate::config::TrainConfig;
use crate::error::NnError;
use crate::mlp::Mlp;
use crate::optim::Sgd;

/// One `(input, target)` pair from a dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub input: f64,
    pub target: f64,
}

impl Sample {
    pub fn new(input: f64, target: f64) -> Self {
        Sample { input, target }
    }
}

impl From<(f64, f64)> for Sample {
    fn from((input, target): (f64, f64)) -> Self {
        Sample { input, target }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochReport {
    /// Zero-based index of the epoch.
    pub epoch: usize,
    pub mean_loss: f64,
}

/// Trains a single-input, single-output [`Mlp`] with [`Sgd`].
#[derive(Debug)]
pub struct Trainer {
    network: Mlp,
    optimizer: Sgd,
    config: TrainConfig,
    params: Vec<Value>,
    epochs_run: usize,
}

impl Trainer {
    pub fn new(network: Mlp, config: TrainConfig) -> Result<Self, NnError> {
        config.validate()?;
        if network.n_inputs() != 1 || network.n_outputs() != 1 {
            return Err(NnError::InvalidConfig(format!(
                "trainer expects one input and one output, network is {:?}",
                network.layer_sizes()
            )));
        }
        let optimizer = Sgd::with_momentum(config.learning_rate, config.momentum);
        let params = network.parameters();
        Ok(Trainer {
            network,
            optimizer,
            config,
            params,
            epochs_run: 0,
        })
    }

    /// Run one sample through the full update sequence and return its loss.
    ///
    /// A non-finite loss stops the step before the update and is returned as
    /// [`NnError::NonFiniteLoss`]; the parameters keep their previous values.
    pub fn train_step(&mut self, sample: &Sample) -> Result<f64, NnError> {
        self.network.zero_gradients();

        let prediction = self.network.forward_one(&[Value::leaf(sample.input)])?;
        let loss = self.config.loss.compose(&prediction, sample.target);

        let value = loss.value();
        if !value.is_finite() {
            warn!(
                "non-finite loss {} at input {} (target {}), skipping update",
                value, sample.input, sample.target
            );
            return Err(NnError::NonFiniteLoss {
                input: sample.input,
                target: sample.target,
                loss: value,
            });
        }

        loss.backward();
        self.optimizer.step(&self.params);
        Ok(value)
    }

    /// One pass over `samples` in order. An empty slice reports a mean loss of 0.
    pub fn train_epoch(&mut self, samples: &[Sample]) -> Result<EpochReport, NnError> {
        let mut total = 0.0;
        for sample in samples {
            total += self.train_step(sample)?;
        }
        let report = EpochReport {
            epoch: self.epochs_run,
            mean_loss: mean(total, samples.len()),
        };
        self.epochs_run += 1;
        info!("epoch {:4}: mean loss = {:.6}", report.epoch, report.mean_loss);
        Ok(report)
    }

    /// Run `config.epochs` epochs over `samples`.
    pub fn fit(&mut self, samples: &[Sample]) -> Result<Vec<EpochReport>, NnError> {
        (0..self.config.epochs)
            .map(|_| self.train_epoch(samples))
            .collect()
    }

    /// Mean loss over `samples` without touching gradients or parameters.
    pub fn evaluate(&mut self, samples: &[Sample]) -> Result<f64, NnError> {
        let mut total = 0.0;
        for sample in samples {
            let prediction = self.predict(sample.input)?;
            total += self
                .config
                .loss
                .compose(&Value::leaf(prediction), sample.target)
                .value();
        }
        Ok(mean(total, samples.len()))
    }

    pub fn predict(&mut self, input: f64) -> Result<f64, NnError> {
        Ok(self.network.forward_one(&[Value::leaf(input)])?.value())
    }

    pub fn network(&self) -> &Mlp {
        &self.network
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn epochs_run(&self) -> usize {
        self.epochs_run
    }

    pub fn into_network(self) -> Mlp {
        self.network
    }
}

fn mean(total: f64, n: usize) -> f64 {
    if n == 0 {
        0.0
    } else {
        total / n as f64
    }
}
