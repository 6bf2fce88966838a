//! # sgrad_nn - Neural network building blocks for sgrad_core
//!
//! This crate builds small multi-layer perceptrons out of scalar
//! [`sgrad_core::Value`] nodes:
//!
//! - **Layers**: [`Neuron`], [`Layer`], [`Mlp`]
//! - **Activations**: Linear, ReLU, Sigmoid, Tanh
//! - **Losses**: squared error, absolute error
//! - **Optimizers**: SGD (with momentum)
//! - **Training**: [`Trainer`] runs zero-grad, forward, loss, backward and update per sample
//!
//! ## Example: fitting a line
//!
//! ```
//! use sgrad_nn::{Activation, Mlp, NetworkConfig, Sample, TrainConfig, Trainer};
//!
//! let config = NetworkConfig::builder()
//!     .layer_sizes([1, 4, 1])
//!     .hidden_activation(Activation::Tanh)
//!     .seed(7)
//!     .build()
//!     .unwrap();
//! let network = Mlp::new(&config).unwrap();
//!
//! let data: Vec<Sample> = (0..10)
//!     .map(|i| Sample::new(i as f64 / 10.0, 0.5 * i as f64 / 10.0))
//!     .collect();
//!
//! let mut trainer = Trainer::new(
//!     network,
//!     TrainConfig { learning_rate: 0.05, epochs: 50, ..TrainConfig::default() },
//! )
//! .unwrap();
//! let reports = trainer.fit(&data).unwrap();
//! assert_eq!(reports.len(), 50);
//! let y = trainer.predict(0.5).unwrap();
//! assert!(y.is_finite());
//! ```

pub mod activations;
pub mod config;
pub mod error;
pub mod init;
pub mod layers;
pub mod loss;
pub mod mlp;
pub mod optim;
pub mod train;

// Re-exports for convenience
pub use activations::Activation;
pub use config::{NetworkConfig, NetworkConfigBuilder, TrainConfig};
pub use error::NnError;
pub use init::Init;
pub use layers::{Layer, Neuron};
pub use loss::{mae_loss, mse_loss, LossKind};
pub use mlp::{Mlp, ParameterState};
pub use optim::Sgd;
pub use train::{EpochReport, Sample, Trainer};
