//! Network building blocks.

mod layer;
mod neuron;

pub use layer::Layer;
pub use neuron::Neuron;
