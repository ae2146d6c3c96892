//! A feed-forward multilayer perceptron. The [`Network`] struct has methods for predicting outputs,
//! training on single examples, and saving to and loading from files.
//!
//! Each layer is fully connected to the one before it. Neurons are trained with either momentum
//! gradient descent or a sign-based adaptive step rule (see [`Learning`]), and each layer may drop
//! a random subset of its neurons during training.
//!
//! # Examples
//!
//! ```
//! use mlp::{Activation, Cost, LayerSpec, Network, Topology};
//!
//! let topology = Topology::new(2, Cost::Quadratic)
//!     .with_layer(LayerSpec::new(4, Activation::Tanh))
//!     .with_layer(LayerSpec::new(1, Activation::Sigmoid));
//! let mut network = Network::new(topology).unwrap();
//!
//! // Train on a single example
//! let loss = network.train(&[1.0, 0.0], &[1.0]).unwrap();
//!
//! // Get the output of the network with the specified inputs
//! let result = network.predict(&[1.0, 0.0]).unwrap();
//! ```
//!
//! Networks can be saved to and loaded from JSON with the `json` feature:
//!
//! ```no_run
//! use mlp::Network;
//!
//! let mut network = Network::<f64>::load_file("xor.json").unwrap();
//! network.train(&[0.0, 1.0], &[1.0]).unwrap();
//! network.to_file("xor.json", false).unwrap();
//! ```
//!
//! Diagnostic events are emitted with [`tracing`] and routed to the [`Diagnostics`] handle each
//! network carries.

pub mod activation;
mod arena;
pub mod cost;
pub mod diagnostics;
#[cfg(feature = "serde")]
pub mod encoding;
pub mod layer;
pub mod learning;
pub mod network;
pub mod neuron;
mod utils;

pub use activation::Activation;
pub use arena::BufferId;
pub use cost::Cost;
pub use diagnostics::Diagnostics;
pub use layer::Layer;
pub use learning::{Learning, LearningRule};
pub use network::{DimensionMismatch, LayerSpec, Network, Signal, Topology};
pub use neuron::Neuron;
