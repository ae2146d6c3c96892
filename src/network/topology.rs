//! Descriptions of a network's shape and per-layer configuration.

use num_traits::Float;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::Error;
use crate::activation::Activation;
use crate::cost::Cost;
use crate::learning::Learning;

/// The configuration of one layer in a [`Topology`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(deserialize = "T: Deserialize<'de>"))
)]
pub struct LayerSpec<T: Float> {
    /// The number of neurons, which is also the layer's output length.
    pub neurons: usize,
    /// The activation function of every neuron in the layer.
    pub activation: Activation,
    /// The probability of each neuron being dropped during a training pass, in `[0, 1)`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub dropout: f64,
    /// The learning rule of every neuron in the layer.
    #[cfg_attr(feature = "serde", serde(default))]
    pub learning: Learning<T>,
}

impl<T: Float> LayerSpec<T> {
    /// Returns a layer of `neurons` neurons with no dropout and the default learning rule.
    pub fn new(neurons: usize, activation: Activation) -> Self {
        Self {
            neurons,
            activation,
            dropout: 0.0,
            learning: Learning::default(),
        }
    }

    /// Sets the dropout rate.
    pub fn dropout(mut self, rate: f64) -> Self {
        self.dropout = rate;
        self
    }

    /// Sets the learning rule.
    pub fn learning(mut self, learning: Learning<T>) -> Self {
        self.learning = learning;
        self
    }
}

/// The shape of a network: its input size, cost function and ordered layers.
///
/// # Examples
///
/// ```
/// use mlp::{Activation, Cost, LayerSpec, Learning, Topology};
///
/// let topology = Topology::<f64>::new(2, Cost::Quadratic)
///     .with_layer(LayerSpec::new(2, Activation::Sigmoid))
///     .with_layer(LayerSpec::new(1, Activation::Sigmoid).learning(Learning::resilient()));
///
/// assert_eq!(&[2, 2, 1], topology.sizes().as_slice());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(deserialize = "T: Deserialize<'de>"))
)]
pub struct Topology<T: Float> {
    inputs: usize,
    #[cfg_attr(feature = "serde", serde(default))]
    cost: Cost,
    layers: Vec<LayerSpec<T>>,
}

impl<T: Float> Topology<T> {
    /// Returns a topology with no layers.
    pub fn new(inputs: usize, cost: Cost) -> Self {
        Self {
            inputs,
            cost,
            layers: Vec::new(),
        }
    }

    /// Appends a layer.
    pub fn with_layer(mut self, layer: LayerSpec<T>) -> Self {
        self.push(layer);
        self
    }

    /// Appends a layer.
    pub fn push(&mut self, layer: LayerSpec<T>) {
        self.layers.push(layer);
    }

    /// Returns the input size.
    pub fn inputs(&self) -> usize {
        self.inputs
    }

    /// Returns the cost function.
    pub fn cost(&self) -> Cost {
        self.cost
    }

    /// Returns the layers.
    pub fn layers(&self) -> &[LayerSpec<T>] {
        &self.layers
    }

    /// Returns the input size followed by every layer's neuron count.
    pub fn sizes(&self) -> Vec<usize> {
        Some(self.inputs)
            .into_iter()
            .chain(self.layers.iter().map(|layer| layer.neurons))
            .collect()
    }

    /// Checks that a network can be built from this topology.
    pub fn validate(&self) -> Result<(), Error> {
        if self.layers.is_empty() {
            return Err(Error::EmptyTopology);
        }

        if self.inputs == 0 {
            return Err(Error::ZeroInputs);
        }

        for (i, layer) in self.layers.iter().enumerate() {
            if layer.neurons == 0 {
                return Err(Error::EmptyLayer(i));
            }

            // Also rejects NaN
            if !(0.0..1.0).contains(&layer.dropout) {
                return Err(Error::InvalidDropout(i));
            }

            if !layer.learning.has_valid_bounds() {
                return Err(Error::InvalidStepBounds(i));
            }
        }

        Ok(())
    }
}
