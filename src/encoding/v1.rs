//! Version one of the encoding.

use num_traits::Float;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{EncodingVersion, Error, PortableNetwork};
use crate::activation::Activation;
use crate::cost::Cost;
use crate::diagnostics::Diagnostics;
use crate::layer::Layer;
use crate::learning::{self, Learning, LearningRule};
use crate::network::{LayerSpec, Network, Topology};
use crate::neuron::Neuron;
use crate::utils::constant;

/// A type for encoding a [`Network`][crate::Network] in version one of the format.
///
/// Registry tags are stored as strings so that documents written by other tools, or with
/// misspelled tags, still load. An unknown tag resolves to the registry default and a warning is
/// emitted.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Data<T: Float> {
    pub inputs: usize,
    #[serde(default = "default_cost")]
    pub cost: String,
    pub layers: Vec<LayerData<T>>,
}

/// A layer of a version one [`Data`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct LayerData<T: Float> {
    #[serde(default = "default_activation")]
    pub activation: String,
    #[serde(default)]
    pub dropout: f64,
    #[serde(default)]
    pub learning: LearningData<T>,
    pub neurons: Vec<NeuronData<T>>,
}

/// The learning rule of a layer. Parameters that are missing take their default values.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LearningData<T: Float> {
    #[serde(default = "default_rule")]
    pub rule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_rate: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub momentum: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta_plus: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta_minus: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta_max: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta_min: Option<T>,
}

/// A neuron of a version one [`Data`]. `weights` are positional, one per layer input.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NeuronData<T: Float> {
    #[serde(default = "T::zero")]
    pub bias: T,
    pub weights: Vec<T>,
}

fn default_cost() -> String {
    Cost::default().tag().to_string()
}

fn default_activation() -> String {
    Activation::default().tag().to_string()
}

fn default_rule() -> String {
    LearningRule::default().tag().to_string()
}

impl<T: Float> Default for LearningData<T> {
    fn default() -> Self {
        Self {
            rule: default_rule(),
            learning_rate: None,
            momentum: None,
            eta_plus: None,
            eta_minus: None,
            delta_max: None,
            delta_min: None,
        }
    }
}

impl<T: Float> From<Learning<T>> for LearningData<T> {
    fn from(learning: Learning<T>) -> Self {
        let rule = learning.rule().tag().to_string();
        match learning {
            Learning::Momentum {
                learning_rate,
                momentum,
            } => Self {
                rule,
                learning_rate: Some(learning_rate),
                momentum: Some(momentum),
                ..Default::default()
            },
            Learning::Resilient {
                eta_plus,
                eta_minus,
                delta_max,
                delta_min,
            } => Self {
                rule,
                eta_plus: Some(eta_plus),
                eta_minus: Some(eta_minus),
                delta_max: Some(delta_max),
                delta_min: Some(delta_min),
                ..Default::default()
            },
        }
    }
}

impl<T: Float> LearningData<T> {
    fn resolve(&self, layer: usize, diagnostics: &Diagnostics) -> Learning<T> {
        let rule = LearningRule::from_tag(&self.rule).unwrap_or_else(|| {
            let fallback = LearningRule::default();
            diagnostics.emit(|| {
                warn!(
                    layer,
                    tag = %self.rule,
                    fallback = fallback.tag(),
                    "unknown learning rule"
                )
            });
            fallback
        });
        let or_default = |value: Option<T>, default: f64| value.unwrap_or_else(|| constant(default));

        match rule {
            LearningRule::Momentum => Learning::Momentum {
                learning_rate: or_default(self.learning_rate, learning::DEFAULT_LEARNING_RATE),
                momentum: or_default(self.momentum, learning::DEFAULT_MOMENTUM),
            },
            LearningRule::Resilient => Learning::Resilient {
                eta_plus: or_default(self.eta_plus, learning::DEFAULT_ETA_PLUS),
                eta_minus: or_default(self.eta_minus, learning::DEFAULT_ETA_MINUS),
                delta_max: or_default(self.delta_max, learning::DEFAULT_DELTA_MAX),
                delta_min: or_default(self.delta_min, learning::DEFAULT_DELTA_MIN),
            },
        }
    }
}

impl<T: Float> LayerData<T> {
    fn new(layer: &Layer<T>) -> Self {
        Self {
            activation: layer.activation().tag().to_string(),
            dropout: layer.dropout(),
            learning: layer.learning().into(),
            neurons: layer
                .neurons()
                .iter()
                .map(|neuron| NeuronData {
                    bias: neuron.bias(),
                    weights: neuron.weights().to_vec(),
                })
                .collect(),
        }
    }

    fn resolve_activation(&self, layer: usize, diagnostics: &Diagnostics) -> Activation {
        Activation::from_tag(&self.activation).unwrap_or_else(|| {
            let fallback = Activation::default();
            diagnostics.emit(|| {
                warn!(
                    layer,
                    tag = %self.activation,
                    fallback = fallback.tag(),
                    "unknown activation function"
                )
            });
            fallback
        })
    }
}

impl<T: Float> EncodingVersion<T> for Data<T> {
    fn new(network: &Network<T>) -> PortableNetwork<T> {
        Self {
            inputs: network.num_inputs(),
            cost: network.cost().tag().to_string(),
            layers: network.layers().iter().map(LayerData::new).collect(),
        }
        .into()
    }

    fn build(self, diagnostics: &Diagnostics) -> Result<Network<T>, Error> {
        let cost = Cost::from_tag(&self.cost).unwrap_or_else(|| {
            let fallback = Cost::default();
            diagnostics.emit(|| {
                warn!(tag = %self.cost, fallback = fallback.tag(), "unknown cost function")
            });
            fallback
        });

        let mut topology = Topology::new(self.inputs, cost);
        for (i, layer) in self.layers.iter().enumerate() {
            topology.push(LayerSpec {
                neurons: layer.neurons.len(),
                activation: layer.resolve_activation(i, diagnostics),
                dropout: layer.dropout,
                learning: layer.learning.resolve(i, diagnostics),
            });
        }
        topology.validate()?;

        let mut expected = self.inputs;
        let mut neurons = Vec::with_capacity(self.layers.len());
        for (i, (layer, spec)) in self.layers.into_iter().zip(topology.layers()).enumerate() {
            let mut built = Vec::with_capacity(layer.neurons.len());
            for (j, neuron) in layer.neurons.into_iter().enumerate() {
                if neuron.weights.len() != expected {
                    return Err(Error::WeightCount {
                        layer: i,
                        neuron: j,
                        expected,
                        actual: neuron.weights.len(),
                    });
                }

                built.push(Neuron::new(
                    neuron.weights,
                    neuron.bias,
                    spec.activation,
                    spec.learning,
                ));
            }

            neurons.push(built);
            expected = spec.neurons;
        }

        diagnostics.emit(|| debug!(version = "1", "loaded network"));

        Ok(Network::from_neurons(
            topology,
            neurons,
            StdRng::from_entropy(),
            diagnostics.clone(),
        ))
    }
}
