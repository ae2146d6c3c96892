//! The neural network struct.

mod error;
mod topology;

pub use error::{DimensionMismatch, Error, Signal};
pub use topology::{LayerSpec, Topology};

use num_traits::Float;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "json")]
use serde::de::DeserializeOwned;
#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[cfg(feature = "json")]
use std::path::Path;

use crate::arena::{Arena, BufferId};
use crate::cost::Cost;
use crate::diagnostics::Diagnostics;
#[cfg(feature = "serde")]
use crate::encoding::{self, EncodingVersion, PortableNetwork};
use crate::layer::Layer;
use crate::neuron::Neuron;
use crate::utils::to_f64;

// NOTE: All `Network` objects must be fully valid, and all methods assume this to be true
//       Layer `k` reads buffer `k` and writes buffer `k + 1` of the arena, so the layers and the
//       arena must always be built together from the same topology
/// A feed-forward network of fully connected layers.
///
/// # Examples
///
/// ```
/// use mlp::{Activation, Cost, LayerSpec, Network, Topology};
///
/// let topology = Topology::new(2, Cost::Quadratic)
///     .with_layer(LayerSpec::new(3, Activation::Tanh))
///     .with_layer(LayerSpec::new(1, Activation::Sigmoid));
/// let mut network = Network::new(topology).unwrap();
///
/// let loss = network.train(&[1.0, 0.0], &[1.0]).unwrap();
/// let prediction = network.predict(&[1.0, 0.0]).unwrap();
///
/// assert!(loss >= 0.0);
/// assert_eq!(1, prediction.len());
/// ```
#[derive(Clone, Debug)]
pub struct Network<T: Float = f64> {
    // The shape the network was built from, with all registry tags resolved
    topology: Topology<T>,
    // The layers, in evaluation order
    layers: Vec<Layer<T>>,
    // Every signal and error buffer shared between the layers
    arena: Arena<T>,
    // Draws the dropout masks of training passes
    rng: StdRng,
    diagnostics: Diagnostics,
}

impl<T: Float> Network<T> {
    /// Builds a network from `topology`, drawing its initial weights from the thread-local random
    /// number generator. Diagnostics go to the calling thread's default dispatcher; see
    /// [`with_diagnostics`][Self::with_diagnostics] to choose them.
    pub fn new(topology: Topology<T>) -> Result<Self, Error> {
        Self::with_rng(topology, &mut rand::thread_rng())
    }

    /// Builds a network from `topology`, drawing its initial weights from `rng`. Diagnostics go to
    /// the calling thread's default dispatcher.
    pub fn with_rng<R: Rng>(topology: Topology<T>, rng: &mut R) -> Result<Self, Error> {
        Self::with_diagnostics(topology, rng, Diagnostics::current())
    }

    /// Builds a network from `topology`, drawing its initial weights from `rng` and sending every
    /// diagnostic event, including the construction summary, to `diagnostics`.
    ///
    /// Every weight and bias of a neuron with `n` inputs is drawn uniformly from
    /// `[-1 / n, 1 / n]`. The generator used for dropout masks is seeded from `rng` as well, so a
    /// seeded `rng` makes both construction and training reproducible.
    pub fn with_diagnostics<R: Rng>(
        topology: Topology<T>,
        rng: &mut R,
        diagnostics: Diagnostics,
    ) -> Result<Self, Error> {
        topology.validate()?;

        let mut num_inputs = topology.inputs();
        let mut neurons = Vec::with_capacity(topology.layers().len());
        for spec in topology.layers() {
            let layer_neurons = (0..spec.neurons)
                .map(|_| Neuron::random(num_inputs, spec.activation, spec.learning, &mut *rng))
                .collect();
            neurons.push(layer_neurons);
            num_inputs = spec.neurons;
        }

        let dropout_rng = StdRng::seed_from_u64(rng.gen());

        Ok(Self::from_neurons(topology, neurons, dropout_rng, diagnostics))
    }

    /// Wires already-built neurons into layers and allocates the buffers between them.
    ///
    /// `topology` must be valid and `neurons` must match it.
    pub(crate) fn from_neurons(
        topology: Topology<T>,
        neurons: Vec<Vec<Neuron<T>>>,
        rng: StdRng,
        diagnostics: Diagnostics,
    ) -> Self {
        let sizes = topology.sizes();
        let arena = Arena::new(&sizes);
        let layers: Vec<Layer<T>> = topology
            .layers()
            .iter()
            .zip(neurons)
            .enumerate()
            .map(|(i, (spec, neurons))| {
                Layer::new(
                    i,
                    neurons,
                    sizes[i],
                    spec.activation,
                    spec.dropout,
                    spec.learning,
                )
            })
            .collect();

        debug_assert_eq!(arena.len(), layers.len() + 1);
        diagnostics.emit(|| {
            debug!(
                inputs = sizes[0],
                outputs = sizes[sizes.len() - 1],
                layers = layers.len(),
                cost = topology.cost().tag(),
                "built network"
            )
        });

        Self {
            topology,
            layers,
            arena,
            rng,
            diagnostics,
        }
    }

    /// Returns the topology this network was built from.
    pub fn topology(&self) -> &Topology<T> {
        &self.topology
    }

    /// Returns the number of inputs required by this `Network`.
    pub fn num_inputs(&self) -> usize {
        self.topology.inputs()
    }

    /// Returns the number of outputs produced by this `Network`.
    pub fn num_outputs(&self) -> usize {
        self.output().len()
    }

    /// Returns the cost function used by [`train`][Self::train].
    pub fn cost(&self) -> Cost {
        self.topology.cost()
    }

    /// Returns the layers of this `Network`, in evaluation order.
    pub fn layers(&self) -> &[Layer<T>] {
        &self.layers
    }

    /// Returns the output of the last forward pass. All zeroes before the first pass.
    pub fn output(&self) -> &[T] {
        self.arena.signal(self.output_buffer())
    }

    /// Returns the error accumulated for each network input by the last call to
    /// [`train`][Self::train]: the derivative of the cost with respect to that input, as seen by
    /// the first layer. [`predict`][Self::predict] leaves it untouched.
    pub fn input_error(&self) -> &[T] {
        self.arena.error(BufferId::new(0))
    }

    /// Returns the handle the diagnostic events of this `Network` are sent to.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Sets the handle the diagnostic events of this `Network` are sent to.
    pub fn set_diagnostics(&mut self, diagnostics: Diagnostics) {
        self.diagnostics = diagnostics;
    }

    /// Reseeds the generator that draws dropout masks during training.
    pub fn reseed_dropout(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Evaluates the network on `input` at full capacity (no dropout) and returns a copy of its
    /// output. Only the signal buffers are written: weights, learning state, neuron sums and the
    /// error buffers keep the values of the last training step.
    pub fn predict(&mut self, input: &[T]) -> Result<Vec<T>, DimensionMismatch> {
        self.check_input(input)?;
        self.forward(input, false);

        Ok(self.output().to_vec())
    }

    /// Runs one training step on a single example and returns the sum of the cost of each output
    /// against `desired`, measured before the update.
    ///
    /// The forward pass drops neurons according to each layer's dropout rate. The output layer's
    /// neurons are then updated from the cost derivative, and the remaining layers in reverse
    /// order from the errors accumulated by the layer after them.
    pub fn train(&mut self, input: &[T], desired: &[T]) -> Result<T, DimensionMismatch> {
        self.check_input(input)?;

        let num_outputs = self.num_outputs();
        if desired.len() != num_outputs {
            return Err(DimensionMismatch {
                signal: Signal::DesiredOutput,
                expected: num_outputs,
                actual: desired.len(),
            });
        }

        self.forward(input, true);

        let cost = self.cost();
        let mut loss = T::zero();
        {
            let output_buffer = self.output_buffer();
            let (actual, output_error) = self.arena.seed_view(output_buffer);
            for ((&a, &d), error) in actual.iter().zip(desired).zip(output_error) {
                loss = loss + cost.apply(a, d);
                *error = cost.derivative(a, d);
            }
        }

        for layer in self.layers.iter_mut().rev() {
            layer.update(&mut self.arena);
        }

        if !loss.is_finite() {
            let loss = to_f64(loss);
            self.diagnostics
                .emit(|| warn!(loss, "training produced a non-finite loss"));
        }

        Ok(loss)
    }

    fn check_input(&self, input: &[T]) -> Result<(), DimensionMismatch> {
        if input.len() == self.num_inputs() {
            Ok(())
        } else {
            Err(DimensionMismatch {
                signal: Signal::Input,
                expected: self.num_inputs(),
                actual: input.len(),
            })
        }
    }

    fn forward(&mut self, input: &[T], training: bool) {
        self.arena
            .signal_mut(BufferId::new(0))
            .copy_from_slice(input);

        let Self {
            layers, arena, rng, ..
        } = self;
        for layer in layers.iter_mut() {
            if training {
                layer.forward(arena, rng);
            } else {
                layer.evaluate(arena);
            }
        }
    }

    fn output_buffer(&self) -> BufferId {
        BufferId::new(self.layers.len())
    }
}

#[cfg(feature = "serde")]
impl<T: Float> Network<T> {
    /// Converts the network to a serializable format. This can be used to save it in a format other
    /// than JSON. See [`PortableNetwork`] for deserialization from different formats.
    ///
    /// # Examples
    ///
    /// ```
    /// # use mlp::{Activation, Cost, LayerSpec, Network, Topology};
    /// # let topology: Topology<f64> = Topology::new(2, Cost::Quadratic)
    /// #     .with_layer(LayerSpec::new(1, Activation::Sigmoid));
    /// # let network = Network::new(topology).unwrap();
    /// use mlp::encoding::PortableNetwork;
    ///
    /// let serializable = network.to_serializable();
    ///
    /// // Any format supported by `serde` can be used here
    /// let string = serde_json::to_string(&serializable).unwrap();
    ///
    /// // Other formats can be used when deserializing as well
    /// let deserialized: PortableNetwork<f64> = serde_json::from_str(&string).unwrap();
    /// let network = deserialized.build().unwrap();
    /// ```
    pub fn to_serializable(&self) -> PortableNetwork<T> {
        encoding::Data::new(self)
    }

    /// Replaces this network with the one described by `data`, keeping the current diagnostics
    /// handle. If `data` does not describe a valid network, an error is returned and `self` is
    /// left untouched.
    pub fn reload(&mut self, data: PortableNetwork<T>) -> Result<(), encoding::Error> {
        let network = data.build_with(&self.diagnostics)?;
        *self = network;

        Ok(())
    }
}

#[cfg(feature = "json")]
impl<T: Float> Network<T> {
    /// Loads a previously-saved network from a string. Diagnostics, including warnings about
    /// unknown tags, go to the calling thread's default dispatcher; use
    /// [`PortableNetwork::build_with`] to choose them.
    pub fn load_str<'a>(s: &'a str) -> Result<Self, encoding::Error>
    where
        T: Deserialize<'a>,
    {
        encoding::load_str(s, &Diagnostics::current())
    }

    /// Loads a previously-saved network from a file. Diagnostics go to the calling thread's
    /// default dispatcher.
    pub fn load_file<P>(path: P) -> Result<Self, encoding::Error>
    where
        T: DeserializeOwned,
        P: AsRef<Path>,
    {
        encoding::load_file(path, &Diagnostics::current())
    }

    /// Saves this network to a string in the latest encoding version.
    pub fn to_string(&self) -> Result<String, encoding::Error>
    where
        T: Serialize,
    {
        encoding::to_string(&self.to_serializable())
    }

    /// Saves this network to a file in the latest encoding version.
    ///
    /// Recursively creates missing directories if `create_dirs` is `true`.
    pub fn to_file<P>(&self, path: P, create_dirs: bool) -> Result<(), encoding::Error>
    where
        T: Serialize,
        P: AsRef<Path>,
    {
        encoding::to_file(&self.to_serializable(), path, create_dirs)
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;
    use crate::activation::Activation;
    use crate::diagnostics::tests::Captured;
    use crate::learning::Learning;

    fn xor_topology() -> Topology<f64> {
        Topology::new(2, Cost::Quadratic)
            .with_layer(LayerSpec::new(2, Activation::Sigmoid))
            .with_layer(LayerSpec::new(1, Activation::Sigmoid))
    }

    fn seeded(topology: Topology<f64>, seed: u64) -> Network<f64> {
        Network::with_rng(topology, &mut StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn test_construction_errors() {
        let empty = Topology::<f64>::new(2, Cost::Quadratic);
        assert_eq!(Error::EmptyTopology, Network::new(empty).unwrap_err());

        let zero_inputs =
            Topology::<f64>::new(0, Cost::Quadratic).with_layer(LayerSpec::new(1, Activation::Relu));
        assert_eq!(Error::ZeroInputs, Network::new(zero_inputs).unwrap_err());

        let empty_layer = xor_topology().with_layer(LayerSpec::new(0, Activation::Relu));
        assert_eq!(Error::EmptyLayer(2), Network::new(empty_layer).unwrap_err());
    }

    #[test]
    fn test_dimensions() {
        let topology = Topology::new(3, Cost::Quadratic)
            .with_layer(LayerSpec::new(4, Activation::Tanh))
            .with_layer(LayerSpec::new(5, Activation::Relu))
            .with_layer(LayerSpec::new(2, Activation::Linear));
        let net = seeded(topology, 1);

        assert_eq!(3, net.num_inputs());
        assert_eq!(2, net.num_outputs());
        assert_eq!(3, net.input_error().len());

        let mut expected_inputs = 3;
        for layer in net.layers() {
            assert_eq!(expected_inputs, layer.num_inputs());
            assert_eq!(layer.num_neurons(), net.arena.signal(layer.output_buffer()).len());
            assert_eq!(layer.num_inputs(), net.arena.error(layer.input_error_buffer()).len());
            for neuron in layer.neurons() {
                assert_eq!(expected_inputs, neuron.weights().len());
            }
            expected_inputs = layer.num_neurons();
        }
    }

    #[test]
    fn test_buffer_chain() {
        let topology = xor_topology().with_layer(LayerSpec::new(3, Activation::Linear));
        let mut net = seeded(topology, 2);

        for pair in net.layers().windows(2) {
            assert_eq!(pair[0].output_buffer(), pair[1].input_buffer());
            assert_eq!(pair[0].output_error_buffer(), pair[1].input_error_buffer());
        }

        let last = net.layers().last().unwrap().output_buffer();
        assert_eq!(net.output_buffer(), last);

        let prediction = net.predict(&[0.3, 0.9]).unwrap();
        assert_eq!(prediction.as_slice(), net.arena.signal(last));
        assert_eq!(prediction.as_slice(), net.output());
    }

    #[test]
    fn test_predict_is_deterministic() {
        let topology = Topology::new(2, Cost::Quadratic)
            .with_layer(LayerSpec::new(4, Activation::Sigmoid).dropout(0.5))
            .with_layer(LayerSpec::new(2, Activation::Tanh));
        let mut net = seeded(topology, 3);

        let first = net.predict(&[0.25, -0.5]).unwrap();
        let second = net.predict(&[0.25, -0.5]).unwrap();

        assert_eq!(first, second);
        assert!(net.layers()[0].neurons().iter().all(|n| n.is_active()));
    }

    #[test]
    fn test_predict_matches_manual_evaluation() {
        let mut net = seeded(xor_topology(), 4);
        let input = [0.7, -0.2];

        let hidden: Vec<f64> = net.layers()[0]
            .neurons()
            .iter()
            .map(|n| {
                let sum = n.bias() + n.weights()[0] * input[0] + n.weights()[1] * input[1];
                Activation::Sigmoid.apply(sum)
            })
            .collect();
        let out = &net.layers()[1].neurons()[0];
        let expected = Activation::Sigmoid
            .apply(out.bias() + out.weights()[0] * hidden[0] + out.weights()[1] * hidden[1]);

        assert_approx_eq!(expected, net.predict(&input).unwrap()[0]);
    }

    #[test]
    fn test_dimension_mismatch_leaves_network_untouched() {
        let mut net = seeded(xor_topology(), 5);
        let before = net.layers().to_vec();

        assert_eq!(
            DimensionMismatch {
                signal: Signal::Input,
                expected: 2,
                actual: 1,
            },
            net.train(&[1.0], &[0.0]).unwrap_err()
        );
        assert_eq!(
            DimensionMismatch {
                signal: Signal::DesiredOutput,
                expected: 1,
                actual: 2,
            },
            net.train(&[1.0, 0.0], &[0.0, 1.0]).unwrap_err()
        );
        assert_eq!(Signal::Input, net.predict(&[1.0, 0.0, 1.0]).unwrap_err().signal);

        assert_eq!(before, net.layers());
        assert!(net.output().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_train_returns_summed_cost() {
        let topology = Topology::new(2, Cost::Quadratic)
            .with_layer(LayerSpec::new(2, Activation::Sigmoid));
        let mut net = seeded(topology, 6);
        let input = [0.5, 0.1];
        let desired = [1.0, 0.0];

        let output = net.predict(&input).unwrap();
        let expected = Cost::Quadratic.apply(output[0], desired[0])
            + Cost::Quadratic.apply(output[1], desired[1]);

        assert_approx_eq!(expected, net.train(&input, &desired).unwrap());
    }

    #[test]
    fn test_training_reduces_loss() {
        for learning in [Learning::momentum(), Learning::resilient()] {
            let topology = Topology::new(2, Cost::Quadratic)
                .with_layer(LayerSpec::new(3, Activation::Sigmoid).learning(learning))
                .with_layer(LayerSpec::new(1, Activation::Sigmoid).learning(learning));
            let mut net = seeded(topology, 7);

            let first = net.train(&[1.0, 1.0], &[0.0]).unwrap();
            let mut last = first;
            for _ in 0..50 {
                last = net.train(&[1.0, 1.0], &[0.0]).unwrap();
            }

            assert!(last < first, "{:?}: {} >= {}", learning.rule(), last, first);
        }
    }

    #[test]
    fn test_hidden_errors_reach_the_input() {
        let mut net = seeded(xor_topology(), 8);
        net.train(&[1.0, 0.0], &[1.0]).unwrap();

        assert!(net.input_error().iter().any(|&e| e != 0.0));
    }

    #[test]
    fn test_predict_keeps_training_state() {
        let topology = Topology::new(2, Cost::Quadratic)
            .with_layer(LayerSpec::new(8, Activation::Sigmoid).dropout(0.25))
            .with_layer(LayerSpec::new(2, Activation::Tanh));
        let mut net = seeded(topology, 12);
        net.train(&[1.0, 0.5], &[1.0, -1.0]).unwrap();
        let input_error = net.input_error().to_vec();
        let layers = net.layers().to_vec();

        let prediction = net.predict(&[0.0, 1.0]).unwrap();

        assert!(input_error.iter().any(|&e| e != 0.0));
        assert_eq!(input_error.as_slice(), net.input_error());
        assert_eq!(layers, net.layers());
        assert_eq!(prediction.as_slice(), net.output());
    }

    #[test]
    fn test_construction_reports_to_given_diagnostics() {
        let captured = Captured::default();
        let mut net = Network::with_diagnostics(
            xor_topology(),
            &mut StdRng::seed_from_u64(13),
            captured.diagnostics(),
        )
        .unwrap();

        let contents = captured.contents();
        assert!(contents.contains("built network"));
        assert!(contents.contains("layers=2"));

        let other = Captured::default();
        net.set_diagnostics(other.diagnostics());
        net.train(&[1.0, 0.0], &[f64::INFINITY]).unwrap();
        assert!(other.contents().contains("non-finite loss"));
        assert!(!captured.contents().contains("non-finite loss"));
    }

    #[test]
    fn test_dropout_masks_are_reproducible() {
        let topology = Topology::new(2, Cost::Quadratic)
            .with_layer(LayerSpec::new(16, Activation::Relu).dropout(0.5))
            .with_layer(LayerSpec::new(1, Activation::Linear));
        let mut a = seeded(topology.clone(), 9);
        let mut b = seeded(topology, 9);

        for _ in 0..5 {
            a.train(&[0.4, 0.6], &[1.0]).unwrap();
            b.train(&[0.4, 0.6], &[1.0]).unwrap();
        }
        assert_eq!(a.layers(), b.layers());

        let active = a.layers()[0].neurons().iter().filter(|n| n.is_active()).count();
        assert!(active < 16, "dropout of 0.5 kept all 16 neurons");
    }

    #[test]
    fn test_dropped_neurons_keep_their_weights() {
        let topology = Topology::new(2, Cost::Quadratic)
            .with_layer(LayerSpec::new(32, Activation::Sigmoid).dropout(0.5))
            .with_layer(LayerSpec::new(1, Activation::Sigmoid));
        let mut net = seeded(topology, 10);
        let before = net.layers()[0].clone();

        net.train(&[0.9, -0.3], &[1.0]).unwrap();

        let after = &net.layers()[0];
        for (old, new) in before.neurons().iter().zip(after.neurons()) {
            if !new.is_active() {
                assert_eq!(old.weights(), new.weights());
                assert_eq!(old.bias(), new.bias());
            }
        }
        assert!(after.neurons().iter().any(|n| !n.is_active()));
    }
}
