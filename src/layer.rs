//! A layer of neurons and its wiring into the network's buffers.

use num_traits::Float;
use rand::Rng;

use crate::activation::Activation;
use crate::arena::{Arena, BufferId};
use crate::learning::Learning;
use crate::neuron::Neuron;

/// A fully connected layer of [`Neuron`]s.
///
/// The layer owns its neurons but not its buffers. It refers to them through handles into the
/// network's buffer arena: it reads its input signal, writes its output signal, accumulates the
/// error for its inputs in its input-error buffer and reads the error for its outputs from its
/// output-error buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer<T: Float> {
    neurons: Vec<Neuron<T>>,
    activation: Activation,
    dropout: f64,
    learning: Learning<T>,
    num_inputs: usize,
    // Signal and error buffers share handles: the input side is this layer's position in the
    // chain and the output side is the next position
    input: BufferId,
    output: BufferId,
}

impl<T: Float> Layer<T> {
    /// Creates the layer at `index` in the chain from its neurons. All neurons must have the same
    /// number of inputs.
    pub(crate) fn new(
        index: usize,
        neurons: Vec<Neuron<T>>,
        num_inputs: usize,
        activation: Activation,
        dropout: f64,
        learning: Learning<T>,
    ) -> Self {
        debug_assert!(neurons.iter().all(|n| n.num_inputs() == num_inputs));

        Self {
            neurons,
            activation,
            dropout,
            learning,
            num_inputs,
            input: BufferId::new(index),
            output: BufferId::new(index + 1),
        }
    }

    /// Returns the neurons of this `Layer`.
    pub fn neurons(&self) -> &[Neuron<T>] {
        &self.neurons
    }

    /// Returns the number of neurons in this `Layer`, which is also the length of its output.
    pub fn num_neurons(&self) -> usize {
        self.neurons.len()
    }

    /// Returns the length of this `Layer`'s input.
    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    /// Returns the activation function shared by the neurons of this `Layer`.
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Returns the probability of each neuron being dropped during a training pass.
    pub fn dropout(&self) -> f64 {
        self.dropout
    }

    /// Returns the learning rule shared by the neurons of this `Layer`.
    pub fn learning(&self) -> Learning<T> {
        self.learning
    }

    /// Returns the handle of the signal buffer this `Layer` reads.
    pub fn input_buffer(&self) -> BufferId {
        self.input
    }

    /// Returns the handle of the signal buffer this `Layer` writes.
    pub fn output_buffer(&self) -> BufferId {
        self.output
    }

    /// Returns the handle of the error buffer this `Layer`'s neurons accumulate into. It is the
    /// output-error buffer of the previous layer.
    pub fn input_error_buffer(&self) -> BufferId {
        self.input
    }

    /// Returns the handle of the error buffer this `Layer`'s neurons read their losses from. It
    /// is the input-error buffer of the next layer.
    pub fn output_error_buffer(&self) -> BufferId {
        self.output
    }

    /// Runs every neuron on the input buffer and fills the output buffer for a training pass.
    /// Clears the input-error accumulator first and drops each neuron with probability
    /// [`dropout`][Self::dropout].
    pub(crate) fn forward<R: Rng>(&mut self, arena: &mut Arena<T>, dropout_rng: &mut R) {
        arena
            .error_mut(self.input)
            .iter_mut()
            .for_each(|e| *e = T::zero());

        let (input, output) = arena.forward_view(self.input, self.output);
        debug_assert_eq!(input.len(), self.num_inputs);
        debug_assert_eq!(output.len(), self.neurons.len());

        let dropout = self.dropout;
        for (neuron, out) in self.neurons.iter_mut().zip(output.iter_mut()) {
            let dropped = dropout > 0.0 && dropout_rng.gen_bool(dropout);
            neuron.activate(input, out, dropped);
        }
    }

    /// Fills the output buffer from the input buffer with every neuron active. Neurons and error
    /// buffers are left as the last training pass left them.
    pub(crate) fn evaluate(&self, arena: &mut Arena<T>) {
        let (input, output) = arena.forward_view(self.input, self.output);
        debug_assert_eq!(output.len(), self.neurons.len());

        for (neuron, out) in self.neurons.iter().zip(output.iter_mut()) {
            *out = neuron.evaluate(input);
        }
    }

    /// Updates every neuron from the losses in the output-error buffer, accumulating their
    /// contributions into the input-error buffer.
    ///
    /// Must run after the next layer's update so the output-error buffer is complete.
    pub(crate) fn update(&mut self, arena: &mut Arena<T>) {
        let view = arena.backward_view(self.input, self.output);
        debug_assert_eq!(view.output_error.len(), self.neurons.len());

        for ((neuron, &loss), &out) in self
            .neurons
            .iter_mut()
            .zip(view.output_error)
            .zip(view.output)
        {
            neuron.update(loss, view.input, out, view.input_error);
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn test_layer(dropout: f64) -> Layer<f64> {
        let learning = Learning::Momentum {
            learning_rate: 1.0,
            momentum: 0.0,
        };
        let neurons = vec![
            Neuron::new(vec![1.0, 2.0], 0.0, Activation::Linear, learning),
            Neuron::new(vec![-1.0, 0.5], 1.0, Activation::Linear, learning),
            Neuron::new(vec![0.0, 3.0], -1.0, Activation::Linear, learning),
        ];
        Layer::new(0, neurons, 2, Activation::Linear, dropout, learning)
    }

    #[test]
    fn test_handles() {
        let layer = test_layer(0.0);

        assert_eq!(BufferId::new(0), layer.input_buffer());
        assert_eq!(BufferId::new(1), layer.output_buffer());
        assert_eq!(layer.input_buffer(), layer.input_error_buffer());
        assert_eq!(layer.output_buffer(), layer.output_error_buffer());
        assert_eq!(3, layer.num_neurons());
        assert_eq!(2, layer.num_inputs());
    }

    #[test]
    fn test_forward() {
        let mut layer = test_layer(0.0);
        let mut arena = Arena::new(&[2, 3]);
        arena.signal_mut(BufferId::new(0)).copy_from_slice(&[1.0, 2.0]);
        arena.error_mut(BufferId::new(0)).copy_from_slice(&[9.0, 9.0]);

        layer.forward(&mut arena, &mut StdRng::seed_from_u64(0));

        assert_eq!(&[5.0, 1.0, 5.0], arena.signal(BufferId::new(1)));
        assert_eq!(&[0.0, 0.0], arena.error(BufferId::new(0)));
        assert_approx_eq!(1.0, layer.neurons()[1].sum());
    }

    #[test]
    fn test_evaluate_leaves_training_state() {
        let mut layer = test_layer(0.0);
        let mut arena = Arena::new(&[2, 3]);
        arena.signal_mut(BufferId::new(0)).copy_from_slice(&[1.0, 2.0]);
        layer.forward(&mut arena, &mut StdRng::seed_from_u64(0));
        arena.error_mut(BufferId::new(0)).copy_from_slice(&[9.0, 9.0]);

        arena.signal_mut(BufferId::new(0)).copy_from_slice(&[0.0, 1.0]);
        layer.evaluate(&mut arena);

        assert_eq!(&[2.0, 1.5, 2.0], arena.signal(BufferId::new(1)));
        assert_eq!(&[9.0, 9.0], arena.error(BufferId::new(0)));
        assert_approx_eq!(5.0, layer.neurons()[0].sum());
    }

    #[test]
    fn test_update_accumulates_upstream_errors() {
        let mut layer = test_layer(0.0);
        let mut arena = Arena::new(&[2, 3]);
        arena.signal_mut(BufferId::new(0)).copy_from_slice(&[1.0, 2.0]);

        layer.forward(&mut arena, &mut StdRng::seed_from_u64(0));
        arena
            .error_mut(BufferId::new(1))
            .copy_from_slice(&[0.1, 0.2, 0.0]);
        layer.update(&mut arena);

        // Sum over neurons of loss * weight, using the weights from before the update
        let upstream = arena.error(BufferId::new(0));
        assert_approx_eq!(0.1 * 1.0 + 0.2 * -1.0, upstream[0]);
        assert_approx_eq!(0.1 * 2.0 + 0.2 * 0.5, upstream[1]);

        // A zero loss leaves the neuron untouched
        assert_eq!(&[0.0, 3.0], layer.neurons()[2].weights());
        assert_approx_eq!(1.0 - 0.1 * 1.0, layer.neurons()[0].weights()[0]);
    }

    #[test]
    fn test_forward_with_full_dropout() {
        let mut layer = test_layer(1.0);
        let mut arena = Arena::new(&[2, 3]);
        let mut rng = StdRng::seed_from_u64(3);
        arena.signal_mut(BufferId::new(0)).copy_from_slice(&[1.0, 2.0]);

        layer.forward(&mut arena, &mut rng);

        assert_eq!(&[0.0, 0.0, 0.0], arena.signal(BufferId::new(1)));
        assert!(layer.neurons().iter().all(|n| !n.is_active()));

        // Evaluation runs the same layer at full capacity
        layer.evaluate(&mut arena);
        assert_eq!(&[5.0, 1.0, 5.0], arena.signal(BufferId::new(1)));
    }
}
