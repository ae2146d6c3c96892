//! The buffers shared between adjacent layers.
//!
//! A network with `L` layers owns `L + 1` signal buffers and `L + 1` error buffers. Signal buffer
//! `k` is the input of layer `k` and the output of layer `k - 1`; buffer `0` holds the network
//! input and buffer `L` the prediction. Error buffer `k` is the input-error accumulator of layer
//! `k` and the output-error target of layer `k - 1`; buffer `L` is seeded from the cost function
//! and buffer `0` receives the error with respect to the network input.

use num_traits::Float;

/// A handle to a buffer in an [`Arena`], shared by the signal and error sides.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(usize);

impl BufferId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the position of this buffer in the chain.
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

/// The views a layer needs to run its backward pass.
pub(crate) struct BackwardView<'a, T> {
    /// The layer's input signal.
    pub input: &'a [T],
    /// The layer's output signal.
    pub output: &'a [T],
    /// The layer's input-error accumulator, written by its neurons.
    pub input_error: &'a mut [T],
    /// The layer's output-error target, read by its neurons.
    pub output_error: &'a [T],
}

/// Owns every signal and error buffer of a network.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Arena<T> {
    signals: Vec<Vec<T>>,
    errors: Vec<Vec<T>>,
}

impl<T: Float> Arena<T> {
    /// Allocates a zeroed signal and error buffer for each length in `sizes`.
    pub fn new(sizes: &[usize]) -> Self {
        Self {
            signals: sizes.iter().map(|&len| vec![T::zero(); len]).collect(),
            errors: sizes.iter().map(|&len| vec![T::zero(); len]).collect(),
        }
    }

    /// Returns the number of buffers on each side.
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn signal(&self, id: BufferId) -> &[T] {
        &self.signals[id.0]
    }

    pub fn signal_mut(&mut self, id: BufferId) -> &mut [T] {
        &mut self.signals[id.0]
    }

    pub fn error(&self, id: BufferId) -> &[T] {
        &self.errors[id.0]
    }

    pub fn error_mut(&mut self, id: BufferId) -> &mut [T] {
        &mut self.errors[id.0]
    }

    /// Borrows signal buffer `id` immutably and error buffer `id` mutably.
    pub fn seed_view(&mut self, id: BufferId) -> (&[T], &mut [T]) {
        (&self.signals[id.0], &mut self.errors[id.0])
    }

    /// Borrows the `input` signal immutably and the `output` signal mutably.
    ///
    /// Panics if `input` does not come strictly before `output`.
    pub fn forward_view(&mut self, input: BufferId, output: BufferId) -> (&[T], &mut [T]) {
        assert!(input < output, "a layer's input must precede its output");

        let (head, tail) = self.signals.split_at_mut(output.0);
        (&head[input.0], &mut tail[0])
    }

    /// Borrows everything a layer reads and writes while updating its neurons.
    ///
    /// Panics if `input` does not come strictly before `output`.
    pub fn backward_view(&mut self, input: BufferId, output: BufferId) -> BackwardView<'_, T> {
        assert!(input < output, "a layer's input must precede its output");

        let (head, tail) = self.errors.split_at_mut(output.0);
        BackwardView {
            input: &self.signals[input.0],
            output: &self.signals[output.0],
            input_error: &mut head[input.0],
            output_error: &tail[0],
        }
    }
}
