//! A single neuron: its parameters, forward activation and parameter updates.

use num_traits::Float;
use rand::Rng;

use crate::activation::Activation;
use crate::learning::{Learning, StepState};
use crate::utils::constant;

/// A neuron of a [`Layer`][crate::Layer].
///
/// Neurons own their parameters but no buffers: the layer hands each call the slices of the
/// network's buffers the neuron reads and writes.
#[derive(Clone, Debug, PartialEq)]
pub struct Neuron<T: Float> {
    // One weight per layer input, in input order
    weights: Vec<T>,
    bias: T,
    // Resilient-rule history, parallel to `weights`
    steps: Vec<StepState<T>>,
    bias_step: StepState<T>,
    // The weighted sum computed by the last forward pass
    sum: T,
    // Whether the neuron survived dropout in the last forward pass
    active: bool,
    activation: Activation,
    learning: Learning<T>,
}

impl<T: Float> Neuron<T> {
    /// Returns a new `Neuron` with the given parameters.
    pub(crate) fn new(weights: Vec<T>, bias: T, activation: Activation, learning: Learning<T>) -> Self {
        let initial = StepState {
            gradient: T::zero(),
            step: learning.initial_step(),
        };

        Self {
            steps: vec![initial; weights.len()],
            bias_step: initial,
            weights,
            bias,
            sum: T::zero(),
            active: true,
            activation,
            learning,
        }
    }

    /// Returns a new `Neuron` whose weights and bias are drawn uniformly from
    /// `[-1 / num_inputs, 1 / num_inputs]`.
    pub(crate) fn random<R: Rng>(
        num_inputs: usize,
        activation: Activation,
        learning: Learning<T>,
        rng: &mut R,
    ) -> Self {
        let limit = 1.0 / num_inputs as f64;
        let mut draw = || constant::<T>(rng.gen_range(-limit..=limit));

        let weights = (0..num_inputs).map(|_| draw()).collect();
        let bias = draw();

        Self::new(weights, bias, activation, learning)
    }

    /// Returns the weights of this `Neuron`, one per layer input.
    pub fn weights(&self) -> &[T] {
        &self.weights
    }

    /// Returns the bias of this `Neuron`.
    pub fn bias(&self) -> T {
        self.bias
    }

    /// Returns the number of inputs of this `Neuron`.
    pub fn num_inputs(&self) -> usize {
        self.weights.len()
    }

    /// Returns the weighted sum computed by the last forward pass.
    pub fn sum(&self) -> T {
        self.sum
    }

    /// Returns whether this `Neuron` took part in the last forward pass. Only a training pass
    /// with dropout can deactivate a neuron.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the activation function of this `Neuron`.
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Returns the learning rule of this `Neuron`.
    pub fn learning(&self) -> Learning<T> {
        self.learning
    }

    /// Returns the resilient step size of each weight.
    pub fn steps(&self) -> impl Iterator<Item = T> + '_ {
        self.steps.iter().map(|state| state.step)
    }

    /// Returns the resilient step size of the bias.
    pub fn bias_step(&self) -> T {
        self.bias_step.step
    }

    fn weighted_sum(&self, input: &[T]) -> T {
        debug_assert_eq!(self.weights.len(), input.len());

        input
            .iter()
            .zip(&self.weights)
            .fold(self.bias, |sum, (&x, &w)| sum + x * w)
    }

    /// Returns the output of this `Neuron` for `input` without recording anything.
    pub(crate) fn evaluate(&self, input: &[T]) -> T {
        self.activation.apply(self.weighted_sum(input))
    }

    /// Computes the output of this `Neuron` for `input` and writes it to `output`, remembering the
    /// sum for the following [`update`][Self::update]. A dropped neuron outputs zero and is
    /// skipped by that update.
    pub(crate) fn activate(&mut self, input: &[T], output: &mut T, dropped: bool) {
        self.active = !dropped;
        self.sum = self.weighted_sum(input);

        *output = if dropped {
            T::zero()
        } else {
            self.activation.apply(self.sum)
        };
    }

    /// Updates the parameters of this `Neuron` from `loss`, the derivative of the cost with
    /// respect to its output, and adds its contribution `gradient * weight[i]` to `upstream[i]`
    /// for every input `i`.
    ///
    /// `input` and `output` must be the values seen by the preceding call to
    /// [`activate`][Self::activate].
    pub(crate) fn update(&mut self, loss: T, input: &[T], output: T, upstream: &mut [T]) {
        debug_assert_eq!(self.weights.len(), input.len());
        debug_assert_eq!(self.weights.len(), upstream.len());

        if !self.active {
            return;
        }

        let gradient = loss * self.activation.derivative(self.sum, output);

        match self.learning {
            Learning::Momentum {
                learning_rate,
                momentum,
            } => {
                self.bias = self.bias - (learning_rate * gradient - momentum * self.bias);

                for ((weight, &x), error) in self.weights.iter_mut().zip(input).zip(upstream) {
                    *error = *error + gradient * *weight;
                    *weight = *weight - (learning_rate * gradient * x - momentum * *weight);
                }
            }
            Learning::Resilient {
                eta_plus,
                eta_minus,
                delta_max,
                delta_min,
            } => {
                let correction =
                    self.bias_step
                        .advance(gradient, eta_plus, eta_minus, delta_max, delta_min);
                self.bias = self.bias + correction;

                let params = self.weights.iter_mut().zip(self.steps.iter_mut());
                for (((weight, state), &x), error) in params.zip(input).zip(upstream) {
                    *error = *error + gradient * *weight;

                    let g = gradient * x;
                    *weight = *weight + state.advance(g, eta_plus, eta_minus, delta_max, delta_min);
                }
            }
        }
    }
}
