//! Handling of neuron activation functions and their derivatives.

use num_traits::Float;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::utils::constant;

/// Represents which activation function to use when evaluating neurons.
///
/// Each variant evaluates its derivative against a fixed quantity, listed on the variant. The
/// quantity is either the pre-activation sum `x` or the output `y = f(x)`; see
/// [`DerivativeInput`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Activation {
    /// Identity function. Outputs `x`. The derivative is the constant `1`.
    Linear,
    /// Heaviside or unit step function. Outputs `1` for `x > 0`, or `0` otherwise. The derivative
    /// is `0` everywhere (evaluated against the sum).
    UnitStep,
    /// Sign function. Outputs `1` for `x > 0`, `0` for `x = 0`, or `-1` otherwise. The derivative
    /// is `0` everywhere (evaluated against the sum).
    Sign,
    /// Logistic function. Outputs `1 / (1 + exp(-x))`. The derivative is `y * (1 - y)`, evaluated
    /// against the output.
    Sigmoid,
    /// Hyperbolic tangent function. Outputs `tanh(x)`. The derivative is `1 - y^2`, evaluated
    /// against the output.
    Tanh,
    /// Softsign function. Outputs `x / (1 + abs(x))`. The derivative is `1 / (1 + abs(x))^2`,
    /// evaluated against the sum.
    SoftSign,
    /// Bent identity function. Outputs `(sqrt(x^2 + 1) - 1) / 2 + x`. The derivative is
    /// `x / (2 * sqrt(x^2 + 1)) + 1`, evaluated against the sum.
    BentIdentity,
    /// Rectified linear unit. Outputs `max(x, 0)`. The derivative is `1` for `x > 0` and `0`
    /// otherwise, evaluated against the sum.
    Relu,
}

/// The quantity an activation derivative is a function of.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DerivativeInput {
    /// The derivative does not depend on its input.
    Constant,
    /// The derivative is a function of the pre-activation sum.
    Sum,
    /// The derivative is a function of the activation output.
    Output,
}

impl Activation {
    /// Every activation function, in declaration order.
    pub const ALL: [Activation; 8] = [
        Activation::Linear,
        Activation::UnitStep,
        Activation::Sign,
        Activation::Sigmoid,
        Activation::Tanh,
        Activation::SoftSign,
        Activation::BentIdentity,
        Activation::Relu,
    ];

    /// Applies the activation function to the input.
    pub fn apply<T: Float>(&self, x: T) -> T {
        self.get_function()(x)
    }

    /// Returns the corresponding function to the `Activation`.
    pub fn get_function<T: Float>(&self) -> fn(T) -> T {
        match self {
            Activation::Linear => linear,
            Activation::UnitStep => unit_step,
            Activation::Sign => sign,
            Activation::Sigmoid => sigmoid,
            Activation::Tanh => tanh,
            Activation::SoftSign => soft_sign,
            Activation::BentIdentity => bent_identity,
            Activation::Relu => relu,
        }
    }

    /// Returns the quantity the derivative of this function is evaluated against.
    pub fn derivative_input(&self) -> DerivativeInput {
        match self {
            Activation::Linear => DerivativeInput::Constant,
            Activation::Sigmoid | Activation::Tanh => DerivativeInput::Output,
            Activation::UnitStep
            | Activation::Sign
            | Activation::SoftSign
            | Activation::BentIdentity
            | Activation::Relu => DerivativeInput::Sum,
        }
    }

    /// Evaluates the derivative of the activation function for a neuron whose pre-activation sum
    /// was `sum` and whose output was `output`. Only the quantity named by
    /// [`derivative_input`][Self::derivative_input] is read.
    pub fn derivative<T: Float>(&self, sum: T, output: T) -> T {
        match self.derivative_input() {
            DerivativeInput::Constant => T::one(),
            DerivativeInput::Sum => self.derivative_of_sum(sum),
            DerivativeInput::Output => self.derivative_of_output(output),
        }
    }

    fn derivative_of_sum<T: Float>(&self, x: T) -> T {
        match self {
            Activation::SoftSign => T::one() / (T::one() + x.abs()).powi(2),
            Activation::BentIdentity => {
                x / (constant::<T>(2.0) * (x.powi(2) + T::one()).sqrt()) + T::one()
            }
            Activation::Relu => {
                if x > T::zero() {
                    T::one()
                } else {
                    T::zero()
                }
            }
            _ => T::zero(),
        }
    }

    fn derivative_of_output<T: Float>(&self, y: T) -> T {
        match self {
            Activation::Sigmoid => y * (T::one() - y),
            Activation::Tanh => T::one() - y.powi(2),
            _ => T::zero(),
        }
    }

    /// Returns the tag used for this activation function in persisted networks.
    pub fn tag(&self) -> &'static str {
        match self {
            Activation::Linear => "linear",
            Activation::UnitStep => "unitstep",
            Activation::Sign => "sign",
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
            Activation::SoftSign => "softsign",
            Activation::BentIdentity => "bentidentity",
            Activation::Relu => "relu",
        }
    }

    /// Looks up an activation function by its tag. Matching ignores ASCII case, `-` and `_`, and
    /// also accepts a few common aliases. Returns `None` for unknown tags.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let normalized = normalize_tag(tag);
        let activation = match normalized.as_str() {
            "linear" | "identity" => Activation::Linear,
            "unitstep" | "heaviside" | "step" => Activation::UnitStep,
            "sign" => Activation::Sign,
            "sigmoid" | "logistic" => Activation::Sigmoid,
            "tanh" | "hyperbolictangent" => Activation::Tanh,
            "softsign" => Activation::SoftSign,
            "bentidentity" => Activation::BentIdentity,
            "relu" | "rectifiedlinear" => Activation::Relu,
            _ => return None,
        };

        Some(activation)
    }
}

impl Default for Activation {
    fn default() -> Self {
        Activation::Sigmoid
    }
}

/// Lowercases a registry tag and strips separators.
pub(crate) fn normalize_tag(tag: &str) -> String {
    tag.trim()
        .chars()
        .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Outputs `x`.
pub fn linear<T>(x: T) -> T {
    x
}

/// Heaviside/unit step function. Outputs `1` for `x > 0`, or `0` otherwise.
pub fn unit_step<T: Float>(x: T) -> T {
    if x > T::zero() {
        T::one()
    } else {
        T::zero()
    }
}

/// Outputs `1` for `x > 0`, `0` for `x = 0`, or `-1` otherwise.
pub fn sign<T: Float>(x: T) -> T {
    if x > T::zero() {
        T::one()
    } else if x == T::zero() {
        T::zero()
    } else {
        -T::one()
    }
}

/// Logistic function. Outputs `1 / (1 + exp(-x))`.
pub fn sigmoid<T: Float>(x: T) -> T {
    T::one() / (T::one() + (-x).exp())
}

/// Outputs `tanh(x)`.
pub fn tanh<T: Float>(x: T) -> T {
    x.tanh()
}

/// Outputs `x / (1 + abs(x))`.
pub fn soft_sign<T: Float>(x: T) -> T {
    x / (T::one() + x.abs())
}

/// Outputs `(sqrt(x^2 + 1) - 1) / 2 + x`.
pub fn bent_identity<T: Float>(x: T) -> T {
    (((x.powi(2) + T::one()).sqrt() - T::one()) / (T::one() + T::one())) + x
}

/// Rectified linear unit. Outputs `max(0, x)`.
pub fn relu<T: Float>(x: T) -> T {
    x.max(T::zero())
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    #[test]
    fn test_activation() {
        assert_approx_eq!(5.0, Activation::Linear.apply(5.0));
        assert_approx_eq!(0.0, Activation::UnitStep.apply(-5.0));
        assert_approx_eq!(-1.0, Activation::Sign.apply(-5.0));
        assert_approx_eq!(0.8807970779778823, Activation::Sigmoid.apply(2.0));
        assert_approx_eq!(0.9640275800758169, Activation::Tanh.apply(2.0));
        assert_approx_eq!(0.8333333333333334, Activation::SoftSign.apply(5.0));
        assert_approx_eq!(7.049509756796392, Activation::BentIdentity.apply(5.0));
        assert_approx_eq!(5.0, Activation::Relu.apply(5.0));
        assert_approx_eq!(0.0, Activation::Relu.apply(-5.0));
    }

    /// Compares each derivative against a central finite difference of the function.
    #[test]
    fn test_derivative_matches_finite_difference() {
        let h = 1e-6;
        let differentiable = [
            Activation::Linear,
            Activation::Sigmoid,
            Activation::Tanh,
            Activation::SoftSign,
            Activation::BentIdentity,
            Activation::Relu,
        ];

        for activation in differentiable {
            for &x in &[-2.5f64, -0.3, 0.7, 3.0] {
                let numeric = (activation.apply(x + h) - activation.apply(x - h)) / (2.0 * h);
                let analytic = activation.derivative(x, activation.apply(x));
                assert_approx_eq!(numeric, analytic, 1e-5);
            }
        }
    }

    #[test]
    fn test_derivative_input_convention() {
        // Sigmoid reads the output: passing a bogus sum must not change the result
        let y = Activation::Sigmoid.apply(0.4f64);
        assert_approx_eq!(
            Activation::Sigmoid.derivative(0.4, y),
            Activation::Sigmoid.derivative(1000.0, y)
        );

        // Relu reads the sum: passing a bogus output must not change the result
        assert_approx_eq!(1.0, Activation::Relu.derivative(0.4f64, -7.0));
        assert_approx_eq!(0.0, Activation::Relu.derivative(-0.4f64, 7.0));

        assert_eq!(DerivativeInput::Sum, Activation::UnitStep.derivative_input());
        assert_approx_eq!(0.0, Activation::Sign.derivative(0.5f64, 1.0));
    }

    #[test]
    fn test_tags() {
        for activation in Activation::ALL {
            assert_eq!(Some(activation), Activation::from_tag(activation.tag()));
        }

        assert_eq!(Some(Activation::Linear), Activation::from_tag("Identity"));
        assert_eq!(Some(Activation::BentIdentity), Activation::from_tag("bent-identity"));
        assert_eq!(Some(Activation::Tanh), Activation::from_tag(" TANH "));
        assert_eq!(None, Activation::from_tag("swish"));
        assert_eq!(Activation::Sigmoid, Activation::default());
    }
}
