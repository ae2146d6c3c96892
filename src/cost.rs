//! Cost functions used to measure the error of a network's output during training.

use num_traits::Float;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::activation::normalize_tag;
use crate::utils::constant;

/// How far cross-entropy keeps the actual output away from `0` and `1`.
const CROSS_ENTROPY_CLAMP: f64 = 1e-12;

/// Represents which cost function to use when training a network.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Cost {
    /// Outputs `(a - d)^2 / 2`. The derivative is `a - d`.
    Quadratic,
    /// Outputs `-(d ln(a) + (1 - d) ln(1 - a))`. The derivative is `(a - d) / (a (1 - a))`.
    ///
    /// The actual output `a` is clamped into `[1e-12, 1 - 1e-12]` so that outputs saturated at
    /// exactly `0` or `1` yield finite values. Intended for outputs in `(0, 1)`, such as those of
    /// [`Activation::Sigmoid`][crate::Activation::Sigmoid].
    CrossEntropy,
}

impl Cost {
    /// Returns the cost of a single `actual` output against its `desired` value.
    pub fn apply<T: Float>(&self, actual: T, desired: T) -> T {
        match self {
            Cost::Quadratic => (actual - desired).powi(2) / constant(2.0),
            Cost::CrossEntropy => {
                let a = clamp_probability(actual);
                -(desired * a.ln() + (T::one() - desired) * (T::one() - a).ln())
            }
        }
    }

    /// Returns the derivative of the cost with respect to the `actual` output.
    pub fn derivative<T: Float>(&self, actual: T, desired: T) -> T {
        match self {
            Cost::Quadratic => actual - desired,
            Cost::CrossEntropy => {
                let a = clamp_probability(actual);
                (a - desired) / (a * (T::one() - a))
            }
        }
    }

    /// Returns the tag used for this cost function in persisted networks.
    pub fn tag(&self) -> &'static str {
        match self {
            Cost::Quadratic => "quadratic",
            Cost::CrossEntropy => "crossentropy",
        }
    }

    /// Looks up a cost function by its tag. Returns `None` for unknown tags.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match normalize_tag(tag).as_str() {
            "quadratic" | "mse" | "squarederror" => Some(Cost::Quadratic),
            "crossentropy" | "logloss" => Some(Cost::CrossEntropy),
            _ => None,
        }
    }
}

impl Default for Cost {
    fn default() -> Self {
        Cost::Quadratic
    }
}

fn clamp_probability<T: Float>(a: T) -> T {
    let low = constant::<T>(CROSS_ENTROPY_CLAMP);
    a.max(low).min(T::one() - low)
}
