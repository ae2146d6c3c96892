//! Weight-adaptation rules applied by neurons during training.

use num_traits::Float;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::activation::normalize_tag;
use crate::utils::constant;

/// Default learning rate of [`Learning::Momentum`].
pub const DEFAULT_LEARNING_RATE: f64 = 1.2;
/// Default momentum of [`Learning::Momentum`].
pub const DEFAULT_MOMENTUM: f64 = 0.0;
/// Default step growth factor of [`Learning::Resilient`].
pub const DEFAULT_ETA_PLUS: f64 = 1.25;
/// Default step shrink factor of [`Learning::Resilient`].
pub const DEFAULT_ETA_MINUS: f64 = 0.95;
/// Default upper bound on step sizes of [`Learning::Resilient`].
pub const DEFAULT_DELTA_MAX: f64 = 50.0;
/// Default lower bound on step sizes of [`Learning::Resilient`].
pub const DEFAULT_DELTA_MIN: f64 = 1e-6;
/// The step size every parameter starts with under [`Learning::Resilient`], before clamping into
/// `[delta_min, delta_max]`.
pub const INITIAL_STEP: f64 = 0.1;

/// The tag of a learning rule, without its parameters.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LearningRule {
    /// Momentum gradient descent.
    Momentum,
    /// Sign-based adaptive step sizes (resilient propagation).
    Resilient,
}

impl LearningRule {
    /// Returns the tag used for this rule in persisted networks.
    pub fn tag(&self) -> &'static str {
        match self {
            LearningRule::Momentum => "momentum",
            LearningRule::Resilient => "resilient",
        }
    }

    /// Looks up a learning rule by its tag. Returns `None` for unknown tags.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match normalize_tag(tag).as_str() {
            "momentum" | "backprop" | "backpropagation" | "gradientdescent" => {
                Some(LearningRule::Momentum)
            }
            "resilient" | "rprop" => Some(LearningRule::Resilient),
            _ => None,
        }
    }
}

impl Default for LearningRule {
    fn default() -> Self {
        LearningRule::Momentum
    }
}

/// A learning rule together with its parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "rule", rename_all = "lowercase"))]
pub enum Learning<T: Float> {
    /// Momentum gradient descent. Each parameter `w` with input `x` is updated as
    /// `w -= learning_rate * gradient * x - momentum * w`.
    Momentum { learning_rate: T, momentum: T },
    /// Sign-based adaptive step sizes. Each parameter keeps its own step size, grown by
    /// `eta_plus` while its gradient keeps its sign and shrunk by `eta_minus` when the sign flips,
    /// always staying in `[delta_min, delta_max]`.
    Resilient {
        eta_plus: T,
        eta_minus: T,
        delta_max: T,
        delta_min: T,
    },
}

impl<T: Float> Learning<T> {
    /// Momentum gradient descent with the default learning rate and momentum.
    pub fn momentum() -> Self {
        Learning::Momentum {
            learning_rate: constant(DEFAULT_LEARNING_RATE),
            momentum: constant(DEFAULT_MOMENTUM),
        }
    }

    /// Adaptive step sizes with the default factors and bounds.
    pub fn resilient() -> Self {
        Learning::Resilient {
            eta_plus: constant(DEFAULT_ETA_PLUS),
            eta_minus: constant(DEFAULT_ETA_MINUS),
            delta_max: constant(DEFAULT_DELTA_MAX),
            delta_min: constant(DEFAULT_DELTA_MIN),
        }
    }

    /// Returns the rule with its default parameters.
    pub fn from_rule(rule: LearningRule) -> Self {
        match rule {
            LearningRule::Momentum => Self::momentum(),
            LearningRule::Resilient => Self::resilient(),
        }
    }

    /// Returns the tag of this rule.
    pub fn rule(&self) -> LearningRule {
        match self {
            Learning::Momentum { .. } => LearningRule::Momentum,
            Learning::Resilient { .. } => LearningRule::Resilient,
        }
    }

    /// Returns `true` unless this is a resilient rule with unusable step bounds.
    pub(crate) fn has_valid_bounds(&self) -> bool {
        match *self {
            Learning::Momentum { .. } => true,
            Learning::Resilient {
                delta_max,
                delta_min,
                ..
            } => delta_min > T::zero() && delta_min <= delta_max,
        }
    }

    /// The step size every parameter starts with.
    pub(crate) fn initial_step(&self) -> T {
        let step = constant::<T>(INITIAL_STEP);
        match *self {
            Learning::Momentum { .. } => step,
            Learning::Resilient {
                delta_max,
                delta_min,
                ..
            } => step.max(delta_min).min(delta_max),
        }
    }
}

impl<T: Float> Default for Learning<T> {
    fn default() -> Self {
        Self::momentum()
    }
}

/// Per-parameter history kept by the resilient rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct StepState<T> {
    /// The gradient remembered from the previous update, or zero after a sign change.
    pub gradient: T,
    /// The current step size.
    pub step: T,
}

impl<T: Float> StepState<T> {
    /// Advances the state with a new gradient `g` and returns the correction to add to the
    /// parameter.
    pub fn advance(&mut self, g: T, eta_plus: T, eta_minus: T, delta_max: T, delta_min: T) -> T {
        let product = self.gradient * g;

        if product > T::zero() {
            self.step = (self.step * eta_plus).min(delta_max).max(delta_min);
            self.gradient = g;
            against_sign(g, self.step)
        } else if product < T::zero() {
            self.step = (self.step * eta_minus).max(delta_min).min(delta_max);
            self.gradient = T::zero();
            T::zero()
        } else {
            self.gradient = g;
            against_sign(g, self.step)
        }
    }
}

/// Returns `step` pointed against the sign of `g`, or zero if `g` is zero.
fn against_sign<T: Float>(g: T, step: T) -> T {
    if g > T::zero() {
        -step
    } else if g < T::zero() {
        step
    } else {
        T::zero()
    }
}
