//! The error types for creation and use of networks.

use std::{error, fmt};

/// The reason why a topology is invalid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The topology has no layers.
    EmptyTopology,
    /// The network has an input size of zero.
    ZeroInputs,
    /// A layer has no neurons. Contains the index of the layer.
    EmptyLayer(usize),
    /// A layer's dropout rate is outside `[0, 1)`. Contains the index of the layer.
    InvalidDropout(usize),
    /// A layer's resilient step bounds are not positive or `delta_min` exceeds `delta_max`.
    /// Contains the index of the layer.
    InvalidStepBounds(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::EmptyTopology => write!(f, "topology has no layers"),
            Self::ZeroInputs => write!(f, "network input size is zero"),
            Self::EmptyLayer(index) => write!(f, "layer {} has no neurons", index),
            Self::InvalidDropout(index) => {
                write!(f, "dropout rate of layer {} is outside [0, 1)", index)
            }
            Self::InvalidStepBounds(index) => {
                write!(f, "invalid resilient step bounds for layer {}", index)
            }
        }
    }
}

impl error::Error for Error {}

/// Which vector passed to a [`Network`][super::Network] had the wrong length.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Signal {
    /// The input vector.
    Input,
    /// The desired output vector given to [`train`][super::Network::train].
    DesiredOutput,
}

/// A vector passed to a [`Network`][super::Network] does not match its dimensions. Nothing in the
/// network was modified.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DimensionMismatch {
    /// The vector with the wrong length.
    pub signal: Signal,
    /// The length the network requires.
    pub expected: usize,
    /// The length that was given.
    pub actual: usize,
}

impl fmt::Display for DimensionMismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self.signal {
            Signal::Input => "input",
            Signal::DesiredOutput => "desired output",
        };
        write!(
            f,
            "{} has length {} but the network requires {}",
            name, self.actual, self.expected
        )
    }
}

impl error::Error for DimensionMismatch {}
