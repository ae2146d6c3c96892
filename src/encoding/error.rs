use std::{error, fmt, io};

use crate::network;

/// An error while loading or saving a [`Network`][crate::Network] from/to the encoding.
#[derive(Debug)]
pub enum Error {
    /// An error during serialization or deserialization.
    #[cfg(feature = "json")]
    Serde(serde_json::Error),
    /// An error while reading from/writing to a file.
    Io(io::Error),
    /// The encoded topology is not valid.
    Network(network::Error),
    /// A neuron does not have one weight per input of its layer.
    WeightCount {
        /// The index of the layer.
        layer: usize,
        /// The index of the neuron within the layer.
        neuron: usize,
        /// The input size of the layer.
        expected: usize,
        /// The number of weights found.
        actual: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            #[cfg(feature = "json")]
            Self::Serde(e) => write!(f, "de/serialization error: {}", e),
            Self::Io(e) => write!(f, "io error: {}", e),
            Self::Network(e) => write!(f, "network error: {}", e),
            Self::WeightCount {
                layer,
                neuron,
                expected,
                actual,
            } => write!(
                f,
                "neuron {} of layer {} has {} weights but the layer has {} inputs",
                neuron, layer, actual, expected
            ),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            #[cfg(feature = "json")]
            Self::Serde(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Network(e) => Some(e),
            Self::WeightCount { .. } => None,
        }
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<network::Error> for Error {
    fn from(e: network::Error) -> Self {
        Self::Network(e)
    }
}
