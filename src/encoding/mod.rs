//! A portable encoding for [`Network`]s. See [`PortableNetwork`].

mod error;
#[cfg(feature = "json")]
mod functions;
pub mod v1;

use num_traits::Float;
use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::Network;

pub use error::Error;
#[cfg(feature = "json")]
pub(crate) use functions::*;

/// The latest encoding version.
pub type Data<T> = v1::Data<T>;

/// The portable encoding type, which can be serialized and deserialized to save and load
/// [`Network`]s.
///
/// [`Network::load_file`], [`Network::to_file`], and related methods are more convenient to use,
/// but this type must be used when deserializing from a format other than JSON. See
/// [`Network::to_serializable`] for serialization to different formats.
///
/// # Examples
///
/// ```
/// # let string =
/// #     include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/test_data/xor_v1.json"));
/// use mlp::encoding::PortableNetwork;
///
/// // Any format supported by `serde` can be used here
/// let deserialized: PortableNetwork<f64> = serde_json::from_str(&string).unwrap();
/// let network = deserialized.build().unwrap();
///
/// assert_eq!(2, network.num_inputs());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "version", content = "network")]
pub enum PortableNetwork<T: Float> {
    /// Version one of the encoding.
    #[serde(rename = "1")]
    V1(v1::Data<T>),
}

impl<T: Float> PortableNetwork<T> {
    /// Builds the `PortableNetwork` into a [`Network`]. Diagnostics are sent to the dispatcher
    /// that is the default for the calling thread.
    pub fn build(self) -> Result<Network<T>, Error> {
        self.build_with(&Diagnostics::current())
    }

    /// Builds the `PortableNetwork` into a [`Network`] whose diagnostics, including those emitted
    /// while building, are sent to `diagnostics`.
    pub fn build_with(self, diagnostics: &Diagnostics) -> Result<Network<T>, Error> {
        match self {
            Self::V1(e) => e.build(diagnostics),
        }
    }
}

impl<T: Float> From<v1::Data<T>> for PortableNetwork<T> {
    fn from(net: v1::Data<T>) -> Self {
        Self::V1(net)
    }
}

/// A trait implemented by all versioned encoding types.
pub trait EncodingVersion<T: Float>: Into<PortableNetwork<T>> {
    /// Creates a [`PortableNetwork`] from a [`Network`].
    #[allow(clippy::new_ret_no_self)]
    fn new(network: &Network<T>) -> PortableNetwork<T>;

    /// Converts `self` into a [`Network`][crate::Network]. Unknown registry tags resolve to the
    /// registry defaults with a warning sent to `diagnostics`.
    fn build(self, diagnostics: &Diagnostics) -> Result<Network<T>, Error>;
}
