//! JSON entry points used by the `Network` persistence methods.

use num_traits::Float;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use std::fs::{DirBuilder, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use super::{Error, PortableNetwork};
use crate::diagnostics::Diagnostics;
use crate::network::Network;

/// Parses a JSON document and builds the network it describes.
pub(crate) fn load_str<'a, T>(s: &'a str, diagnostics: &Diagnostics) -> Result<Network<T>, Error>
where
    T: Float + Deserialize<'a>,
{
    let portable: PortableNetwork<T> = serde_json::from_str(s)?;
    portable.build_with(diagnostics)
}

/// Reads and parses the whole JSON file at `path` before building the network, so an unreadable
/// or malformed file never yields a partial network.
pub(crate) fn load_file<T, P>(path: P, diagnostics: &Diagnostics) -> Result<Network<T>, Error>
where
    T: Float + DeserializeOwned,
    P: AsRef<Path>,
{
    let reader = BufReader::new(File::open(path)?);
    let portable: PortableNetwork<T> = serde_json::from_reader(reader)?;
    portable.build_with(diagnostics)
}

/// Pretty-prints `network` as JSON.
pub(crate) fn to_string<T>(network: &PortableNetwork<T>) -> Result<String, Error>
where
    T: Float + Serialize,
{
    Ok(serde_json::to_string_pretty(network)?)
}

/// Pretty-prints `network` as JSON into the file at `path`, replacing it if it exists.
///
/// Missing parent directories are created first when `create_dirs` is `true`.
pub(crate) fn to_file<T, P>(network: &PortableNetwork<T>, path: P, create_dirs: bool) -> Result<(), Error>
where
    T: Float + Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let (true, Some(parent)) = (create_dirs, path.parent()) {
        DirBuilder::new().recursive(true).create(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, network)?;
    writer.flush()?;

    Ok(())
}
