use std::{
    any::type_name,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use fs_err::File;
use serde::{de::DeserializeOwned, Serialize};

/// Reads a whole TOML document into `T`.
pub fn read_toml<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let text = fs_err::read_to_string(path)?;
    toml::from_str(&text).with_context(|| format!("{path:?} is not a valid {}", type_name::<T>()))
}

pub fn write_json_pretty<T: Serialize>(path: impl AsRef<Path>, value: &T) -> anyhow::Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("While trying to write JSON to {path:?}"))?;
    writer
        .flush()
        .with_context(|| format!("While flushing {path:?}"))?;
    Ok(())
}
