//! Reading and writing JSON / YAML documents.
//!
//! The format of a file is picked from its extension (`.yaml` / `.yml` are
//! YAML, anything else is JSON). Output printed to stdout uses the configured
//! [`Format`].

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde::Serialize;
use settree_core::path;
use settree_core::values::flatten;
use settree_core::{FlatValues, NestedValues};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    #[default]
    Json,
    Yaml,
}

impl Format {
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            other => bail!("unknown format '{}' (expected json or yaml)", other),
        }
    }

    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Format::Yaml,
            _ => Format::Json,
        }
    }
}

pub fn parse<T: DeserializeOwned>(text: &str, format: Format) -> Result<T> {
    Ok(match format {
        Format::Json => serde_json::from_str(text)?,
        Format::Yaml => serde_yaml::from_str(text)?,
    })
}

pub fn render<T: Serialize>(value: &T, format: Format) -> Result<String> {
    let mut text = match format {
        Format::Json => serde_json::to_string_pretty(value)?,
        Format::Yaml => serde_yaml::to_string(value)?,
    };
    if !text.ends_with('\n') {
        text.push('\n');
    }
    Ok(text)
}

pub fn read<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse(&text, Format::from_path(path))
        .with_context(|| format!("failed to parse {}", path.display()))
}

pub fn write<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = render(value, Format::from_path(path))?;
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}

/// Read a values document, nested or flat, as canonical flat paths.
///
/// Keys starting with `/` are taken as paths, so `{"/net/port": 80}` and
/// `{"net": {"port": 80}}` load the same.
pub fn read_values(path: &Path) -> Result<FlatValues> {
    let nested: NestedValues = read(path)?;
    Ok(flatten(&nested)
        .into_iter()
        .map(|(key, value)| (path::normalize(&key), value))
        .collect())
}
