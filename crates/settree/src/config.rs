//! # Configuration
//!
//! Settree configuration is managed by [`confique`], layered in priority
//! order:
//!
//! 1. **Environment variables**: `SETTREE_SCHEMA`, `SETTREE_VALUES`,
//!    `SETTREE_FORMAT`.
//! 2. **Project Config**: `./settree.toml`.
//! 3. **Global Config**: OS-appropriate config directory (via `directories`).
//! 4. **Compiled Defaults**.
//!
//! Command-line flags override all of the above.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `schema` | none | Schema document describing the tree |
//! | `values` | none | Values document loaded on start and written on commit |
//! | `format` | `json` | Output format for `dump` (`json` or `yaml`) |
//! | `form` | `nested` | Shape of dumped and saved values (`nested` or `flat`) |

use anyhow::{bail, Result};
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use settree_core::ValueForm;
use std::path::{Path, PathBuf};

use crate::document::Format;

pub const CONFIG_FILE: &str = "settree.toml";

/// Configuration for settree, stored in `settree.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SettreeConfig {
    /// Schema document describing the tree.
    #[config(env = "SETTREE_SCHEMA")]
    pub schema: Option<PathBuf>,

    /// Values document loaded on start and written when changes commit.
    #[config(env = "SETTREE_VALUES")]
    pub values: Option<PathBuf>,

    /// Output format for value dumps ("json" or "yaml").
    #[config(env = "SETTREE_FORMAT", default = "json")]
    pub format: String,

    /// Shape of dumped and saved values ("nested" or "flat").
    #[config(default = "nested")]
    pub form: String,
}

impl Default for SettreeConfig {
    fn default() -> Self {
        Self {
            schema: None,
            values: None,
            format: "json".to_string(),
            form: "nested".to_string(),
        }
    }
}

impl SettreeConfig {
    /// Load from the environment, `<project_dir>/settree.toml` and the global
    /// config file, in that priority order.
    pub fn load_from(project_dir: &Path) -> Result<Self> {
        let mut builder = Self::builder().env().file(project_dir.join(CONFIG_FILE));
        if let Some(global) = global_config_file() {
            builder = builder.file(global);
        }
        Ok(builder.load()?)
    }

    pub fn format(&self) -> Result<Format> {
        Format::from_name(&self.format)
    }

    pub fn form(&self) -> Result<ValueForm> {
        match self.form.to_lowercase().as_str() {
            "nested" => Ok(ValueForm::Nested),
            "flat" => Ok(ValueForm::Flat),
            other => bail!("unknown value form '{}' (expected nested or flat)", other),
        }
    }
}

fn global_config_file() -> Option<PathBuf> {
    ProjectDirs::from("", "", "settree").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = SettreeConfig::default();
        assert_eq!(config.schema, None);
        assert_eq!(config.format().unwrap(), Format::Json);
        assert_eq!(config.form().unwrap(), ValueForm::Nested);
    }

    #[test]
    fn test_form_parsing() {
        let config = SettreeConfig {
            form: "Flat".to_string(),
            ..Default::default()
        };
        assert_eq!(config.form().unwrap(), ValueForm::Flat);

        let config = SettreeConfig {
            form: "tree".to_string(),
            ..Default::default()
        };
        assert!(config.form().is_err());
    }

    #[test]
    fn test_format_parsing() {
        let config = SettreeConfig {
            format: "yaml".to_string(),
            ..Default::default()
        };
        assert_eq!(config.format().unwrap(), Format::Yaml);
    }

    #[test]
    fn test_project_file_is_read() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE),
            "schema = \"tree.json\"\nform = \"flat\"\n",
        )
        .unwrap();
        let config = SettreeConfig::load_from(temp.path()).unwrap();
        assert_eq!(config.form().unwrap(), ValueForm::Flat);
        if std::env::var_os("SETTREE_SCHEMA").is_none() {
            assert_eq!(config.schema, Some(PathBuf::from("tree.json")));
        }
    }
}
