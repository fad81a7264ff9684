//! Settings for the `estimator` binary.
//!
//! Values come from command-line flags, then `config.toml` in the user's
//! config directory, then built-in defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::item::IdStrategy;

/// Contents of `config.toml`.
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub ids: IdStrategy,
}

impl Config {
    /// Parses the file at `path`.
    ///
    /// A missing file gives the defaults. An unreadable or malformed file is
    /// logged and also gives the defaults.
    pub fn load_from(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read config");
                return Self::default();
            }
        };

        toml::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "ignoring malformed config");
            Self::default()
        })
    }

    /// Loads the user's config file, if there is one.
    pub fn load() -> Self {
        config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("estimator").join("config.toml"))
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("estimator")
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub ids: IdStrategy,
}

impl Settings {
    /// Command-line values win over the config file.
    pub fn resolve(
        config: Config,
        cli_data_dir: Option<PathBuf>,
        cli_ids: Option<IdStrategy>,
    ) -> Self {
        Self {
            data_dir: cli_data_dir
                .or(config.data_dir)
                .unwrap_or_else(default_data_dir),
            ids: cli_ids.unwrap_or(config.ids),
        }
    }
}
