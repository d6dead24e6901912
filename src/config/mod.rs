//! Configuration surface.
//!
//! Settings are loaded once, with priority:
//! 1. Hardcoded defaults
//! 2. Optional config file
//! 3. `VIGIL_`-prefixed environment variables (highest priority)
//!
//! An unrecognized option name — in the file or the environment — is a
//! fatal configuration error. Settings are frozen into an `Arc` when the
//! controller is constructed; nothing mutates them afterward.


use std::path::PathBuf;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::constants::DEFAULT_DESTINATION;
use crate::constants::DEFAULT_SAVE_EVERY_MS;
use crate::constants::ENV_PREFIX;
use crate::Result;

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields, default)]
pub struct Settings {
    /// Snapshot file location.
    pub destination: PathBuf,
    /// Pretty-print the persisted snapshot.
    pub prettify: bool,
    /// Autosave interval in milliseconds; zero disables autosave.
    pub save_every_ms: u64,
    /// Watch the target recursively (default filesystem adapter only).
    pub recursive: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            destination: PathBuf::from(DEFAULT_DESTINATION),
            prettify: true,
            save_every_ms: DEFAULT_SAVE_EVERY_MS,
            recursive: true,
        }
    }
}

impl Settings {
    /// Merges defaults, an optional config file and environment variables.
    pub fn load(config_file: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = config_file {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .ignore_empty(true)
                .try_parsing(true),
        );

        let settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }
}
