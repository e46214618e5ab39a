// src/settings.rs

//! Persisted named template settings.
//!
//! The store is a TOML file of `[[settings]]` entries, each mapping a
//! user-chosen name to a template string:
//!
//! ```text
//! [[settings]]
//! name = "twitch vod"
//! template = "__TIME[UNIXTIME]__\t__COMMENT__"
//! ```
//!
//! [`Settings::load`] returns a snapshot of the whole store (a missing file
//! is an empty store). [`Settings::save`] atomically rewrites the whole
//! store. [`Settings::upsert`] decides update-vs-append by name equality.

use crate::common::FPath;

use std::fmt;
use std::fs;
use std::io;
use std::io::Write;
use std::path::Path;

use ::serde::{
    Deserialize,
    Serialize,
};
use ::si_trace_print::{
    defn,
    defx,
};
use ::tempfile::NamedTempFile;

/// default settings store path, relative to the working directory
pub const SETTINGS_FILE_DEFAULT: &str = "config.toml";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SettingsError
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Failure to load or save the settings store.
#[derive(Debug)]
pub enum SettingsError {
    Io(io::Error),
    De(::toml::de::Error),
    Ser(::toml::ser::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(err) => write!(f, "settings file error: {}", err),
            SettingsError::De(err) => write!(f, "settings file did not parse: {}", err),
            SettingsError::Ser(err) => write!(f, "settings did not serialize: {}", err),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(err) => Some(err),
            SettingsError::De(err) => Some(err),
            SettingsError::Ser(err) => Some(err),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Setting, Settings
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// one named template
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Setting {
    pub name: String,
    pub template: String,
}

/// Snapshot of the whole settings store.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub settings: Vec<Setting>,
}

impl Settings {
    /// Load the store at `path`. A missing file is an empty store.
    pub fn load(path: &FPath) -> Result<Settings, SettingsError> {
        defn!("({:?})", path);

        let text: String = match fs::read_to_string(path) {
            Ok(val) => val,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                defx!("no file {:?}; empty store", path);

                return Ok(Settings::default());
            }
            Err(err) => {
                defx!("read_to_string({:?}) failed {}", path, err);

                return Err(SettingsError::Io(err));
            }
        };
        let settings: Settings = match ::toml::from_str(text.as_str()) {
            Ok(val) => val,
            Err(err) => {
                defx!("toml::from_str failed {}", err);

                return Err(SettingsError::De(err));
            }
        };
        defx!("loaded {} settings", settings.settings.len());

        Ok(settings)
    }

    /// lookup by exact name
    pub fn get(
        &self,
        name: &str,
    ) -> Option<&Setting> {
        self.settings
            .iter()
            .find(|setting| setting.name == name)
    }

    /// all known setting names, in stored order
    pub fn names(&self) -> Vec<&str> {
        self.settings
            .iter()
            .map(|setting| setting.name.as_str())
            .collect()
    }

    /// Update the entry named `name` or append a new one.
    ///
    /// Returns `true` when an existing entry was updated.
    pub fn upsert(
        &mut self,
        name: &str,
        template: &str,
    ) -> bool {
        for setting in self.settings.iter_mut() {
            if setting.name == name {
                setting.template = String::from(template);

                return true;
            }
        }
        self.settings.push(Setting {
            name: String::from(name),
            template: String::from(template),
        });

        false
    }

    /// Atomically rewrite the whole store at `path`: serialize to a
    /// temporary file in the same directory, then rename over `path`.
    pub fn save(
        &self,
        path: &FPath,
    ) -> Result<(), SettingsError> {
        defn!("({:?})", path);

        let text: String = match ::toml::to_string_pretty(self) {
            Ok(val) => val,
            Err(err) => {
                defx!("toml::to_string_pretty failed {}", err);

                return Err(SettingsError::Ser(err));
            }
        };
        // the temporary file must share a filesystem with `path` for the
        // rename to be atomic
        let dir: &Path = match Path::new(path.as_str()).parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut ntf: NamedTempFile = match NamedTempFile::new_in(dir) {
            Ok(val) => val,
            Err(err) => {
                defx!("NamedTempFile::new_in({:?}) failed {}", dir, err);

                return Err(SettingsError::Io(err));
            }
        };
        if let Err(err) = ntf.write_all(text.as_bytes()) {
            defx!("write_all failed {}", err);

            return Err(SettingsError::Io(err));
        }
        match ntf.persist(path) {
            Ok(_file) => {
                defx!("saved {} settings", self.settings.len());

                Ok(())
            }
            Err(err) => {
                defx!("persist({:?}) failed {}", path, err);

                Err(SettingsError::Io(err.error))
            }
        }
    }
}
