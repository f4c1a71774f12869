//! Persisted user preferences
//!
//! Gender and height are kept in a small key-value store that the engine
//! receives at construction. Values are loaded once when the engine is built
//! and written back on every change.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::PreferenceError;
use crate::models::{Gender, UserProfile};

pub const GENDER_KEY: &str = "gender";
pub const HEIGHT_KEY: &str = "height";

/// Key-value store for scalar preferences
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for Box<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        (**self).set(key, value)
    }
}

/// Read the profile from a store; unknown or missing values use the defaults
pub fn load_profile(store: &dyn PreferenceStore) -> UserProfile {
    let gender = match store.get(GENDER_KEY) {
        Some(value) => value.parse::<Gender>().unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring stored gender");
            Gender::default()
        }),
        None => Gender::default(),
    };

    let height_cm = store
        .get(HEIGHT_KEY)
        .and_then(|value| UserProfile::parse_height(&value));

    UserProfile { gender, height_cm }
}

/// Write both preferences; an unset height is stored as an empty string
pub fn save_profile(
    store: &mut dyn PreferenceStore,
    profile: &UserProfile,
) -> Result<(), PreferenceError> {
    store.set(GENDER_KEY, profile.gender.as_str())?;
    let height = profile
        .height_cm
        .map(|h| h.to_string())
        .unwrap_or_default();
    store.set(HEIGHT_KEY, &height)
}

/// In-memory store, used by tests and one-off runs
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    values: BTreeMap<String, String>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PreferenceFile {
    #[serde(default)]
    preferences: BTreeMap<String, String>,
}

/// TOML-file store; the whole file is rewritten on each `set`
#[derive(Debug, Clone)]
pub struct TomlPreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl TomlPreferenceStore {
    /// Open a store at `path`. A missing file is an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PreferenceError> {
        let path = path.as_ref().to_path_buf();

        let values = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| PreferenceError::Storage {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            let file: PreferenceFile =
                toml::from_str(&content).map_err(|e| PreferenceError::Corrupted {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
            file.preferences
        } else {
            debug!(path = %path.display(), "No preference file yet");
            BTreeMap::new()
        };

        Ok(Self { path, values })
    }

    /// `~/.bodycomp/preferences.toml`
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".bodycomp")
            .join("preferences.toml")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), PreferenceError> {
        let storage_error = |reason: String| PreferenceError::Storage {
            path: self.path.clone(),
            reason,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| storage_error(e.to_string()))?;
        }

        let file = PreferenceFile {
            preferences: self.values.clone(),
        };
        let content = toml::to_string_pretty(&file).map_err(|e| storage_error(e.to_string()))?;

        fs::write(&self.path, content).map_err(|e| storage_error(e.to_string()))
    }
}

impl PreferenceStore for TomlPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        self.persist()
    }
}
