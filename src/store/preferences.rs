use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::info;

use crate::error::{NailedItError, Result};

/// Small JSON key/value store backed by a single file.
///
/// Values are strings. Changes stay in memory until [`save`](Self::save).
pub struct PreferenceStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl PreferenceStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self> {
        let entries = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| {
                NailedItError::Storage(format!("Failed to read {:?}: {}", path, e))
            })?;
            match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    return Err(NailedItError::Storage(format!(
                        "Preferences file {:?} is not a JSON object",
                        path
                    )))
                }
                Err(e) => {
                    return Err(NailedItError::Storage(format!(
                        "Failed to parse {:?}: {}",
                        path, e
                    )))
                }
            }
        } else {
            Map::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .get(key)
            .and_then(|v| v.as_str().map(|s| s.to_string()))
    }

    pub fn set(&mut self, key: &str, value: &str) {
        info!("Setting preference: {} = {}", key, value);
        self.entries
            .insert(key.to_string(), Value::String(value.to_string()));
    }

    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| NailedItError::Storage(format!("Failed to serialize preferences: {}", e)))?;
        super::write_atomic(&self.path, json.as_bytes())
            .map_err(|e| NailedItError::Storage(format!("Failed to save {:?}: {}", self.path, e)))
    }
}
