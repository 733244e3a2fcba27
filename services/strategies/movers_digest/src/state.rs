//! Carry-over state between cycles: last observed open interest per symbol
//!
//! File format:
//!
//! ```json
//! { "updated_at": "2024-03-01T01:00:05Z", "oi": { "BTCUSDT": 81234.5 } }
//! ```
//!
//! A missing or unreadable file is an empty state, never an error. Saves go
//! through `<file>.tmp` and a rename so a crash never leaves a torn file.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{DigestError, Result};

/// Open interest observed in earlier cycles
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PersistedState {
    pub updated_at: Option<DateTime<Utc>>,
    pub oi: BTreeMap<String, f64>,
}

impl PersistedState {
    pub fn prev_oi(&self, symbol: &str) -> Option<f64> {
        self.oi.get(symbol).copied()
    }

    /// Record an observation; non-finite values are ignored
    pub fn set_oi(&mut self, symbol: &str, value: f64) {
        if value.is_finite() {
            self.oi.insert(symbol.to_string(), value);
        }
    }

    /// Decode leniently: bad `updated_at` or non-numeric `oi` entries are dropped
    fn from_value(value: &Value) -> Self {
        let updated_at = value
            .get("updated_at")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc));

        let oi = value
            .get("oi")
            .and_then(Value::as_object)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|(symbol, v)| {
                        movers_types::parse_lenient_f64(v).map(|oi| (symbol.clone(), oi))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self { updated_at, oi }
    }
}

/// JSON file holding a [`PersistedState`]
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the state; any problem yields an empty state
    pub fn load(&self) -> PersistedState {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "No state file yet, starting empty");
                return PersistedState::default();
            }
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Failed to read state file, starting empty");
                return PersistedState::default();
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(value) if value.is_object() => PersistedState::from_value(&value),
            Ok(_) => {
                warn!(path = ?self.path, "State file is not a JSON object, starting empty");
                PersistedState::default()
            }
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Corrupt state file, starting empty");
                PersistedState::default()
            }
        }
    }

    /// Stamp `updated_at` and write atomically
    pub fn save(&self, state: &mut PersistedState) -> Result<()> {
        state.updated_at = Some(Utc::now());
        let body = serde_json::to_vec_pretty(state)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DigestError::state_io(parent, e))?;
        }

        let temp_path = self.temp_path();
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| DigestError::state_io(&temp_path, e))?;

        file.write_all(&body)
            .and_then(|_| file.flush())
            .and_then(|_| file.sync_all())
            .map_err(|e| DigestError::state_io(&temp_path, e))?;
        drop(file);

        fs::rename(&temp_path, &self.path).map_err(|e| DigestError::state_io(&self.path, e))?;

        debug!(path = ?self.path, symbols = state.oi.len(), "State saved");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty_state() {
        let dir = TempDir::new().unwrap();
        let state = StateStore::new(dir.path().join("state.json")).load();
        assert_eq!(state, PersistedState::default());
        assert!(state.updated_at.is_none());
        assert!(state.oi.is_empty());
    }

    #[test]
    fn test_round_trip_keeps_oi() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));

        let mut state = PersistedState::default();
        state.set_oi("BTCUSDT", 81234.5);
        state.set_oi("ETHUSDT", 1_250_000.25);
        state.set_oi("BADUSDT", f64::NAN);
        store.save(&mut state).unwrap();

        let reloaded = store.load();
        assert_eq!(reloaded.oi, state.oi);
        assert_eq!(reloaded.prev_oi("BTCUSDT"), Some(81234.5));
        assert_eq!(reloaded.prev_oi("BADUSDT"), None);
        assert!(reloaded.updated_at.is_some());
        assert!(!dir.path().join("state.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_empty_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        fs::write(&path, "{not json").unwrap();
        assert_eq!(StateStore::new(&path).load(), PersistedState::default());

        fs::write(&path, "[1, 2]").unwrap();
        assert_eq!(StateStore::new(&path).load(), PersistedState::default());
    }

    #[test]
    fn test_non_numeric_entries_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(
            &path,
            r#"{"updated_at": "yesterday", "oi": {"A": 10.5, "B": "20", "C": "lots", "D": null}}"#,
        )
        .unwrap();

        let state = StateStore::new(&path).load();
        assert_eq!(state.updated_at, None);
        assert_eq!(state.prev_oi("A"), Some(10.5));
        assert_eq!(state.prev_oi("B"), Some(20.0));
        assert_eq!(state.prev_oi("C"), None);
        assert_eq!(state.prev_oi("D"), None);
    }

    #[test]
    fn test_save_creates_parent_dir() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("nested/dir/state.json"));
        store.save(&mut PersistedState::default()).unwrap();
        assert!(store.path().exists());
    }
}
