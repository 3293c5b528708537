// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Durable named presets
//!
//! Two JSON documents in the data directory:
//!
//! - `presets.json`: name -> `{x, y, z, rotation, rotate_first}`
//! - `config.json`: `{"last_used_preset": name}`
//!
//! Reads never fail: a missing or corrupt document reads as empty, and a
//! single unreadable entry is skipped. Entries that cannot be read are kept
//! as they are when the document is rewritten.
//! Names are trimmed on every operation.
//! Writes go through a temporary sibling that is renamed over the target,
//! and their errors are returned.

use crate::error::{Error, Result};
use crate::params::TransformParams;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const PRESETS_FILE: &str = "presets.json";
pub const CONFIG_FILE: &str = "config.json";

/// `presets.json` as stored, before entries are checked
type RawPresets = BTreeMap<String, serde_json::Value>;

/// Stored form of [`TransformParams`]; rotation 0 means none
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_rotate_first")]
    pub rotate_first: bool,
}

fn default_rotate_first() -> bool {
    true
}

impl From<&TransformParams> for Preset {
    fn from(params: &TransformParams) -> Self {
        Self {
            x: params.x,
            y: params.y,
            z: params.z,
            rotation: params.rotation_degrees(),
            rotate_first: params.rotate_first,
        }
    }
}

impl From<Preset> for TransformParams {
    fn from(preset: Preset) -> Self {
        TransformParams::new(
            preset.x,
            preset.y,
            preset.z,
            preset.rotate_first,
            preset.rotation,
        )
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_used_preset: Option<String>,
}

/// Preset documents in one directory
#[derive(Debug, Clone)]
pub struct PresetStore {
    dir: PathBuf,
}

impl PresetStore {
    /// Open the store, creating `dir` if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            Error::store(format!("Unable to create {}: {}", dir.display(), e))
        })?;
        tracing::debug!(dir = %dir.display(), "Opened preset store");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn presets_path(&self) -> PathBuf {
        self.dir.join(PRESETS_FILE)
    }

    fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    /// All readable presets; empty on a missing or corrupt document
    pub fn load(&self) -> BTreeMap<String, Preset> {
        self.load_raw()
            .into_iter()
            .filter_map(|(name, value)| match serde_json::from_value(value) {
                Ok(preset) => Some((name, preset)),
                Err(e) => {
                    tracing::warn!(preset = %name, error = %e, "Skipping unreadable preset");
                    None
                }
            })
            .collect()
    }

    /// Sorted preset names
    pub fn list(&self) -> Vec<String> {
        self.load().into_keys().collect()
    }

    pub fn get(&self, name: &str) -> Option<Preset> {
        self.load().remove(name.trim())
    }

    /// Insert or replace a preset
    pub fn save(&self, name: &str, params: &TransformParams) -> Result<()> {
        let name = checked_name(name)?;
        let value = serde_json::to_value(Preset::from(params))
            .map_err(|e| Error::store(format!("Unable to encode preset '{}': {}", name, e)))?;

        let mut presets = self.load_raw();
        presets.insert(name.to_string(), value);
        write_json_atomic(&self.presets_path(), &presets)?;
        tracing::info!(preset = name, "Saved preset");
        Ok(())
    }

    /// Remove a preset; returns false when it did not exist
    pub fn delete(&self, name: &str) -> Result<bool> {
        let name = name.trim();
        let mut presets = self.load_raw();
        if presets.remove(name).is_none() {
            return Ok(false);
        }
        write_json_atomic(&self.presets_path(), &presets)?;
        tracing::info!(preset = name, "Deleted preset");
        Ok(true)
    }

    pub fn save_last_used(&self, name: &str) -> Result<()> {
        let config = StoreConfig {
            last_used_preset: Some(checked_name(name)?.to_string()),
        };
        write_json_atomic(&self.config_path(), &config)
    }

    pub fn get_last_used(&self) -> Option<String> {
        read_json::<StoreConfig>(&self.config_path()).and_then(|config| config.last_used_preset)
    }

    fn load_raw(&self) -> RawPresets {
        read_json(&self.presets_path()).unwrap_or_default()
    }
}

fn checked_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("Preset name cannot be empty"));
    }
    Ok(trimmed)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Unable to read preset document");
            return None;
        }
    };

    match serde_json::from_str(&contents) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt preset document");
            None
        }
    }
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let fail = |e: &dyn std::fmt::Display| {
        Error::store(format!("Unable to write {}: {}", path.display(), e))
    };

    // Dropping the temp file on any error removes it
    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| fail(&e))?;
    serde_json::to_writer_pretty(temp.as_file_mut(), value).map_err(|e| fail(&e))?;
    temp.write_all(b"\n").map_err(|e| fail(&e))?;
    temp.as_file().sync_all().map_err(|e| fail(&e))?;
    temp.persist(path).map_err(|e| fail(&e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, PresetStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::open(dir.path().join("data")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_round_trip() {
        let (_dir, store) = store();
        let params = TransformParams::new(100.0, -50.5, 2.0, false, 90.0);

        store.save("site A", &params).unwrap();
        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(TransformParams::from(loaded["site A"]), params);

        assert!(store.delete("site A").unwrap());
        assert!(store.load().is_empty());
        assert!(!store.delete("site A").unwrap());
    }

    #[test]
    fn test_list_is_sorted_and_save_overwrites() {
        let (_dir, store) = store();
        store.save("b", &TransformParams::default()).unwrap();
        store.save("a", &TransformParams::default()).unwrap();
        store
            .save("b", &TransformParams::new(1.0, 0.0, 0.0, true, 0.0))
            .unwrap();

        assert_eq!(store.list(), vec!["a", "b"]);
        assert_eq!(store.get("b").unwrap().x, 1.0);
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn test_document_format() {
        let (_dir, store) = store();
        store
            .save("origin", &TransformParams::new(1.0, 2.0, 3.0, true, 0.0))
            .unwrap();

        let text = fs::read_to_string(store.dir().join(PRESETS_FILE)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "origin": {"x": 1.0, "y": 2.0, "z": 3.0, "rotation": 0.0, "rotate_first": true}
            })
        );
    }

    #[test]
    fn test_corrupt_documents_read_as_empty() {
        let (_dir, store) = store();
        fs::write(store.dir().join(PRESETS_FILE), "{not json").unwrap();
        fs::write(store.dir().join(CONFIG_FILE), "[1, 2").unwrap();

        assert!(store.load().is_empty());
        assert_eq!(store.get_last_used(), None);

        // Next save replaces the corrupt document
        store.save("fresh", &TransformParams::default()).unwrap();
        assert_eq!(store.list(), vec!["fresh"]);
    }

    #[test]
    fn test_bad_entry_does_not_drop_others() {
        let (_dir, store) = store();
        let document = serde_json::json!({
            "good": {"x": 1.0, "y": 2.0, "z": 3.0, "rotation": 45.0, "rotate_first": false},
            "legacy": {"x": 1.0, "y": 2.0, "z": 3.0, "rotation": null, "rotate_first": true},
            "partial": {"y": 2.0},
        });
        fs::write(
            store.dir().join(PRESETS_FILE),
            serde_json::to_string(&document).unwrap(),
        )
        .unwrap();

        assert_eq!(store.list(), vec!["good"]);
        assert_eq!(store.get("good").unwrap().rotation, 45.0);
        assert_eq!(store.get("legacy"), None);

        store.save("new", &TransformParams::default()).unwrap();
        assert!(store.delete("good").unwrap());
        assert_eq!(store.list(), vec!["new"]);

        // Entries that could not be read are still on disk
        let text = fs::read_to_string(store.dir().join(PRESETS_FILE)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["legacy"], document["legacy"]);
        assert_eq!(json["partial"], document["partial"]);
        assert!(json.get("good").is_none());
    }

    #[test]
    fn test_non_object_document_reads_as_empty() {
        let (_dir, store) = store();
        fs::write(store.dir().join(PRESETS_FILE), "[1, 2, 3]").unwrap();
        assert!(store.load().is_empty());

        store.save("fresh", &TransformParams::default()).unwrap();
        assert_eq!(store.list(), vec!["fresh"]);
    }

    #[test]
    fn test_names_are_trimmed_on_lookup() {
        let (_dir, store) = store();
        store.save(" site A ", &TransformParams::default()).unwrap();

        assert_eq!(store.list(), vec!["site A"]);
        assert!(store.get("  site A").is_some());
        assert!(store.delete(" site A ").unwrap());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_last_used() {
        let (_dir, store) = store();
        assert_eq!(store.get_last_used(), None);
        store.save_last_used("site A").unwrap();
        assert_eq!(store.get_last_used().as_deref(), Some("site A"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let (_dir, store) = store();
        assert!(matches!(
            store.save("   ", &TransformParams::default()),
            Err(Error::Validation(_))
        ));
        assert!(store.save_last_used("").is_err());
    }

    #[test]
    fn test_write_failure_is_reported() {
        let (_dir, store) = store();
        // A directory squatting on the target makes the rename fail
        fs::create_dir(store.dir().join(PRESETS_FILE)).unwrap();
        let err = store.save("x", &TransformParams::default()).unwrap_err();
        assert!(matches!(err, Error::Store(_)));

        let leftovers: Vec<_> = fs::read_dir(store.dir()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }
}
