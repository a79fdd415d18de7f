//! Versioned session files.
//!
//! A save is a JSON document holding the configuration, every slot's
//! requested actions and the shared markers. Replaying the actions
//! reproduces the session exactly, so resolved state is never stored.
//!
//! Files older than [`FPS_TAX_VERSION`] predate frame-rate-based latency and
//! carry a flat `caster_tax`; they load with [`TaxModel::Legacy`] and a
//! [`LoadWarning::LegacyCasterTax`].

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use rotation_core::{GameConfig, MAX_SLOTS, MarkerKind, Millis, TaxModel};

use crate::error::SaveError;

/// Version written by this build.
pub const CURRENT_VERSION: u32 = 2;

/// First version that derives latency from the frame rate.
pub const FPS_TAX_VERSION: u32 = 2;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedNode {
    pub skill: String,
    /// Requested time.
    pub at: Millis,
    #[serde(default = "single_target")]
    pub targets: u8,
    #[serde(default)]
    pub wait_for_ready: bool,
}

fn single_target() -> u8 {
    1
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedMarker {
    pub kind: MarkerKind,
    pub start: Millis,
    pub duration: Millis,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    pub version: u32,
    pub config: GameConfig,
    /// Flat cast latency of pre-frame-rate saves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caster_tax: Option<Millis>,
    #[serde(default)]
    pub active_slot: usize,
    #[serde(default)]
    pub cursor: Option<Millis>,
    pub slots: Vec<Vec<SavedNode>>,
    #[serde(default)]
    pub markers: Vec<SavedMarker>,
}

/// Non-blocking notes raised while loading a save.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadWarning {
    /// The file uses a fixed caster tax instead of the frame-rate model.
    LegacyCasterTax { caster_tax: Millis },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LegacyCasterTax { caster_tax } => write!(
                f,
                "created by an earlier version; uses the deprecated caster tax of {caster_tax} \
                 instead of the frame rate"
            ),
        }
    }
}

impl SaveFile {
    pub fn to_json(&self) -> Result<String, SaveError> {
        serde_json::to_string_pretty(self).map_err(|e| SaveError::Json(e.to_string()))
    }

    /// Parses a save and upgrades it to the current shape.
    pub fn from_json(json: &str) -> Result<(Self, Vec<LoadWarning>), SaveError> {
        let mut save: Self =
            serde_json::from_str(json).map_err(|e| SaveError::Json(e.to_string()))?;
        let mut warnings = Vec::new();

        if save.version > CURRENT_VERSION {
            return Err(SaveError::UnsupportedVersion {
                found: save.version,
                current: CURRENT_VERSION,
            });
        }
        if save.version < FPS_TAX_VERSION {
            let caster_tax = save.caster_tax.ok_or_else(|| {
                SaveError::CorruptedData(format!(
                    "version {} save without caster_tax",
                    save.version
                ))
            })?;
            save.config.tax_model = TaxModel::Legacy { caster_tax };
        }
        if let TaxModel::Legacy { caster_tax } = save.config.tax_model {
            tracing::warn!(
                "Loaded version {} save with legacy caster tax {}",
                save.version,
                caster_tax
            );
            warnings.push(LoadWarning::LegacyCasterTax { caster_tax });
        }
        if save.slots.is_empty() || save.slots.len() > MAX_SLOTS {
            return Err(SaveError::CorruptedData(format!(
                "{} slots (expected 1 to {})",
                save.slots.len(),
                MAX_SLOTS
            )));
        }
        if save.active_slot >= save.slots.len() {
            return Err(SaveError::CorruptedData(format!(
                "active slot {} out of {}",
                save.active_slot,
                save.slots.len()
            )));
        }
        Ok((save, warnings))
    }

    pub fn read(path: &Path) -> Result<(Self, Vec<LoadWarning>), SaveError> {
        let json = fs::read_to_string(path)?;
        let loaded = Self::from_json(&json)?;
        tracing::debug!("Loaded save: {}", path.display());
        Ok(loaded)
    }

    /// Writes through a temporary file and renames it into place.
    pub fn write(&self, path: &Path) -> Result<(), SaveError> {
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, self.to_json()?)?;
        fs::rename(&temp_path, path)?;
        tracing::debug!("Saved session: {}", path.display());
        Ok(())
    }
}

/// Named saves kept in one directory.
pub struct SaveStore {
    base_dir: PathBuf,
}

impl SaveStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self, SaveError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Store under the platform data directory.
    pub fn in_data_dir() -> Result<Self, SaveError> {
        let dirs = directories::ProjectDirs::from("", "", "rotation-sim")
            .ok_or(SaveError::NoDataDir)?;
        Self::new(dirs.data_dir().join("saves"))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn save_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", name))
    }

    pub fn save(&self, name: &str, save: &SaveFile) -> Result<(), SaveError> {
        save.write(&self.save_path(name))
    }

    pub fn load(&self, name: &str) -> Result<Option<(SaveFile, Vec<LoadWarning>)>, SaveError> {
        let path = self.save_path(name);
        if !path.exists() {
            return Ok(None);
        }
        SaveFile::read(&path).map(Some)
    }

    pub fn delete(&self, name: &str) -> Result<(), SaveError> {
        let path = self.save_path(name);
        if path.exists() {
            fs::remove_file(&path)?;
            tracing::info!("Deleted save: {}", path.display());
        }
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<String>, SaveError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if let Some(name) = path
                .file_name()
                .and_then(|s| s.to_str())
                .and_then(|s| s.strip_suffix(".json"))
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rotation_core::JobId;

    fn save(version: u32) -> SaveFile {
        SaveFile {
            version,
            config: GameConfig::new(JobId::Caster),
            caster_tax: None,
            active_slot: 0,
            cursor: None,
            slots: vec![vec![SavedNode {
                skill: "blaze".into(),
                at: Millis(0),
                targets: 1,
                wait_for_ready: false,
            }]],
            markers: Vec::new(),
        }
    }

    #[test]
    fn current_saves_load_without_warnings() {
        let json = save(CURRENT_VERSION).to_json().unwrap();
        let (loaded, warnings) = SaveFile::from_json(&json).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(loaded.config.tax_model, TaxModel::FpsTax);
        assert_eq!(loaded, save(CURRENT_VERSION));
    }

    #[test]
    fn legacy_saves_keep_their_caster_tax() {
        let mut legacy = save(1);
        legacy.caster_tax = Some(Millis(60));
        let (loaded, warnings) = SaveFile::from_json(&legacy.to_json().unwrap()).unwrap();
        assert_eq!(
            loaded.config.tax_model,
            TaxModel::Legacy {
                caster_tax: Millis(60)
            }
        );
        assert_eq!(
            warnings,
            vec![LoadWarning::LegacyCasterTax {
                caster_tax: Millis(60)
            }]
        );
    }

    #[test]
    fn current_saves_with_legacy_tax_still_warn() {
        let mut legacy = save(CURRENT_VERSION);
        legacy.config.tax_model = TaxModel::Legacy {
            caster_tax: Millis(100),
        };
        let (loaded, warnings) = SaveFile::from_json(&legacy.to_json().unwrap()).unwrap();
        assert_eq!(loaded, legacy);
        assert_eq!(
            warnings,
            vec![LoadWarning::LegacyCasterTax {
                caster_tax: Millis(100)
            }]
        );
    }

    #[test]
    fn legacy_save_without_tax_is_corrupted() {
        let result = SaveFile::from_json(&save(1).to_json().unwrap());
        assert!(matches!(result, Err(SaveError::CorruptedData(_))));
    }

    #[test]
    fn newer_versions_are_refused() {
        let result = SaveFile::from_json(&save(CURRENT_VERSION + 1).to_json().unwrap());
        assert!(matches!(
            result,
            Err(SaveError::UnsupportedVersion { found, .. }) if found == CURRENT_VERSION + 1
        ));
    }

    #[test]
    fn store_round_trips_named_saves() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path()).unwrap();
        assert_eq!(store.load("opener").unwrap(), None);

        store.save("opener", &save(CURRENT_VERSION)).unwrap();
        store.save("burst", &save(CURRENT_VERSION)).unwrap();
        assert_eq!(store.list().unwrap(), vec!["burst", "opener"]);

        let (loaded, _) = store.load("opener").unwrap().unwrap();
        assert_eq!(loaded.slots[0][0].skill, "blaze");

        store.delete("opener").unwrap();
        assert_eq!(store.list().unwrap(), vec!["burst"]);
    }
}
