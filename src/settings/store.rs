//! JSON file backed settings store.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{Settings, SettingsPatch, SettingsStore, StoreError};

pub const SETTINGS_FILE: &str = "settings.json";
const APP_DIR: &str = "link-peek";

/// Persists `Settings` as pretty JSON in `<dir>/settings.json`.
///
/// Every `set` rewrites the whole file. A missing file reads as the default
/// settings; a corrupt one is reported so the caller can decide whether to
/// fall back.
pub struct JsonFileStore {
    base_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store under the platform config directory, or the given override.
    pub fn open(custom_dir: Option<&Path>) -> Option<Self> {
        let dir = match custom_dir {
            Some(dir) => {
                log::debug!("Using custom settings directory: {:?}", dir);
                dir.to_path_buf()
            }
            None => {
                let dir = dirs::config_dir()?.join(APP_DIR);
                log::debug!("Using default settings directory: {:?}", dir);
                dir
            }
        };
        Some(Self::new(dir))
    }

    pub fn file_path(&self) -> PathBuf {
        self.base_dir.join(SETTINGS_FILE)
    }

    fn read(&self) -> Result<Settings, StoreError> {
        let path = self.file_path();
        if !path.exists() {
            log::debug!("No settings file at {:?}, using defaults", path);
            return Ok(Settings::default());
        }
        let contents = fs::read_to_string(&path)?;
        let settings: Settings = serde_json::from_str(&contents).map_err(StoreError::Parse)?;
        log::debug!("Loaded {} opted-out URLs from {:?}", settings.url_list.len(), path);
        Ok(settings)
    }

    fn write(&self, settings: &Settings) -> Result<(), StoreError> {
        if !self.base_dir.exists() {
            fs::create_dir_all(&self.base_dir)?;
            log::info!("Created settings directory: {:?}", self.base_dir);
        }
        let json = serde_json::to_string_pretty(settings).map_err(StoreError::Serialize)?;
        fs::write(self.file_path(), json)?;
        log::debug!("Saved {} opted-out URLs", settings.url_list.len());
        Ok(())
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self) -> Result<Settings, StoreError> {
        self.read()
    }

    fn set(&self, patch: SettingsPatch) -> Result<(), StoreError> {
        let _guard = match self.write_lock.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut settings = match self.read() {
            Ok(s) => s,
            Err(StoreError::Parse(e)) => {
                log::warn!("Overwriting corrupt settings file: {}", e);
                Settings::default()
            }
            Err(e) => return Err(e),
        };
        settings.merge(patch);
        self.write(&settings)
    }
}
