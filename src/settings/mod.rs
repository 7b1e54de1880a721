//! Per-site opt-out settings.
//!
//! `Settings` holds the ordered list of page keys (origin + path) on which
//! interception is disabled. Stores implement `SettingsStore`; the file
//! store lives in `store`, URL validation in `validate`.

pub mod store;
pub mod validate;

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

pub use store::JsonFileStore;
pub use validate::{validate_url, UrlError, MAX_URL_LENGTH};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub url_list: Vec<String>,
}

impl Settings {
    pub fn contains(&self, url: &str) -> bool {
        self.url_list.iter().any(|u| u == url)
    }

    /// Apply a partial update.
    pub fn merge(&mut self, patch: SettingsPatch) {
        if let Some(list) = patch.url_list {
            self.url_list = dedup_preserving_order(list);
        }
    }
}

/// Partial settings update; `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_list: Option<Vec<String>>,
}

impl SettingsPatch {
    pub fn url_list(list: Vec<String>) -> Self {
        Self {
            url_list: Some(list),
        }
    }
}

/// Error reading or writing persisted settings.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Serialize(serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "settings I/O failed: {}", e),
            StoreError::Parse(e) => write!(f, "settings file is corrupt: {}", e),
            StoreError::Serialize(e) => write!(f, "could not serialize settings: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Parse(e) | StoreError::Serialize(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

/// Durable settings storage shared by every surface.
pub trait SettingsStore: Send + Sync {
    fn get(&self) -> Result<Settings, StoreError>;
    fn set(&self, patch: SettingsPatch) -> Result<(), StoreError>;
}

/// Volatile store for tests and for running without a writable config dir.
#[derive(Debug, Default)]
pub struct MemoryStore {
    settings: Mutex<Settings>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self) -> Result<Settings, StoreError> {
        Ok(match self.settings.lock() {
            Ok(s) => s.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        })
    }

    fn set(&self, patch: SettingsPatch) -> Result<(), StoreError> {
        let mut settings = match self.settings.lock() {
            Ok(s) => s,
            Err(poisoned) => poisoned.into_inner(),
        };
        settings.merge(patch);
        Ok(())
    }
}

fn dedup_preserving_order(list: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    list.into_iter().filter(|u| seen.insert(u.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_field_name() {
        let s = Settings {
            url_list: vec!["https://a.test/page".into()],
        };
        assert_eq!(
            serde_json::to_string(&s).unwrap(),
            r#"{"urlList":["https://a.test/page"]}"#
        );
        let empty: Settings = serde_json::from_str("{}").unwrap();
        assert!(empty.url_list.is_empty());
    }

    #[test]
    fn empty_patch_is_noop() {
        let store = MemoryStore::with_settings(Settings {
            url_list: vec!["https://a.test/".into()],
        });
        store.set(SettingsPatch::default()).unwrap();
        assert_eq!(store.get().unwrap().url_list, vec!["https://a.test/"]);
    }

    #[test]
    fn merge_keeps_first_occurrence() {
        let mut s = Settings::default();
        s.merge(SettingsPatch::url_list(vec![
            "b".into(),
            "a".into(),
            "b".into(),
        ]));
        assert_eq!(s.url_list, vec!["b", "a"]);
        assert!(s.contains("a"));
        assert!(!s.contains("c"));
    }
}
