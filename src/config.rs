//! Runtime configuration for the preview layer.
//!
//! Defaults match the stock behaviour (Shift gesture, history interception
//! on, one second copy feedback). `from_env` lets the binary override a few
//! knobs without a config file.

use std::path::PathBuf;
use std::time::Duration;

use crate::nav::gesture::Key;

pub const ENV_STORAGE_DIR: &str = "LINK_PEEK_STORAGE_DIR";
pub const ENV_INTERCEPT_HISTORY: &str = "LINK_PEEK_INTERCEPT_HISTORY";
pub const ENV_CLOSE_ON_NEW_TAB: &str = "LINK_PEEK_CLOSE_ON_NEW_TAB";

#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// Key that must be held for a navigation to open a preview.
    pub modifier: Key,
    /// Route history push/replace and popstate through the classifier.
    pub intercept_history: bool,
    /// Close the overlay after "open in new tab".
    pub close_on_new_tab: bool,
    /// How long the copy-link button shows success before reverting.
    pub copy_feedback: Duration,
    /// How long control-panel feedback messages stay visible.
    pub feedback_duration: Duration,
    /// Timeout for page and preview fetches.
    pub fetch_timeout: Duration,
    /// Settings directory. `None` means the platform config dir.
    pub storage_dir: Option<PathBuf>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            modifier: Key::Shift,
            intercept_history: true,
            close_on_new_tab: false,
            copy_feedback: Duration::from_millis(1000),
            feedback_duration: Duration::from_millis(2000),
            fetch_timeout: Duration::from_secs(15),
            storage_dir: None,
        }
    }
}

impl PreviewConfig {
    /// Defaults overridden by `LINK_PEEK_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var(ENV_STORAGE_DIR) {
            if !dir.trim().is_empty() {
                log::debug!("Using storage directory from {}: {}", ENV_STORAGE_DIR, dir);
                config.storage_dir = Some(PathBuf::from(dir));
            }
        }
        if let Some(flag) = env_flag(ENV_INTERCEPT_HISTORY) {
            config.intercept_history = flag;
        }
        if let Some(flag) = env_flag(ENV_CLOSE_ON_NEW_TAB) {
            config.close_on_new_tab = flag;
        }
        config
    }

    pub fn with_modifier(mut self, modifier: Key) -> Self {
        self.modifier = modifier;
        self
    }

    pub fn with_history_interception(mut self, enabled: bool) -> Self {
        self.intercept_history = enabled;
        self
    }

    pub fn with_close_on_new_tab(mut self, enabled: bool) -> Self {
        self.close_on_new_tab = enabled;
        self
    }

    pub fn with_copy_feedback(mut self, duration: Duration) -> Self {
        self.copy_feedback = duration;
        self
    }

    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = Some(dir.into());
        self
    }
}

fn env_flag(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    parse_flag(&value).or_else(|| {
        log::warn!("Ignoring {}={:?}: expected true/false", name, value);
        None
    })
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = PreviewConfig::default();
        assert_eq!(c.modifier, Key::Shift);
        assert!(c.intercept_history);
        assert!(!c.close_on_new_tab);
        assert_eq!(c.copy_feedback, Duration::from_secs(1));
    }

    #[test]
    fn flag_parsing() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn builders() {
        let c = PreviewConfig::default()
            .with_modifier(Key::Alt)
            .with_history_interception(false)
            .with_storage_dir("/tmp/peek");
        assert_eq!(c.modifier, Key::Alt);
        assert!(!c.intercept_history);
        assert_eq!(c.storage_dir, Some(PathBuf::from("/tmp/peek")));
    }
}
