// Application settings
// Loaded from <config_dir>/bills-manager/settings.json, every field optional

use crate::bill::DEFAULT_CATEGORIES;
use crate::csv_codec::HeaderMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_AI_ENDPOINT: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_AI_MODEL: &str = "qwen2.5:0.5b";
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;

pub const ENV_AI_ENDPOINT: &str = "BILLS_AI_ENDPOINT";
pub const ENV_AI_MODEL: &str = "BILLS_AI_MODEL";

const APP_DIR: &str = "bills-manager";
const SETTINGS_FILE: &str = "settings.json";

/// Local generate endpoint settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    /// Off = the chat panel never sends anything
    pub enabled: bool,

    /// Full URL of the generate call
    pub endpoint: String,

    pub model: String,

    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_AI_ENDPOINT.to_string(),
            model: DEFAULT_AI_MODEL.to_string(),
            timeout_secs: DEFAULT_AI_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub ai: AiSettings,

    /// Header detection used by CSV import
    pub header_mode: HeaderMode,

    /// Categories offered by the add form, in order
    pub categories: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ai: AiSettings::default(),
            header_mode: HeaderMode::default(),
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Settings {
    /// Directory holding settings and the log file
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join(SETTINGS_FILE)
    }

    /// Load from the default location plus environment overrides.
    /// A missing or broken file falls back to defaults.
    pub fn load() -> Self {
        let path = Self::config_path();

        let mut settings = if path.exists() {
            match Self::load_from(&path) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("{:#}; using default settings", e);
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        settings.apply_overrides(|key| std::env::var(key).ok());
        settings
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Apply `BILLS_AI_ENDPOINT` / `BILLS_AI_MODEL` style overrides.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENV_AI_ENDPOINT).filter(|v| !v.trim().is_empty()) {
            self.ai.endpoint = endpoint;
        }
        if let Some(model) = lookup(ENV_AI_MODEL).filter(|v| !v.trim().is_empty()) {
            self.ai.model = model;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.ai.enabled);
        assert_eq!(settings.ai.endpoint, "http://localhost:11434/api/generate");
        assert_eq!(settings.ai.model, "qwen2.5:0.5b");
        assert_eq!(settings.header_mode, HeaderMode::NameSentinel);
        assert_eq!(settings.categories, vec!["Food", "Shopping", "Entertainment", "Others"]);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"ai": {"model": "llama3:8b"}, "header_mode": "first_row"}"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.ai.model, "llama3:8b");
        assert_eq!(settings.ai.timeout_secs, 60);
        assert_eq!(settings.header_mode, HeaderMode::FirstRow);
        assert_eq!(settings.categories.len(), 4);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(Settings::load_from(&path).is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = Settings::default();
        settings.ai.enabled = false;
        settings.save_to(&path).unwrap();

        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_overrides() {
        let mut settings = Settings::default();
        settings.apply_overrides(|key| match key {
            ENV_AI_ENDPOINT => Some("http://10.0.0.2:11434/api/generate".to_string()),
            ENV_AI_MODEL => Some("  ".to_string()),
            _ => None,
        });

        assert_eq!(settings.ai.endpoint, "http://10.0.0.2:11434/api/generate");
        assert_eq!(settings.ai.model, DEFAULT_AI_MODEL);
    }
}
