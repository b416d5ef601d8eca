//! settings.json handling
//!
//! Settings live in settings.json in the branchline directory:
//! ```json
//! {
//!   "app": { "demoMode": false }
//! }
//! ```
//! Keys the CLI does not manage are preserved on save.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::result::Result;

/// settings.json as it exists on disk, unknown keys included
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default)]
    demo_mode: bool,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

fn read_settings(settings_path: &Path) -> Result<SettingsFile> {
    if settings_path.exists() {
        let content = std::fs::read_to_string(settings_path)?;
        // A mangled file falls back to defaults rather than erroring
        Ok(serde_json::from_str(&content).unwrap_or_default())
    } else {
        Ok(SettingsFile::default())
    }
}

/// The handful of settings the rest of the crate cares about
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub demo_mode: bool,
    // Full file retained so save() can round-trip unknown keys
    _raw_settings: SettingsFile,
}

impl Config {
    /// Read settings.json, then let BRANCHLINE_DEMO_MODE override the
    /// demo flag (CI and tests set it instead of touching the file).
    pub fn load(branchline_dir: &Path) -> Result<Self> {
        let raw = read_settings(&branchline_dir.join("settings.json"))?;

        let env_override = std::env::var("BRANCHLINE_DEMO_MODE")
            .ok()
            .map(|v| v.to_lowercase());
        let demo_mode = match env_override.as_deref() {
            Some("true" | "1" | "yes") => true,
            Some("false" | "0" | "no") => false,
            _ => raw.app.demo_mode,
        };

        Ok(Self {
            demo_mode,
            _raw_settings: raw,
        })
    }

    /// Write the managed fields back, re-reading the file first so keys
    /// owned by other tools survive.
    pub fn save(&self, branchline_dir: &Path) -> Result<()> {
        let settings_path = branchline_dir.join("settings.json");

        let mut settings = read_settings(&settings_path)?;
        settings.app.demo_mode = self.demo_mode;

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    pub fn enable_demo_mode(&mut self) {
        self.demo_mode = true;
    }

    pub fn disable_demo_mode(&mut self) {
        self.demo_mode = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_defaults_when_missing() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(!config.demo_mode);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        config.enable_demo_mode();
        config.save(dir.path()).unwrap();

        let reloaded = Config::load(dir.path()).unwrap();
        assert!(reloaded.demo_mode);
    }

    #[test]
    fn test_save_preserves_unmanaged_keys() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"app": {"demoMode": false, "theme": "dark"}, "custom": 42}"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        config.enable_demo_mode();
        config.save(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join("settings.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["app"]["demoMode"], true);
        assert_eq!(value["app"]["theme"], "dark");
        assert_eq!(value["custom"], 42);
    }
}
