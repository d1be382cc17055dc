//! Application settings management
//!
//! Stores non-sensitive configuration in a plain JSON file.
//! Settings are readable while the vault is locked.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, VaultError};
use crate::generator::PasswordOptions;

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Settings file version
    pub version: u32,
    /// Auto-lock timeout in minutes (0 = never)
    pub auto_lock_timeout_minutes: u32,
    /// Seconds before a copied secret is cleared from the clipboard
    pub clipboard_clear_seconds: u32,
    /// Defaults for the password generator
    pub generator: PasswordOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: 1,
            auto_lock_timeout_minutes: 15,
            clipboard_clear_seconds: 15,
            generator: PasswordOptions::default(),
        }
    }
}

impl Settings {
    /// Auto-lock timeout for an unlock session
    pub fn auto_lock_timeout(&self) -> Option<Duration> {
        match self.auto_lock_timeout_minutes {
            0 => None,
            minutes => Some(Duration::from_secs(u64::from(minutes) * 60)),
        }
    }

    /// Delay before clearing the clipboard
    pub fn clipboard_clear_after(&self) -> Duration {
        Duration::from_secs(u64::from(self.clipboard_clear_seconds))
    }
}

/// Settings manager
pub struct SettingsManager {
    settings_file: PathBuf,
    settings: Settings,
}

impl SettingsManager {
    /// Create a settings manager, loading the file in `storage_dir` if present
    pub fn new(storage_dir: &Path) -> Result<Self> {
        let settings_file = storage_dir.join("settings.json");
        let settings = Self::load_from_file(&settings_file)?;

        Ok(Self {
            settings_file,
            settings,
        })
    }

    /// Load settings from file
    fn load_from_file(path: &Path) -> Result<Settings> {
        if !path.exists() {
            debug!("No settings file found, using defaults");
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to file
    pub async fn save(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.settings)?;

        if let Some(dir) = self.settings_file.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        // Write atomically using temp file
        let temp_path = self.settings_file.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &self.settings_file).await?;

        debug!("Saved settings to {:?}", self.settings_file);
        Ok(())
    }

    /// Get current settings
    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Get mutable settings
    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Update settings and save
    pub async fn update(&mut self, settings: Settings) -> Result<()> {
        self.settings = settings;
        self.save().await
    }

    /// Set auto-lock timeout and save
    pub async fn set_auto_lock_timeout(&mut self, minutes: u32) -> Result<()> {
        self.settings.auto_lock_timeout_minutes = minutes;
        self.save().await
    }

    /// Reset settings to defaults and delete settings file
    pub async fn reset(&mut self) -> Result<()> {
        self.settings = Settings::default();

        if self.settings_file.exists() {
            tokio::fs::remove_file(&self.settings_file)
                .await
                .map_err(|e| VaultError::StorageError(e.to_string()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_settings_default() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SettingsManager::new(temp_dir.path()).unwrap();

        let settings = manager.get();
        assert_eq!(settings.auto_lock_timeout_minutes, 15);
        assert_eq!(settings.auto_lock_timeout(), Some(Duration::from_secs(900)));
        assert_eq!(settings.clipboard_clear_after(), Duration::from_secs(15));
        assert_eq!(settings.generator.length, 16);
    }

    #[tokio::test]
    async fn test_settings_persistence() {
        let temp_dir = TempDir::new().unwrap();

        {
            let mut manager = SettingsManager::new(temp_dir.path()).unwrap();
            manager.get_mut().clipboard_clear_seconds = 45;
            manager.get_mut().generator.include_symbols = false;
            manager.set_auto_lock_timeout(0).await.unwrap();
        }

        {
            let manager = SettingsManager::new(temp_dir.path()).unwrap();
            assert_eq!(manager.get().auto_lock_timeout(), None);
            assert_eq!(manager.get().clipboard_clear_seconds, 45);
            assert!(!manager.get().generator.include_symbols);
        }
    }

    #[tokio::test]
    async fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("settings.json"),
            r#"{ "autoLockTimeoutMinutes": 5 }"#,
        )
        .unwrap();

        let manager = SettingsManager::new(temp_dir.path()).unwrap();
        assert_eq!(manager.get().auto_lock_timeout_minutes, 5);
        assert_eq!(manager.get().clipboard_clear_seconds, 15);
    }

    #[tokio::test]
    async fn test_reset() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = SettingsManager::new(temp_dir.path()).unwrap();

        manager.set_auto_lock_timeout(60).await.unwrap();
        assert!(temp_dir.path().join("settings.json").exists());

        manager.reset().await.unwrap();
        assert_eq!(manager.get(), &Settings::default());
        assert!(!temp_dir.path().join("settings.json").exists());
    }
}
