use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::params::Params;

const APP_DIR: &str = "shapeshift";
const SETTINGS_FILENAME: &str = "settings.json";

impl std::fmt::Display for AudioSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Block Size: {}", self.block_size)?;
        writeln!(f, "Fallback Sample Rate: {}", self.sample_rate)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AudioSettings {
    /// Frames handed to the engine per block, and its `max_frames` bound.
    pub block_size: u32,
    /// Used when the source does not carry its own rate.
    pub sample_rate: u32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            block_size: 128,
            sample_rate: 48000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub params: Params,
    pub output_dir: String,
}

impl std::fmt::Display for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "------------------------------")?;

        writeln!(f, "Audio Settings:")?;
        writeln!(f, "{}", self.audio)?;

        writeln!(f, "Parameters:")?;
        writeln!(f, "{}", self.params)?;

        writeln!(f, "Output Directory: {}", self.output_dir)?;
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            audio: AudioSettings::default(),
            params: Params::default(),
            output_dir: "./renders".to_string(),
        }
    }
}

impl Settings {
    /// Load from the user config directory, writing defaults on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_settings_path())
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_settings_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path).context("Failed to read settings file")?;
            let settings: Self =
                serde_json::from_str(&contents).context("Failed to parse settings")?;
            debug!("Loaded settings from {:?}", path);
            Ok(settings.sanitized())
        } else {
            info!("No settings file found, using defaults");
            let settings = Self::default();
            // Try to save defaults, but don't fail if we can't
            let _ = settings.save_to(path);
            Ok(settings)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;

        fs::write(path, json).context("Failed to write settings file")?;

        debug!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Pull hand-edited values back into their valid ranges.
    fn sanitized(mut self) -> Self {
        if !self.params.is_in_range() {
            info!("Settings parameters out of range, clamping");
            self.params = self.params.clamped();
        }
        if self.audio.block_size == 0 {
            self.audio.block_size = AudioSettings::default().block_size;
        }
        if self.audio.sample_rate == 0 {
            self.audio.sample_rate = AudioSettings::default().sample_rate;
        }
        self
    }

    pub fn get_settings_path() -> PathBuf {
        // Try to use XDG config directory on Linux
        if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(config_dir)
                .join(APP_DIR)
                .join(SETTINGS_FILENAME)
        } else if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join(APP_DIR)
                .join(SETTINGS_FILENAME)
        } else {
            // Fallback to current directory
            PathBuf::from(".").join(SETTINGS_FILENAME)
        }
    }
}
