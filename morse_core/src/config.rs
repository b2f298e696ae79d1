//! Configuration file support for the Morse trainer.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/morse-trainer/config.toml`.

use crate::timing::derive_timings;
use crate::types::{LearningMethod, TimingProfile};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "morse-trainer";

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub curriculum: CurriculumConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Tone, speed and haptic settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Element speed in WPM
    #[serde(default = "default_char_speed")]
    pub char_speed: f64,

    /// Perceived speed in WPM; must not exceed `char_speed`
    #[serde(default = "default_effective_speed")]
    pub effective_speed: f64,

    #[serde(default = "default_pitch_hz")]
    pub pitch_hz: f64,

    #[serde(default = "default_volume_percent")]
    pub volume_percent: u8,

    #[serde(default)]
    pub haptic_enabled: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            char_speed: default_char_speed(),
            effective_speed: default_effective_speed(),
            pitch_hz: default_pitch_hz(),
            volume_percent: default_volume_percent(),
            haptic_enabled: false,
        }
    }
}

impl PlaybackConfig {
    /// Derive element and gap durations for these settings
    pub fn timings(&self) -> Result<TimingProfile> {
        derive_timings(self.char_speed, self.effective_speed)
    }
}

/// Which progression to generate lessons from
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct CurriculumConfig {
    #[serde(default)]
    pub method: LearningMethod,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from(".local/share"))
        .join(APP_DIR)
}

fn default_char_speed() -> f64 {
    20.0
}

fn default_effective_speed() -> f64 {
    15.0
}

fn default_pitch_hz() -> f64 {
    600.0
}

fn default_volume_percent() -> u8 {
    70
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(APP_DIR)
            .join("config.toml")
    }

    /// Check value ranges that serde can't express
    pub fn validate(&self) -> Result<()> {
        let playback = &self.playback;
        if !(playback.char_speed > 0.0) {
            return Err(Error::Config(format!(
                "char_speed must be positive, got {}",
                playback.char_speed
            )));
        }
        if !(playback.effective_speed > 0.0) {
            return Err(Error::Config(format!(
                "effective_speed must be positive, got {}",
                playback.effective_speed
            )));
        }
        if playback.effective_speed > playback.char_speed {
            tracing::warn!(
                "effective_speed {} exceeds char_speed {}; gaps will not be stretched",
                playback.effective_speed,
                playback.char_speed
            );
        }
        if !(playback.pitch_hz > 0.0) {
            return Err(Error::Config(format!(
                "pitch_hz must be positive, got {}",
                playback.pitch_hz
            )));
        }
        if playback.volume_percent > 100 {
            return Err(Error::Config(format!(
                "volume_percent must be at most 100, got {}",
                playback.volume_percent
            )));
        }
        Ok(())
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
