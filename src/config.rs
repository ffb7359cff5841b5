use std::{
    ops::Not,
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::NaiveTime;
use eframe::egui;
use log::info;
use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, registry::AlarmRegistry};

/// Upper bound for `alarm_count`.
pub const MAX_ALARMS: usize = 60;
/// Upper bound for `tick_interval_secs`.
pub const MAX_TICK_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Not for Theme {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

impl From<Theme> for egui::Visuals {
    fn from(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }
}

/// An alarm to arm as soon as the app starts.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct AlarmPreset {
    pub index: usize,
    #[serde(with = "toml_datetime_compat")]
    pub time: NaiveTime,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// how many alarm slots there are, fixed for the session
    pub alarm_count: usize,
    /// seconds between scheduling passes while an alarm is pending
    pub tick_interval_secs: u64,
    /// alarm `i` rings with `audio_dir/audio{i+1}.{sound_extension}`
    pub audio_dir: PathBuf,
    pub sound_extension: String,
    /// 0 to 100
    pub volume: f32,
    pub time_format: String,
    pub theme: Theme,
    pub presets: Vec<AlarmPreset>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alarm_count: 3,
            tick_interval_secs: 2,
            audio_dir: PathBuf::from("audio"),
            sound_extension: "mp3".to_string(),
            volume: 100.0,
            time_format: "%H:%M:%S".to_string(),
            theme: Theme::Dark,
            presets: vec![],
        }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&config)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, falling back to the defaults if there is no file there.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            info!("loading config from {}", path.display());
            Self::load(path)
        } else {
            info!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let config = toml::to_string(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, config)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_ALARMS).contains(&self.alarm_count) {
            return Err(ConfigError::Invalid(format!(
                "alarm_count must be between 1 and {MAX_ALARMS}, got {}",
                self.alarm_count
            )));
        }
        if !(1..=MAX_TICK_INTERVAL_SECS).contains(&self.tick_interval_secs) {
            return Err(ConfigError::Invalid(format!(
                "tick_interval_secs must be between 1 and {MAX_TICK_INTERVAL_SECS}, got {}",
                self.tick_interval_secs
            )));
        }
        if !(0.0..=100.0).contains(&self.volume) {
            return Err(ConfigError::Invalid(format!(
                "volume must be between 0 and 100, got {}",
                self.volume
            )));
        }
        if let Some(preset) = self.presets.iter().find(|p| p.index >= self.alarm_count) {
            return Err(ConfigError::Invalid(format!(
                "preset for alarm index {} but only {} alarms are configured",
                preset.index, self.alarm_count
            )));
        }
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let mut path = directories::ProjectDirs::from("", "", "roosty_alarms")
            .ok_or(ConfigError::NoProjectDirs)?
            .config_dir()
            .to_path_buf();
        path.push("config.toml");
        Ok(path)
    }

    #[must_use]
    pub fn sound_path(&self, index: usize) -> PathBuf {
        self.audio_dir
            .join(format!("audio{}.{}", index + 1, self.sound_extension))
    }

    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    /// Fresh, all idle alarm slots for this config.
    #[must_use]
    pub fn registry(&self) -> AlarmRegistry {
        AlarmRegistry::new(self.alarm_count, |index| self.sound_path(index))
    }
}
