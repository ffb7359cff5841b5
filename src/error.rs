//! Error kinds for arming alarms, notifying fired alarms and loading config.

use std::path::PathBuf;

use chrono::NaiveTime;

/// Errors returned when arming an alarm.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlarmError {
    /// The requested time is not strictly after the time of arming.
    #[error("alarm {} rejected: {requested} is not after the current time {now}", .index + 1)]
    RejectedPastTime {
        index: usize,
        requested: NaiveTime,
        now: NaiveTime,
    },

    /// No alarm slot with this index exists.
    #[error("no alarm with index {index} (only {count} alarms are configured)")]
    IndexOutOfRange { index: usize, count: usize },
}

/// Errors surfaced while notifying a fired alarm.
///
/// None of these undo the fired transition, the alarm has already rung as
/// far as the scheduler is concerned.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("missing sound file {} for alarm {}", .path.display(), .index + 1)]
    MissingSoundResource { index: usize, path: PathBuf },

    #[error("couldn't open sound file {} for alarm {}: {source}", .path.display(), .index + 1)]
    SoundUnreadable {
        index: usize,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("audio playback is not running, alarm {} will be silent", .index + 1)]
    AudioUnavailable { index: usize },
}

impl NotifyError {
    /// Index of the alarm this failure belongs to.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::MissingSoundResource { index, .. }
            | Self::SoundUnreadable { index, .. }
            | Self::AudioUnavailable { index } => *index,
        }
    }
}

/// Errors that can occur when loading or saving the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("couldn't access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("couldn't parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("couldn't serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("couldn't determine the config directory")]
    NoProjectDirs,

    #[error("invalid config: {0}")]
    Invalid(String),
}
