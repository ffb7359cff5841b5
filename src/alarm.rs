use std::path::{Path, PathBuf};

use chrono::NaiveTime;

use crate::error::AlarmError;

/// Where an alarm is in its one-shot cycle.
///
/// Armed and fired can never both be true, firing moves out of `Armed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlarmState {
    /// never armed since the session started
    #[default]
    Idle,
    Armed,
    /// rang, stays like this until armed again
    Fired,
}

/// represents one alarm slot
/// contains the time it should go off at and the sound it rings with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alarm {
    index: usize,
    configured_time: Option<NaiveTime>,
    state: AlarmState,
    sound: PathBuf,
}

impl Alarm {
    #[must_use]
    pub const fn new(index: usize, sound: PathBuf) -> Self {
        Self {
            index,
            configured_time: None,
            state: AlarmState::Idle,
            sound,
        }
    }

    /// Arms the alarm for `time`, which must be strictly after `now`.
    ///
    /// `now` is the moment of arming, not of any later tick. On rejection
    /// nothing changes. Arming an already armed alarm replaces its time.
    pub fn arm(&mut self, time: NaiveTime, now: NaiveTime) -> Result<(), AlarmError> {
        if time <= now {
            return Err(AlarmError::RejectedPastTime {
                index: self.index,
                requested: time,
                now,
            });
        }
        self.configured_time = Some(time);
        self.state = AlarmState::Armed;
        Ok(())
    }

    #[must_use]
    pub fn is_due(&self, now: NaiveTime) -> bool {
        match (self.state, self.configured_time) {
            (AlarmState::Armed, Some(time)) => now >= time,
            _ => false,
        }
    }

    /// Returns true if this call made the alarm fire.
    /// Firing an alarm that isn't armed does nothing.
    pub fn fire(&mut self) -> bool {
        if self.state != AlarmState::Armed {
            return false;
        }
        self.state = AlarmState::Fired;
        true
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn configured_time(&self) -> Option<NaiveTime> {
        self.configured_time
    }

    #[must_use]
    pub const fn state(&self) -> AlarmState {
        self.state
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.state == AlarmState::Armed
    }

    #[must_use]
    pub fn is_fired(&self) -> bool {
        self.state == AlarmState::Fired
    }

    #[must_use]
    pub fn sound_ref(&self) -> &Path {
        &self.sound
    }
}
