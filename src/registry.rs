//! The fixed set of alarm slots for a session.

use std::path::PathBuf;

use chrono::NaiveTime;

use crate::{
    alarm::{Alarm, AlarmState},
    error::AlarmError,
};

/// Emitted when an alarm goes from armed to fired during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FireEvent {
    pub index: usize,
    /// the time the alarm was set for, which is what gets shown
    pub fired_at_display_time: NaiveTime,
    pub sound: PathBuf,
}

/// What the presentation layer should show for one alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    /// armed, showing the current time
    Waiting(NaiveTime),
    /// rang, showing the alarm time until it is armed again
    Fired(NaiveTime),
    /// never armed
    Hidden,
}

#[derive(Debug, Clone)]
pub struct AlarmRegistry {
    alarms: Vec<Alarm>,
}

impl AlarmRegistry {
    /// Creates `count` idle alarms, indexed from zero.
    /// `sound` maps an index to that alarm's sound file.
    pub fn new(count: usize, sound: impl Fn(usize) -> PathBuf) -> Self {
        Self {
            alarms: (0..count).map(|index| Alarm::new(index, sound(index))).collect(),
        }
    }

    pub fn arm(&mut self, index: usize, time: NaiveTime, now: NaiveTime) -> Result<(), AlarmError> {
        let count = self.len();
        self.alarms
            .get_mut(index)
            .ok_or(AlarmError::IndexOutOfRange { index, count })?
            .arm(time, now)
    }

    /// Indices of alarms that are armed and haven't fired, ascending.
    #[must_use]
    pub fn snapshot_pending(&self) -> Vec<usize> {
        self.alarms
            .iter()
            .filter(|alarm| alarm.is_armed())
            .map(Alarm::index)
            .collect()
    }

    /// Fires every alarm that is due at `now`, in index order.
    ///
    /// Every alarm is checked against the same `now`. Alarms that already
    /// fired are never reported again.
    pub fn tick(&mut self, now: NaiveTime) -> Vec<FireEvent> {
        let mut events = Vec::new();
        for alarm in &mut self.alarms {
            if !alarm.is_due(now) {
                continue;
            }
            let Some(time) = alarm.configured_time() else {
                continue;
            };
            if alarm.fire() {
                events.push(FireEvent {
                    index: alarm.index(),
                    fired_at_display_time: time,
                    sound: alarm.sound_ref().to_path_buf(),
                });
            }
        }
        events
    }

    pub fn display_state(&self, index: usize, now: NaiveTime) -> Result<DisplayState, AlarmError> {
        let alarm = self.get(index)?;
        Ok(match (alarm.state(), alarm.configured_time()) {
            (AlarmState::Armed, _) => DisplayState::Waiting(now),
            (AlarmState::Fired, Some(time)) => DisplayState::Fired(time),
            _ => DisplayState::Hidden,
        })
    }

    pub fn get(&self, index: usize) -> Result<&Alarm, AlarmError> {
        self.alarms.get(index).ok_or(AlarmError::IndexOutOfRange {
            index,
            count: self.len(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Alarm> {
        self.alarms.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn registry() -> AlarmRegistry {
        AlarmRegistry::new(3, |i| PathBuf::from(format!("audio/audio{}.mp3", i + 1)))
    }

    #[test]
    fn starts_with_idle_alarms() {
        let registry = registry();
        assert_eq!(registry.len(), 3);
        assert!(registry.snapshot_pending().is_empty());
        for alarm in registry.iter() {
            assert_eq!(alarm.state(), AlarmState::Idle);
        }
        assert_eq!(
            registry.get(2).unwrap().sound_ref(),
            std::path::Path::new("audio/audio3.mp3")
        );
    }

    #[test]
    fn arm_out_of_range() {
        let mut registry = registry();
        assert_eq!(
            registry.arm(3, hms(9, 0, 0), hms(8, 0, 0)),
            Err(AlarmError::IndexOutOfRange { index: 3, count: 3 })
        );
        assert!(registry.get(7).is_err());
        assert!(registry.display_state(3, hms(8, 0, 0)).is_err());
    }

    #[test]
    fn pending_is_ascending() {
        let mut registry = registry();
        registry.arm(2, hms(9, 0, 0), hms(8, 0, 0)).unwrap();
        registry.arm(0, hms(10, 0, 0), hms(8, 0, 0)).unwrap();
        assert_eq!(registry.snapshot_pending(), vec![0, 2]);
    }

    #[test]
    fn tick_fires_due_alarms_in_index_order() {
        let mut registry = registry();
        registry.arm(2, hms(9, 0, 0), hms(8, 0, 0)).unwrap();
        registry.arm(0, hms(8, 30, 0), hms(8, 0, 0)).unwrap();
        registry.arm(1, hms(11, 0, 0), hms(8, 0, 0)).unwrap();

        let events = registry.tick(hms(9, 0, 1));
        let indices: Vec<_> = events.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(events[0].fired_at_display_time, hms(8, 30, 0));
        assert_eq!(events[1].sound, PathBuf::from("audio/audio3.mp3"));
        assert_eq!(registry.snapshot_pending(), vec![1]);
    }

    #[test]
    fn fired_alarms_are_not_reported_again() {
        let mut registry = registry();
        registry.arm(0, hms(8, 0, 5), hms(8, 0, 0)).unwrap();
        assert_eq!(registry.tick(hms(8, 0, 5)).len(), 1);
        assert!(registry.tick(hms(8, 0, 5)).is_empty());
        assert!(registry.tick(hms(12, 0, 0)).is_empty());
    }

    #[test]
    fn tick_before_time_changes_nothing() {
        let mut registry = registry();
        registry.arm(1, hms(8, 0, 5), hms(8, 0, 0)).unwrap();
        assert!(registry.tick(hms(8, 0, 4)).is_empty());
        assert!(registry.get(1).unwrap().is_armed());
    }

    #[test]
    fn display_states() {
        let mut registry = registry();
        registry.arm(0, hms(8, 0, 5), hms(8, 0, 0)).unwrap();
        registry.arm(1, hms(9, 0, 0), hms(8, 0, 0)).unwrap();
        registry.tick(hms(8, 0, 6));

        let now = hms(8, 0, 6);
        assert_eq!(registry.display_state(0, now), Ok(DisplayState::Fired(hms(8, 0, 5))));
        assert_eq!(registry.display_state(1, now), Ok(DisplayState::Waiting(now)));
        assert_eq!(registry.display_state(2, now), Ok(DisplayState::Hidden));
    }
}
