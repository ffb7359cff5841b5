//! One scheduling pass over all alarms, and the policy for when to run the next one.
//!
//! There is no timer thread. Whoever drives the app calls [`Scheduler::run_once`]
//! right after the user arms an alarm, and then again every tick interval for
//! as long as the last report said something is still pending. [`TickDriver`]
//! keeps track of that.

use std::time::{Duration, Instant};

use chrono::NaiveTime;
use log::{debug, error, info, warn};

use crate::{
    clock::ClockSource,
    config::AlarmPreset,
    error::AlarmError,
    registry::{AlarmRegistry, DisplayState, FireEvent},
};

/// Result of one scheduling pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerReport {
    /// alarms that fired in this pass, ascending by index
    pub events: Vec<FireEvent>,
    /// whether any alarm is still armed and waiting
    pub still_pending: bool,
}

#[derive(Debug)]
pub struct Scheduler<C> {
    clock: C,
    registry: AlarmRegistry,
}

impl<C: ClockSource> Scheduler<C> {
    #[must_use]
    pub const fn new(clock: C, registry: AlarmRegistry) -> Self {
        Self { clock, registry }
    }

    /// Arms alarm `index`, validating `time` against the clock right now.
    pub fn arm(&mut self, index: usize, time: NaiveTime) -> Result<(), AlarmError> {
        let now = self.clock.now();
        match self.registry.arm(index, time, now) {
            Ok(()) => {
                info!("alarm {} set for {time}", index + 1);
                Ok(())
            }
            Err(e) => {
                warn!("{e}");
                Err(e)
            }
        }
    }

    /// Arms every preset, in order. Presets in the past are rejected like any other arm.
    pub fn arm_presets(&mut self, presets: &[AlarmPreset]) -> Vec<(usize, Result<(), AlarmError>)> {
        presets
            .iter()
            .map(|preset| (preset.index, self.arm(preset.index, preset.time)))
            .collect()
    }

    pub fn run_once(&mut self) -> SchedulerReport {
        let now = self.clock.now();
        let events = self.registry.tick(now);
        for event in &events {
            info!(
                "alarm {} fired at {now} (set for {})",
                event.index + 1,
                event.fired_at_display_time
            );
        }
        let pending = self.registry.snapshot_pending();
        debug!("tick at {now}: {} fired, pending {pending:?}", events.len());
        SchedulerReport {
            events,
            still_pending: !pending.is_empty(),
        }
    }

    pub fn display_state(&self, index: usize) -> Result<DisplayState, AlarmError> {
        self.registry.display_state(index, self.clock.now())
    }

    #[must_use]
    pub fn now(&self) -> NaiveTime {
        self.clock.now()
    }

    #[must_use]
    pub const fn registry(&self) -> &AlarmRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }
}

/// Decides when the next scheduling pass is due.
///
/// Idle until [`TickDriver::request_now`] is called, then due once per
/// interval while the reports say something is pending.
#[derive(Debug, Clone)]
pub struct TickDriver {
    interval: Duration,
    next: Option<Instant>,
}

impl TickDriver {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: None,
        }
    }

    /// Makes a pass due immediately, called on every arm action.
    pub fn request_now(&mut self, now: Instant) {
        self.next = Some(now);
    }

    #[must_use]
    pub fn should_tick(&self, now: Instant) -> bool {
        self.next.is_some_and(|next| now >= next)
    }

    /// Records the outcome of a pass that ran at `now`.
    /// Returns the delay until the next pass, or `None` if going idle.
    pub fn schedule(&mut self, report: &SchedulerReport, now: Instant) -> Option<Duration> {
        if report.still_pending {
            let Some(next) = now.checked_add(self.interval) else {
                error!(
                    "tick interval of {:?} is too long to schedule, scheduler idle",
                    self.interval
                );
                self.next = None;
                return None;
            };
            self.next = Some(next);
            Some(self.interval)
        } else {
            if self.next.is_some() {
                debug!("no alarms pending, scheduler idle");
            }
            self.next = None;
            None
        }
    }

    /// Time left until the next pass, `None` when idle.
    #[must_use]
    pub fn until_next(&self, now: Instant) -> Option<Duration> {
        self.next.map(|next| next.saturating_duration_since(now))
    }

    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.next.is_none()
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}
