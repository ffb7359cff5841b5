#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]
#![deny(clippy::use_self, rust_2018_idioms)]
#![allow(clippy::multiple_crate_versions, clippy::module_name_repetitions)]

//! Up to three independent one-shot alarms, each ringing with its own sound.
//!
//! Nothing here runs on a timer. A driver (the [`app`] window, or the headless
//! loop in the binary) calls [`scheduler::Scheduler::run_once`] when the user
//! arms an alarm and then every couple of seconds while anything is pending,
//! handing the fired alarms to a [`notify::NotificationSink`].

pub mod alarm;
pub mod app;
pub mod audio;
pub mod clock;
pub mod communication;
pub mod config;
pub mod error;
pub mod notify;
pub mod registry;
pub mod scheduler;

pub use alarm::{Alarm, AlarmState};
pub use clock::{ClockSource, FixedClock, LocalClock};
pub use error::{AlarmError, ConfigError, NotifyError};
pub use registry::{AlarmRegistry, DisplayState, FireEvent};
pub use scheduler::{Scheduler, SchedulerReport, TickDriver};
