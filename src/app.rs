//! The window: time pickers per alarm on the left, alarm status in the middle.

use std::time::{Duration, Instant};

use chrono::{NaiveTime, Timelike};
use eframe::egui::{
    self, Button, CentralPanel, Color32, ComboBox, Layout, RichText, SidePanel, TopBottomPanel,
};
use log::error;

use crate::{
    audio::AudioPlayer,
    clock::{ClockSource, LocalClock},
    config::{Config, Theme},
    error::AlarmError,
    notify::{dispatch, AudioSink},
    registry::DisplayState,
    scheduler::{Scheduler, TickDriver},
};

/// How often the fired banner toggles between shown and hidden.
const BLINK_INTERVAL: Duration = Duration::from_millis(500);

/// Whether the fired banner is in its visible half at `time` seconds.
fn blink_visible(time: f64) -> bool {
    (time / BLINK_INTERVAL.as_secs_f64()).floor().rem_euclid(2.0) < 1.0
}

/// The hour/minute/second currently picked for one alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeInput {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl TimeInput {
    #[must_use]
    pub fn from_time(time: NaiveTime) -> Self {
        Self {
            hour: time.hour(),
            minute: time.minute(),
            second: time.second(),
        }
    }

    #[must_use]
    pub fn to_time(self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minute, self.second)
    }
}

/// Last thing that happened when the user pressed start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArmNotice {
    Set(NaiveTime),
    Rejected(String),
}

#[derive(Debug, Clone, Default)]
struct Slot {
    input: TimeInput,
    notice: Option<ArmNotice>,
    sound_error: Option<String>,
}

pub struct AlarmApp<C = LocalClock> {
    scheduler: Scheduler<C>,
    driver: TickDriver,
    sink: AudioSink,
    slots: Vec<Slot>,
    time_format: String,
    theme: Theme,
}

impl AlarmApp {
    #[must_use]
    pub fn new(config: &Config, player: AudioPlayer) -> Self {
        Self::with_clock(config, LocalClock, player)
    }
}

impl<C: ClockSource> AlarmApp<C> {
    pub fn with_clock(config: &Config, clock: C, player: AudioPlayer) -> Self {
        let now = TimeInput::from_time(clock.now());
        let mut app = Self {
            scheduler: Scheduler::new(clock, config.registry()),
            driver: TickDriver::new(config.tick_interval()),
            sink: AudioSink::new(player, config.volume),
            slots: vec![
                Slot {
                    input: now,
                    ..Slot::default()
                };
                config.alarm_count
            ],
            time_format: config.time_format.clone(),
            theme: config.theme,
        };
        for (index, result) in app.scheduler.arm_presets(&config.presets) {
            app.record_arm(index, result);
        }
        if !config.presets.is_empty() {
            app.driver.request_now(Instant::now());
        }
        app
    }

    /// Arms alarm `index` with what is picked for it and asks for a pass right away.
    pub fn start_alarm(&mut self, index: usize) {
        let Some(time) = self.slots.get(index).and_then(|slot| slot.input.to_time()) else {
            error!("no valid time picked for alarm {}", index + 1);
            return;
        };
        let result = self.scheduler.arm(index, time);
        self.record_arm(index, result);
        self.driver.request_now(Instant::now());
    }

    fn record_arm(&mut self, index: usize, result: Result<(), AlarmError>) {
        let Some(slot) = self.slots.get_mut(index) else {
            return;
        };
        match result {
            Ok(()) => {
                self.sink.player().stop(index);
                slot.sound_error = None;
                slot.notice = self
                    .scheduler
                    .registry()
                    .get(index)
                    .ok()
                    .and_then(|alarm| alarm.configured_time())
                    .map(ArmNotice::Set);
            }
            Err(e) => slot.notice = Some(ArmNotice::Rejected(e.to_string())),
        }
    }

    /// Runs a scheduling pass if one is due, returns whether it ran.
    pub fn drive(&mut self, now: Instant) -> bool {
        if !self.driver.should_tick(now) {
            return false;
        }
        let report = self.scheduler.run_once();
        for e in dispatch(&report.events, &mut self.sink) {
            if let Some(slot) = self.slots.get_mut(e.index()) {
                slot.sound_error = Some(e.to_string());
            }
        }
        self.driver.schedule(&report, now);
        true
    }

    /// Whether any alarm is showing its fired banner.
    #[must_use]
    pub fn any_fired(&self) -> bool {
        self.scheduler.registry().iter().any(crate::alarm::Alarm::is_fired)
    }

    #[must_use]
    pub const fn scheduler(&self) -> &Scheduler<C> {
        &self.scheduler
    }

    #[must_use]
    pub const fn driver(&self) -> &TickDriver {
        &self.driver
    }

    pub fn set_input(&mut self, index: usize, input: TimeInput) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.input = input;
        }
    }

    #[must_use]
    pub fn notice(&self, index: usize) -> Option<&ArmNotice> {
        self.slots.get(index).and_then(|slot| slot.notice.as_ref())
    }

    #[must_use]
    pub fn sound_error(&self, index: usize) -> Option<&str> {
        self.slots.get(index).and_then(|slot| slot.sound_error.as_deref())
    }

    fn render_header(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("title").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("⏰ Multi Alarm Clock");
                ui.with_layout(Layout::right_to_left(egui::Align::Center), |ui| {
                    let theme_btn = ui.add(Button::new(if self.theme == Theme::Dark {
                        "🌞"
                    } else {
                        "🌙"
                    }));
                    if theme_btn.clicked() {
                        self.theme = !self.theme;
                    }
                });
            });
            ui.label(format!(
                "Set up to {} alarms. Each alarm rings with its own sound!",
                self.slots.len()
            ));
        });
    }

    fn render_inputs(&mut self, ctx: &egui::Context) -> Option<usize> {
        let mut started = None;
        let time_format = &self.time_format;
        SidePanel::left("alarm_inputs").show(ctx, |ui| {
            for (i, slot) in self.slots.iter_mut().enumerate() {
                ui.heading(format!("Alarm {}", i + 1));
                ui.horizontal(|ui| {
                    number_picker(ui, &format!("Hour {}", i + 1), &mut slot.input.hour, 24);
                    number_picker(ui, &format!("Minute {}", i + 1), &mut slot.input.minute, 60);
                    number_picker(ui, &format!("Second {}", i + 1), &mut slot.input.second, 60);
                });
                if let Some(time) = slot.input.to_time() {
                    ui.label(format!("Alarm {} will be set for: {}", i + 1, time.format(time_format)));
                }
                if ui.button(format!("Start Alarm {}", i + 1)).clicked() {
                    started = Some(i);
                }
                match &slot.notice {
                    Some(ArmNotice::Set(time)) => {
                        ui.label(format!("✅ Alarm {} set for {}", i + 1, time.format(time_format)));
                    }
                    Some(ArmNotice::Rejected(reason)) => {
                        ui.colored_label(Color32::YELLOW, format!("⛔ {reason}"));
                    }
                    None => {}
                }
                ui.separator();
            }
        });
        started
    }

    fn render_status(&self, ctx: &egui::Context) {
        let visible = blink_visible(ctx.input(|i| i.time));
        CentralPanel::default().show(ctx, |ui| {
            for (i, slot) in self.slots.iter().enumerate() {
                match self.scheduler.display_state(i) {
                    Ok(DisplayState::Waiting(now)) => {
                        ui.label(format!(
                            "⏳ Alarm {} waiting... Current time: {}",
                            i + 1,
                            now.format(&self.time_format)
                        ));
                    }
                    Ok(DisplayState::Fired(time)) => {
                        let banner = RichText::new(format!(
                            "⏰ ALARM {}! It's {}! ⏰",
                            i + 1,
                            time.format(&self.time_format)
                        ))
                        .size(28.0)
                        .strong();
                        // hidden half keeps its space so the layout doesn't jump
                        ui.label(if visible {
                            banner
                        } else {
                            banner.color(Color32::TRANSPARENT)
                        });
                    }
                    Ok(DisplayState::Hidden) | Err(_) => {}
                }
                if let Some(e) = &slot.sound_error {
                    ui.colored_label(Color32::RED, e);
                }
            }
        });
    }
}

fn number_picker(ui: &mut egui::Ui, label: &str, value: &mut u32, bound: u32) {
    ComboBox::from_label(label)
        .width(48.0)
        .selected_text(format!("{value:02}"))
        .show_ui(ui, |ui| {
            for n in 0..bound {
                ui.selectable_value(value, n, format!("{n:02}"));
            }
        });
}

impl<C: ClockSource> eframe::App for AlarmApp<C> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(self.theme.into());
        self.render_header(ctx);
        if let Some(index) = self.render_inputs(ctx) {
            self.start_alarm(index);
        }
        let now = Instant::now();
        self.drive(now);
        // egui only repaints on input, so ask for the next pass explicitly
        if let Some(delay) = self.driver.until_next(now) {
            ctx.request_repaint_after(delay);
        }
        if self.any_fired() {
            ctx.request_repaint_after(BLINK_INTERVAL);
        }
        self.render_status(ctx);
    }
}
