//! Turning fired alarms into something the user notices.

use std::{fs::File, io::BufReader, io::Write};

use log::error;

use crate::{audio::AudioPlayer, error::NotifyError, registry::FireEvent};

/// Consumer of the events a scheduling pass produced.
pub trait NotificationSink {
    fn notify(&mut self, event: &FireEvent) -> Result<(), NotifyError>;
}

/// Notifies `sink` of every event, in order.
///
/// A failing notification never stops the ones after it. The failures are
/// returned so the caller can show them.
pub fn dispatch<S: NotificationSink + ?Sized>(
    events: &[FireEvent],
    sink: &mut S,
) -> Vec<NotifyError> {
    events
        .iter()
        .filter_map(|event| {
            sink.notify(event)
                .map_err(|e| {
                    error!("{e}");
                    e
                })
                .err()
        })
        .collect()
}

/// Opens the sound file of a fired alarm.
pub fn open_sound(event: &FireEvent) -> Result<BufReader<File>, NotifyError> {
    if !event.sound.is_file() {
        return Err(NotifyError::MissingSoundResource {
            index: event.index,
            path: event.sound.clone(),
        });
    }
    File::open(&event.sound)
        .map(BufReader::new)
        .map_err(|source| NotifyError::SoundUnreadable {
            index: event.index,
            path: event.sound.clone(),
            source,
        })
}

/// Plays each fired alarm's sound.
#[derive(Debug)]
pub struct AudioSink {
    player: AudioPlayer,
    volume: f32,
}

impl AudioSink {
    #[must_use]
    pub const fn new(player: AudioPlayer, volume: f32) -> Self {
        Self { player, volume }
    }

    #[must_use]
    pub const fn player(&self) -> &AudioPlayer {
        &self.player
    }

    /// Lets playing sounds finish before returning.
    pub fn finish(self) {
        self.player.finish();
    }
}

impl NotificationSink for AudioSink {
    fn notify(&mut self, event: &FireEvent) -> Result<(), NotifyError> {
        let sound = open_sound(event)?;
        self.player.play(event.index, sound, self.volume)
    }
}

/// Prints a banner for each fired alarm, then hands it on to the audio sink.
#[derive(Debug)]
pub struct TerminalSink<W> {
    out: W,
    audio: AudioSink,
    time_format: String,
}

impl<W: Write> TerminalSink<W> {
    #[must_use]
    pub const fn new(out: W, audio: AudioSink, time_format: String) -> Self {
        Self {
            out,
            audio,
            time_format,
        }
    }

    #[must_use]
    pub const fn audio(&self) -> &AudioSink {
        &self.audio
    }

    #[must_use]
    pub fn into_parts(self) -> (W, AudioSink) {
        (self.out, self.audio)
    }
}

impl<W: Write> NotificationSink for TerminalSink<W> {
    fn notify(&mut self, event: &FireEvent) -> Result<(), NotifyError> {
        // the banner must show up even when the sound can't be played
        if let Err(e) = writeln!(
            self.out,
            "⏰ ALARM {}! It's {}! ⏰",
            event.index + 1,
            event.fired_at_display_time.format(&self.time_format)
        ) {
            error!("couldn't print alarm banner: {e}");
        }
        self.audio.notify(event)
    }
}
