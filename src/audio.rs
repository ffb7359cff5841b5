//! Background playback of alarm sounds.
//!
//! The rodio output stream lives on its own thread and is fed through a channel,
//! scheduling never happens there.

use std::{
    collections::HashMap,
    fs::File,
    io::BufReader,
    sync::mpsc::{self, Receiver, Sender, SyncSender},
    thread::{self, JoinHandle},
};

use log::{error, info, warn};
use rodio::{Decoder, OutputStreamBuilder, Sink};

use crate::{
    communication::{Message, MessageType},
    error::NotifyError,
};

#[derive(Debug)]
pub struct AudioPlayer {
    sender: Sender<Message>,
    handle: Option<JoinHandle<()>>,
}

impl AudioPlayer {
    /// Starts the playback thread and waits until it has opened the output device.
    ///
    /// If no output device can be opened the thread has already exited when
    /// this returns, so every [`AudioPlayer::play`] reports
    /// [`NotifyError::AudioUnavailable`].
    #[must_use]
    pub fn spawn() -> Self {
        Self::start(playback_loop)
    }

    /// Runs `body` on the playback thread. `body` reports on the ready channel
    /// whether it will serve messages, and must return right away if not.
    fn start<F>(body: F) -> Self
    where
        F: FnOnce(&Receiver<Message>, &SyncSender<bool>) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::sync_channel(0);
        let handle = match thread::Builder::new()
            .name("alarm-audio".to_string())
            .spawn(move || body(&rx, &ready_tx))
        {
            Ok(handle) => handle,
            Err(e) => {
                error!("couldn't start audio thread: {e}");
                return Self {
                    sender: tx,
                    handle: None,
                };
            }
        };
        // a dropped ready sender means the thread died before answering
        if ready_rx.recv().unwrap_or(false) {
            return Self {
                sender: tx,
                handle: Some(handle),
            };
        }
        // joining drops the receiver, so sends fail from here on
        if handle.join().is_err() {
            error!("audio thread panicked");
        }
        Self {
            sender: tx,
            handle: None,
        }
    }

    /// A player whose messages go to `sender` instead of a playback thread.
    #[must_use]
    pub const fn with_channel(sender: Sender<Message>) -> Self {
        Self {
            sender,
            handle: None,
        }
    }

    pub fn play(
        &self,
        alarm_index: usize,
        sound: BufReader<File>,
        volume: f32,
    ) -> Result<(), NotifyError> {
        self.sender
            .send(Message::new(
                MessageType::AlarmTriggered { volume, sound },
                alarm_index,
            ))
            .map_err(|_| NotifyError::AudioUnavailable { index: alarm_index })
    }

    pub fn stop(&self, alarm_index: usize) {
        // nothing is playing if the thread is gone
        let _ = self
            .sender
            .send(Message::new(MessageType::AlarmStopped, alarm_index));
    }

    /// Waits for every sound that is still playing, then stops the thread.
    pub fn finish(mut self) {
        if self.sender.send(Message::new(MessageType::Drain, 0)).is_err() {
            return;
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("audio thread panicked");
            }
        }
    }
}

fn playback_loop(rx: &Receiver<Message>, ready: &SyncSender<bool>) {
    let stream = match OutputStreamBuilder::open_default_stream() {
        Ok(stream) => stream,
        Err(e) => {
            error!("couldn't open audio output, alarms will be silent: {e}");
            let _ = ready.send(false);
            return;
        }
    };
    let _ = ready.send(true);
    let mut sinks: HashMap<usize, Sink> = HashMap::new();
    while let Ok(Message { kind, alarm_index }) = rx.recv() {
        match kind {
            MessageType::AlarmTriggered { volume, sound } => match Decoder::new(sound) {
                Ok(source) => {
                    info!("playing sound for alarm {}", alarm_index + 1);
                    let sink = Sink::connect_new(stream.mixer());
                    sink.set_volume(volume / 100.0);
                    sink.append(source);
                    sink.play();
                    if let Some(old) = sinks.insert(alarm_index, sink) {
                        old.stop();
                    }
                }
                Err(e) => error!("couldn't decode sound for alarm {}: {e}", alarm_index + 1),
            },
            MessageType::AlarmStopped => {
                if let Some(sink) = sinks.remove(&alarm_index) {
                    info!("alarm {} stopped", alarm_index + 1);
                    sink.stop();
                }
            }
            MessageType::Drain => {
                for sink in sinks.values() {
                    sink.sleep_until_end();
                }
                return;
            }
        }
        sinks.retain(|_, sink| !sink.empty());
    }
    warn!("audio channel closed");
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, sync::mpsc::RecvTimeoutError, time::Duration};

    use super::*;

    fn sound_file(name: &str) -> (PathBuf, BufReader<File>) {
        let path = std::env::temp_dir().join(format!(
            "roosty_alarms_audio_{}_{name}.mp3",
            std::process::id()
        ));
        std::fs::write(&path, b"not really an mp3").unwrap();
        let file = BufReader::new(File::open(&path).unwrap());
        (path, file)
    }

    #[test]
    fn failed_output_device_makes_play_fail_at_once() {
        let player = AudioPlayer::start(|_, ready| {
            let _ = ready.send(false);
        });
        let (path, sound) = sound_file("failed");
        assert!(matches!(
            player.play(1, sound, 100.0),
            Err(NotifyError::AudioUnavailable { index: 1 })
        ));
        player.finish();
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn thread_dying_before_ready_counts_as_failed() {
        let player = AudioPlayer::start(|_, _| {});
        let (path, sound) = sound_file("died");
        assert!(player.play(0, sound, 100.0).is_err());
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn ready_thread_receives_messages() {
        let (seen_tx, seen_rx) = mpsc::channel();
        let player = AudioPlayer::start(move |rx, ready| {
            let _ = ready.send(true);
            while let Ok(message) = rx.recv() {
                let drain = matches!(message.kind, MessageType::Drain);
                let _ = seen_tx.send(message.alarm_index);
                if drain {
                    return;
                }
            }
        });
        player.stop(2);
        assert_eq!(seen_rx.recv_timeout(Duration::from_secs(5)), Ok(2));
        player.finish();
        assert_eq!(seen_rx.recv_timeout(Duration::from_secs(5)), Ok(0));
        assert_eq!(
            seen_rx.recv_timeout(Duration::from_millis(100)),
            Err(RecvTimeoutError::Disconnected)
        );
    }
}
