use std::{fs::File, io::BufReader};

/// A request for the playback thread, about one alarm's sound.
#[derive(Debug)]
pub struct Message {
    pub kind: MessageType,
    pub alarm_index: usize,
}

impl Message {
    #[must_use]
    pub const fn new(kind: MessageType, alarm_index: usize) -> Self {
        Self { kind, alarm_index }
    }
}

#[derive(Debug)]
pub enum MessageType {
    AlarmTriggered {
        volume: f32,
        sound: BufReader<File>,
    },
    // if the alarm got armed again while its sound is still playing
    AlarmStopped,
    /// let every playing sound finish, then shut the thread down
    Drain,
}
