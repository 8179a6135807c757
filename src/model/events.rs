//! Change notifications produced by polling the mixer

use super::card::Percent;

/// Something changed on a watched channel since the last poll
#[derive(Clone, Debug, PartialEq)]
pub enum MixerEvent {
    /// Called when the volume was moved, by us or by another program
    VolumeChanged {
        channel: String,
        left: Percent,
        right: Percent,
    },
    /// Called when the playback switch flipped
    MuteChanged { channel: String, muted: bool },
    /// Called when the capture switch flipped
    RecordChanged { channel: String, recording: bool },
    /// The control could not be read anymore (card unplugged?)
    ChannelLost { channel: String },
}

impl MixerEvent {
    pub fn channel(&self) -> &str {
        match self {
            Self::VolumeChanged { channel, .. }
            | Self::MuteChanged { channel, .. }
            | Self::RecordChanged { channel, .. }
            | Self::ChannelLost { channel } => channel,
        }
    }
}
