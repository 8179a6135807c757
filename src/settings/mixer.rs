use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Remember which mixer to drive and how each channel is presented
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerSettings {
    /// Card name, `None` picks the first usable card
    pub device: Option<String>,
    /// Channel driven by the volume commands
    pub channel: Option<String>,
    /// Per channel preferences, by channel name
    pub channels: BTreeMap<String, ChannelPrefs>,
}

impl MixerSettings {
    pub fn prefs(&self, channel: &str) -> ChannelPrefs {
        self.channels.get(channel).cloned().unwrap_or_default()
    }

    pub fn prefs_mut(&mut self, channel: &str) -> &mut ChannelPrefs {
        self.channels.entry(channel.to_owned()).or_default()
    }
}

/// Encoding information about a single channel
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelPrefs {
    /// List the channel in `status`
    pub shown: bool,
    /// Left and right move together
    pub locked: bool,
    /// Last mute state the user picked
    pub muted: bool,
}

impl Default for ChannelPrefs {
    fn default() -> Self {
        Self {
            shown: true,
            locked: true,
            muted: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_channels_get_defaults() {
        let s = MixerSettings::default();
        assert_eq!(s.prefs("PCM"), ChannelPrefs::default());
        assert!(s.prefs("PCM").locked);
    }

    #[test]
    fn partial_json_is_filled_in() {
        let s: MixerSettings =
            serde_json::from_str(r#"{ "channels": { "PCM": { "shown": false } } }"#).unwrap();
        let pcm = s.prefs("PCM");
        assert!(!pcm.shown);
        assert!(pcm.locked);
        assert!(s.device.is_none());
    }
}
