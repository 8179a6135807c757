use alsa::Direction;
use std::fmt;

pub type CardId = i32;
/// Raw hardware volume, in the control's own units
pub type Volume = i64;
/// Volume as a percentage of the control's range
pub type Percent = i64;

/// Struct representing a sound card
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Device {
    pub index: CardId,
    pub name: String,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hw:{} ({})", self.index, self.name)
    }
}

/// A single operation a mixer channel can support
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    Volume,
    Mute,
    Record,
    Stereo,
}

const ALL: &[Capability] = &[
    Capability::Volume,
    Capability::Mute,
    Capability::Record,
    Capability::Stereo,
];

/// The set of operations supported by a channel, fixed at discovery
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub volume: bool,
    pub mute: bool,
    pub record: bool,
    pub stereo: bool,
}

impl Capabilities {
    pub fn contains(&self, cap: Capability) -> bool {
        match cap {
            Capability::Volume => self.volume,
            Capability::Mute => self.mute,
            Capability::Record => self.record,
            Capability::Stereo => self.stereo,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.volume || self.mute || self.record || self.stereo)
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        ALL.iter().copied().filter(move |c| self.contains(*c))
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self
            .iter()
            .map(|c| match c {
                Capability::Volume => "volume",
                Capability::Mute => "mute",
                Capability::Record => "record",
                Capability::Stereo => "stereo",
            })
            .collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

/// A mixer channel is typically a volume slider with a mute and/or
/// capture switch, exposed by ALSA as a simple mixer element.
///
/// This only describes the control; every read and write goes back to
/// the card, so dropping a `Channel` leaves the hardware untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct Channel {
    pub card: CardId,
    pub name: String,
    /// Sub-index for controls sharing a name (e.g. two "Capture" elements)
    pub index: u32,
    pub capabilities: Capabilities,
    /// Which half of the element carries the volume slider
    pub direction: Direction,
    pub volume_min: Volume,
    pub volume_max: Volume,
}

impl Channel {
    pub fn has(&self, cap: Capability) -> bool {
        self.capabilities.contains(cap)
    }

    pub fn is_playback(&self) -> bool {
        self.direction == Direction::Playback
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.index == 0 {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{},{}", self.name, self.index)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_capabilities() {
        assert!(Capabilities::default().is_empty());
        let caps = Capabilities {
            record: true,
            ..Default::default()
        };
        assert!(!caps.is_empty());
        assert!(caps.contains(Capability::Record));
        assert!(!caps.contains(Capability::Mute));
    }

    #[test]
    fn capabilities_display_in_fixed_order() {
        let caps = Capabilities {
            volume: true,
            mute: true,
            record: false,
            stereo: true,
        };
        assert_eq!(caps.to_string(), "{volume, mute, stereo}");
    }
}
