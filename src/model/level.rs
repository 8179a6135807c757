use super::card::Percent;

/// Coarse loudness bucket, used to pick a status icon
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VolumeLevel {
    Muted,
    Low,
    Medium,
    High,
}

impl VolumeLevel {
    pub fn classify(volume: Percent, muted: bool) -> Self {
        if volume <= 0 || muted {
            Self::Muted
        } else if volume >= 66 {
            Self::High
        } else if volume >= 33 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Freedesktop icon name for this level
    pub fn icon_name(self) -> &'static str {
        match self {
            Self::Muted => "audio-volume-muted",
            Self::Low => "audio-volume-low",
            Self::Medium => "audio-volume-medium",
            Self::High => "audio-volume-high",
        }
    }
}
