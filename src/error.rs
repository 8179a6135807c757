use thiserror::Error;

/// Every failure coming out of the sound subsystem
///
/// The controller does not try to tell the causes apart, the message
/// is only there for logs and for the user.
#[derive(Error, Debug)]
#[error("{context}")]
pub struct DeviceError {
    context: String,
    #[source]
    source: Option<alsa::Error>,
}

impl DeviceError {
    pub fn new<S: Into<String>>(context: S) -> Self {
        Self {
            context: context.into(),
            source: None,
        }
    }

    /// The control or its card is gone (unplugged, driver reloaded)
    pub fn vanished(card: i32, control: &str) -> Self {
        Self::new(format!("card {}: control '{}' no longer exists", card, control))
    }

    /// An operation was attempted that the channel has no capability for
    pub fn unsupported(control: &str, what: &str) -> Self {
        Self::new(format!("control '{}' does not support {}", control, what))
    }

    /// A lookup by name matched none of the card's channels
    pub fn unknown_channel(card: i32, name: &str) -> Self {
        Self::new(format!("card {}: no channel named '{}'", card, name))
    }

    pub fn no_usable_device() -> Self {
        Self::new("no usable audio device")
    }

    /// Attach some context to a raw ALSA error
    pub fn alsa<S: Into<String>>(context: S, e: alsa::Error) -> Self {
        Self {
            context: format!("{}: {}", context.into(), e),
            source: Some(e),
        }
    }
}

impl From<alsa::Error> for DeviceError {
    fn from(e: alsa::Error) -> Self {
        Self {
            context: e.to_string(),
            source: Some(e),
        }
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("settings i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings format: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_control() {
        let e = DeviceError::vanished(1, "Master");
        assert_eq!(e.to_string(), "card 1: control 'Master' no longer exists");

        let e = DeviceError::unsupported("Capture", "mute");
        assert!(e.to_string().contains("Capture"));
        assert!(std::error::Error::source(&e).is_none());
    }

    #[test]
    fn settings_error_wraps_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e: SettingsError = io.into();
        assert!(matches!(e, SettingsError::Io(_)));
        assert!(e.to_string().starts_with("settings i/o"));

        let json = serde_json::from_str::<u32>("nope").unwrap_err();
        let e: SettingsError = json.into();
        assert!(e.to_string().starts_with("settings format: "));
    }
}
