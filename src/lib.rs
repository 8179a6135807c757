//! Enumerate ALSA mixer channels and drive their volume, mute and
//! record switches.
//!
//! ```no_run
//! use mixerctl::mixer::MixerController;
//!
//! # fn main() -> Result<(), mixerctl::error::DeviceError> {
//! let mixer = MixerController::alsa();
//! let (card, master) = mixer.default_selection()?;
//! println!("{}: {:?}", card, mixer.get_volume(&master)?);
//! mixer.set_volume(&master, 70, 70)?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod error;
pub mod log;
pub mod mixer;
pub mod model;
pub mod rts;
pub mod settings;
pub mod watch;

pub use error::DeviceError;
pub use mixer::MixerController;
