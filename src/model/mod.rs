//! Plain data describing sound cards, their channels and what changed on them

pub mod card;
pub mod events;
pub mod level;

pub use card::{CardId, Capabilities, Capability, Channel, Device, Percent, Volume};
pub use events::MixerEvent;
pub use level::VolumeLevel;
