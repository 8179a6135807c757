use crate::error::DeviceError;
use crate::model::card::{CardId, Device, Volume};
use alsa::Direction;

mod alsa_card;
pub mod mock;

pub use alsa_card::AlsaBackend;
pub use mock::MockBackend;

/// Name and sub-index of a simple mixer element
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ControlId {
    pub name: String,
    pub index: u32,
}

impl ControlId {
    pub fn new<S: Into<String>>(name: S, index: u32) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }
}

/// One side of a stereo pair
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// What a single control half (playback or capture) offers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamInfo {
    pub has_volume: bool,
    pub has_switch: bool,
    /// True when a front-right channel exists next to front-left
    pub stereo: bool,
    pub volume_min: Volume,
    pub volume_max: Volume,
}

/// Raw capability flags of a control as reported by the driver
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlInfo {
    pub playback: StreamInfo,
    pub capture: StreamInfo,
}

/// The primitive calls the controller needs from a sound subsystem.
///
/// Every call is synchronous and independent: implementations open
/// whatever handle they need and release it before returning.
pub trait HardwareBackend {
    /// All cards currently present
    fn cards(&self) -> Result<Vec<Device>, DeviceError>;

    /// Simple mixer controls of a card, in enumeration order
    fn controls(&self, card: CardId) -> Result<Vec<ControlId>, DeviceError>;

    fn probe(&self, card: CardId, id: &ControlId) -> Result<ControlInfo, DeviceError>;

    fn volume(
        &self,
        card: CardId,
        id: &ControlId,
        dir: Direction,
        side: Side,
    ) -> Result<Volume, DeviceError>;

    fn set_volume(
        &self,
        card: CardId,
        id: &ControlId,
        dir: Direction,
        side: Side,
        value: Volume,
    ) -> Result<(), DeviceError>;

    /// Read the switch of the first channel of one half of a control
    fn switch(&self, card: CardId, id: &ControlId, dir: Direction) -> Result<bool, DeviceError>;

    /// Set the switch on every channel of one half of a control
    fn set_switch(
        &self,
        card: CardId,
        id: &ControlId,
        dir: Direction,
        on: bool,
    ) -> Result<(), DeviceError>;
}
