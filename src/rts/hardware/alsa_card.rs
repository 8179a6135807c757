use super::{ControlId, ControlInfo, HardwareBackend, Side, StreamInfo};
use crate::error::DeviceError;
use crate::model::card::{CardId, Device, Volume};
use alsa::card::Iter as CardIter;
use alsa::mixer::{Mixer, Selem, SelemChannelId, SelemId};
use alsa::Direction;
use tracing::{debug, trace};

/// Talks to the kernel through alsa-lib's simple mixer interface
///
/// No handle is kept between calls: each operation opens `hw:<card>`,
/// looks the element up and drops the mixer again.  This means a card
/// that was unplugged shows up as an error on the next call instead of
/// a stale handle.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlsaBackend;

impl AlsaBackend {
    pub fn new() -> Self {
        Self
    }

    fn open(card: CardId) -> Result<Mixer, DeviceError> {
        Mixer::new(&format!("hw:{}", card), false)
            .map_err(|e| DeviceError::alsa(format!("card {}: failed to open mixer", card), e))
    }

    fn with_selem<T>(
        card: CardId,
        id: &ControlId,
        f: impl FnOnce(&Selem) -> Result<T, DeviceError>,
    ) -> Result<T, DeviceError> {
        let mixer = Self::open(card)?;
        let selem_id = SelemId::new(&id.name, id.index);
        let selem = mixer
            .find_selem(&selem_id)
            .ok_or_else(|| DeviceError::vanished(card, &id.name))?;
        f(&selem)
    }

    fn channel_id(side: Side) -> SelemChannelId {
        match side {
            Side::Left => SelemChannelId::FrontLeft,
            Side::Right => SelemChannelId::FrontRight,
        }
    }

    fn stream_info(selem: &Selem, dir: Direction) -> StreamInfo {
        let right = SelemChannelId::FrontRight;
        match dir {
            Direction::Playback => {
                let has_volume = selem.has_playback_volume();
                let (volume_min, volume_max) = if has_volume {
                    selem.get_playback_volume_range()
                } else {
                    (0, 0)
                };
                StreamInfo {
                    has_volume,
                    has_switch: selem.has_playback_switch(),
                    stereo: has_volume && selem.has_playback_channel(right),
                    volume_min,
                    volume_max,
                }
            }
            Direction::Capture => {
                let has_volume = selem.has_capture_volume();
                let (volume_min, volume_max) = if has_volume {
                    selem.get_capture_volume_range()
                } else {
                    (0, 0)
                };
                StreamInfo {
                    has_volume,
                    has_switch: selem.has_capture_switch(),
                    stereo: has_volume && selem.has_capture_channel(right),
                    volume_min,
                    volume_max,
                }
            }
        }
    }
}

impl HardwareBackend for AlsaBackend {
    fn cards(&self) -> Result<Vec<Device>, DeviceError> {
        let mut devices = Vec::new();
        for card in CardIter::new() {
            let card = card.map_err(|e| DeviceError::alsa("failed to enumerate cards", e))?;
            let index = card.get_index();
            let name = card
                .get_name()
                .map_err(|e| DeviceError::alsa(format!("card {}: no name", index), e))?;
            devices.push(Device { index, name });
        }
        Ok(devices)
    }

    fn controls(&self, card: CardId) -> Result<Vec<ControlId>, DeviceError> {
        let mixer = Self::open(card)?;
        let mut ids = Vec::new();
        for elem in mixer.iter() {
            let selem = match Selem::new(elem) {
                Some(s) => s,
                None => continue,
            };
            let sid = selem.get_id();
            match sid.get_name() {
                Ok(name) => ids.push(ControlId::new(name, sid.get_index())),
                Err(e) => debug!("card {}: skipping unnamed element: {}", card, e),
            }
        }
        Ok(ids)
    }

    fn probe(&self, card: CardId, id: &ControlId) -> Result<ControlInfo, DeviceError> {
        Self::with_selem(card, id, |selem| {
            Ok(ControlInfo {
                playback: Self::stream_info(selem, Direction::Playback),
                capture: Self::stream_info(selem, Direction::Capture),
            })
        })
    }

    fn volume(
        &self,
        card: CardId,
        id: &ControlId,
        dir: Direction,
        side: Side,
    ) -> Result<Volume, DeviceError> {
        Self::with_selem(card, id, |selem| {
            let ch = Self::channel_id(side);
            let v = match dir {
                Direction::Playback => selem.get_playback_volume(ch),
                Direction::Capture => selem.get_capture_volume(ch),
            };
            v.map_err(|e| DeviceError::alsa(format!("{}: read {:?} volume", id.name, side), e))
        })
    }

    fn set_volume(
        &self,
        card: CardId,
        id: &ControlId,
        dir: Direction,
        side: Side,
        value: Volume,
    ) -> Result<(), DeviceError> {
        Self::with_selem(card, id, |selem| {
            let ch = Self::channel_id(side);
            let present = match dir {
                Direction::Playback => selem.has_playback_channel(ch),
                Direction::Capture => selem.has_capture_channel(ch),
            };
            if !present {
                return Err(DeviceError::new(format!(
                    "{}: no {:?} channel",
                    id.name, side
                )));
            }
            trace!("card {}: {} {:?} <- {}", card, id.name, side, value);
            let r = match dir {
                Direction::Playback => selem.set_playback_volume(ch, value),
                Direction::Capture => selem.set_capture_volume(ch, value),
            };
            r.map_err(|e| DeviceError::alsa(format!("{}: write {:?} volume", id.name, side), e))
        })
    }

    fn switch(&self, card: CardId, id: &ControlId, dir: Direction) -> Result<bool, DeviceError> {
        Self::with_selem(card, id, |selem| {
            let ch = SelemChannelId::FrontLeft;
            let v = match dir {
                Direction::Playback if selem.has_playback_switch() => {
                    selem.get_playback_switch(ch)
                }
                Direction::Capture if selem.has_capture_switch() => selem.get_capture_switch(ch),
                _ => return Err(DeviceError::unsupported(&id.name, "switching")),
            };
            v.map(|v| v != 0)
                .map_err(|e| DeviceError::alsa(format!("{}: read switch", id.name), e))
        })
    }

    fn set_switch(
        &self,
        card: CardId,
        id: &ControlId,
        dir: Direction,
        on: bool,
    ) -> Result<(), DeviceError> {
        Self::with_selem(card, id, |selem| {
            let value = if on { 1 } else { 0 };
            let r = match dir {
                Direction::Playback if selem.has_playback_switch() => {
                    selem.set_playback_switch_all(value)
                }
                Direction::Capture if selem.has_capture_switch() => {
                    selem.set_capture_switch_all(value)
                }
                _ => return Err(DeviceError::unsupported(&id.name, "switching")),
            };
            r.map_err(|e| DeviceError::alsa(format!("{}: write switch", id.name), e))
        })
    }
}
