//! In-memory sound cards for running without hardware
//!
//! The mock is cheap to clone and every clone shares the same cards, so
//! a test can hold one clone to play "another program" touching the
//! mixer while the controller works through its own.

use super::{ControlId, ControlInfo, HardwareBackend, Side, StreamInfo};
use crate::error::DeviceError;
use crate::model::card::{CardId, Device, Volume};
use alsa::Direction;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// One half (playback or capture) of a mock control
#[derive(Clone, Debug, Default)]
pub struct MockStream {
    /// One entry per channel, empty when there is no volume slider
    pub volume: Vec<Volume>,
    pub range: (Volume, Volume),
    pub switch: Option<bool>,
}

impl MockStream {
    fn info(&self) -> StreamInfo {
        StreamInfo {
            has_volume: !self.volume.is_empty(),
            has_switch: self.switch.is_some(),
            stereo: self.volume.len() > 1,
            volume_min: self.range.0,
            volume_max: self.range.1,
        }
    }
}

#[derive(Clone, Debug)]
pub struct MockControl {
    pub id: ControlId,
    pub playback: MockStream,
    pub capture: MockStream,
}

impl MockControl {
    /// A control without any volume or switch
    pub fn bare(name: &str) -> Self {
        Self {
            id: ControlId::new(name, 0),
            playback: MockStream::default(),
            capture: MockStream::default(),
        }
    }

    /// A playback slider with a 0..=max range, mono or stereo
    pub fn playback(name: &str, channels: usize, max: Volume, value: Volume) -> Self {
        let mut c = Self::bare(name);
        c.playback.volume = vec![value; channels];
        c.playback.range = (0, max);
        c
    }

    /// A capture slider with a 0..=max range, mono or stereo
    pub fn capture(name: &str, channels: usize, max: Volume, value: Volume) -> Self {
        let mut c = Self::bare(name);
        c.capture.volume = vec![value; channels];
        c.capture.range = (0, max);
        c
    }

    /// Add a playback switch; `muted` is the initial state
    pub fn with_mute(mut self, muted: bool) -> Self {
        self.playback.switch = Some(!muted);
        self
    }

    /// Add a capture switch
    pub fn with_record(mut self, recording: bool) -> Self {
        self.capture.switch = Some(recording);
        self
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.id.index = index;
        self
    }

    fn stream(&self, dir: Direction) -> &MockStream {
        match dir {
            Direction::Playback => &self.playback,
            Direction::Capture => &self.capture,
        }
    }

    fn stream_mut(&mut self, dir: Direction) -> &mut MockStream {
        match dir {
            Direction::Playback => &mut self.playback,
            Direction::Capture => &mut self.capture,
        }
    }
}

#[derive(Clone, Debug)]
pub struct MockCard {
    pub device: Device,
    pub controls: Vec<MockControl>,
}

impl MockCard {
    pub fn new(index: CardId, name: &str) -> Self {
        Self {
            device: Device {
                index,
                name: name.to_owned(),
            },
            controls: Vec::new(),
        }
    }

    pub fn control(mut self, c: MockControl) -> Self {
        self.controls.push(c);
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct MockBackend {
    cards: Arc<RwLock<Vec<MockCard>>>,
}

impl MockBackend {
    pub fn new(cards: Vec<MockCard>) -> Self {
        Self {
            cards: Arc::new(RwLock::new(cards)),
        }
    }

    /// A laptop-ish card: stereo Master with mute, stereo PCM, a capture
    /// slider with record switch, a mono boost and two controls that
    /// carry nothing useful.
    pub fn demo() -> Self {
        Self::new(vec![MockCard::new(0, "default")
            .control(MockControl::playback("Master", 2, 87, 43).with_mute(false))
            .control(MockControl::playback("PCM", 2, 255, 255))
            .control(MockControl::bare("Loopback Mixing"))
            .control(MockControl::capture("Capture", 2, 63, 40).with_record(true))
            .control(MockControl::playback("Mic Boost", 1, 3, 0))
            .control(MockControl::bare("Auto-Mute Mode"))])
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<MockCard>> {
        self.cards.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<MockCard>> {
        self.cards.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Pull a card out, as if its USB cable was yanked
    pub fn unplug(&self, card: CardId) {
        self.write().retain(|c| c.device.index != card);
    }

    /// Poke a raw value behind the controller's back
    pub fn poke_volume(&self, card: CardId, name: &str, dir: Direction, values: &[Volume]) {
        let mut cards = self.write();
        if let Some(c) = find_control_mut(&mut cards, card, &ControlId::new(name, 0)) {
            c.stream_mut(dir).volume = values.to_vec();
        }
    }

    pub fn poke_switch(&self, card: CardId, name: &str, dir: Direction, on: bool) {
        let mut cards = self.write();
        if let Some(c) = find_control_mut(&mut cards, card, &ControlId::new(name, 0)) {
            c.stream_mut(dir).switch = Some(on);
        }
    }

    /// Raw per-channel values as the "hardware" holds them
    pub fn raw_volume(&self, card: CardId, name: &str, dir: Direction) -> Vec<Volume> {
        let cards = self.read();
        find_control(&cards, card, &ControlId::new(name, 0))
            .map(|c| c.stream(dir).volume.clone())
            .unwrap_or_default()
    }

    pub fn raw_switch(&self, card: CardId, name: &str, dir: Direction) -> Option<bool> {
        let cards = self.read();
        find_control(&cards, card, &ControlId::new(name, 0)).and_then(|c| c.stream(dir).switch)
    }

    fn with_control<T>(
        &self,
        card: CardId,
        id: &ControlId,
        f: impl FnOnce(&MockControl) -> Result<T, DeviceError>,
    ) -> Result<T, DeviceError> {
        let cards = self.read();
        let c = find_control(&cards, card, id).ok_or_else(|| DeviceError::vanished(card, &id.name))?;
        f(c)
    }

    fn with_control_mut<T>(
        &self,
        card: CardId,
        id: &ControlId,
        f: impl FnOnce(&mut MockControl) -> Result<T, DeviceError>,
    ) -> Result<T, DeviceError> {
        let mut cards = self.write();
        let c = find_control_mut(&mut cards, card, id)
            .ok_or_else(|| DeviceError::vanished(card, &id.name))?;
        f(c)
    }
}

fn find_control<'a>(cards: &'a [MockCard], card: CardId, id: &ControlId) -> Option<&'a MockControl> {
    cards
        .iter()
        .find(|c| c.device.index == card)
        .and_then(|c| c.controls.iter().find(|ctl| &ctl.id == id))
}

fn find_control_mut<'a>(
    cards: &'a mut [MockCard],
    card: CardId,
    id: &ControlId,
) -> Option<&'a mut MockControl> {
    cards
        .iter_mut()
        .find(|c| c.device.index == card)
        .and_then(|c| c.controls.iter_mut().find(|ctl| &ctl.id == id))
}

fn slot(side: Side) -> usize {
    match side {
        Side::Left => 0,
        Side::Right => 1,
    }
}

impl HardwareBackend for MockBackend {
    fn cards(&self) -> Result<Vec<Device>, DeviceError> {
        Ok(self.read().iter().map(|c| c.device.clone()).collect())
    }

    fn controls(&self, card: CardId) -> Result<Vec<ControlId>, DeviceError> {
        self.read()
            .iter()
            .find(|c| c.device.index == card)
            .map(|c| c.controls.iter().map(|ctl| ctl.id.clone()).collect())
            .ok_or_else(|| DeviceError::new(format!("card {}: failed to open mixer", card)))
    }

    fn probe(&self, card: CardId, id: &ControlId) -> Result<ControlInfo, DeviceError> {
        self.with_control(card, id, |c| {
            Ok(ControlInfo {
                playback: c.playback.info(),
                capture: c.capture.info(),
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
        self.with_control(card, id, |c| {
            c.stream(dir)
                .volume
                .get(slot(side))
                .copied()
                .ok_or_else(|| DeviceError::new(format!("{}: no {:?} channel", id.name, side)))
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
        self.with_control_mut(card, id, |c| {
            let s = c.stream_mut(dir);
            let (min, max) = s.range;
            match s.volume.get_mut(slot(side)) {
                Some(v) => {
                    *v = value.max(min).min(max);
                    Ok(())
                }
                None => Err(DeviceError::new(format!("{}: no {:?} channel", id.name, side))),
            }
        })
    }

    fn switch(&self, card: CardId, id: &ControlId, dir: Direction) -> Result<bool, DeviceError> {
        self.with_control(card, id, |c| {
            c.stream(dir)
                .switch
                .ok_or_else(|| DeviceError::unsupported(&id.name, "switching"))
        })
    }

    fn set_switch(
        &self,
        card: CardId,
        id: &ControlId,
        dir: Direction,
        on: bool,
    ) -> Result<(), DeviceError> {
        self.with_control_mut(card, id, |c| match c.stream_mut(dir).switch.as_mut() {
            Some(s) => {
                *s = on;
                Ok(())
            }
            None => Err(DeviceError::unsupported(&id.name, "switching")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let a = MockBackend::demo();
        let b = a.clone();
        let id = ControlId::new("PCM", 0);
        b.set_volume(0, &id, Direction::Playback, Side::Right, 100)
            .unwrap();
        assert_eq!(
            a.volume(0, &id, Direction::Playback, Side::Right).unwrap(),
            100
        );
    }

    #[test]
    fn mono_has_no_right_side() {
        let m = MockBackend::demo();
        let id = ControlId::new("Mic Boost", 0);
        assert!(m
            .set_volume(0, &id, Direction::Playback, Side::Right, 1)
            .is_err());
        assert!(!m.probe(0, &id).unwrap().playback.stereo);
    }

    #[test]
    fn unplugged_card_loses_controls() {
        let m = MockBackend::demo();
        m.unplug(0);
        assert!(m.cards().unwrap().is_empty());
        assert!(m.probe(0, &ControlId::new("Master", 0)).is_err());
    }
}
