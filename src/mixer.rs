//! The mixer channel controller
//!
//! Enumerates cards and their mixer channels, and reads/writes volume,
//! mute and record state on them.  Everything here is a direct,
//! blocking call into the sound subsystem: there is no cache, no lock
//! and no background thread.  Callers that share a controller between
//! threads must serialise access themselves.

use crate::error::DeviceError;
use crate::model::card::{CardId, Capabilities, Capability, Channel, Device, Percent, Volume};
use crate::rts::hardware::{AlsaBackend, ControlId, ControlInfo, HardwareBackend, Side};
use alsa::Direction;
use tracing::{debug, warn};

pub const MAX_PERCENT: Percent = 100;

pub struct MixerController<B = AlsaBackend> {
    backend: B,
}

impl MixerController<AlsaBackend> {
    /// Controller for the system's ALSA cards
    pub fn alsa() -> Self {
        Self::new(AlsaBackend::new())
    }
}

impl<B: HardwareBackend> MixerController<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// All cards currently present.  Nothing is cached, so calling this
    /// again picks up hot-plugged devices.
    pub fn list_devices(&self) -> Result<Vec<Device>, DeviceError> {
        let devices = self.backend.cards()?;
        debug!("found {} card(s)", devices.len());
        Ok(devices)
    }

    /// Every control of `device` that supports at least one operation,
    /// in the order the driver lists them.
    pub fn list_channels(&self, device: &Device) -> Result<Vec<Channel>, DeviceError> {
        let mut channels = Vec::new();
        for id in self.backend.controls(device.index)? {
            let info = match self.backend.probe(device.index, &id) {
                Ok(info) => info,
                Err(e) => {
                    debug!("{}: skipping '{}': {}", device, id.name, e);
                    continue;
                }
            };

            let channel = channel_from_info(device.index, id, &info);
            if channel.capabilities.is_empty() {
                debug!("{}: '{}' has no capabilities", device, channel);
                continue;
            }
            channels.push(channel);
        }
        Ok(channels)
    }

    /// Current volume as (left, right) percentages.  Mono channels
    /// report the same value on both sides.
    pub fn get_volume(&self, channel: &Channel) -> Result<(Percent, Percent), DeviceError> {
        if !channel.has(Capability::Volume) {
            return Err(DeviceError::unsupported(&channel.name, "volume"));
        }

        let left = self.read_side(channel, Side::Left)?;
        let right = if channel.has(Capability::Stereo) {
            self.read_side(channel, Side::Right)?
        } else {
            left
        };
        Ok((left, right))
    }

    /// Clamp both sides to 0..=100 and write them one at a time.
    ///
    /// A side the device refuses (e.g. right on a mono control) is
    /// logged and skipped; the other side is still written.  Only when
    /// no side could be written (card gone, control vanished) is the
    /// error returned.
    pub fn set_volume(
        &self,
        channel: &Channel,
        left: Percent,
        right: Percent,
    ) -> Result<(), DeviceError> {
        if !channel.has(Capability::Volume) {
            debug!("'{}': ignoring volume change, no volume control", channel);
            return Ok(());
        }

        let id = control_id(channel);
        let mut first_err = None;
        let mut written = 0;
        for (side, value) in [(Side::Left, left), (Side::Right, right)].iter() {
            let pct = clamp_percent(*value);
            let raw = to_raw(pct, channel.volume_min, channel.volume_max);
            match self
                .backend
                .set_volume(channel.card, &id, channel.direction, *side, raw)
            {
                Ok(()) => written += 1,
                Err(e) => {
                    warn!("'{}': {:?} volume not applied: {}", channel, side, e);
                    first_err.get_or_insert(e);
                }
            }
        }

        match first_err {
            Some(e) if written == 0 => Err(e),
            _ => Ok(()),
        }
    }

    /// Whether the channel is muted.  Channels without a mute switch
    /// always read `false`; check the capabilities to tell the two apart.
    pub fn get_mute(&self, channel: &Channel) -> Result<bool, DeviceError> {
        if !channel.has(Capability::Mute) {
            return Ok(false);
        }
        // switch on means sound is flowing
        let on = self
            .backend
            .switch(channel.card, &control_id(channel), Direction::Playback)?;
        Ok(!on)
    }

    /// Mute or unmute.  Does nothing on channels without a mute switch.
    pub fn set_mute(&self, channel: &Channel, muted: bool) -> Result<(), DeviceError> {
        if !channel.has(Capability::Mute) {
            debug!("'{}': ignoring mute, no playback switch", channel);
            return Ok(());
        }
        self.backend
            .set_switch(channel.card, &control_id(channel), Direction::Playback, !muted)
    }

    /// Whether the channel is selected for recording; `false` when
    /// there is no capture switch.
    pub fn get_record(&self, channel: &Channel) -> Result<bool, DeviceError> {
        if !channel.has(Capability::Record) {
            return Ok(false);
        }
        self.backend
            .switch(channel.card, &control_id(channel), Direction::Capture)
    }

    pub fn set_record(&self, channel: &Channel, recording: bool) -> Result<(), DeviceError> {
        if !channel.has(Capability::Record) {
            debug!("'{}': ignoring record, no capture switch", channel);
            return Ok(());
        }
        self.backend.set_switch(
            channel.card,
            &control_id(channel),
            Direction::Capture,
            recording,
        )
    }

    /// Flip the mute state and return the new one.
    ///
    /// Unlike `set_mute` this reports a channel without a mute switch,
    /// since the caller asked for a visible change.
    pub fn toggle_mute(&self, channel: &Channel) -> Result<bool, DeviceError> {
        if !channel.has(Capability::Mute) {
            return Err(DeviceError::unsupported(&channel.name, "muting"));
        }
        let muted = !self.get_mute(channel)?;
        self.set_mute(channel, muted)?;
        Ok(muted)
    }

    /// Move both sides to the louder side plus `delta`, like a scroll
    /// wheel over a single slider.  Returns what was requested.
    pub fn nudge(&self, channel: &Channel, delta: Percent) -> Result<Percent, DeviceError> {
        let (left, right) = self.get_volume(channel)?;
        let target = clamp_percent(left.max(right).saturating_add(delta));
        self.set_volume(channel, target, target)?;
        Ok(target)
    }

    /// Look a card up by name.  Unknown names fall back to the first
    /// card listed, so a stale setting still lands somewhere audible.
    pub fn find_device(&self, name: &str) -> Result<Device, DeviceError> {
        let mut devices = self.list_devices()?;
        match devices.iter().position(|d| d.name == name) {
            Some(i) => Ok(devices.swap_remove(i)),
            None if !devices.is_empty() => {
                debug!("no card named '{}', using {}", name, devices[0]);
                Ok(devices.swap_remove(0))
            }
            None => Err(DeviceError::no_usable_device()),
        }
    }

    /// Look a card up by its index
    pub fn device_by_index(&self, index: CardId) -> Result<Device, DeviceError> {
        self.list_devices()?
            .into_iter()
            .find(|d| d.index == index)
            .ok_or_else(|| DeviceError::new(format!("no card hw:{}", index)))
    }

    pub fn find_channel(&self, device: &Device, name: &str) -> Result<Channel, DeviceError> {
        self.list_channels(device)?
            .into_iter()
            .find(|c| c.name == name)
            .ok_or_else(|| DeviceError::unknown_channel(device.index, name))
    }

    /// The first card with a volume channel, and that channel.
    ///
    /// Fails with "no usable audio device" when nothing qualifies; the
    /// caller decides whether that is fatal.
    pub fn default_selection(&self) -> Result<(Device, Channel), DeviceError> {
        for device in self.list_devices()? {
            let channels = match self.list_channels(&device) {
                Ok(c) => c,
                Err(e) => {
                    warn!("{}: cannot list channels: {}", device, e);
                    continue;
                }
            };
            if let Some(channel) = channels.into_iter().find(|c| c.has(Capability::Volume)) {
                return Ok((device, channel));
            }
        }
        Err(DeviceError::no_usable_device())
    }

    fn read_side(&self, channel: &Channel, side: Side) -> Result<Percent, DeviceError> {
        let raw = self.backend.volume(
            channel.card,
            &control_id(channel),
            channel.direction,
            side,
        )?;
        Ok(to_percent(raw, channel.volume_min, channel.volume_max))
    }
}

fn control_id(channel: &Channel) -> ControlId {
    ControlId::new(channel.name.clone(), channel.index)
}

/// Pick the volume direction and derive the capability set.
///
/// Playback wins when a control has both sliders; capture-only controls
/// ("Capture", "Mic") still count as volume channels.
fn channel_from_info(card: CardId, id: ControlId, info: &ControlInfo) -> Channel {
    let (direction, stream) = if info.playback.has_volume || !info.capture.has_volume {
        (Direction::Playback, &info.playback)
    } else {
        (Direction::Capture, &info.capture)
    };

    let capabilities = Capabilities {
        volume: stream.has_volume,
        mute: info.playback.has_switch,
        record: info.capture.has_switch,
        stereo: stream.has_volume && stream.stereo,
    };

    Channel {
        card,
        name: id.name,
        index: id.index,
        capabilities,
        direction,
        volume_min: stream.volume_min,
        volume_max: stream.volume_max,
    }
}

pub fn clamp_percent(value: Percent) -> Percent {
    value.max(0).min(MAX_PERCENT)
}

/// Raw hardware value to a rounded percentage of the range
pub fn to_percent(raw: Volume, min: Volume, max: Volume) -> Percent {
    let range = max - min;
    if range <= 0 {
        return 0;
    }
    let pct = ((raw - min) as f64 / range as f64 * 100.0).round() as Percent;
    clamp_percent(pct)
}

/// Percentage to the nearest raw hardware value
pub fn to_raw(percent: Percent, min: Volume, max: Volume) -> Volume {
    let range = max - min;
    if range <= 0 {
        return min;
    }
    (clamp_percent(percent) as f64 * range as f64 / 100.0).round() as Volume + min
}
