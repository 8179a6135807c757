//! Polling runtime for live mixer updates
//!
//! The controller never polls on its own.  An application that wants to
//! follow changes made by other programs owns a [`Watcher`] and either
//! calls [`Watcher::poll`] from its own loop, or hands it to [`spawn`]
//! and reads events from the returned channel.

use crate::mixer::MixerController;
use crate::model::card::{Channel, Percent};
use crate::model::events::MixerEvent;
use crate::rts::hardware::HardwareBackend;
use async_std::{
    channel::{bounded, Receiver},
    task,
};
use std::time::Duration;
use tracing::{debug, trace};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Snapshot {
    volume: Option<(Percent, Percent)>,
    muted: bool,
    recording: bool,
}

pub struct Watcher<B> {
    mixer: MixerController<B>,
    channels: Vec<Channel>,
    /// `None` once a channel could not be read
    last: Vec<Option<Snapshot>>,
}

impl<B: HardwareBackend> Watcher<B> {
    /// Start watching `channels`, taking their current state as the
    /// baseline so the first poll only reports real changes.
    pub fn new(mixer: MixerController<B>, channels: Vec<Channel>) -> Self {
        let last = channels.iter().map(|c| read(&mixer, c)).collect();
        Self {
            mixer,
            channels,
            last,
        }
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Read every channel once and report what differs from last time
    pub fn poll(&mut self) -> Vec<MixerEvent> {
        let mut events = Vec::new();

        for (channel, last) in self.channels.iter().zip(self.last.iter_mut()) {
            let now = read(&self.mixer, channel);
            let name = channel.to_string();

            match (*last, now) {
                (Some(_), None) => {
                    debug!("lost channel '{}'", name);
                    events.push(MixerEvent::ChannelLost { channel: name });
                }
                (None, None) => (),
                (prev, Some(now)) => {
                    if prev.map(|p| p.volume) != Some(now.volume) {
                        if let Some((left, right)) = now.volume {
                            events.push(MixerEvent::VolumeChanged {
                                channel: name.clone(),
                                left,
                                right,
                            });
                        }
                    }
                    if prev.map(|p| p.muted) != Some(now.muted) {
                        events.push(MixerEvent::MuteChanged {
                            channel: name.clone(),
                            muted: now.muted,
                        });
                    }
                    if prev.map(|p| p.recording) != Some(now.recording) {
                        events.push(MixerEvent::RecordChanged {
                            channel: name,
                            recording: now.recording,
                        });
                    }
                }
            }
            *last = now;
        }

        trace!("poll produced {} event(s)", events.len());
        events
    }
}

fn read<B: HardwareBackend>(mixer: &MixerController<B>, channel: &Channel) -> Option<Snapshot> {
    let volume = if channel.capabilities.volume {
        Some(mixer.get_volume(channel).ok()?)
    } else {
        None
    };
    Some(Snapshot {
        volume,
        muted: mixer.get_mute(channel).ok()?,
        recording: mixer.get_record(channel).ok()?,
    })
}

/// Poll `watcher` every `interval` on a background task.
///
/// The task stops once the receiver is dropped or closed.
pub fn spawn<B>(watcher: Watcher<B>, interval: Duration) -> Receiver<MixerEvent>
where
    B: HardwareBackend + Send + 'static,
{
    let (tx, rx) = bounded(16);

    task::spawn(async move {
        let mut watcher = watcher;
        loop {
            for e in watcher.poll() {
                if tx.send(e).await.is_err() {
                    debug!("event receiver gone, stopping watcher");
                    return;
                }
            }
            if tx.is_closed() {
                return;
            }
            task::sleep(interval).await;
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rts::hardware::mock::MockBackend;
    use alsa::Direction;

    fn watcher() -> (Watcher<MockBackend>, MockBackend) {
        let hw = MockBackend::demo();
        let mixer = MixerController::new(hw.clone());
        let device = mixer.list_devices().unwrap().remove(0);
        let channels = mixer.list_channels(&device).unwrap();
        (Watcher::new(mixer, channels), hw)
    }

    #[test]
    fn quiet_when_nothing_changes() {
        let (mut w, _) = watcher();
        assert!(w.poll().is_empty());
        assert!(w.poll().is_empty());
    }

    #[test]
    fn reports_changes_from_elsewhere() {
        let (mut w, hw) = watcher();
        hw.poke_volume(0, "Master", Direction::Playback, &[87, 0]);
        hw.poke_switch(0, "Master", Direction::Playback, false);

        let events = w.poll();
        assert_eq!(
            events,
            vec![
                MixerEvent::VolumeChanged {
                    channel: "Master".into(),
                    left: 100,
                    right: 0
                },
                MixerEvent::MuteChanged {
                    channel: "Master".into(),
                    muted: true
                },
            ]
        );
        assert!(w.poll().is_empty());
    }

    #[test]
    fn record_switch() {
        let (mut w, hw) = watcher();
        hw.poke_switch(0, "Capture", Direction::Capture, false);
        assert_eq!(
            w.poll(),
            vec![MixerEvent::RecordChanged {
                channel: "Capture".into(),
                recording: false
            }]
        );
    }

    #[test]
    fn lost_once_per_unplug() {
        let (mut w, hw) = watcher();
        let watched = w.channels().len();
        hw.unplug(0);
        let events = w.poll();
        assert_eq!(events.len(), watched);
        assert!(events
            .iter()
            .all(|e| matches!(e, MixerEvent::ChannelLost { .. })));
        assert!(w.poll().is_empty());
    }

    #[test]
    fn spawned_watcher_delivers_events() {
        let (w, hw) = watcher();
        let rx = spawn(w, Duration::from_millis(5));
        hw.poke_volume(0, "PCM", Direction::Playback, &[0, 0]);

        let e = task::block_on(rx.recv()).unwrap();
        assert_eq!(
            e,
            MixerEvent::VolumeChanged {
                channel: "PCM".into(),
                left: 0,
                right: 0
            }
        );
        rx.close();
    }
}
