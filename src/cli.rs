//! Command line front end over the mixer controller

use crate::error::DeviceError;
use crate::mixer::MixerController;
use crate::model::{Capability, Channel, Device, MixerEvent, Percent, VolumeLevel};
use crate::rts::hardware::HardwareBackend;
use crate::settings::{AppSettings, Settings};
use crate::watch::{self, Watcher};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "mixerctl")]
#[command(about = "Control ALSA mixer channels", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use a built-in fake sound card instead of ALSA
    #[arg(long, global = true)]
    pub mock: bool,

    /// Card name, index or `hw:N`
    #[arg(short, long, global = true)]
    pub device: Option<String>,

    /// Mixer channel name (e.g. Master, PCM)
    #[arg(short, long, global = true)]
    pub channel: Option<String>,

    /// Settings directory
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List sound cards
    Devices,
    /// List the usable channels of the selected card
    Channels,
    /// Print the volume of the selected channel
    Get,
    /// Set the volume; RIGHT defaults to LEFT
    Set {
        left: Percent,
        right: Option<Percent>,
    },
    /// Mute, unmute or toggle the selected channel
    Mute {
        #[arg(value_enum, default_value = "toggle")]
        state: Switch,
    },
    /// Show or change the capture (record) switch
    Rec {
        #[arg(value_enum)]
        state: Option<Switch>,
    },
    /// Raise the volume by the configured step
    Up,
    /// Lower the volume by the configured step
    Down,
    /// One line per shown channel
    Status,
    /// Print changes as they happen
    Watch {
        /// Poll interval in milliseconds
        #[arg(long, default_value = "200")]
        interval: u64,
    },
    /// Remember the selected card and channel
    Select,
    /// List a channel in `status`
    Show { name: String },
    /// Hide a channel from `status`
    Hide { name: String },
    /// Move left and right together
    Lock { name: String },
    /// Allow left and right to differ
    Unlock { name: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
    Toggle,
}

static CARD_INDEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:hw:)?(\d+)$").unwrap());

/// Parse `2` or `hw:2` into a card index; names give `None`
pub fn card_index(spec: &str) -> Option<i32> {
    CARD_INDEX
        .captures(spec.trim())
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn open_settings(cli: &Cli) -> Result<Arc<Settings>> {
    let path = match &cli.config {
        Some(p) => p.clone(),
        None => crate::settings::scaffold().context("no home directory for settings")?,
    };
    Settings::init(path.as_path()).with_context(|| format!("loading {}", path.display()))
}

/// Resolve the card and channel a command acts on.
///
/// Command line flags win over settings, which win over the first
/// usable channel on the system.
pub fn select<B: HardwareBackend>(
    mixer: &MixerController<B>,
    cli: &Cli,
    settings: &Arc<Settings>,
) -> Result<(Device, Option<Channel>), DeviceError> {
    let (saved_device, saved_channel) = {
        let m = settings.r().mixer();
        (m.device.clone(), m.channel.clone())
    };

    let device = match cli.device.as_deref().or_else(|| saved_device.as_deref()) {
        Some(spec) => match card_index(spec) {
            Some(i) => mixer.device_by_index(i)?,
            None => mixer.find_device(spec)?,
        },
        None => mixer.default_selection()?.0,
    };

    let channel = match cli.channel.as_deref().or_else(|| saved_channel.as_deref()) {
        Some(name) => Some(mixer.find_channel(&device, name)?),
        None => mixer
            .list_channels(&device)?
            .into_iter()
            .find(|c| c.has(Capability::Volume)),
    };
    debug!(
        "selected {} / {}",
        device,
        channel.as_ref().map(|c| c.name.as_str()).unwrap_or("-")
    );
    Ok((device, channel))
}

fn require(channel: Option<Channel>) -> Result<Channel> {
    match channel {
        Some(c) => Ok(c),
        None => bail!(DeviceError::no_usable_device()),
    }
}

/// Render a 10 cell level bar
pub fn bar(volume: Percent) -> String {
    let filled = ((volume.max(0).min(100) + 5) / 10) as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(10 - filled))
}

/// One status line for a channel
pub fn status_line<B: HardwareBackend>(
    mixer: &MixerController<B>,
    channel: &Channel,
    app: &AppSettings,
) -> Result<String, DeviceError> {
    let mut line = format!(
        "{:<16} {:<28}",
        channel.to_string(),
        channel.capabilities.to_string()
    );

    let muted = mixer.get_mute(channel)?;
    if channel.has(Capability::Volume) {
        let (left, right) = mixer.get_volume(channel)?;
        if app.show_values || !(app.show_icon || app.show_bar) {
            line.push_str(&format!(" {:>3}% {:>3}%", left, right));
        }
        if app.show_icon {
            line.push(' ');
            line.push_str(VolumeLevel::classify(left, muted).icon_name());
        }
        if app.show_bar {
            line.push(' ');
            line.push_str(&bar(left.max(right)));
        }
    }
    if muted {
        line.push_str(" muted");
    }
    if mixer.get_record(channel)? {
        line.push_str(" rec");
    }
    Ok(line.trim_end().to_owned())
}

pub fn run<B>(cli: Cli, mixer: MixerController<B>, settings: Arc<Settings>) -> Result<()>
where
    B: HardwareBackend + Send + 'static,
{
    match &cli.command {
        Command::Devices => {
            for d in mixer.list_devices()? {
                println!("{}\t{}", d.index, d.name);
            }
            return Ok(());
        }
        Command::Show { name } | Command::Hide { name } => {
            let shown = matches!(cli.command, Command::Show { .. });
            settings.w().mixer().prefs_mut(name).shown = shown;
            settings.sync()?;
            return Ok(());
        }
        Command::Lock { name } | Command::Unlock { name } => {
            let locked = matches!(cli.command, Command::Lock { .. });
            settings.w().mixer().prefs_mut(name).locked = locked;
            settings.sync()?;
            return Ok(());
        }
        _ => (),
    }

    let (device, channel) = select(&mixer, &cli, &settings)?;

    match cli.command {
        Command::Channels => {
            for c in mixer.list_channels(&device)? {
                println!("{}\t{}", c, c.capabilities);
            }
        }
        Command::Get => {
            let channel = require(channel)?;
            let (left, right) = mixer.get_volume(&channel)?;
            println!("{} {}", left, right);
        }
        Command::Set { left, right } => {
            let channel = require(channel)?;
            let locked = settings.r().mixer().prefs(&channel.name).locked;
            let right = match right {
                Some(r) if locked && r != left => {
                    info!("'{}' is locked, using {} for both sides", channel, left);
                    left
                }
                Some(r) => r,
                None => left,
            };
            mixer.set_volume(&channel, left, right)?;
        }
        Command::Mute { state } => {
            let channel = require(channel)?;
            let muted = match state {
                Switch::Toggle => mixer.toggle_mute(&channel)?,
                Switch::On | Switch::Off => {
                    if !channel.has(Capability::Mute) {
                        bail!(DeviceError::unsupported(&channel.name, "muting"));
                    }
                    let muted = state == Switch::On;
                    mixer.set_mute(&channel, muted)?;
                    muted
                }
            };
            settings.w().mixer().prefs_mut(&channel.name).muted = muted;
            settings.sync()?;
            println!("{}", if muted { "muted" } else { "unmuted" });
        }
        Command::Rec { state } => {
            let channel = require(channel)?;
            let recording = match state {
                None => mixer.get_record(&channel)?,
                Some(Switch::Toggle) => {
                    let r = !mixer.get_record(&channel)?;
                    mixer.set_record(&channel, r)?;
                    r
                }
                Some(s) => {
                    mixer.set_record(&channel, s == Switch::On)?;
                    s == Switch::On
                }
            };
            println!("{}", if recording { "on" } else { "off" });
        }
        Command::Up | Command::Down => {
            let channel = require(channel)?;
            let step = settings.r().app().scroll_step;
            let delta = if matches!(cli.command, Command::Up) {
                step
            } else {
                step.saturating_neg()
            };
            println!("{}", mixer.nudge(&channel, delta)?);
        }
        Command::Status => {
            let app = settings.r().app();
            let mixer_settings = settings.r().mixer();
            println!("{}", device);
            for c in mixer.list_channels(&device)? {
                if !mixer_settings.prefs(&c.name).shown {
                    continue;
                }
                println!("  {}", status_line(&mixer, &c, &app)?);
            }
        }
        Command::Watch { interval } => {
            let channels = mixer.list_channels(&device)?;
            let rx = watch::spawn(
                Watcher::new(mixer, channels),
                Duration::from_millis(interval.max(10)),
            );

            let stop = rx.clone();
            ctrlc::set_handler(move || {
                stop.close();
            })
            .context("installing Ctrl-C handler")?;

            info!("watching {}", device);
            async_std::task::block_on(async {
                while let Ok(e) = rx.recv().await {
                    print_event(&e);
                }
            });
        }
        Command::Select => {
            let mut m = settings.w().mixer();
            m.device = Some(device.name.clone());
            m.channel = channel.map(|c| c.name);
            drop(m);
            settings.sync()?;
        }
        Command::Devices
        | Command::Show { .. }
        | Command::Hide { .. }
        | Command::Lock { .. }
        | Command::Unlock { .. } => unreachable!("handled before channel selection"),
    }
    Ok(())
}

fn print_event(e: &MixerEvent) {
    match e {
        MixerEvent::VolumeChanged {
            channel,
            left,
            right,
        } => println!("{}: volume {} {}", channel, left, right),
        MixerEvent::MuteChanged { channel, muted } => {
            println!("{}: {}", channel, if *muted { "muted" } else { "unmuted" })
        }
        MixerEvent::RecordChanged { channel, recording } => {
            println!("{}: rec {}", channel, if *recording { "on" } else { "off" })
        }
        MixerEvent::ChannelLost { channel } => println!("{}: gone", channel),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rts::hardware::mock::{MockBackend, MockCard, MockControl};

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("mixerctl").chain(args.iter().copied()))
    }

    fn fixture() -> (MockBackend, tempfile::TempDir, Arc<Settings>) {
        let hw = MockBackend::new(vec![
            MockCard::new(0, "HDA Intel").control(MockControl::bare("Beep")),
            MockCard::new(1, "USB Audio")
                .control(MockControl::playback("Speaker", 2, 100, 40).with_mute(false))
                .control(MockControl::capture("Mic", 1, 100, 20).with_record(false)),
        ]);
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::init(dir.path()).unwrap();
        (hw, dir, settings)
    }

    #[test]
    fn card_specs() {
        assert_eq!(card_index("2"), Some(2));
        assert_eq!(card_index("hw:10"), Some(10));
        assert_eq!(card_index("USB Audio"), None);
        assert_eq!(card_index("hw:x"), None);
    }

    #[test]
    fn bars() {
        assert_eq!(bar(0), "[----------]");
        assert_eq!(bar(54), "[#####-----]");
        assert_eq!(bar(100), "[##########]");
    }

    #[test]
    fn selection_prefers_flags_then_settings() {
        let (hw, _dir, settings) = fixture();
        let mixer = MixerController::new(hw);

        let (d, c) = select(&mixer, &parse(&["get"]), &settings).unwrap();
        assert_eq!(d.index, 1);
        assert_eq!(c.unwrap().name, "Speaker");

        settings.w().mixer().channel = Some("Mic".into());
        let (_, c) = select(&mixer, &parse(&["-d", "hw:1", "get"]), &settings).unwrap();
        assert_eq!(c.unwrap().name, "Mic");

        let (_, c) = select(&mixer, &parse(&["-d", "1", "-c", "Speaker", "get"]), &settings)
            .unwrap();
        assert_eq!(c.unwrap().name, "Speaker");

        assert!(select(&mixer, &parse(&["-d", "hw:7", "get"]), &settings).is_err());
    }

    #[test]
    fn locked_channels_move_together() {
        let (hw, _dir, settings) = fixture();
        let cli = parse(&["-d", "1", "set", "70", "30"]);
        run(cli, MixerController::new(hw.clone()), settings.clone()).unwrap();
        assert_eq!(
            hw.raw_volume(1, "Speaker", alsa::Direction::Playback),
            vec![70, 70]
        );

        settings.w().mixer().prefs_mut("Speaker").locked = false;
        let cli = parse(&["-d", "1", "set", "70", "30"]);
        run(cli, MixerController::new(hw.clone()), settings).unwrap();
        assert_eq!(
            hw.raw_volume(1, "Speaker", alsa::Direction::Playback),
            vec![70, 30]
        );
    }

    #[test]
    fn huge_scroll_steps_saturate() {
        let (hw, _dir, settings) = fixture();
        settings.w().app().scroll_step = i64::MAX;
        let speaker = || hw.raw_volume(1, "Speaker", alsa::Direction::Playback);

        run(parse(&["-d", "1", "up"]), MixerController::new(hw.clone()), settings.clone())
            .unwrap();
        assert_eq!(speaker(), vec![100, 100]);
        run(parse(&["-d", "1", "down"]), MixerController::new(hw.clone()), settings.clone())
            .unwrap();
        assert_eq!(speaker(), vec![0, 0]);

        settings.w().app().scroll_step = i64::MIN;
        run(parse(&["-d", "1", "down"]), MixerController::new(hw.clone()), settings).unwrap();
        assert_eq!(speaker(), vec![100, 100]);
    }

    #[test]
    fn mute_is_remembered() {
        let (hw, _dir, settings) = fixture();
        run(
            parse(&["-d", "1", "mute", "on"]),
            MixerController::new(hw.clone()),
            settings.clone(),
        )
        .unwrap();
        assert_eq!(
            hw.raw_switch(1, "Speaker", alsa::Direction::Playback),
            Some(false)
        );
        assert!(settings.r().mixer().prefs("Speaker").muted);

        let e = run(
            parse(&["-d", "1", "-c", "Mic", "mute", "on"]),
            MixerController::new(hw),
            settings,
        );
        assert!(e.is_err());
    }

    #[test]
    fn status_lines() {
        let (hw, _dir, settings) = fixture();
        let mixer = MixerController::new(hw);
        let device = mixer.device_by_index(1).unwrap();
        let speaker = mixer.find_channel(&device, "Speaker").unwrap();
        let mut app = AppSettings::default();
        app.show_bar = true;
        let line = status_line(&mixer, &speaker, &app).unwrap();
        assert!(line.starts_with("Speaker"));
        assert!(line.contains("audio-volume-medium"));
        assert!(line.ends_with("[####------]"));
        drop(settings);
    }

    #[test]
    fn select_persists_choice() {
        let (hw, _dir, settings) = fixture();
        run(
            parse(&["-d", "USB Audio", "-c", "Mic", "select"]),
            MixerController::new(hw),
            settings.clone(),
        )
        .unwrap();
        let m = settings.r().mixer();
        assert_eq!(m.device.as_deref(), Some("USB Audio"));
        assert_eq!(m.channel.as_deref(), Some("Mic"));
    }
}
