//! mixerctl settings handling
//!
//! ## Application/ user settings
//!
//! - What the status line shows (icon, bar, numeric values)
//! - Icon theme name
//! - Scroll wheel step
//!
//! ## Mixer selection
//!
//! - Which card and which channel the volume commands act on
//! - Per channel preferences (shown, locked, muted), keyed by channel
//!   name so they survive cards re-ordering their controls
//!
//! ## Usage
//!
//! First initialise the settings tree by calling
//! `Settings::init(...)`, giving it a path under which the
//! configurations are stored.  Afterwards you can access settings via
//! [`Settings::r()`](Settings::r()) and
//! [`Settings::w()`](Settings::w()).
//!
//! ```no_run
//! # use mixerctl::settings::*;
//! # fn main() -> Result<(), mixerctl::error::SettingsError> {
//! let s = Settings::init(std::path::Path::new(".config/mixerctl/"))?;
//! println!("{:?}", s.r().mixer().device);
//! # Ok(())
//! # }
//! ```
//!
//! After applying changes to the settings, don't forget to call
//! [`sync()`](Settings::sync)!

mod app;
mod mixer;

pub use app::AppSettings;
pub use mixer::{ChannelPrefs, MixerSettings};

use crate::error::SettingsError;
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use std::{
    fs::{self, File, OpenOptions},
    io::{Read, Write},
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tracing::{debug, warn};

/// Create the required directories and return the default config path
pub fn scaffold() -> Option<PathBuf> {
    let dir = ProjectDirs::from("org", "mixerctl", "mixerctl")?;
    let path = dir.config_dir().to_path_buf();
    if let Err(e) = fs::create_dir_all(&path) {
        warn!("cannot create {}: {}", path.display(), e);
    }
    Some(path)
}

/// Main settings tree
#[derive(Default, Debug)]
pub struct Settings {
    base: PathBuf,
    app: RwLock<AppSettings>,
    mixer: RwLock<MixerSettings>,
}

impl Settings {
    /// Create a new settings tree from a config path
    pub fn init<'p>(path: impl Into<&'p Path>) -> Result<Arc<Settings>, SettingsError> {
        let base = path.into().to_path_buf();
        fs::create_dir_all(&base)?;

        let this = Arc::new(Self {
            app: RwLock::new(load_path(base.join("app.json"))),
            mixer: RwLock::new(load_path(base.join("mixer.json"))),
            base,
        });
        this.sync()?;
        Ok(this)
    }

    /// Sync any changes back to disk
    pub fn sync(self: &Arc<Self>) -> Result<(), SettingsError> {
        vec![
            ("app.json", serde_json::to_string_pretty(&*self.r().app())?),
            ("mixer.json", serde_json::to_string_pretty(&*self.r().mixer())?),
        ]
        .into_iter()
        .map(|(path, json)| {
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(self.base.join(path))
                .and_then(|mut f| f.write_all(json.as_bytes()))
                .map_err(Into::into)
        })
        .collect::<Result<Vec<_>, SettingsError>>()
        .map(|_| debug!("settings written to {}", self.base.display()))
    }

    /// Get read access to any stored setting
    pub fn r<'this>(self: &'this Arc<Self>) -> ReadSettings<'this> {
        ReadSettings { inner: self }
    }

    /// Wait to get exclusive write access to any settings
    pub fn w<'this>(self: &'this Arc<Self>) -> WriteSettings<'this> {
        WriteSettings { inner: self }
    }
}

fn load_path<T: Default + DeserializeOwned>(path: PathBuf) -> T {
    File::open(&path)
        .and_then(|mut f| {
            let mut c = String::new();
            f.read_to_string(&mut c).map(|_| c)
        })
        .and_then(|s| serde_json::from_str(&s).map_err(Into::into))
        .unwrap_or_else(|e| {
            debug!("using defaults for {}: {}", path.display(), e);
            T::default()
        })
}

pub struct ReadSettings<'settings> {
    inner: &'settings Arc<Settings>,
}

impl<'s> ReadSettings<'s> {
    /// Get read access to the `app` settings
    pub fn app(self) -> RwLockReadGuard<'s, AppSettings> {
        self.inner.app.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Get read access to the `mixer` settings
    pub fn mixer(self) -> RwLockReadGuard<'s, MixerSettings> {
        self.inner.mixer.read().unwrap_or_else(|e| e.into_inner())
    }
}

pub struct WriteSettings<'settings> {
    inner: &'settings Arc<Settings>,
}

impl<'s> WriteSettings<'s> {
    /// Get write access to the `app` settings
    pub fn app(self) -> RwLockWriteGuard<'s, AppSettings> {
        self.inner.app.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Get write access to the `mixer` settings
    pub fn mixer(self) -> RwLockWriteGuard<'s, MixerSettings> {
        self.inner.mixer.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_written_out() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::init(dir.path()).unwrap();
        assert!(dir.path().join("app.json").exists());
        assert!(dir.path().join("mixer.json").exists());
        assert!(s.r().app().show_icon);
        assert!(s.r().mixer().device.is_none());
    }

    #[test]
    fn changes_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        {
            let s = Settings::init(dir.path()).unwrap();
            {
                let mut m = s.w().mixer();
                m.device = Some("USB Audio".into());
                m.channel = Some("Speaker".into());
                m.prefs_mut("Speaker").locked = false;
            }
            s.w().app().scroll_step = 5;
            s.sync().unwrap();
        }

        let s = Settings::init(dir.path()).unwrap();
        assert_eq!(s.r().mixer().device.as_deref(), Some("USB Audio"));
        assert!(!s.r().mixer().prefs("Speaker").locked);
        assert_eq!(s.r().app().scroll_step, 5);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("mixer.json"), "{ not json").unwrap();
        let s = Settings::init(dir.path()).unwrap();
        assert!(s.r().mixer().channels.is_empty());
    }
}
