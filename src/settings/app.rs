use serde::{Deserialize, Serialize};

/// mixerctl application settings tree
///
/// These settings modify how volume state is presented and user
/// preferences.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Show the volume icon name in the status line
    pub show_icon: bool,
    /// Show a level bar in the status line
    pub show_bar: bool,
    /// Print numeric values next to each channel
    pub show_values: bool,
    /// Icon theme, `gtk-theme` follows the desktop
    pub theme: String,
    /// Percent moved by `up` and `down`
    pub scroll_step: i64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            show_icon: true,
            show_bar: false,
            show_values: false,
            theme: "gtk-theme".to_owned(),
            scroll_step: 2,
        }
    }
}
