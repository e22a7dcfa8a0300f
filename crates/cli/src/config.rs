//! Configuration file loading.
//!
//! Precedence: CLI flags > Config file > Defaults

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use whence_core::Settings;

/// Default config file content for `--config-init`.
pub const DEFAULT_CONFIG: &str = r#"# Whence configuration
# See: whence --help for all options

# Ordered strftime formats to render, each tried under every locale
formats = ["%c", "%x"]

# Ordered locale identifiers; "" means the platform default
locales = ["", "C"]

# Labels of the two entry points
item_label = "Time:"
item_label2 = "Timezone:"

# Allow online place-name lookups
online = true
"#;

/// Configuration loaded from file; every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub formats: Option<Vec<String>>,
    pub locales: Option<Vec<String>>,
    pub item_label: Option<String>,
    pub item_label2: Option<String>,
    pub online: Option<bool>,
}

impl Config {
    /// Get the config file path.
    ///
    /// - Linux/macOS: `~/.config/whence/config.toml`
    /// - Windows: `%APPDATA%\whence\config.toml`
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("whence").join("config.toml"))
    }

    /// Load config from file. Returns default if the file doesn't exist or
    /// doesn't parse.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        let Ok(contents) = fs::read_to_string(&path) else {
            return Self::default();
        };
        match toml::from_str(&contents) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("warning: ignoring invalid config at {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    /// Overlay the file values onto the default settings.
    pub fn into_settings(self) -> Settings {
        let defaults = Settings::default();
        Settings {
            formats: self.formats.unwrap_or(defaults.formats),
            locales: self.locales.unwrap_or(defaults.locales),
            item_label: self.item_label.unwrap_or(defaults.item_label),
            item_label2: self.item_label2.unwrap_or(defaults.item_label2),
            online: self.online.unwrap_or(defaults.online),
        }
    }
}
