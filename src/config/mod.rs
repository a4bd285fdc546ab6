//! Configuration file management
//!
//! Loads TOML configuration files and provides application settings.
//! Default config path: ~/.config/linuxkbd/config.toml

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_KEYBOARD_SUFFIX, DEFAULT_POLL_INTERVAL_MS, DEFAULT_SEARCH_DIR, DEFAULT_START_DELAY_MS,
};

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Keyboard device selection
    pub device: DeviceConfig,
    /// Streaming session settings
    pub snoop: SnoopConfig,
    /// Typing settings
    pub typing: TypingConfig,
    /// Log output settings
    pub logging: LoggingConfig,
}

/// Keyboard device selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Explicit event device (e.g., "/dev/input/event3", empty = discover)
    pub path: String,
    /// Directory scanned for keyboards
    pub search_dir: String,
    /// File name suffix that marks a keyboard entry in `search_dir`
    pub suffix: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            search_dir: DEFAULT_SEARCH_DIR.to_string(),
            suffix: DEFAULT_KEYBOARD_SUFFIX.to_string(),
        }
    }
}

/// Streaming session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnoopConfig {
    /// Queue length between reader thread and consumer (0 = unbounded)
    pub channel_capacity: usize,
    /// How often an idle device read re-checks for cancellation (ms)
    pub poll_interval_ms: u64,
    /// Print key releases and non-key events too (CLI only)
    pub show_releases: bool,
}

impl Default for SnoopConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 0,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            show_releases: false,
        }
    }
}

/// Typing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingConfig {
    /// Pause between characters in ms (0 = write the whole string at once)
    pub key_delay_ms: u64,
    /// Pause after opening the device before the first key in ms
    pub start_delay_ms: u64,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            key_delay_ms: 0,
            start_delay_ms: DEFAULT_START_DELAY_MS,
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset ("error" .. "trace")
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// System-wide config path
    const SYSTEM_CONFIG_PATH: &'static str = "/etc/linuxkbd/config.toml";

    /// Get the path that would be used for loading config
    /// Returns None if using built-in defaults
    pub fn config_path() -> Option<PathBuf> {
        // 1. LINUXKBD_CONFIG environment variable
        if let Ok(path) = std::env::var("LINUXKBD_CONFIG") {
            let p = Path::new(&path);
            if p.exists() {
                return Some(p.to_path_buf());
            }
        }

        // 2. User config: ~/.config/linuxkbd/config.toml
        if let Some(path) = default_config_path() {
            if path.exists() {
                return Some(path);
            }
        }

        // 3. System config: /etc/linuxkbd/config.toml
        let system_config = Path::new(Self::SYSTEM_CONFIG_PATH);
        if system_config.exists() {
            return Some(system_config.to_path_buf());
        }

        None
    }

    /// Load configuration with priority:
    /// 1. LINUXKBD_CONFIG environment variable
    /// 2. ~/.config/linuxkbd/config.toml (user config)
    /// 3. /etc/linuxkbd/config.toml (system config)
    /// 4. Built-in defaults
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            match Self::load_from_file(&path) {
                Ok(config) => {
                    info!("Loaded config: {}", path.display());
                    return config;
                }
                Err(e) => {
                    warn!("Failed to load config {}: {:#}", path.display(), e);
                }
            }
        }
        info!("Using built-in default config");
        Self::default()
    }

    /// Load settings from specified path
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse settings from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Write the built-in defaults to the user config path
    ///
    /// Refuses to overwrite an existing file unless `force` is set.
    pub fn write_default_config(force: bool) -> Result<PathBuf> {
        let config_path =
            default_config_path().ok_or_else(|| anyhow::anyhow!("Config directory not found"))?;
        if config_path.exists() && !force {
            anyhow::bail!(
                "Config file already exists: {} (use --force to overwrite)",
                config_path.display()
            );
        }
        if let Some(dir) = config_path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        let body = toml::to_string_pretty(&Self::default())?;
        let template = format!(
            "# linuxkbd configuration\n\
             # Lookup order: $LINUXKBD_CONFIG, ~/.config/linuxkbd/config.toml, {}\n\n{}",
            Self::SYSTEM_CONFIG_PATH,
            body
        );
        std::fs::write(&config_path, template)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        Ok(config_path)
    }
}

/// Get default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("linuxkbd").join("config.toml"))
}
