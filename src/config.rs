//! Configuration loading for winvt.
//!
//! Terminal settings live in `~/.winvt/config.toml`:
//!
//! ```toml
//! [terminal]
//! # Support Windows' Ctrl-Alt substitute for AltGr. It collides with some
//! # Alt bindings, so it can be turned off.
//! altgr = true
//!
//! # Translate SGR ANSI escape codes to console attributes. Automatically
//! # disabled when a third-party tool already provides the translation.
//! ansi = true
//! ```
//!
//! Loading never fails: a missing or malformed file falls back to the
//! defaults. The live terminal session consumes a plain [`TerminalSettings`]
//! value at construction and never re-reads the file.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Terminal translation settings
    pub terminal: TerminalSettings,
}

/// Terminal translation settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalSettings {
    /// Treat Ctrl-Alt chords that carry a character as AltGr
    pub altgr: bool,
    /// Translate SGR escape codes to console attributes
    pub ansi: bool,
}

impl Default for TerminalSettings {
    fn default() -> Self {
        Self {
            altgr: true,
            ansi: true,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Self {
        if let Some(path) = Self::get_config_path() {
            if path.exists() {
                if let Ok(content) = fs::read_to_string(&path) {
                    if let Ok(config) = toml::from_str(&content) {
                        return config;
                    }
                }
            }
        }
        Self::default()
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<(), String> {
        if let Some(path) = Self::get_config_path() {
            let content = toml::to_string_pretty(self)
                .map_err(|e| format!("Failed to serialize config: {}", e))?;
            fs::write(&path, content).map_err(|e| format!("Failed to write config: {}", e))?;
            Ok(())
        } else {
            Err("Could not determine config path".to_string())
        }
    }

    /// Get config file path
    fn get_config_path() -> Option<PathBuf> {
        if let Some(home) = home_dir() {
            let winvt_dir = home.join(".winvt");
            if !winvt_dir.exists() {
                let _ = fs::create_dir_all(&winvt_dir);
            }
            return Some(winvt_dir.join("config.toml"));
        }
        None
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}
