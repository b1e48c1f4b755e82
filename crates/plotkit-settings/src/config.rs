//! Configuration for Plotkit
//!
//! Supports JSON and TOML files. Configuration is organized into:
//! - Server settings (listen address, protocol limits)
//! - Plotter settings (driver, standoff offset, speed, acceleration, output)

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Application directory name under the platform config dir
const APP_DIR: &str = "plotkit";

/// Default config file name
const CONFIG_FILE: &str = "config.toml";

/// Which motion backend drives the pen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotterDriver {
    /// Track and log moves without hardware
    #[default]
    Simulated,
    /// Stream G-code to the configured output
    Gcode,
}

impl std::fmt::Display for PlotterDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simulated => write!(f, "simulated"),
            Self::Gcode => write!(f, "gcode"),
        }
    }
}

impl FromStr for PlotterDriver {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simulated" | "sim" => Ok(Self::Simulated),
            "gcode" => Ok(Self::Gcode),
            other => Err(ConfigError::InvalidSetting {
                key: "plotter.driver".to_string(),
                reason: format!("unknown driver '{}'", other),
            }),
        }
    }
}

/// Listening endpoint and protocol limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to bind
    pub host: String,
    /// TCP port to bind
    pub port: u16,
    /// Longest accepted protocol line in bytes
    pub max_line_length: usize,
    /// Bytes requested per socket read
    pub read_buffer_size: usize,
}

impl ServerSettings {
    /// `host:port` string for binding
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 1337,
            max_line_length: 1024,
            read_buffer_size: 256,
        }
    }
}

/// Pen manipulator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotterSettings {
    /// Motion backend
    pub driver: PlotterDriver,
    /// Standoff height above the surface for approach and lift (mm)
    pub draw_offset: f64,
    /// Travel speed (mm/s)
    pub speed: f64,
    /// Acceleration (mm/s²)
    pub acceleration: f64,
    /// Surface origin in machine coordinates (mm)
    pub origin_x: f64,
    pub origin_y: f64,
    /// G-code target: `-`, a file path, or `tcp://host:port`
    pub output: String,
    /// Simulated time per move (ms)
    pub simulated_move_ms: u64,
}

impl Default for PlotterSettings {
    fn default() -> Self {
        Self {
            driver: PlotterDriver::Simulated,
            draw_offset: 30.0,
            speed: 300.0,
            acceleration: 5000.0,
            origin_x: 0.0,
            origin_y: 0.0,
            output: "-".to_string(),
            simulated_move_ms: 0,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSettings,
    pub plotter: PlotterSettings,
}

impl Config {
    /// Create default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform config location, e.g. `~/.config/plotkit/config.toml`
    pub fn default_path() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
            .ok_or_else(|| ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string()))
    }

    /// Load configuration from a `.json` or `.toml` file and validate it
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::LoadError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let config: Self = match extension(path) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into())
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration, choosing the format from the file extension
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        let content = match extension(path) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into())
            }
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                key: "server.host".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        if self.server.port == 0 {
            return Err(out_of_range("server.port", self.server.port));
        }

        if self.server.max_line_length == 0 {
            return Err(out_of_range(
                "server.max_line_length",
                self.server.max_line_length,
            ));
        }

        if self.server.read_buffer_size == 0 {
            return Err(out_of_range(
                "server.read_buffer_size",
                self.server.read_buffer_size,
            ));
        }

        let plotter = &self.plotter;
        for (key, value) in [
            ("plotter.draw_offset", plotter.draw_offset),
            ("plotter.speed", plotter.speed),
            ("plotter.acceleration", plotter.acceleration),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(out_of_range(key, value));
            }
        }

        for (key, value) in [
            ("plotter.origin_x", plotter.origin_x),
            ("plotter.origin_y", plotter.origin_y),
        ] {
            if !value.is_finite() {
                return Err(out_of_range(key, value));
            }
        }

        if plotter.driver == PlotterDriver::Gcode && plotter.output.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                key: "plotter.output".to_string(),
                reason: "gcode driver needs an output target".to_string(),
            });
        }

        Ok(())
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

fn out_of_range(key: &str, value: impl std::fmt::Display) -> ConfigError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value: value.to_string(),
    }
}
