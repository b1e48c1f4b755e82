//! Plotkit Settings Crate
//!
//! Handles server and plotter configuration: defaults, file loading, validation.

pub mod config;
pub mod error;

pub use config::{Config, PlotterDriver, PlotterSettings, ServerSettings};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
