//! Command line interface

use anyhow::Context;
use clap::{Parser, ValueEnum};
use plotkit_settings::{Config, PlotterDriver};
use std::path::PathBuf;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human readable, multi-line
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Line-protocol plotting server
#[derive(Parser, Debug)]
#[command(name = "plotkit", version, about)]
pub struct Cli {
    /// Configuration file (.toml or .json); defaults to the platform config dir
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Interface to listen on
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Motion backend: simulated or gcode
    #[arg(long)]
    pub driver: Option<PlotterDriver>,

    /// G-code target: `-`, a file path, or tcp://host:port
    #[arg(short, long, value_name = "TARGET")]
    pub output: Option<String>,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl Cli {
    /// Resolve the effective configuration: file values first, flags on top
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let base = match &self.config {
            Some(path) => Config::load_from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => match Config::default_path() {
                Ok(path) if path.exists() => Config::load_from_file(&path)
                    .with_context(|| format!("Failed to load config from {}", path.display()))?,
                _ => Config::default(),
            },
        };

        let config = self.apply(base);
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Overlay the flags that were given onto `config`
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(driver) = self.driver {
            config.plotter.driver = driver;
        }
        if let Some(output) = &self.output {
            config.plotter.output = output.clone();
        }
        config
    }
}
