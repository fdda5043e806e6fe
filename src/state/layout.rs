use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::render::readout::Readout;
use crate::state::channel::ChannelSpec;

/// Track layout and readout settings for a viewer window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub channels: Vec<ChannelSpec>,
    pub readout: Readout,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            channels: default_channels(),
            readout: Readout::default(),
        }
    }
}

impl ViewerConfig {
    /// Read a JSON layout file. Missing fields fall back to the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        if config.channels.is_empty() {
            return Err(ConfigError::NoChannels);
        }
        Ok(config)
    }
}

/// Stock JB4 layout: RPM, boost, pedal, AFR, intake temperature, speed.
pub fn default_channels() -> Vec<ChannelSpec> {
    vec![
        ChannelSpec::new("RPM", "RPM", [0.0, 7000.0]),
        ChannelSpec::new("Boost", "Boost (psi)", [0.0, 25.0]).with_aliases(&["ECU Boost"]),
        ChannelSpec::new("Pedal", "Pedal / Throttle (%)", [0.0, 110.0]).with_aliases(&["Throttle"]),
        ChannelSpec::new("AFR", "AFR", [10.0, 22.0]),
        ChannelSpec::new("IAT", "IAT (\u{00B0}F)", [0.0, 160.0]),
        ChannelSpec::new("Speed", "Speed (mph)", [0.0, 120.0]).with_aliases(&["GPS Speed"]),
    ]
}

#[derive(Debug, Clone, Default, PartialEq, Parser)]
#[command(name = "tunerlog")]
#[command(about = "Stacked channel viewer for JB4 tuner logs")]
pub struct CliArgs {
    /// JSON track layout replacing the default JB4 channels
    #[arg(long, value_name = "FILE")]
    pub layout: Option<PathBuf>,
    /// Log to open on startup
    #[arg(value_name = "LOG")]
    pub log: Option<PathBuf>,
}
