use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use stackbots_core::SimulationConfig;

/// Layout of a `--config` file.
///
/// ```toml
/// [simulation]
/// width = 12
/// robots = 6
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ConfigFile {
    pub(crate) simulation: SimulationConfig,
}

impl ConfigFile {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let file: Self = toml::from_str(contents)?;
        Ok(file)
    }
}

/// Flag values that replace fields of the loaded configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Overrides {
    pub(crate) width: Option<u32>,
    pub(crate) height: Option<u32>,
    pub(crate) robots: Option<u32>,
    pub(crate) items: Option<u32>,
    pub(crate) max_steps: Option<u64>,
    pub(crate) seed: Option<u64>,
}

impl Overrides {
    pub(crate) fn apply(self, mut config: SimulationConfig) -> SimulationConfig {
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(robots) = self.robots {
            config.robots = robots;
        }
        if let Some(items) = self.items {
            config.items = items;
        }
        if let Some(max_steps) = self.max_steps {
            config.max_steps = max_steps;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config
    }
}
