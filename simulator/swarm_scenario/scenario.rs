// Scenario file format
//
// A scenario is a YAML document with optional metadata, a `SwarmConfig`
// (every field optional, defaults fill the rest), an optional file size that
// overrides `total_chunks`, and driver settings.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use swarm_sim::{FileSpec, SwarmConfig, SwarmError, TickSchedule};

#[derive(Debug, Deserialize)]
pub struct ScenarioFile {
    #[serde(default)]
    pub meta: ScenarioMeta,

    #[serde(default)]
    pub config: SwarmConfig,

    /// Derive `total_chunks` from file and chunk sizes instead
    #[serde(default)]
    pub file: Option<FileSize>,

    #[serde(default)]
    pub run: RunSettings,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScenarioMeta {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Sizes such as `"10 MB"` / `"256 KB"`
#[derive(Debug, Deserialize)]
pub struct FileSize {
    pub size: String,
    pub chunk_size: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub max_ticks: u64,
    /// Sleep between ticks like the interactive view would
    pub realtime: bool,
    pub speed_multiplier: f64,
    pub event_logging: bool,
    /// Write the run summary as YAML to this path
    pub summary_path: Option<String>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            max_ticks: 1000,
            realtime: false,
            speed_multiplier: 1.0,
            event_logging: false,
            summary_path: None,
        }
    }
}

impl ScenarioFile {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&yaml)?)
    }

    /// Final swarm configuration with the file size applied
    pub fn swarm_config(&self, seed: Option<[u8; 32]>) -> Result<SwarmConfig, SwarmError> {
        let mut config = self.config.clone();
        if let Some(ref file) = self.file {
            config.total_chunks = FileSpec::parse(&file.size, &file.chunk_size)?.total_chunks();
        }
        if seed.is_some() {
            config.seed = seed;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn schedule(&self) -> Result<TickSchedule, SwarmError> {
        TickSchedule::new(self.run.speed_multiplier)
    }
}
