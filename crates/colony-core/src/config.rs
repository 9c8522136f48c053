//! Configuration loading and typed config structures for the colony
//! simulation.
//!
//! The canonical configuration lives in `colony-config.yaml` at the project
//! root. Every section and field is optional; missing values fall back to
//! the defaults below.

use std::path::Path;

use serde::Deserialize;

use colony_agents::AgentConfig;
use colony_world::HomelessPolicy;

/// Environment variable that overrides `logging.level`.
pub const LOG_LEVEL_ENV: &str = "COLONY_LOG";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration. Mirrors `colony-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings (name, seed, timing).
    #[serde(default)]
    pub world: WorldConfig,

    /// Unit movement, work, and vitals.
    #[serde(default)]
    pub agents: AgentConfig,

    /// Task policy constants.
    #[serde(default)]
    pub tasks: TaskConfig,

    /// Bed matching, sleep, and homelessness.
    #[serde(default)]
    pub beds: BedConfig,

    /// Starting colony layout used by the engine.
    #[serde(default)]
    pub spawn: SpawnConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `COLONY_LOG` overrides `logging.level` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.logging.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable colony name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility (wander targets, spawn layout).
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Real-time milliseconds per tick. Zero runs as fast as possible.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Stop after this many ticks. Zero runs until extinction.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Ticks in one in-game day.
    #[serde(default = "default_ticks_per_day")]
    pub ticks_per_day: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: default_max_ticks(),
            ticks_per_day: default_ticks_per_day(),
        }
    }
}

/// Policy constants used by task variants.
///
/// Distances are world units, intervals and durations are ticks.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    /// Distance at which a move counts as arrived even without the
    /// navigation arrival signal.
    pub arrival_threshold: f32,
    /// Reach for picking up, eating, and depositing.
    pub interaction_range: f32,
    /// Reach for construction work.
    pub construct_range: f32,
    /// Ticks between construction work applications.
    pub construct_interval: u64,
    /// Workers allowed on one construction posting.
    pub construct_max_workers: u32,
    /// Reach for harvesting.
    pub harvest_range: f32,
    /// Ticks between gather applications.
    pub harvest_interval: u64,
    /// Reach for workstation work.
    pub workstation_range: f32,
    /// Ticks between workstation work applications.
    pub workstation_interval: u64,
    /// Maximum distance of a wander target from the start position.
    pub wander_radius: f32,
    /// Wander self-terminates after this many ticks.
    pub wander_ticks: u64,
    /// Duration of an idle wait.
    pub idle_wait_ticks: u64,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            arrival_threshold: 0.5,
            interaction_range: 1.0,
            construct_range: 1.5,
            construct_interval: 2,
            construct_max_workers: 2,
            harvest_range: 1.5,
            harvest_interval: 2,
            workstation_range: 1.5,
            workstation_interval: 1,
            wander_radius: 5.0,
            wander_ticks: 20,
            idle_wait_ticks: 10,
        }
    }
}

/// Bed assignment and sleep settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BedConfig {
    /// Match unhoused units to free beds automatically.
    pub auto_assign: bool,
    /// Morale removed from each unhoused unit per penalty tick.
    pub homeless_penalty: u32,
    /// Ticks between homeless penalties. Zero disables them.
    pub homeless_interval_ticks: u64,
    /// Morale removed when sleep is interrupted.
    pub eviction_penalty: u32,
    /// Length of a full sleep.
    pub sleep_ticks: u64,
    /// Energy restored per tick of sleep.
    pub energy_per_tick: u32,
}

impl Default for BedConfig {
    fn default() -> Self {
        Self {
            auto_assign: true,
            homeless_penalty: 2,
            homeless_interval_ticks: 20,
            eviction_penalty: 5,
            sleep_ticks: colony_world::DEFAULT_SLEEP_TICKS,
            energy_per_tick: 3,
        }
    }
}

impl BedConfig {
    /// The homeless penalty as a policy value.
    pub const fn homeless_policy(&self) -> HomelessPolicy {
        HomelessPolicy {
            penalty: self.homeless_penalty,
            interval_ticks: self.homeless_interval_ticks,
        }
    }
}

/// Starting colony layout. Positions are scattered around the origin.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Units to spawn.
    pub agents: u32,
    /// Built beds.
    pub beds: u32,
    /// Workstations, each with one queued job.
    pub workstations: u32,
    /// Work in each queued workstation job.
    pub workstation_job_work: f32,
    /// Construction sites, each unlocking one extra bed.
    pub construction_sites: u32,
    /// Work required per construction site.
    pub construction_work: f32,
    /// Trees yielding wood.
    pub trees: u32,
    /// Berry bushes.
    pub bushes: u32,
    /// Units yielded per node.
    pub node_yield: u32,
    /// Storage stockpiles.
    pub storages: u32,
    /// Capacity per storage.
    pub storage_capacity: u32,
    /// Radius of the area everything is scattered in.
    pub radius: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            agents: 6,
            beds: 4,
            workstations: 1,
            workstation_job_work: 20.0,
            construction_sites: 2,
            construction_work: 30.0,
            trees: 4,
            bushes: 3,
            node_yield: 12,
            storages: 1,
            storage_capacity: 200,
            radius: 15.0,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (`trace`, `debug`, `info`, ...), or any
    /// `EnvFilter` directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,

    /// Log a summary line every this many ticks.
    #[serde(default = "default_summary_interval_ticks")]
    pub summary_interval_ticks: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            summary_interval_ticks: default_summary_interval_ticks(),
        }
    }
}

impl LoggingConfig {
    /// Override the level with `COLONY_LOG` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(LOG_LEVEL_ENV) {
            self.level = val;
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Colony".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_tick_interval_ms() -> u64 {
    100
}

const fn default_max_ticks() -> u64 {
    2000
}

const fn default_ticks_per_day() -> u64 {
    240
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_summary_interval_ticks() -> u64 {
    50
}
