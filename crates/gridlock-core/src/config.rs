//! Configuration loading and typed config structures for the Gridlock
//! engine.
//!
//! The canonical configuration lives in `gridlock-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror the
//! YAML structure, provides a loader, and validates the result. Config
//! errors are the one class of error that is fatal: a malformed world is
//! rejected before the first tick instead of being absorbed mid-run.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

use gridlock_agents::{EnergySchedule, PriorityPolicy};
use gridlock_types::Cell;

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

    /// The configuration parsed but describes an unusable world.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `gridlock-config.yaml`. All fields have
/// defaults producing the standard 21x21 demo world with four agents.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Grid dimensions.
    #[serde(default)]
    pub grid: GridConfig,

    /// Agents to spawn at startup.
    #[serde(default = "default_agents")]
    pub agents: Vec<AgentSpawnConfig>,

    /// Energy schedule (costs, penalties, pickup regains).
    #[serde(default)]
    pub energy: EnergyConfig,

    /// Contention resolution settings.
    #[serde(default)]
    pub arbitration: ArbitrationConfig,

    /// Run boundary settings.
    #[serde(default)]
    pub bounds: RunBoundsConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            agents: default_agents(),
            energy: EnergyConfig::default(),
            arbitration: ArbitrationConfig::default(),
            bounds: RunBoundsConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yml::from_str(&contents)?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Check everything that can be checked without building the world.
    ///
    /// Spawn cells are only verified to lie inside the grid here; whether
    /// they land on a wall is caught when the simulation state is built.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] on an empty agent list, duplicate
    /// agent names, duplicate spawn cells, out-of-grid spawns, or an
    /// unusable energy schedule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agents.is_empty() {
            return Err(ConfigError::Invalid {
                reason: "at least one agent must be configured".to_owned(),
            });
        }

        let mut names = BTreeSet::new();
        let mut spawns = BTreeSet::new();
        for agent in &self.agents {
            if !names.insert(agent.name.as_str()) {
                return Err(ConfigError::Invalid {
                    reason: format!("duplicate agent name: {}", agent.name),
                });
            }
            if !spawns.insert(agent.spawn_cell()) {
                return Err(ConfigError::Invalid {
                    reason: format!("duplicate spawn cell: {}", agent.spawn_cell()),
                });
            }
            if agent.x >= self.grid.width || agent.y >= self.grid.height {
                return Err(ConfigError::Invalid {
                    reason: format!(
                        "spawn {} for {} is outside the {}x{} grid",
                        agent.spawn_cell(),
                        agent.name,
                        self.grid.width,
                        self.grid.height
                    ),
                });
            }
        }

        self.energy
            .to_schedule()
            .validate()
            .map_err(|err| ConfigError::Invalid {
                reason: format!("{err}"),
            })?;

        Ok(())
    }
}

/// Grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GridConfig {
    /// Grid width in cells.
    #[serde(default = "default_grid_width")]
    pub width: u32,

    /// Grid height in cells.
    #[serde(default = "default_grid_height")]
    pub height: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: default_grid_width(),
            height: default_grid_height(),
        }
    }
}

/// One agent's startup entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentSpawnConfig {
    /// Unique agent name.
    pub name: String,

    /// Spawn column.
    pub x: u32,

    /// Spawn row.
    pub y: u32,
}

impl AgentSpawnConfig {
    /// The spawn position as a cell.
    pub const fn spawn_cell(&self) -> Cell {
        Cell::new(self.x, self.y)
    }
}

/// Energy schedule configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EnergyConfig {
    /// Energy each agent starts with.
    #[serde(default = "default_initial_energy")]
    pub initial_energy: u32,

    /// Hard cap on stored energy.
    #[serde(default = "default_max_energy")]
    pub max_energy: u32,

    /// Energy cost of a committed move.
    #[serde(default = "default_move_cost")]
    pub move_cost: u32,

    /// Energy penalty for an enforced stall.
    #[serde(default = "default_stall_penalty")]
    pub stall_penalty: u32,

    /// Energy cost of voluntarily staying put.
    #[serde(default)]
    pub idle_cost: u32,

    /// Energy regained from a pellet.
    #[serde(default = "default_pellet_energy")]
    pub pellet_energy: u32,

    /// Energy regained from a power pellet.
    #[serde(default = "default_power_pellet_energy")]
    pub power_pellet_energy: u32,
}

impl EnergyConfig {
    /// Convert into the schedule consumed by the agent vitals functions.
    pub const fn to_schedule(&self) -> EnergySchedule {
        EnergySchedule {
            initial_energy: self.initial_energy,
            max_energy: self.max_energy,
            move_cost: self.move_cost,
            stall_penalty: self.stall_penalty,
            idle_cost: self.idle_cost,
            pellet_energy: self.pellet_energy,
            power_pellet_energy: self.power_pellet_energy,
        }
    }
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            initial_energy: default_initial_energy(),
            max_energy: default_max_energy(),
            move_cost: default_move_cost(),
            stall_penalty: default_stall_penalty(),
            idle_cost: 0,
            pellet_energy: default_pellet_energy(),
            power_pellet_energy: default_power_pellet_energy(),
        }
    }
}

/// Contention resolution settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ArbitrationConfig {
    /// Which signal feeds the priority key. Lower key wins.
    #[serde(default)]
    pub policy: PriorityPolicy,

    /// Ticks between forced-arbitration sweeps.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval: u64,

    /// Lottery seed for reproducible runs.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for ArbitrationConfig {
    fn default() -> Self {
        Self {
            policy: PriorityPolicy::default(),
            sweep_interval: default_sweep_interval(),
            seed: default_seed(),
        }
    }
}

/// Run boundary configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RunBoundsConfig {
    /// Maximum number of ticks before the run ends (0 = unlimited).
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
}

impl Default for RunBoundsConfig {
    fn default() -> Self {
        Self {
            max_ticks: default_max_ticks(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_grid_width() -> u32 {
    21
}

const fn default_grid_height() -> u32 {
    21
}

/// Four agents in the interior corners of the default 21x21 grid.
fn default_agents() -> Vec<AgentSpawnConfig> {
    vec![
        AgentSpawnConfig {
            name: "alpha".to_owned(),
            x: 1,
            y: 1,
        },
        AgentSpawnConfig {
            name: "beta".to_owned(),
            x: 19,
            y: 1,
        },
        AgentSpawnConfig {
            name: "gamma".to_owned(),
            x: 1,
            y: 19,
        },
        AgentSpawnConfig {
            name: "delta".to_owned(),
            x: 19,
            y: 19,
        },
    ]
}

const fn default_initial_energy() -> u32 {
    100
}

const fn default_max_energy() -> u32 {
    200
}

const fn default_move_cost() -> u32 {
    1
}

const fn default_stall_penalty() -> u32 {
    2
}

const fn default_pellet_energy() -> u32 {
    2
}

const fn default_power_pellet_energy() -> u32 {
    10
}

const fn default_sweep_interval() -> u64 {
    30
}

const fn default_seed() -> u64 {
    42
}

const fn default_max_ticks() -> u64 {
    2000
}
