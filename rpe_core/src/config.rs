//! Configuration file support for the RPE planner.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/rpeplan/config.toml`.

use crate::rpe_table::{MAX_EXERTION, MIN_EXERTION};
use crate::{BlockGoal, Error, ExerciseTarget, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub block: BlockConfig,

    #[serde(default)]
    pub exercise: ExerciseConfig,

    #[serde(default)]
    pub progress: ProgressConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Defaults for a new training block
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockConfig {
    #[serde(default)]
    pub goal: BlockGoal,

    #[serde(default = "default_total_weeks")]
    pub total_weeks: u32,

    #[serde(default = "default_start_exertion")]
    pub start_exertion: f64,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            goal: BlockGoal::default(),
            total_weeks: default_total_weeks(),
            start_exertion: default_start_exertion(),
        }
    }
}

/// Defaults for a new exercise
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExerciseConfig {
    #[serde(default = "default_sets")]
    pub sets: u32,

    #[serde(default = "default_target_reps")]
    pub target_reps: u32,
}

impl Default for ExerciseConfig {
    fn default() -> Self {
        Self {
            sets: default_sets(),
            target_reps: default_target_reps(),
        }
    }
}

/// Progress chart configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressConfig {
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|| PathBuf::from("."))
    });
    base.join("rpeplan")
}

fn default_total_weeks() -> u32 {
    8
}

fn default_start_exertion() -> f64 {
    7.0
}

fn default_sets() -> u32 {
    3
}

fn default_target_reps() -> u32 {
    5
}

fn default_history_limit() -> usize {
    10
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("rpeplan").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Check configured defaults; returns human-readable problems
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.block.total_weeks < 1 {
            errors.push("block.total_weeks must be at least 1".to_string());
        }
        if !(MIN_EXERTION as f64..=MAX_EXERTION as f64).contains(&self.block.start_exertion) {
            errors.push(format!(
                "block.start_exertion {} outside {}..={}",
                self.block.start_exertion, MIN_EXERTION, MAX_EXERTION
            ));
        }
        if self.exercise.sets < 1 {
            errors.push("exercise.sets must be at least 1".to_string());
        }
        if self.exercise.target_reps < 1 {
            errors.push("exercise.target_reps must be at least 1".to_string());
        }

        errors
    }

    /// Exercise target built from configured defaults
    pub fn default_target(&self, one_rep_max: f64) -> ExerciseTarget {
        ExerciseTarget {
            one_rep_max,
            target_reps: self.exercise.target_reps,
            baseline_exertion: self.block.start_exertion,
            set_count: self.exercise.sets,
        }
    }
}
