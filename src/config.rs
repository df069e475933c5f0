//! Experiment configuration: the immutable snapshot written next to every
//! checkpoint (`config.log`) and reloaded by the evaluation/replay tooling.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Which simulation backend an experiment runs against.
///
/// The string forms ("mini", "mujoco", "rlbench") are what `get_dirs` and the
/// saved config use; anything else is rejected up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvType {
    Mini,
    Mujoco,
    RlBench,
}

impl EnvType {
    /// The canonical lowercase label, as used in directory layouts.
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvType::Mini => "mini",
            EnvType::Mujoco => "mujoco",
            EnvType::RlBench => "rlbench",
        }
    }
}

impl std::fmt::Display for EnvType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnvType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mini" => Ok(EnvType::Mini),
            "mujoco" => Ok(EnvType::Mujoco),
            "rlbench" => Ok(EnvType::RlBench),
            other => {
                anyhow::bail!("env_type {other:?} not supported (expected mini, mujoco or rlbench)")
            }
        }
    }
}

/// Complete configuration for one experiment run.
///
/// Written by the training process as a JSON `config.log` sibling of the
/// checkpoint; read-only for everything in this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Execution device label. The replay driver forces this to `"cpu"`.
    pub device: String,
    /// Whether the policy is hierarchical (has a latent option dimension).
    pub use_option: bool,
    /// Number of discrete options when `use_option` is set.
    pub dim_c: usize,
    /// Which simulation backend to instantiate.
    pub env_type: EnvType,
    /// Environment/task identifier within the backend (e.g. "HalfCheetah-v2").
    pub env_name: String,
    /// Whether observations pass through the running state filter.
    pub use_state_filter: bool,
    /// Seed recorded for the run.
    pub seed: u64,
    /// Experiment family label used in the result directory layout.
    pub exp_type: String,
    /// Free-form run message used in the result directory layout.
    pub msg: String,
    /// Whether the cached pretrained model is the option-augmented variant.
    pub is_opt: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: "cpu".into(),
            use_option: true,
            dim_c: 4,
            env_type: EnvType::Mujoco,
            env_name: "HalfCheetah-v2".into(),
            use_state_filter: true,
            seed: 0,
            exp_type: "gail".into(),
            msg: "default".into(),
            is_opt: true,
        }
    }
}

impl Config {
    /// Load a configuration saved by the training process.
    pub fn load_saved(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Persist the configuration as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_type_parses_known_labels() {
        assert_eq!("mini".parse::<EnvType>().unwrap(), EnvType::Mini);
        assert_eq!("mujoco".parse::<EnvType>().unwrap(), EnvType::Mujoco);
        assert_eq!("rlbench".parse::<EnvType>().unwrap(), EnvType::RlBench);
    }

    #[test]
    fn env_type_rejects_unknown_labels() {
        let err = "atari".parse::<EnvType>().unwrap_err();
        assert!(err.to_string().contains("atari"));
    }

    #[test]
    fn config_save_load_roundtrip() {
        let dir = std::env::temp_dir().join(format!("optgail-cfg-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.log");

        let config = Config {
            env_name: "Walker2d-v2".into(),
            dim_c: 6,
            ..Config::default()
        };
        config.save(&path).unwrap();

        let loaded = Config::load_saved(&path).unwrap();
        assert_eq!(loaded.env_name, "Walker2d-v2");
        assert_eq!(loaded.dim_c, 6);
        assert_eq!(loaded.env_type, EnvType::Mujoco);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_saved_missing_file_errors() {
        let err = Config::load_saved("/nonexistent/config.log").unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }
}
