//! Checkpoint persistence and tolerant loading.
//!
//! A checkpoint is the pair (policy parameters, state-filter statistics)
//! written by the training process. The policy half is kept as raw JSON
//! because training saves it in one of two shapes: the full trainer
//! container (policy + discriminator) or the bare policy parameters.
//! Loading tries the container format first and falls back to the bare
//! format; the last failure surfaces if neither matches.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::policy::{PolicyKind, StateFilter};

/// The full trainer container state, as saved during adversarial training.
///
/// Only the policy is reconstructed here; the discriminator parameters are
/// carried opaquely so container checkpoints round-trip intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerState {
    pub policy: PolicyKind,
    #[serde(default)]
    pub discriminator: Value,
}

/// A persisted (policy parameters, filter statistics) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Either a [`TrainerState`] or a bare [`PolicyKind`], as raw JSON.
    pub policy: Value,
    pub filter: StateFilter,
}

/// One way of interpreting the policy half of a checkpoint.
struct LoaderStrategy {
    name: &'static str,
    load: fn(&Value) -> Result<PolicyKind>,
}

fn load_container_format(value: &Value) -> Result<PolicyKind> {
    let state: TrainerState = serde_json::from_value(value.clone())?;
    Ok(state.policy)
}

fn load_bare_format(value: &Value) -> Result<PolicyKind> {
    Ok(serde_json::from_value::<PolicyKind>(value.clone())?)
}

/// The ordered strategies tried when reconstructing a policy. First success
/// wins; the last failure propagates.
const LOADER_STRATEGIES: &[LoaderStrategy] = &[
    LoaderStrategy {
        name: "trainer container",
        load: load_container_format,
    },
    LoaderStrategy {
        name: "bare policy",
        load: load_bare_format,
    },
];

impl Checkpoint {
    /// Wrap a full trainer container state.
    pub fn from_trainer(state: &TrainerState, filter: StateFilter) -> Result<Self> {
        Ok(Self {
            policy: serde_json::to_value(state)?,
            filter,
        })
    }

    /// Wrap bare policy parameters.
    pub fn from_policy(policy: &PolicyKind, filter: StateFilter) -> Result<Self> {
        Ok(Self {
            policy: serde_json::to_value(policy)?,
            filter,
        })
    }

    /// Load a checkpoint, failing fast if the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            anyhow::bail!("model file {} not exists", path.display());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read checkpoint from {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse checkpoint from {}", path.display()))
    }

    /// Persist the checkpoint as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write checkpoint to {}", path.display()))
    }

    /// Reconstruct the policy through the loader-strategy chain and check it
    /// against the config and environment dimensions.
    pub fn load_policy(&self, config: &Config, dim_s: usize, dim_a: usize) -> Result<PolicyKind> {
        let mut last_err = None;
        for strategy in LOADER_STRATEGIES {
            match (strategy.load)(&self.policy) {
                Ok(policy) => {
                    tracing::debug!(strategy = strategy.name, "checkpoint policy loaded");
                    validate_policy(&policy, config, dim_s, dim_a)?;
                    return Ok(policy);
                }
                Err(err) => {
                    tracing::debug!(strategy = strategy.name, %err, "loader strategy failed");
                    last_err = Some(err.context(format!("{} format rejected", strategy.name)));
                }
            }
        }
        Err(last_err.expect("at least one loader strategy exists"))
    }
}

/// Shape/variant validation of loaded parameters against the target config.
fn validate_policy(policy: &PolicyKind, config: &Config, dim_s: usize, dim_a: usize) -> Result<()> {
    if policy.is_hierarchical() != config.use_option {
        anyhow::bail!(
            "checkpoint policy kind does not match config (use_option = {})",
            config.use_option
        );
    }
    if let PolicyKind::Option(p) = policy {
        if p.dim_c != config.dim_c {
            anyhow::bail!(
                "checkpoint dim_c {} does not match config dim_c {}",
                p.dim_c,
                config.dim_c
            );
        }
    }
    let (ps, pa) = policy.dims();
    if (ps, pa) != (dim_s, dim_a) {
        anyhow::bail!(
            "checkpoint dims ({ps}, {pa}) do not match environment dims ({dim_s}, {dim_a})"
        );
    }
    Ok(())
}
