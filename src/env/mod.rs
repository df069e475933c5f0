//! Simulation backends and their shared trait.
//!
//! Two built-in backends are provided:
//! - **MuJoCo-style** ([`mujoco`]) -- locomotion tasks with damped linear
//!   dynamics and a forward-progress reward.
//! - **RLBench-style** ([`rlbench`]) -- a task-space reach environment.
//!
//! Both are deterministic for a given seed, standing in for the external
//! simulators the training process runs against.

pub mod mujoco;
pub mod rlbench;
pub mod traits;

pub use traits::{EnvStep, Environment};

use crate::config::{Config, EnvType};

// ---------------------------------------------------------------------------
// AnyEnv: enum dispatch wrapper for runtime backend selection
// ---------------------------------------------------------------------------

/// An enum wrapper around the concrete backend types, enabling runtime
/// selection from a [`Config`] without trait objects.
pub enum AnyEnv {
    Mujoco(mujoco::MujocoEnv),
    RlBench(rlbench::RlBenchEnv),
}

impl AnyEnv {
    /// Build the backend named by the config's `env_type` discriminator.
    ///
    /// `mujoco` selects the MuJoCo backend; every other type takes the
    /// RLBench path.
    pub fn from_config(config: &Config, display: bool) -> Self {
        match config.env_type {
            EnvType::Mujoco => {
                AnyEnv::Mujoco(mujoco::MujocoEnv::with_seed(&config.env_name, config.seed).init(display))
            }
            _ => AnyEnv::RlBench(
                rlbench::RlBenchEnv::with_seed(&config.env_name, config.seed).init(display),
            ),
        }
    }
}

impl Environment for AnyEnv {
    fn reset(&mut self) -> EnvStep {
        match self {
            Self::Mujoco(e) => e.reset(),
            Self::RlBench(e) => e.reset(),
        }
    }

    fn step(&mut self, action: &[f64]) -> EnvStep {
        match self {
            Self::Mujoco(e) => e.step(action),
            Self::RlBench(e) => e.step(action),
        }
    }

    fn state_action_size(&self) -> (usize, usize) {
        match self {
            Self::Mujoco(e) => e.state_action_size(),
            Self::RlBench(e) => e.state_action_size(),
        }
    }

    fn max_steps(&self) -> usize {
        match self {
            Self::Mujoco(e) => e.max_steps(),
            Self::RlBench(e) => e.max_steps(),
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Mujoco(e) => e.name(),
            Self::RlBench(e) => e.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_selects_backend() {
        let mut config = Config::default();
        config.env_type = EnvType::Mujoco;
        assert!(matches!(AnyEnv::from_config(&config, false), AnyEnv::Mujoco(_)));

        config.env_type = EnvType::RlBench;
        assert!(matches!(AnyEnv::from_config(&config, false), AnyEnv::RlBench(_)));

        // Anything that is not mujoco takes the RLBench path.
        config.env_type = EnvType::Mini;
        assert!(matches!(AnyEnv::from_config(&config, false), AnyEnv::RlBench(_)));
    }
}
