//! RLBench-style manipulation backend.
//!
//! A deterministic stand-in for the external RLBench simulator: a gripper
//! point moving in task space toward a per-episode target, rewarded for
//! closing the distance. Episodes end early when the target is reached.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::traits::{EnvStep, Environment};

const DIM_POS: usize = 3;

/// An RLBench-style reach environment.
///
/// Observation layout: gripper position (3) followed by the vector from the
/// gripper to the target (3). Actions are 3-d task-space displacements.
pub struct RlBenchEnv {
    env_name: String,
    max_steps: usize,
    display: bool,
    gripper: [f64; DIM_POS],
    target: [f64; DIM_POS],
    step_count: usize,
    rng: StdRng,
}

impl RlBenchEnv {
    /// Create an environment for the named task with a default seed.
    pub fn new(env_name: &str) -> Self {
        Self::with_seed(env_name, 0)
    }

    /// Create an environment for the named task with an explicit seed.
    pub fn with_seed(env_name: &str, seed: u64) -> Self {
        Self {
            env_name: env_name.to_string(),
            max_steps: 200,
            display: false,
            gripper: [0.0; DIM_POS],
            target: [0.0; DIM_POS],
            step_count: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Finish initialisation, optionally enabling display mode.
    pub fn init(mut self, display: bool) -> Self {
        self.display = display;
        if display {
            tracing::info!(env = %self.env_name, "rlbench backend in display mode");
        }
        self
    }

    fn observation(&self) -> Vec<f64> {
        let mut obs = Vec::with_capacity(2 * DIM_POS);
        obs.extend_from_slice(&self.gripper);
        for i in 0..DIM_POS {
            obs.push(self.target[i] - self.gripper[i]);
        }
        obs
    }

    fn distance(&self) -> f64 {
        (0..DIM_POS)
            .map(|i| (self.target[i] - self.gripper[i]).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

impl Environment for RlBenchEnv {
    fn reset(&mut self) -> EnvStep {
        if self.display {
            tracing::debug!(env = %self.env_name, "rendering new episode");
        }
        self.step_count = 0;
        self.gripper = [0.0; DIM_POS];
        for i in 0..DIM_POS {
            self.target[i] = self.rng.gen_range(-0.5..0.5);
        }
        EnvStep {
            state: self.observation(),
            reward: 0.0,
            done: false,
        }
    }

    fn step(&mut self, action: &[f64]) -> EnvStep {
        self.step_count += 1;

        let before = self.distance();
        for i in 0..DIM_POS {
            let delta = action[i].clamp(-1.0, 1.0) * 0.05;
            self.gripper[i] += delta;
        }
        let after = self.distance();

        let reached = after < 0.02;
        let reward = (before - after) + if reached { 1.0 } else { 0.0 };
        let done = reached || self.step_count >= self.max_steps;

        EnvStep {
            state: self.observation(),
            reward,
            done,
        }
    }

    fn state_action_size(&self) -> (usize, usize) {
        (2 * DIM_POS, DIM_POS)
    }

    fn max_steps(&self) -> usize {
        self.max_steps
    }

    fn name(&self) -> &str {
        &self.env_name
    }
}
