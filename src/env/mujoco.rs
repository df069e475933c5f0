//! MuJoCo-style locomotion backend.
//!
//! A deterministic stand-in for the external MuJoCo simulator: damped linear
//! dynamics driven by the action vector, with a forward-progress reward. It
//! replays the same episodes for the same seed, which is what the evaluation
//! and replay tooling needs from a backend.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::traits::{EnvStep, Environment};

/// Observation/action sizes for the locomotion tasks this backend knows.
///
/// Unknown task names fall back to a small default so the tooling still runs.
fn task_dims(env_name: &str) -> (usize, usize) {
    match env_name {
        "HalfCheetah-v2" => (17, 6),
        "Walker2d-v2" => (17, 6),
        "Hopper-v2" => (11, 3),
        "Ant-v2" => (111, 8),
        "Humanoid-v2" => (376, 17),
        _ => (8, 2),
    }
}

/// A MuJoCo-style locomotion environment.
pub struct MujocoEnv {
    env_name: String,
    dim_s: usize,
    dim_a: usize,
    max_steps: usize,
    display: bool,
    state: Vec<f64>,
    step_count: usize,
    rng: StdRng,
}

impl MujocoEnv {
    /// Create an environment for the named task with a default seed.
    pub fn new(env_name: &str) -> Self {
        Self::with_seed(env_name, 0)
    }

    /// Create an environment for the named task with an explicit noise seed.
    pub fn with_seed(env_name: &str, seed: u64) -> Self {
        let (dim_s, dim_a) = task_dims(env_name);
        Self {
            env_name: env_name.to_string(),
            dim_s,
            dim_a,
            max_steps: 1000,
            display: false,
            state: vec![0.0; dim_s],
            step_count: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Finish initialisation, optionally enabling display mode.
    ///
    /// There is no real renderer behind this backend; display mode only
    /// announces itself, matching the external simulator's entry point.
    pub fn init(mut self, display: bool) -> Self {
        self.display = display;
        if display {
            tracing::info!(env = %self.env_name, "mujoco backend in display mode");
        }
        self
    }
}

impl Environment for MujocoEnv {
    fn reset(&mut self) -> EnvStep {
        if self.display {
            tracing::debug!(env = %self.env_name, "rendering new episode");
        }
        self.step_count = 0;
        // Small random initial posture around the origin.
        self.state = (0..self.dim_s)
            .map(|_| self.rng.gen_range(-0.1..0.1))
            .collect();
        EnvStep {
            state: self.state.clone(),
            reward: 0.0,
            done: false,
        }
    }

    fn step(&mut self, action: &[f64]) -> EnvStep {
        self.step_count += 1;

        // Damped drift plus action coupling: each state coordinate is pushed
        // by the action component it is wired to.
        let mut forward = 0.0;
        for i in 0..self.dim_s {
            let drive = action[i % self.dim_a].clamp(-1.0, 1.0);
            let noise = self.rng.gen_range(-0.01..0.01);
            self.state[i] = 0.95 * self.state[i] + 0.05 * drive + noise;
            if i == 0 {
                forward = 0.05 * drive;
            }
        }

        // Forward progress minus a quadratic control cost.
        let ctrl_cost: f64 = action.iter().map(|a| 1e-3 * a * a).sum();
        let reward = forward - ctrl_cost;

        // Locomotion tasks here only truncate; they do not fall over.
        let done = self.step_count >= self.max_steps;

        EnvStep {
            state: self.state.clone(),
            reward,
            done,
        }
    }

    fn state_action_size(&self) -> (usize, usize) {
        (self.dim_s, self.dim_a)
    }

    fn max_steps(&self) -> usize {
        self.max_steps
    }

    fn name(&self) -> &str {
        &self.env_name
    }
}
