//! Core environment trait and shared types.
//!
//! Every simulation backend (MuJoCo-style locomotion, RLBench-style
//! manipulation) implements the [`Environment`] trait so that the trajectory
//! collector and the replay driver can interact with it uniformly.

use serde::{Deserialize, Serialize};

/// The result of stepping (or resetting) an environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvStep {
    /// The raw (unfiltered) observation vector.
    pub state: Vec<f64>,
    /// The scalar reward for the transition that produced this observation.
    pub reward: f64,
    /// Whether the episode has terminated.
    pub done: bool,
}

/// The core environment trait.
///
/// Implementations own their dynamics and an internal RNG; a given seed
/// always reproduces the same episode sequence.
pub trait Environment {
    /// Reset the environment and return the initial observation.
    ///
    /// The initial observation carries reward 0 and `done = false`.
    fn reset(&mut self) -> EnvStep;

    /// Apply an action and return the resulting observation.
    fn step(&mut self, action: &[f64]) -> EnvStep;

    /// The observation and action dimensionalities `(dim_s, dim_a)`.
    fn state_action_size(&self) -> (usize, usize);

    /// Maximum number of steps before forced truncation.
    fn max_steps(&self) -> usize;

    /// The environment/task identifier (e.g. "HalfCheetah-v2").
    fn name(&self) -> &str;
}
