//! Trajectory collection: driving episodes of policy-environment interaction.
//!
//! The [`TrajectoryCollector`] runs the loop
//!   1. filter the raw observation,
//!   2. ask the policy for an (option, action) pair,
//!   3. step the environment,
//!   4. record the (state, option, action, reward) tuple,
//! until the episode ends, and repeats per the [`CollectSpec`].

use chrono::Utc;
use rand::rngs::StdRng;
use uuid::Uuid;

use crate::env::Environment;
use crate::policy::{PolicyKind, StateFilter};
use crate::trajectory::types::{Step, Trajectory};

/// How much experience a collection call should gather.
///
/// The negative-count convention of the original tooling is replaced by an
/// explicit choice between the two plausible readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectSpec {
    /// Collect exactly this many whole episodes.
    Episodes(usize),
    /// Collect whole episodes until at least this many steps are gathered.
    Steps(usize),
}

/// Orchestrates episode collection for a policy in an environment.
#[derive(Debug, Clone, Default)]
pub struct TrajectoryCollector;

impl TrajectoryCollector {
    pub fn new() -> Self {
        Self
    }

    /// Collect experience per `spec`.
    ///
    /// `fixed` selects deterministic rollouts (mean action, argmax option)
    /// and freezes the state filter; exploratory rollouts keep updating it.
    pub fn collect(
        &self,
        env: &mut impl Environment,
        policy: &PolicyKind,
        filter: &mut StateFilter,
        spec: CollectSpec,
        fixed: bool,
        rng: &mut StdRng,
    ) -> Vec<Trajectory> {
        let mut trajectories = Vec::new();
        let mut total_steps = 0usize;

        loop {
            match spec {
                CollectSpec::Episodes(n) => {
                    if trajectories.len() >= n {
                        break;
                    }
                }
                CollectSpec::Steps(n) => {
                    if total_steps >= n {
                        break;
                    }
                }
            }

            let trajectory = self.run_episode(env, policy, filter, fixed, rng);
            total_steps += trajectory.len();
            tracing::info!(
                episode = trajectories.len(),
                steps = trajectory.len(),
                reward = trajectory.total_reward(),
                fixed,
                "collected episode"
            );
            trajectories.push(trajectory);
        }

        trajectories
    }

    /// Run one episode to termination or truncation.
    pub fn run_episode(
        &self,
        env: &mut impl Environment,
        policy: &PolicyKind,
        filter: &mut StateFilter,
        fixed: bool,
        rng: &mut StdRng,
    ) -> Trajectory {
        let mut obs = env.reset();
        let mut steps: Vec<Step> = Vec::new();
        let mut prev_option = policy.initial_option();

        for _ in 0..env.max_steps() {
            if obs.done {
                break;
            }
            let state = if fixed {
                filter.normalize(&obs.state)
            } else {
                filter.update_and_normalize(&obs.state)
            };
            let (option, action) = policy.act(&state, prev_option, rng, fixed);
            let next = env.step(&action);

            steps.push(Step {
                state,
                option,
                action,
                reward: next.reward,
            });

            prev_option = option;
            obs = next;
        }

        Trajectory {
            id: Uuid::new_v4().to_string(),
            env_name: env.name().to_string(),
            collected_at: Utc::now(),
            fixed,
            steps,
        }
    }
}
