//! Core trajectory data types.
//!
//! A [`Trajectory`] records one episode of policy-environment interaction as
//! an ordered sequence of (state, option, action, reward) steps. Trajectories
//! are immutable once collected; the validation and statistics code only
//! reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single step within a trajectory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// The (filtered) observation the policy acted on.
    pub state: Vec<f64>,
    /// The latent option active for this step (always 0 for flat policies).
    pub option: usize,
    /// The action the policy took.
    pub action: Vec<f64>,
    /// The scalar reward for this transition.
    pub reward: f64,
}

/// A complete trajectory for one episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trajectory {
    /// Unique identifier (UUID v4).
    pub id: String,
    /// Which environment produced this trajectory.
    pub env_name: String,
    /// UTC timestamp of collection.
    pub collected_at: DateTime<Utc>,
    /// Whether the rollout was deterministic (mean action / argmax option).
    pub fixed: bool,
    /// Ordered sequence of steps.
    pub steps: Vec<Step>,
}

impl Trajectory {
    /// Episode length in steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the trajectory has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Total accumulated reward over the episode.
    pub fn total_reward(&self) -> f64 {
        self.steps.iter().map(|s| s.reward).sum()
    }

    /// The option index sequence, one entry per step.
    pub fn options(&self) -> Vec<usize> {
        self.steps.iter().map(|s| s.option).collect()
    }

    /// The state sequence, one vector per step.
    pub fn states(&self) -> Vec<Vec<f64>> {
        self.steps.iter().map(|s| s.state.clone()).collect()
    }

    /// The action sequence, one vector per step.
    pub fn actions(&self) -> Vec<Vec<f64>> {
        self.steps.iter().map(|s| s.action.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trajectory_with_rewards(rewards: &[f64]) -> Trajectory {
        Trajectory {
            id: uuid::Uuid::new_v4().to_string(),
            env_name: "test".into(),
            collected_at: Utc::now(),
            fixed: false,
            steps: rewards
                .iter()
                .enumerate()
                .map(|(i, &r)| Step {
                    state: vec![0.0],
                    option: i % 2,
                    action: vec![0.0],
                    reward: r,
                })
                .collect(),
        }
    }

    #[test]
    fn total_reward_sums_steps() {
        let t = trajectory_with_rewards(&[1.0, -0.5, 2.5]);
        assert!((t.total_reward() - 3.0).abs() < 1e-12);
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn options_align_with_steps() {
        let t = trajectory_with_rewards(&[0.0, 0.0, 0.0, 0.0]);
        assert_eq!(t.options(), vec![0, 1, 0, 1]);
    }

    #[test]
    fn serialization_roundtrip() {
        let t = trajectory_with_rewards(&[1.0, 2.0]);
        let json = serde_json::to_string(&t).unwrap();
        let restored: Trajectory = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.id, t.id);
        assert_eq!(restored.len(), 2);
    }
}
