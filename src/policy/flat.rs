//! Flat (non-hierarchical) Gaussian policy.
//!
//! A linear-Gaussian parameterisation: the action mean is `W s + b` and each
//! action dimension carries its own log standard deviation. This is the
//! checkpointable policy container the evaluation tooling loads parameters
//! into; the training process that produced those parameters lives elsewhere.

use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

const LOG_2PI: f64 = 1.8378770664093453;

/// A diagonal-Gaussian policy with a linear mean.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianPolicy {
    pub dim_s: usize,
    pub dim_a: usize,
    /// Row-major `dim_a x dim_s` weight matrix.
    weight: Vec<Vec<f64>>,
    bias: Vec<f64>,
    /// Per-action-dimension log standard deviation.
    log_std: Vec<f64>,
}

impl GaussianPolicy {
    /// A zero-initialised policy (mean 0, unit std).
    pub fn new(dim_s: usize, dim_a: usize) -> Self {
        Self {
            dim_s,
            dim_a,
            weight: vec![vec![0.0; dim_s]; dim_a],
            bias: vec![0.0; dim_a],
            log_std: vec![0.0; dim_a],
        }
    }

    /// A randomly-initialised policy, for tests and synthetic checkpoints.
    pub fn random(dim_s: usize, dim_a: usize, rng: &mut StdRng) -> Self {
        let mut policy = Self::new(dim_s, dim_a);
        for row in policy.weight.iter_mut() {
            for w in row.iter_mut() {
                *w = rng.gen_range(-0.1..0.1);
            }
        }
        for b in policy.bias.iter_mut() {
            *b = rng.gen_range(-0.1..0.1);
        }
        for ls in policy.log_std.iter_mut() {
            *ls = rng.gen_range(-1.0..0.0);
        }
        policy
    }

    /// The action mean `W s + b`.
    pub fn mean(&self, state: &[f64]) -> Vec<f64> {
        self.weight
            .iter()
            .zip(self.bias.iter())
            .map(|(row, b)| row.iter().zip(state.iter()).map(|(w, s)| w * s).sum::<f64>() + b)
            .collect()
    }

    /// Log-probability of `action` under the policy's distribution at `state`,
    /// summed over action dimensions.
    pub fn log_prob_action(&self, state: &[f64], action: &[f64]) -> f64 {
        let mean = self.mean(state);
        mean.iter()
            .zip(action.iter())
            .zip(self.log_std.iter())
            .map(|((m, a), ls)| {
                let z = (a - m) / ls.exp();
                -0.5 * (LOG_2PI + z * z) - ls
            })
            .sum()
    }

    /// Draw an action: the mean when `fixed`, a sample otherwise.
    pub fn act(&self, state: &[f64], rng: &mut StdRng, fixed: bool) -> Vec<f64> {
        let mean = self.mean(state);
        if fixed {
            return mean;
        }
        mean.iter()
            .zip(self.log_std.iter())
            .map(|(m, ls)| match Normal::new(*m, ls.exp()) {
                Ok(normal) => normal.sample(rng),
                // Degenerate std collapses to the mean.
                Err(_) => *m,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn zero_policy_log_prob_is_standard_normal() {
        let policy = GaussianPolicy::new(3, 2);
        // Mean 0, std 1: log p(0) per dim is -0.5 ln(2 pi).
        let lp = policy.log_prob_action(&[1.0, 2.0, 3.0], &[0.0, 0.0]);
        assert!((lp - (-LOG_2PI)).abs() < 1e-12);
    }

    #[test]
    fn log_prob_peaks_at_the_mean() {
        let mut rng = StdRng::seed_from_u64(2);
        let policy = GaussianPolicy::random(4, 2, &mut rng);
        let state = vec![0.3, -0.7, 1.1, 0.0];
        let mean = policy.mean(&state);

        let at_mean = policy.log_prob_action(&state, &mean);
        let off_mean: Vec<f64> = mean.iter().map(|m| m + 0.5).collect();
        assert!(at_mean > policy.log_prob_action(&state, &off_mean));
        assert!(at_mean.is_finite());
    }

    #[test]
    fn fixed_action_is_the_mean_and_deterministic() {
        let mut rng = StdRng::seed_from_u64(3);
        let policy = GaussianPolicy::random(3, 2, &mut rng);
        let state = vec![0.1, 0.2, 0.3];

        let a = policy.act(&state, &mut rng, true);
        let b = policy.act(&state, &mut rng, true);
        assert_eq!(a, b);
        assert_eq!(a, policy.mean(&state));
    }

    #[test]
    fn sampled_actions_vary() {
        let mut rng = StdRng::seed_from_u64(4);
        let policy = GaussianPolicy::random(3, 2, &mut rng);
        let state = vec![0.1, 0.2, 0.3];

        let a = policy.act(&state, &mut rng, false);
        let b = policy.act(&state, &mut rng, false);
        assert_ne!(a, b);
    }
}
