//! Reward statistics over freshly collected rollouts.
//!
//! [`reward_validate`] collects a batch of episodes for a policy, summarises
//! their returns and lengths, and (for hierarchical policies) reports each
//! rollout's option sequence in descending-return order so behaviours can be
//! matched to outcomes.

use anyhow::{Context, Result};
use ordered_float::NotNan;
use rand::rngs::StdRng;

use crate::env::Environment;
use crate::policy::{PolicyKind, StateFilter};
use crate::trajectory::{CollectSpec, TrajectoryCollector};

/// Summary statistics over one collected batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardStats {
    pub r_max: f64,
    pub r_min: f64,
    pub r_avg: f64,
    pub step_max: usize,
    pub step_min: usize,
}

impl std::fmt::Display for RewardStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "R: [ {:.02} ~ {:.02}, avg: {:.02} ], L: [ {} ~ {} ]",
            self.r_min, self.r_max, self.r_avg, self.step_min, self.step_max
        )
    }
}

/// Collect a batch of exploratory rollouts and summarise it.
///
/// For hierarchical policies the second return value holds each rollout's
/// option sequence, sorted by descending total reward (`None` for flat
/// policies). With `do_print` set, the formatted report is emitted at info
/// level.
pub fn reward_validate(
    collector: &TrajectoryCollector,
    env: &mut impl Environment,
    policy: &PolicyKind,
    filter: &mut StateFilter,
    spec: CollectSpec,
    do_print: bool,
    rng: &mut StdRng,
) -> Result<(RewardStats, Option<Vec<Vec<usize>>>)> {
    let trajs = collector.collect(env, policy, filter, spec, false, rng);
    if trajs.is_empty() {
        anyhow::bail!("reward_validate collected an empty batch");
    }

    let rsums: Vec<f64> = trajs.iter().map(|t| t.total_reward()).collect();
    let steps: Vec<usize> = trajs.iter().map(|t| t.len()).collect();

    let option_seqs = if policy.is_hierarchical() {
        let keys: Vec<NotNan<f64>> = rsums
            .iter()
            .map(|&r| NotNan::new(r))
            .collect::<Result<_, _>>()
            .context("NaN reward in collected batch")?;
        let mut order: Vec<usize> = (0..trajs.len()).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(keys[i]));
        Some(order.into_iter().map(|i| trajs[i].options()).collect())
    } else {
        None
    };

    let stats = RewardStats {
        r_max: rsums.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        r_min: rsums.iter().cloned().fold(f64::INFINITY, f64::min),
        r_avg: rsums.iter().sum::<f64>() / rsums.len() as f64,
        step_max: *steps.iter().max().expect("non-empty batch"),
        step_min: *steps.iter().min().expect("non-empty batch"),
    };

    if do_print {
        tracing::info!(%stats, episodes = trajs.len(), "reward validation");
    }

    Ok((stats, option_seqs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::rlbench::RlBenchEnv;
    use crate::policy::{GaussianPolicy, OptionPolicy};
    use rand::SeedableRng;

    #[test]
    fn stats_are_internally_consistent() {
        let mut rng = StdRng::seed_from_u64(1);
        let policy = PolicyKind::Flat(GaussianPolicy::random(6, 3, &mut rng));
        let mut env = RlBenchEnv::with_seed("ReachTarget", 2).init(false);
        let mut filter = StateFilter::new(true);

        let (stats, option_seqs) = reward_validate(
            &TrajectoryCollector::new(),
            &mut env,
            &policy,
            &mut filter,
            CollectSpec::Episodes(6),
            false,
            &mut rng,
        )
        .unwrap();

        assert!(stats.r_min <= stats.r_avg);
        assert!(stats.r_avg <= stats.r_max);
        assert!(stats.step_min <= stats.step_max);
        assert!(option_seqs.is_none());
    }

    #[test]
    fn option_sequences_sort_by_descending_reward() {
        let mut policy_rng = StdRng::seed_from_u64(3);
        let policy = PolicyKind::Option(OptionPolicy::random(6, 3, 3, &mut policy_rng));
        let collector = TrajectoryCollector::new();

        // Collect the same batch twice with identical seeding: once directly,
        // to identify the best rollout, and once through reward_validate.
        let mut env2 = RlBenchEnv::with_seed("ReachTarget", 4).init(false);
        let mut filter2 = StateFilter::new(true);
        let mut rng2 = StdRng::seed_from_u64(10);
        let trajs = collector.collect(
            &mut env2,
            &policy,
            &mut filter2,
            CollectSpec::Episodes(5),
            false,
            &mut rng2,
        );
        let best = trajs
            .iter()
            .max_by(|a, b| a.total_reward().partial_cmp(&b.total_reward()).unwrap())
            .unwrap();

        let mut env = RlBenchEnv::with_seed("ReachTarget", 4).init(false);
        let mut filter = StateFilter::new(true);
        let mut rng = StdRng::seed_from_u64(10);
        let (_, option_seqs) = reward_validate(
            &collector,
            &mut env,
            &policy,
            &mut filter,
            CollectSpec::Episodes(5),
            false,
            &mut rng,
        )
        .unwrap();

        let seqs = option_seqs.unwrap();
        assert_eq!(seqs.len(), 5);
        assert_eq!(seqs[0], best.options());
    }

    #[test]
    fn report_format_matches_convention() {
        let stats = RewardStats {
            r_max: 3.5,
            r_min: -1.25,
            r_avg: 1.0,
            step_max: 200,
            step_min: 17,
        };
        assert_eq!(
            stats.to_string(),
            "R: [ -1.25 ~ 3.50, avg: 1.00 ], L: [ 17 ~ 200 ]"
        );
    }
}
