//! Experiment bookkeeping: seeding, directory layout, learning-rate decay
//! and a convenience wrapper for sampling exploratory batches.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::EnvType;
use crate::env::Environment;
use crate::policy::{PolicyKind, StateFilter};
use crate::trajectory::{CollectSpec, Trajectory, TrajectoryCollector};

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

// Offsets decorrelating the three streams derived from one seed.
const ENV_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;
const POLICY_STREAM: u64 = 0xD1B5_4A32_D192_ED03;

/// Three decoupled RNG handles for one experiment run: general-purpose,
/// environment noise, and policy sampling.
///
/// The same seed always yields the same three streams, and no hidden global
/// RNG state is involved.
pub struct SeedStreams {
    pub general: StdRng,
    pub env: StdRng,
    pub policy: StdRng,
}

impl SeedStreams {
    pub fn new(seed: u64) -> Self {
        Self {
            general: StdRng::seed_from_u64(seed),
            env: StdRng::seed_from_u64(seed ^ ENV_STREAM),
            policy: StdRng::seed_from_u64(seed ^ POLICY_STREAM),
        }
    }
}

// ---------------------------------------------------------------------------
// Directory layout
// ---------------------------------------------------------------------------

/// The four resolved paths of one experiment run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDirs {
    /// Directory for training logs.
    pub log_dir: PathBuf,
    /// Directory for model checkpoints.
    pub save_dir: PathBuf,
    /// Cached demonstration-sample file.
    pub sample_path: PathBuf,
    /// Cached pretrained-model file.
    pub pretrain_path: PathBuf,
}

/// Resolve and create the run directory layout under the fixed roots
/// `./result` and `./data`.
///
/// `env_type` must be one of "mini", "mujoco", "rlbench"; anything else is
/// rejected before any filesystem side effect. The log and model directories
/// are created with fail-if-exists semantics so a re-run can never clobber a
/// previous run's artifacts.
pub fn get_dirs(
    seed: u64,
    exp_type: &str,
    env_type: &str,
    env_name: &str,
    msg: &str,
    is_opt: bool,
) -> Result<RunDirs> {
    get_dirs_under(Path::new("./result"), Path::new("./data"), seed, exp_type, env_type, env_name, msg, is_opt)
}

/// [`get_dirs`] with explicit base roots (exposed for tests).
#[allow(clippy::too_many_arguments)]
pub fn get_dirs_under(
    base_log_dir: &Path,
    base_data_dir: &Path,
    seed: u64,
    exp_type: &str,
    env_type: &str,
    env_name: &str,
    msg: &str,
    is_opt: bool,
) -> Result<RunDirs> {
    let env_type: EnvType = env_type.parse()?;
    let opt_suffix = if is_opt { "-opt" } else { "" };

    let sample_path = base_data_dir
        .join(env_type.as_str())
        .join(format!("{env_name}_sample.json"));
    let pretrain_path = base_data_dir
        .join(env_type.as_str())
        .join(format!("{env_name}_pretrained{opt_suffix}.json"));

    let log_dir_root = base_log_dir
        .join(env_name)
        .join(format!("{exp_type}{opt_suffix}"))
        .join(msg)
        .join(seed.to_string());
    let save_dir = log_dir_root.join("model");
    let log_dir = log_dir_root.join("log");

    std::fs::create_dir_all(&log_dir_root)
        .with_context(|| format!("Failed to create {}", log_dir_root.display()))?;
    // Plain create_dir: a pre-existing run with the same parameters must fail
    // loudly instead of being overwritten.
    std::fs::create_dir(&save_dir)
        .with_context(|| format!("Failed to create {}", save_dir.display()))?;
    std::fs::create_dir(&log_dir)
        .with_context(|| format!("Failed to create {}", log_dir.display()))?;

    Ok(RunDirs {
        log_dir,
        save_dir,
        sample_path,
        pretrain_path,
    })
}

// ---------------------------------------------------------------------------
// Learning-rate schedule
// ---------------------------------------------------------------------------

/// Piecewise-linear decay multiplier: `start` at iteration 0, `end` at
/// `end_iter`, clamped to `end` thereafter.
pub fn lr_factor_func(i_iter: usize, end_iter: usize, start: f64, end: f64) -> f64 {
    if end_iter == 0 || i_iter > end_iter {
        end
    } else {
        start - (start - end) * i_iter as f64 / end_iter as f64
    }
}

// ---------------------------------------------------------------------------
// Batch sampling
// ---------------------------------------------------------------------------

/// Collect at least `n_step` steps of exploratory experience and return the
/// raw batch together with its mean episode return.
pub fn sample_batch(
    collector: &TrajectoryCollector,
    env: &mut impl Environment,
    policy: &PolicyKind,
    filter: &mut StateFilter,
    n_step: usize,
    rng: &mut StdRng,
) -> Result<(Vec<Trajectory>, f64)> {
    let batch = collector.collect(env, policy, filter, CollectSpec::Steps(n_step), false, rng);
    if batch.is_empty() {
        anyhow::bail!("sample_batch collected an empty batch (n_step = {n_step})");
    }
    let rsum = batch.iter().map(|t| t.total_reward()).sum::<f64>() / batch.len() as f64;
    Ok((batch, rsum))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::rlbench::RlBenchEnv;
    use crate::policy::GaussianPolicy;
    use rand::Rng;

    fn temp_roots() -> (PathBuf, PathBuf, PathBuf) {
        let base = std::env::temp_dir().join(format!("optgail-dirs-{}", uuid::Uuid::new_v4()));
        (base.join("result"), base.join("data"), base)
    }

    #[test]
    fn seed_streams_reproduce() {
        let mut a = SeedStreams::new(42);
        let mut b = SeedStreams::new(42);
        for _ in 0..16 {
            assert_eq!(a.general.gen::<u64>(), b.general.gen::<u64>());
            assert_eq!(a.env.gen::<u64>(), b.env.gen::<u64>());
            assert_eq!(a.policy.gen::<u64>(), b.policy.gen::<u64>());
        }
    }

    #[test]
    fn seed_streams_are_decoupled() {
        let mut s = SeedStreams::new(7);
        // The three streams start from different states.
        let g = s.general.gen::<u64>();
        let e = s.env.gen::<u64>();
        let p = s.policy.gen::<u64>();
        assert_ne!(g, e);
        assert_ne!(e, p);
    }

    #[test]
    fn lr_factor_endpoints_and_clamp() {
        assert_eq!(lr_factor_func(0, 100, 1.0, 0.0), 1.0);
        assert_eq!(lr_factor_func(100, 100, 1.0, 0.0), 0.0);
        assert_eq!(lr_factor_func(250, 100, 1.0, 0.0), 0.0);
        assert!((lr_factor_func(50, 100, 1.0, 0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn lr_factor_is_monotonic_for_decay() {
        let mut prev = f64::INFINITY;
        for i in 0..=200 {
            let factor = lr_factor_func(i, 150, 1.0, 0.1);
            assert!(factor <= prev + 1e-12);
            prev = factor;
        }
    }

    #[test]
    fn get_dirs_layout_and_collision() {
        let (result_root, data_root, base) = temp_roots();

        let dirs = get_dirs_under(
            &result_root,
            &data_root,
            3,
            "gail",
            "mujoco",
            "HalfCheetah-v2",
            "default",
            true,
        )
        .unwrap();

        assert!(dirs.log_dir.ends_with("HalfCheetah-v2/gail-opt/default/3/log"));
        assert!(dirs.save_dir.ends_with("HalfCheetah-v2/gail-opt/default/3/model"));
        assert!(dirs.sample_path.ends_with("mujoco/HalfCheetah-v2_sample.json"));
        assert!(dirs
            .pretrain_path
            .ends_with("mujoco/HalfCheetah-v2_pretrained-opt.json"));
        assert!(dirs.log_dir.is_dir());
        assert!(dirs.save_dir.is_dir());

        // A second identical call must fail: no silent clobbering.
        let err = get_dirs_under(
            &result_root,
            &data_root,
            3,
            "gail",
            "mujoco",
            "HalfCheetah-v2",
            "default",
            true,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Failed to create"));

        std::fs::remove_dir_all(&base).unwrap();
    }

    #[test]
    fn get_dirs_without_opt_suffix() {
        let (result_root, data_root, base) = temp_roots();
        let dirs = get_dirs_under(
            &result_root,
            &data_root,
            0,
            "gail",
            "rlbench",
            "ReachTarget",
            "run1",
            false,
        )
        .unwrap();
        assert!(dirs.save_dir.ends_with("ReachTarget/gail/run1/0/model"));
        assert!(dirs.pretrain_path.ends_with("rlbench/ReachTarget_pretrained.json"));
        std::fs::remove_dir_all(&base).unwrap();
    }

    #[test]
    fn invalid_env_type_fails_before_side_effects() {
        let (result_root, data_root, base) = temp_roots();
        let err = get_dirs_under(
            &result_root,
            &data_root,
            0,
            "gail",
            "atari",
            "Pong-v0",
            "default",
            true,
        )
        .unwrap_err();
        assert!(err.to_string().contains("atari"));
        // No partial layout may exist.
        assert!(!base.exists());
    }

    #[test]
    fn sample_batch_returns_mean_return() {
        let mut streams = SeedStreams::new(5);
        let policy = PolicyKind::Flat(GaussianPolicy::random(6, 3, &mut streams.policy));
        let mut env = RlBenchEnv::with_seed("ReachTarget", 5).init(false);
        let mut filter = StateFilter::new(true);

        let (batch, rsum) = sample_batch(
            &TrajectoryCollector::new(),
            &mut env,
            &policy,
            &mut filter,
            40,
            &mut streams.general,
        )
        .unwrap();

        let total: usize = batch.iter().map(|t| t.len()).sum();
        assert!(total >= 40);
        let expected = batch.iter().map(|t| t.total_reward()).sum::<f64>() / batch.len() as f64;
        assert!((rsum - expected).abs() < 1e-12);
    }
}
