//! Replay/render driver.
//!
//! [`display_model`] loads a persisted checkpoint and its companion config,
//! reconstructs the policy and state filter, and loops forever rendering
//! deterministic rollouts. For hierarchical policies the decoded option-index
//! time series is redrawn as an SVG after every episode, with a short pause
//! so an external viewer can refresh; the episode's return and length are
//! printed every iteration. The loop has no termination of its own -- it is
//! an interactive tool meant to be interrupted externally.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use plotters::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::checkpoint::Checkpoint;
use crate::config::Config;
use crate::env::{AnyEnv, Environment};
use crate::policy::{PolicyKind, StateFilter};
use crate::trajectory::TrajectoryCollector;

/// The result of one rendered episode.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub total_reward: f64,
    pub steps: usize,
    pub options: Vec<usize>,
}

/// Draw the option-index time series of one episode as an SVG line plot.
///
/// Axis setup mirrors the interactive figure this replaces: one gridline per
/// option index, y range -0.2 .. dim_c - 0.8. The plot is geometry-only (no
/// text) so the SVG backend needs no font machinery.
pub fn plot_option_trace(path: &Path, options: &[usize], dim_c: usize) -> Result<()> {
    let root = SVGBackend::new(path, (800, 400)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| anyhow::anyhow!("{e}"))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(
            0f64..options.len().max(1) as f64,
            -0.2f64..(dim_c as f64 - 0.8),
        )
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    chart
        .configure_mesh()
        .y_labels(dim_c)
        .draw()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    chart
        .draw_series(LineSeries::new(
            options.iter().enumerate().map(|(t, &c)| (t as f64, c as f64)),
            &RED,
        ))
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    root.present().map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(())
}

/// Run one deterministic rollout, refreshing the option-trace plot for
/// hierarchical policies.
pub fn render_episode(
    env: &mut impl Environment,
    policy: &PolicyKind,
    filter: &mut StateFilter,
    rng: &mut StdRng,
    trace_path: Option<&Path>,
) -> Result<RenderOutcome> {
    let trajectory = TrajectoryCollector::new().run_episode(env, policy, filter, true, rng);
    let outcome = RenderOutcome {
        total_reward: trajectory.total_reward(),
        steps: trajectory.len(),
        options: trajectory.options(),
    };

    if policy.is_hierarchical() {
        if let Some(path) = trace_path {
            plot_option_trace(path, &outcome.options, policy.dim_c())
                .with_context(|| format!("Failed to plot option trace to {}", path.display()))?;
        }
    }

    Ok(outcome)
}

/// Resolve the companion config path: explicit if given, otherwise the
/// sibling `config.log` next to the checkpoint.
fn resolve_config_path(model_path: &Path, config_path: Option<&Path>) -> PathBuf {
    match config_path {
        Some(p) => p.to_path_buf(),
        None => model_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("config.log"),
    }
}

/// Load a checkpoint and loop forever rendering deterministic rollouts.
pub fn display_model(model_path: &Path, config_path: Option<&Path>) -> Result<()> {
    if !model_path.is_file() {
        anyhow::bail!("Error, model file {} not exists", model_path.display());
    }
    let config_path = resolve_config_path(model_path, config_path);

    let mut config = Config::load_saved(&config_path)?;
    config.device = "cpu".into();

    let mut env = AnyEnv::from_config(&config, true);
    let (dim_s, dim_a) = env.state_action_size();

    let checkpoint = Checkpoint::load(model_path)?;
    let policy = checkpoint.load_policy(&config, dim_s, dim_a)?;

    let mut filter = StateFilter::new(config.use_state_filter);
    filter.load_state(checkpoint.filter.clone());
    filter.enable = config.use_state_filter;

    let trace_path = model_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("option_trace.svg");
    let mut rng = StdRng::seed_from_u64(config.seed);

    tracing::info!(
        env = %env.name(),
        hierarchical = policy.is_hierarchical(),
        dim_c = policy.dim_c(),
        "replaying checkpoint"
    );

    loop {
        let outcome = render_episode(&mut env, &policy, &mut filter, &mut rng, Some(&trace_path))?;
        if policy.is_hierarchical() {
            // Let an external viewer pick up the refreshed figure.
            std::thread::sleep(Duration::from_millis(100));
        }
        println!("R-sum: {}; L-step: {}", outcome.total_reward, outcome.steps);
    }
}
