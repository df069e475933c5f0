//! Demonstration log-likelihood validation.
//!
//! Given a policy and a set of demonstration (state, action) sequences,
//! compute the unweighted per-trajectory average log-likelihood and, for
//! hierarchical policies, the Viterbi-decoded option sequence of each
//! demonstration. Inference only; nothing here mutates the policy.

use anyhow::Result;

use crate::policy::PolicyKind;

/// One demonstration: aligned state and action sequences.
#[derive(Debug, Clone)]
pub struct Demonstration {
    pub states: Vec<Vec<f64>>,
    pub actions: Vec<Vec<f64>>,
}

impl Demonstration {
    pub fn new(states: Vec<Vec<f64>>, actions: Vec<Vec<f64>>) -> Self {
        Self { states, actions }
    }
}

/// Average per-sequence log-likelihood of `demos` under `policy`, plus the
/// decoded latent option sequence per demonstration.
///
/// Hierarchical policies are decoded with [`viterbi_path`] and contribute the
/// joint (transition + emission) log-probability; flat policies contribute
/// the summed action log-probability and record a `[0]` placeholder.
///
/// An empty demonstration list is a precondition violation, not a silent
/// zero.
///
/// [`viterbi_path`]: crate::policy::OptionPolicy::viterbi_path
pub fn validate(policy: &PolicyKind, demos: &[Demonstration]) -> Result<(f64, Vec<Vec<usize>>)> {
    if demos.is_empty() {
        anyhow::bail!("validate requires at least one demonstration sequence");
    }

    let mut log_pi = 0.0;
    let mut option_seqs = Vec::with_capacity(demos.len());

    for demo in demos {
        match policy {
            PolicyKind::Option(p) => {
                let (path, logp) = p.viterbi_path(&demo.states, &demo.actions);
                log_pi += logp;
                option_seqs.push(path);
            }
            PolicyKind::Flat(p) => {
                log_pi += demo
                    .states
                    .iter()
                    .zip(demo.actions.iter())
                    .map(|(s, a)| p.log_prob_action(s, a))
                    .sum::<f64>();
                option_seqs.push(vec![0]);
            }
        }
    }

    Ok((log_pi / demos.len() as f64, option_seqs))
}
