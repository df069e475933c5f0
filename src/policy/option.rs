//! Hierarchical option policy.
//!
//! An [`OptionPolicy`] owns `dim_c` low-level Gaussian heads and a transition
//! table over options. Row `dim_c` of the table is the initial distribution
//! used at the first step of an episode, before any option is active.
//!
//! [`OptionPolicy::viterbi_path`] recovers the maximum-likelihood option
//! sequence for a demonstrated (state, action) sequence by dynamic
//! programming over the transition log-probabilities and the heads' action
//! log-likelihoods.

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::flat::GaussianPolicy;

/// Log-softmax of a logit row.
fn log_softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let log_sum: f64 = logits.iter().map(|l| (l - max).exp()).sum::<f64>().ln() + max;
    logits.iter().map(|l| l - log_sum).collect()
}

/// A hierarchical policy over `dim_c` discrete options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionPolicy {
    pub dim_s: usize,
    pub dim_a: usize,
    pub dim_c: usize,
    /// One Gaussian head per option.
    heads: Vec<GaussianPolicy>,
    /// `(dim_c + 1) x dim_c` transition logits; row `dim_c` is the initial
    /// distribution (no previous option).
    trans_logits: Vec<Vec<f64>>,
}

impl OptionPolicy {
    /// Index used as the "previous option" at the start of an episode.
    pub fn initial_option(&self) -> usize {
        self.dim_c
    }

    /// A zero-initialised policy (uniform transitions, zero-mean heads).
    pub fn new(dim_s: usize, dim_a: usize, dim_c: usize) -> Self {
        Self {
            dim_s,
            dim_a,
            dim_c,
            heads: (0..dim_c).map(|_| GaussianPolicy::new(dim_s, dim_a)).collect(),
            trans_logits: vec![vec![0.0; dim_c]; dim_c + 1],
        }
    }

    /// A randomly-initialised policy, for tests and synthetic checkpoints.
    pub fn random(dim_s: usize, dim_a: usize, dim_c: usize, rng: &mut StdRng) -> Self {
        let mut policy = Self::new(dim_s, dim_a, dim_c);
        policy.heads = (0..dim_c)
            .map(|_| GaussianPolicy::random(dim_s, dim_a, rng))
            .collect();
        for row in policy.trans_logits.iter_mut() {
            for l in row.iter_mut() {
                *l = rng.gen_range(-1.0..1.0);
            }
        }
        policy
    }

    /// Log transition probabilities out of `prev` (use
    /// [`initial_option`](Self::initial_option) at episode start).
    pub fn log_trans(&self, prev: usize) -> Vec<f64> {
        log_softmax(&self.trans_logits[prev])
    }

    /// Log-probability of `action` at `state` under option `c`'s head.
    pub fn log_prob_action_given_option(&self, state: &[f64], action: &[f64], c: usize) -> f64 {
        self.heads[c].log_prob_action(state, action)
    }

    /// Choose the next option given the previous one: argmax when `fixed`,
    /// a categorical sample otherwise.
    pub fn sample_option(&self, prev: usize, rng: &mut StdRng, fixed: bool) -> usize {
        let log_p = self.log_trans(prev);
        if fixed {
            return log_p
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
        let u: f64 = rng.gen();
        let mut acc = 0.0;
        for (c, lp) in log_p.iter().enumerate() {
            acc += lp.exp();
            if u < acc {
                return c;
            }
        }
        self.dim_c - 1
    }

    /// Draw an action from option `c`'s head.
    pub fn act(&self, state: &[f64], c: usize, rng: &mut StdRng, fixed: bool) -> Vec<f64> {
        self.heads[c].act(state, rng, fixed)
    }

    /// Viterbi decode: the maximum-likelihood option sequence for an aligned
    /// demonstration, together with its joint log-probability.
    ///
    /// The joint probability covers both the option transitions and the
    /// per-option action likelihoods:
    ///
    /// `log pi_hi(c_1 | start) + log pi_lo(a_1 | s_1, c_1) + sum_t ...`
    pub fn viterbi_path(&self, states: &[Vec<f64>], actions: &[Vec<f64>]) -> (Vec<usize>, f64) {
        assert_eq!(states.len(), actions.len(), "state/action sequences must align");
        let horizon = states.len();
        if horizon == 0 {
            return (Vec::new(), 0.0);
        }

        // delta[c] is the best joint log-prob of any option path ending in c;
        // back[t][c] is the predecessor achieving it.
        let init = self.log_trans(self.initial_option());
        let mut delta: Vec<f64> = (0..self.dim_c)
            .map(|c| init[c] + self.log_prob_action_given_option(&states[0], &actions[0], c))
            .collect();
        let mut back: Vec<Vec<usize>> = Vec::with_capacity(horizon);

        for t in 1..horizon {
            let trans: Vec<Vec<f64>> = (0..self.dim_c).map(|prev| self.log_trans(prev)).collect();
            let mut next = vec![f64::NEG_INFINITY; self.dim_c];
            let mut back_t = vec![0usize; self.dim_c];
            for c in 0..self.dim_c {
                let emit = self.log_prob_action_given_option(&states[t], &actions[t], c);
                for prev in 0..self.dim_c {
                    let score = delta[prev] + trans[prev][c] + emit;
                    if score > next[c] {
                        next[c] = score;
                        back_t[c] = prev;
                    }
                }
            }
            delta = next;
            back.push(back_t);
        }

        let (mut best, mut best_logp) = (0usize, f64::NEG_INFINITY);
        for (c, &logp) in delta.iter().enumerate() {
            if logp > best_logp {
                best = c;
                best_logp = logp;
            }
        }

        let mut path = vec![best; horizon];
        for t in (1..horizon).rev() {
            path[t - 1] = back[t - 1][path[t]];
        }
        (path, best_logp)
    }

    /// Joint log-probability of a specific option path for a demonstration.
    /// Used to check the optimality of the Viterbi decode.
    pub fn path_log_prob(&self, states: &[Vec<f64>], actions: &[Vec<f64>], path: &[usize]) -> f64 {
        let mut prev = self.initial_option();
        let mut logp = 0.0;
        for t in 0..path.len() {
            logp += self.log_trans(prev)[path[t]];
            logp += self.log_prob_action_given_option(&states[t], &actions[t], path[t]);
            prev = path[t];
        }
        logp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn demo_sequences(policy: &OptionPolicy, len: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut states = Vec::with_capacity(len);
        let mut actions = Vec::with_capacity(len);
        let mut prev = policy.initial_option();
        for _ in 0..len {
            let state: Vec<f64> = (0..policy.dim_s).map(|_| rng.gen_range(-1.0..1.0)).collect();
            let c = policy.sample_option(prev, &mut rng, false);
            let action = policy.act(&state, c, &mut rng, false);
            states.push(state);
            actions.push(action);
            prev = c;
        }
        (states, actions)
    }

    #[test]
    fn log_softmax_normalises() {
        let log_p = log_softmax(&[1.0, 2.0, 3.0]);
        let total: f64 = log_p.iter().map(|l| l.exp()).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn viterbi_path_length_matches_input() {
        let mut rng = StdRng::seed_from_u64(5);
        let policy = OptionPolicy::random(4, 2, 3, &mut rng);
        let (states, actions) = demo_sequences(&policy, 20, 6);

        let (path, logp) = policy.viterbi_path(&states, &actions);
        assert_eq!(path.len(), 20);
        assert!(logp.is_finite());
        assert!(path.iter().all(|&c| c < 3));
    }

    #[test]
    fn viterbi_logp_matches_path_log_prob() {
        let mut rng = StdRng::seed_from_u64(7);
        let policy = OptionPolicy::random(3, 2, 4, &mut rng);
        let (states, actions) = demo_sequences(&policy, 15, 8);

        let (path, logp) = policy.viterbi_path(&states, &actions);
        let recomputed = policy.path_log_prob(&states, &actions, &path);
        assert!((logp - recomputed).abs() < 1e-9);
    }

    #[test]
    fn viterbi_beats_sampled_alternative_paths() {
        let mut rng = StdRng::seed_from_u64(9);
        let policy = OptionPolicy::random(3, 2, 3, &mut rng);
        let (states, actions) = demo_sequences(&policy, 12, 10);

        let (_, best_logp) = policy.viterbi_path(&states, &actions);
        for _ in 0..50 {
            let candidate: Vec<usize> = (0..12).map(|_| rng.gen_range(0..3)).collect();
            let logp = policy.path_log_prob(&states, &actions, &candidate);
            assert!(best_logp >= logp - 1e-9);
        }
    }

    #[test]
    fn fixed_option_selection_is_argmax() {
        let mut rng = StdRng::seed_from_u64(11);
        let policy = OptionPolicy::random(3, 2, 4, &mut rng);
        let prev = policy.initial_option();

        let c = policy.sample_option(prev, &mut rng, true);
        let log_p = policy.log_trans(prev);
        let argmax = log_p
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap()
            .0;
        assert_eq!(c, argmax);
    }

    #[test]
    fn empty_sequence_decodes_empty() {
        let policy = OptionPolicy::new(3, 2, 2);
        let (path, logp) = policy.viterbi_path(&[], &[]);
        assert!(path.is_empty());
        assert_eq!(logp, 0.0);
    }
}
