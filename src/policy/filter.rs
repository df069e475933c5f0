//! Running state normalisation.
//!
//! The [`StateFilter`] tracks a running mean and variance of raw observations
//! (Welford's algorithm) and normalises states before they reach the policy.
//! Its statistics are part of every checkpoint: a policy evaluated without
//! its filter restored sees differently-scaled inputs and produces garbage.

use serde::{Deserialize, Serialize};

const STD_FLOOR: f64 = 1e-8;

/// A running mean/variance normalisation transform over observation vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFilter {
    /// When disabled the filter passes states through untouched (but still
    /// carries its persisted statistics).
    pub enable: bool,
    count: u64,
    mean: Vec<f64>,
    /// Sum of squared deviations from the running mean (Welford's M2).
    m2: Vec<f64>,
}

impl StateFilter {
    /// Create an empty filter. Statistics are sized on the first observation.
    pub fn new(enable: bool) -> Self {
        Self {
            enable,
            count: 0,
            mean: Vec::new(),
            m2: Vec::new(),
        }
    }

    /// Number of observations folded into the statistics so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Fold an observation into the running statistics, then normalise it.
    ///
    /// Used during exploratory collection, where the filter keeps adapting.
    pub fn update_and_normalize(&mut self, state: &[f64]) -> Vec<f64> {
        if !self.enable {
            return state.to_vec();
        }
        if self.mean.is_empty() {
            self.mean = vec![0.0; state.len()];
            self.m2 = vec![0.0; state.len()];
        }
        self.count += 1;
        for i in 0..state.len() {
            let delta = state[i] - self.mean[i];
            self.mean[i] += delta / self.count as f64;
            let delta2 = state[i] - self.mean[i];
            self.m2[i] += delta * delta2;
        }
        self.normalize(state)
    }

    /// Normalise an observation with the current (frozen) statistics.
    ///
    /// Used during deterministic replay, where the persisted statistics must
    /// not drift.
    pub fn normalize(&self, state: &[f64]) -> Vec<f64> {
        if !self.enable || self.count < 2 || self.mean.is_empty() {
            return state.to_vec();
        }
        let n = (self.count - 1) as f64;
        state
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                let std = (self.m2[i] / n).sqrt().max(STD_FLOOR);
                (x - self.mean[i]) / std
            })
            .collect()
    }

    /// Replace this filter's statistics with a persisted snapshot.
    pub fn load_state(&mut self, state: StateFilter) {
        *self = state;
    }
}
