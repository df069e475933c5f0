//! Policy containers: flat Gaussian, hierarchical option policy, and the
//! running state filter restored alongside them from checkpoints.
//!
//! [`PolicyKind`] is the sum type the rest of the crate works with. The two
//! variants expose their distinguishing capability directly -- Viterbi
//! decoding for the hierarchical variant, plain action log-probability for
//! the flat one -- so callers match on the variant instead of inspecting
//! types at runtime.

pub mod filter;
pub mod flat;
pub mod option;

pub use filter::StateFilter;
pub use flat::GaussianPolicy;
pub use option::OptionPolicy;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::config::Config;

/// A policy that is either flat or hierarchical.
///
/// This is also the checkpointed parameter state: both variants serialise
/// with all their parameters under a `kind` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PolicyKind {
    Flat(GaussianPolicy),
    Option(OptionPolicy),
}

impl PolicyKind {
    /// Build an empty policy container sized to the environment, with the
    /// variant chosen by the config's `use_option` flag. Checkpoint loading
    /// replaces the parameters afterwards.
    pub fn from_config(config: &Config, dim_s: usize, dim_a: usize) -> Self {
        if config.use_option {
            PolicyKind::Option(OptionPolicy::new(dim_s, dim_a, config.dim_c))
        } else {
            PolicyKind::Flat(GaussianPolicy::new(dim_s, dim_a))
        }
    }

    /// Whether this policy carries a latent option dimension.
    pub fn is_hierarchical(&self) -> bool {
        matches!(self, PolicyKind::Option(_))
    }

    /// `(dim_s, dim_a)` of the policy parameters.
    pub fn dims(&self) -> (usize, usize) {
        match self {
            PolicyKind::Flat(p) => (p.dim_s, p.dim_a),
            PolicyKind::Option(p) => (p.dim_s, p.dim_a),
        }
    }

    /// Option count: `dim_c` for hierarchical policies, 1 for flat ones
    /// (the single implicit mode recorded as option 0).
    pub fn dim_c(&self) -> usize {
        match self {
            PolicyKind::Flat(_) => 1,
            PolicyKind::Option(p) => p.dim_c,
        }
    }

    /// The "previous option" value to use at the start of an episode.
    pub fn initial_option(&self) -> usize {
        match self {
            PolicyKind::Flat(_) => 0,
            PolicyKind::Option(p) => p.initial_option(),
        }
    }

    /// One policy step: choose an option (always 0 for flat policies) and an
    /// action for the given filtered state.
    pub fn act(
        &self,
        state: &[f64],
        prev_option: usize,
        rng: &mut StdRng,
        fixed: bool,
    ) -> (usize, Vec<f64>) {
        match self {
            PolicyKind::Flat(p) => (0, p.act(state, rng, fixed)),
            PolicyKind::Option(p) => {
                let c = p.sample_option(prev_option, rng, fixed);
                (c, p.act(state, c, rng, fixed))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn config_selects_variant() {
        let mut config = Config::default();
        config.use_option = true;
        config.dim_c = 5;
        let policy = PolicyKind::from_config(&config, 6, 2);
        assert!(policy.is_hierarchical());
        assert_eq!(policy.dim_c(), 5);
        assert_eq!(policy.dims(), (6, 2));

        config.use_option = false;
        let policy = PolicyKind::from_config(&config, 6, 2);
        assert!(!policy.is_hierarchical());
        assert_eq!(policy.dim_c(), 1);
    }

    #[test]
    fn flat_act_always_reports_option_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        let policy = PolicyKind::Flat(GaussianPolicy::random(3, 2, &mut rng));
        let (c, action) = policy.act(&[0.1, 0.2, 0.3], policy.initial_option(), &mut rng, false);
        assert_eq!(c, 0);
        assert_eq!(action.len(), 2);
    }

    #[test]
    fn kind_tag_roundtrips_through_json() {
        let mut rng = StdRng::seed_from_u64(2);
        let policy = PolicyKind::Option(OptionPolicy::random(3, 2, 4, &mut rng));
        let json = serde_json::to_string(&policy).unwrap();
        assert!(json.contains("\"kind\":\"option\""));
        let restored: PolicyKind = serde_json::from_str(&json).unwrap();
        assert!(restored.is_hierarchical());
        assert_eq!(restored.dims(), (3, 2));
    }
}
