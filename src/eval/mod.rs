//! Evaluation utilities: demonstration log-likelihood and reward statistics.

pub mod stats;
pub mod validate;

pub use stats::{reward_validate, RewardStats};
pub use validate::{validate, Demonstration};
