//! optgail: evaluation and replay utilities for option-based imitation
//! learning.
//!
//! Provides trajectory collection, demonstration log-likelihood validation
//! with Viterbi option decoding, reward statistics, experiment bookkeeping
//! (seeding, directory layout, LR schedules), and a checkpoint replay driver.

pub mod bookkeeping;
pub mod checkpoint;
pub mod config;
pub mod env;
pub mod eval;
pub mod policy;
pub mod render;
pub mod trajectory;
