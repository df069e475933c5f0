//! Trajectory data types and episode collection.

pub mod collector;
pub mod types;

pub use collector::{CollectSpec, TrajectoryCollector};
pub use types::{Step, Trajectory};
