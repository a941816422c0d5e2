//! State module for tracking harvest progress
//!
//! # Components
//!
//! - `HarvestPhase`: the phase of a run (seed resolution, discovery, hydration, done, fatal)

mod harvest_phase;

pub use harvest_phase::HarvestPhase;
