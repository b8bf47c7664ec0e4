//! # Approach library.
//!
//! This library allows other crates in the workspace, and the benchmarks, to access items defined
//! inside the approach crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Approach control - drives the robot towards the located target and holds it at a standoff
pub mod approach_ctrl;

/// Global data store for the executable
pub mod data_store;

/// Object location - finds the target in camera frames and estimates its range
pub mod obj_loc;

/// Parameters for the executable
pub mod params;

/// Simulation - a kinematic robot and target providing frames and accepting drive commands
pub mod sim;
