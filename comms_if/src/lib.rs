//! # Communications interface crate.
//!
//! Provides the interfaces between the target approach software and the
//! equipment it consumes data from or sends demands to.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Data and demand definitions for equipment (cameras, range sensors, drive)
pub mod eqpt;
