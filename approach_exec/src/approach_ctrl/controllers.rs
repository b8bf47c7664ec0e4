//! # Approach controllers
//!
//! Building blocks of the two control channels: PID gains, the derivative
//! on error, the output low pass filter and the phase decision.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gains of a single PID channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PidGains {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Dervative gain
    pub k_d: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Phase of the approach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Not yet pointed at the target, turning only
    Seeking,

    /// Heading error within tolerance, closing the distance
    Aligned,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidGains {
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self { k_p, k_i, k_d }
    }

    /// Combine the error terms into the controller output.
    pub fn output(&self, error: f64, integral: f64, deriv: f64) -> f64 {
        self.k_p * error + self.k_i * integral + self.k_d * deriv
    }
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Seeking
    }
}

impl Phase {
    /// Determine the phase for this tick.
    ///
    /// Without a hysteresis margin this only depends on the lateral error. With
    /// a margin, a controller which was aligned on the previous tick stays
    /// aligned until the error exceeds `tolerance + margin`.
    pub fn next(
        prev: Phase,
        lat_error_px: f64,
        tolerance_px: f64,
        hysteresis_margin_px: Option<f64>,
    ) -> Phase {
        let limit = match (prev, hysteresis_margin_px) {
            (Phase::Aligned, Some(m)) => tolerance_px + m,
            _ => tolerance_px,
        };

        if lat_error_px.abs() <= limit {
            Phase::Aligned
        } else {
            Phase::Seeking
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Rate of change of an error between two ticks.
///
/// `dt` must be positive, callers check this before any state is touched.
pub fn rate_of_change(error: f64, prev_error: f64, dt: f64) -> f64 {
    (error - prev_error) / dt
}

/// Exponential low pass filter.
///
/// `alpha` is the weight kept on the previous filtered value, so the output
/// moves `1 - alpha` of the way from `prev` towards `raw`.
pub fn low_pass(prev: f64, raw: f64, alpha: f64) -> f64 {
    prev * alpha + raw * (1.0 - alpha)
}
