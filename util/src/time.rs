//! General time utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::Instant;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Monotonic clock supplying the elapsed time between control ticks.
///
/// The first call to `tick` measures from the moment the clock was created
/// (or last reset), so a clock should be created or reset just before the
/// first cycle.
#[derive(Debug, Clone, Copy)]
pub struct TickClock {
    prev: Instant,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TickClock {
    pub fn new() -> Self {
        Self {
            prev: Instant::now(),
        }
    }

    /// Restart timing from now.
    pub fn reset(&mut self) {
        self.prev = Instant::now();
    }

    /// Get the number of seconds since the previous tick.
    ///
    /// The value can be zero if two ticks land within the clock's resolution,
    /// consumers must treat a non-positive value as an invalid tick.
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();
        let dt = now.duration_since(self.prev).as_secs_f64();
        self.prev = now;
        dt
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}
