//! Colour classification in HSV space

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An inclusive range of HSV colours.
///
/// Hue is in `[0, 180)` (half degrees), saturation and value in `[0, 255]`.
/// If `min[0] > max[0]` the hue range wraps through zero, which is how red
/// targets are described.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColourRange {
    pub min: [u8; 3],
    pub max: [u8; 3],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ColourRange {
    pub fn new(min: [u8; 3], max: [u8; 3]) -> Self {
        Self { min, max }
    }

    /// True if the HSV colour lies in the range.
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        let [h, s, v] = hsv;

        let hue_ok = if self.min[0] <= self.max[0] {
            h >= self.min[0] && h <= self.max[0]
        } else {
            h >= self.min[0] || h <= self.max[0]
        };

        hue_ok
            && s >= self.min[1]
            && s <= self.max[1]
            && v >= self.min[2]
            && v <= self.max[2]
    }

    /// True if the range can match anything, i.e. the saturation and value
    /// bounds are ordered and the hue bounds are valid.
    pub fn is_valid(&self) -> bool {
        self.min[0] < 180 && self.max[0] < 180 && self.min[1] <= self.max[1] && self.min[2] <= self.max[2]
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert an 8 bit RGB colour into 8 bit HSV.
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let r = rgb[0] as f64;
    let g = rgb[1] as f64;
    let b = rgb[2] as f64;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max > 0.0 { 255.0 * delta / max } else { 0.0 };

    let mut h_deg = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if h_deg < 0.0 {
        h_deg += 360.0;
    }

    let h = (h_deg / 2.0).round() as u16 % 180;

    [h as u8, s.round() as u8, max as u8]
}
