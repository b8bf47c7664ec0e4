//! # Depth Camera Equipment Communications Module

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use image::{ImageBuffer, Luma};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Represents a concrete image of depth in mm.
#[derive(Debug, Clone)]
pub struct DepthImage {
    /// UTC timestamp at which the frame was acquired
    pub timestamp: DateTime<Utc>,

    /// The 16 bit greyscale image which describes z depth from the camera's optical centre, in
    /// millimeters. A value of zero means there is no reading for that pixel.
    pub image: ImageBuffer<Luma<u16>, Vec<u16>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DepthImage {
    /// Get the raw depth value at the given pixel, or `None` if the pixel is outside the image or
    /// has no reading.
    pub fn get_mm(&self, x: u32, y: u32) -> Option<u16> {
        let (w, h) = self.image.dimensions();
        if x >= w || y >= h {
            return None;
        }

        match self.image.get_pixel(x, y).0[0] {
            0 => None,
            d => Some(d),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_mm() {
        let mut image = ImageBuffer::new(4, 3);
        image.put_pixel(2, 1, Luma([1200u16]));
        let depth = DepthImage {
            timestamp: Utc::now(),
            image,
        };

        assert_eq!(depth.get_mm(2, 1), Some(1200));
        assert_eq!(depth.get_mm(0, 0), None);
        assert_eq!(depth.get_mm(4, 0), None);
    }
}
