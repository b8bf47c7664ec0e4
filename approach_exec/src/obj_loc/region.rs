//! Connected region detection

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use image::RgbImage;
use std::collections::VecDeque;

// Internal
use super::{rgb_to_hsv, ColourRange};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A connected set of pixels matching a colour range.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Pixels of the region as (x, y), in the order they were discovered.
    /// The first pixel is the first one in row-major order.
    pub pixels: Vec<(u32, u32)>,

    /// Mean position of the pixels.
    ///
    /// Units: pixels
    pub centroid_px: (f64, f64),
}

/// Region detection by thresholding each pixel in HSV space and labelling
/// 8-connected components.
#[derive(Debug, Default, Clone, Copy)]
pub struct HsvRegionDetector;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A vision capability which finds the largest region of a colour.
pub trait RegionDetector {
    /// Find the region with the largest area which matches `range` and has at
    /// least `min_area_px` pixels.
    ///
    /// If several regions share the largest area the one whose first pixel
    /// comes first in row-major order is returned.
    fn largest_region(
        &self,
        image: &RgbImage,
        range: &ColourRange,
        min_area_px: usize,
    ) -> Option<Region>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Region {
    fn from_pixels(pixels: Vec<(u32, u32)>) -> Self {
        let n = pixels.len() as f64;
        let (sum_x, sum_y) = pixels
            .iter()
            .fold((0.0, 0.0), |(sx, sy), &(x, y)| (sx + x as f64, sy + y as f64));

        Self {
            centroid_px: (sum_x / n, sum_y / n),
            pixels,
        }
    }

    /// Number of pixels in the region
    pub fn area_px(&self) -> usize {
        self.pixels.len()
    }

    /// The pixel containing the centroid.
    pub fn centroid_pixel(&self) -> (u32, u32) {
        (
            self.centroid_px.0.round() as u32,
            self.centroid_px.1.round() as u32,
        )
    }
}

impl RegionDetector for HsvRegionDetector {
    fn largest_region(
        &self,
        image: &RgbImage,
        range: &ColourRange,
        min_area_px: usize,
    ) -> Option<Region> {
        let (width, height) = image.dimensions();
        let (w, h) = (width as i64, height as i64);

        let mask: Vec<bool> = image
            .pixels()
            .map(|p| range.contains(rgb_to_hsv(p.0)))
            .collect();
        let mut visited = vec![false; mask.len()];

        let mut best: Option<Region> = None;
        let mut queue = VecDeque::new();

        for start in 0..mask.len() {
            if !mask[start] || visited[start] {
                continue;
            }

            visited[start] = true;
            queue.push_back(start);
            let mut pixels = Vec::new();

            while let Some(idx) = queue.pop_front() {
                let x = idx as i64 % w;
                let y = idx as i64 / w;
                pixels.push((x as u32, y as u32));

                for dy in -1..=1 {
                    for dx in -1..=1 {
                        let (nx, ny) = (x + dx, y + dy);
                        if (dx == 0 && dy == 0) || nx < 0 || ny < 0 || nx >= w || ny >= h {
                            continue;
                        }

                        let n = (ny * w + nx) as usize;
                        if mask[n] && !visited[n] {
                            visited[n] = true;
                            queue.push_back(n);
                        }
                    }
                }
            }

            // Strictly larger only, so the earliest region wins a tie
            let larger = match best {
                Some(ref b) => pixels.len() > b.area_px(),
                None => true,
            };
            if pixels.len() >= min_area_px && larger {
                best = Some(Region::from_pixels(pixels));
            }
        }

        best
    }
}
