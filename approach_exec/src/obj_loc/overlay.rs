//! Debug overlay of a detected region

use image::{Rgb, RgbImage};

use super::Region;

/// Colour the region is painted in
const REGION_COLOUR: Rgb<u8> = Rgb([0, 255, 0]);

/// Colour of the centroid marker
const CENTROID_COLOUR: Rgb<u8> = Rgb([255, 255, 255]);

/// Half length of the centroid marker arms
const CENTROID_MARKER_HALF_LEN_PX: i64 = 5;

/// Draw the region and its centroid onto a copy of `image`.
pub fn draw_region(image: &RgbImage, region: &Region) -> RgbImage {
    let mut out = image.clone();
    let (w, h) = out.dimensions();

    for &(x, y) in region.pixels.iter() {
        if x < w && y < h {
            out.put_pixel(x, y, REGION_COLOUR);
        }
    }

    let (cx, cy) = region.centroid_pixel();
    for d in -CENTROID_MARKER_HALF_LEN_PX..=CENTROID_MARKER_HALF_LEN_PX {
        for &(x, y) in [(cx as i64 + d, cy as i64), (cx as i64, cy as i64 + d)].iter() {
            if x >= 0 && y >= 0 && (x as u32) < w && (y as u32) < h {
                out.put_pixel(x as u32, y as u32, CENTROID_COLOUR);
            }
        }
    }

    out
}
