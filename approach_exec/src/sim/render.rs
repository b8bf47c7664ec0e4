//! Sensor rendering for the simulated scene

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use image::{ImageBuffer, Luma, Rgb, RgbImage};

// Internal
use super::SimParams;
use util::maths::wrap_pi;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The target as seen from the robot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetView {
    /// Offset of the target's centre to the right of the robot
    ///
    /// Units: centimeters
    pub right_cm: f64,

    /// Offset of the target's centre ahead of the robot
    ///
    /// Units: centimeters
    pub forward_cm: f64,

    /// Distance from the robot to the target's surface
    ///
    /// Units: centimeters
    pub surface_cm: f64,

    /// Units: centimeters
    pub radius_cm: f64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Focal length of a pinhole camera with the given width and horizontal
/// field of view.
pub fn focal_length_px(width_px: u32, hfov_deg: f64) -> f64 {
    (width_px as f64 / 2.0) / (hfov_deg.to_radians() / 2.0).tan()
}

/// Pixels covered by the target, which is drawn as a disc on the horizon.
///
/// Nothing is visible if the target's surface is not in front of the camera.
pub fn target_pixels(params: &SimParams, view: &TargetView) -> Vec<(u32, u32)> {
    let z = view.forward_cm;
    if z <= view.radius_cm {
        return Vec::new();
    }

    let f = focal_length_px(params.image_width_px, params.hfov_deg);
    let u = params.image_width_px as f64 / 2.0 + f * view.right_cm / z;
    let v = params.image_height_px as f64 / 2.0;
    let r = f * view.radius_cm / z;

    let x_min = (u - r).floor().max(0.0) as u32;
    let x_max = ((u + r).ceil().max(0.0) as u32).min(params.image_width_px);
    let y_min = (v - r).floor().max(0.0) as u32;
    let y_max = ((v + r).ceil().max(0.0) as u32).min(params.image_height_px);

    let mut pixels = Vec::new();
    for y in y_min..y_max {
        for x in x_min..x_max {
            // Sample at pixel centres
            let dx = x as f64 + 0.5 - u;
            let dy = y as f64 + 0.5 - v;
            if dx * dx + dy * dy <= r * r {
                pixels.push((x, y));
            }
        }
    }

    pixels
}

/// Render the colour image.
pub fn render_cam(params: &SimParams, pixels: &[(u32, u32)]) -> RgbImage {
    let mut image = RgbImage::from_pixel(
        params.image_width_px,
        params.image_height_px,
        Rgb(params.background_colour),
    );

    for &(x, y) in pixels {
        image.put_pixel(x, y, Rgb(params.target_colour));
    }

    image
}

/// Render the depth image in millimeters. The background has no reading.
pub fn render_depth(
    params: &SimParams,
    pixels: &[(u32, u32)],
    range_cm: f64,
) -> ImageBuffer<Luma<u16>, Vec<u16>> {
    let mut image = ImageBuffer::new(params.image_width_px, params.image_height_px);

    let mm = (range_cm * 10.0).round().max(0.0).min(u16::MAX as f64) as u16;
    for &(x, y) in pixels {
        image.put_pixel(x, y, Luma([mm]));
    }

    image
}

/// Render a lidar scan.
///
/// Sample 0 points forward and the sample angle increases counter-clockwise,
/// samples without a return are zero.
pub fn render_lidar(params: &SimParams, view: &TargetView, range_cm: f64) -> Vec<f64> {
    let n = params.lidar_num_samples;
    let mut samples = vec![0.0; n];

    let centre_dist = (view.right_cm.powi(2) + view.forward_cm.powi(2)).sqrt();
    if centre_dist <= view.radius_cm {
        return samples;
    }

    // Angle to the target counter-clockwise from forward
    let target_angle = (-view.right_cm).atan2(view.forward_cm);
    let half_width = (view.radius_cm / centre_dist).asin();
    let spacing = std::f64::consts::TAU / n as f64;

    for (i, s) in samples.iter_mut().enumerate() {
        if wrap_pi(i as f64 * spacing - target_angle).abs() <= half_width {
            *s = range_cm;
        }
    }

    samples
}

#[cfg(test)]
mod test {
    use super::*;

    fn ahead(forward_cm: f64, right_cm: f64) -> TargetView {
        TargetView {
            right_cm,
            forward_cm,
            surface_cm: (right_cm.powi(2) + forward_cm.powi(2)).sqrt() - 10.0,
            radius_cm: 10.0,
        }
    }

    #[test]
    fn test_focal_length() {
        let f = focal_length_px(640, 90.0);
        assert!((f - 320.0).abs() < 1e-9);
    }

    #[test]
    fn test_disc_symmetric_about_centre() {
        let params = SimParams::default();
        let pixels = target_pixels(&params, &ahead(150.0, 0.0));
        assert!(pixels.len() > 30);

        let mean_x = pixels.iter().map(|p| p.0 as f64).sum::<f64>() / pixels.len() as f64;
        assert!((mean_x - 319.5).abs() < 1e-9);
    }

    #[test]
    fn test_target_behind_not_visible() {
        let params = SimParams::default();
        assert!(target_pixels(&params, &ahead(-100.0, 0.0)).is_empty());
    }

    #[test]
    fn test_lidar_right_target_at_end_of_scan() {
        let params = SimParams::default();
        let samples = render_lidar(&params, &ahead(100.0, 30.0), 94.4);

        let hits: Vec<usize> = samples
            .iter()
            .enumerate()
            .filter(|(_, s)| **s > 0.0)
            .map(|(i, _)| i)
            .collect();

        assert!(!hits.is_empty());
        assert!(hits.iter().all(|&i| i > 600));
    }
}
