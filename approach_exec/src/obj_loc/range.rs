//! Range estimation to a detected region

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use serde::Serialize;

// Internal
use super::Params;
use comms_if::eqpt::{depth::DepthImage, lidar::LidarScan};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A range estimate and where it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeEstimate {
    /// Units: centimeters, zero if there is no reliable reading
    pub distance_cm: f64,

    pub source: RangeSource,

    /// True if the lidar index had to be clamped into the scan
    pub lidar_index_clamped: bool,
}

/// Lidar sample index for a lateral error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LidarIndex {
    pub index: usize,

    /// True if the computed index fell outside the scan
    pub clamped: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Source of a range estimate, in order of preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RangeSource {
    Depth,
    Lidar,
    Fixed,
    None,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for RangeSource {
    fn default() -> Self {
        RangeSource::None
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Index of the lidar sample looking towards a lateral pixel error.
///
/// Sample 0 points forward and targets to the right of centre are found at
/// the end of the scan. Returns `None` for an empty scan.
pub fn lidar_sample_index(
    lateral_error_px: f64,
    px_to_sample_scale: f64,
    num_samples: usize,
) -> Option<LidarIndex> {
    if num_samples == 0 {
        return None;
    }

    let last = num_samples as i64 - 1;
    let offset = (lateral_error_px * px_to_sample_scale).round().abs() as i64;

    let raw = if lateral_error_px > 0.0 {
        last - offset
    } else if lateral_error_px < 0.0 {
        offset
    } else {
        0
    };

    let clamped = raw < 0 || raw > last;

    Some(LidarIndex {
        index: raw.max(0).min(last) as usize,
        clamped,
    })
}

/// Estimate the range to a region.
///
/// Sources are tried in order: the depth image at the centroid, the lidar
/// sample towards the lateral error, then the fixed fallback. A source
/// giving a value that is not finite and positive is skipped.
pub fn estimate_range(
    params: &Params,
    centroid_pixel: (u32, u32),
    lateral_error_px: f64,
    depth: Option<&DepthImage>,
    lidar: Option<&LidarScan>,
) -> RangeEstimate {
    let usable = |d: f64| d.is_finite() && d > 0.0;
    let mut lidar_index_clamped = false;

    if let Some(mm) = depth.and_then(|d| d.get_mm(centroid_pixel.0, centroid_pixel.1)) {
        let distance_cm = mm as f64 * params.depth_scale_cm_per_unit;
        if usable(distance_cm) {
            return RangeEstimate {
                distance_cm,
                source: RangeSource::Depth,
                lidar_index_clamped,
            };
        }
    }

    if let Some(scan) = lidar {
        if let Some(idx) = lidar_sample_index(
            lateral_error_px,
            params.lidar_px_to_sample_scale,
            scan.samples_cm.len(),
        ) {
            if idx.clamped {
                warn!(
                    "Lidar index for lateral error {:.1} px is outside the scan, clamped to {}",
                    lateral_error_px, idx.index
                );
            }
            lidar_index_clamped = idx.clamped;

            let distance_cm = scan.samples_cm[idx.index];
            if usable(distance_cm) {
                return RangeEstimate {
                    distance_cm,
                    source: RangeSource::Lidar,
                    lidar_index_clamped,
                };
            }
        }
    }

    match params.fixed_distance_fallback_cm {
        Some(d) if usable(d) => RangeEstimate {
            distance_cm: d,
            source: RangeSource::Fixed,
            lidar_index_clamped,
        },
        _ => RangeEstimate {
            distance_cm: 0.0,
            source: RangeSource::None,
            lidar_index_clamped,
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Utc;
    use image::{ImageBuffer, Luma};

    fn scan(samples_cm: Vec<f64>) -> LidarScan {
        LidarScan {
            timestamp: Utc::now(),
            samples_cm,
        }
    }

    fn depth_with(x: u32, y: u32, mm: u16) -> DepthImage {
        let mut image = ImageBuffer::new(640, 480);
        image.put_pixel(x, y, Luma([mm]));
        DepthImage {
            timestamp: Utc::now(),
            image,
        }
    }

    #[test]
    fn test_lidar_index_mapping() {
        let i = |e| lidar_sample_index(e, 0.34, 720).unwrap();

        assert_eq!(i(0.0), LidarIndex { index: 0, clamped: false });
        assert_eq!(i(-100.0), LidarIndex { index: 34, clamped: false });
        assert_eq!(i(100.0), LidarIndex { index: 685, clamped: false });
        assert_eq!(i(1.0), LidarIndex { index: 719, clamped: false });

        // 0.17 samples per pixel sensor
        assert_eq!(lidar_sample_index(320.0, 0.17, 720).unwrap().index, 665);
    }

    #[test]
    fn test_lidar_index_clamped() {
        let i = lidar_sample_index(-5000.0, 1.0, 720).unwrap();
        assert_eq!(i, LidarIndex { index: 719, clamped: true });

        let i = lidar_sample_index(5000.0, 1.0, 720).unwrap();
        assert_eq!(i, LidarIndex { index: 0, clamped: true });

        assert_eq!(lidar_sample_index(10.0, 1.0, 0), None);
    }

    #[test]
    fn test_depth_preferred() {
        let params = Params::default();
        let depth = depth_with(330, 200, 1200);
        let lidar = scan(vec![75.0; 720]);

        let r = estimate_range(&params, (330, 200), 10.0, Some(&depth), Some(&lidar));
        assert_eq!(r.source, RangeSource::Depth);
        assert!((r.distance_cm - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_fall_through_order() {
        let mut params = Params::default();
        params.fixed_distance_fallback_cm = Some(100.0);

        // No depth reading at the centroid, lidar used
        let depth = depth_with(0, 0, 1200);
        let lidar = scan(vec![75.0; 720]);
        let r = estimate_range(&params, (330, 200), 10.0, Some(&depth), Some(&lidar));
        assert_eq!(r.source, RangeSource::Lidar);
        assert_eq!(r.distance_cm, 75.0);

        // Lidar with no return, fallback used
        let lidar = scan(vec![0.0; 720]);
        let r = estimate_range(&params, (330, 200), 10.0, None, Some(&lidar));
        assert_eq!(r.source, RangeSource::Fixed);
        assert_eq!(r.distance_cm, 100.0);

        // Nothing at all
        params.fixed_distance_fallback_cm = None;
        let r = estimate_range(&params, (330, 200), 10.0, None, None);
        assert_eq!(r.source, RangeSource::None);
        assert_eq!(r.distance_cm, 0.0);
    }

    #[test]
    fn test_non_finite_lidar_skipped() {
        let params = Params::default();
        let mut samples = vec![80.0; 720];
        samples[0] = std::f64::NAN;

        let r = estimate_range(&params, (320, 240), 0.0, None, Some(&scan(samples)));
        assert_eq!(r.source, RangeSource::None);
        assert_eq!(r.distance_cm, 0.0);
    }

    #[test]
    fn test_negative_readings_skipped() {
        let mut params = Params::default();
        params.depth_scale_cm_per_unit = -0.1;
        params.fixed_distance_fallback_cm = Some(100.0);

        let depth = depth_with(320, 240, 900);
        let lidar = scan(vec![-30.0; 720]);
        let r = estimate_range(&params, (320, 240), 0.0, Some(&depth), Some(&lidar));
        assert_eq!(r.source, RangeSource::Fixed);
        assert_eq!(r.distance_cm, 100.0);

        params.fixed_distance_fallback_cm = Some(-5.0);
        let r = estimate_range(&params, (320, 240), 0.0, None, Some(&lidar));
        assert_eq!(r.source, RangeSource::None);
        assert_eq!(r.distance_cm, 0.0);
    }
}
