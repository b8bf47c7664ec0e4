//! Parameters structure for ApproachCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::PidGains;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for approach control.
///
/// Any parameter missing from the parameter file takes its reference value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    // ---- LATERAL CHANNEL ----
    /// Lateral controller proportional gain
    pub lat_k_p: f64,

    /// Lateral controller integral gain
    pub lat_k_i: f64,

    /// Lateral controller derivative gain
    pub lat_k_d: f64,

    // ---- DISTANCE CHANNEL ----
    /// Distance controller proportional gain
    pub dist_k_p: f64,

    /// Distance controller derivative gain
    pub dist_k_d: f64,

    // ---- PHASES ----
    /// Lateral error magnitude at or below which the controller is aligned
    /// with the target.
    ///
    /// Units: pixels
    pub heading_tolerance_px: f64,

    /// If set, once aligned the controller stays aligned until the lateral
    /// error exceeds `heading_tolerance_px + hysteresis_margin_px`. If not set
    /// the phase is recomputed from the tolerance alone every tick.
    ///
    /// Units: pixels
    pub hysteresis_margin_px: Option<f64>,

    /// Factor applied to the steer demand while aligned. Must have a
    /// magnitude no greater than 1.
    pub aligned_steer_scale: f64,

    /// Drive demand used while the controller cannot close on the target
    /// (seeking, or no detection).
    pub seek_drive_dem: f64,

    // ---- DISTANCE ----
    /// Desired distance between the robot and the target once aligned.
    ///
    /// Units: centimeters
    pub target_standoff_cm: f64,

    // ---- OUTPUT ----
    /// Low pass filter weight on the previous output, in `[0, 1)`. Higher
    /// values smooth more and respond slower.
    pub smoothing_alpha: f64,

    /// Sign applied to the filtered steer demand before it is sent to the
    /// drive. The controller's positive steer is a leftward turn, the drive's
    /// positive steer is rightward, hence the reference value of -1.
    pub steer_sign: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Parameter values which cannot be used by the controller.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParamsError {
    #[error("Parameter `{0}` must be finite")]
    NonFinite(&'static str),

    #[error("Smoothing alpha must be in [0, 1), found {0}")]
    InvalidSmoothingAlpha(f64),

    #[error("Heading tolerance must not be negative, found {0}")]
    NegativeTolerance(f64),

    #[error("Hysteresis margin must not be negative, found {0}")]
    NegativeHysteresisMargin(f64),

    #[error("Target standoff must not be negative, found {0}")]
    NegativeStandoff(f64),

    #[error("Aligned steer scale must have a magnitude of at most 1, found {0}")]
    InvalidAlignedSteerScale(f64),

    #[error("Seek drive demand must be in [-1, 1], found {0}")]
    InvalidSeekDriveDem(f64),

    #[error("Steer sign must be +1 or -1, found {0}")]
    InvalidSteerSign(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            lat_k_p: 1.0,
            lat_k_i: 0.01,
            lat_k_d: 0.1,
            dist_k_p: 1.0,
            dist_k_d: 0.6,
            heading_tolerance_px: 50.0,
            hysteresis_margin_px: None,
            aligned_steer_scale: -0.1,
            seek_drive_dem: -1.0,
            target_standoff_cm: 50.0,
            smoothing_alpha: 0.8,
            steer_sign: -1.0,
        }
    }
}

impl Params {
    /// Gains of the lateral (steer) channel
    pub fn lat_gains(&self) -> PidGains {
        PidGains::new(self.lat_k_p, self.lat_k_i, self.lat_k_d)
    }

    /// Gains of the distance (drive) channel, which has no integral term
    pub fn dist_gains(&self) -> PidGains {
        PidGains::new(self.dist_k_p, 0.0, self.dist_k_d)
    }

    /// Check that the parameters can be used by the controller.
    pub fn validate(&self) -> Result<(), ParamsError> {
        let finite = [
            ("lat_k_p", self.lat_k_p),
            ("lat_k_i", self.lat_k_i),
            ("lat_k_d", self.lat_k_d),
            ("dist_k_p", self.dist_k_p),
            ("dist_k_d", self.dist_k_d),
            ("heading_tolerance_px", self.heading_tolerance_px),
            ("aligned_steer_scale", self.aligned_steer_scale),
            ("seek_drive_dem", self.seek_drive_dem),
            ("target_standoff_cm", self.target_standoff_cm),
            ("smoothing_alpha", self.smoothing_alpha),
            ("steer_sign", self.steer_sign),
        ];
        for &(name, value) in finite.iter() {
            if !value.is_finite() {
                return Err(ParamsError::NonFinite(name));
            }
        }

        if !(0.0..1.0).contains(&self.smoothing_alpha) {
            return Err(ParamsError::InvalidSmoothingAlpha(self.smoothing_alpha));
        }
        if self.heading_tolerance_px < 0.0 {
            return Err(ParamsError::NegativeTolerance(self.heading_tolerance_px));
        }
        if let Some(m) = self.hysteresis_margin_px {
            if !m.is_finite() {
                return Err(ParamsError::NonFinite("hysteresis_margin_px"));
            }
            if m < 0.0 {
                return Err(ParamsError::NegativeHysteresisMargin(m));
            }
        }
        if self.target_standoff_cm < 0.0 {
            return Err(ParamsError::NegativeStandoff(self.target_standoff_cm));
        }
        if self.aligned_steer_scale.abs() > 1.0 {
            return Err(ParamsError::InvalidAlignedSteerScale(
                self.aligned_steer_scale,
            ));
        }
        if self.seek_drive_dem.abs() > 1.0 {
            return Err(ParamsError::InvalidSeekDriveDem(self.seek_drive_dem));
        }
        if self.steer_sign != 1.0 && self.steer_sign != -1.0 {
            return Err(ParamsError::InvalidSteerSign(self.steer_sign));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults_are_reference_values() {
        let p = Params::default();
        assert_eq!(p.validate(), Ok(()));
        assert_eq!(p.lat_gains(), PidGains::new(1.0, 0.01, 0.1));
        assert_eq!(p.dist_gains(), PidGains::new(1.0, 0.0, 0.6));
        assert_eq!(p.heading_tolerance_px, 50.0);
        assert_eq!(p.target_standoff_cm, 50.0);
        assert_eq!(p.smoothing_alpha, 0.8);
        assert_eq!(p.hysteresis_margin_px, None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let p: Params = util::params::load_str(
            "lat_k_p = 0.5\n\
             hysteresis_margin_px = 10.0\n",
        )
        .unwrap();

        assert_eq!(p.lat_k_p, 0.5);
        assert_eq!(p.hysteresis_margin_px, Some(10.0));
        assert_eq!(p.dist_k_d, 0.6);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut p = Params::default();
        p.smoothing_alpha = 1.0;
        assert_eq!(p.validate(), Err(ParamsError::InvalidSmoothingAlpha(1.0)));

        let mut p = Params::default();
        p.steer_sign = 0.5;
        assert_eq!(p.validate(), Err(ParamsError::InvalidSteerSign(0.5)));

        let mut p = Params::default();
        p.lat_k_i = std::f64::NAN;
        assert_eq!(p.validate(), Err(ParamsError::NonFinite("lat_k_i")));

        let mut p = Params::default();
        p.aligned_steer_scale = -1.5;
        assert_eq!(
            p.validate(),
            Err(ParamsError::InvalidAlignedSteerScale(-1.5))
        );

        let mut p = Params::default();
        p.hysteresis_margin_px = Some(-1.0);
        assert_eq!(p.validate(), Err(ParamsError::NegativeHysteresisMargin(-1.0)));
    }
}
