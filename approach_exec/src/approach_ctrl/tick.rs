//! # Approach control tick
//!
//! The controller's per-tick update as a function of an explicit state.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{low_pass, rate_of_change, ApproachCtrlError, Params, Phase};
use comms_if::eqpt::drive::ActuationCommand;
use util::maths::clamp_norm;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Errors describing where the target is relative to the robot.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct ControlSample {
    /// Horizontal offset of the target centroid from the image centre,
    /// positive to the right.
    ///
    /// Units: pixels
    pub lateral_error_px: f64,

    /// Estimated range to the target, zero if there is no reliable reading.
    ///
    /// Units: centimeters
    pub distance_cm: f64,
}

/// State carried by the controller between ticks.
///
/// A fresh (default) state is all zeros in the `Seeking` phase.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct ControllerState {
    /// Lateral error on the previous tick
    pub last_lat_error_px: f64,

    /// Distance error on the previous tick
    pub last_dist_error_cm: f64,

    /// Accumulated lateral error, cleared while aligned
    pub lat_integral: f64,

    /// Filtered steer output, before the actuator sign is applied
    pub filtered_steer: f64,

    /// Filtered drive output
    pub filtered_drive: f64,

    /// Phase of the previous tick
    pub phase: Phase,
}

/// Status report for a single tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct StatusReport {
    /// Phase the controller was in this tick
    pub phase: Phase,

    /// True if the sample contained a detection with a range reading
    pub detection: bool,

    /// Lateral error used this tick
    pub lat_error_px: f64,

    /// Distance error used this tick
    pub dist_error_cm: f64,

    /// Lateral integral after this tick
    pub lat_integral: f64,

    /// Steer demand from the lateral PID, before any phase scaling
    pub raw_steer_pre_scale: f64,

    /// Steer demand after phase scaling, before saturation
    pub raw_steer: f64,

    /// Drive demand before saturation
    pub raw_drive: f64,

    /// True if the steer demand was saturated
    pub steer_limited: bool,

    /// True if the drive demand was saturated
    pub drive_limited: bool,

    /// True if the conservative drive demand was used instead of the
    /// distance controller
    pub conservative_drive: bool,

    /// True if the tick was rejected. The other fields then hold the values
    /// from the last accepted tick.
    pub faulted: bool,
}

/// Everything produced by a successful tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutput {
    pub cmd: ActuationCommand,
    pub report: StatusReport,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ControlSample {
    pub fn new(lateral_error_px: f64, distance_cm: f64) -> Self {
        Self {
            lateral_error_px,
            distance_cm,
        }
    }

    /// A zero distance is the sentinel for "no range reading", so only
    /// samples with a non-zero distance can be closed on.
    pub fn has_range(&self) -> bool {
        self.distance_cm != 0.0
    }

    fn is_finite(&self) -> bool {
        self.lateral_error_px.is_finite() && self.distance_cm.is_finite()
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Run one controller tick.
///
/// `sample` is `None` when nothing was detected this tick, which is treated
/// the same as a zero lateral error and zero distance. `dt` is the time since
/// the previous tick in seconds.
///
/// On error `state` is left exactly as it was and no command is produced.
pub fn tick(
    state: &mut ControllerState,
    params: &Params,
    sample: Option<ControlSample>,
    dt: f64,
) -> Result<TickOutput, ApproachCtrlError> {
    // Reject the tick before touching anything. The negated comparison also
    // catches a NaN dt.
    if !(dt > 0.0) || !dt.is_finite() {
        return Err(ApproachCtrlError::InvalidTick(dt));
    }

    let sample = sample.unwrap_or_default();
    if !sample.is_finite() {
        return Err(ApproachCtrlError::NonFiniteSample(sample));
    }

    let lat_error_px = sample.lateral_error_px;

    // ---- LATERAL CHANNEL ----

    let mut lat_integral = state.lat_integral + lat_error_px * dt;
    let lat_deriv = rate_of_change(lat_error_px, state.last_lat_error_px, dt);
    let raw_steer_pre_scale = params
        .lat_gains()
        .output(lat_error_px, lat_integral, lat_deriv);

    let phase = Phase::next(
        state.phase,
        lat_error_px,
        params.heading_tolerance_px,
        params.hysteresis_margin_px,
    );

    let raw_steer = match phase {
        Phase::Aligned => {
            lat_integral = 0.0;
            raw_steer_pre_scale * params.aligned_steer_scale
        }
        Phase::Seeking => raw_steer_pre_scale,
    };
    let can_close = phase == Phase::Aligned;

    // ---- DISTANCE CHANNEL ----

    let dist_error_cm = sample.distance_cm - params.target_standoff_cm;
    let detection = sample.has_range();
    let conservative_drive = !(detection && can_close);

    let raw_drive = if conservative_drive {
        params.seek_drive_dem
    } else {
        let dist_deriv = rate_of_change(dist_error_cm, state.last_dist_error_cm, dt);
        params.dist_gains().output(dist_error_cm, 0.0, dist_deriv)
    };

    // ---- OUTPUT ----

    let (steer, steer_limited) = clamp_norm(raw_steer);
    let (drive, drive_limited) = clamp_norm(raw_drive);

    let filtered_steer = low_pass(state.filtered_steer, steer, params.smoothing_alpha);
    let filtered_drive = low_pass(state.filtered_drive, drive, params.smoothing_alpha);

    // Saturation maps infinities back into range but not NaNs (e.g. from
    // infinite gains cancelling), so check before committing.
    if !(lat_integral.is_finite() && filtered_steer.is_finite() && filtered_drive.is_finite()) {
        return Err(ApproachCtrlError::NonFiniteState);
    }

    *state = ControllerState {
        last_lat_error_px: lat_error_px,
        last_dist_error_cm: dist_error_cm,
        lat_integral,
        filtered_steer,
        filtered_drive,
        phase,
    };

    let cmd = ActuationCommand {
        drive: filtered_drive,
        steer: params.steer_sign * filtered_steer,
    };

    trace!(
        "ApproachCtrl {:?}: lat_err {:.2} px, dist_err {:.2} cm -> drive {:.3}, steer {:.3}",
        phase,
        lat_error_px,
        dist_error_cm,
        cmd.drive,
        cmd.steer
    );

    Ok(TickOutput {
        cmd,
        report: StatusReport {
            phase,
            detection,
            lat_error_px,
            dist_error_cm,
            lat_integral,
            raw_steer_pre_scale,
            raw_steer,
            raw_drive,
            steer_limited,
            drive_limited,
            conservative_drive,
            faulted: false,
        },
    })
}

#[cfg(test)]
mod test {
    use super::*;

    const EPS: f64 = 1e-9;

    fn ctrl_tick(
        state: &mut ControllerState,
        sample: Option<ControlSample>,
        dt: f64,
    ) -> TickOutput {
        tick(state, &Params::default(), sample, dt).unwrap()
    }

    #[test]
    fn test_seeking_no_detection() {
        // lateral error 100, no range reading, fresh state
        let mut state = ControllerState::default();
        let out = ctrl_tick(&mut state, Some(ControlSample::new(100.0, 0.0)), 0.1);

        assert_eq!(out.report.phase, Phase::Seeking);
        assert!(out.report.conservative_drive);
        assert_eq!(out.report.raw_drive, -1.0);
        assert!((state.lat_integral - 10.0).abs() < EPS);

        // 1*100 + 0.01*10 + 0.1*(100/0.1)
        assert!((out.report.raw_steer_pre_scale - 200.1).abs() < EPS);
        assert!(out.report.steer_limited);

        // Filtered from zero with alpha 0.8
        assert!((state.filtered_steer - 0.2).abs() < EPS);
        assert!((state.filtered_drive + 0.2).abs() < EPS);
        assert!((out.cmd.steer + 0.2).abs() < EPS);
        assert!((out.cmd.drive + 0.2).abs() < EPS);
        assert!(out.cmd.steer != 0.0);
    }

    #[test]
    fn test_aligned_with_range() {
        // lateral error 10, distance 80, fresh state
        let mut state = ControllerState::default();
        let out = ctrl_tick(&mut state, Some(ControlSample::new(10.0, 80.0)), 0.1);

        assert_eq!(out.report.phase, Phase::Aligned);
        assert!(!out.report.conservative_drive);
        assert_eq!(state.lat_integral, 0.0);
        assert!((out.report.dist_error_cm - 30.0).abs() < EPS);

        // PD on distance: 1*30 + 0.6*(30/0.1)
        assert!((out.report.raw_drive - 210.0).abs() < EPS);
        assert!(out.report.drive_limited);

        // Steer scaled down and reversed: (10 + 0.01*1 + 0.1*100) * -0.1
        assert!((out.report.raw_steer_pre_scale - 20.01).abs() < EPS);
        assert!((out.report.raw_steer + 2.001).abs() < EPS);
        assert!((out.cmd.drive - 0.2).abs() < EPS);
        assert!((out.cmd.steer - 0.2).abs() < EPS);
    }

    #[test]
    fn test_seeking_integral_accumulates() {
        let mut state = ControllerState::default();
        let mut prev_integral = 0.0;

        for _ in 0..5 {
            let out = ctrl_tick(&mut state, Some(ControlSample::new(-80.0, 120.0)), 0.05);
            assert_eq!(out.report.phase, Phase::Seeking);
            assert!(out.report.conservative_drive);
            assert_eq!(out.report.raw_drive, -1.0);
            assert!(state.lat_integral < prev_integral);
            prev_integral = state.lat_integral;
        }
        assert!((state.lat_integral + 20.0).abs() < EPS);
    }

    #[test]
    fn test_aligned_resets_integral_and_scales_steer() {
        let mut state = ControllerState::default();

        // Wind up the integral while seeking
        for _ in 0..10 {
            ctrl_tick(&mut state, Some(ControlSample::new(200.0, 90.0)), 0.1);
        }
        assert!(state.lat_integral > 0.0);

        for &e in [50.0, 20.0, -35.0, 0.0, -50.0].iter() {
            let out = ctrl_tick(&mut state, Some(ControlSample::new(e, 90.0)), 0.1);
            assert_eq!(out.report.phase, Phase::Aligned);
            assert_eq!(state.lat_integral, 0.0);
            assert!(
                out.report.raw_steer.abs() <= 0.1 * out.report.raw_steer_pre_scale.abs() + EPS
            );
        }
    }

    #[test]
    fn test_identical_inputs_filter() {
        let params = Params::default();
        let mut state = ControllerState::default();
        let sample = Some(ControlSample::new(30.0, 70.0));

        let first = tick(&mut state, &params, sample, 0.1).unwrap();
        let second = tick(&mut state, &params, sample, 0.1).unwrap();

        let (raw_steer, _) = clamp_norm(second.report.raw_steer);
        let (raw_drive, _) = clamp_norm(second.report.raw_drive);

        let alpha = params.smoothing_alpha;
        assert!((second.cmd.drive - (alpha * first.cmd.drive + (1.0 - alpha) * raw_drive)).abs() < EPS);
        assert!(
            (state.filtered_steer
                - (alpha * params.steer_sign * first.cmd.steer + (1.0 - alpha) * raw_steer))
                .abs()
                < EPS
        );
    }

    #[test]
    fn test_invalid_tick_leaves_state_untouched() {
        let mut state = ControllerState::default();
        ctrl_tick(&mut state, Some(ControlSample::new(70.0, 100.0)), 0.1);
        ctrl_tick(&mut state, Some(ControlSample::new(20.0, 100.0)), 0.1);
        let before = state;

        for &dt in [0.0, -0.1, std::f64::NAN, std::f64::INFINITY].iter() {
            let r = tick(&mut state, &Params::default(), Some(ControlSample::new(5.0, 60.0)), dt);
            assert!(matches!(r, Err(ApproachCtrlError::InvalidTick(_))));
            assert_eq!(state, before);
        }

        let r = tick(
            &mut state,
            &Params::default(),
            Some(ControlSample::new(std::f64::NAN, 60.0)),
            0.1,
        );
        assert!(matches!(r, Err(ApproachCtrlError::NonFiniteSample(_))));
        assert_eq!(state, before);
    }

    #[test]
    fn test_no_detection_run() {
        let mut state = ControllerState::default();
        let mut prev_drive = 0.0;

        for _ in 0..10 {
            let out = ctrl_tick(&mut state, None, 0.1);
            assert!(out.report.conservative_drive);
            assert!(!out.report.detection);
            assert!(out.cmd.is_normalised());
            assert!(out.cmd.drive < prev_drive);
            prev_drive = out.cmd.drive;
        }
        assert_eq!(state.lat_integral, 0.0);
        assert_eq!(state.filtered_steer, 0.0);
    }

    #[test]
    fn test_outputs_always_normalised() {
        let mut state = ControllerState::default();

        for i in 0..200 {
            let e = ((i * 37) % 640) as f64 - 320.0;
            let d = ((i * 13) % 300) as f64;
            let out = ctrl_tick(&mut state, Some(ControlSample::new(e, d)), 0.02);
            assert!(out.cmd.is_normalised());
        }
    }

    #[test]
    fn test_hysteresis_holds_aligned() {
        let mut params = Params::default();
        params.hysteresis_margin_px = Some(20.0);
        let mut state = ControllerState::default();

        let out = tick(&mut state, &params, Some(ControlSample::new(40.0, 100.0)), 0.1).unwrap();
        assert_eq!(out.report.phase, Phase::Aligned);

        // Between tolerance and tolerance + margin: stays aligned
        let out = tick(&mut state, &params, Some(ControlSample::new(65.0, 100.0)), 0.1).unwrap();
        assert_eq!(out.report.phase, Phase::Aligned);
        assert!(!out.report.conservative_drive);

        let out = tick(&mut state, &params, Some(ControlSample::new(75.0, 100.0)), 0.1).unwrap();
        assert_eq!(out.report.phase, Phase::Seeking);

        // Back under tolerance + margin, but now seeking so stays seeking
        let out = tick(&mut state, &params, Some(ControlSample::new(65.0, 100.0)), 0.1).unwrap();
        assert_eq!(out.report.phase, Phase::Seeking);
    }

    #[test]
    fn test_steer_sign() {
        let mut params = Params::default();
        params.steer_sign = 1.0;
        let mut state = ControllerState::default();

        let out = tick(&mut state, &params, Some(ControlSample::new(100.0, 0.0)), 0.1).unwrap();
        assert!((out.cmd.steer - 0.2).abs() < EPS);
    }

    #[test]
    fn test_overflowing_integral_rejected() {
        let mut state = ControllerState::default();
        ctrl_tick(&mut state, Some(ControlSample::new(100.0, 0.0)), 0.1);
        let before = state;

        // Finite inputs whose integral overflows to infinity
        let r = tick(
            &mut state,
            &Params::default(),
            Some(ControlSample::new(f64::MAX, 0.0)),
            2.0,
        );
        assert!(matches!(r, Err(ApproachCtrlError::NonFiniteState)));
        assert_eq!(state, before);
    }
}
