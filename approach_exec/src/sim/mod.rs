//! # Simulation module
//!
//! A kinematic simulation of the robot and a single disc-shaped target, used
//! to run the full locate and control loop without hardware.
//!
//! The robot is a bicycle model whose front wheel angle is proportional to
//! the steer demand and whose speed is proportional to the drive demand. It
//! carries a forward facing pinhole camera, and optionally a depth camera and
//! a lidar, all at the robot's origin.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod render;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::Utc;
use log::trace;
use nalgebra::Vector2;
use noise::{NoiseFn, Perlin};

// Internal
pub use params::*;
pub use render::*;
use comms_if::eqpt::{
    cam::CamImage,
    depth::DepthImage,
    drive::{ActuationCommand, DriveSink},
    lidar::LidarScan,
    Frame, FrameSource,
};
use util::maths::{clamp_norm, lin_map, wrap_pi};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A simulated robot and target.
pub struct SimScene {
    params: SimParams,

    /// Units: centimeters
    pos_cm: Vector2<f64>,

    /// Heading clockwise from +Y
    ///
    /// Units: radians
    heading_rad: f64,

    /// Last command received by the drive
    cmd: ActuationCommand,

    /// Simulation time
    ///
    /// Units: seconds
    time_s: f64,

    perlin: Perlin,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("Invalid simulation parameter: {0}")]
    InvalidParams(&'static str),

    #[error("Robot collided with the target at t = {0:.2} s")]
    Collision(f64),

    #[error("Invalid step duration {0} s")]
    InvalidStep(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimScene {
    pub fn new(params: SimParams) -> Result<Self, SimError> {
        params.validate()?;

        Ok(Self {
            pos_cm: Vector2::new(params.start_pos_cm[0], params.start_pos_cm[1]),
            heading_rad: wrap_pi(params.start_heading_rad),
            params,
            cmd: ActuationCommand::stop(),
            time_s: 0.0,
            perlin: Perlin::new(),
        })
    }

    /// Advance the simulation by `dt_s` using the last received command.
    pub fn step(&mut self, dt_s: f64) -> Result<(), SimError> {
        if !(dt_s > 0.0) || !dt_s.is_finite() {
            return Err(SimError::InvalidStep(dt_s));
        }

        let speed_cms = self.cmd.drive * self.params.max_speed_cms;
        let steer_rad = lin_map(
            (-1.0, 1.0),
            (-self.params.max_steer_angle_rad, self.params.max_steer_angle_rad),
            self.cmd.steer,
        );

        let forward = Vector2::new(self.heading_rad.sin(), self.heading_rad.cos());
        self.pos_cm += forward * speed_cms * dt_s;
        self.heading_rad = wrap_pi(
            self.heading_rad + speed_cms / self.params.wheelbase_cm * steer_rad.tan() * dt_s,
        );
        self.time_s += dt_s;

        trace!(
            "Sim t = {:.2} s: pos ({:.1}, {:.1}) cm, heading {:.3} rad",
            self.time_s,
            self.pos_cm.x,
            self.pos_cm.y,
            self.heading_rad
        );

        if self.range_to_target_cm() <= 0.0 {
            return Err(SimError::Collision(self.time_s));
        }

        Ok(())
    }

    /// Position and heading of the robot
    pub fn pose(&self) -> (Vector2<f64>, f64) {
        (self.pos_cm, self.heading_rad)
    }

    pub fn time_s(&self) -> f64 {
        self.time_s
    }

    /// Last command received by the drive
    pub fn last_cmd(&self) -> ActuationCommand {
        self.cmd
    }

    /// Distance from the robot to the surface of the target.
    ///
    /// Units: centimeters
    pub fn range_to_target_cm(&self) -> f64 {
        (self.target_pos() - self.pos_cm).norm() - self.params.target_radius_cm
    }

    /// Angle from the robot's heading to the target's centre, positive to the
    /// right.
    ///
    /// Units: radians
    pub fn bearing_to_target_rad(&self) -> f64 {
        let view = self.target_view();
        view.right_cm.atan2(view.forward_cm)
    }

    /// The target in the robot's frame.
    pub fn target_view(&self) -> TargetView {
        let d = self.target_pos() - self.pos_cm;
        let (s, c) = self.heading_rad.sin_cos();
        let forward = Vector2::new(s, c);
        let right = Vector2::new(c, -s);

        TargetView {
            right_cm: d.dot(&right),
            forward_cm: d.dot(&forward),
            surface_cm: self.range_to_target_cm(),
            radius_cm: self.params.target_radius_cm,
        }
    }

    fn target_pos(&self) -> Vector2<f64> {
        Vector2::new(self.params.target_pos_cm[0], self.params.target_pos_cm[1])
    }

    /// Surface range with noise applied, never below zero.
    fn noisy_range_cm(&self, surface_cm: f64) -> f64 {
        let noise = if self.params.range_noise_cm > 0.0 {
            self.params.range_noise_cm
                * self
                    .perlin
                    .get([self.time_s * self.params.range_noise_freq_hz, 0.5])
        } else {
            0.0
        };

        (surface_cm + noise).max(0.0)
    }
}

impl FrameSource for SimScene {
    type Error = SimError;

    fn acquire(&mut self) -> Result<Frame, Self::Error> {
        let timestamp = Utc::now();
        let view = self.target_view();
        let range_cm = self.noisy_range_cm(view.surface_cm);

        let pixels = target_pixels(&self.params, &view);

        let depth = if self.params.provide_depth {
            Some(DepthImage {
                timestamp,
                image: render_depth(&self.params, &pixels, range_cm),
            })
        } else {
            None
        };

        let lidar = if self.params.provide_lidar {
            Some(LidarScan {
                timestamp,
                samples_cm: render_lidar(&self.params, &view, range_cm),
            })
        } else {
            None
        };

        Ok(Frame {
            cam: CamImage {
                timestamp,
                image: render_cam(&self.params, &pixels),
            },
            depth,
            lidar,
        })
    }
}

impl DriveSink for SimScene {
    fn send(&mut self, cmd: ActuationCommand) {
        self.cmd = ActuationCommand {
            drive: clamp_norm(cmd.drive).0,
            steer: clamp_norm(cmd.steer).0,
        };
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::approach_ctrl::{tick, ControllerState, Params as CtrlParams};
    use crate::obj_loc::{ObjLoc, Params as LocParams};

    const DT: f64 = 0.05;

    #[test]
    fn test_straight_line_motion() {
        let mut sim = SimScene::new(SimParams::default()).unwrap();
        sim.send(ActuationCommand {
            drive: 0.5,
            steer: 0.0,
        });
        sim.step(1.0).unwrap();

        let (pos, heading) = sim.pose();
        assert!((pos.y - 50.0).abs() < 1e-9);
        assert!(pos.x.abs() < 1e-9);
        assert_eq!(heading, 0.0);
        assert_eq!(sim.time_s(), 1.0);
    }

    #[test]
    fn test_positive_steer_turns_right() {
        let mut sim = SimScene::new(SimParams::default()).unwrap();
        sim.send(ActuationCommand {
            drive: 0.5,
            steer: 0.5,
        });
        sim.step(0.1).unwrap();
        assert!(sim.pose().1 > 0.0);

        // Reversing with the same steer swings the nose the other way
        let mut sim = SimScene::new(SimParams::default()).unwrap();
        sim.send(ActuationCommand {
            drive: -0.5,
            steer: 0.5,
        });
        sim.step(0.1).unwrap();
        assert!(sim.pose().1 < 0.0);
    }

    #[test]
    fn test_collision() {
        let mut params = SimParams::default();
        params.target_pos_cm = [0.0, 20.0];
        let mut sim = SimScene::new(params).unwrap();

        sim.send(ActuationCommand {
            drive: 1.0,
            steer: 0.0,
        });
        assert!(matches!(sim.step(0.15), Err(SimError::Collision(_))));
    }

    #[test]
    fn test_seeking_turns_towards_target() {
        // Target about 30 degrees to the right
        let mut params = SimParams::default();
        params.target_pos_cm = [100.0, 173.2];
        let mut sim = SimScene::new(params).unwrap();

        let mut ol = ObjLoc::new(LocParams::default()).unwrap();
        let ctrl_params = CtrlParams::default();
        let mut state = ControllerState::default();

        let frame = sim.acquire().unwrap();
        let sample = ol.locate(&frame).unwrap().unwrap();
        assert!(sample.lateral_error_px > ctrl_params.heading_tolerance_px);

        let out = tick(&mut state, &ctrl_params, Some(sample), DT).unwrap();
        assert!(out.cmd.steer < 0.0);
        assert!(out.cmd.drive < 0.0);

        let bearing = sim.bearing_to_target_rad();
        sim.send(out.cmd);
        assert_eq!(sim.last_cmd(), out.cmd);
        sim.step(DT).unwrap();
        assert!(sim.bearing_to_target_rad() < bearing);
    }

    #[test]
    fn test_closes_on_target_ahead() {
        let mut params = SimParams::default();
        params.target_pos_cm = [0.0, 150.0];
        let mut sim = SimScene::new(params).unwrap();

        let mut ol = ObjLoc::new(LocParams::default()).unwrap();
        let ctrl_params = CtrlParams::default();
        let mut state = ControllerState::default();

        let start_range = sim.range_to_target_cm();
        assert!((start_range - 140.0).abs() < 1e-9);

        for _ in 0..20 {
            let frame = sim.acquire().unwrap();
            let sample = ol.locate(&frame).unwrap();
            let out = tick(&mut state, &ctrl_params, sample, DT).unwrap();
            sim.send(out.cmd);
            sim.step(DT).unwrap();
        }

        assert!(sim.range_to_target_cm() < start_range);
        assert!(sim.range_to_target_cm() > 0.0);
    }

    #[test]
    fn test_lidar_frame() {
        let mut params = SimParams::default();
        params.provide_depth = false;
        params.provide_lidar = true;
        params.target_pos_cm = [0.0, 110.0];
        let mut sim = SimScene::new(params).unwrap();

        let frame = sim.acquire().unwrap();
        assert!(frame.depth.is_none());

        let scan = frame.lidar.unwrap();
        assert_eq!(scan.samples_cm.len(), 720);
        assert!((scan.samples_cm[0] - 100.0).abs() < 1e-9);
        assert_eq!(scan.samples_cm[360], 0.0);
    }
}
