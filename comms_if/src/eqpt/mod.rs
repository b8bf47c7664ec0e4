//! # Equipment Interface
//!
//! This module defines the structures exchanged with equipment, and the traits a frame source and
//! drive sink must implement.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod cam;
pub mod depth;
pub mod drive;
pub mod lidar;

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use cam::CamImage;
use depth::DepthImage;
use lidar::LidarScan;

// -----------------------------------------------------------------------------------------------
// STRUCTS
// -----------------------------------------------------------------------------------------------

/// All sensor data acquired for a single control tick.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Colour image from the forward camera
    pub cam: CamImage,

    /// Depth image aligned with `cam`, if the equipment provides one
    pub depth: Option<DepthImage>,

    /// Lidar scan taken at the same time as `cam`, if the equipment provides one
    pub lidar: Option<LidarScan>,
}

// -----------------------------------------------------------------------------------------------
// TRAITS
// -----------------------------------------------------------------------------------------------

/// A source of sensor frames, polled once per control tick.
pub trait FrameSource {
    type Error: std::error::Error;

    /// Acquire the latest frame.
    fn acquire(&mut self) -> Result<Frame, Self::Error>;
}
