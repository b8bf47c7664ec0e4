//! Implementations for the ObjLoc state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use image::RgbImage;
use log::{debug, info};
use serde::Serialize;

// Internal
use super::{
    draw_region, estimate_range, ColourRange, HsvRegionDetector, ObjLocError, Params,
    RangeSource, Region, RegionDetector,
};
use crate::approach_ctrl::ControlSample;
use comms_if::eqpt::Frame;
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Object location module state
#[derive(Default)]
pub struct ObjLoc<D: RegionDetector = HsvRegionDetector> {
    pub(crate) params: Params,

    detector: D,

    /// Colour range of the selected target
    range: Option<ColourRange>,

    /// Region selected on the last cycle
    last_region: Option<Region>,

    pub(crate) report: StatusReport,
    arch_report: Archiver,
}

/// Status report for ObjLoc processing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatusReport {
    /// True if a target region was found this cycle
    pub target_detected: bool,

    /// Area of the selected region, zero if there is none
    pub area_px: usize,

    pub centroid_x_px: f64,
    pub centroid_y_px: f64,

    pub lateral_error_px: f64,
    pub distance_cm: f64,

    /// Source the distance was taken from
    pub range_source: RangeSource,

    /// True if the lidar index was outside the scan and had to be clamped
    pub lidar_index_clamped: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ObjLoc<HsvRegionDetector> {
    /// Create a new locator using the HSV region detector, with no archiving.
    pub fn new(params: Params) -> Result<Self, ObjLocError> {
        Self::with_detector(params, HsvRegionDetector)
    }
}

impl<D: RegionDetector> ObjLoc<D> {
    /// Create a new locator using the given region detector.
    pub fn with_detector(params: Params, detector: D) -> Result<Self, ObjLocError> {
        params.validate()?;
        let range = params.target_range()?;

        Ok(Self {
            params,
            detector,
            range: Some(range),
            last_region: None,
            report: StatusReport::default(),
            arch_report: Archiver::default(),
        })
    }

    /// Locate the target in a frame.
    ///
    /// Returns `None` if no region large enough was found.
    pub fn locate(&mut self, frame: &Frame) -> Result<Option<ControlSample>, ObjLocError> {
        let expected = (self.params.image_width_px, self.params.image_height_px);
        let found = frame.cam.dimensions();
        if found != expected {
            return Err(ObjLocError::UnexpectedFrameSize { expected, found });
        }

        let range = match self.range {
            Some(r) => r,
            None => self.params.target_range()?,
        };

        let mut report = StatusReport::default();

        let region =
            self.detector
                .largest_region(&frame.cam.image, &range, self.params.min_region_area_px);

        let sample = region.as_ref().map(|r| {
            let lateral_error_px = r.centroid_px.0 - self.params.image_width_px as f64 / 2.0;

            let est = estimate_range(
                &self.params,
                r.centroid_pixel(),
                lateral_error_px,
                frame.depth.as_ref(),
                frame.lidar.as_ref(),
            );

            report = StatusReport {
                target_detected: true,
                area_px: r.area_px(),
                centroid_x_px: r.centroid_px.0,
                centroid_y_px: r.centroid_px.1,
                lateral_error_px,
                distance_cm: est.distance_cm,
                range_source: est.source,
                lidar_index_clamped: est.lidar_index_clamped,
            };

            ControlSample::new(lateral_error_px, est.distance_cm)
        });

        debug!("ObjLoc: {:?}", report);

        self.last_region = region;
        self.report = report;

        Ok(sample)
    }

    /// Region selected on the last cycle, if any.
    pub fn last_region(&self) -> Option<&Region> {
        self.last_region.as_ref()
    }

    /// Draw the last selected region onto a copy of `image`, or `None` if
    /// there was no region.
    pub fn render_overlay(&self, image: &RgbImage) -> Option<RgbImage> {
        self.last_region.as_ref().map(|r| draw_region(image, r))
    }
}

impl<D: RegionDetector> State for ObjLoc<D> {
    type InitData = Params;
    type InitError = ObjLocError;

    type InputData = Frame;
    type OutputData = Option<ControlSample>;
    type StatusReport = StatusReport;
    type ProcError = ObjLocError;

    /// Initialise the ObjLoc module.
    ///
    /// Expected init data is the already loaded parameters.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        init_data.validate()?;

        self.range = Some(init_data.target_range()?);
        self.params = init_data;
        self.last_region = None;
        self.report = StatusReport::default();

        self.arch_report = Archiver::from_path(session, "obj_loc/status_report.csv")?;

        info!(
            "ObjLoc initialised, looking for \"{}\" in {}x{} frames",
            self.params.target, self.params.image_width_px, self.params.image_height_px
        );

        Ok(())
    }

    /// Locate the target in the frame, logging whenever the target is gained
    /// or lost.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let was_detected = self.report.target_detected;

        let sample = self.locate(input_data)?;

        if self.report.target_detected != was_detected {
            if self.report.target_detected {
                info!(
                    "Target \"{}\" acquired: lateral error {:.1} px, distance {:.1} cm ({:?})",
                    self.params.target,
                    self.report.lateral_error_px,
                    self.report.distance_cm,
                    self.report.range_source
                );
            } else {
                info!("Target \"{}\" lost", self.params.target);
            }
        }

        Ok((sample, self.report))
    }
}

impl<D: RegionDetector> Archived for ObjLoc<D> {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)
    }
}
