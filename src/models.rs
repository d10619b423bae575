use image::DynamicImage;
use serde::Serialize;

/// A line segment as returned by line extraction, in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSegment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl RawSegment {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn length(&self) -> f64 {
        let dx = (self.x2 - self.x1) as f64;
        let dy = (self.y2 - self.y1) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Line `y = slope * x + intercept` in image coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineParam {
    pub slope: f64,
    pub intercept: f64,
}

impl LineParam {
    /// Fit the line through both endpoints of a segment.
    /// Vertical segments have no slope and yield `None`.
    pub fn fit(segment: &RawSegment) -> Option<Self> {
        if segment.x1 == segment.x2 {
            return None;
        }
        let slope = (segment.y2 - segment.y1) as f64 / (segment.x2 - segment.x1) as f64;
        let intercept = segment.y1 as f64 - slope * segment.x1 as f64;
        Some(Self { slope, intercept })
    }

    /// x where the line crosses row `y`
    pub fn x_at(&self, y: f64) -> f64 {
        (y - self.intercept) / self.slope
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// Representative border segment for one side. All zeros means "nothing".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaneSegment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl LaneSegment {
    pub const EMPTY: LaneSegment = LaneSegment { x1: 0, y1: 0, x2: 0, y2: 0 };

    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    pub fn to_array(&self) -> [i32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

/// Outcome of one processed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionResult {
    pub found_left: bool,
    pub found_right: bool,
    pub left: LaneSegment,
    pub right: LaneSegment,
    pub latest_valid_left: LaneSegment,
    pub latest_valid_right: LaneSegment,
}

/// A camera frame plus the sequence id of the envelope it arrived in
#[derive(Clone)]
pub struct Frame {
    pub seq: u64,
    pub image: DynamicImage,
}

impl Frame {
    pub fn new(seq: u64, image: DynamicImage) -> Self {
        Self { seq, image }
    }
}

/// Published lane record, one per processed frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadLaneInfo {
    pub src_img_msg_seq: u64,
    pub found_left_border: bool,
    pub found_right_border: bool,
    pub num_lanes: u32,
    pub current_lane: u32,
    pub lanes_start_offset: Vec<f32>,
    pub line_left_border: [i32; 4],
    pub line_right_border: [i32; 4],
    pub line_latest_valid_left_border: [i32; 4],
    pub line_latest_valid_right_border: [i32; 4],
}

impl RoadLaneInfo {
    pub fn from_detection(seq: u64, result: &DetectionResult) -> Self {
        Self {
            src_img_msg_seq: seq,
            found_left_border: result.found_left,
            found_right_border: result.found_right,
            // Single lane pair only; the next three fields are reserved
            num_lanes: 1,
            current_lane: 0,
            lanes_start_offset: vec![0.0],
            line_left_border: result.left.to_array(),
            line_right_border: result.right.to_array(),
            line_latest_valid_left_border: result.latest_valid_left.to_array(),
            line_latest_valid_right_border: result.latest_valid_right.to_array(),
        }
    }
}
