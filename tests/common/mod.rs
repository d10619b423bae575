mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from lanedetector for tests
pub use lanedetector::{DetectorConfig, Frame, LaneDetector, LaneSegment, LineParam, RawSegment};
