pub mod config;
pub mod detection;
pub mod error;
pub mod models;
pub mod pipeline;

pub use config::DetectorConfig;
pub use detection::LaneDetector;
pub use detection::mask::mask_polygon;
pub use error::{LaneError, Result};
pub use models::{DetectionResult, Frame, LaneSegment, LineParam, RawSegment, RoadLaneInfo, Side};
pub use pipeline::{DebugConfig, Pipeline, PipelineContext, PipelineStep};
