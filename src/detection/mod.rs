pub mod aggregate;
pub mod classify;
pub mod hough;
pub mod mask;
pub mod memory;
pub mod overlay;
pub mod steps;

use image::DynamicImage;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::config::DetectorConfig;
use crate::error::{LaneError, Result};
use crate::models::{DetectionResult, Frame, LaneSegment, RawSegment, RoadLaneInfo, Side};
use crate::pipeline::{Pipeline, PipelineContext};
use classify::LineClassifier;
use hough::ProbabilisticHough;
use mask::RegionMasker;
use memory::BorderMemory;
use steps::{BlurStep, EdgeDetectionStep, GrayscaleStep, RegionMaskStep};

/// Build the frame-to-masked-edges pipeline from a config
pub fn build_gradient_pipeline(config: &DetectorConfig) -> Pipeline {
    Pipeline::new()
        .add_step(Arc::new(GrayscaleStep))
        .add_step(Arc::new(BlurStep::from_kernel(config.preprocessing.blur_kernel)))
        .add_step(Arc::new(EdgeDetectionStep {
            low_threshold: config.preprocessing.canny_low,
            high_threshold: config.preprocessing.canny_high,
        }))
        .add_step(Arc::new(RegionMaskStep {
            masker: RegionMasker::new(&config.mask),
            skew_scale: config.mask.skew_scale,
        }))
}

/// Per-frame lane border detector.
///
/// Owns the border memory, so one detector must see the frames of one
/// camera stream in order. `process` takes `&mut self`; callers that
/// receive frames on several threads need to serialize access themselves.
pub struct LaneDetector {
    pipeline: Pipeline,
    hough: ProbabilisticHough,
    classifier: LineClassifier,
    memory: BorderMemory,
    /// Sequence id handed to the next `process` call
    next_seq: u64,
}

impl LaneDetector {
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            pipeline: build_gradient_pipeline(&config),
            hough: ProbabilisticHough::new(&config.hough),
            classifier: LineClassifier::new(&config.classifier),
            memory: BorderMemory::new(),
            next_seq: 0,
        })
    }

    /// Save every intermediate image plus a border overlay per frame
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        self.pipeline = self.pipeline.with_debug(output_dir)?;
        Ok(self)
    }

    pub fn memory(&self) -> &BorderMemory {
        &self.memory
    }

    /// Detect borders in one frame. On error the memory is left untouched.
    /// Frames are numbered from 0 in call order, failed calls included.
    pub fn process(&mut self, frame: &DynamicImage, turn_skew: f64) -> Result<DetectionResult> {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.detect(frame, turn_skew, seq)
    }

    /// Detect borders and wrap them in the published record
    pub fn process_frame(&mut self, frame: &Frame, turn_skew: f64) -> Result<RoadLaneInfo> {
        let result = self.detect(&frame.image, turn_skew, frame.seq)?;
        Ok(RoadLaneInfo::from_detection(frame.seq, &result))
    }

    /// Classification, aggregation and memory update for segments that
    /// were extracted elsewhere
    pub fn process_segments(
        &mut self,
        height: u32,
        width: u32,
        segments: &[RawSegment],
    ) -> DetectionResult {
        let result = self.evaluate(height, width, segments);
        self.commit(&result);
        result
    }

    fn detect(&mut self, frame: &DynamicImage, turn_skew: f64, seq: u64) -> Result<DetectionResult> {
        let (width, height) = (frame.width(), frame.height());
        if width == 0 || height == 0 {
            return Err(LaneError::EmptyFrame { width, height });
        }
        if !turn_skew.is_finite() || turn_skew.abs() > 1.0 {
            return Err(LaneError::InvalidTurnSkew(turn_skew));
        }

        let context = PipelineContext { seq, turn_skew };
        let edges = self.pipeline.run(frame, &context)?;
        let segments = self.hough.detect(&edges)?;

        let result = self.evaluate(height, width, &segments);
        debug!(
            "frame {}: {} segments, left={} right={}",
            seq,
            segments.len(),
            result.found_left,
            result.found_right
        );

        if let Some(debug) = self.pipeline.debug() {
            let overlay = overlay::draw_borders(frame, &result);
            debug.save("overlay", seq, &DynamicImage::ImageRgb8(overlay))?;
        }

        self.commit(&result);
        Ok(result)
    }

    /// Build the frame result as it would read after committing it to
    /// memory, without touching the memory yet
    fn evaluate(&self, height: u32, width: u32, segments: &[RawSegment]) -> DetectionResult {
        let (left_params, right_params) = self.classifier.classify(height, width, segments);
        let (found_left, left) = aggregate::aggregate(height, width, &left_params);
        let (found_right, right) = aggregate::aggregate(height, width, &right_params);

        let latest = |side: Side, found: bool, segment: LaneSegment| {
            if found { segment } else { self.memory.get(side) }
        };

        DetectionResult {
            found_left,
            found_right,
            left,
            right,
            latest_valid_left: latest(Side::Left, found_left, left),
            latest_valid_right: latest(Side::Right, found_right, right),
        }
    }

    fn commit(&mut self, result: &DetectionResult) {
        self.memory.record(Side::Left, result.found_left, result.left);
        self.memory.record(Side::Right, result.found_right, result.right);
    }
}

impl Default for LaneDetector {
    fn default() -> Self {
        Self {
            pipeline: build_gradient_pipeline(&DetectorConfig::default()),
            hough: ProbabilisticHough::default(),
            classifier: LineClassifier::default(),
            memory: BorderMemory::new(),
            next_seq: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_both_sides_from_segments() {
        let mut detector = LaneDetector::default();
        let segments = [
            RawSegment::new(100, 500, 300, 300), // y = -x + 600
            RawSegment::new(500, 300, 700, 500), // y = x - 200
        ];

        let result = detector.process_segments(600, 800, &segments);
        assert!(result.found_left);
        assert!(result.found_right);
        assert_eq!(result.left, LaneSegment::new(1, 599, 400, 200));
        assert_eq!(result.right, LaneSegment::new(799, 599, 400, 200));
        assert_eq!(result.latest_valid_left, result.left);
        assert_eq!(result.latest_valid_right, result.right);
    }

    #[test]
    fn test_fallback_after_dropout() {
        let mut detector = LaneDetector::default();
        let first = detector.process_segments(600, 800, &[RawSegment::new(500, 300, 700, 500)]);
        assert!(!first.found_left);
        assert!(first.found_right);

        let second = detector.process_segments(600, 800, &[]);
        assert!(!second.found_left);
        assert!(!second.found_right);
        assert_eq!(second.right, LaneSegment::EMPTY);
        assert_eq!(second.latest_valid_right, first.right);
        assert!(second.latest_valid_left.is_empty());
    }

    #[test]
    fn test_rejects_empty_frame() {
        let mut detector = LaneDetector::default();
        let frame = DynamicImage::ImageRgb8(RgbImage::new(0, 10));
        assert!(matches!(
            detector.process(&frame, 0.0),
            Err(LaneError::EmptyFrame { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_rejects_bad_skew_and_keeps_memory() {
        let mut detector = LaneDetector::default();
        detector.process_segments(600, 800, &[RawSegment::new(100, 500, 300, 300)]);
        let before = detector.memory().clone();

        let frame = DynamicImage::ImageRgb8(RgbImage::from_pixel(80, 60, Rgb([0, 0, 0])));
        assert!(matches!(
            detector.process(&frame, 1.5),
            Err(LaneError::InvalidTurnSkew(_))
        ));
        assert!(detector.process(&frame, f64::NAN).is_err());
        assert_eq!(detector.memory(), &before);
    }

    #[test]
    fn test_blank_frame_finds_nothing() {
        let mut detector = LaneDetector::default();
        let frame = DynamicImage::ImageRgb8(RgbImage::from_pixel(800, 600, Rgb([40, 40, 40])));
        let result = detector.process(&frame, 0.0).unwrap();
        assert!(!result.found_left);
        assert!(!result.found_right);
        assert!(result.latest_valid_left.is_empty());
        assert!(result.latest_valid_right.is_empty());
    }

    #[test]
    fn test_process_numbers_debug_frames() {
        let dir = tempfile::TempDir::new().unwrap();
        let out_dir = dir.path().join("debug");
        let mut detector = LaneDetector::default().with_debug(out_dir.clone()).unwrap();
        let frame = DynamicImage::ImageRgb8(RgbImage::from_pixel(800, 600, Rgb([40, 40, 40])));

        detector.process(&frame, 0.0).unwrap();
        assert!(detector.process(&frame, 2.0).is_err());
        detector.process(&frame, 0.0).unwrap();

        for seq in ["000000.png", "000002.png"] {
            assert!(out_dir.join("00_input").join(seq).exists());
            assert!(out_dir.join("overlay").join(seq).exists());
        }
        assert!(!out_dir.join("overlay").join("000001.png").exists());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = DetectorConfig::default();
        config.hough.threshold = 0;
        assert!(LaneDetector::new(config).is_err());
    }
}
