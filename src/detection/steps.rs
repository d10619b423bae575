use crate::detection::mask::{RegionMasker, apply_mask};
use crate::error::Result;
use crate::pipeline::{PipelineContext, PipelineStep};
use image::DynamicImage;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;

/// Convert image to grayscale
pub struct GrayscaleStep;

impl PipelineStep for GrayscaleStep {
    fn process(&self, image: DynamicImage, _context: &PipelineContext) -> Result<DynamicImage> {
        Ok(DynamicImage::ImageLuma8(image.to_luma8()))
    }

    fn name(&self) -> &str {
        "Grayscale Conversion"
    }
}

/// Sigma of a Gaussian whose kernel is `kernel` pixels wide when sigma
/// is left to be derived from the size (5 -> 1.1)
pub fn sigma_for_kernel(kernel: u32) -> f32 {
    0.3 * ((kernel as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Apply Gaussian blur
pub struct BlurStep {
    pub sigma: f32,
}

impl BlurStep {
    /// Blur matching a square kernel of the given odd size
    pub fn from_kernel(kernel: u32) -> Self {
        Self {
            sigma: sigma_for_kernel(kernel),
        }
    }
}

impl PipelineStep for BlurStep {
    fn process(&self, image: DynamicImage, _context: &PipelineContext) -> Result<DynamicImage> {
        let gray = image.to_luma8();
        Ok(DynamicImage::ImageLuma8(gaussian_blur_f32(&gray, self.sigma)))
    }

    fn name(&self) -> &str {
        "Gaussian Blur"
    }
}

/// Detect edges using Canny
pub struct EdgeDetectionStep {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl PipelineStep for EdgeDetectionStep {
    fn process(&self, image: DynamicImage, _context: &PipelineContext) -> Result<DynamicImage> {
        let gray = image.to_luma8();
        let edges = canny(&gray, self.low_threshold, self.high_threshold);
        Ok(DynamicImage::ImageLuma8(edges))
    }

    fn name(&self) -> &str {
        "Edge Detection"
    }
}

/// Keep only the road trapezoid; the polygon follows the frame's turn skew
pub struct RegionMaskStep {
    pub masker: RegionMasker,
    /// Pixels per unit of normalized turn skew
    pub skew_scale: f64,
}

impl PipelineStep for RegionMaskStep {
    fn process(&self, image: DynamicImage, context: &PipelineContext) -> Result<DynamicImage> {
        let gray = image.to_luma8();
        let polygon = self.masker.polygon(
            gray.height(),
            gray.width(),
            context.turn_skew * self.skew_scale,
        );
        Ok(DynamicImage::ImageLuma8(apply_mask(&gray, &polygon)))
    }

    fn name(&self) -> &str {
        "Region Mask"
    }
}
