use image::{DynamicImage, GrayImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::trace;

use crate::error::{LaneError, Result};

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

impl DebugConfig {
    /// Save one image as `<output_dir>/<stage>/<seq>.png`
    pub fn save(&self, stage: &str, seq: u64, image: &DynamicImage) -> Result<()> {
        let stage_dir = self.output_dir.join(stage);
        std::fs::create_dir_all(&stage_dir)?;
        let output_path = stage_dir.join(format!("{:06}.png", seq));
        image.save(&output_path)?;

        trace!("debug: saved {}/{:06}.png", stage, seq);
        Ok(())
    }
}

/// Per-frame context available to all pipeline steps
#[derive(Clone, Debug)]
pub struct PipelineContext {
    /// Sequence id of the frame being processed
    pub seq: u64,
    /// Normalized steering bias in [-1.0, 1.0]
    pub turn_skew: f64,
}

/// One image-to-image stage of the gradient pipeline
pub trait PipelineStep: Send + Sync {
    fn process(&self, image: DynamicImage, context: &PipelineContext) -> Result<DynamicImage>;

    /// Human-readable name for this step (used for logs and debug folders)
    fn name(&self) -> &str;
}

/// Composable builder for the frame-to-edge-image stages
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    debug: Option<DebugConfig>,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            debug: None,
        }
    }

    /// Enable debug mode with output directory.
    /// The directory must be empty or non-existent.
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        prepare_debug_dir(&output_dir)?;
        self.debug = Some(DebugConfig { output_dir });
        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn debug(&self) -> Option<&DebugConfig> {
        self.debug.as_ref()
    }

    /// Run every step in order and return the final single-channel image
    pub fn run(&self, input: &DynamicImage, context: &PipelineContext) -> Result<GrayImage> {
        if let Some(debug) = &self.debug {
            debug.save("00_input", context.seq, input)?;
        }

        let mut image = input.clone();
        for (step_idx, step) in self.steps.iter().enumerate() {
            trace!("frame {}: running step {}", context.seq, step.name());
            image = step.process(image, context)?;

            if let Some(debug) = &self.debug {
                let stage = format!(
                    "{:02}_{}",
                    step_idx + 1,
                    step.name().to_lowercase().replace(' ', "_")
                );
                debug.save(&stage, context.seq, &image)?;
            }
        }

        Ok(image.to_luma8())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn prepare_debug_dir(output_dir: &Path) -> Result<()> {
    if output_dir.exists() {
        let mut entries = std::fs::read_dir(output_dir)?;
        if entries.next().is_some() {
            return Err(LaneError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("Debug directory is not empty: {}", output_dir.display()),
            )));
        }
    } else {
        std::fs::create_dir_all(output_dir)?;
    }
    Ok(())
}
