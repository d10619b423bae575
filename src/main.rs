use clap::Parser;
use image::{DynamicImage, ImageReader};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lanedetector::{DetectorConfig, Frame, LaneDetector};

#[derive(Parser)]
#[command(name = "lanedetector")]
#[command(about = "Detect left and right lane borders in road camera frames")]
struct Cli {
    /// Frame images, processed in the given order
    #[arg(value_name = "FRAME", required = true)]
    frames: Vec<PathBuf>,

    /// Expected steering bias in [-1.0, 1.0]
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    turn_skew: f64,

    /// YAML file overriding detector tuning constants
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Sequence id assigned to the first frame
    #[arg(long, default_value_t = 0)]
    first_seq: u64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Save debug outputs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,
}

fn load_image(path: &Path) -> anyhow::Result<DynamicImage> {
    ImageReader::open(path)?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_filter = if args.verbose { "lanedetector=debug" } else { "lanedetector=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => {
            info!("Loading config: {:?}", path);
            DetectorConfig::load(path)?
        }
        None => DetectorConfig::default(),
    };

    let mut detector = LaneDetector::new(config)?;
    if let Some(debug_dir) = args.debug_out {
        detector = detector.with_debug(debug_dir)?;
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut failed = 0usize;

    for (offset, path) in args.frames.iter().enumerate() {
        let seq = args.first_seq + offset as u64;

        let image = match load_image(path) {
            Ok(image) => image,
            Err(e) => {
                warn!("frame {} ({:?}) skipped: {}", seq, path, e);
                failed += 1;
                continue;
            }
        };

        match detector.process_frame(&Frame::new(seq, image), args.turn_skew) {
            Ok(info) => {
                serde_json::to_writer(&mut out, &info)?;
                writeln!(out)?;
            }
            Err(e) => {
                warn!("frame {} ({:?}) skipped: {}", seq, path, e);
                failed += 1;
            }
        }
    }

    info!(
        "Processed {} frames ({} skipped)",
        args.frames.len() - failed,
        failed
    );

    Ok(())
}
