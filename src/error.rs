//! Error types for lane detection

/// Result type alias
pub type Result<T> = std::result::Result<T, LaneError>;

/// Frame-level failures. Any of these aborts the current frame only; the
/// detector keeps its border memory and is ready for the next frame.
#[derive(Debug, thiserror::Error)]
pub enum LaneError {
    /// Frame has no pixels in at least one dimension
    #[error("Empty frame: {width}x{height}")]
    EmptyFrame { width: u32, height: u32 },

    /// Turn skew outside [-1.0, 1.0] or not a number
    #[error("Turn skew out of range: {0}")]
    InvalidTurnSkew(f64),

    /// Configuration values that cannot drive the detector
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Hough accumulator for this frame size and resolution is too large
    #[error("Hough accumulator too large: {num_angle} angles x {num_rho} distances")]
    AccumulatorTooLarge { num_angle: usize, num_rho: usize },

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// I/O error (config file, debug output directory)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encode/decode failure
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}
