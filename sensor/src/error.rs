use std::time::Duration;
use thiserror::Error;

/// Failures while opening or reading a capture device.
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("failed to open capture device {device}: {source}")]
    Open {
        device: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid replay pattern {pattern}: {message}")]
    Pattern { pattern: String, message: String },
    #[error("no images match {0}")]
    NoImages(String),
    /// The device produced nothing within its wait; acquisition retries.
    #[error("no frame within {0:?}")]
    Timeout(Duration),
    #[error("capture failed: {0}")]
    Capture(#[from] std::io::Error),
    #[error("failed to decode frame: {0}")]
    Decode(#[from] image::ImageError),
    #[error("frame source already started")]
    AlreadyStarted,
    #[error("failed to spawn acquisition thread: {0}")]
    Spawn(#[source] std::io::Error),
}
