use image::RgbImage;

use crate::SensorError;

/// A camera-like producer of RGB images.
///
/// Devices are opened by their constructor and released when dropped. They
/// are driven from a single acquisition thread, so `capture` may block.
pub trait CaptureDevice: Send + 'static {
    /// Fixed width and height of every captured image.
    fn resolution(&self) -> (u32, u32);

    /// Grab the next image. `Ok(None)` signals the end of the stream.
    ///
    /// Blocking devices should give up after a bounded wait with
    /// [`SensorError::Timeout`] so a stop request is noticed.
    fn capture(&mut self) -> Result<Option<RgbImage>, SensorError>;
}
