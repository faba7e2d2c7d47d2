use image::imageops::FilterType;
use image::RgbImage;
use std::io::ErrorKind;
use std::time::Duration;
use tracing::{info, warn};
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, FourCC};

use crate::{CaptureDevice, SensorError};

const BUFFER_COUNT: u32 = 4;
/// Longest wait for one buffer before checking for a stop request.
pub const CAPTURE_TIMEOUT: Duration = Duration::from_secs(1);

/// USB webcam read through video4linux2 as a stream of MJPEG buffers.
pub struct V4lCamera {
    // the stream maps buffers of this device and must not outlive it
    stream: Stream<'static>,
    _device: Device,
    resolution: (u32, u32),
    native: (u32, u32),
}

impl V4lCamera {
    /// Open `/dev/video{index}` at `resolution`.
    pub fn open(index: usize, resolution: (u32, u32)) -> Result<Self, SensorError> {
        let name = format!("/dev/video{index}");
        let open_err = |source| SensorError::Open {
            device: name.clone(),
            source,
        };
        let device = Device::new(index).map_err(open_err)?;
        let mut format = device.format().map_err(open_err)?;
        format.width = resolution.0;
        format.height = resolution.1;
        format.fourcc = FourCC::new(b"MJPG");
        let format = device.set_format(&format).map_err(open_err)?;
        if format.fourcc != FourCC::new(b"MJPG") {
            return Err(open_err(std::io::Error::new(
                ErrorKind::Unsupported,
                format!("camera does not offer MJPEG (got {})", format.fourcc),
            )));
        }
        let native = (format.width, format.height);
        if native != resolution {
            warn!(?native, requested = ?resolution, "camera picked another size; frames will be scaled");
        }
        let mut stream =
            Stream::with_buffers(&device, Type::VideoCapture, BUFFER_COUNT).map_err(open_err)?;
        stream.set_timeout(CAPTURE_TIMEOUT);
        info!(device = %name, width = native.0, height = native.1, "camera opened");
        Ok(Self {
            stream,
            _device: device,
            resolution,
            native,
        })
    }
}

impl CaptureDevice for V4lCamera {
    fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    fn capture(&mut self) -> Result<Option<RgbImage>, SensorError> {
        let (buf, _meta) = match self.stream.next() {
            Ok(next) => next,
            Err(e) if e.kind() == ErrorKind::TimedOut => {
                return Err(SensorError::Timeout(CAPTURE_TIMEOUT))
            }
            Err(e) => return Err(e.into()),
        };
        let img = image::load_from_memory(buf)?.to_rgb8();
        if self.native == self.resolution {
            return Ok(Some(img));
        }
        let (w, h) = self.resolution;
        Ok(Some(image::imageops::resize(&img, w, h, FilterType::Triangle)))
    }
}
