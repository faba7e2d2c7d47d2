//! Frame acquisition for lookout.
//!
//! A [`CaptureDevice`] produces raw images. A [`ThreadedSource`] drives one on
//! its own thread and hands the newest frame to the processing loop through a
//! [`LatestFrame`] slot.

#[cfg(feature = "camera")]
pub mod camera;
pub mod device;
pub mod error;
pub mod replay;
pub mod slot;
pub mod source;

pub use device::CaptureDevice;
pub use error::SensorError;
pub use replay::ReplayDevice;
pub use slot::{FrameRead, LatestFrame};
pub use source::{FrameSource, ThreadedSource};
