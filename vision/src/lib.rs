//! Frame analysis for the lookout pipeline.
//!
//! The `vision` crate turns captured frames into detection results: it keeps a
//! running background estimate, extracts motion regions from the difference
//! against that estimate and, when asked, runs a face classifier.

pub mod annotate;
pub mod background;
pub mod error;
pub mod face;
pub mod frame;
pub mod motion;

pub use annotate::Timestamp;
pub use background::{BackgroundModel, Readiness};
pub use error::VisionError;
pub use face::{FaceClassifier, FaceDetector, FaceParams, RustfaceClassifier};
pub use frame::{BoundingBox, DetectionResult, Frame};
pub use motion::MotionDetector;
