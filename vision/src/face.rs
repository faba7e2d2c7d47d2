use image::GrayImage;
use rustface::{create_detector_with_model, read_model, Detector, ImageData};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

use crate::{BoundingBox, VisionError};

/// Sensitivity knobs for multi-scale face search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceParams {
    /// Ratio between successive search scales; must exceed 1.
    pub scale_factor: f32,
    /// Corroborating detections required before a candidate is kept.
    pub min_neighbors: u32,
    /// Smallest face edge searched for, in pixels.
    pub min_size: u32,
}

impl Default for FaceParams {
    fn default() -> Self {
        Self {
            scale_factor: 1.3,
            min_neighbors: 5,
            min_size: 40,
        }
    }
}

/// Anything that can propose face rectangles in a grayscale image.
pub trait FaceClassifier {
    /// Return candidate face boxes found in `gray`.
    fn classify(&mut self, gray: &GrayImage) -> Result<Vec<BoundingBox>, VisionError>;
}

/// Score each required neighbour adds to rustface's acceptance threshold.
const SCORE_PER_NEIGHBOR: f64 = 0.4;

/// [`FaceClassifier`] backed by the SeetaFace frontal model via `rustface`.
pub struct RustfaceClassifier {
    detector: Box<dyn Detector>,
}

impl RustfaceClassifier {
    /// Load the model at `path` and configure it with `params`.
    pub fn from_path(path: impl AsRef<Path>, params: FaceParams) -> Result<Self, VisionError> {
        let path = path.as_ref();
        let load_err = |source| VisionError::ModelLoad {
            path: path.display().to_string(),
            source,
        };
        let file = File::open(path).map_err(load_err)?;
        let model = read_model(BufReader::new(file)).map_err(load_err)?;
        let mut detector = create_detector_with_model(model);
        // rustface shrinks the image per pyramid level instead of growing the window
        detector.set_pyramid_scale_factor(1.0 / params.scale_factor);
        detector.set_score_thresh(f64::from(params.min_neighbors) * SCORE_PER_NEIGHBOR);
        detector.set_min_face_size(params.min_size);
        detector.set_slide_window_step(4, 4);
        info!(path = %path.display(), "face model loaded");
        Ok(Self { detector })
    }
}

impl FaceClassifier for RustfaceClassifier {
    fn classify(&mut self, gray: &GrayImage) -> Result<Vec<BoundingBox>, VisionError> {
        let (w, h) = gray.dimensions();
        let mut image = ImageData::new(gray, w, h);
        let faces = self.detector.detect(&mut image);
        Ok(faces
            .iter()
            .filter_map(|f| {
                let b = f.bbox();
                BoundingBox::clamped(
                    i64::from(b.x()),
                    i64::from(b.y()),
                    i64::from(b.width()),
                    i64::from(b.height()),
                    w,
                    h,
                )
            })
            .collect())
    }
}

/// Runs the face classifier over whole frames.
///
/// Every call is independent; nothing is tracked between frames.
pub struct FaceDetector {
    classifier: Box<dyn FaceClassifier>,
}

impl FaceDetector {
    pub fn new(classifier: Box<dyn FaceClassifier>) -> Self {
        Self { classifier }
    }

    /// Detect faces in `gray`, keeping only boxes inside the image.
    pub fn detect(&mut self, gray: &GrayImage) -> Result<Vec<BoundingBox>, VisionError> {
        let (w, h) = gray.dimensions();
        if w == 0 || h == 0 {
            return Err(VisionError::geometry((1, 1), (w, h)));
        }
        let frame = BoundingBox::new(0, 0, w, h);
        let faces: Vec<BoundingBox> = self
            .classifier
            .classify(gray)?
            .into_iter()
            .filter(|b| frame.contains(b))
            .collect();
        debug!(count = faces.len(), "faces classified");
        Ok(faces)
    }
}
