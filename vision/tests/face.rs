use image::GrayImage;
use vision::{BoundingBox, FaceClassifier, FaceDetector, FaceParams, RustfaceClassifier, VisionError};

struct Fixed(Vec<BoundingBox>);

impl FaceClassifier for Fixed {
    fn classify(&mut self, _gray: &GrayImage) -> Result<Vec<BoundingBox>, VisionError> {
        Ok(self.0.clone())
    }
}

struct Broken;

impl FaceClassifier for Broken {
    fn classify(&mut self, _gray: &GrayImage) -> Result<Vec<BoundingBox>, VisionError> {
        Err(VisionError::Classifier("bad input".into()))
    }
}

#[test]
fn keeps_boxes_inside_frame() {
    let inside = BoundingBox::new(10, 10, 40, 40);
    let outside = BoundingBox::new(90, 90, 40, 40);
    let mut det = FaceDetector::new(Box::new(Fixed(vec![inside, outside])));
    let faces = det.detect(&GrayImage::new(100, 100)).unwrap();
    assert_eq!(faces, vec![inside]);
}

#[test]
fn classifier_errors_propagate() {
    let mut det = FaceDetector::new(Box::new(Broken));
    assert!(matches!(
        det.detect(&GrayImage::new(10, 10)),
        Err(VisionError::Classifier(_))
    ));
}

#[test]
fn empty_image_is_a_geometry_error() {
    let mut det = FaceDetector::new(Box::new(Fixed(vec![])));
    assert!(matches!(
        det.detect(&GrayImage::new(0, 0)),
        Err(VisionError::Geometry { .. })
    ));
}

#[test]
fn missing_model_fails_to_load() {
    let err = RustfaceClassifier::from_path("no/such/model.bin", FaceParams::default())
        .err()
        .expect("load should fail");
    assert!(matches!(err, VisionError::ModelLoad { .. }));
}

#[test]
fn default_params() {
    let p = FaceParams::default();
    assert_eq!(p.scale_factor, 1.3);
    assert_eq!(p.min_neighbors, 5);
}
