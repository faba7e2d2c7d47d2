use thiserror::Error;

/// Failures raised while analysing frames.
///
/// None of these are expected during normal operation: they indicate a broken
/// geometry invariant or an unusable classifier and are treated as fatal by
/// the caller.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("frame is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    Geometry {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    #[error("background model has not seen a frame yet")]
    BackgroundUninitialized,
    #[error("failed to load face model {path}: {source}")]
    ModelLoad {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to load font {path}: {source}")]
    FontLoad {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("face classifier failed: {0}")]
    Classifier(String),
}

impl VisionError {
    pub(crate) fn geometry(expected: (u32, u32), actual: (u32, u32)) -> Self {
        Self::Geometry {
            expected_width: expected.0,
            expected_height: expected.1,
            actual_width: actual.0,
            actual_height: actual.1,
        }
    }
}
