use image::{ImageFormat, RgbImage};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use vision::{DetectionResult, Frame};

/// Consumer of each processed frame in interactive mode.
pub trait Renderer {
    /// Present `annotated`, the view of `frame` with `result` drawn on it.
    fn render(&mut self, frame: &Frame, annotated: &RgbImage, result: &DetectionResult);
}

/// Renderer used in headless mode.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopRenderer;

impl Renderer for NoopRenderer {
    fn render(&mut self, _frame: &Frame, _annotated: &RgbImage, _result: &DetectionResult) {}
}

/// Keeps an annotated preview image on disk up to date.
///
/// The file is refreshed at most once per `every` so a slow disk does not
/// hold up processing.
pub struct PreviewRenderer {
    path: PathBuf,
    every: Duration,
    last: Option<Instant>,
}

impl PreviewRenderer {
    pub const DEFAULT_REFRESH: Duration = Duration::from_millis(500);

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            every: Self::DEFAULT_REFRESH,
            last: None,
        }
    }

    pub fn with_refresh(mut self, every: Duration) -> Self {
        self.every = every;
        self
    }
}

impl Renderer for PreviewRenderer {
    fn render(&mut self, frame: &Frame, annotated: &RgbImage, result: &DetectionResult) {
        debug!(
            seq = frame.seq(),
            motion = result.motion_boxes.len(),
            faces = result.face_boxes.len(),
            "frame processed"
        );
        if self.last.is_some_and(|t| t.elapsed() < self.every) {
            return;
        }
        self.last = Some(Instant::now());
        if let Err(e) = annotated.save_with_format(&self.path, ImageFormat::Jpeg) {
            warn!(path = %self.path.display(), error = %e, "failed to refresh preview");
        }
    }
}
