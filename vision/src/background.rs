use image::{GrayImage, ImageBuffer, Luma};
use tracing::debug;

use crate::VisionError;

/// Floating point single-channel grid holding the expected static scene.
pub type BackgroundEstimate = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Outcome of feeding a frame to the [`BackgroundModel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readiness {
    /// The estimate was just created from this frame; nothing to compare yet.
    Initialized,
    /// The estimate absorbed this frame and can be diffed against.
    Ready,
}

/// Exponentially smoothed estimate of the static scene.
///
/// Slow changes such as daylight drift are absorbed at the learning rate,
/// while fast-moving content shows up as a transient deviation.
#[derive(Debug)]
pub struct BackgroundModel {
    alpha: f32,
    estimate: Option<BackgroundEstimate>,
}

impl BackgroundModel {
    /// Create an empty model adapting at learning rate `alpha` in `(0, 1]`.
    pub fn new(alpha: f32) -> Self {
        debug_assert!(alpha > 0.0 && alpha <= 1.0);
        Self {
            alpha,
            estimate: None,
        }
    }

    pub fn learning_rate(&self) -> f32 {
        self.alpha
    }

    /// Whether at least one frame has been absorbed.
    pub fn is_ready(&self) -> bool {
        self.estimate.is_some()
    }

    pub fn estimate(&self) -> Option<&BackgroundEstimate> {
        self.estimate.as_ref()
    }

    /// Blend `current` into the estimate.
    ///
    /// The first call seeds the estimate with a copy of `current` and reports
    /// [`Readiness::Initialized`].
    pub fn update(&mut self, current: &GrayImage) -> Result<Readiness, VisionError> {
        let Some(estimate) = self.estimate.as_mut() else {
            let (w, h) = current.dimensions();
            debug!(width = w, height = h, "background initialized");
            self.estimate = Some(ImageBuffer::from_fn(w, h, |x, y| {
                Luma([f32::from(current.get_pixel(x, y)[0])])
            }));
            return Ok(Readiness::Initialized);
        };
        check_dimensions(estimate, current)?;
        let keep = 1.0 - self.alpha;
        for (e, c) in estimate.pixels_mut().zip(current.pixels()) {
            e[0] = keep * e[0] + self.alpha * f32::from(c[0]);
        }
        Ok(Readiness::Ready)
    }

    /// Absolute difference between `current` and the estimate as it stands.
    ///
    /// Callers run this after [`update`](Self::update) for the same frame.
    pub fn delta(&self, current: &GrayImage) -> Result<GrayImage, VisionError> {
        let estimate = self
            .estimate
            .as_ref()
            .ok_or(VisionError::BackgroundUninitialized)?;
        check_dimensions(estimate, current)?;
        let (w, h) = current.dimensions();
        Ok(GrayImage::from_fn(w, h, |x, y| {
            let diff = (f32::from(current.get_pixel(x, y)[0]) - estimate.get_pixel(x, y)[0]).abs();
            Luma([diff.round().min(255.0) as u8])
        }))
    }

    /// Update with `current`, then diff against the refreshed estimate.
    ///
    /// Returns `None` for the initialising frame.
    pub fn absorb(&mut self, current: &GrayImage) -> Result<Option<GrayImage>, VisionError> {
        match self.update(current)? {
            Readiness::Initialized => Ok(None),
            Readiness::Ready => self.delta(current).map(Some),
        }
    }
}

fn check_dimensions(estimate: &BackgroundEstimate, current: &GrayImage) -> Result<(), VisionError> {
    if estimate.dimensions() != current.dimensions() {
        return Err(VisionError::geometry(
            estimate.dimensions(),
            current.dimensions(),
        ));
    }
    Ok(())
}
