use chrono::{DateTime, Utc};
use image::{GrayImage, RgbImage};
use std::sync::Arc;

/// Standard deviation of the noise-suppression blur applied before frames are
/// compared against the background. Equivalent to a 21x21 Gaussian kernel.
pub const BLUR_SIGMA: f32 = 3.5;

/// A captured camera image.
///
/// Frames are immutable once captured and cheap to clone, so the acquisition
/// thread and the processing loop can share one without copying pixels.
#[derive(Clone, Debug)]
pub struct Frame {
    image: Arc<RgbImage>,
    captured_at: DateTime<Utc>,
    seq: u64,
}

impl Frame {
    /// Wrap `image` captured at `captured_at` as the `seq`-th frame of a session.
    pub fn new(image: RgbImage, captured_at: DateTime<Utc>, seq: u64) -> Self {
        Self {
            image: Arc::new(image),
            captured_at,
            seq,
        }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Position of this frame in the capture sequence.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Single-channel intensity view of the frame.
    pub fn gray(&self) -> GrayImage {
        image::imageops::grayscale(self.image.as_ref())
    }
}

/// Blur `gray` to suppress sensor noise before background comparison.
pub fn smooth(gray: &GrayImage) -> GrayImage {
    imageproc::filter::gaussian_blur_f32(gray, BLUR_SIGMA)
}

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Area in square pixels.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// One past the last column; wide enough that no box overflows.
    pub fn right(&self) -> u64 {
        u64::from(self.x) + u64::from(self.width)
    }

    pub fn bottom(&self) -> u64 {
        u64::from(self.y) + u64::from(self.height)
    }

    /// Whether `other` lies entirely inside this box.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Clip a signed rectangle to a `width` x `height` frame.
    ///
    /// Returns `None` when nothing of the rectangle remains inside the frame.
    pub fn clamped(x: i64, y: i64, w: i64, h: i64, width: u32, height: u32) -> Option<Self> {
        let left = x.max(0);
        let top = y.max(0);
        let right = (x + w).min(i64::from(width));
        let bottom = (y + h).min(i64::from(height));
        if right <= left || bottom <= top {
            return None;
        }
        Some(Self::new(
            left as u32,
            top as u32,
            (right - left) as u32,
            (bottom - top) as u32,
        ))
    }
}

/// What one frame cycle found.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DetectionResult {
    pub motion_detected: bool,
    pub motion_boxes: Vec<BoundingBox>,
    pub face_boxes: Vec<BoundingBox>,
}

impl DetectionResult {
    pub fn faces_detected(&self) -> bool {
        !self.face_boxes.is_empty()
    }
}
