use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};
use imageproc::distance_transform::Norm;

use crate::BoundingBox;

/// Intensity difference at which a pixel counts as changed.
pub const DEFAULT_THRESHOLD: u8 = 25;
/// Smallest bounding box area, in square pixels, reported as motion.
pub const DEFAULT_MIN_AREA: u64 = 5000;
/// Radius of the square structuring element used to close gaps.
pub const DILATE_RADIUS: u8 = 1;
/// Number of dilation passes.
pub const DILATE_ITERATIONS: u8 = 2;

const FOREGROUND: Luma<u8> = Luma([255]);
const BACKGROUND: Luma<u8> = Luma([0]);

/// Extracts motion regions from a background difference grid.
#[derive(Clone, Copy, Debug)]
pub struct MotionDetector {
    threshold: u8,
    min_area: u64,
}

impl Default for MotionDetector {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, DEFAULT_MIN_AREA)
    }
}

impl MotionDetector {
    pub fn new(threshold: u8, min_area: u64) -> Self {
        Self {
            threshold,
            min_area,
        }
    }

    pub fn min_area(&self) -> u64 {
        self.min_area
    }

    /// Find changed regions in `diff`.
    ///
    /// Returns whether any region survived the area filter together with the
    /// surviving bounding boxes, in no particular order.
    pub fn detect(&self, diff: &GrayImage) -> (bool, Vec<BoundingBox>) {
        let mask = self.foreground_mask(diff);
        // contour tracing mislabels regions touching the image edge, so trace
        // a copy framed by one pixel of background and shift the boxes back
        let (w, h) = mask.dimensions();
        let mut framed = GrayImage::new(w + 2, h + 2);
        image::imageops::replace(&mut framed, &mask, 1, 1);
        let boxes: Vec<BoundingBox> = find_contours::<u32>(&framed)
            .into_iter()
            // outermost borders only; holes and anything nested inside them are ignored
            .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
            .filter_map(|c| bounding_box(&c.points))
            .map(|b| BoundingBox::new(b.x - 1, b.y - 1, b.width, b.height))
            .filter(|b| b.area() >= self.min_area)
            .collect();
        (!boxes.is_empty(), boxes)
    }

    /// Binarise and dilate `diff` into a foreground mask.
    pub fn foreground_mask(&self, diff: &GrayImage) -> GrayImage {
        let threshold = self.threshold;
        let binary = imageproc::map::map_colors(diff, |p: Luma<u8>| {
            if p[0] >= threshold {
                FOREGROUND
            } else {
                BACKGROUND
            }
        });
        // repeated L-inf dilations compose into one with the summed radius
        imageproc::morphology::dilate(&binary, Norm::LInf, DILATE_RADIUS * DILATE_ITERATIONS)
    }
}

fn bounding_box(points: &[imageproc::point::Point<u32>]) -> Option<BoundingBox> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(BoundingBox::new(
        min_x,
        min_y,
        max_x - min_x + 1,
        max_y - min_y + 1,
    ))
}
