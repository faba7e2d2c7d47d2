use chrono::{DateTime, Local, Utc};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use rusttype::{Font, Scale};
use std::io;
use std::path::Path;

use crate::{BoundingBox, DetectionResult, Frame, VisionError};

pub const MOTION_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const FACE_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
/// Outline width in pixels.
pub const LINE_WIDTH: u32 = 2;

/// Layout of the burned-in capture time.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TIMESTAMP_ORIGIN: (i32, i32) = (20, 16);
const TIMESTAMP_SIZE: f32 = 16.0;
const TIMESTAMP_TEXT: Rgb<u8> = Rgb([255, 255, 255]);
const TIMESTAMP_OUTLINE: Rgb<u8> = Rgb([0, 0, 0]);

/// Writes a frame's local capture time into its top-left corner.
pub struct Timestamp {
    font: Font<'static>,
    scale: Scale,
}

impl Timestamp {
    /// Load the TrueType font at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, VisionError> {
        let path = path.as_ref();
        let load_err = |source| VisionError::FontLoad {
            path: path.display().to_string(),
            source,
        };
        let bytes = std::fs::read(path).map_err(load_err)?;
        let font = Font::try_from_vec(bytes).ok_or_else(|| {
            load_err(io::Error::new(io::ErrorKind::InvalidData, "not a TrueType font"))
        })?;
        Ok(Self {
            font,
            scale: Scale::uniform(TIMESTAMP_SIZE),
        })
    }

    /// Draw `at` as white text over a black outline.
    pub fn draw(&self, canvas: &mut RgbImage, at: DateTime<Utc>) {
        let text = at.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string();
        let (x, y) = TIMESTAMP_ORIGIN;
        for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
            draw_text_mut(canvas, TIMESTAMP_OUTLINE, x + dx, y + dy, self.scale, &self.font, &text);
        }
        draw_text_mut(canvas, TIMESTAMP_TEXT, x, y, self.scale, &self.font, &text);
    }
}

/// Copy of `frame` with motion boxes outlined in green and faces in blue,
/// plus the capture time when a [`Timestamp`] is given.
pub fn annotate(frame: &Frame, result: &DetectionResult, stamp: Option<&Timestamp>) -> RgbImage {
    let mut canvas = frame.image().clone();
    if let Some(stamp) = stamp {
        stamp.draw(&mut canvas, frame.captured_at());
    }
    for b in &result.motion_boxes {
        outline(&mut canvas, b, MOTION_COLOR);
    }
    for b in &result.face_boxes {
        outline(&mut canvas, b, FACE_COLOR);
    }
    canvas
}

fn outline(canvas: &mut RgbImage, b: &BoundingBox, color: Rgb<u8>) {
    for inset in 0..LINE_WIDTH {
        let (Some(w), Some(h)) = (
            b.width.checked_sub(2 * inset),
            b.height.checked_sub(2 * inset),
        ) else {
            break;
        };
        if w == 0 || h == 0 {
            break;
        }
        let rect = Rect::at((b.x + inset) as i32, (b.y + inset) as i32).of_size(w, h);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outlines_without_touching_source() {
        let frame = Frame::new(RgbImage::new(50, 50), Utc::now(), 1);
        let result = DetectionResult {
            motion_detected: true,
            motion_boxes: vec![BoundingBox::new(10, 10, 20, 20)],
            face_boxes: vec![BoundingBox::new(40, 40, 1, 1)],
        };
        let out = annotate(&frame, &result, None);
        assert_eq!(*out.get_pixel(10, 10), MOTION_COLOR);
        assert_eq!(*out.get_pixel(11, 15), MOTION_COLOR);
        assert_eq!(*out.get_pixel(15, 15), Rgb([0, 0, 0]));
        assert_eq!(*out.get_pixel(40, 40), FACE_COLOR);
        assert_eq!(*frame.image().get_pixel(10, 10), Rgb([0, 0, 0]));
    }

    const SYSTEM_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

    fn top_left_changed(out: &RgbImage, gray: u8) -> usize {
        (0..40u32)
            .flat_map(|y| (0..200u32).map(move |x| (x, y)))
            .filter(|&(x, y)| *out.get_pixel(x, y) != Rgb([gray, gray, gray]))
            .count()
    }

    #[test]
    fn timestamp_marks_top_left_corner() {
        if !Path::new(SYSTEM_FONT).exists() {
            eprintln!("{SYSTEM_FONT} not installed, skipping");
            return;
        }
        let stamp = Timestamp::from_path(SYSTEM_FONT).unwrap();
        let frame = Frame::new(RgbImage::from_pixel(320, 240, Rgb([128, 128, 128])), Utc::now(), 1);
        let result = DetectionResult::default();

        assert_eq!(top_left_changed(&annotate(&frame, &result, None), 128), 0);
        let out = annotate(&frame, &result, Some(&stamp));
        assert!(top_left_changed(&out, 128) > 50);
        assert!(out.pixels().any(|p| p[0] > 200 && p[1] > 200 && p[2] > 200));
        assert!(out.pixels().any(|p| p[0] < 50));
        assert_eq!(*out.get_pixel(300, 200), Rgb([128, 128, 128]));
    }

    #[test]
    fn rejects_non_font_file() {
        let dir = std::env::temp_dir().join(format!("annotate-font-{}", std::process::id()));
        std::fs::write(&dir, b"definitely not a font").unwrap();
        let err = Timestamp::from_path(&dir).err();
        std::fs::remove_file(&dir).unwrap();
        assert!(matches!(err, Some(VisionError::FontLoad { .. })));
        assert!(matches!(
            Timestamp::from_path("/nonexistent/font.ttf"),
            Err(VisionError::FontLoad { .. })
        ));
    }
}
