use image::{GrayImage, Luma, Rgb, RgbImage};
use vision::frame::smooth;
use vision::{BackgroundModel, BoundingBox, Frame, MotionDetector};

const W: u32 = 400;
const H: u32 = 300;

fn frame_with_block(base: u8, block: Option<(u32, u32, u32, u8)>) -> Frame {
    let img = RgbImage::from_fn(W, H, |x, y| match block {
        Some((bx, by, size, v)) if x >= bx && x < bx + size && y >= by && y < by + size => {
            Rgb([v, v, v])
        }
        _ => Rgb([base, base, base]),
    });
    Frame::new(img, chrono::Utc::now(), 0)
}

fn smoothed(frame: &Frame) -> GrayImage {
    smooth(&frame.gray())
}

#[test]
fn block_on_static_scene_is_one_region() {
    let mut model = BackgroundModel::new(0.05);
    let detector = MotionDetector::default();
    let still = frame_with_block(100, None);
    assert!(model.absorb(&smoothed(&still)).unwrap().is_none());
    let diff = model.absorb(&smoothed(&still)).unwrap().unwrap();
    assert_eq!(detector.detect(&diff), (false, vec![]));

    let moved = frame_with_block(100, Some((100, 50, 200, 250)));
    let diff = model.absorb(&smoothed(&moved)).unwrap().unwrap();
    let (motion, boxes) = detector.detect(&diff);
    assert!(motion);
    assert_eq!(boxes.len(), 1);
    let b = boxes[0];
    let around = BoundingBox::new(80, 30, 240, 240);
    assert!(around.contains(&b), "{b:?}");
    assert!(b.area() >= 180 * 180, "{b:?}");
}

#[test]
fn small_regions_are_filtered() {
    let detector = MotionDetector::new(25, 5000);
    let mut diff = GrayImage::new(W, H);
    // 30x30 blob: well under 5000 px even after dilation
    for y in 10..40 {
        for x in 10..40 {
            diff.put_pixel(x, y, Luma([255]));
        }
    }
    // 100x80 blob survives
    for y in 150..230 {
        for x in 200..300 {
            diff.put_pixel(x, y, Luma([90]));
        }
    }
    let (motion, boxes) = detector.detect(&diff);
    assert!(motion);
    assert_eq!(boxes.len(), 1);
    assert!(boxes.iter().all(|b| b.area() >= detector.min_area()));
}

#[test]
fn never_reports_boxes_below_min_area() {
    let mut diff = GrayImage::new(W, H);
    let sizes = [(5, 5, 12), (60, 20, 45), (120, 140, 70), (250, 30, 90)];
    for &(x0, y0, s) in &sizes {
        for y in y0..y0 + s {
            for x in x0..x0 + s {
                diff.put_pixel(x, y, Luma([200]));
            }
        }
    }
    for min_area in [1, 500, 2500, 5000, 9000, 100_000] {
        let detector = MotionDetector::new(25, min_area);
        let (motion, boxes) = detector.detect(&diff);
        assert_eq!(motion, !boxes.is_empty());
        assert!(boxes.iter().all(|b| b.area() >= min_area));
    }
}

#[test]
fn nearby_fragments_merge() {
    let detector = MotionDetector::new(25, 1);
    let mut diff = GrayImage::new(100, 100);
    for y in 20..60 {
        for x in 20..40 {
            diff.put_pixel(x, y, Luma([100]));
        }
        // three pixel gap closed by dilation
        for x in 43..60 {
            diff.put_pixel(x, y, Luma([100]));
        }
    }
    let (_, boxes) = detector.detect(&diff);
    assert_eq!(boxes.len(), 1);
}

#[test]
fn below_threshold_is_quiet() {
    let detector = MotionDetector::default();
    let diff = GrayImage::from_pixel(W, H, Luma([24]));
    assert_eq!(detector.detect(&diff), (false, vec![]));
}

fn fill(diff: &mut GrayImage, x0: u32, y0: u32, w: u32, h: u32) {
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            diff.put_pixel(x, y, Luma([255]));
        }
    }
}

#[test]
fn region_touching_edge_is_reported() {
    let detector = MotionDetector::default();
    let mut diff = GrayImage::new(W, H);
    fill(&mut diff, 0, 0, 100, 100);
    let (motion, boxes) = detector.detect(&diff);
    assert!(motion);
    assert_eq!(boxes, vec![BoundingBox::new(0, 0, 102, 102)]);
}

#[test]
fn regions_in_opposite_corners_are_both_reported() {
    let detector = MotionDetector::default();
    let mut diff = GrayImage::new(W, H);
    fill(&mut diff, 0, 0, 100, 100);
    fill(&mut diff, W - 100, H - 100, 100, 100);
    let (motion, mut boxes) = detector.detect(&diff);
    assert!(motion);
    boxes.sort_by_key(|b| b.x);
    assert_eq!(
        boxes,
        vec![
            BoundingBox::new(0, 0, 102, 102),
            BoundingBox::new(W - 102, H - 102, 102, 102),
        ]
    );
}

#[test]
fn whole_frame_change_is_one_region() {
    let detector = MotionDetector::default();
    let diff = GrayImage::from_pixel(120, 100, Luma([255]));
    assert_eq!(
        detector.detect(&diff),
        (true, vec![BoundingBox::new(0, 0, 120, 100)])
    );
}

#[test]
fn edge_region_does_not_hide_interior_region() {
    let mut model = BackgroundModel::new(0.05);
    let detector = MotionDetector::default();
    let still = frame_with_block(100, None);
    model.absorb(&smoothed(&still)).unwrap();

    let img = RgbImage::from_fn(W, H, |x, y| {
        let edge = x < 150 && y < 200;
        let interior = (250..350).contains(&x) && (100..200).contains(&y);
        if edge || interior {
            Rgb([250, 250, 250])
        } else {
            Rgb([100, 100, 100])
        }
    });
    let moved = Frame::new(img, chrono::Utc::now(), 1);
    let diff = model.absorb(&smoothed(&moved)).unwrap().unwrap();
    let (motion, mut boxes) = detector.detect(&diff);
    assert!(motion);
    assert_eq!(boxes.len(), 2, "{boxes:?}");
    boxes.sort_by_key(|b| b.x);
    assert_eq!((boxes[0].x, boxes[0].y), (0, 0));
    assert!(BoundingBox::new(230, 80, 140, 140).contains(&boxes[1]), "{:?}", boxes[1]);
}
