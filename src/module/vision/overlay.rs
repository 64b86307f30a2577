//! Detection overlay rendering.
//!
//! Bounding boxes from the winning tier are drawn onto the captured frame
//! so the front end shows what was recognized, not just the raw capture.
//! Detections come back in the model's square input space and are scaled
//! to the frame size here.

use std::error::Error;

use image::{Rgb, RgbImage};

use super::detector::Detection;

// Box palette, cycled by class id.
const BOX_COLORS: [Rgb<u8>; 4] = [
    Rgb([0, 200, 0]),
    Rgb([220, 40, 40]),
    Rgb([40, 90, 220]),
    Rgb([220, 180, 0]),
];
const BOX_THICKNESS: u32 = 2;

/// Draw `detections` onto the image at `impath` and write the annotated
/// frame to `outpath`.
pub fn render(
    impath: &str,
    detections: &[Detection],
    imgsz: u32,
    outpath: &str,
) -> Result<(), Box<dyn Error>> {
    let mut img = image::open(impath)?.to_rgb8();
    draw_detections(&mut img, detections, imgsz);
    img.save(outpath)?;
    Ok(())
}

/// Scale each box from the model's input space onto the frame and stroke
/// its outline.
pub fn draw_detections(img: &mut RgbImage, detections: &[Detection], imgsz: u32) {
    let (w, h) = img.dimensions();
    let sx = w as f32 / imgsz.max(1) as f32;
    let sy = h as f32 / imgsz.max(1) as f32;
    for det in detections {
        let color = BOX_COLORS[det.cls as usize % BOX_COLORS.len()];
        let x1 = scale(det.x1, sx, w);
        let y1 = scale(det.y1, sy, h);
        let x2 = scale(det.x2, sx, w);
        let y2 = scale(det.y2, sy, h);
        draw_box(img, x1, y1, x2, y2, color);
    }
}

fn scale(v: u32, factor: f32, limit: u32) -> u32 {
    ((v as f32 * factor) as u32).min(limit.saturating_sub(1))
}

fn draw_box(img: &mut RgbImage, x1: u32, y1: u32, x2: u32, y2: u32, color: Rgb<u8>) {
    let (x1, x2) = (x1.min(x2), x1.max(x2));
    let (y1, y2) = (y1.min(y2), y1.max(y2));
    for t in 0..BOX_THICKNESS {
        for x in x1..=x2 {
            put(img, x, y1 + t, color);
            put(img, x, y2.saturating_sub(t), color);
        }
        for y in y1..=y2 {
            put(img, x1 + t, y, color);
            put(img, x2.saturating_sub(t), y, color);
        }
    }
}

fn put(img: &mut RgbImage, x: u32, y: u32, color: Rgb<u8>) {
    if x < img.width() && y < img.height() {
        img.put_pixel(x, y, color);
    }
}
