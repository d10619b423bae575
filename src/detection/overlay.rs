use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

use crate::models::{DetectionResult, LaneSegment};

const CURRENT: Rgb<u8> = Rgb([0, 255, 0]);
const FALLBACK: Rgb<u8> = Rgb([255, 160, 0]);

fn draw_segment(canvas: &mut RgbImage, segment: &LaneSegment, color: Rgb<u8>) {
    if segment.is_empty() {
        return;
    }
    // Three parallel strokes so the line survives downscaled previews
    for offset in -1..=1 {
        let o = offset as f32;
        draw_line_segment_mut(
            canvas,
            (segment.x1 as f32 + o, segment.y1 as f32),
            (segment.x2 as f32 + o, segment.y2 as f32),
            color,
        );
    }
}

/// Frame with this frame's borders in green; sides that fell back to
/// memory are drawn in orange instead.
pub fn draw_borders(frame: &DynamicImage, result: &DetectionResult) -> RgbImage {
    let mut canvas = frame.to_rgb8();

    let sides = [
        (result.found_left, &result.left, &result.latest_valid_left),
        (result.found_right, &result.right, &result.latest_valid_right),
    ];
    for (found, current, fallback) in sides {
        if found {
            draw_segment(&mut canvas, current, CURRENT);
        } else {
            draw_segment(&mut canvas, fallback, FALLBACK);
        }
    }

    canvas
}
