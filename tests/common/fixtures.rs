use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;
use tempfile::TempDir;

pub const FRAME_WIDTH: u32 = 800;
pub const FRAME_HEIGHT: u32 = 600;

const ROAD: Rgb<u8> = Rgb([60, 60, 60]);
const PAINT: Rgb<u8> = Rgb([235, 235, 235]);

/// Half width of a painted stripe in pixels
pub const STRIPE_HALF_WIDTH: i32 = 4;

/// Left border painted from the bottom row up towards the horizon
pub const LEFT_STRIPE: ((i32, i32), (i32, i32)) = ((150, 599), (330, 220));
/// Right border painted from the bottom row up towards the horizon
pub const RIGHT_STRIPE: ((i32, i32), (i32, i32)) = ((650, 599), (470, 220));

fn paint_stripe(img: &mut RgbImage, (bottom, top): ((i32, i32), (i32, i32))) {
    let w = STRIPE_HALF_WIDTH;
    let poly = [
        Point::new(bottom.0 - w, bottom.1),
        Point::new(bottom.0 + w, bottom.1),
        Point::new(top.0 + w, top.1),
        Point::new(top.0 - w, top.1),
    ];
    draw_polygon_mut(img, &poly, PAINT);
}

/// Dark road frame with the requested border stripes painted on it
pub fn road_frame(left: bool, right: bool) -> DynamicImage {
    let mut img = RgbImage::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, ROAD);
    if left {
        paint_stripe(&mut img, LEFT_STRIPE);
    }
    if right {
        paint_stripe(&mut img, RIGHT_STRIPE);
    }
    DynamicImage::ImageRgb8(img)
}

/// x of a stripe's center line at row `y`
pub fn stripe_x_at(((x1, y1), (x2, y2)): ((i32, i32), (i32, i32)), y: i32) -> f64 {
    x1 as f64 + (y - y1) as f64 * (x2 - x1) as f64 / (y2 - y1) as f64
}

/// Writes a road frame as PNG into a fresh temp directory.
/// Returns the directory (keep alive) and the file path.
pub fn write_road_frame(name: &str, left: bool, right: bool) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join(name);
    road_frame(left, right)
        .save(&path)
        .expect("Failed to save test frame");
    (dir, path)
}
