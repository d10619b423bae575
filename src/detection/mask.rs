use image::{GrayImage, Luma};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;

use crate::config::MaskConfig;

/// Row above which everything is horizon and gets masked out
pub fn mask_depth(height: u32) -> i32 {
    (height / 3) as i32
}

/// Builds the trapezoidal region of the frame that can contain lane borders
#[derive(Debug, Clone)]
pub struct RegionMasker {
    pub top_left_x: i32,
    pub top_right_x: i32,
    pub shoulder_rise: i32,
}

impl RegionMasker {
    pub fn new(config: &MaskConfig) -> Self {
        Self {
            top_left_x: config.top_left_x,
            top_right_x: config.top_right_x,
            shoulder_rise: config.shoulder_rise,
        }
    }

    /// Polygon vertices, bottom-left first, going counter-clockwise on
    /// screen. `turn_skew` is in pixels (already scaled). The polygon
    /// closes implicitly from the last vertex back to the first.
    pub fn polygon(&self, height: u32, width: u32, turn_skew: f64) -> Vec<(i32, i32)> {
        let bottom = height as i32 - 1;
        let right = width as i32 - 1;
        let shoulder_skew = (turn_skew / 2.0) as i32;
        let depth = mask_depth(height);
        let shoulder_y = bottom - self.shoulder_rise;

        vec![
            (0, bottom),
            (right, bottom),
            (right, shoulder_y + shoulder_skew),
            ((self.top_right_x as f64 - turn_skew) as i32, depth),
            ((self.top_left_x as f64 - turn_skew) as i32, depth),
            (0, shoulder_y - shoulder_skew),
        ]
    }
}

impl Default for RegionMasker {
    fn default() -> Self {
        Self::new(&MaskConfig::default())
    }
}

/// Mask polygon with the stock geometry
pub fn mask_polygon(height: u32, width: u32, turn_skew: f64) -> Vec<(i32, i32)> {
    RegionMasker::default().polygon(height, width, turn_skew)
}

/// Zero every pixel of `image` that lies outside `polygon`
pub fn apply_mask(image: &GrayImage, polygon: &[(i32, i32)]) -> GrayImage {
    let mut mask = GrayImage::new(image.width(), image.height());

    let mut points: Vec<Point<i32>> = polygon.iter().map(|&(x, y)| Point::new(x, y)).collect();
    // draw_polygon_mut rejects an explicitly closed ring
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if !points.is_empty() {
        draw_polygon_mut(&mut mask, &points, Luma([255u8]));
    }

    let mut masked = image.clone();
    for (pixel, mask_pixel) in masked.pixels_mut().zip(mask.pixels()) {
        pixel[0] &= mask_pixel[0];
    }
    masked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_geometry_without_skew() {
        let polygon = mask_polygon(600, 800, 0.0);
        assert_eq!(
            polygon,
            vec![(0, 599), (799, 599), (799, 449), (430, 200), (210, 200), (0, 449)]
        );

        let top: Vec<_> = polygon.iter().filter(|(_, y)| *y == 200).map(|(x, _)| *x).collect();
        assert_eq!(top.iter().min(), Some(&210));
        assert_eq!(top.iter().max(), Some(&430));
        assert_eq!(polygon.iter().map(|(_, y)| *y).min(), Some(200));
    }

    #[test]
    fn test_polygon_shifts_with_skew() {
        let polygon = mask_polygon(600, 800, 75.0);
        assert_eq!(polygon[2], (799, 449 + 37));
        assert_eq!(polygon[3], (355, 200));
        assert_eq!(polygon[4], (135, 200));
        assert_eq!(polygon[5], (0, 449 - 37));

        let polygon = mask_polygon(600, 800, -75.0);
        assert_eq!(polygon[3], (505, 200));
        assert_eq!(polygon[4], (285, 200));
        assert_eq!(polygon[2], (799, 449 - 37));
    }

    #[test]
    fn test_apply_mask_clears_horizon_and_keeps_road() {
        let image = GrayImage::from_pixel(800, 600, Luma([255u8]));
        let masked = apply_mask(&image, &mask_polygon(600, 800, 0.0));

        // Above the depth line
        assert_eq!(masked.get_pixel(400, 100)[0], 0);
        // Top corners outside the trapezoid
        assert_eq!(masked.get_pixel(10, 250)[0], 0);
        assert_eq!(masked.get_pixel(790, 250)[0], 0);
        // Road area near the bottom
        assert_eq!(masked.get_pixel(400, 550)[0], 255);
        assert_eq!(masked.get_pixel(320, 300)[0], 255);
    }

    #[test]
    fn test_apply_mask_accepts_closed_ring() {
        let image = GrayImage::from_pixel(20, 20, Luma([200u8]));
        let ring = vec![(0, 19), (19, 19), (19, 10), (0, 10), (0, 19)];
        let masked = apply_mask(&image, &ring);
        assert_eq!(masked.get_pixel(5, 15)[0], 200);
        assert_eq!(masked.get_pixel(5, 2)[0], 0);
    }
}
