use crate::detection::mask::mask_depth;
use crate::models::{LaneSegment, LineParam};

/// Unweighted mean of slope and intercept; `None` for an empty set
pub fn average_line(params: &[LineParam]) -> Option<LineParam> {
    if params.is_empty() {
        return None;
    }

    let (slope_sum, intercept_sum) = params
        .iter()
        .fold((0.0, 0.0), |(s, b), p| (s + p.slope, b + p.intercept));
    let n = params.len() as f64;

    Some(LineParam {
        slope: slope_sum / n,
        intercept: intercept_sum / n,
    })
}

/// Extend a line from the bottom row of the frame up to the mask depth
pub fn extrapolate(height: u32, line: &LineParam) -> LaneSegment {
    let y1 = height as i32 - 1;
    let y2 = mask_depth(height);
    let x1 = line.x_at(y1 as f64).round() as i32;
    let x2 = line.x_at(y2 as f64).round() as i32;
    LaneSegment::new(x1, y1, x2, y2)
}

/// One representative border segment for a side's candidates.
///
/// Candidates must already be filtered for near-horizontal slopes.
pub fn aggregate(height: u32, _width: u32, params: &[LineParam]) -> (bool, LaneSegment) {
    match average_line(params) {
        Some(line) => (true, extrapolate(height, &line)),
        None => (false, LaneSegment::EMPTY),
    }
}
