use crate::config::ClassifierConfig;
use crate::models::{LineParam, RawSegment, Side};

/// Splits raw segments into left and right border candidates
#[derive(Debug, Clone)]
pub struct LineClassifier {
    pub horizontal_slope_limit: f64,
}

impl LineClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            horizontal_slope_limit: config.horizontal_slope_limit,
        }
    }

    /// Side a segment belongs to, or `None` if it is discarded.
    ///
    /// Only a non-positive slope can make a segment LEFT, while RIGHT is
    /// decided by position alone.
    pub fn side_of(&self, width: u32, segment: &RawSegment, line: &LineParam) -> Option<Side> {
        if line.slope.abs() <= self.horizontal_slope_limit {
            return None;
        }

        let mid = width as f64 / 2.0;
        let left_of_mid = segment.x1 as f64 <= mid && segment.x2 as f64 <= mid;
        let right_of_mid = segment.x1 as f64 > mid && segment.x2 as f64 > mid;

        if line.slope <= 0.0 && left_of_mid {
            Some(Side::Left)
        } else if right_of_mid {
            Some(Side::Right)
        } else {
            None
        }
    }

    /// Returns `(left, right)` line parameters
    pub fn classify(
        &self,
        _height: u32,
        width: u32,
        segments: &[RawSegment],
    ) -> (Vec<LineParam>, Vec<LineParam>) {
        let mut left = Vec::new();
        let mut right = Vec::new();

        for segment in segments {
            let Some(line) = LineParam::fit(segment) else {
                continue;
            };
            match self.side_of(width, segment, &line) {
                Some(Side::Left) => left.push(line),
                Some(Side::Right) => right.push(line),
                None => {}
            }
        }

        (left, right)
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}
