use crate::models::{LaneSegment, Side};

/// Last confidently detected border per side.
///
/// Starts out empty and is only ever overwritten by a successful
/// detection, so a stale value stays the fallback until superseded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BorderMemory {
    last_valid_left: LaneSegment,
    last_valid_right: LaneSegment,
}

impl BorderMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, side: Side, present: bool, segment: LaneSegment) {
        if !present {
            return;
        }
        match side {
            Side::Left => self.last_valid_left = segment,
            Side::Right => self.last_valid_right = segment,
        }
    }

    pub fn get(&self, side: Side) -> LaneSegment {
        match side {
            Side::Left => self.last_valid_left,
            Side::Right => self.last_valid_right,
        }
    }
}
