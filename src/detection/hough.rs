//! Progressive probabilistic Hough transform.
//!
//! Edge pixels are visited in a pseudo-random order. Each one votes into a
//! (theta, rho) accumulator; when its strongest bin reaches the threshold,
//! the corresponding line is walked from that pixel in both directions
//! over the remaining edge pixels, tolerating short gaps. Walked pixels
//! leave the edge set, and if the walk was long enough to form a segment
//! their votes are withdrawn so the same line is not reported twice.

use image::GrayImage;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::config::HoughConfig;
use crate::error::{LaneError, Result};
use crate::models::RawSegment;

/// Fixed-point shift used while stepping along a line
const SHIFT: u32 = 16;

/// Upper bound on accumulator cells (256 MiB of votes)
const MAX_ACCUMULATOR_CELLS: usize = 1 << 26;

pub struct ProbabilisticHough {
    rho: f64,
    theta: f64,
    threshold: u32,
    min_line_length: i32,
    max_line_gap: i32,
    seed: u64,
}

struct Accumulator {
    num_rho: usize,
    /// cos/sin of every angle, already divided by rho
    trig: Vec<(f64, f64)>,
    votes: Vec<u32>,
}

impl Accumulator {
    fn new(width: u32, height: u32, rho: f64, theta: f64) -> Result<Self> {
        let num_angle = ((std::f64::consts::PI / theta).round() as usize).max(1);
        let diagonal = (width as u64 + height as u64) * 2 + 1;
        let num_rho = ((diagonal as f64 / rho).round() as usize).max(1);
        let cells = num_angle
            .checked_mul(num_rho)
            .filter(|&cells| cells <= MAX_ACCUMULATOR_CELLS)
            .ok_or(LaneError::AccumulatorTooLarge { num_angle, num_rho })?;

        let irho = 1.0 / rho;
        let trig = (0..num_angle)
            .map(|n| {
                let angle = n as f64 * theta;
                (angle.cos() * irho, angle.sin() * irho)
            })
            .collect();
        Ok(Self {
            num_rho,
            trig,
            votes: vec![0; cells],
        })
    }

    fn rho_index(&self, n: usize, x: i32, y: i32) -> usize {
        let (c, s) = self.trig[n];
        let r = (x as f64 * c + y as f64 * s).round() as i64 + (self.num_rho as i64 - 1) / 2;
        r.clamp(0, self.num_rho as i64 - 1) as usize
    }

    /// Add the votes of one pixel; returns the strongest (votes, angle index)
    fn vote(&mut self, x: i32, y: i32) -> (u32, usize) {
        let mut best = (0, 0);
        for n in 0..self.trig.len() {
            let idx = n * self.num_rho + self.rho_index(n, x, y);
            self.votes[idx] += 1;
            if self.votes[idx] > best.0 {
                best = (self.votes[idx], n);
            }
        }
        best
    }

    fn unvote(&mut self, x: i32, y: i32) {
        for n in 0..self.trig.len() {
            let idx = n * self.num_rho + self.rho_index(n, x, y);
            self.votes[idx] = self.votes[idx].saturating_sub(1);
        }
    }
}

/// Stepper along a line in fixed point. Exactly one axis advances by a
/// whole pixel per step; the other carries `SHIFT` fractional bits.
#[derive(Clone, Copy)]
struct Walk {
    x_major: bool,
    x0: i64,
    y0: i64,
    dx: i64,
    dy: i64,
}

impl Walk {
    fn new(cos: f64, sin: f64, x: i32, y: i32) -> Self {
        // Direction along the line is perpendicular to its normal
        let a = -sin;
        let b = cos;
        let half = 1i64 << (SHIFT - 1);
        if a.abs() > b.abs() {
            Self {
                x_major: true,
                x0: x as i64,
                y0: ((y as i64) << SHIFT) + half,
                dx: if a > 0.0 { 1 } else { -1 },
                dy: (b * (1i64 << SHIFT) as f64 / a.abs()).round() as i64,
            }
        } else {
            Self {
                x_major: false,
                x0: ((x as i64) << SHIFT) + half,
                y0: y as i64,
                dx: (a * (1i64 << SHIFT) as f64 / b.abs()).round() as i64,
                dy: if b > 0.0 { 1 } else { -1 },
            }
        }
    }

    fn reversed(&self) -> Self {
        Self {
            dx: -self.dx,
            dy: -self.dy,
            ..*self
        }
    }

    fn pixel(&self, x: i64, y: i64) -> (i64, i64) {
        if self.x_major {
            (x, y >> SHIFT)
        } else {
            (x >> SHIFT, y)
        }
    }
}

impl ProbabilisticHough {
    pub fn new(config: &HoughConfig) -> Self {
        Self {
            rho: config.rho,
            theta: config.theta,
            threshold: config.threshold,
            min_line_length: config.min_line_length,
            max_line_gap: config.max_line_gap,
            seed: config.seed,
        }
    }

    /// Extract line segments from a binary edge image (non-zero = edge).
    /// Fails only when the accumulator for this frame size would be too large.
    pub fn detect(&self, edges: &GrayImage) -> Result<Vec<RawSegment>> {
        let (width, height) = edges.dimensions();
        let mut segments = Vec::new();
        if width == 0 || height == 0 {
            return Ok(segments);
        }

        let mut mask: Vec<bool> = edges.pixels().map(|p| p[0] != 0).collect();
        let mut points: Vec<(i32, i32)> = edges
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] != 0)
            .map(|(x, y, _)| (x as i32, y as i32))
            .collect();

        let mut rng = StdRng::seed_from_u64(self.seed);
        points.shuffle(&mut rng);

        let mut accum = Accumulator::new(width, height, self.rho, self.theta)?;
        let (w, h) = (width as i64, height as i64);
        let at = |x: i64, y: i64| (y * w + x) as usize;

        for &(px, py) in &points {
            if !mask[at(px as i64, py as i64)] {
                continue;
            }

            let (max_votes, max_n) = accum.vote(px, py);
            if max_votes < self.threshold {
                continue;
            }

            let (cos, sin) = accum.trig[max_n];
            let forward = Walk::new(cos, sin, px, py);
            let walks = [forward, forward.reversed()];

            // First pass: find how far the line extends each way
            let mut ends = [(px as i64, py as i64); 2];
            for (k, walk) in walks.iter().enumerate() {
                let (mut x, mut y) = (walk.x0, walk.y0);
                let mut gap = 0;
                loop {
                    let (cx, cy) = walk.pixel(x, y);
                    if cx < 0 || cx >= w || cy < 0 || cy >= h {
                        break;
                    }
                    if mask[at(cx, cy)] {
                        gap = 0;
                        ends[k] = (cx, cy);
                    } else {
                        gap += 1;
                        if gap > self.max_line_gap {
                            break;
                        }
                    }
                    x += walk.dx;
                    y += walk.dy;
                }
            }

            let good_line = (ends[1].0 - ends[0].0).abs() >= self.min_line_length as i64
                || (ends[1].1 - ends[0].1).abs() >= self.min_line_length as i64;

            // Second pass: consume the walked pixels
            for (k, walk) in walks.iter().enumerate() {
                let (mut x, mut y) = (walk.x0, walk.y0);
                loop {
                    let (cx, cy) = walk.pixel(x, y);
                    let idx = at(cx, cy);
                    if mask[idx] {
                        if good_line {
                            accum.unvote(cx as i32, cy as i32);
                        }
                        mask[idx] = false;
                    }
                    if (cx, cy) == ends[k] {
                        break;
                    }
                    x += walk.dx;
                    y += walk.dy;
                }
            }

            if good_line {
                segments.push(RawSegment::new(
                    ends[0].0 as i32,
                    ends[0].1 as i32,
                    ends[1].0 as i32,
                    ends[1].1 as i32,
                ));
            }
        }

        Ok(segments)
    }
}

impl Default for ProbabilisticHough {
    fn default() -> Self {
        Self::new(&HoughConfig::default())
    }
}
