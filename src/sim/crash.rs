//! Crash point generation
//!
//! Heavy-tailed distribution: 1% of rounds crash instantly at 1.00x, the
//! rest follow `0.99 / (1 - r)` clamped to [1.00, 100.00]. Not a provably
//! fair scheme, just a seeded PRNG.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::round2;

/// Map two uniform draws in [0, 1) to a crash point
///
/// `instant_roll` decides the instant-crash case, `r` shapes the tail.
pub fn crash_point_from_draws(instant_roll: f64, r: f64) -> f64 {
    if instant_roll < INSTANT_CRASH_CHANCE {
        return MIN_CRASH_POINT;
    }
    let raw = CRASH_EDGE / (1.0 - r);
    round2(raw.clamp(MIN_CRASH_POINT, MAX_CRASH_POINT))
}

/// Supplies the crash point for each new round
pub trait CrashPointSource {
    /// Draw the crash point for the round about to start
    fn next_crash_point(&mut self) -> f64;
}

/// Seeded PRNG source
#[derive(Debug, Clone)]
pub struct SeededCrashPoints {
    rng: Pcg32,
}

impl SeededCrashPoints {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl CrashPointSource for SeededCrashPoints {
    fn next_crash_point(&mut self) -> f64 {
        let instant_roll: f64 = self.rng.random();
        let r: f64 = self.rng.random();
        crash_point_from_draws(instant_roll, r)
    }
}

/// Replays a fixed list of crash points, cycling when exhausted
#[derive(Debug, Clone)]
pub struct FixedCrashPoints {
    points: Vec<f64>,
    next: usize,
}

impl FixedCrashPoints {
    pub fn new(points: Vec<f64>) -> Self {
        Self { points, next: 0 }
    }

    /// Every round crashes at the same point
    pub fn always(point: f64) -> Self {
        Self::new(vec![point])
    }
}

impl CrashPointSource for FixedCrashPoints {
    fn next_crash_point(&mut self) -> f64 {
        if self.points.is_empty() {
            return MIN_CRASH_POINT;
        }
        let point = self.points[self.next % self.points.len()];
        self.next = self.next.wrapping_add(1);
        round2(point.clamp(MIN_CRASH_POINT, MAX_CRASH_POINT))
    }
}
