//! Crash Flight - simulation and rendering engine for a crash-game flight
//!
//! Core modules:
//! - `sim`: Deterministic round engine (phases, multiplier curve, history)
//! - `scene`: Per-frame visuals (viewport, plane animation, effects, curve)
//! - `renderer`: Render-layer capability traits and a tessellating reference surface
//! - `platform`: Browser/native platform abstraction (logging)
//! - `settings`: Quality presets and device-class profiles

pub mod platform;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod sim;

pub use scene::{SceneHandle, SceneOrchestrator};
pub use settings::{DeviceClass, DeviceProfile, QualityPreset, Settings};
pub use sim::{RoundEngine, RoundPhase, RoundSnapshot};

/// Engine configuration constants
pub mod consts {
    use std::time::Duration;

    /// Fixed round-engine tick rate (10 ms per tick)
    pub const TICK_RATE_HZ: u32 = 100;
    /// Duration of one engine tick
    pub const TICK_DURATION: Duration = Duration::from_millis(10);
    /// Maximum ticks run by one `advance` call to prevent spiral of death
    pub const MAX_TICKS_PER_ADVANCE: u32 = 1000;

    /// Multiplier growth rate: M(t) = exp(GROWTH_RATE * t)
    pub const GROWTH_RATE: f64 = 0.065;
    /// Betting countdown length (seconds)
    pub const BETTING_SECONDS: f64 = 5.0;
    /// Time spent showing the crash before the next round (seconds)
    pub const CRASHED_SECONDS: f64 = 3.0;
    /// Rounds kept in the history strip (also the upper bound for config)
    pub const HISTORY_LEN: usize = 20;
    /// Slowest accepted multiplier growth rate (100x after ~77 minutes)
    pub const MIN_GROWTH_RATE: f64 = 0.001;
    /// Longest accepted betting or crashed phase (seconds)
    pub const MAX_PHASE_SECONDS: f64 = 3600.0;

    /// Crash point bounds
    pub const MIN_CRASH_POINT: f64 = 1.0;
    pub const MAX_CRASH_POINT: f64 = 100.0;
    /// Probability that a round crashes instantly at 1.00x
    pub const INSTANT_CRASH_CHANCE: f64 = 0.01;
    /// House edge numerator of the crash distribution
    pub const CRASH_EDGE: f64 = 0.99;

    /// Default viewport windows
    pub const DEFAULT_TIME_WINDOW: f32 = 10.0;
    pub const DEFAULT_MULT_WINDOW: f32 = 2.0;
    /// Windows grow once a value passes this fraction of the window
    pub const WINDOW_EXPAND_AT: f32 = 0.8;

    /// Surfaces narrower than this are treated as mobile
    pub const MOBILE_BREAKPOINT: u32 = 768;

    /// Assumed frame delta when the host does not supply one
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Frame deltas above this are clamped (tab switches, debugger pauses)
    pub const MAX_FRAME_DT: f32 = 0.1;
}

/// Round to 2 decimal places (multiplier display precision)
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Frame-rate independent smoothing factor: `1 - e^(-rate * dt)`
///
/// `current += (target - current) * smoothing(rate, dt)` converges at the
/// same wall-clock speed regardless of how often it runs.
#[inline]
pub fn smoothing(rate: f32, dt: f32) -> f32 {
    1.0 - (-rate * dt).exp()
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Ease-out cubic on [0, 1]
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235_1), 1.24);
        assert_eq!(round2(2.0), 2.0);
    }

    #[test]
    fn test_smoothing_is_frame_rate_independent() {
        // Two half steps must land where one full step does
        let rate = 10.0;
        let mut a = 0.0_f32;
        a += (1.0 - a) * smoothing(rate, 0.02);
        let mut b = 0.0_f32;
        b += (1.0 - b) * smoothing(rate, 0.01);
        b += (1.0 - b) * smoothing(rate, 0.01);
        assert!((a - b).abs() < 1e-5);
    }

    #[test]
    fn test_ease_out_cubic_bounds() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(ease_out_cubic(2.0), 1.0);
        assert!(ease_out_cubic(0.5) > 0.5);
    }
}
