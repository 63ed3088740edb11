//! Round state and core simulation types
//!
//! `RoundState` is owned and mutated only by the engine; everything outside
//! `sim` sees a [`RoundSnapshot`] copy.

use serde::{Deserialize, Serialize};

use super::history::{HistoryEntry, RoundHistory};
use crate::consts::*;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Engine constructed, not started
    #[default]
    Idle,
    /// Countdown before takeoff, bets accepted
    Betting,
    /// Plane is climbing, multiplier growing
    Flying,
    /// Round ended at the crash point
    Crashed,
}

impl RoundPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundPhase::Idle => "idle",
            RoundPhase::Betting => "betting",
            RoundPhase::Flying => "flying",
            RoundPhase::Crashed => "crashed",
        }
    }
}

/// Tunable round timing and curve parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// k in M(t) = exp(k * t)
    pub growth_rate: f64,
    pub betting_seconds: f64,
    pub crashed_seconds: f64,
    /// Maximum history entries kept
    pub history_len: usize,
    /// Wall-clock milliseconds at engine time zero (history timestamps)
    pub epoch_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            growth_rate: GROWTH_RATE,
            betting_seconds: BETTING_SECONDS,
            crashed_seconds: CRASHED_SECONDS,
            history_len: HISTORY_LEN,
            epoch_ms: 0,
        }
    }
}

impl EngineConfig {
    /// Copy with every out-of-range field replaced by a usable value
    ///
    /// Non-finite or too-slow growth rates and non-finite phase lengths fall
    /// back to the defaults; phase lengths are bounded to
    /// [0, `MAX_PHASE_SECONDS`] and history to `HISTORY_LEN`.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let mut config = self.clone();

        if !config.growth_rate.is_finite() || config.growth_rate < MIN_GROWTH_RATE {
            log::warn!(
                "growth_rate {} out of range, using {}",
                config.growth_rate,
                defaults.growth_rate
            );
            config.growth_rate = defaults.growth_rate;
        }
        config.betting_seconds =
            phase_seconds("betting_seconds", config.betting_seconds, defaults.betting_seconds);
        config.crashed_seconds =
            phase_seconds("crashed_seconds", config.crashed_seconds, defaults.crashed_seconds);
        if config.history_len > HISTORY_LEN {
            log::warn!(
                "history_len {} exceeds {}, clamping",
                config.history_len,
                HISTORY_LEN
            );
            config.history_len = HISTORY_LEN;
        }
        config
    }

    /// Betting phase length in ticks
    pub fn betting_ticks(&self) -> u64 {
        seconds_to_ticks(self.betting_seconds)
    }

    /// Crashed phase length in ticks
    pub fn crashed_ticks(&self) -> u64 {
        seconds_to_ticks(self.crashed_seconds)
    }
}

fn phase_seconds(name: &str, seconds: f64, default: f64) -> f64 {
    if !seconds.is_finite() {
        log::warn!("{} {} is not finite, using {}", name, seconds, default);
        return default;
    }
    seconds.clamp(0.0, MAX_PHASE_SECONDS)
}

#[inline]
fn seconds_to_ticks(seconds: f64) -> u64 {
    (seconds.max(0.0) * TICK_RATE_HZ as f64).round() as u64
}

/// Convert a tick count to seconds
#[inline]
pub fn ticks_to_seconds(ticks: u64) -> f64 {
    ticks as f64 / TICK_RATE_HZ as f64
}

/// Complete round state (engine-private)
#[derive(Debug, Clone)]
pub struct RoundState {
    pub phase: RoundPhase,
    /// Current multiplier (>= 1.0, non-decreasing while flying)
    pub multiplier: f64,
    /// Remaining betting time (seconds)
    pub countdown_seconds: f64,
    /// Ticks since the current phase began
    pub phase_ticks: u64,
    /// Ticks since the engine started
    pub total_ticks: u64,
    pub history: RoundHistory,
    /// Target multiplier of the current round, never published before the crash
    pub crash_point: f64,
    /// Id the current round will get when it completes
    pub round_id: u64,
}

impl RoundState {
    pub fn new(history_len: usize) -> Self {
        Self {
            phase: RoundPhase::Idle,
            multiplier: 1.0,
            countdown_seconds: 0.0,
            phase_ticks: 0,
            total_ticks: 0,
            history: RoundHistory::with_capacity(history_len),
            crash_point: MIN_CRASH_POINT,
            round_id: 1,
        }
    }

    /// Seconds since the current phase began
    pub fn elapsed_seconds(&self) -> f64 {
        ticks_to_seconds(self.phase_ticks)
    }

    /// Enter a new phase, resetting the phase timer
    pub fn enter(&mut self, phase: RoundPhase) {
        self.phase = phase;
        self.phase_ticks = 0;
    }

    /// Read-only copy for subscribers
    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            phase: self.phase,
            multiplier: self.multiplier,
            countdown_seconds: self.countdown_seconds,
            elapsed_seconds: self.elapsed_seconds(),
            history: self.history.entries().cloned().collect(),
            crash_point: (self.phase == RoundPhase::Crashed).then_some(self.crash_point),
        }
    }
}

/// Snapshot of the round published after every tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub phase: RoundPhase,
    pub multiplier: f64,
    pub countdown_seconds: f64,
    /// Seconds since the current phase began
    pub elapsed_seconds: f64,
    /// Most recent first
    pub history: Vec<HistoryEntry>,
    /// Revealed only while crashed
    pub crash_point: Option<f64>,
}

impl RoundSnapshot {
    /// Cashing out is only legal while the plane is in the air
    pub fn can_cash_out(&self) -> bool {
        self.phase == RoundPhase::Flying
    }

    /// Bets are only accepted during the countdown
    pub fn accepts_bets(&self) -> bool {
        self.phase == RoundPhase::Betting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_ticks() {
        let config = EngineConfig::default();
        assert_eq!(config.betting_ticks(), 500);
        assert_eq!(config.crashed_ticks(), 300);
        assert_eq!(ticks_to_seconds(500), 5.0);
    }

    #[test]
    fn test_sanitized_replaces_stalling_values() {
        let config = EngineConfig {
            growth_rate: 0.0,
            betting_seconds: f64::NAN,
            crashed_seconds: f64::INFINITY,
            history_len: 40,
            ..EngineConfig::default()
        }
        .sanitized();
        assert_eq!(config.growth_rate, GROWTH_RATE);
        assert_eq!(config.betting_seconds, BETTING_SECONDS);
        assert_eq!(config.crashed_seconds, CRASHED_SECONDS);
        assert_eq!(config.history_len, HISTORY_LEN);

        let negative = EngineConfig {
            growth_rate: -0.5,
            betting_seconds: -2.0,
            crashed_seconds: 1e12,
            ..EngineConfig::default()
        }
        .sanitized();
        assert_eq!(negative.growth_rate, GROWTH_RATE);
        assert_eq!(negative.betting_seconds, 0.0);
        assert_eq!(negative.crashed_seconds, MAX_PHASE_SECONDS);
    }

    #[test]
    fn test_sanitized_keeps_valid_config() {
        let config = EngineConfig {
            growth_rate: 0.1,
            betting_seconds: 2.0,
            crashed_seconds: 1.0,
            history_len: 5,
            epoch_ms: 7,
        };
        let clean = config.sanitized();
        assert_eq!(clean.growth_rate, 0.1);
        assert_eq!(clean.betting_seconds, 2.0);
        assert_eq!(clean.crashed_seconds, 1.0);
        assert_eq!(clean.history_len, 5);
        assert_eq!(clean.epoch_ms, 7);
    }

    #[test]
    fn test_snapshot_hides_crash_point() {
        let mut state = RoundState::new(HISTORY_LEN);
        state.crash_point = 3.5;
        state.enter(RoundPhase::Flying);
        assert_eq!(state.snapshot().crash_point, None);
        state.enter(RoundPhase::Crashed);
        assert_eq!(state.snapshot().crash_point, Some(3.5));
    }

    #[test]
    fn test_snapshot_legality() {
        let mut state = RoundState::new(HISTORY_LEN);
        state.enter(RoundPhase::Betting);
        let snap = state.snapshot();
        assert!(snap.accepts_bets());
        assert!(!snap.can_cash_out());
        state.enter(RoundPhase::Flying);
        assert!(state.snapshot().can_cash_out());
    }
}
