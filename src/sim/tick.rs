//! Fixed timestep round tick
//!
//! Advances the round state machine deterministically:
//! Idle -> Betting -> Flying -> Crashed -> Betting -> ...

use super::crash::CrashPointSource;
use super::history::HistoryEntry;
use super::state::{EngineConfig, RoundPhase, RoundState, ticks_to_seconds};
use crate::consts::TICK_DURATION;
use crate::round2;

/// Phase transitions produced by a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoundEvent {
    /// Countdown started for a new round
    BettingOpened,
    /// Countdown finished, multiplier starts at 1.00
    TookOff,
    /// Multiplier reached the crash point
    Crashed { round_id: u64, crash_point: f64 },
}

/// Enter the betting phase: fresh crash point, full countdown
pub fn begin_betting(
    state: &mut RoundState,
    source: &mut dyn CrashPointSource,
    config: &EngineConfig,
) {
    state.enter(RoundPhase::Betting);
    state.crash_point = source.next_crash_point();
    state.multiplier = 1.0;
    state.countdown_seconds = ticks_to_seconds(config.betting_ticks());
}

/// Multiplier after `t` seconds of flight, at display precision
#[inline]
pub fn multiplier_at(growth_rate: f64, t: f64) -> f64 {
    round2((growth_rate * t).exp())
}

/// Advance the round by one fixed timestep
pub fn tick(
    state: &mut RoundState,
    source: &mut dyn CrashPointSource,
    config: &EngineConfig,
) -> Option<RoundEvent> {
    if state.phase == RoundPhase::Idle {
        return None;
    }

    state.total_ticks += 1;
    state.phase_ticks += 1;

    match state.phase {
        RoundPhase::Idle => None,

        RoundPhase::Betting => {
            let remaining = config.betting_ticks().saturating_sub(state.phase_ticks);
            state.countdown_seconds = ticks_to_seconds(remaining);
            if remaining == 0 {
                state.enter(RoundPhase::Flying);
                state.multiplier = 1.0;
                return Some(RoundEvent::TookOff);
            }
            None
        }

        RoundPhase::Flying => {
            let t = state.elapsed_seconds();
            // Never step backwards, even with an odd growth rate
            let multiplier = multiplier_at(config.growth_rate, t).max(state.multiplier);

            if multiplier >= state.crash_point {
                state.multiplier = state.crash_point;
                let round_id = state.round_id;
                state.round_id += 1;
                state.history.push(HistoryEntry {
                    multiplier: state.crash_point,
                    round_id,
                    timestamp_ms: timestamp_ms(state, config),
                });
                state.enter(RoundPhase::Crashed);
                return Some(RoundEvent::Crashed {
                    round_id,
                    crash_point: state.crash_point,
                });
            }

            state.multiplier = multiplier;
            None
        }

        RoundPhase::Crashed => {
            if state.phase_ticks >= config.crashed_ticks() {
                begin_betting(state, source, config);
                return Some(RoundEvent::BettingOpened);
            }
            None
        }
    }
}

/// Wall-clock time of the current tick
fn timestamp_ms(state: &RoundState, config: &EngineConfig) -> u64 {
    config.epoch_ms + state.total_ticks * TICK_DURATION.as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::crash::FixedCrashPoints;

    fn betting_state(crash_point: f64) -> (RoundState, FixedCrashPoints, EngineConfig) {
        let config = EngineConfig::default();
        let mut source = FixedCrashPoints::always(crash_point);
        let mut state = RoundState::new(config.history_len);
        begin_betting(&mut state, &mut source, &config);
        (state, source, config)
    }

    #[test]
    fn test_idle_does_not_tick() {
        let config = EngineConfig::default();
        let mut source = FixedCrashPoints::always(2.0);
        let mut state = RoundState::new(config.history_len);
        assert_eq!(tick(&mut state, &mut source, &config), None);
        assert_eq!(state.total_ticks, 0);
        assert_eq!(state.phase, RoundPhase::Idle);
    }

    #[test]
    fn test_countdown_is_linear() {
        let (mut state, mut source, config) = betting_state(2.0);
        assert_eq!(state.countdown_seconds, 5.0);
        for _ in 0..250 {
            tick(&mut state, &mut source, &config);
        }
        assert!((state.countdown_seconds - 2.5).abs() < 1e-9);
        assert_eq!(state.phase, RoundPhase::Betting);
    }

    #[test]
    fn test_takeoff_after_countdown() {
        let (mut state, mut source, config) = betting_state(2.0);
        let mut events = Vec::new();
        for _ in 0..500 {
            events.extend(tick(&mut state, &mut source, &config));
        }
        assert_eq!(events, vec![RoundEvent::TookOff]);
        assert_eq!(state.phase, RoundPhase::Flying);
        assert_eq!(state.multiplier, 1.0);
        assert_eq!(state.phase_ticks, 0);
        assert_eq!(state.countdown_seconds, 0.0);
    }

    #[test]
    fn test_instant_crash_at_one() {
        let (mut state, mut source, config) = betting_state(1.0);
        for _ in 0..500 {
            tick(&mut state, &mut source, &config);
        }
        let event = tick(&mut state, &mut source, &config);
        assert_eq!(
            event,
            Some(RoundEvent::Crashed {
                round_id: 1,
                crash_point: 1.0
            })
        );
        assert_eq!(state.multiplier, 1.0);
    }

    #[test]
    fn test_crashed_returns_to_betting() {
        let (mut state, mut source, config) = betting_state(1.0);
        while state.phase != RoundPhase::Crashed {
            tick(&mut state, &mut source, &config);
        }
        for _ in 0..299 {
            assert_eq!(tick(&mut state, &mut source, &config), None);
        }
        assert_eq!(
            tick(&mut state, &mut source, &config),
            Some(RoundEvent::BettingOpened)
        );
        assert_eq!(state.phase, RoundPhase::Betting);
        assert_eq!(state.multiplier, 1.0);
        assert_eq!(state.round_id, 2);
    }

    #[test]
    fn test_multiplier_curve() {
        assert_eq!(multiplier_at(0.065, 0.0), 1.0);
        assert_eq!(multiplier_at(0.065, 10.0), 1.92);
        assert_eq!(multiplier_at(0.065, 20.0), 3.67);
    }

    #[test]
    fn test_history_timestamp_uses_epoch() {
        let config = EngineConfig {
            epoch_ms: 1_000_000,
            ..EngineConfig::default()
        };
        let mut source = FixedCrashPoints::always(1.0);
        let mut state = RoundState::new(config.history_len);
        begin_betting(&mut state, &mut source, &config);
        while state.phase != RoundPhase::Crashed {
            tick(&mut state, &mut source, &config);
        }
        let entry = state.history.latest().expect("crash recorded");
        // 500 betting ticks + 1 flying tick at 10ms
        assert_eq!(entry.timestamp_ms, 1_000_000 + 501 * 10);
    }
}
