//! Round engine: owns the round state, drives the fixed-rate clock and
//! fans snapshots out to subscribers.

use std::ops::ControlFlow;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use super::crash::{CrashPointSource, SeededCrashPoints};
use super::state::{EngineConfig, RoundPhase, RoundSnapshot, RoundState};
use super::tick::{RoundEvent, begin_betting, tick};
use crate::consts::{MAX_TICKS_PER_ADVANCE, TICK_DURATION};

/// Receives a snapshot after every engine tick
///
/// Return `ControlFlow::Break(())` to unsubscribe from inside the callback.
/// Any `FnMut(&RoundSnapshot)` closure is a listener that never unsubscribes.
pub trait RoundListener {
    fn on_update(&mut self, snapshot: &RoundSnapshot) -> ControlFlow<()>;
}

impl<F> RoundListener for F
where
    F: FnMut(&RoundSnapshot),
{
    fn on_update(&mut self, snapshot: &RoundSnapshot) -> ControlFlow<()> {
        self(snapshot);
        ControlFlow::Continue(())
    }
}

/// Identity of a subscription, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Subscriber {
    id: ListenerId,
    listener: Box<dyn RoundListener>,
}

/// The round state machine and its clock
pub struct RoundEngine {
    state: RoundState,
    config: EngineConfig,
    source: Box<dyn CrashPointSource>,
    subscribers: Vec<Subscriber>,
    next_listener_id: u64,
    accumulator: Duration,
    torn_down: bool,
}

impl RoundEngine {
    /// Build an engine; out-of-range config values are replaced (see
    /// [`EngineConfig::sanitized`])
    pub fn new(config: EngineConfig, source: impl CrashPointSource + 'static) -> Self {
        let config = config.sanitized();
        Self {
            state: RoundState::new(config.history_len),
            config,
            source: Box::new(source),
            subscribers: Vec::new(),
            next_listener_id: 1,
            accumulator: Duration::ZERO,
            torn_down: false,
        }
    }

    /// Engine with a seeded crash point generator
    pub fn with_seed(config: EngineConfig, seed: u64) -> Self {
        Self::new(config, SeededCrashPoints::new(seed))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn phase(&self) -> RoundPhase {
        self.state.phase
    }

    pub fn multiplier(&self) -> f64 {
        self.state.multiplier
    }

    /// Defensive copy of the current state
    pub fn snapshot(&self) -> RoundSnapshot {
        self.state.snapshot()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn listener_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Leave Idle and open betting for the first round
    pub fn start(&mut self) {
        if self.torn_down || self.state.phase != RoundPhase::Idle {
            return;
        }
        begin_betting(&mut self.state, self.source.as_mut(), &self.config);
        log::debug!("Round engine started, betting open");
        self.notify();
    }

    /// Feed elapsed real time; runs every whole tick that fits
    ///
    /// Returns the number of ticks run.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        if self.torn_down || self.state.phase == RoundPhase::Idle {
            return 0;
        }

        self.accumulator = self.accumulator.saturating_add(dt);
        let mut ticks = 0;
        while self.accumulator >= TICK_DURATION && ticks < MAX_TICKS_PER_ADVANCE {
            self.accumulator -= TICK_DURATION;
            self.run_tick();
            ticks += 1;
        }

        if self.accumulator >= TICK_DURATION {
            log::warn!(
                "Round engine fell behind, dropping {:?} of simulated time",
                self.accumulator
            );
            self.accumulator = Duration::ZERO;
        }
        ticks
    }

    /// `advance` with seconds; ignores non-finite or negative values
    pub fn advance_seconds(&mut self, seconds: f64) -> u32 {
        if !seconds.is_finite() || seconds <= 0.0 {
            return 0;
        }
        // Too large for a Duration: more than any single advance can run anyway
        let dt = Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX);
        self.advance(dt)
    }

    /// Run exactly one tick, bypassing the accumulator
    pub fn step(&mut self) -> Option<RoundEvent> {
        if self.torn_down || self.state.phase == RoundPhase::Idle {
            return None;
        }
        self.run_tick()
    }

    fn run_tick(&mut self) -> Option<RoundEvent> {
        let event = tick(&mut self.state, self.source.as_mut(), &self.config);
        match event {
            Some(RoundEvent::Crashed {
                round_id,
                crash_point,
            }) => log::info!("Round {} crashed at {:.2}x", round_id, crash_point),
            Some(RoundEvent::TookOff) => log::debug!("Takeoff"),
            Some(RoundEvent::BettingOpened) => log::debug!("Betting open"),
            None => {}
        }
        self.notify();
        event
    }

    /// Register a listener; it is called immediately with the current snapshot
    pub fn subscribe(&mut self, listener: impl RoundListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;

        if self.torn_down {
            log::debug!("Subscribe after teardown ignored");
            return id;
        }

        let mut subscriber = Subscriber {
            id,
            listener: Box::new(listener),
        };
        let snapshot = self.state.snapshot();
        if deliver(&mut subscriber, &snapshot) {
            self.subscribers.push(subscriber);
        }
        id
    }

    /// Remove a listener by identity; false if it was not subscribed
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Notify all listeners in insertion order
    ///
    /// A panicking listener is removed; the rest are still notified.
    fn notify(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.state.snapshot();
        self.subscribers
            .retain_mut(|subscriber| deliver(subscriber, &snapshot));
    }

    /// Stop for good: no more ticks, all listeners dropped
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.subscribers.clear();
        self.accumulator = Duration::ZERO;
        log::info!("Round engine torn down");
    }
}

/// Call one listener; false means it should be dropped
fn deliver(subscriber: &mut Subscriber, snapshot: &RoundSnapshot) -> bool {
    match catch_unwind(AssertUnwindSafe(|| subscriber.listener.on_update(snapshot))) {
        Ok(ControlFlow::Continue(())) => true,
        Ok(ControlFlow::Break(())) => false,
        Err(_) => {
            log::error!("Round listener {:?} panicked, unsubscribing it", subscriber.id);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::crash::FixedCrashPoints;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn engine(crash_point: f64) -> RoundEngine {
        RoundEngine::new(
            EngineConfig::default(),
            FixedCrashPoints::always(crash_point),
        )
    }

    #[test]
    fn test_start_opens_betting() {
        let mut engine = engine(2.0);
        assert_eq!(engine.phase(), RoundPhase::Idle);
        assert_eq!(engine.advance(Duration::from_secs(1)), 0);
        engine.start();
        assert_eq!(engine.phase(), RoundPhase::Betting);
        assert_eq!(engine.snapshot().countdown_seconds, 5.0);
    }

    #[test]
    fn test_five_seconds_to_takeoff() {
        let mut engine = engine(2.0);
        engine.start();
        assert_eq!(engine.advance(Duration::from_secs(5)), 500);
        assert_eq!(engine.phase(), RoundPhase::Flying);
        assert_eq!(engine.multiplier(), 1.0);
    }

    #[test]
    fn test_crash_at_fixed_point() {
        let mut engine = engine(2.0);
        engine.start();
        engine.advance(Duration::from_secs(5));

        let mut flight_ticks = 0u32;
        while engine.phase() == RoundPhase::Flying {
            engine.step();
            flight_ticks += 1;
            assert!(flight_ticks < 2_000, "never crashed");
        }

        let t = flight_ticks as f64 / 100.0;
        assert!((10.5..=10.8).contains(&t), "crashed after {t}s");
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.phase, RoundPhase::Crashed);
        assert_eq!(snapshot.multiplier, 2.0);
        assert_eq!(snapshot.crash_point, Some(2.0));
        assert_eq!(snapshot.history.len(), 1);
        assert_eq!(snapshot.history[0].multiplier, 2.0);
        assert_eq!(snapshot.history[0].round_id, 1);
    }

    #[test]
    fn test_subscribe_receives_immediate_snapshot() {
        let mut engine = engine(2.0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        engine.subscribe(move |s: &RoundSnapshot| sink.borrow_mut().push(s.phase));
        assert_eq!(*seen.borrow(), vec![RoundPhase::Idle]);

        engine.start();
        engine.step();
        assert_eq!(
            *seen.borrow(),
            vec![RoundPhase::Idle, RoundPhase::Betting, RoundPhase::Betting]
        );
    }

    #[test]
    fn test_listeners_notified_in_insertion_order() {
        let mut engine = engine(2.0);
        engine.start();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in 0..3 {
            let order = order.clone();
            engine.subscribe(move |_: &RoundSnapshot| order.borrow_mut().push(tag));
        }
        order.borrow_mut().clear();
        engine.step();
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_unsubscribe_by_identity() {
        let mut engine = engine(2.0);
        engine.start();
        let count = Rc::new(RefCell::new(0));
        let sink = count.clone();
        let id = engine.subscribe(move |_: &RoundSnapshot| *sink.borrow_mut() += 1);
        engine.subscribe(|_: &RoundSnapshot| {});
        assert!(engine.unsubscribe(id));
        assert!(!engine.unsubscribe(id));
        engine.step();
        assert_eq!(*count.borrow(), 1);
        assert_eq!(engine.listener_count(), 1);
    }

    struct OneShot {
        calls: Rc<RefCell<u32>>,
    }

    impl RoundListener for OneShot {
        fn on_update(&mut self, _snapshot: &RoundSnapshot) -> ControlFlow<()> {
            *self.calls.borrow_mut() += 1;
            if *self.calls.borrow() >= 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        }
    }

    #[test]
    fn test_listener_unsubscribes_itself() {
        let mut engine = engine(2.0);
        engine.start();
        let calls = Rc::new(RefCell::new(0));
        engine.subscribe(OneShot {
            calls: calls.clone(),
        });
        engine.step();
        engine.step();
        assert_eq!(*calls.borrow(), 2);
        assert_eq!(engine.listener_count(), 0);
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let mut engine = engine(2.0);
        engine.start();
        let after = Rc::new(RefCell::new(0));
        let sink = after.clone();
        let mut armed = false;
        engine.subscribe(move |_: &RoundSnapshot| {
            if armed {
                panic!("listener failure");
            }
            armed = true;
        });
        engine.subscribe(move |_: &RoundSnapshot| *sink.borrow_mut() += 1);

        engine.step();
        engine.step();
        assert_eq!(*after.borrow(), 3);
        assert_eq!(engine.listener_count(), 1);
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let mut engine = engine(2.0);
        engine.start();
        engine.subscribe(|_: &RoundSnapshot| {});
        engine.teardown();
        engine.teardown();
        assert!(engine.is_torn_down());
        assert_eq!(engine.listener_count(), 0);
        assert_eq!(engine.advance(Duration::from_secs(1)), 0);
        assert_eq!(engine.step(), None);
        engine.subscribe(|_: &RoundSnapshot| {});
        assert_eq!(engine.listener_count(), 0);
    }

    #[test]
    fn test_history_bounded_newest_first() {
        let mut engine = engine(1.0);
        engine.start();
        // Each instant-crash round takes 5.01s + 3s
        for _ in 0..25 {
            engine.advance(Duration::from_secs(9));
        }
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.history.len(), 20);
        let ids: Vec<u64> = snapshot.history.iter().map(|e| e.round_id).collect();
        assert!(ids.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_huge_advance_is_capped_not_fatal() {
        let mut engine = engine(2.0);
        engine.start();
        assert_eq!(engine.advance_seconds(1e20), MAX_TICKS_PER_ADVANCE);
        assert_eq!(engine.advance(Duration::from_millis(5)), 0);
        assert_eq!(engine.advance(Duration::MAX), MAX_TICKS_PER_ADVANCE);
        // The leftover was dropped, the clock keeps going
        assert_eq!(engine.advance(Duration::from_millis(10)), 1);
    }

    #[test]
    fn test_zero_growth_rate_still_crashes() {
        let config = EngineConfig {
            growth_rate: 0.0,
            ..EngineConfig::default()
        };
        let mut engine = RoundEngine::new(config, FixedCrashPoints::always(2.0));
        assert_eq!(engine.config().growth_rate, crate::consts::GROWTH_RATE);
        engine.start();
        let mut crashed = false;
        for _ in 0..20 {
            engine.advance_seconds(1.0);
            crashed |= engine.phase() == RoundPhase::Crashed;
        }
        assert!(crashed, "flight never ended");
    }

    #[test]
    fn test_oversized_history_len_is_bounded() {
        let config = EngineConfig {
            history_len: 50,
            ..EngineConfig::default()
        };
        let mut engine = RoundEngine::new(config, FixedCrashPoints::always(1.0));
        engine.start();
        for _ in 0..30 {
            engine.advance(Duration::from_secs(9));
        }
        assert_eq!(engine.snapshot().history.len(), crate::consts::HISTORY_LEN);
    }

    #[test]
    fn test_advance_ignores_bad_seconds() {
        let mut engine = engine(2.0);
        engine.start();
        assert_eq!(engine.advance_seconds(f64::NAN), 0);
        assert_eq!(engine.advance_seconds(-1.0), 0);
        assert_eq!(engine.advance_seconds(0.05), 5);
    }

    proptest! {
        #[test]
        fn multiplier_non_decreasing_while_flying(seed in any::<u64>()) {
            let mut engine = RoundEngine::with_seed(EngineConfig::default(), seed);
            engine.start();
            let mut last = 1.0;
            let mut was_flying = false;
            for _ in 0..3_000 {
                engine.step();
                let snap = engine.snapshot();
                match snap.phase {
                    RoundPhase::Flying => {
                        if !was_flying {
                            prop_assert_eq!(snap.multiplier, 1.0);
                        } else {
                            prop_assert!(snap.multiplier >= last);
                        }
                        last = snap.multiplier;
                        was_flying = true;
                    }
                    RoundPhase::Crashed => {
                        prop_assert!(snap.multiplier >= last);
                        was_flying = false;
                        last = 1.0;
                    }
                    _ => {
                        was_flying = false;
                        last = 1.0;
                    }
                }
                prop_assert!(snap.history.len() <= 20);
            }
        }
    }
}
