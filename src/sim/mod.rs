//! Deterministic round simulation
//!
//! The round engine lives here. This module must stay pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod crash;
pub mod engine;
pub mod history;
pub mod state;
pub mod tick;

pub use crash::{CrashPointSource, FixedCrashPoints, SeededCrashPoints, crash_point_from_draws};
pub use engine::{ListenerId, RoundEngine, RoundListener};
pub use history::{HistoryEntry, RoundHistory};
pub use state::{EngineConfig, RoundPhase, RoundSnapshot, RoundState};
pub use tick::{RoundEvent, multiplier_at, tick};
