//! Per-frame visuals
//!
//! Everything here runs on the host's frame clock, downstream of round
//! snapshots. Nothing in this module feeds back into the simulation.

pub mod curve;
pub mod effects;
pub mod flight;
pub mod fly_away;
pub mod orchestrator;
pub mod pool;
pub mod sprite;
pub mod viewport;

pub use curve::{CurvePoint, CurveRenderer};
pub use effects::{Effect, EffectStack};
pub use flight::FlightAnimation;
pub use fly_away::{FlyAwayAnimation, FlyAwayConfig, FlyAwayPhysics};
pub use orchestrator::{Lifecycle, SceneError, SceneHandle, SceneOrchestrator};
pub use pool::{ExplosionParticle, Particle, ParticlePool, Poolable};
pub use sprite::{AssetError, AssetSource, FileAssets, MemoryAssets, NoAssets, PlaneVisual};
pub use viewport::{Layout, Viewport, ViewportSystem};
