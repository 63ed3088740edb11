//! Visual effects layered around the plane
//!
//! Every effect runs emit -> update -> render once per frame. Emission is
//! effect specific; update and render go through [`Effect`], and render
//! always clears the effect's own layer before redrawing.

pub mod exhaust;
pub mod explosion;
pub mod flash;
pub mod trail;

pub use exhaust::ExhaustEffect;
pub use explosion::ExplosionEffect;
pub use flash::FlashEffect;
pub use trail::TrailEffect;

use crate::renderer::{LayerId, RenderSurface};
use crate::settings::DeviceProfile;

/// Per-frame contract shared by all effects
pub trait Effect {
    /// Layer this effect owns
    fn layer(&self) -> LayerId;

    /// Integrate one frame, culling anything expired
    fn update(&mut self, dt: f32);

    /// Clear the layer and redraw everything live
    fn render(&self, surface: &mut dyn RenderSurface);

    /// Drop all live state (pooled values go back to their pool)
    fn clear(&mut self);

    /// Anything left to animate
    fn is_active(&self) -> bool;
}

/// Seed offsets so each effect draws from its own stream
const EXHAUST_STREAM: u64 = 1;
const EXPLOSION_STREAM: u64 = 2;

/// All effects, in paint order
#[derive(Debug)]
pub struct EffectStack {
    pub trail: TrailEffect,
    pub exhaust: ExhaustEffect,
    pub explosion: ExplosionEffect,
    pub flash: FlashEffect,
}

impl EffectStack {
    pub fn new(profile: &DeviceProfile, flash_intensity: f32, seed: u64) -> Self {
        Self {
            trail: TrailEffect::new(profile.trail_cap),
            exhaust: ExhaustEffect::new(
                profile.exhaust_rate,
                profile.pool_capacity,
                seed.wrapping_add(EXHAUST_STREAM),
            ),
            explosion: ExplosionEffect::new(
                profile.explosion_particles,
                profile.pool_capacity,
                seed.wrapping_add(EXPLOSION_STREAM),
            ),
            flash: FlashEffect::new(flash_intensity),
        }
    }

    /// Apply a new device profile without dropping live particles
    pub fn configure(&mut self, profile: &DeviceProfile) {
        self.trail.set_cap(profile.trail_cap);
        self.exhaust
            .configure(profile.exhaust_rate, profile.pool_capacity);
        self.explosion
            .configure(profile.explosion_particles, profile.pool_capacity);
    }

    fn each(&self) -> [&dyn Effect; 4] {
        [&self.trail, &self.exhaust, &self.explosion, &self.flash]
    }

    fn each_mut(&mut self) -> [&mut dyn Effect; 4] {
        [
            &mut self.trail,
            &mut self.exhaust,
            &mut self.explosion,
            &mut self.flash,
        ]
    }

    pub fn update(&mut self, dt: f32) {
        for effect in self.each_mut() {
            effect.update(dt);
        }
    }

    pub fn render(&self, surface: &mut dyn RenderSurface) {
        for effect in self.each() {
            effect.render(surface);
        }
    }

    pub fn clear(&mut self) {
        for effect in self.each_mut() {
            effect.clear();
        }
    }

    pub fn is_active(&self) -> bool {
        self.each().iter().any(|e| e.is_active())
    }
}
