//! Two-stage crash explosion: a fire burst, then a delayed smoke puff

use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::Effect;
use crate::renderer::vertex::with_alpha;
use crate::renderer::{Color, LayerId, RenderSurface, colors};
use crate::scene::pool::{ExplosionParticle, ParticlePool};

/// Delay between the core burst and the smoke burst (seconds)
pub const SECONDARY_DELAY: f32 = 0.15;
/// Downward acceleration (px/s²)
const GRAVITY: f32 = 240.0;
/// Velocity decay (1/s)
const DRAG: f32 = 1.8;
const FIRE_PALETTE: [Color; 3] = [colors::FIRE_CORE, colors::FIRE, colors::EMBER];

#[derive(Debug, Clone, Copy)]
struct PendingBurst {
    pos: Vec2,
    delay: f32,
    count: usize,
}

#[derive(Debug)]
pub struct ExplosionEffect {
    particles: Vec<ExplosionParticle>,
    pool: ParticlePool<ExplosionParticle>,
    /// Core burst size (0 disables the effect)
    core_count: usize,
    pending: Option<PendingBurst>,
    rng: Pcg32,
}

impl ExplosionEffect {
    pub fn new(core_count: usize, pool_capacity: usize, seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            pool: ParticlePool::new(pool_capacity),
            core_count,
            pending: None,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn configure(&mut self, core_count: usize, pool_capacity: usize) {
        self.core_count = core_count;
        self.pool.set_capacity(pool_capacity);
    }

    /// Detonate at `pos`: core burst now, smoke after [`SECONDARY_DELAY`]
    pub fn trigger(&mut self, pos: Vec2) {
        if self.core_count == 0 {
            return;
        }
        for _ in 0..self.core_count {
            let color = FIRE_PALETTE[self.rng.random_range(0..FIRE_PALETTE.len())];
            self.spawn(pos, 120.0..420.0, 0.4..0.9, 2.0..6.0, color, 0.0);
        }
        self.pending = Some(PendingBurst {
            pos,
            delay: SECONDARY_DELAY,
            count: (self.core_count / 2).max(1),
        });
    }

    fn spawn(
        &mut self,
        pos: Vec2,
        speed: std::ops::Range<f32>,
        life: std::ops::Range<f32>,
        size: std::ops::Range<f32>,
        color: Color,
        lift: f32,
    ) {
        let mut p = self.pool.acquire();
        let angle = self.rng.random_range(0.0..TAU);
        let speed = self.rng.random_range(speed);
        p.base.pos = pos;
        p.base.vel = Vec2::from_angle(angle) * speed - Vec2::new(0.0, lift);
        p.base.max_life = self.rng.random_range(life);
        p.base.life = p.base.max_life;
        p.size = self.rng.random_range(size);
        p.color = color;
        self.particles.push(p);
    }

    fn release_pending(&mut self, dt: f32) {
        let Some(mut burst) = self.pending else {
            return;
        };
        burst.delay -= dt;
        if burst.delay > 0.0 {
            self.pending = Some(burst);
            return;
        }
        self.pending = None;
        for _ in 0..burst.count {
            // Smoke rises against gravity for most of its life
            self.spawn(burst.pos, 30.0..120.0, 0.8..1.6, 5.0..11.0, colors::SMOKE, 260.0);
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn has_pending_burst(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pool(&self) -> &ParticlePool<ExplosionParticle> {
        &self.pool
    }
}

impl Effect for ExplosionEffect {
    fn layer(&self) -> LayerId {
        LayerId::Explosion
    }

    fn update(&mut self, dt: f32) {
        self.release_pending(dt);

        let decay = (-DRAG * dt).exp();
        for p in &mut self.particles {
            p.base.vel.y += GRAVITY * dt;
            p.base.vel *= decay;
            p.base.pos += p.base.vel * dt;
            p.base.life -= dt;
        }
        self.pool.reclaim(&mut self.particles, |p| p.base.life <= 0.0);
    }

    fn render(&self, surface: &mut dyn RenderSurface) {
        surface.clear(LayerId::Explosion);
        for p in &self.particles {
            let ratio = p.base.life_ratio();
            let radius = p.size * (0.6 + 0.4 * ratio);
            surface.fill_circle(LayerId::Explosion, p.base.pos, radius, with_alpha(p.color, ratio));
        }
    }

    fn clear(&mut self) {
        self.pool.recycle_all(self.particles.drain(..));
        self.pending = None;
    }

    fn is_active(&self) -> bool {
        !self.particles.is_empty() || self.pending.is_some()
    }
}
