//! Engine exhaust behind the plane

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::Effect;
use crate::renderer::vertex::{mix, with_alpha};
use crate::renderer::{LayerId, RenderSurface, colors};
use crate::scene::pool::{Particle, ParticlePool};

/// Distance from the plane centre to the nozzle (px)
const NOZZLE_OFFSET: f32 = 28.0;
/// Exhaust speed against the heading (px/s)
const SPEED_MIN: f32 = 60.0;
const SPEED_MAX: f32 = 130.0;
/// Sideways jitter (px/s)
const SPREAD: f32 = 25.0;
const LIFE_MIN: f32 = 0.3;
const LIFE_MAX: f32 = 0.7;
/// Velocity decay (1/s)
const DRAG: f32 = 2.5;
const RADIUS_START: f32 = 4.5;
const RADIUS_END: f32 = 1.5;

#[derive(Debug)]
pub struct ExhaustEffect {
    particles: Vec<Particle>,
    pool: ParticlePool<Particle>,
    /// Particles per second
    rate: f32,
    /// Fractional particles owed from previous frames
    carry: f32,
    rng: Pcg32,
}

impl ExhaustEffect {
    pub fn new(rate: f32, pool_capacity: usize, seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            pool: ParticlePool::new(pool_capacity),
            rate,
            carry: 0.0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn configure(&mut self, rate: f32, pool_capacity: usize) {
        self.rate = rate;
        self.pool.set_capacity(pool_capacity);
    }

    /// Emit this frame's share of particles from the plane's tail
    pub fn emit(&mut self, dt: f32, plane_pos: Vec2, rotation: f32) {
        if self.rate <= 0.0 || dt <= 0.0 {
            return;
        }
        self.carry += self.rate * dt;
        let count = self.carry.floor();
        self.carry -= count;

        let heading = Vec2::from_angle(rotation);
        let nozzle = plane_pos - heading * NOZZLE_OFFSET;
        for _ in 0..count as usize {
            let mut p = self.pool.acquire();
            let speed = self.rng.random_range(SPEED_MIN..SPEED_MAX);
            let side = self.rng.random_range(-SPREAD..SPREAD);
            p.pos = nozzle + heading.perp() * self.rng.random_range(-2.0f32..2.0);
            p.vel = -heading * speed + heading.perp() * side;
            p.max_life = self.rng.random_range(LIFE_MIN..LIFE_MAX);
            p.life = p.max_life;
            self.particles.push(p);
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn pool(&self) -> &ParticlePool<Particle> {
        &self.pool
    }
}

impl Effect for ExhaustEffect {
    fn layer(&self) -> LayerId {
        LayerId::Exhaust
    }

    fn update(&mut self, dt: f32) {
        let decay = (-DRAG * dt).exp();
        for p in &mut self.particles {
            p.pos += p.vel * dt;
            p.vel *= decay;
            p.life -= dt;
        }
        self.pool.reclaim(&mut self.particles, |p| p.life <= 0.0);
    }

    fn render(&self, surface: &mut dyn RenderSurface) {
        surface.clear(LayerId::Exhaust);
        for p in &self.particles {
            let ratio = p.life_ratio();
            let radius = RADIUS_END + (RADIUS_START - RADIUS_END) * ratio;
            let color = with_alpha(mix(colors::EXHAUST_COOL, colors::EXHAUST_HOT, ratio), ratio * 0.8);
            surface.fill_circle(LayerId::Exhaust, p.pos, radius, color);
        }
    }

    fn clear(&mut self) {
        self.pool.recycle_all(self.particles.drain(..));
        self.carry = 0.0;
    }

    fn is_active(&self) -> bool {
        !self.particles.is_empty()
    }
}
