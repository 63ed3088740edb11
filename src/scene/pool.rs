//! Particle pooling
//!
//! Effects own their live particles; expired ones are moved back into a
//! bounded free list instead of being dropped. Ownership moves in and out of
//! the pool, so a particle can never sit in the free list twice.

use glam::Vec2;

use crate::renderer::Color;

/// Default free-list capacity
pub const DEFAULT_POOL_CAPACITY: usize = 100;

/// A value that can be wiped back to its zero state for reuse
pub trait Poolable: Default {
    fn reset(&mut self);
}

/// Exhaust particle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds remaining
    pub life: f32,
    pub max_life: f32,
}

impl Particle {
    /// Remaining life as 0..1
    pub fn life_ratio(&self) -> f32 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }
}

impl Poolable for Particle {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Explosion particle: a particle with its own size and color
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExplosionParticle {
    pub base: Particle,
    pub size: f32,
    pub color: Color,
}

impl Poolable for ExplosionParticle {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Bounded free list of reusable values
#[derive(Debug, Clone)]
pub struct ParticlePool<T> {
    free: Vec<T>,
    capacity: usize,
    allocated: usize,
}

impl<T: Poolable> Default for ParticlePool<T> {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY)
    }
}

impl<T: Poolable> ParticlePool<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(capacity),
            capacity,
            allocated: 0,
        }
    }

    /// Reuse a pooled value, or allocate a zeroed one when the pool is empty
    pub fn acquire(&mut self) -> T {
        match self.free.pop() {
            Some(value) => value,
            None => {
                self.allocated += 1;
                T::default()
            }
        }
    }

    /// Return a value; dropped instead when the pool is full
    pub fn recycle(&mut self, mut value: T) {
        if self.free.len() < self.capacity {
            value.reset();
            self.free.push(value);
        }
    }

    /// Move every value from an iterator back into the pool
    pub fn recycle_all(&mut self, values: impl IntoIterator<Item = T>) {
        for value in values {
            self.recycle(value);
        }
    }

    /// Move every expired value out of `live` and into the pool
    ///
    /// Order of `live` is not preserved. Returns how many were removed.
    pub fn reclaim(&mut self, live: &mut Vec<T>, mut expired: impl FnMut(&T) -> bool) -> usize {
        let mut removed = 0;
        let mut i = 0;
        while i < live.len() {
            if expired(&live[i]) {
                let value = live.swap_remove(i);
                self.recycle(value);
                removed += 1;
            } else {
                i += 1;
            }
        }
        removed
    }

    /// Values waiting for reuse
    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Fresh allocations made because the pool was empty
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    /// Change the bound, dropping surplus pooled values
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.free.truncate(capacity);
    }
}
