//! Crash exit trajectory
//!
//! One-shot physics run after the crash: thrust along the nose, exponential
//! drag, damped spin, and a shrink/fade driven by eased progress.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::renderer::SpriteTransform;
use crate::{ease_out_cubic, lerp};

/// Shortest and longest allowed fly-away (seconds)
pub const MIN_DURATION: f32 = 1.5;
pub const MAX_DURATION: f32 = 5.5;
/// Alpha below which the plane counts as gone
pub const ALPHA_EPSILON: f32 = 0.01;

/// Fly-away tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlyAwayConfig {
    /// Total animation length (seconds, clamped to 1.5..=5.5)
    pub duration: f32,
    /// Acceleration along the nose (px/s²)
    pub thrust: f32,
    /// Exponential air resistance (1/s)
    pub drag: f32,
    /// Fraction of angular velocity kept per second
    pub angular_damping: f32,
    /// Spin at launch (rad/s, negative pitches the nose up)
    pub initial_angular_velocity: f32,
    /// Launch speed when no plane velocity is known (px/s)
    pub launch_speed: f32,
    /// Scale at the end of the animation, relative to the start
    pub end_scale: f32,
    /// Off-screen slack before the plane is dropped (px)
    pub margin: f32,
}

impl Default for FlyAwayConfig {
    fn default() -> Self {
        Self {
            duration: 2.5,
            thrust: 900.0,
            drag: 1.2,
            angular_damping: 0.35,
            initial_angular_velocity: -0.6,
            launch_speed: 320.0,
            end_scale: 0.35,
            margin: 200.0,
        }
    }
}

impl FlyAwayConfig {
    pub fn clamped_duration(&self) -> f32 {
        if self.duration.is_finite() {
            self.duration.clamp(MIN_DURATION, MAX_DURATION)
        } else {
            MIN_DURATION
        }
    }
}

/// State of the plane leaving the screen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlyAwayPhysics {
    pub pos: Vec2,
    pub vel: Vec2,
    pub rotation: f32,
    pub angular_velocity: f32,
    pub scale: f32,
    pub alpha: f32,
    pub active: bool,
}

/// Drives [`FlyAwayPhysics`] from `start()` until it is exhausted
#[derive(Debug, Clone, Default)]
pub struct FlyAwayAnimation {
    config: FlyAwayConfig,
    physics: FlyAwayPhysics,
    start_scale: f32,
    elapsed: f32,
}

impl FlyAwayAnimation {
    pub fn new(config: FlyAwayConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &FlyAwayConfig {
        &self.config
    }

    /// Reinitialise every physics field from the plane's last transform
    pub fn start(&mut self, pos: Vec2, rotation: f32, scale: f32, velocity: Option<Vec2>) {
        let heading = Vec2::from_angle(rotation);
        let vel = velocity
            .filter(|v| v.is_finite() && v.length_squared() > f32::EPSILON)
            .unwrap_or(heading * self.config.launch_speed);

        self.physics = FlyAwayPhysics {
            pos,
            vel,
            rotation,
            angular_velocity: self.config.initial_angular_velocity,
            scale,
            alpha: 1.0,
            active: true,
        };
        self.start_scale = scale;
        self.elapsed = 0.0;
        log::debug!("Fly-away from ({:.0}, {:.0}) at {:.2} rad", pos.x, pos.y, rotation);
    }

    /// Integrate one frame; returns whether the plane is still visible
    ///
    /// `bounds` is the surface size; the plane is dropped once it leaves
    /// the surface inflated by the configured margin.
    pub fn update(&mut self, dt: f32, bounds: Vec2) -> bool {
        if !self.physics.active {
            return false;
        }
        let cfg = &self.config;
        let p = &mut self.physics;

        self.elapsed += dt;
        let progress = (self.elapsed / cfg.clamped_duration()).min(1.0);

        let heading = Vec2::from_angle(p.rotation);
        p.vel += heading * cfg.thrust * dt;
        p.vel *= (-cfg.drag * dt).exp();
        p.pos += p.vel * dt;

        p.angular_velocity *= cfg.angular_damping.clamp(0.0, 1.0).powf(dt);
        p.rotation += p.angular_velocity * dt;

        let eased = ease_out_cubic(progress);
        p.scale = lerp(self.start_scale, self.start_scale * cfg.end_scale, eased);
        p.alpha = 1.0 - eased;

        let margin = Vec2::splat(cfg.margin);
        let outside = p.pos.cmplt(-margin).any() || p.pos.cmpgt(bounds + margin).any();
        if p.alpha <= ALPHA_EPSILON || progress >= 1.0 || outside {
            p.active = false;
        }
        p.active
    }

    pub fn physics(&self) -> &FlyAwayPhysics {
        &self.physics
    }

    pub fn is_active(&self) -> bool {
        self.physics.active
    }

    /// Drop the animation without finishing it
    pub fn stop(&mut self) {
        self.physics.active = false;
    }

    pub fn transform(&self) -> SpriteTransform {
        SpriteTransform {
            pos: self.physics.pos,
            rotation: self.physics.rotation,
            scale: self.physics.scale,
            alpha: self.physics.alpha,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Vec2 = Vec2::new(1000.0, 700.0);

    #[test]
    fn test_duration_clamped() {
        let mut cfg = FlyAwayConfig::default();
        assert_eq!(cfg.clamped_duration(), 2.5);
        cfg.duration = 0.2;
        assert_eq!(cfg.clamped_duration(), 1.5);
        cfg.duration = 30.0;
        assert_eq!(cfg.clamped_duration(), 5.5);
        cfg.duration = f32::NAN;
        assert_eq!(cfg.clamped_duration(), 1.5);
    }

    #[test]
    fn test_start_reinitialises() {
        let mut anim = FlyAwayAnimation::new(FlyAwayConfig::default());
        anim.start(Vec2::new(500.0, 300.0), -0.3, 1.0, None);
        for _ in 0..30 {
            anim.update(1.0 / 60.0, SCREEN);
        }
        anim.start(Vec2::new(10.0, 20.0), 0.0, 0.7, Some(Vec2::new(50.0, 0.0)));
        let p = anim.physics();
        assert_eq!(p.pos, Vec2::new(10.0, 20.0));
        assert_eq!(p.vel, Vec2::new(50.0, 0.0));
        assert_eq!(p.alpha, 1.0);
        assert_eq!(p.scale, 0.7);
        assert!(p.active);
    }

    #[test]
    fn test_zero_velocity_uses_heading() {
        let mut anim = FlyAwayAnimation::new(FlyAwayConfig::default());
        anim.start(Vec2::ZERO, 0.0, 1.0, Some(Vec2::ZERO));
        assert_eq!(anim.physics().vel, Vec2::new(320.0, 0.0));
    }

    #[test]
    fn test_shrinks_fades_and_finishes() {
        // Wide bounds so only progress can end it
        let mut anim = FlyAwayAnimation::new(FlyAwayConfig {
            margin: 1.0e6,
            ..FlyAwayConfig::default()
        });
        anim.start(Vec2::new(500.0, 350.0), -0.2, 1.0, None);
        let mut last_alpha = 1.0;
        let mut frames = 0;
        while anim.update(1.0 / 60.0, SCREEN) {
            let p = anim.physics();
            assert!(p.alpha <= last_alpha);
            assert!(p.scale <= 1.0);
            last_alpha = p.alpha;
            frames += 1;
            assert!(frames < 1000, "fly-away never finished");
        }
        // Ends on or before the 2.5 s mark
        assert!(frames <= 150);
        assert!(!anim.is_active());
    }

    #[test]
    fn test_deactivates_off_screen() {
        let mut anim = FlyAwayAnimation::new(FlyAwayConfig {
            margin: 0.0,
            duration: 5.5,
            ..FlyAwayConfig::default()
        });
        anim.start(Vec2::new(995.0, 350.0), 0.0, 1.0, Some(Vec2::new(600.0, 0.0)));
        let mut frames = 0;
        while anim.update(1.0 / 60.0, SCREEN) {
            frames += 1;
        }
        assert!(frames < 10);
        assert!(anim.physics().pos.x > 1000.0);
    }

    #[test]
    fn test_spin_is_damped() {
        let mut anim = FlyAwayAnimation::new(FlyAwayConfig {
            margin: 1.0e6,
            ..FlyAwayConfig::default()
        });
        anim.start(Vec2::ZERO, 0.0, 1.0, None);
        let initial = anim.physics().angular_velocity.abs();
        anim.update(0.5, SCREEN);
        assert!(anim.physics().angular_velocity.abs() < initial);
        assert!(anim.physics().rotation < 0.0);
    }

    #[test]
    fn test_inactive_update_is_noop() {
        let mut anim = FlyAwayAnimation::new(FlyAwayConfig::default());
        assert!(!anim.update(0.1, SCREEN));
        assert_eq!(anim.physics(), &FlyAwayPhysics::default());
    }
}
