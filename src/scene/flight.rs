//! Plane animation while flying
//!
//! The target position comes straight from the viewport mapping; the drawn
//! position and rotation chase it with frame-rate independent smoothing.

use glam::Vec2;

use crate::renderer::SpriteTransform;
use crate::smoothing;

/// Position convergence rate (1/s)
pub const POSITION_SMOOTHING: f32 = 12.0;
/// Rotation convergence rate (1/s)
pub const ROTATION_SMOOTHING: f32 = 8.0;
/// Fraction of the curve slope applied to the nose
pub const ROTATION_DAMPING: f32 = 0.75;
/// Nose-up tilt used before the curve has a direction (radians)
pub const TAKEOFF_TILT: f32 = -0.1;
/// Scale pulse angular speed (rad/s)
pub const PULSE_SPEED: f32 = 4.0;
/// Scale pulse amplitude
pub const PULSE_AMOUNT: f32 = 0.03;

/// Smoothed plane transform during the flying phase
#[derive(Debug, Clone)]
pub struct FlightAnimation {
    pos: Vec2,
    rotation: f32,
    scale: f32,
    velocity: Vec2,
    flight_time: f32,
    pulse: bool,
}

impl FlightAnimation {
    pub fn new(origin: Vec2) -> Self {
        Self {
            pos: origin,
            rotation: TAKEOFF_TILT,
            scale: 1.0,
            velocity: Vec2::ZERO,
            flight_time: 0.0,
            pulse: true,
        }
    }

    /// Park the plane at the graph origin, ready for takeoff
    pub fn reset_to(&mut self, origin: Vec2) {
        self.pos = origin;
        self.rotation = TAKEOFF_TILT;
        self.scale = 1.0;
        self.velocity = Vec2::ZERO;
        self.flight_time = 0.0;
    }

    /// Enable or disable the breathing scale pulse
    pub fn set_pulse(&mut self, enabled: bool) {
        self.pulse = enabled;
        if !enabled {
            self.scale = 1.0;
        }
    }

    /// Nose angle from the last two curve points (screen space)
    pub fn target_rotation(screen_points: &[Vec2]) -> f32 {
        match screen_points {
            [.., a, b] => {
                let d = *b - *a;
                if d.length_squared() <= f32::EPSILON {
                    TAKEOFF_TILT
                } else {
                    d.y.atan2(d.x) * ROTATION_DAMPING
                }
            }
            _ => TAKEOFF_TILT,
        }
    }

    /// Move toward `target` and `target_rotation` by one frame
    pub fn update(&mut self, dt: f32, target: Vec2, target_rotation: f32) {
        if dt <= 0.0 {
            return;
        }
        let prev = self.pos;
        self.pos += (target - self.pos) * smoothing(POSITION_SMOOTHING, dt);
        self.rotation += (target_rotation - self.rotation) * smoothing(ROTATION_SMOOTHING, dt);
        self.velocity = (self.pos - prev) / dt;

        self.flight_time += dt;
        self.scale = if self.pulse {
            1.0 + (self.flight_time * PULSE_SPEED).sin() * PULSE_AMOUNT
        } else {
            1.0
        };
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Screen velocity over the last update (px/s)
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn flight_time(&self) -> f32 {
        self.flight_time
    }

    pub fn transform(&self, base_scale: f32) -> SpriteTransform {
        SpriteTransform {
            pos: self.pos,
            rotation: self.rotation,
            scale: self.scale * base_scale,
            alpha: 1.0,
        }
    }
}
