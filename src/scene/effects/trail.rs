//! Fading ribbon behind the plane

use std::collections::VecDeque;

use glam::Vec2;

use super::Effect;
use crate::renderer::vertex::with_alpha;
use crate::renderer::{LayerId, RenderSurface, colors};

/// Fraction of alpha a trail point keeps after one second
pub const FADE_PER_SECOND: f32 = 0.05;
/// Points fainter than this are culled
pub const MIN_ALPHA: f32 = 0.02;
/// Minimum distance between recorded points (px)
const MIN_SPACING: f32 = 2.0;
const MAX_WIDTH: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub alpha: f32,
}

/// Trail points, oldest first
#[derive(Debug, Clone)]
pub struct TrailEffect {
    points: VecDeque<TrailPoint>,
    cap: usize,
}

impl TrailEffect {
    pub fn new(cap: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(cap),
            cap,
        }
    }

    /// Change the point cap, dropping the oldest points if over
    pub fn set_cap(&mut self, cap: usize) {
        self.cap = cap;
        self.enforce_cap();
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Record the plane position
    pub fn emit(&mut self, pos: Vec2) {
        if self.cap == 0 {
            return;
        }
        if let Some(last) = self.points.back()
            && last.pos.distance_squared(pos) < MIN_SPACING * MIN_SPACING
        {
            return;
        }
        self.points.push_back(TrailPoint { pos, alpha: 1.0 });
        self.enforce_cap();
    }

    fn enforce_cap(&mut self) {
        while self.points.len() > self.cap {
            self.points.pop_front();
        }
    }

    pub fn points(&self) -> impl Iterator<Item = &TrailPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Effect for TrailEffect {
    fn layer(&self) -> LayerId {
        LayerId::Trail
    }

    fn update(&mut self, dt: f32) {
        let fade = FADE_PER_SECOND.powf(dt);
        for p in &mut self.points {
            p.alpha *= fade;
        }
        self.points.retain(|p| p.alpha > MIN_ALPHA);
    }

    fn render(&self, surface: &mut dyn RenderSurface) {
        surface.clear(LayerId::Trail);
        for (a, b) in self.points.iter().zip(self.points.iter().skip(1)) {
            let alpha = (a.alpha + b.alpha) * 0.5;
            surface.stroke_polyline(
                LayerId::Trail,
                &[a.pos, b.pos],
                MAX_WIDTH * alpha,
                with_alpha(colors::TRAIL, alpha * 0.6),
            );
        }
    }

    fn clear(&mut self) {
        self.points.clear();
    }

    fn is_active(&self) -> bool {
        !self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_keeps_newest() {
        let mut trail = TrailEffect::new(5);
        for i in 0..10 {
            trail.emit(Vec2::new(i as f32 * 10.0, 0.0));
        }
        assert_eq!(trail.len(), 5);
        assert_eq!(trail.points().next().map(|p| p.pos.x), Some(50.0));

        trail.set_cap(2);
        assert_eq!(trail.len(), 2);
    }

    #[test]
    fn test_close_points_skipped() {
        let mut trail = TrailEffect::new(10);
        trail.emit(Vec2::ZERO);
        trail.emit(Vec2::new(1.0, 0.0));
        assert_eq!(trail.len(), 1);
    }

    #[test]
    fn test_fade_is_frame_rate_independent() {
        let mut a = TrailEffect::new(10);
        let mut b = TrailEffect::new(10);
        a.emit(Vec2::ZERO);
        b.emit(Vec2::ZERO);
        a.update(0.5);
        for _ in 0..30 {
            b.update(0.5 / 30.0);
        }
        let alpha_a = a.points().next().map(|p| p.alpha).unwrap_or(0.0);
        let alpha_b = b.points().next().map(|p| p.alpha).unwrap_or(0.0);
        assert!((alpha_a - alpha_b).abs() < 1e-4);
    }

    #[test]
    fn test_faded_points_culled() {
        let mut trail = TrailEffect::new(10);
        trail.emit(Vec2::ZERO);
        trail.update(2.0);
        assert!(trail.is_empty());
    }

    #[test]
    fn test_zero_cap_disables() {
        let mut trail = TrailEffect::new(0);
        trail.emit(Vec2::ZERO);
        assert!(!trail.is_active());
    }
}
