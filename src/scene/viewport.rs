//! Viewport auto-scaling
//!
//! Maps simulation coordinates (seconds, multiplier) to screen pixels. The
//! visible windows expand once a value passes 80% of the window and never
//! shrink until `reset()`.

use glam::Vec2;

use crate::consts::{DEFAULT_MULT_WINDOW, DEFAULT_TIME_WINDOW, WINDOW_EXPAND_AT};
use crate::settings::Padding;

/// Pixels-per-unit scales and the visible windows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale_x: f32,
    pub scale_y: f32,
    /// Visible seconds
    pub max_time_window: f32,
    /// Highest visible multiplier
    pub max_mult_window: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            max_time_window: DEFAULT_TIME_WINDOW,
            max_mult_window: DEFAULT_MULT_WINDOW,
        }
    }
}

/// Graph placement inside the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub size: Vec2,
    pub padding: Padding,
}

impl Layout {
    pub fn new(width: u32, height: u32, padding: Padding) -> Self {
        Self {
            size: Vec2::new(width as f32, height as f32),
            padding,
        }
    }

    /// Drawable graph area (never below 1px per axis)
    pub fn available(&self) -> Vec2 {
        Vec2::new(
            (self.size.x - self.padding.left - self.padding.right).max(1.0),
            (self.size.y - self.padding.top - self.padding.bottom).max(1.0),
        )
    }

    /// Screen position of (t = 0, m = 1.00)
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.padding.left, self.size.y - self.padding.bottom)
    }
}

/// Owns the viewport and its growth policy
#[derive(Debug, Clone, Default)]
pub struct ViewportSystem {
    viewport: Viewport,
    area: Vec2,
}

impl ViewportSystem {
    pub fn new(area: Vec2) -> Self {
        let mut system = Self {
            viewport: Viewport::default(),
            area,
        };
        system.rescale();
        system
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Grow windows if needed and recompute scales
    pub fn update(&mut self, elapsed_seconds: f32, multiplier: f32, area: Vec2) {
        let vp = &mut self.viewport;
        if elapsed_seconds > vp.max_time_window * WINDOW_EXPAND_AT {
            vp.max_time_window =
                (elapsed_seconds / WINDOW_EXPAND_AT).max(DEFAULT_TIME_WINDOW);
        }
        if multiplier > vp.max_mult_window * WINDOW_EXPAND_AT {
            vp.max_mult_window = (multiplier / WINDOW_EXPAND_AT).max(DEFAULT_MULT_WINDOW);
        }
        self.area = area;
        self.rescale();
    }

    /// Restore default windows (new round, or resize while not flying)
    pub fn reset(&mut self) {
        self.viewport.max_time_window = DEFAULT_TIME_WINDOW;
        self.viewport.max_mult_window = DEFAULT_MULT_WINDOW;
        self.rescale();
    }

    /// New render area without touching the windows
    pub fn set_area(&mut self, area: Vec2) {
        self.area = area;
        self.rescale();
    }

    fn rescale(&mut self) {
        let vp = &mut self.viewport;
        vp.scale_x = self.area.x / vp.max_time_window.max(0.1);
        vp.scale_y = self.area.y / (vp.max_mult_window - 1.0).max(0.1);
    }

    /// Screen position of a (seconds, multiplier) sample
    pub fn to_screen(&self, layout: &Layout, t: f32, m: f32) -> Vec2 {
        let origin = layout.origin();
        Vec2::new(
            origin.x + t * self.viewport.scale_x,
            origin.y - (m - 1.0) * self.viewport.scale_y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const AREA: Vec2 = Vec2::new(900.0, 600.0);

    #[test]
    fn test_default_scales() {
        let system = ViewportSystem::new(AREA);
        let vp = system.viewport();
        assert_eq!(vp.max_time_window, 10.0);
        assert_eq!(vp.max_mult_window, 2.0);
        assert_eq!(vp.scale_x, 90.0);
        assert_eq!(vp.scale_y, 600.0);
    }

    #[test]
    fn test_expands_past_eighty_percent() {
        let mut system = ViewportSystem::new(AREA);
        system.update(7.9, 1.5, AREA);
        assert_eq!(system.viewport().max_time_window, 10.0);

        system.update(9.0, 1.7, AREA);
        let vp = system.viewport();
        assert!((vp.max_time_window - 11.25).abs() < 1e-4);
        assert!((vp.max_mult_window - 2.125).abs() < 1e-4);
        assert!((vp.scale_x - 900.0 / 11.25).abs() < 1e-3);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut system = ViewportSystem::new(AREA);
        system.update(40.0, 12.0, AREA);
        system.reset();
        assert_eq!(system.viewport().max_time_window, 10.0);
        assert_eq!(system.viewport().max_mult_window, 2.0);
    }

    #[test]
    fn test_to_screen_origin() {
        let padding = Padding {
            left: 60.0,
            right: 40.0,
            top: 40.0,
            bottom: 48.0,
        };
        let layout = Layout::new(1000, 700, padding);
        let system = ViewportSystem::new(layout.available());
        assert_eq!(system.to_screen(&layout, 0.0, 1.0), Vec2::new(60.0, 652.0));
        let top_right = system.to_screen(&layout, 10.0, 2.0);
        assert!((top_right.x - 960.0).abs() < 1e-3);
        assert!((top_right.y - 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_layout_never_negative() {
        let padding = Padding {
            left: 60.0,
            right: 40.0,
            top: 40.0,
            bottom: 48.0,
        };
        let layout = Layout::new(50, 50, padding);
        assert_eq!(layout.available(), Vec2::ONE);
    }

    proptest! {
        #[test]
        fn windows_never_shrink_during_flight(
            samples in proptest::collection::vec((0.0f32..120.0, 1.0f32..150.0), 1..64)
        ) {
            let mut system = ViewportSystem::new(AREA);
            let mut t = 0.0f32;
            let mut m = 1.0f32;
            let mut last = system.viewport();
            for (dt, dm) in samples {
                // Flight values only move forward
                t += dt * 0.05;
                m = m.max(dm);
                system.update(t, m, AREA);
                let vp = system.viewport();
                prop_assert!(vp.max_time_window >= last.max_time_window);
                prop_assert!(vp.max_mult_window >= last.max_mult_window);
                prop_assert!(vp.scale_x.is_finite() && vp.scale_y.is_finite());
                last = vp;
            }
        }
    }
}
