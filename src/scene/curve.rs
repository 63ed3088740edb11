//! Multiplier curve trace and its renderer

use glam::Vec2;

use super::viewport::{Layout, ViewportSystem};
use crate::renderer::{LayerId, RenderSurface, colors};

/// One sampled (seconds, multiplier) pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub t: f32,
    pub m: f32,
}

impl CurvePoint {
    pub const START: CurvePoint = CurvePoint { t: 0.0, m: 1.0 };
}

/// Sparse flight path, sampled by a per-device threshold
#[derive(Debug, Clone)]
pub struct CurveRenderer {
    points: Vec<CurvePoint>,
    threshold: f32,
    line_width: f32,
}

impl CurveRenderer {
    pub fn new(threshold: f32, line_width: f32) -> Self {
        Self {
            points: Vec::with_capacity(256),
            threshold,
            line_width,
        }
    }

    /// Change the sampling threshold (device class change)
    pub fn configure(&mut self, threshold: f32, line_width: f32) {
        self.threshold = threshold;
        self.line_width = line_width;
    }

    /// Keep `(t, m)` if it moved more than the threshold on either axis
    ///
    /// The first point is always kept. Returns whether the point was added.
    pub fn record(&mut self, t: f32, m: f32) -> bool {
        if let Some(last) = self.points.last() {
            let moved = (t - last.t).abs() > self.threshold || (m - last.m).abs() > self.threshold;
            if !moved {
                return false;
            }
        }
        self.points.push(CurvePoint { t, m });
        true
    }

    pub fn reset(&mut self) {
        self.points.clear();
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Recorded points mapped to screen space, with an optional live head
    pub fn screen_points(
        &self,
        viewport: &ViewportSystem,
        layout: &Layout,
        head: Option<CurvePoint>,
    ) -> Vec<Vec2> {
        self.points
            .iter()
            .chain(head.as_ref())
            .map(|p| viewport.to_screen(layout, p.t, p.m))
            .collect()
    }

    /// Filled area under the curve, then the curve itself
    pub fn render(
        &self,
        surface: &mut dyn RenderSurface,
        viewport: &ViewportSystem,
        layout: &Layout,
        head: Option<CurvePoint>,
    ) {
        surface.clear(LayerId::Area);
        surface.clear(LayerId::Curve);

        let points = self.screen_points(viewport, layout, head);
        if points.len() < 2 {
            return;
        }
        surface.fill_area(LayerId::Area, &points, layout.origin().y, colors::AREA);
        surface.stroke_polyline(LayerId::Curve, &points, self.line_width, colors::CURVE);
    }
}
