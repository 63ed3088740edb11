//! Shape tessellation for 2D primitives
//!
//! Everything becomes a triangle list of [`Vertex`]es.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Color, Vertex};

/// Circle segment count scaled to radius (small particles stay cheap)
pub fn segments_for_radius(radius: f32) -> u32 {
    ((radius * 1.5) as u32).clamp(6, 48)
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: Color, segments: u32) -> Vec<Vertex> {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for an axis-aligned rectangle
pub fn rect(min: Vec2, size: Vec2, color: Color) -> Vec<Vertex> {
    let max = min + size;
    vec![
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}

/// Generate vertices for a rotated rectangle centred on `center`
pub fn rotated_quad(center: Vec2, half_extents: Vec2, rotation: f32, color: Color) -> Vec<Vertex> {
    let axis_x = Vec2::from_angle(rotation) * half_extents.x;
    let axis_y = Vec2::from_angle(rotation).perp() * half_extents.y;

    let a = center - axis_x - axis_y;
    let b = center + axis_x - axis_y;
    let c = center - axis_x + axis_y;
    let d = center + axis_x + axis_y;

    vec![
        Vertex::new(a.x, a.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(c.x, c.y, color),
        Vertex::new(c.x, c.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(d.x, d.y, color),
    ]
}

/// Generate vertices for a thick polyline (one quad per segment)
pub fn polyline(points: &[Vec2], width: f32, color: Color) -> Vec<Vertex> {
    if points.len() < 2 || width <= 0.0 {
        return Vec::new();
    }

    let half = width * 0.5;
    let mut vertices = Vec::with_capacity((points.len() - 1) * 6);

    for pair in points.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);

        // Direction from p1 to p2
        let dir = (p2 - p1).normalize_or_zero();
        if dir == Vec2::ZERO {
            continue;
        }
        // Perpendicular for width
        let perp = Vec2::new(-dir.y, dir.x) * half;

        // Quad corners
        let v1a = p1 + perp;
        let v1b = p1 - perp;
        let v2a = p2 + perp;
        let v2b = p2 - perp;

        // Two triangles
        vertices.push(Vertex::new(v1a.x, v1a.y, color));
        vertices.push(Vertex::new(v1b.x, v1b.y, color));
        vertices.push(Vertex::new(v2a.x, v2a.y, color));

        vertices.push(Vertex::new(v2a.x, v2a.y, color));
        vertices.push(Vertex::new(v1b.x, v1b.y, color));
        vertices.push(Vertex::new(v2b.x, v2b.y, color));
    }

    vertices
}

/// Generate vertices for a convex polygon (triangle fan from the first point)
pub fn convex_polygon(points: &[Vec2], color: Color) -> Vec<Vertex> {
    if points.len() < 3 {
        return Vec::new();
    }

    let origin = points[0];
    let mut vertices = Vec::with_capacity((points.len() - 2) * 3);
    for pair in points[1..].windows(2) {
        vertices.push(Vertex::new(origin.x, origin.y, color));
        vertices.push(Vertex::new(pair[0].x, pair[0].y, color));
        vertices.push(Vertex::new(pair[1].x, pair[1].y, color));
    }
    vertices
}

/// Generate vertices for the region between a polyline and `y = baseline`
///
/// Each segment becomes a trapezoid down to the baseline, so the curve does
/// not need to be convex.
pub fn area(points: &[Vec2], baseline: f32, color: Color) -> Vec<Vertex> {
    if points.len() < 2 {
        return Vec::new();
    }

    let mut vertices = Vec::with_capacity((points.len() - 1) * 6);
    for pair in points.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);

        vertices.push(Vertex::new(p1.x, p1.y, color));
        vertices.push(Vertex::new(p2.x, p2.y, color));
        vertices.push(Vertex::new(p1.x, baseline, color));

        vertices.push(Vertex::new(p1.x, baseline, color));
        vertices.push(Vertex::new(p2.x, p2.y, color));
        vertices.push(Vertex::new(p2.x, baseline, color));
    }
    vertices
}
