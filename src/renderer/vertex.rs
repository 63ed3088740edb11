//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Straight (non-premultiplied) RGBA
pub type Color = [f32; 4];

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: Color) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }
}

/// Colors for scene elements
pub mod colors {
    use super::Color;

    pub const BACKGROUND: Color = [0.05, 0.04, 0.09, 1.0];
    pub const GRID: Color = [1.0, 1.0, 1.0, 0.06];
    pub const AXIS: Color = [1.0, 1.0, 1.0, 0.18];
    pub const CURVE: Color = [0.93, 0.11, 0.32, 1.0];
    pub const AREA: Color = [0.93, 0.11, 0.32, 0.22];
    pub const TRAIL: Color = [1.0, 0.55, 0.6, 1.0];
    pub const PLANE_BODY: Color = [0.93, 0.11, 0.32, 1.0];
    pub const PLANE_WING: Color = [0.75, 0.06, 0.24, 1.0];
    pub const PLANE_COCKPIT: Color = [0.85, 0.93, 1.0, 1.0];
    pub const EXHAUST_HOT: Color = [1.0, 0.85, 0.4, 1.0];
    pub const EXHAUST_COOL: Color = [0.6, 0.6, 0.65, 1.0];
    pub const FIRE_CORE: Color = [1.0, 0.95, 0.7, 1.0];
    pub const FIRE: Color = [1.0, 0.5, 0.1, 1.0];
    pub const EMBER: Color = [0.9, 0.2, 0.05, 1.0];
    pub const SMOKE: Color = [0.35, 0.33, 0.35, 1.0];
    pub const FLASH_START: Color = [1.0, 1.0, 1.0, 1.0];
    pub const FLASH_END: Color = [1.0, 0.35, 0.1, 1.0];
}

/// Replace the alpha channel (multiplies, so faded colors stay faded)
#[inline]
pub fn with_alpha(color: Color, alpha: f32) -> Color {
    [color[0], color[1], color[2], color[3] * alpha.clamp(0.0, 1.0)]
}

/// Blend two colors channel by channel
#[inline]
pub fn mix(a: Color, b: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    [
        crate::lerp(a[0], b[0], t),
        crate::lerp(a[1], b[1], t),
        crate::lerp(a[2], b[2], t),
        crate::lerp(a[3], b[3], t),
    ]
}
