//! Render-layer capability interface
//!
//! The scene only talks to these traits. Any 2D/GPU binding that can clear a
//! layer and draw rects, circles, polylines, filled areas and one sprite is
//! pluggable; `draw_list` is the tessellating reference implementation.

pub mod draw_list;
pub mod shapes;
pub mod vertex;

pub use draw_list::{DrawListBackend, DrawListSurface, SurfaceStats};
pub use vertex::{Color, Vertex, colors};

use glam::Vec2;
use thiserror::Error;

/// Draw layers, bottom to top
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerId {
    Background,
    Area,
    Curve,
    Trail,
    Exhaust,
    Plane,
    Explosion,
    Flash,
}

impl LayerId {
    pub const COUNT: usize = 8;

    /// All layers in paint order
    pub const ALL: [LayerId; Self::COUNT] = [
        LayerId::Background,
        LayerId::Area,
        LayerId::Curve,
        LayerId::Trail,
        LayerId::Exhaust,
        LayerId::Plane,
        LayerId::Explosion,
        LayerId::Flash,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Size and pixel density of a drawing surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceConfig {
    /// Logical width in pixels
    pub width: u32,
    /// Logical height in pixels
    pub height: u32,
    /// Physical pixels per logical pixel
    pub resolution: f32,
}

impl SurfaceConfig {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Backing store size in physical pixels
    pub fn physical_size(&self) -> (u32, u32) {
        (
            (self.width as f32 * self.resolution).round() as u32,
            (self.height as f32 * self.resolution).round() as u32,
        )
    }
}

/// RGBA8 bitmap
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Placement of a sprite, anchored at its centre
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteTransform {
    pub pos: Vec2,
    /// Radians, clockwise on screen (y points down)
    pub rotation: f32,
    pub scale: f32,
    pub alpha: f32,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("surface has zero width or height")]
    ZeroSize,
    #[error("surface {width}x{height} exceeds the maximum dimension {max}")]
    SurfaceTooLarge { width: u32, height: u32, max: u32 },
    #[error("render surface lost")]
    Lost,
}

/// Allocates drawing surfaces attached to the host container
pub trait RenderBackend {
    type Surface: RenderSurface;

    fn create_surface(&mut self, config: SurfaceConfig) -> Result<Self::Surface, RenderError>;
}

/// A layered, cleared-and-redrawn 2D drawing surface
///
/// Coordinates are logical pixels with the origin top-left and y down.
pub trait RenderSurface {
    fn config(&self) -> SurfaceConfig;

    fn resize(&mut self, config: SurfaceConfig) -> Result<(), RenderError>;

    /// Drop everything drawn on a layer
    fn clear(&mut self, layer: LayerId);

    fn fill_rect(&mut self, layer: LayerId, min: Vec2, size: Vec2, color: Color);

    fn fill_circle(&mut self, layer: LayerId, center: Vec2, radius: f32, color: Color);

    fn stroke_polyline(&mut self, layer: LayerId, points: &[Vec2], width: f32, color: Color);

    /// Convex polygon
    fn fill_polygon(&mut self, layer: LayerId, points: &[Vec2], color: Color);

    /// Region between a polyline and the horizontal line `y = baseline`
    fn fill_area(&mut self, layer: LayerId, points: &[Vec2], baseline: f32, color: Color);

    fn draw_sprite(&mut self, layer: LayerId, sprite: &Sprite, transform: SpriteTransform);

    /// Finish the frame
    fn present(&mut self) -> Result<(), RenderError>;

    /// Free the surface; nothing may be drawn afterwards
    fn release(&mut self);
}
