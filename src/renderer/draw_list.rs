//! Tessellating reference surface
//!
//! Records every draw call as triangles in per-layer vertex lists, ready to
//! be uploaded by a GPU binding (`bytemuck::cast_slice`). Used by the
//! headless host and by tests.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use super::shapes;
use super::vertex::{Color, Vertex, with_alpha};
use super::{
    LayerId, RenderBackend, RenderError, RenderSurface, Sprite, SpriteTransform, SurfaceConfig,
};

/// Default maximum texture dimension (physical pixels)
pub const DEFAULT_MAX_DIMENSION: u32 = 8192;

/// Counters shared between a backend and the surfaces it created
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceStats {
    pub created: u32,
    pub released: u32,
    pub resizes: u32,
    pub frames_presented: u64,
    /// Vertex count of the last presented frame
    pub last_frame_vertices: usize,
}

/// Backend that hands out [`DrawListSurface`]s
#[derive(Debug, Clone)]
pub struct DrawListBackend {
    stats: Rc<RefCell<SurfaceStats>>,
    max_dimension: u32,
}

impl Default for DrawListBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawListBackend {
    pub fn new() -> Self {
        Self::with_max_dimension(DEFAULT_MAX_DIMENSION)
    }

    /// Backend whose surfaces refuse to grow beyond `max_dimension` physical pixels
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            stats: Rc::new(RefCell::new(SurfaceStats::default())),
            max_dimension,
        }
    }

    /// Snapshot of the shared counters
    pub fn stats(&self) -> SurfaceStats {
        self.stats.borrow().clone()
    }
}

impl RenderBackend for DrawListBackend {
    type Surface = DrawListSurface;

    fn create_surface(&mut self, config: SurfaceConfig) -> Result<DrawListSurface, RenderError> {
        validate(config, self.max_dimension)?;
        self.stats.borrow_mut().created += 1;
        Ok(DrawListSurface {
            config,
            layers: std::array::from_fn(|_| Vec::new()),
            sprites: 0,
            released: false,
            max_dimension: self.max_dimension,
            stats: self.stats.clone(),
        })
    }
}

fn validate(config: SurfaceConfig, max_dimension: u32) -> Result<(), RenderError> {
    if config.width == 0 || config.height == 0 {
        return Err(RenderError::ZeroSize);
    }
    let (width, height) = config.physical_size();
    if width > max_dimension || height > max_dimension {
        return Err(RenderError::SurfaceTooLarge {
            width,
            height,
            max: max_dimension,
        });
    }
    Ok(())
}

/// Per-layer triangle lists
#[derive(Debug)]
pub struct DrawListSurface {
    config: SurfaceConfig,
    layers: [Vec<Vertex>; LayerId::COUNT],
    sprites: usize,
    released: bool,
    max_dimension: u32,
    stats: Rc<RefCell<SurfaceStats>>,
}

impl DrawListSurface {
    /// Triangles currently recorded on a layer
    pub fn vertices(&self, layer: LayerId) -> &[Vertex] {
        &self.layers[layer.index()]
    }

    /// Raw bytes of a layer, for GPU upload
    pub fn vertex_bytes(&self, layer: LayerId) -> &[u8] {
        bytemuck::cast_slice(self.vertices(layer))
    }

    pub fn total_vertices(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    /// Sprites drawn since the plane layer was last cleared
    pub fn sprite_count(&self) -> usize {
        self.sprites
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    fn push(&mut self, layer: LayerId, vertices: Vec<Vertex>) {
        if self.released {
            return;
        }
        self.layers[layer.index()].extend(vertices);
    }
}

impl RenderSurface for DrawListSurface {
    fn config(&self) -> SurfaceConfig {
        self.config
    }

    fn resize(&mut self, config: SurfaceConfig) -> Result<(), RenderError> {
        if self.released {
            return Err(RenderError::Lost);
        }
        validate(config, self.max_dimension)?;
        self.config = config;
        self.stats.borrow_mut().resizes += 1;
        Ok(())
    }

    fn clear(&mut self, layer: LayerId) {
        self.layers[layer.index()].clear();
        if layer == LayerId::Plane {
            self.sprites = 0;
        }
    }

    fn fill_rect(&mut self, layer: LayerId, min: Vec2, size: Vec2, color: Color) {
        self.push(layer, shapes::rect(min, size, color));
    }

    fn fill_circle(&mut self, layer: LayerId, center: Vec2, radius: f32, color: Color) {
        if radius <= 0.0 {
            return;
        }
        let segments = shapes::segments_for_radius(radius);
        self.push(layer, shapes::circle(center, radius, color, segments));
    }

    fn stroke_polyline(&mut self, layer: LayerId, points: &[Vec2], width: f32, color: Color) {
        self.push(layer, shapes::polyline(points, width, color));
    }

    fn fill_polygon(&mut self, layer: LayerId, points: &[Vec2], color: Color) {
        self.push(layer, shapes::convex_polygon(points, color));
    }

    fn fill_area(&mut self, layer: LayerId, points: &[Vec2], baseline: f32, color: Color) {
        self.push(layer, shapes::area(points, baseline, color));
    }

    fn draw_sprite(&mut self, layer: LayerId, sprite: &Sprite, transform: SpriteTransform) {
        if self.released || transform.alpha <= 0.0 {
            return;
        }
        // Textured quad; the tint carries alpha, texture sampling is the binding's job
        let half = Vec2::new(sprite.width as f32, sprite.height as f32) * 0.5 * transform.scale;
        let tint = with_alpha([1.0; 4], transform.alpha);
        self.push(
            layer,
            shapes::rotated_quad(transform.pos, half, transform.rotation, tint),
        );
        self.sprites += 1;
    }

    fn present(&mut self) -> Result<(), RenderError> {
        if self.released {
            return Err(RenderError::Lost);
        }
        let total = self.total_vertices();
        let mut stats = self.stats.borrow_mut();
        stats.frames_presented += 1;
        stats.last_frame_vertices = total;
        Ok(())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        for layer in &mut self.layers {
            layer.clear();
        }
        self.stats.borrow_mut().released += 1;
    }
}

impl Drop for DrawListSurface {
    fn drop(&mut self) {
        if !self.released {
            log::warn!("DrawListSurface dropped without release");
        }
    }
}
