//! Plane visual: a loaded bitmap, or a vector plane drawn from primitives

use std::path::PathBuf;

use glam::Vec2;
use thiserror::Error;

use crate::renderer::vertex::with_alpha;
use crate::renderer::{Color, LayerId, RenderSurface, Sprite, SpriteTransform, colors};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read plane sprite: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed plane sprite: {0}")]
    Malformed(String),
    #[error("no plane sprite available")]
    Unavailable,
}

/// Where the plane bitmap comes from
#[allow(async_fn_in_trait)]
pub trait AssetSource {
    async fn load_plane(&self) -> Result<Sprite, AssetError>;
}

/// Always fails; the scene falls back to the vector plane
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssets;

impl AssetSource for NoAssets {
    async fn load_plane(&self) -> Result<Sprite, AssetError> {
        Err(AssetError::Unavailable)
    }
}

/// Raw RGBA8 bitmap on disk with known dimensions
///
/// The read is a plain blocking `std::fs::read`; it never yields. Hosts on
/// a shared async executor should load the bytes themselves and hand them
/// over through [`MemoryAssets`].
#[derive(Debug, Clone)]
pub struct FileAssets {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl AssetSource for FileAssets {
    async fn load_plane(&self) -> Result<Sprite, AssetError> {
        let rgba = std::fs::read(&self.path)?;
        sprite_from_rgba(self.width, self.height, rgba)
    }
}

/// Already-decoded sprite (embedding hosts, tests)
#[derive(Debug, Clone)]
pub struct MemoryAssets(pub Sprite);

impl AssetSource for MemoryAssets {
    async fn load_plane(&self) -> Result<Sprite, AssetError> {
        let Sprite { width, height, rgba } = self.0.clone();
        sprite_from_rgba(width, height, rgba)
    }
}

/// Validate raw pixels against the claimed dimensions
pub fn sprite_from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Sprite, AssetError> {
    if width == 0 || height == 0 {
        return Err(AssetError::Malformed(format!("{}x{} sprite", width, height)));
    }
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(AssetError::Malformed(format!(
            "expected {} bytes for {}x{}, got {}",
            expected,
            width,
            height,
            rgba.len()
        )));
    }
    Ok(Sprite {
        width,
        height,
        rgba,
    })
}

// Vector plane outline, nose along +x, roughly 60px long
const FUSELAGE: [Vec2; 6] = [
    Vec2::new(30.0, 0.0),
    Vec2::new(18.0, -6.0),
    Vec2::new(-24.0, -5.0),
    Vec2::new(-28.0, 0.0),
    Vec2::new(-24.0, 5.0),
    Vec2::new(18.0, 6.0),
];
const UPPER_WING: [Vec2; 4] = [
    Vec2::new(6.0, -4.0),
    Vec2::new(-10.0, -22.0),
    Vec2::new(-16.0, -22.0),
    Vec2::new(-6.0, -4.0),
];
const LOWER_WING: [Vec2; 4] = [
    Vec2::new(6.0, 4.0),
    Vec2::new(-6.0, 4.0),
    Vec2::new(-16.0, 22.0),
    Vec2::new(-10.0, 22.0),
];
const TAIL_FIN: [Vec2; 4] = [
    Vec2::new(-18.0, -4.0),
    Vec2::new(-26.0, -14.0),
    Vec2::new(-30.0, -14.0),
    Vec2::new(-27.0, -4.0),
];
const COCKPIT: Vec2 = Vec2::new(14.0, -2.0);
const COCKPIT_RADIUS: f32 = 3.5;

/// What gets drawn on the plane layer
#[derive(Debug, Clone, PartialEq)]
pub enum PlaneVisual {
    Bitmap(Sprite),
    Procedural,
}

impl PlaneVisual {
    pub fn is_procedural(&self) -> bool {
        matches!(self, PlaneVisual::Procedural)
    }

    /// Draw onto the plane layer (the caller clears it)
    pub fn draw(&self, surface: &mut dyn RenderSurface, transform: SpriteTransform) {
        if transform.alpha <= 0.0 {
            return;
        }
        match self {
            PlaneVisual::Bitmap(sprite) => surface.draw_sprite(LayerId::Plane, sprite, transform),
            PlaneVisual::Procedural => draw_procedural(surface, transform),
        }
    }
}

fn place(transform: &SpriteTransform, local: Vec2) -> Vec2 {
    transform.pos + Vec2::from_angle(transform.rotation).rotate(local * transform.scale)
}

fn fill_part(surface: &mut dyn RenderSurface, transform: &SpriteTransform, outline: &[Vec2], color: Color) {
    let points: Vec<Vec2> = outline.iter().map(|p| place(transform, *p)).collect();
    surface.fill_polygon(LayerId::Plane, &points, with_alpha(color, transform.alpha));
}

fn draw_procedural(surface: &mut dyn RenderSurface, transform: SpriteTransform) {
    fill_part(surface, &transform, &UPPER_WING, colors::PLANE_WING);
    fill_part(surface, &transform, &LOWER_WING, colors::PLANE_WING);
    fill_part(surface, &transform, &TAIL_FIN, colors::PLANE_WING);
    fill_part(surface, &transform, &FUSELAGE, colors::PLANE_BODY);
    surface.fill_circle(
        LayerId::Plane,
        place(&transform, COCKPIT),
        COCKPIT_RADIUS * transform.scale,
        with_alpha(colors::PLANE_COCKPIT, transform.alpha),
    );
}
