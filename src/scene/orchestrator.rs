//! Scene lifecycle and per-frame dispatch
//!
//! The orchestrator owns the render surface and every visual subsystem.
//! The host feeds it round snapshots through [`SceneOrchestrator::update_state`]
//! and calls [`SceneOrchestrator::frame`] from its animation callback.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;
use thiserror::Error;

use super::curve::{CurvePoint, CurveRenderer};
use super::effects::{Effect, EffectStack};
use super::flight::FlightAnimation;
use super::fly_away::FlyAwayAnimation;
use super::sprite::{AssetSource, PlaneVisual};
use super::viewport::{Layout, Viewport, ViewportSystem};
use crate::consts::{FRAME_DT, MAX_FRAME_DT};
use crate::renderer::{
    LayerId, RenderBackend, RenderError, RenderSurface, SpriteTransform, SurfaceConfig, colors,
};
use crate::settings::{DeviceClass, DeviceProfile, Settings};
use crate::sim::RoundPhase;

/// Seed for particle jitter when the host does not pick one
pub const DEFAULT_SCENE_SEED: u64 = 0x5EED_F11E;
/// Background grid spacing (px)
const GRID_SPACING: f32 = 80.0;
const GRID_LINE_WIDTH: f32 = 1.0;
const AXIS_WIDTH: f32 = 2.0;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("invalid scene size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
}

/// Where the scene is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    /// `init()` is awaiting the plane visual
    Initializing,
    Ready,
    Destroyed,
}

/// Cloneable destroy switch
///
/// Lets code that cannot borrow the orchestrator (an asset loader running
/// inside `init()`, a listener running inside `frame()`) ask for teardown.
/// The request is applied once the current operation completes.
#[derive(Debug, Clone, Default)]
pub struct SceneHandle {
    destroy_requested: Rc<Cell<bool>>,
}

impl SceneHandle {
    pub fn request_destroy(&self) {
        self.destroy_requested.set(true);
    }

    pub fn is_destroy_requested(&self) -> bool {
        self.destroy_requested.get()
    }
}

/// Top-level scene driver
pub struct SceneOrchestrator<S: RenderSurface> {
    settings: Settings,
    width: u32,
    height: u32,
    profile: DeviceProfile,
    layout: Layout,
    surface: Option<S>,
    lifecycle: Lifecycle,
    handle: SceneHandle,
    plane_visual: PlaneVisual,

    // Last accepted round snapshot
    phase: RoundPhase,
    multiplier: f32,
    elapsed: f32,

    viewport: ViewportSystem,
    flight: FlightAnimation,
    fly_away: FlyAwayAnimation,
    curve: CurveRenderer,
    effects: EffectStack,

    background_dirty: bool,
    frames: u64,
}

impl<S: RenderSurface> SceneOrchestrator<S> {
    pub fn new(width: u32, height: u32, settings: Settings) -> Self {
        let profile = settings.profile(width);
        let layout = Layout::new(width, height, profile.padding);
        let mut flight = FlightAnimation::new(layout.origin());
        flight.set_pulse(!settings.reduced_motion);

        Self {
            width,
            height,
            layout,
            surface: None,
            lifecycle: Lifecycle::Uninitialized,
            handle: SceneHandle::default(),
            plane_visual: PlaneVisual::Procedural,
            phase: RoundPhase::Idle,
            multiplier: 1.0,
            elapsed: 0.0,
            viewport: ViewportSystem::new(layout.available()),
            flight,
            fly_away: FlyAwayAnimation::new(settings.fly_away.clone()),
            curve: CurveRenderer::new(profile.curve_threshold, profile.curve_width),
            effects: EffectStack::new(&profile, settings.flash_intensity(), DEFAULT_SCENE_SEED),
            background_dirty: true,
            frames: 0,
            profile,
            settings,
        }
    }

    /// Reseed particle jitter (before `init()`)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.effects = EffectStack::new(&self.profile, self.settings.flash_intensity(), seed);
        self
    }

    /// Create the surface, load the plane visual and draw the background
    ///
    /// A destroy requested through [`SceneHandle`] while the plane visual is
    /// loading is applied as soon as initialisation has finished.
    pub async fn init<B, A>(&mut self, backend: &mut B, assets: &A) -> Result<(), SceneError>
    where
        B: RenderBackend<Surface = S>,
        A: AssetSource,
    {
        match self.lifecycle {
            Lifecycle::Uninitialized => {}
            Lifecycle::Destroyed => {
                log::debug!("init() after destroy ignored");
                return Ok(());
            }
            Lifecycle::Initializing | Lifecycle::Ready => {
                log::warn!("Scene already initialised");
                return Ok(());
            }
        }
        if self.width == 0 || self.height == 0 {
            return Err(SceneError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }

        self.lifecycle = Lifecycle::Initializing;
        let surface = match backend.create_surface(self.surface_config()) {
            Ok(surface) => surface,
            Err(e) => {
                self.lifecycle = Lifecycle::Uninitialized;
                log::error!("Failed to create render surface: {}", e);
                return Err(e.into());
            }
        };
        self.surface = Some(surface);

        self.plane_visual = match assets.load_plane().await {
            Ok(sprite) => {
                log::debug!("Loaded plane sprite {}x{}", sprite.width, sprite.height);
                PlaneVisual::Bitmap(sprite)
            }
            Err(e) => {
                log::warn!("{}; drawing vector plane", e);
                PlaneVisual::Procedural
            }
        };

        self.lifecycle = Lifecycle::Ready;
        self.background_dirty = true;
        if let Err(e) = self.render() {
            log::warn!("Initial render failed: {}", e);
        }
        log::info!(
            "Scene ready {}x{} ({:?}, {} plane)",
            self.width,
            self.height,
            self.profile.class,
            if self.plane_visual.is_procedural() {
                "vector"
            } else {
                "bitmap"
            }
        );

        if self.handle.is_destroy_requested() {
            log::info!("Destroy requested during init, tearing down");
            self.destroy();
        }
        Ok(())
    }

    /// Feed one round snapshot; invalid values are ignored
    ///
    /// Values are checked after narrowing to `f32`, so a finite `f64` that
    /// overflows the scene's precision is rejected too.
    pub fn update_state(&mut self, phase: RoundPhase, multiplier: f64, elapsed_seconds: f64) {
        let (narrow_multiplier, narrow_elapsed) = (multiplier as f32, elapsed_seconds as f32);
        if !narrow_multiplier.is_finite() || narrow_multiplier < 1.0 {
            log::trace!("Ignoring multiplier {}", multiplier);
            return;
        }
        if !narrow_elapsed.is_finite() || narrow_elapsed < 0.0 {
            log::trace!("Ignoring elapsed {}", elapsed_seconds);
            return;
        }
        if self.lifecycle == Lifecycle::Destroyed {
            return;
        }

        let previous = self.phase;
        self.phase = phase;
        self.multiplier = narrow_multiplier;
        self.elapsed = narrow_elapsed;
        if phase != previous {
            self.enter_phase(previous, phase);
        }
        if phase == RoundPhase::Flying {
            self.curve.record(self.elapsed, self.multiplier);
        }
    }

    fn enter_phase(&mut self, previous: RoundPhase, phase: RoundPhase) {
        log::debug!("Scene phase {} -> {}", previous.as_str(), phase.as_str());
        match phase {
            RoundPhase::Idle | RoundPhase::Betting => self.reset_round_visuals(),
            RoundPhase::Flying => {
                if previous != RoundPhase::Betting {
                    self.reset_round_visuals();
                }
                self.curve.reset();
            }
            RoundPhase::Crashed => {
                if previous == RoundPhase::Flying {
                    self.start_crash();
                }
            }
        }
    }

    fn reset_round_visuals(&mut self) {
        self.viewport.set_area(self.layout.available());
        self.viewport.reset();
        self.curve.reset();
        self.fly_away.stop();
        self.flight.reset_to(self.layout.origin());
        self.effects.trail.clear();
        self.effects.exhaust.clear();
    }

    fn start_crash(&mut self) {
        let pos = self.flight.pos();
        self.fly_away.start(
            pos,
            self.flight.rotation(),
            self.flight.scale() * self.profile.plane_scale,
            Some(self.flight.velocity()),
        );
        self.effects.explosion.trigger(pos);
        self.effects.flash.trigger();
        log::debug!("Fly-away from {:?} at {:.2}x", pos, self.multiplier);
    }

    /// Advance visuals by `dt` seconds, then render and present
    pub fn frame(&mut self, dt: f32) {
        if self.lifecycle != Lifecycle::Ready {
            return;
        }
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt.min(MAX_FRAME_DT)
        } else {
            FRAME_DT
        };

        self.update_visuals(dt);
        if let Err(e) = self.render() {
            log::warn!("Render failed, keeping last frame: {}", e);
        }
        self.frames += 1;

        if self.handle.is_destroy_requested() {
            self.destroy();
        }
    }

    fn update_visuals(&mut self, dt: f32) {
        match self.phase {
            RoundPhase::Idle | RoundPhase::Betting => {}
            RoundPhase::Flying => {
                self.viewport
                    .update(self.elapsed, self.multiplier, self.layout.available());
                let target = self
                    .viewport
                    .to_screen(&self.layout, self.elapsed, self.multiplier);
                let points = self.curve.points();
                let tail: Vec<Vec2> = points[points.len().saturating_sub(2)..]
                    .iter()
                    .map(|p| self.viewport.to_screen(&self.layout, p.t, p.m))
                    .collect();
                let rotation = FlightAnimation::target_rotation(&tail);
                self.flight.update(dt, target, rotation);

                self.effects.trail.emit(self.flight.pos());
                self.effects
                    .exhaust
                    .emit(dt, self.flight.pos(), self.flight.rotation());
            }
            RoundPhase::Crashed => {
                self.fly_away.update(dt, self.layout.size);
            }
        }
        self.effects.update(dt);
    }

    fn render(&mut self) -> Result<(), RenderError> {
        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };

        if self.background_dirty {
            draw_background(surface, &self.layout);
            self.background_dirty = false;
        }

        let head = (self.phase == RoundPhase::Flying).then_some(CurvePoint {
            t: self.elapsed,
            m: self.multiplier,
        });
        self.curve.render(surface, &self.viewport, &self.layout, head);

        surface.clear(LayerId::Plane);
        match self.phase {
            RoundPhase::Crashed => {
                if self.fly_away.is_active() {
                    self.plane_visual.draw(surface, self.fly_away.transform());
                }
            }
            _ => self
                .plane_visual
                .draw(surface, self.flight.transform(self.profile.plane_scale)),
        }

        self.effects.render(surface);
        surface.present()
    }

    /// Relayout for a new container size; failures are logged
    pub fn resize(&mut self, width: u32, height: u32) {
        if let Err(e) = self.try_resize(width, height) {
            log::warn!("Resize to {}x{} failed: {}", width, height, e);
        }
    }

    /// Like [`resize`](Self::resize), but reports failures to the caller
    ///
    /// On error the previous layout and surface stay in place.
    pub fn try_resize(&mut self, width: u32, height: u32) -> Result<(), SceneError> {
        if self.lifecycle == Lifecycle::Destroyed {
            return Ok(());
        }
        if width == 0 || height == 0 {
            return Err(SceneError::InvalidSize { width, height });
        }

        let profile = self.settings.profile(width);
        if let Some(surface) = self.surface.as_mut() {
            surface.resize(SurfaceConfig {
                width,
                height,
                resolution: profile.resolution,
            })?;
        }

        if profile.class != self.profile.class {
            log::info!(
                "Device class {:?} -> {:?}",
                self.profile.class,
                profile.class
            );
        }
        self.effects.configure(&profile);
        self.curve
            .configure(profile.curve_threshold, profile.curve_width);
        self.width = width;
        self.height = height;
        self.layout = Layout::new(width, height, profile.padding);
        self.profile = profile;

        match self.phase {
            RoundPhase::Idle | RoundPhase::Betting => {
                self.viewport.set_area(self.layout.available());
                self.viewport.reset();
                self.flight.reset_to(self.layout.origin());
            }
            RoundPhase::Flying | RoundPhase::Crashed => {
                self.viewport.set_area(self.layout.available());
            }
        }
        self.background_dirty = true;
        log::info!("Scene resized to {}x{}", width, height);
        Ok(())
    }

    /// Release the surface; safe to call any number of times
    pub fn destroy(&mut self) {
        match self.lifecycle {
            Lifecycle::Destroyed => {
                log::debug!("destroy() on destroyed scene ignored");
                return;
            }
            Lifecycle::Uninitialized => {}
            Lifecycle::Initializing | Lifecycle::Ready => {
                if let Some(mut surface) = self.surface.take() {
                    surface.release();
                }
            }
        }
        self.effects.clear();
        self.curve.reset();
        self.fly_away.stop();
        self.lifecycle = Lifecycle::Destroyed;
        self.handle.request_destroy();
        log::info!("Scene destroyed after {} frames", self.frames);
    }

    pub fn handle(&self) -> SceneHandle {
        self.handle.clone()
    }

    fn surface_config(&self) -> SurfaceConfig {
        SurfaceConfig {
            width: self.width,
            height: self.height,
            resolution: self.profile.resolution,
        }
    }

    /// Transform of the plane as it is currently drawn
    pub fn plane(&self) -> SpriteTransform {
        match self.phase {
            RoundPhase::Crashed if self.fly_away.is_active() => self.fly_away.transform(),
            RoundPhase::Crashed => SpriteTransform {
                alpha: 0.0,
                ..self.fly_away.transform()
            },
            _ => self.flight.transform(self.profile.plane_scale),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport.viewport()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn curve_points(&self) -> &[CurvePoint] {
        self.curve.points()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn device_class(&self) -> DeviceClass {
        self.profile.class
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }

    pub fn plane_visual(&self) -> &PlaneVisual {
        &self.plane_visual
    }

    pub fn effects(&self) -> &EffectStack {
        &self.effects
    }

    pub fn is_fly_away_active(&self) -> bool {
        self.fly_away.is_active()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// The live surface, if initialised and not destroyed
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }
}

impl<S: RenderSurface> Drop for SceneOrchestrator<S> {
    fn drop(&mut self) {
        if self.lifecycle != Lifecycle::Destroyed {
            self.destroy();
        }
    }
}

/// Background fill, grid and axes
fn draw_background(surface: &mut dyn RenderSurface, layout: &Layout) {
    surface.clear(LayerId::Background);
    surface.fill_rect(LayerId::Background, Vec2::ZERO, layout.size, colors::BACKGROUND);

    let origin = layout.origin();
    let available = layout.available();
    let top = origin.y - available.y;
    let right = origin.x + available.x;

    let mut x = origin.x + GRID_SPACING;
    while x < right {
        surface.stroke_polyline(
            LayerId::Background,
            &[Vec2::new(x, top), Vec2::new(x, origin.y)],
            GRID_LINE_WIDTH,
            colors::GRID,
        );
        x += GRID_SPACING;
    }
    let mut y = origin.y - GRID_SPACING;
    while y > top {
        surface.stroke_polyline(
            LayerId::Background,
            &[Vec2::new(origin.x, y), Vec2::new(right, y)],
            GRID_LINE_WIDTH,
            colors::GRID,
        );
        y -= GRID_SPACING;
    }

    surface.stroke_polyline(
        LayerId::Background,
        &[Vec2::new(origin.x, top), origin, Vec2::new(right, origin.y)],
        AXIS_WIDTH,
        colors::AXIS,
    );
}
