//! Full-screen crash flash

use glam::Vec2;

use super::Effect;
use crate::renderer::vertex::{mix, with_alpha};
use crate::renderer::{Color, LayerId, RenderSurface, colors};

/// Flash length (seconds)
pub const FLASH_DURATION: f32 = 0.4;

#[derive(Debug, Clone)]
pub struct FlashEffect {
    /// Peak alpha (0 disables)
    intensity: f32,
    elapsed: f32,
    active: bool,
}

impl FlashEffect {
    pub fn new(intensity: f32) -> Self {
        Self {
            intensity,
            elapsed: 0.0,
            active: false,
        }
    }

    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity;
    }

    pub fn trigger(&mut self) {
        if self.intensity <= 0.0 {
            return;
        }
        self.elapsed = 0.0;
        self.active = true;
    }

    fn progress(&self) -> f32 {
        (self.elapsed / FLASH_DURATION).clamp(0.0, 1.0)
    }

    /// Current overlay alpha, decaying linearly to zero
    pub fn alpha(&self) -> f32 {
        if !self.active {
            return 0.0;
        }
        self.intensity * (1.0 - self.progress())
    }

    /// Current overlay color, start color blending to end color
    pub fn color(&self) -> Color {
        with_alpha(
            mix(colors::FLASH_START, colors::FLASH_END, self.progress()),
            self.alpha(),
        )
    }
}

impl Effect for FlashEffect {
    fn layer(&self) -> LayerId {
        LayerId::Flash
    }

    fn update(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        self.elapsed += dt;
        if self.elapsed >= FLASH_DURATION {
            self.active = false;
        }
    }

    fn render(&self, surface: &mut dyn RenderSurface) {
        surface.clear(LayerId::Flash);
        let alpha = self.alpha();
        if alpha > 0.0 {
            surface.fill_rect(LayerId::Flash, Vec2::ZERO, surface.config().size(), self.color());
        }
    }

    fn clear(&mut self) {
        self.active = false;
        self.elapsed = 0.0;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decays_to_zero() {
        let mut flash = FlashEffect::new(0.7);
        flash.trigger();
        assert_eq!(flash.alpha(), 0.7);
        flash.update(FLASH_DURATION / 2.0);
        assert!((flash.alpha() - 0.35).abs() < 1e-5);
        flash.update(FLASH_DURATION);
        assert_eq!(flash.alpha(), 0.0);
        assert!(!flash.is_active());
    }

    #[test]
    fn test_color_blends_over_time() {
        let mut flash = FlashEffect::new(1.0);
        flash.trigger();
        let start = flash.color();
        assert_eq!(&start[..3], &colors::FLASH_START[..3]);
        flash.update(FLASH_DURATION * 0.75);
        let later = flash.color();
        assert!(later[1] < start[1]);
    }

    #[test]
    fn test_zero_intensity_never_triggers() {
        let mut flash = FlashEffect::new(0.0);
        flash.trigger();
        assert!(!flash.is_active());
    }
}
