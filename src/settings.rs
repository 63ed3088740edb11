//! Scene settings and device-class profiles
//!
//! Persisted as JSON next to the host; everything the scene needs to know
//! about mobile vs desktop lives in [`DeviceProfile`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::MOBILE_BREAKPOINT;
use crate::scene::FlyAwayConfig;
use crate::sim::EngineConfig;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Free-list capacity of each particle pool
    pub fn pool_capacity(&self) -> usize {
        match self {
            QualityPreset::Low => 50,
            QualityPreset::Medium => 100,
            QualityPreset::High => 200,
        }
    }

    /// Exhaust particles emitted per second of flight
    pub fn exhaust_rate(&self) -> f32 {
        match self {
            QualityPreset::Low => 20.0,
            QualityPreset::Medium => 40.0,
            QualityPreset::High => 60.0,
        }
    }

    /// Particles in the core explosion burst
    pub fn explosion_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 24,
            QualityPreset::Medium => 40,
            QualityPreset::High => 64,
        }
    }

    /// Trail length multiplier (1.0 = full)
    pub fn trail_quality(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.5,
            QualityPreset::Medium => 0.75,
            QualityPreset::High => 1.0,
        }
    }
}

/// Coarse device class derived from the surface width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceClass {
    Mobile,
    Desktop,
}

impl DeviceClass {
    pub fn from_width(width: u32) -> Self {
        if width < MOBILE_BREAKPOINT {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }
}

/// Space reserved around the graph for axes and labels (pixels)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// Every constant that differs between mobile and desktop
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceProfile {
    pub class: DeviceClass,
    /// Minimum delta (either axis) before a new curve point is kept
    pub curve_threshold: f32,
    /// Curve stroke width (px)
    pub curve_width: f32,
    /// Maximum points in the plane trail
    pub trail_cap: usize,
    /// Particle pool free-list capacity
    pub pool_capacity: usize,
    /// Exhaust particles per second (0 disables)
    pub exhaust_rate: f32,
    /// Core explosion burst size (0 disables)
    pub explosion_particles: usize,
    /// Render resolution multiplier
    pub resolution: f32,
    /// Plane sprite base scale
    pub plane_scale: f32,
    pub padding: Padding,
}

impl DeviceProfile {
    pub fn for_class(class: DeviceClass, quality: QualityPreset) -> Self {
        match class {
            DeviceClass::Mobile => Self {
                class,
                curve_threshold: 0.08,
                curve_width: 3.0,
                trail_cap: (20.0 * quality.trail_quality()).round() as usize,
                pool_capacity: quality.pool_capacity() / 2,
                exhaust_rate: quality.exhaust_rate() * 0.5,
                explosion_particles: quality.explosion_particles() / 2,
                resolution: 1.5,
                plane_scale: 0.7,
                padding: Padding {
                    left: 36.0,
                    right: 24.0,
                    top: 24.0,
                    bottom: 32.0,
                },
            },
            DeviceClass::Desktop => Self {
                class,
                curve_threshold: 0.05,
                curve_width: 4.0,
                trail_cap: (40.0 * quality.trail_quality()).round() as usize,
                pool_capacity: quality.pool_capacity(),
                exhaust_rate: quality.exhaust_rate(),
                explosion_particles: quality.explosion_particles(),
                resolution: 2.0,
                plane_scale: 1.0,
                padding: Padding {
                    left: 60.0,
                    right: 40.0,
                    top: 40.0,
                    bottom: 48.0,
                },
            },
        }
    }
}

/// Scene settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Forced device class (None = derive from surface width)
    pub device_class: Option<DeviceClass>,

    // === Visual Effects ===
    /// Plane trail
    pub trails: bool,
    /// Exhaust and explosion particles
    pub particles: bool,
    /// Crash flash overlay
    pub flash: bool,

    // === Accessibility ===
    /// Reduced motion (dims flashes, no scale pulse)
    pub reduced_motion: bool,

    // === Simulation ===
    pub engine: EngineConfig,
    pub fly_away: FlyAwayConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            device_class: None,

            // Visual effects - all on by default
            trails: true,
            particles: true,
            flash: true,

            // Accessibility
            reduced_motion: false,

            engine: EngineConfig::default(),
            fly_away: FlyAwayConfig::default(),
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Device class for a surface of the given width
    pub fn resolve_class(&self, width: u32) -> DeviceClass {
        self.device_class
            .unwrap_or_else(|| DeviceClass::from_width(width))
    }

    /// Effective profile for a surface width (applies effect toggles)
    pub fn profile(&self, width: u32) -> DeviceProfile {
        let mut profile = DeviceProfile::for_class(self.resolve_class(width), self.quality);
        if !self.particles {
            profile.exhaust_rate = 0.0;
            profile.explosion_particles = 0;
        }
        if !self.trails {
            profile.trail_cap = 0;
        }
        profile
    }

    /// Peak flash alpha (0 = disabled, halved under reduced motion)
    pub fn flash_intensity(&self) -> f32 {
        match (self.flash, self.reduced_motion) {
            (false, _) => 0.0,
            (true, true) => 0.35,
            (true, false) => 0.7,
        }
    }

    /// Parse settings; engine values are sanitized before use
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.engine = settings.engine.sanitized();
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Malformed settings in {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::info!("Using default settings ({}: {})", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_class_breakpoint() {
        assert_eq!(DeviceClass::from_width(320), DeviceClass::Mobile);
        assert_eq!(DeviceClass::from_width(767), DeviceClass::Mobile);
        assert_eq!(DeviceClass::from_width(768), DeviceClass::Desktop);
        assert_eq!(DeviceClass::from_width(1024), DeviceClass::Desktop);
    }

    #[test]
    fn test_profile_thresholds() {
        let settings = Settings::default();
        assert_eq!(settings.profile(1024).curve_threshold, 0.05);
        assert_eq!(settings.profile(320).curve_threshold, 0.08);
        assert!(settings.profile(320).trail_cap < settings.profile(1024).trail_cap);
    }

    #[test]
    fn test_forced_device_class() {
        let settings = Settings {
            device_class: Some(DeviceClass::Mobile),
            ..Settings::default()
        };
        assert_eq!(settings.resolve_class(1920), DeviceClass::Mobile);
    }

    #[test]
    fn test_toggles_disable_effects() {
        let settings = Settings {
            particles: false,
            trails: false,
            flash: false,
            ..Settings::default()
        };
        let profile = settings.profile(1024);
        assert_eq!(profile.exhaust_rate, 0.0);
        assert_eq!(profile.explosion_particles, 0);
        assert_eq!(profile.trail_cap, 0);
        assert_eq!(settings.flash_intensity(), 0.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "quality": "High", "reduced_motion": true }"#)
            .expect("valid settings json");
        assert_eq!(settings.quality, QualityPreset::High);
        assert!(settings.reduced_motion);
        assert!(settings.trails);
        assert_eq!(settings.engine.history_len, crate::consts::HISTORY_LEN);
    }

    #[test]
    fn test_json_engine_values_are_bounded() {
        let settings = Settings::from_json(
            r#"{ "engine": { "history_len": 40, "growth_rate": 0.0, "betting_seconds": 2.0 } }"#,
        )
        .expect("valid settings json");
        assert_eq!(settings.engine.history_len, crate::consts::HISTORY_LEN);
        assert_eq!(settings.engine.growth_rate, crate::consts::GROWTH_RATE);
        assert_eq!(settings.engine.betting_seconds, 2.0);
    }

    #[test]
    fn test_json_roundtrip_preserves_quality() {
        let settings = Settings::from_preset(QualityPreset::Low);
        let json = settings.to_json().expect("serializable");
        let back = Settings::from_json(&json).expect("parseable");
        assert_eq!(back.quality, QualityPreset::Low);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings = Settings::load_from(Path::new("/nonexistent/crash-flight.json"));
        assert_eq!(settings.quality, QualityPreset::Medium);
    }

    #[test]
    fn test_quality_parse() {
        assert_eq!(QualityPreset::parse("MED"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
        assert_eq!(QualityPreset::High.as_str(), "High");
    }
}
