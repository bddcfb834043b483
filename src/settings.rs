//! Game settings and preferences
//!
//! Persisted separately from high scores in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::platform::storage;
use crate::sim::particles::MAX_PARTICLES;

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

    /// Next preset when cycling with the quality key
    pub fn next(&self) -> Self {
        match self {
            QualityPreset::Low => QualityPreset::Medium,
            QualityPreset::Medium => QualityPreset::High,
            QualityPreset::High => QualityPreset::Low,
        }
    }

    /// Maximum ink particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 96,
            QualityPreset::Medium => 256,
            QualityPreset::High => MAX_PARTICLES,
        }
    }

    /// Circle tessellation segments
    pub fn circle_segments(&self) -> u32 {
        match self {
            QualityPreset::Low => 12,
            QualityPreset::Medium => 20,
            QualityPreset::High => 32,
        }
    }

    /// Whether to draw the ink-wash paper grain
    pub fn paper_wash_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Screen shake on hits
    pub screen_shake: bool,
    /// Hitstop and slowmo
    pub juice: bool,
    /// Ink particle effects
    pub particles: bool,
    /// Full-screen flash on big impacts
    pub flash: bool,

    // === HUD ===
    pub show_fps: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Device ===
    /// Vibrate on hits (mobile)
    pub vibration: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, flashes or time effects)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            screen_shake: true,
            juice: true,
            particles: true,
            flash: true,

            show_fps: false,

            master_volume: 0.9,
            sfx_volume: 1.0,
            muted: false,
            mute_on_blur: true,

            vibration: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        if preset == QualityPreset::Low {
            self.flash = false;
        }
    }

    /// Toggle a setting from its hotkey (`KeyboardEvent.code`)
    ///
    /// Returns true when something changed and should be saved.
    pub fn handle_key(&mut self, code: &str) -> bool {
        match code {
            "KeyM" => self.muted = !self.muted,
            "KeyF" => self.show_fps = !self.show_fps,
            "KeyQ" => {
                self.apply_preset(self.quality.next());
                log::info!("Quality: {}", self.quality.as_str());
            }
            _ => return false,
        }
        true
    }

    /// Apply overrides from a URL query string such as `?quality=low&muted=1`
    ///
    /// Returns true when something changed.
    pub fn apply_query(&mut self, query: &str) -> bool {
        let mut changed = false;
        for pair in query.trim_start_matches('?').split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            match key {
                "quality" => match QualityPreset::parse(value) {
                    Some(preset) => {
                        self.apply_preset(preset);
                        changed = true;
                    }
                    None => log::warn!("Unknown quality preset {:?}", value),
                },
                "muted" => {
                    self.muted = matches!(value, "1" | "true");
                    changed = true;
                }
                _ => {}
            }
        }
        changed
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective hitstop/slowmo (respects reduced_motion)
    pub fn effective_juice(&self) -> bool {
        self.juice && !self.reduced_motion
    }

    /// Effective flash (respects reduced_motion)
    pub fn effective_flash(&self) -> bool {
        self.flash && !self.reduced_motion
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    const STORAGE_KEY: &'static str = "ink_blade_settings";

    /// Load from LocalStorage, falling back to defaults
    pub fn load() -> Self {
        match storage::load_json::<Settings>(Self::STORAGE_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings from LocalStorage");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Settings not loaded ({}), using defaults", e);
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        match storage::save_json(Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Settings not saved: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduced_motion_overrides() {
        let settings = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        assert!(!settings.effective_screen_shake());
        assert!(!settings.effective_juice());
        assert!(!settings.effective_flash());
    }

    #[test]
    fn test_particle_cap() {
        let mut settings = Settings::default();
        settings.apply_preset(QualityPreset::Low);
        assert_eq!(settings.max_particles(), 96);
        assert!(!settings.flash);
        settings.particles = false;
        assert_eq!(settings.max_particles(), 0);
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!(QualityPreset::parse("HIGH"), Some(QualityPreset::High));
        assert_eq!(QualityPreset::parse("med"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
        assert_eq!(QualityPreset::High.as_str(), "High");
    }

    #[test]
    fn test_hotkeys_toggle_and_cycle() {
        let mut settings = Settings::default();
        assert!(settings.handle_key("KeyM"));
        assert!(settings.muted);
        assert!(settings.handle_key("KeyF"));
        assert!(settings.show_fps);

        assert!(settings.handle_key("KeyQ"));
        assert_eq!(settings.quality, QualityPreset::High);
        assert!(settings.handle_key("KeyQ"));
        assert_eq!(settings.quality, QualityPreset::Low);
        assert!(!settings.flash);

        assert!(!settings.handle_key("KeyJ"));
    }

    #[test]
    fn test_query_overrides() {
        let mut settings = Settings::default();
        assert!(settings.apply_query("?quality=low&muted=1&x=2"));
        assert_eq!(settings.quality, QualityPreset::Low);
        assert!(settings.muted);

        let mut untouched = Settings::default();
        assert!(!untouched.apply_query("?quality=ultra"));
        assert!(!untouched.apply_query(""));
        assert_eq!(untouched.quality, QualityPreset::Medium);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"muted":true}"#).unwrap();
        assert!(settings.muted);
        assert!(settings.juice);
        assert_eq!(settings.quality, QualityPreset::Medium);
    }
}
