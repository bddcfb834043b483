//! Ink Blade - an ink-brush hack-and-slash arena game
//!
//! Core modules:
//! - `sim`: Simulation (movement, combat, enemy AI, juice, camera)
//! - `renderer`: WebGPU rendering pipeline
//! - `platform`: Browser/native platform abstraction (input, storage)
//! - `highscores` / `settings`: LocalStorage-backed player data
//! - `audio`: Web Audio sound effects and event feedback

pub mod audio;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use settings::{QualityPreset, Settings};

use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame; a clamped frame plus leftover needs at most 5
    pub const MAX_SUBSTEPS: u32 = 5;
    /// Longest real frame we simulate (tab switches, hitches)
    pub const MAX_FRAME_DT: f32 = 0.033;

    /// World dimensions (tall scroll arena)
    pub const WORLD_W: f32 = 2600.0;
    pub const WORLD_H: f32 = 5200.0;
    /// Player keeps this far from the world edge
    pub const PLAYER_MARGIN_X: f32 = 60.0;
    pub const PLAYER_MARGIN_Y: f32 = 80.0;
    /// Enemies spawn no closer than this to the edge
    pub const SPAWN_MARGIN_X: f32 = 80.0;
    pub const SPAWN_MARGIN_Y: f32 = 120.0;

    /// Player body
    pub const PLAYER_RADIUS: f32 = 22.0;
    pub const PLAYER_HP: f32 = 100.0;
    pub const PLAYER_SP: f32 = 100.0;
    pub const PLAYER_SPEED: f32 = 520.0;
    pub const GUARD_SPEED_FACTOR: f32 = 0.62;

    /// Dash
    pub const DASH_SPEED: f32 = 980.0;
    pub const DASH_DURATION: f32 = 0.16;
    pub const DASH_COOLDOWN: f32 = 0.28;
    pub const DASH_INVULN: f32 = 0.18;
    /// Fraction of dash velocity kept when the dash ends
    pub const DASH_CARRY: f32 = 0.25;

    /// Slash (cone in front of the player)
    pub const SLASH_DURATION: f32 = 0.14;
    pub const SLASH_COOLDOWN: f32 = 0.18;
    pub const SLASH_RANGE: f32 = 130.0;
    pub const SLASH_HALF_ANGLE: f32 = 1.1;
    pub const SLASH_DAMAGE: f32 = 28.0;
    pub const SLASH_SP_GAIN: f32 = 2.5;
    pub const SLASH_HIT_SP_GAIN: f32 = 4.0;
    pub const SLASH_KNOCKBACK: f32 = 420.0;

    /// Special (full-meter ink burst)
    pub const SPECIAL_RADIUS: f32 = 260.0;
    pub const SPECIAL_DAMAGE: f32 = 55.0;
    pub const SPECIAL_STUN: f32 = 0.7;

    /// Guard / parry
    pub const PARRY_WINDOW: f32 = 0.12;
    pub const PARRY_COOLDOWN: f32 = 0.22;
    pub const PARRY_SP_GAIN: f32 = 30.0;
    pub const PARRY_RIPOSTE_STUN: f32 = 0.6;
    pub const GUARD_DAMAGE_FACTOR: f32 = 0.25;
    pub const GUARD_SP_GAIN: f32 = 6.0;

    /// Getting hit
    pub const HIT_INVULN: f32 = 0.38;
    pub const HIT_STUN: f32 = 0.18;

    /// Spawning and waves
    pub const INITIAL_ENEMIES: usize = 4;
    pub const SPAWN_RING_MIN: f32 = 520.0;
    pub const SPAWN_RING_MAX: f32 = 860.0;
    pub const ELITE_CHANCE: f64 = 0.08;
    pub const ELITE_HP_FACTOR: f32 = 2.2;
    pub const SCORE_PER_WAVE: f32 = 700.0;
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Frame-rate independent smoothing factor (`1 - 0.001^dt`)
///
/// Lerping by this factor every frame closes 99.9% of the gap per second,
/// whatever the frame rate.
#[inline]
pub fn damp_factor(dt: f32) -> f32 {
    1.0 - 0.001_f32.powf(dt)
}

/// Uniform sample in `[a, b)`; returns `a` for an empty range
#[inline]
pub fn rand_range<R: Rng>(rng: &mut R, a: f32, b: f32) -> f32 {
    if b > a { rng.random_range(a..b) } else { a }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 10.0, 0.0), 0.0);
        assert_eq!(lerp(0.0, 10.0, 1.0), 10.0);
        assert!((lerp(2.0, 4.0, 0.5) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_damp_factor() {
        assert_eq!(damp_factor(0.0), 0.0);
        assert!((damp_factor(1.0) - 0.999).abs() < 1e-4);
        // Two half steps close the same gap as one full step
        let half = damp_factor(0.5);
        let two_halves = 1.0 - (1.0 - half) * (1.0 - half);
        assert!((two_halves - damp_factor(1.0)).abs() < 1e-4);
    }
}
