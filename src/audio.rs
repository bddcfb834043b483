//! Audio system using Web Audio API
//!
//! Procedurally generated sword and ink sounds - no external files needed!
//! Event-to-feedback mapping is platform independent; only `AudioManager`
//! needs the browser.

use crate::sim::{EnemyKind, GameEvent};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Blade swing
    Slash,
    /// Blade connects
    Hit,
    /// Heavy blade connects (Gate)
    HeavyHit,
    /// Blocked hit
    Guard,
    /// Perfect parry - bright clang
    Parry,
    Dash,
    /// Radial special
    Special,
    EnemyDeath,
    /// Player takes damage
    Hurt,
    WaveUp,
    GameOver,
    /// New high score
    HighScore,
    /// Overlay buttons
    Ui,
}

impl SoundEffect {
    /// Sound for a simulation event (None for silent events)
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Started => Some(SoundEffect::Ui),
            GameEvent::Slash => Some(SoundEffect::Slash),
            GameEvent::Dash => Some(SoundEffect::Dash),
            GameEvent::Special { .. } => Some(SoundEffect::Special),
            GameEvent::EnemyHit { kind } => Some(if *kind == EnemyKind::Gate {
                SoundEffect::HeavyHit
            } else {
                SoundEffect::Hit
            }),
            GameEvent::EnemyKilled { .. } => Some(SoundEffect::EnemyDeath),
            GameEvent::Guard => Some(SoundEffect::Guard),
            GameEvent::Parry => Some(SoundEffect::Parry),
            GameEvent::PlayerHit { .. } => Some(SoundEffect::Hurt),
            GameEvent::WaveUp { .. } => Some(SoundEffect::WaveUp),
            GameEvent::GameOver { .. } => Some(SoundEffect::GameOver),
        }
    }

    /// Random pitch spread (fraction) so repeated swings don't sound identical
    pub fn pitch_spread(&self) -> f32 {
        match self {
            SoundEffect::Slash | SoundEffect::Hit | SoundEffect::HeavyHit => 0.08,
            SoundEffect::Guard | SoundEffect::Parry => 0.04,
            _ => 0.0,
        }
    }
}

/// Vibration pulse (ms) for an event, if any
pub fn vibration_ms(event: &GameEvent) -> Option<u32> {
    match event {
        GameEvent::Parry => Some(30),
        GameEvent::PlayerHit { .. } => Some(40),
        GameEvent::Special { .. } => Some(60),
        GameEvent::EnemyKilled { elite: true, .. } => Some(25),
        GameEvent::GameOver { .. } => Some(120),
        _ => None,
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::SoundEffect;
    use crate::settings::Settings;

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        master_volume: f32,
        sfx_volume: f32,
        muted: bool,
        /// Temporarily silenced (window blurred)
        suspended: bool,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: 0.9,
                sfx_volume: 1.0,
                muted: false,
                suspended: false,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Pull volumes and mute flag from settings
        pub fn apply_settings(&mut self, settings: &Settings) {
            self.master_volume = settings.master_volume.clamp(0.0, 1.0);
            self.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
            self.muted = settings.muted;
        }

        /// Silence while the window is unfocused
        pub fn set_suspended(&mut self, suspended: bool) {
            self.suspended = suspended;
        }

        /// Get effective volume
        fn effective_volume(&self) -> f32 {
            if self.muted || self.suspended {
                0.0
            } else {
                self.master_volume * self.sfx_volume
            }
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            let vol = self.effective_volume();
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let spread = effect.pitch_spread();
            let pitch = if spread > 0.0 {
                1.0 + (js_sys::Math::random() as f32 * 2.0 - 1.0) * spread
            } else {
                1.0
            };

            match effect {
                SoundEffect::Slash => {
                    self.sweep(ctx, vol * 0.35, OscillatorType::Sawtooth, 900.0 * pitch, 180.0, 0.09)
                }
                SoundEffect::Hit => self.play_hit(ctx, vol, pitch, 1.0),
                SoundEffect::HeavyHit => self.play_hit(ctx, vol, pitch * 0.7, 1.3),
                SoundEffect::Guard => {
                    self.sweep(ctx, vol * 0.4, OscillatorType::Square, 320.0 * pitch, 240.0, 0.08)
                }
                SoundEffect::Parry => self.play_parry(ctx, vol, pitch),
                SoundEffect::Dash => {
                    self.sweep(ctx, vol * 0.25, OscillatorType::Triangle, 180.0, 520.0, 0.14)
                }
                SoundEffect::Special => self.play_special(ctx, vol),
                SoundEffect::EnemyDeath => {
                    self.sweep(ctx, vol * 0.4, OscillatorType::Sine, 260.0, 50.0, 0.22)
                }
                SoundEffect::Hurt => {
                    self.sweep(ctx, vol * 0.45, OscillatorType::Sawtooth, 140.0, 60.0, 0.18)
                }
                SoundEffect::WaveUp => self.arpeggio(
                    ctx,
                    vol * 0.3,
                    OscillatorType::Triangle,
                    &[392.0, 523.0, 659.0],
                    0.09,
                    0.3,
                ),
                SoundEffect::GameOver => self.arpeggio(
                    ctx,
                    vol * 0.3,
                    OscillatorType::Sine,
                    &[392.0, 330.0, 262.0, 196.0],
                    0.2,
                    0.35,
                ),
                SoundEffect::HighScore => self.arpeggio(
                    ctx,
                    vol * 0.25,
                    OscillatorType::Triangle,
                    &[523.0, 659.0, 784.0, 1047.0],
                    0.08,
                    0.25,
                ),
                SoundEffect::Ui => {
                    self.sweep(ctx, vol * 0.2, OscillatorType::Sine, 660.0, 660.0, 0.06)
                }
            }
        }

        // === Sound generators ===

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Single voice gliding from `from` to `to` Hz with an exponential decay
        fn sweep(
            &self,
            ctx: &AudioContext,
            level: f32,
            osc_type: OscillatorType,
            from: f32,
            to: f32,
            dur: f64,
        ) {
            let Some((osc, gain)) = self.create_osc(ctx, from, osc_type) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(level, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + dur)
                .ok();
            osc.frequency().set_value_at_time(from, t).ok();
            if (to - from).abs() > f32::EPSILON {
                osc.frequency()
                    .exponential_ramp_to_value_at_time(to.max(1.0), t + dur)
                    .ok();
            }

            osc.start().ok();
            osc.stop_with_when(t + dur + 0.05).ok();
        }

        /// Notes played one after another
        fn arpeggio(
            &self,
            ctx: &AudioContext,
            level: f32,
            osc_type: OscillatorType,
            freqs: &[f32],
            step: f64,
            dur: f64,
        ) {
            for (i, freq) in freqs.iter().enumerate() {
                let delay = i as f64 * step;
                if let Some((osc, gain)) = self.create_osc(ctx, *freq, osc_type) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(level, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + dur)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + dur + 0.1).ok();
                }
            }
        }

        /// Blade strike - thud plus a short metallic tick
        fn play_hit(&self, ctx: &AudioContext, vol: f32, pitch: f32, weight: f32) {
            self.sweep(
                ctx,
                vol * 0.5 * weight,
                OscillatorType::Sine,
                170.0 * pitch,
                55.0,
                0.12 * weight as f64,
            );
            self.sweep(
                ctx,
                vol * 0.15,
                OscillatorType::Square,
                2400.0 * pitch,
                1800.0,
                0.04,
            );
        }

        /// Parry - two detuned bell partials
        fn play_parry(&self, ctx: &AudioContext, vol: f32, pitch: f32) {
            for (freq, level) in [(1320.0, 0.3), (1980.0, 0.18)] {
                self.sweep(
                    ctx,
                    vol * level,
                    OscillatorType::Sine,
                    freq * pitch,
                    freq * pitch * 0.98,
                    0.35,
                );
            }
        }

        /// Special - rising whoosh into a low boom
        fn play_special(&self, ctx: &AudioContext, vol: f32) {
            self.sweep(ctx, vol * 0.3, OscillatorType::Sawtooth, 120.0, 900.0, 0.18);
            self.sweep(ctx, vol * 0.55, OscillatorType::Sine, 90.0, 35.0, 0.45);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_event_has_a_sound() {
        let events = [
            GameEvent::Started,
            GameEvent::Slash,
            GameEvent::Dash,
            GameEvent::Special { hits: 2 },
            GameEvent::EnemyHit {
                kind: EnemyKind::Ghost,
            },
            GameEvent::Guard,
            GameEvent::Parry,
            GameEvent::PlayerHit { damage: 5.0 },
            GameEvent::WaveUp { wave: 2 },
            GameEvent::GameOver {
                score: 10,
                kills: 1,
                wave: 1,
            },
        ];
        for e in &events {
            assert!(SoundEffect::for_event(e).is_some(), "{e:?}");
        }
    }

    #[test]
    fn test_gate_hit_is_heavy() {
        let heavy = GameEvent::EnemyHit {
            kind: EnemyKind::Gate,
        };
        assert_eq!(SoundEffect::for_event(&heavy), Some(SoundEffect::HeavyHit));
    }

    #[test]
    fn test_vibration_only_on_impacts() {
        assert_eq!(vibration_ms(&GameEvent::Slash), None);
        assert_eq!(vibration_ms(&GameEvent::Parry), Some(30));
        let plain_kill = GameEvent::EnemyKilled {
            kind: EnemyKind::Dokkaebi,
            elite: false,
            combo: 1,
        };
        assert_eq!(vibration_ms(&plain_kill), None);
    }
}
