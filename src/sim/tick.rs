//! Simulation tick and frame clock
//!
//! `tick` advances the game by one step; `FrameClock` turns real frame time
//! into fixed steps, running it through hitstop and slowmo first.

use glam::Vec2;

use super::state::{GameEvent, GamePhase, GameState};
use super::{ai, combat, particles};
use crate::consts::*;
use crate::{damp_factor, lerp};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement (keyboard and joystick combined, length up to ~1.4)
    pub move_dir: Vec2,
    /// Guard held
    pub guard: bool,
    /// One-shot presses
    pub slash: bool,
    pub dash: bool,
    pub special: bool,
    pub start: bool,
    pub reset: bool,
    pub pause: bool,
}

impl TickInput {
    /// Same input with all one-shot presses cleared
    pub fn held_only(&self) -> Self {
        Self {
            move_dir: self.move_dir,
            guard: self.guard,
            ..Default::default()
        }
    }
}

/// Flash fade per second
const FLASH_FADE: f32 = 3.5;
/// Interval between dash after-images
const AFTER_IMAGE_EVERY: f32 = 0.03;

/// Advance the game state by `dt` seconds of simulation time
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.reset {
        state.reset();
        return;
    }

    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                log::info!("Paused");
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                log::info!("Resumed");
            }
            _ => {}
        }
    }

    if input.start {
        state.start();
    }

    state.time += dt;
    state.flash = (state.flash - FLASH_FADE * dt).max(0.0);

    match state.phase {
        GamePhase::Playing => {}
        GamePhase::Title | GamePhase::GameOver => {
            // Keep the ink settling behind the overlay
            particles::update(state, dt);
            state.camera.follow(state.player.pos, state.player.face, dt);
            return;
        }
        GamePhase::Paused => return,
    }

    update_waves(state, dt);
    update_player(state, input, dt);
    combat::resolve_slash(state);
    // Enemies killed this tick never get to attack
    combat::collect_dead(state);
    ai::update(state, dt);
    if state.phase != GamePhase::Playing {
        // The run ended; the GameOver event already holds the final tally
        return;
    }
    state.combo.tick(dt);
    particles::update(state, dt);
    state.camera.follow(state.player.pos, state.player.face, dt);
}

/// Score drip, wave escalation and spawning
fn update_waves(state: &mut GameState, dt: f32) {
    state.score += dt * (90.0 + state.wave as f32 * 6.0);
    let target_wave = 1 + (state.score / SCORE_PER_WAVE).floor() as u32;
    if target_wave > state.wave {
        state.wave = target_wave;
        state.events.push(GameEvent::WaveUp { wave: state.wave });
        log::info!("Wave {}", state.wave);
    }

    state.spawn_every = (1.2 - (state.wave as f32 - 1.0) * 0.06).clamp(0.45, 1.2);
    state.spawn_timer += dt;
    if state.spawn_timer >= state.spawn_every {
        state.spawn_timer = 0.0;
        state.spawn_enemy();
    }
}

fn update_player(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.player.parry_window <= 0.0 {
        state.player.parry_perfect = false;
    }
    state.player.tick_timers(dt);

    // Guard (raising it opens the parry window)
    if input.guard && state.player.stun <= 0.0 {
        if !state.player.guarding {
            state.player.start_parry_window();
        }
        state.player.guarding = true;
    } else {
        state.player.guarding = false;
    }

    // Facing follows movement input
    let k = damp_factor(dt);
    let mut move_dir = input.move_dir;
    let moving = move_dir.length_squared() > 1e-12;
    if moving {
        move_dir = move_dir.normalize();
        let face = &mut state.player.face;
        face.x = lerp(face.x, move_dir.x, k);
        face.y = lerp(face.y, move_dir.y, k);
    }

    if input.dash {
        let dir = if moving { move_dir } else { state.player.face };
        combat::try_dash(state, dir);
    }
    if input.slash {
        combat::try_slash(state);
    }
    if input.special {
        combat::try_special(state);
    }

    let p = &mut state.player;
    if p.slashing {
        p.slash_timer += dt;
        if p.slash_timer >= p.slash_duration {
            p.slashing = false;
        }
    }

    let mut ghost = false;
    if p.dashing {
        let before = (p.dash_timer / AFTER_IMAGE_EVERY).floor();
        p.dash_timer += dt;
        ghost = (p.dash_timer / AFTER_IMAGE_EVERY).floor() > before;
        if p.dash_timer >= p.dash_duration {
            p.dashing = false;
            p.vel *= DASH_CARRY;
        }
    }

    if p.stun > 0.0 {
        p.vel *= 0.001_f32.powf(dt);
    } else if !p.dashing {
        let speed = p.speed * if p.guarding { GUARD_SPEED_FACTOR } else { 1.0 };
        p.vel = p.vel.lerp(move_dir * speed, k);
    }

    p.pos += p.vel * dt;
    p.pos.x = p.pos.x.clamp(PLAYER_MARGIN_X, WORLD_W - PLAYER_MARGIN_X);
    p.pos.y = p.pos.y.clamp(PLAYER_MARGIN_Y, WORLD_H - PLAYER_MARGIN_Y);

    if ghost {
        particles::leave_after_image(state);
    }
}

/// Converts real frame time into fixed simulation steps
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one rendered frame; returns the number of ticks executed
    ///
    /// One-shot inputs go to the first tick only. Frames with no simulation
    /// time still run a zero-length tick so menu input responds during hitstop.
    pub fn advance(&mut self, state: &mut GameState, input: &TickInput, raw_dt: f32) -> u32 {
        let raw_dt = raw_dt.clamp(0.0, MAX_FRAME_DT);
        let sim_dt = state.juice.advance(raw_dt);
        self.accumulator += sim_dt;

        let held = input.held_only();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let step_input = if substeps == 0 { input } else { &held };
            tick(state, step_input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        if substeps == 0 {
            tick(state, input, 0.0);
        }
        substeps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        state.start();
        state.drain_events();
        state
    }

    /// Playing with no enemies and spawning held off
    fn empty_arena(seed: u64) -> GameState {
        let mut state = playing(seed);
        state.enemies.clear();
        state.spawn_timer = -1000.0;
        state
    }

    #[test]
    fn test_title_to_playing() {
        let mut state = GameState::new(12345);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Title);
        assert!(state.enemies.is_empty());

        let input = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.enemies.len(), INITIAL_ENEMIES);
    }

    #[test]
    fn test_tick_pause() {
        let mut state = playing(12345);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Paused);

        let score = state.score;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.score, score);

        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_reset_input() {
        let mut state = playing(1);
        let input = TickInput {
            reset: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.phase, GamePhase::Title);
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn test_score_and_waves() {
        let mut state = playing(2);
        state.enemies.clear();
        state.score = SCORE_PER_WAVE - 0.01;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.wave, 2);
        assert!(state.events.contains(&GameEvent::WaveUp { wave: 2 }));
        assert!((state.spawn_every - 1.14).abs() < 1e-5);

        state.wave = 50;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.spawn_every, 0.45);
    }

    #[test]
    fn test_spawn_timer() {
        let mut state = playing(3);
        state.enemies.clear();
        let ticks = (1.2 / SIM_DT).ceil() as usize + 1;
        for _ in 0..ticks {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.enemies.len(), 1);
    }

    #[test]
    fn test_movement_and_clamp() {
        let mut state = empty_arena(4);
        let start = state.player.pos;
        let input = TickInput {
            move_dir: Vec2::new(1.0, 0.0),
            ..Default::default()
        };
        for _ in 0..120 {
            tick(&mut state, &input, SIM_DT);
        }
        assert!(state.player.pos.x > start.x + 300.0);
        assert!(state.player.face.x > 0.9);

        let input = TickInput {
            move_dir: Vec2::new(0.0, 1.0),
            ..Default::default()
        };
        for _ in 0..300 {
            tick(&mut state, &input, SIM_DT);
        }
        assert_eq!(state.player.pos.y, WORLD_H - PLAYER_MARGIN_Y);
    }

    #[test]
    fn test_guard_slows_and_opens_parry() {
        let mut state = empty_arena(5);
        let input = TickInput {
            move_dir: Vec2::X,
            guard: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert!(state.player.guarding);
        assert!(state.player.parry_perfect);
        for _ in 0..240 {
            tick(&mut state, &input, SIM_DT);
        }
        let expected = PLAYER_SPEED * GUARD_SPEED_FACTOR;
        assert!((state.player.vel.length() - expected).abs() < 5.0);
        assert!(!state.player.parry_perfect);
    }

    #[test]
    fn test_dash_ends_with_carry() {
        let mut state = empty_arena(6);
        let dash = TickInput {
            dash: true,
            ..Default::default()
        };
        tick(&mut state, &dash, SIM_DT);
        assert!(state.player.dashing);
        // Dash without movement follows facing (up)
        assert!(state.player.vel.y < 0.0);

        let steps = (DASH_DURATION / SIM_DT).ceil() as usize;
        for _ in 0..steps {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert!(!state.player.dashing);
        assert!(state.player.vel.length() < DASH_SPEED * DASH_CARRY + 1.0);
        assert!(state.after_images.len() >= 2);
    }

    #[test]
    fn test_slash_kills_weak_enemy() {
        let mut state = playing(7);
        state.enemies.clear();
        let id = state.next_entity_id();
        let pos = state.player.pos + Vec2::new(0.0, -60.0);
        let mut ghost = crate::sim::Enemy::new(id, crate::sim::EnemyKind::Ghost, pos, false);
        ghost.hp = 10.0;
        ghost.attack_cooldown = 10.0;
        state.enemies.push(ghost);

        let slash = TickInput {
            slash: true,
            ..Default::default()
        };
        tick(&mut state, &slash, SIM_DT);
        assert!(state.enemies.is_empty());
        assert_eq!(state.kills, 1);
        assert_eq!(state.combo.count, 1);
    }

    /// Enemy already winding up, due to strike on the next tick
    fn striking(state: &mut GameState, kind: crate::sim::EnemyKind, offset: Vec2) {
        let id = state.next_entity_id();
        let mut e = crate::sim::Enemy::new(id, kind, state.player.pos + offset, false);
        e.attacking = true;
        e.danger = true;
        e.windup = 0.001;
        e.attack_dir = -offset.normalize();
        state.enemies.push(e);
    }

    #[test]
    fn test_enemy_killed_mid_windup_does_not_strike() {
        let mut state = empty_arena(21);
        striking(&mut state, crate::sim::EnemyKind::Gate, Vec2::new(0.0, -60.0));
        state.enemies[0].hp = 20.0;

        let slash = TickInput {
            slash: true,
            ..Default::default()
        };
        tick(&mut state, &slash, SIM_DT);
        assert_eq!(state.kills, 1);
        assert_eq!(state.player.hp, PLAYER_HP);
        let events = state.drain_events();
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, GameEvent::PlayerHit { .. })),
            "{events:?}"
        );
    }

    #[test]
    fn test_game_over_reports_final_tally() {
        let mut state = empty_arena(22);
        state.player.hp = 10.0;
        // Killed by the slash in front
        let id = state.next_entity_id();
        let pos = state.player.pos + Vec2::new(0.0, -60.0);
        let mut ghost = crate::sim::Enemy::new(id, crate::sim::EnemyKind::Ghost, pos, false);
        ghost.hp = 10.0;
        ghost.attack_cooldown = 10.0;
        state.enemies.push(ghost);
        // Lands the fatal blow from behind on the same tick
        striking(&mut state, crate::sim::EnemyKind::Dokkaebi, Vec2::new(0.0, 50.0));

        let slash = TickInput {
            slash: true,
            ..Default::default()
        };
        tick(&mut state, &slash, SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);

        let over = state.drain_events().into_iter().find_map(|e| match e {
            GameEvent::GameOver { score, kills, .. } => Some((score, kills)),
            _ => None,
        });
        assert_eq!(over, Some((state.display_score(), state.kills)));
        assert_eq!(state.kills, 1);
    }

    #[test]
    fn test_frame_clock_substeps() {
        let mut state = playing(8);
        let mut clock = FrameClock::new();
        let steps = clock.advance(&mut state, &TickInput::default(), 1.0 / 60.0);
        assert!((1..=2).contains(&steps));

        // Hitches are clamped
        let steps = clock.advance(&mut state, &TickInput::default(), 5.0);
        assert!(steps <= (MAX_FRAME_DT / SIM_DT).ceil() as u32);
    }

    #[test]
    fn test_frame_clock_keeps_time_under_long_frames() {
        let mut state = empty_arena(11);
        let mut clock = FrameClock::new();
        let mut total = 0;
        for _ in 0..10 {
            let steps = clock.advance(&mut state, &TickInput::default(), MAX_FRAME_DT);
            assert!(steps <= MAX_SUBSTEPS);
            total += steps;
        }
        // No simulated time is dropped at the slowest frame rate
        assert_eq!(total, (10.0 * MAX_FRAME_DT / SIM_DT).floor() as u32);
    }

    #[test]
    fn test_frame_clock_hitstop_freezes() {
        let mut state = playing(9);
        state.enemies.clear();
        state.juice.add_hit_stop(0.1);
        let mut clock = FrameClock::new();
        let time = state.time;
        let steps = clock.advance(&mut state, &TickInput::default(), 1.0 / 60.0);
        assert_eq!(steps, 0);
        assert_eq!(state.time, time);

        // Menu input still works while frozen
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        clock.advance(&mut state, &pause, 1.0 / 60.0);
        assert_eq!(state.phase, GamePhase::Paused);
    }

    #[test]
    fn test_one_shot_input_used_once() {
        let mut state = playing(10);
        state.enemies.clear();
        let mut clock = FrameClock::new();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        // Several substeps in one frame must not toggle pause back off
        clock.advance(&mut state, &pause, MAX_FRAME_DT);
        assert_eq!(state.phase, GamePhase::Paused);
    }
}
