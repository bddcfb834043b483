//! Player actions and damage resolution
//!
//! Dash, slash, special and guard/parry, plus what happens when blows land
//! on either side.

use glam::Vec2;

use super::collision::{in_cone, within_radius};
use super::particles::{self, Burst};
use super::state::{EnemyKind, GameEvent, GamePhase, GameState, Player};
use crate::consts::*;

/// Result of an enemy attack reaching the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Player was invulnerable
    Ignored,
    /// Perfect guard inside the parry window
    Parry,
    /// Blocked, reduced damage
    Guard,
    /// Clean hit
    Hit,
    /// Hit that emptied the hp bar
    Fatal,
}

impl Player {
    /// Open the parry window when the guard goes up
    pub fn start_parry_window(&mut self) {
        if self.parry_cooldown > 0.0 {
            return;
        }
        self.parry_window = PARRY_WINDOW;
        self.parry_cooldown = PARRY_COOLDOWN;
        self.parry_perfect = true;
    }

    fn can_act(&self) -> bool {
        self.stun <= 0.0
    }

    /// Direction opposite the facing, used for recoil and punch
    fn recoil_dir(&self) -> Vec2 {
        let back = -self.face;
        if back.length_squared() > 1e-6 {
            back.normalize()
        } else {
            Vec2::Y
        }
    }
}

/// Start a dash along `dir`; returns false if blocked
pub fn try_dash(state: &mut GameState, dir: Vec2) -> bool {
    let p = &mut state.player;
    if p.dash_cooldown > 0.0 || p.dashing || !p.can_act() {
        return false;
    }
    let dir = if dir.length_squared() > 1e-12 {
        dir.normalize()
    } else {
        Vec2::new(0.0, -1.0)
    };
    p.dashing = true;
    p.dash_timer = 0.0;
    p.dash_cooldown = DASH_COOLDOWN;
    p.invuln = p.invuln.max(DASH_INVULN);
    p.vel = dir * p.dash_speed;

    particles::leave_after_image(state);
    state.events.push(GameEvent::Dash);
    true
}

/// Start a slash; returns false if blocked
pub fn try_slash(state: &mut GameState) -> bool {
    let p = &mut state.player;
    if p.slash_cooldown > 0.0 || p.slashing || !p.can_act() {
        return false;
    }
    p.slashing = true;
    p.slash_timer = 0.0;
    p.slash_cooldown = SLASH_COOLDOWN;
    p.slash_hits.clear();
    p.gain_sp(SLASH_SP_GAIN);

    state.camera.add_shake(5.0);
    state.events.push(GameEvent::Slash);
    true
}

/// Unleash the special; returns the number of enemies caught, or None if not ready
pub fn try_special(state: &mut GameState) -> Option<u32> {
    if !state.player.special_ready() || !state.player.can_act() {
        return None;
    }
    state.player.sp = 0.0;
    state.camera.add_shake(16.0);
    state.flash = 1.0;

    let origin = state.player.pos;
    let mut hits = 0;
    for e in state.enemies.iter_mut() {
        if within_radius(origin, e.pos, SPECIAL_RADIUS) {
            e.hp -= SPECIAL_DAMAGE;
            e.hurt = 1.0;
            e.stun = e.stun.max(SPECIAL_STUN);
            e.interrupt();
            let push = (e.pos - origin).normalize_or_zero();
            e.vel = push * SLASH_KNOCKBACK;
            hits += 1;
        }
    }
    state.juice.add_hit_stop(0.06);
    particles::emit(state, origin, Burst::death());
    state.events.push(GameEvent::Special { hits });
    log::debug!("Special caught {} enemies", hits);
    Some(hits)
}

/// Apply an enemy attack of `dmg` to the player
///
/// `attacker` is the enemy index, used for the parry riposte.
pub fn damage_player(state: &mut GameState, dmg: f32, attacker: Option<usize>) -> DamageOutcome {
    if state.player.invuln > 0.0 {
        return DamageOutcome::Ignored;
    }
    let recoil = state.player.recoil_dir();

    if state.player.guarding {
        if state.player.parry_perfect && state.player.parry_window > 0.0 {
            state.player.gain_sp(PARRY_SP_GAIN);
            state.juice.add_hit_stop(0.09);
            state.juice.add_slowmo(0.6, 0.22);
            state.juice.add_punch(recoil, 1.6);

            if let Some(e) = attacker.and_then(|i| state.enemies.get_mut(i)) {
                e.stun = e.stun.max(PARRY_RIPOSTE_STUN);
                e.interrupt();
                e.vel = (e.pos - state.player.pos).normalize_or_zero() * SLASH_KNOCKBACK;
            }
            let spark_pos = state.player.pos - recoil * PLAYER_RADIUS;
            particles::emit(state, spark_pos, Burst::parry(-recoil));
            state.events.push(GameEvent::Parry);
            return DamageOutcome::Parry;
        }

        state.player.hp = (state.player.hp - dmg * GUARD_DAMAGE_FACTOR).max(0.0);
        state.player.gain_sp(GUARD_SP_GAIN);
        state.events.push(GameEvent::Guard);
        if state.player.hp <= 0.0 {
            game_over(state);
            return DamageOutcome::Fatal;
        }
        return DamageOutcome::Guard;
    }

    let p = &mut state.player;
    p.hp = (p.hp - dmg).max(0.0);
    p.invuln = HIT_INVULN;
    p.stun = p.stun.max(HIT_STUN);
    p.slashing = false;
    p.dashing = false;

    state.camera.add_shake(14.0);
    state.flash = 1.0;
    state.juice.add_hit_stop(0.08);
    state.juice.add_slowmo(0.78, 0.16);
    state.juice.add_punch(recoil, 1.4);
    state.combo.break_streak();
    state.events.push(GameEvent::PlayerHit { damage: dmg });

    if state.player.hp <= 0.0 {
        game_over(state);
        return DamageOutcome::Fatal;
    }
    DamageOutcome::Hit
}

/// End the run
pub fn game_over(state: &mut GameState) {
    state.player.hp = 0.0;
    state.phase = GamePhase::GameOver;
    let score = state.display_score();
    state.events.push(GameEvent::GameOver {
        score,
        kills: state.kills,
        wave: state.wave,
    });
    log::info!(
        "Game over: score {}, kills {}, wave {}, best combo {}",
        score,
        state.kills,
        state.wave,
        state.combo.best
    );
}

/// Strike every enemy inside the active slash cone that this slash hasn't hit yet
pub fn resolve_slash(state: &mut GameState) {
    if !state.player.slashing {
        return;
    }
    let origin = state.player.pos;
    let face = state.player.face;

    let mut struck = Vec::new();
    for (i, e) in state.enemies.iter().enumerate() {
        if e.is_dead() || state.player.slash_hits.contains(&e.id) {
            continue;
        }
        if in_cone(origin, face, SLASH_HALF_ANGLE, SLASH_RANGE, e.pos, e.radius()) {
            struck.push(i);
        }
    }

    for i in struck {
        let e = &mut state.enemies[i];
        let dir = (e.pos - origin).normalize_or_zero();
        e.hp -= SLASH_DAMAGE;
        e.hurt = 1.0;
        e.stun = e.stun.max(0.12);
        e.vel = dir * SLASH_KNOCKBACK;
        // Gatekeepers shrug off interrupts unless stunned by a parry or special
        if e.kind != EnemyKind::Gate {
            e.interrupt();
        }
        let (id, kind, pos) = (e.id, e.kind, e.pos);

        state.player.slash_hits.push(id);
        state.player.gain_sp(SLASH_HIT_SP_GAIN);
        state.juice.add_hit_stop(0.045);
        state.camera.add_shake(8.0);
        particles::emit(state, pos, Burst::splatter(dir));
        state.events.push(GameEvent::EnemyHit { kind });
    }
}

/// Remove dead enemies, paying out score and combo
pub fn collect_dead(state: &mut GameState) {
    if !state.enemies.iter().any(|e| e.is_dead()) {
        return;
    }
    let (dead, alive): (Vec<_>, Vec<_>) = std::mem::take(&mut state.enemies)
        .into_iter()
        .partition(|e| e.is_dead());
    state.enemies = alive;

    for e in dead {
        let combo = state.combo.register_kill();
        let stats = e.kind.stats();
        let mut bounty = stats.bounty * state.combo.rank().multiplier();
        if e.elite {
            bounty *= 2.0;
        }
        state.score += bounty;
        state.kills += 1;
        state.camera.add_shake(if e.elite { 12.0 } else { 7.0 });
        particles::emit(state, e.pos, Burst::death());
        state.events.push(GameEvent::EnemyKilled {
            kind: e.kind,
            elite: e.elite,
            combo,
        });
    }
}
