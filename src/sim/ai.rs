//! Enemy behaviour: approach, telegraph, strike

use glam::Vec2;

use super::collision::{circle_overlap, reflect_velocity};
use super::combat::{self, DamageOutcome};
use super::state::{Enemy, EnemyKind, GamePhase, GameState};
use crate::consts::*;
use crate::damp_factor;

/// Velocity kept per second while stunned or knocked back
const STUN_DRAG: f32 = 0.002;
/// Enemies hold this fraction of their range while closing in
const STANDOFF: f32 = 0.8;
/// Ghost sideways weave amplitude (fraction of speed)
const GHOST_WEAVE: f32 = 0.7;
/// Wraith lunge speed at the end of its windup
const WRAITH_LUNGE: f32 = 760.0;
/// Hurt flash fade per second
const HURT_FADE: f32 = 5.0;

/// Desired velocity for an enemy that is free to move
fn steer(enemy: &Enemy, target: Vec2, time: f32) -> Vec2 {
    let stats = enemy.kind.stats();
    let to_target = target - enemy.pos;
    let dist = to_target.length();
    let dir = to_target.normalize_or_zero();
    let standoff = stats.attack_range * STANDOFF;

    // Back off slightly when crowding the player
    let approach = if dist > standoff {
        1.0
    } else {
        ((dist - standoff) / standoff).max(-0.5)
    };

    match enemy.kind {
        EnemyKind::Dokkaebi | EnemyKind::Wraith => dir * stats.speed * approach,
        EnemyKind::Gate => dir * stats.speed * approach.max(0.0),
        EnemyKind::Ghost => {
            let side = Vec2::new(-dir.y, dir.x);
            let weave = (time * 3.2 + enemy.phase).sin() * GHOST_WEAVE;
            (dir * approach + side * weave).clamp_length_max(1.0) * stats.speed
        }
    }
}

/// Advance all enemies by `dt`, resolving any attacks that land
pub fn update(state: &mut GameState, dt: f32) {
    let player_pos = state.player.pos;
    let time = state.time;
    let k = damp_factor(dt);
    let drag = STUN_DRAG.powf(dt);

    let mut landed: Vec<usize> = Vec::new();

    for (i, e) in state.enemies.iter_mut().enumerate() {
        if e.is_dead() {
            continue;
        }
        let stats = e.kind.stats();
        e.hurt = (e.hurt - HURT_FADE * dt).max(0.0);
        e.stun = (e.stun - dt).max(0.0);
        e.attack_cooldown = (e.attack_cooldown - dt).max(0.0);

        if e.stun > 0.0 {
            e.vel *= drag;
        } else if e.attacking {
            // Rooted while winding up
            e.vel *= drag;
        } else {
            let desired = steer(e, player_pos, time);
            e.vel = e.vel.lerp(desired, k);
        }

        if e.attacking {
            e.windup -= dt;
            if e.windup <= 0.0 {
                e.attacking = false;
                e.danger = false;
                e.attack_cooldown = stats.attack_cooldown;
                if e.kind == EnemyKind::Wraith {
                    e.vel = e.attack_dir * WRAITH_LUNGE;
                }
                landed.push(i);
            }
        } else if e.stun <= 0.0 && e.attack_cooldown <= 0.0 {
            let dist = e.pos.distance(player_pos);
            if dist <= stats.attack_range + PLAYER_RADIUS * 0.5 {
                e.attacking = true;
                e.danger = true;
                e.windup = stats.windup;
                e.attack_dir = (player_pos - e.pos).normalize_or_zero();
            }
        }

        e.pos += e.vel * dt;
        keep_in_world(e);
    }

    separate(state);

    for i in landed {
        if state.phase != GamePhase::Playing {
            break;
        }
        let Some(e) = state.enemies.get(i).filter(|e| !e.is_dead()) else {
            continue;
        };
        let stats = e.kind.stats();
        // Wraiths reach further thanks to the lunge
        let reach = match e.kind {
            EnemyKind::Wraith => stats.attack_range * 1.35,
            _ => stats.attack_range,
        } + PLAYER_RADIUS;
        if e.pos.distance(state.player.pos) > reach {
            continue;
        }
        let dmg = e.damage();
        let outcome = combat::damage_player(state, dmg, Some(i));
        log::debug!("{} attack: {:?}", stats.name, outcome);
        if outcome == DamageOutcome::Fatal {
            break;
        }
    }
}

/// Clamp to the world, bouncing knockback off the edges
fn keep_in_world(e: &mut Enemy) {
    let r = e.radius();
    let (min, max) = (Vec2::splat(r), Vec2::new(WORLD_W - r, WORLD_H - r));
    if e.pos.x < min.x || e.pos.x > max.x {
        let n = if e.pos.x < min.x { Vec2::X } else { -Vec2::X };
        if e.vel.dot(n) < 0.0 {
            e.vel = reflect_velocity(e.vel, n) * 0.5;
        }
    }
    if e.pos.y < min.y || e.pos.y > max.y {
        let n = if e.pos.y < min.y { Vec2::Y } else { -Vec2::Y };
        if e.vel.dot(n) < 0.0 {
            e.vel = reflect_velocity(e.vel, n) * 0.5;
        }
    }
    e.pos = e.pos.clamp(min, max);
}

/// Push apart overlapping enemies, and enemies off the player
fn separate(state: &mut GameState) {
    let n = state.enemies.len();
    for a in 0..n {
        for b in (a + 1)..n {
            let (ea, eb) = (&state.enemies[a], &state.enemies[b]);
            if let Some(c) = circle_overlap(ea.pos, ea.radius(), eb.pos, eb.radius()) {
                let push = c.normal * (c.penetration * 0.5);
                state.enemies[a].pos -= push;
                state.enemies[b].pos += push;
            }
        }
    }

    // Dashing player slips through enemies
    if state.player.dashing {
        return;
    }
    let player_pos = state.player.pos;
    for e in state.enemies.iter_mut() {
        if let Some(c) = circle_overlap(player_pos, PLAYER_RADIUS, e.pos, e.radius()) {
            e.pos += c.normal * c.penetration;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena_with(kind: EnemyKind, offset: Vec2) -> GameState {
        let mut state = GameState::new(5);
        state.phase = GamePhase::Playing;
        let id = state.next_entity_id();
        let mut e = Enemy::new(id, kind, state.player.pos + offset, false);
        e.attack_cooldown = 0.0;
        state.enemies.push(e);
        state
    }

    #[test]
    fn test_enemy_approaches_player() {
        let mut state = arena_with(EnemyKind::Dokkaebi, Vec2::new(600.0, 0.0));
        let start = state.enemies[0].pos.distance(state.player.pos);
        for _ in 0..60 {
            update(&mut state, 1.0 / 60.0);
        }
        let end = state.enemies[0].pos.distance(state.player.pos);
        assert!(end < start - 100.0);
    }

    #[test]
    fn test_stunned_enemy_holds() {
        let mut state = arena_with(EnemyKind::Ghost, Vec2::new(400.0, 0.0));
        state.enemies[0].stun = 1.0;
        let start = state.enemies[0].pos;
        for _ in 0..30 {
            update(&mut state, 1.0 / 60.0);
        }
        assert!(state.enemies[0].pos.distance(start) < 1.0);
        assert!(!state.enemies[0].attacking);
    }

    #[test]
    fn test_windup_then_hit() {
        let mut state = arena_with(EnemyKind::Dokkaebi, Vec2::new(50.0, 0.0));
        update(&mut state, 1.0 / 60.0);
        assert!(state.enemies[0].danger);
        assert_eq!(state.player.hp, PLAYER_HP);

        let windup = EnemyKind::Dokkaebi.stats().windup;
        let steps = (windup * 60.0).ceil() as usize + 1;
        for _ in 0..steps {
            update(&mut state, 1.0 / 60.0);
        }
        assert!(!state.enemies[0].danger);
        assert_eq!(state.player.hp, PLAYER_HP - 18.0);
    }

    #[test]
    fn test_dead_enemy_never_strikes() {
        let mut state = arena_with(EnemyKind::Gate, Vec2::new(60.0, 0.0));
        update(&mut state, 1.0 / 60.0);
        assert!(state.enemies[0].attacking);
        state.enemies[0].hp = 0.0;
        for _ in 0..60 {
            update(&mut state, 1.0 / 60.0);
        }
        assert_eq!(state.player.hp, PLAYER_HP);
        assert!(state.enemies[0].attacking);
    }

    #[test]
    fn test_dodged_attack_misses() {
        let mut state = arena_with(EnemyKind::Gate, Vec2::new(60.0, 0.0));
        update(&mut state, 1.0 / 60.0);
        assert!(state.enemies[0].attacking);
        // Player steps well out of reach mid-windup
        state.player.pos.x -= 400.0;
        for _ in 0..60 {
            update(&mut state, 1.0 / 60.0);
        }
        assert_eq!(state.player.hp, PLAYER_HP);
    }

    #[test]
    fn test_enemies_separate() {
        let mut state = arena_with(EnemyKind::Dokkaebi, Vec2::new(300.0, 0.0));
        let id = state.next_entity_id();
        let pos = state.enemies[0].pos + Vec2::new(1.0, 0.0);
        state.enemies.push(Enemy::new(id, EnemyKind::Dokkaebi, pos, false));
        separate(&mut state);
        let d = state.enemies[0].pos.distance(state.enemies[1].pos);
        assert!(d >= state.enemies[0].radius() * 2.0 - 1e-3);
    }

    #[test]
    fn test_enemy_stays_in_world() {
        let mut state = GameState::new(5);
        state.phase = GamePhase::Playing;
        let mut e = Enemy::new(1, EnemyKind::Ghost, Vec2::new(10.0, 10.0), false);
        e.stun = 1.0;
        e.vel = Vec2::new(-500.0, -500.0);
        state.enemies.push(e);
        update(&mut state, 1.0 / 60.0);
        let e = &state.enemies[0];
        assert!(e.pos.x >= e.radius() && e.pos.y >= e.radius());
        assert!(e.vel.x >= 0.0 && e.vel.y >= 0.0);
    }
}
