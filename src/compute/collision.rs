//! The two collision detectors.
//!
//! Boxes are compared on rounded cell positions.  Every pool a detector
//! reads is read under the lock its writers use, the ship included.

use std::time::Duration;

use tracing::info;

use crate::entities::{
    Arena, BulletPools, ScoreBoard, Squadron, Vitals, ENEMY_H, ENEMY_W, SHIP_H,
};
use crate::session::SessionState;

/// Is cell `(bx, by)` inside the enemy sprite anchored at `(ex, ey)`?
pub fn inside_enemy(bx: i32, by: i32, ex: i32, ey: i32) -> bool {
    bx >= ex && bx < ex + ENEMY_W && by >= ey && by < ey + ENEMY_H
}

// ── Player bullets ↔ enemies ─────────────────────────────────────────────────

/// Kill the first living enemy (pool order) under each active player bullet.
/// The bullet is retired on its first hit, so it scores at most once.
/// Returns the number of kills.
pub fn resolve_player_hits(
    bullets: &mut BulletPools,
    squadron: &mut Squadron,
    score: &mut ScoreBoard,
    points_per_kill: u32,
) -> u32 {
    let mut kills = 0;
    for bullet in bullets.player.live_mut() {
        let (bx, by) = bullet.cell();
        let target = squadron.pool.live_mut().find(|enemy| {
            let (ex, ey) = enemy.cell();
            inside_enemy(bx, by, ex, ey)
        });
        if let Some(enemy) = target {
            enemy.alive = false;
            bullet.active = false;
            score.points = score.points.saturating_add(points_per_kill);
            kills += 1;
        }
    }
    kills
}

pub fn player_hits_step(state: &SessionState) -> u32 {
    let points = state.config().points_per_kill;
    let mut tx = state.begin().lock_bullets().lock_enemies().lock_score();
    resolve_player_hits(&mut tx.bullets, &mut tx.enemies, &mut tx.score, points)
}

// ── Enemy bullets ↔ ship ─────────────────────────────────────────────────────

/// Check every active enemy bullet that has reached the ship's row against
/// the hull.  A hit retires the bullet, costs a life and (re)starts the damage
/// flash at `now`; a bullet that has left the arena is retired either way.
/// Returns the number of hits.
pub fn resolve_ship_hits(
    bullets: &mut BulletPools,
    vitals: &mut Vitals,
    arena: &Arena,
    now: Duration,
) -> u32 {
    let ship_y = vitals.ship.y();
    let (left, right) = vitals.ship.hull();
    let mut hits = 0;
    for bullet in bullets.enemy.live_mut() {
        if (bullet.y.floor() as i32) < ship_y {
            continue;
        }
        let (bx, by) = bullet.cell();
        if bx >= left && bx <= right && by >= ship_y && by < ship_y + SHIP_H {
            bullet.active = false;
            vitals.lives = vitals.lives.saturating_sub(1);
            vitals.flash_started = Some(now);
            hits += 1;
        } else if by >= arena.height {
            bullet.active = false;
        }
    }
    hits
}

pub fn ship_hits_step(state: &SessionState) -> u32 {
    let now = state.now();
    let mut tx = state.begin().lock_bullets().lock_game();
    let hits = resolve_ship_hits(&mut tx.bullets, &mut tx.game, state.arena(), now);
    if hits > 0 {
        if tx.game.lives == 0 {
            info!(level = tx.game.level, "ship destroyed, game over");
            state.stop();
        }
        state.notify_vitals();
    }
    hits
}
