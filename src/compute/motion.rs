//! Bullet motion: player bullets climb, enemy bullets fall.

use crate::entities::{Bullet, Pool, CEILING};
use crate::session::SessionState;

/// Move every active bullet up by `speed`; retire those above the ceiling.
pub fn climb<const N: usize>(pool: &mut Pool<Bullet, N>, speed: f32) {
    for bullet in pool.live_mut() {
        bullet.y -= speed;
        if bullet.y < CEILING {
            bullet.active = false;
        }
    }
}

/// Move every active bullet down by `speed`; retire those at or below
/// `floor`.
pub fn fall<const N: usize>(pool: &mut Pool<Bullet, N>, speed: f32, floor: f32) {
    for bullet in pool.live_mut() {
        bullet.y += speed;
        if bullet.y >= floor {
            bullet.active = false;
        }
    }
}

pub fn player_bullets_step(state: &SessionState) {
    let speed = state.config().player_bullet_speed;
    let mut tx = state.begin().lock_bullets();
    climb(&mut tx.bullets.player, speed);
}

pub fn enemy_bullets_step(state: &SessionState) {
    let speed = state.config().enemy_bullet_speed;
    let floor = state.arena().height as f32;
    let mut tx = state.begin().lock_bullets();
    fall(&mut tx.bullets.enemy, speed, floor);
}
