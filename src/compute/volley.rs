//! Enemy fire.

use rand::Rng;
use tracing::trace;

use crate::entities::{Bullet, Pool, Squadron, ENEMY_H, ENEMY_W};
use crate::session::SessionState;

/// Roll once per living enemy; each hit spawns a bullet centred under that
/// enemy.  Shots that find the pool full are dropped.  Returns the number of
/// bullets spawned.
pub fn volley<const N: usize>(
    squadron: &Squadron,
    pool: &mut Pool<Bullet, N>,
    chance: u32,
    denominator: u32,
    rng: &mut impl Rng,
) -> usize {
    let mut spawned = 0;
    for enemy in squadron.living() {
        if rng.gen_range(0..denominator.max(1)) >= chance {
            continue;
        }
        let shot = Bullet::at(
            enemy.x + ENEMY_W as f32 / 2.0,
            enemy.y + ENEMY_H as f32,
        );
        match pool.spawn(shot) {
            Some(_) => spawned += 1,
            None => trace!("enemy bullet pool full, shot dropped"),
        }
    }
    spawned
}

pub fn volley_step(state: &SessionState, rng: &mut impl Rng) -> usize {
    let config = state.config();
    let mut tx = state.begin().lock_bullets().lock_enemies();
    volley(
        &tx.enemies,
        &mut tx.bullets.enemy,
        config.shot_chance,
        config.shot_denominator,
        rng,
    )
}
