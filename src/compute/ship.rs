//! Applying player intent: steering and firing.

use tracing::trace;

use crate::entities::{Arena, Bullet, BulletPools, Ship};
use crate::session::SessionState;

/// Spawn a player bullet just above the ship.  Returns `false` when the
/// pool is full and the shot was dropped.
pub fn fire(bullets: &mut BulletPools, ship: &Ship) -> bool {
    bullets
        .player
        .spawn(Bullet::at(ship.fx(), (ship.y() - 1) as f32))
        .is_some()
}

/// Shift the ship by `direction × speed`, clamped to the arena.
pub fn steer(ship: &mut Ship, direction: i32, speed: f32, arena: &Arena) {
    if direction != 0 {
        ship.steer(direction as f32 * speed, arena);
    }
}

/// One ship-update tick: drop stale movement intent, move, and consume at
/// most one fire request.
pub fn ship_step(state: &SessionState) {
    let config = state.config();
    let intents = state.input();
    intents.expire(state.now(), config.hold_timeout());

    let mut tx = state.begin().lock_bullets().lock_game();
    steer(
        &mut tx.game.ship,
        intents.direction(),
        config.player_speed,
        state.arena(),
    );
    if intents.take_fire() && !fire(&mut tx.bullets, &tx.game.ship) {
        trace!("player bullet pool full, shot dropped");
    }
}
