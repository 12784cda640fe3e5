//! Formation movement: a horizontal sweep that steps down one enemy height
//! at each wall, until the descent latch trips.
//!
//! The wall test looks at the position each enemy *would* take, so the
//! sweep reverses exactly once per wall and never jitters in place.

use tracing::debug;

use crate::entities::{cell, Arena, Squadron, ENEMY_H, ENEMY_W};
use crate::session::SessionState;

/// What one eligible march tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarchMove {
    /// No living enemies.
    Idle,
    Shifted,
    /// Hit a wall, reversed and stepped down.
    Descended,
    /// Hit a wall and reversed; stepping down would pass the descent limit,
    /// so the latch must be set.
    Halted,
    /// Hit a wall and reversed with the latch already set.
    Reversed,
}

/// The movement controller.  Owned by the march worker; direction survives
/// level resets.
#[derive(Clone, Debug)]
pub struct March {
    direction: i32,
    tick: u64,
}

impl Default for March {
    fn default() -> Self {
        Self::new()
    }
}

impl March {
    pub fn new() -> Self {
        Self { direction: 1, tick: 0 }
    }

    pub fn direction(&self) -> i32 {
        self.direction
    }

    /// Move the formation once.  `descent_halted` is the current latch.
    pub fn advance(
        &mut self,
        squadron: &mut Squadron,
        arena: &Arena,
        descent_halted: bool,
    ) -> MarchMove {
        if !squadron.any_alive() {
            return MarchMove::Idle;
        }
        let dx = self.direction as f32;
        let blocked = squadron
            .living()
            .any(|e| arena.hits_wall(cell(e.x + dx), ENEMY_W));

        if !blocked {
            for enemy in squadron.pool.live_mut() {
                enemy.x += dx;
            }
            return MarchMove::Shifted;
        }

        self.direction = -self.direction;
        if descent_halted {
            return MarchMove::Reversed;
        }
        let lowest = squadron.lowest_y().unwrap_or(0.0);
        if lowest + (2 * ENEMY_H) as f32 > arena.descent_limit() as f32 {
            return MarchMove::Halted;
        }
        for enemy in squadron.pool.live_mut() {
            enemy.y += ENEMY_H as f32;
        }
        MarchMove::Descended
    }

    /// One controller tick; the formation only moves on every
    /// `march_interval`th tick.
    pub fn step(&mut self, state: &SessionState) -> Option<MarchMove> {
        let interval = u64::from(state.config().march_interval.max(1));
        let due = self.tick % interval == 0;
        self.tick += 1;
        if !due {
            return None;
        }

        let mut tx = state.begin().lock_enemies();
        let outcome = self.advance(&mut tx.enemies, state.arena(), state.descent_halted());
        if outcome == MarchMove::Halted {
            state.halt_descent();
            debug!("formation reached the descent limit");
        }
        Some(outcome)
    }
}
