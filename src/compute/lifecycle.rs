//! Level and session lifecycle: level completion, the game-state monitor,
//! bonus lives and the damage flash.

use std::time::Duration;

use tracing::{debug, info};

use crate::config::Config;
use crate::entities::{Arena, BulletPools, Squadron, Vitals};
use crate::session::SessionState;

// ── Levels ────────────────────────────────────────────────────────────────────

pub fn formation_rows(level: u32, config: &Config) -> u32 {
    config.base_enemy_rows + level / 2
}

/// Clear both bullet pools and deploy the formation for `level`.  The
/// descent latch is cleared by the caller, which owns the atomic.
pub fn reset_level(
    bullets: &mut BulletPools,
    squadron: &mut Squadron,
    level: u32,
    config: &Config,
    arena: &Arena,
) {
    bullets.clear();
    squadron.deploy(arena, formation_rows(level, config), config.enemy_columns);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelCheck {
    InProgress,
    /// The formation was wiped out and the next level deployed.
    Advanced(u32),
    /// The last level was cleared.
    Victory,
}

/// Advance the level once no enemy is left alive.  Past the last level the
/// game is marked completed and nothing is respawned.
pub fn check_level(
    bullets: &mut BulletPools,
    squadron: &mut Squadron,
    vitals: &mut Vitals,
    config: &Config,
    arena: &Arena,
) -> LevelCheck {
    if squadron.any_alive() {
        return LevelCheck::InProgress;
    }
    vitals.level += 1;
    if vitals.level > config.max_level {
        vitals.completed = true;
        return LevelCheck::Victory;
    }
    reset_level(bullets, squadron, vitals.level, config, arena);
    LevelCheck::Advanced(vitals.level)
}

/// Once the last life is gone or the session is stopped, no level or life
/// change may land.  Read under the game lock, which every life change holds.
fn settled(state: &SessionState, vitals: &Vitals) -> bool {
    vitals.lives == 0 || !state.is_running()
}

pub fn level_check_step(state: &SessionState) -> LevelCheck {
    let mut tx = state.begin().lock_bullets().lock_enemies().lock_game();
    if settled(state, &tx.game) {
        return LevelCheck::InProgress;
    }
    let outcome = check_level(
        &mut tx.bullets,
        &mut tx.enemies,
        &mut tx.game,
        state.config(),
        state.arena(),
    );
    match outcome {
        LevelCheck::InProgress => {}
        LevelCheck::Advanced(level) => {
            state.resume_descent();
            info!(level, "level cleared, next formation deployed");
        }
        LevelCheck::Victory => {
            info!("final level cleared");
            state.stop();
        }
    }
    outcome
}

// ── Game-state monitor ───────────────────────────────────────────────────────

/// Block until the vitals change or `monitor_wait` passes, then end the
/// session if no lives are left.  Duplicates the check in the ship
/// detector; stopping twice is harmless.  Returns `true` if it stopped the
/// session.
pub fn monitor_step(state: &SessionState) -> bool {
    let mut tx = state.begin().lock_game();
    if state.is_running() && tx.game.lives > 0 {
        let _ = tx.wait_for_change(state.config().monitor_wait());
    }
    if tx.game.lives == 0 {
        state.stop();
        return true;
    }
    false
}

// ── Bonus lives ───────────────────────────────────────────────────────────────

/// Grants one life per multiple of `every` the score has crossed.
///
/// Tracks the last threshold index already paid out, so a jump over a
/// multiple is never missed and a score that sits on a multiple is never
/// paid twice.
#[derive(Clone, Debug)]
pub struct BonusLives {
    every: u32,
    last_seen: u32,
    granted: u32,
}

impl BonusLives {
    pub fn new(every: u32) -> Self {
        Self {
            every,
            last_seen: 0,
            granted: 0,
        }
    }

    /// Thresholds paid out so far.
    pub fn granted(&self) -> u32 {
        self.granted
    }

    /// Lives owed for `score`, given everything observed so far.
    pub fn observe(&mut self, score: u32) -> u32 {
        if self.every == 0 || score == self.last_seen {
            return 0;
        }
        self.last_seen = score;
        let reached = score / self.every;
        if reached <= self.granted {
            return 0;
        }
        let owed = reached - self.granted;
        self.granted = reached;
        owed
    }

    /// Add `owed` lives, capped at `max_lives`.  Returns the lives actually
    /// added.
    pub fn pay(vitals: &mut Vitals, owed: u32, max_lives: u32) -> u32 {
        let before = vitals.lives;
        vitals.lives = vitals.lives.saturating_add(owed).min(max_lives.max(before));
        vitals.lives - before
    }

    pub fn step(&mut self, state: &SessionState) -> u32 {
        let mut tx = state.begin().lock_score().lock_game();
        if settled(state, &tx.game) {
            return 0;
        }
        let owed = self.observe(tx.score.points);
        if owed == 0 {
            return 0;
        }
        let added = Self::pay(&mut tx.game, owed, state.config().max_lives);
        debug!(score = tx.score.points, owed, added, "bonus life threshold crossed");
        if added > 0 {
            state.notify_vitals();
        }
        added
    }
}

// ── Damage flash ─────────────────────────────────────────────────────────────

/// Clear the damage flash once `duration` has passed since it started.
/// Returns `true` if it was cleared.
pub fn fade_flash(vitals: &mut Vitals, now: Duration, duration: Duration) -> bool {
    match vitals.flash_started {
        Some(started) if now.saturating_sub(started) >= duration => {
            vitals.flash_started = None;
            true
        }
        _ => false,
    }
}

pub fn flash_step(state: &SessionState) -> bool {
    let now = state.now();
    let mut tx = state.begin().lock_game();
    fade_flash(&mut tx.game, now, state.config().flash_duration())
}
