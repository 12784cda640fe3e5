//! Shared state for one play session.
//!
//! State is split into four lock domains, always acquired in this order:
//!
//! ```text
//!   bullets  →  enemies  →  score  →  game
//! ```
//!
//! The order is enforced by [`Txn`]: a transaction starts empty and each
//! `lock_*` method is only available while every later domain is still
//! unlocked, so an out-of-order acquisition does not compile.
//!
//! ```rust,ignore
//! let mut tx = state.begin().lock_bullets().lock_enemies().lock_score();
//! tx.score.points += 10;
//! ```
//!
//! Outside the locks there are only three atomics: `running` (cooperative
//! shutdown), the descent latch, and the input [`Intents`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::debug;

use crate::clock::Clock;
use crate::compute::lifecycle;
use crate::config::Config;
use crate::entities::{Arena, BulletPools, ScoreBoard, Snapshot, Squadron, Vitals};
use crate::input::{Command, Intents};

pub type Guard<'a, T> = MutexGuard<'a, T>;

pub struct SessionState {
    config: Config,
    arena: Arena,
    clock: Arc<dyn Clock>,

    bullets: Mutex<BulletPools>,
    enemies: Mutex<Squadron>,
    score: Mutex<ScoreBoard>,
    game: Mutex<Vitals>,
    /// Paired with `game`; signalled whenever lives or `running` change.
    vitals_changed: Condvar,

    running: AtomicBool,
    descent_halted: AtomicBool,
    input: Intents,
}

impl SessionState {
    /// Fresh state for a new session: level 1 formation deployed, empty
    /// bullet pools, full lives, `running` set.
    pub fn new(config: Config, arena: Arena, clock: Arc<dyn Clock>) -> Self {
        let mut bullets = BulletPools::default();
        let mut squadron = Squadron::default();
        let vitals = Vitals::new(config.starting_lives, &arena);
        lifecycle::reset_level(&mut bullets, &mut squadron, vitals.level, &config, &arena);

        Self {
            bullets: Mutex::new(bullets),
            enemies: Mutex::new(squadron),
            score: Mutex::new(ScoreBoard::default()),
            game: Mutex::new(vitals),
            vitals_changed: Condvar::new(),
            running: AtomicBool::new(true),
            descent_halted: AtomicBool::new(false),
            input: Intents::new(),
            config,
            arena,
            clock,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn input(&self) -> &Intents {
        &self.input
    }

    // ── Cooperative shutdown ─────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Clear `running` and wake the game-state monitor.  Idempotent.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::AcqRel) {
            debug!("session stop requested");
        }
        self.vitals_changed.notify_all();
    }

    pub fn notify_vitals(&self) {
        self.vitals_changed.notify_all();
    }

    // ── Descent latch ────────────────────────────────────────────────────────

    pub fn descent_halted(&self) -> bool {
        self.descent_halted.load(Ordering::Acquire)
    }

    pub fn halt_descent(&self) {
        self.descent_halted.store(true, Ordering::Release);
    }

    pub fn resume_descent(&self) {
        self.descent_halted.store(false, Ordering::Release);
    }

    // ── Input ────────────────────────────────────────────────────────────────

    /// Apply one decoded key press.
    pub fn command(&self, command: Command) {
        match command {
            Command::Left => self.input.press_left(self.now()),
            Command::Right => self.input.press_right(self.now()),
            Command::Fire => self.input.request_fire(),
            Command::Quit => self.stop(),
        }
    }

    // ── Transactions ─────────────────────────────────────────────────────────

    /// Start a transaction holding no locks.
    pub fn begin(&self) -> Txn<'_> {
        Txn {
            state: self,
            bullets: (),
            enemies: (),
            score: (),
            game: (),
        }
    }

    /// Copy everything a frame needs, under all four locks.
    pub fn snapshot(&self) -> Snapshot {
        let tx = self
            .begin()
            .lock_bullets()
            .lock_enemies()
            .lock_score()
            .lock_game();
        Snapshot::capture(&self.arena, &tx.bullets, &tx.enemies, &tx.score, &tx.game)
    }
}

/// A set of held domain guards.  Each type parameter is either `()` (not
/// held) or the guard for that domain.  Dropping the transaction releases
/// every guard it holds.
pub struct Txn<'a, B = (), E = (), S = (), G = ()> {
    state: &'a SessionState,
    pub bullets: B,
    pub enemies: E,
    pub score: S,
    pub game: G,
}

impl<'a> Txn<'a> {
    pub fn lock_bullets(self) -> Txn<'a, Guard<'a, BulletPools>> {
        Txn {
            state: self.state,
            bullets: self.state.bullets.lock(),
            enemies: (),
            score: (),
            game: (),
        }
    }
}

impl<'a, B> Txn<'a, B> {
    pub fn lock_enemies(self) -> Txn<'a, B, Guard<'a, Squadron>> {
        Txn {
            state: self.state,
            bullets: self.bullets,
            enemies: self.state.enemies.lock(),
            score: (),
            game: (),
        }
    }
}

impl<'a, B, E> Txn<'a, B, E> {
    pub fn lock_score(self) -> Txn<'a, B, E, Guard<'a, ScoreBoard>> {
        Txn {
            state: self.state,
            bullets: self.bullets,
            enemies: self.enemies,
            score: self.state.score.lock(),
            game: (),
        }
    }
}

impl<'a, B, E, S> Txn<'a, B, E, S> {
    pub fn lock_game(self) -> Txn<'a, B, E, S, Guard<'a, Vitals>> {
        Txn {
            state: self.state,
            bullets: self.bullets,
            enemies: self.enemies,
            score: self.score,
            game: self.state.game.lock(),
        }
    }
}

impl<'a> Txn<'a, (), (), (), Guard<'a, Vitals>> {
    /// Release the game lock until the vitals change or `timeout` passes,
    /// then reacquire it.  Only offered when no other domain is held.
    /// Returns `true` on timeout.
    ///
    /// `timeout` is wall-clock time, not session [`Clock`] time.
    pub fn wait_for_change(&mut self, timeout: Duration) -> bool {
        self.state
            .vitals_changed
            .wait_for(&mut self.game, timeout)
            .timed_out()
    }
}
