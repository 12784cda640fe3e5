//! Player intent shared between the input task and the ship-update worker.
//!
//! Terminals without key-release events only report presses and OS
//! key-repeats, so a held direction is modelled as "pressed recently": each
//! press stamps the time, and [`Intents::expire`] drops the direction once no
//! press has arrived for the hold timeout.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc;
use std::time::Duration;

/// A decoded key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Left,
    Right,
    Fire,
    Quit,
}

/// Anything that yields player commands.  Owned by the input worker for
/// the length of one session.
pub trait InputSource: Send + 'static {
    /// Wait up to `timeout` for the next command.
    fn next_command(&mut self, timeout: Duration) -> Option<Command>;
}

impl InputSource for mpsc::Receiver<Command> {
    fn next_command(&mut self, timeout: Duration) -> Option<Command> {
        self.recv_timeout(timeout).ok()
    }
}

/// Lock-free intent flags.  Each flag has one writer per epoch, so relaxed
/// ordering is enough; the movement timestamp is stored after the flag.
#[derive(Debug, Default)]
pub struct Intents {
    left: AtomicBool,
    right: AtomicBool,
    fire: AtomicBool,
    last_move_ms: AtomicU64,
}

impl Intents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press_left(&self, now: Duration) {
        self.right.store(false, Ordering::Relaxed);
        self.left.store(true, Ordering::Relaxed);
        self.last_move_ms.store(now.as_millis() as u64, Ordering::Release);
    }

    pub fn press_right(&self, now: Duration) {
        self.left.store(false, Ordering::Relaxed);
        self.right.store(true, Ordering::Relaxed);
        self.last_move_ms.store(now.as_millis() as u64, Ordering::Release);
    }

    pub fn request_fire(&self) {
        self.fire.store(true, Ordering::Relaxed);
    }

    /// Consume a pending fire request.  At most one caller sees `true` per
    /// request.
    pub fn take_fire(&self) -> bool {
        self.fire.swap(false, Ordering::AcqRel)
    }

    /// Forget a held direction once `hold_timeout` has passed since the last
    /// movement press.
    pub fn expire(&self, now: Duration, hold_timeout: Duration) {
        if !self.left.load(Ordering::Relaxed) && !self.right.load(Ordering::Relaxed) {
            return;
        }
        let last = self.last_move_ms.load(Ordering::Acquire);
        if (now.as_millis() as u64).saturating_sub(last) > hold_timeout.as_millis() as u64 {
            self.left.store(false, Ordering::Relaxed);
            self.right.store(false, Ordering::Relaxed);
        }
    }

    /// `-1` for left, `1` for right, `0` when idle.
    pub fn direction(&self) -> i32 {
        if self.left.load(Ordering::Relaxed) {
            -1
        } else if self.right.load(Ordering::Relaxed) {
            1
        } else {
            0
        }
    }
}
