//! Time source and worker pacing.
//!
//! Workers never call `std::thread::sleep` or `Instant::now` directly; they
//! go through a [`Clock`] so tests can substitute [`ManualClock`] and move
//! time by hand.
//!
//! One wait is exempt: the game-state monitor blocks on the game condvar
//! (`Txn::wait_for_change`), and a condvar timeout always runs on the wall
//! clock.  It only bounds how long the monitor sleeps between checks; a
//! notify wakes it regardless of the clock in use.  Tests that drive the
//! monitor keep `monitor_wait_ms` small or notify explicitly.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use rand::Rng;

/// Monotonic time measured from an arbitrary per-clock origin.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
    fn sleep(&self, duration: Duration);
}

/// Wall-clock time.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Simulated time with millisecond resolution.
///
/// `sleep` advances the clock instead of blocking, so threaded tests driven by
/// it run as fast as the scheduler allows.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
        thread::yield_now();
    }
}

/// How often a worker ticks: a fixed period plus up to `jitter` extra.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cadence {
    pub period: Duration,
    pub jitter: Duration,
}

impl Cadence {
    pub const fn every(period: Duration) -> Self {
        Self {
            period,
            jitter: Duration::ZERO,
        }
    }

    pub const fn with_jitter(self, jitter: Duration) -> Self {
        Self { jitter, ..self }
    }

    /// Delay before the next tick.
    pub fn next_delay(&self, rng: &mut impl Rng) -> Duration {
        if self.jitter.is_zero() {
            self.period
        } else {
            self.period + rng.gen_range(Duration::ZERO..=self.jitter)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn manual_clock_sleep_advances_time() {
        let clock = ManualClock::new();
        clock.sleep(Duration::from_millis(30));
        clock.sleep(Duration::from_millis(30));
        assert_eq!(clock.now(), Duration::from_millis(60));
    }

    #[test]
    fn cadence_without_jitter_is_exact() {
        let cadence = Cadence::every(Duration::from_millis(30));
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            assert_eq!(cadence.next_delay(&mut rng), Duration::from_millis(30));
        }
    }

    #[test]
    fn cadence_jitter_stays_in_bounds() {
        let cadence =
            Cadence::every(Duration::from_millis(30)).with_jitter(Duration::from_millis(5));
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let d = cadence.next_delay(&mut rng);
            assert!(d >= Duration::from_millis(30) && d <= Duration::from_millis(35));
        }
    }
}
