//! The worker crew: one named OS thread per simulation responsibility.
//!
//! Every worker runs the same loop: check `running` at the top, do one step,
//! sleep for its cadence.  Shutdown is cooperative; [`Crew::join`] returns
//! once every worker has seen `running == false` and exited.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error};

use crate::clock::Cadence;
use crate::compute::lifecycle::{self, BonusLives};
use crate::compute::march::March;
use crate::compute::{collision, motion, ship, volley};
use crate::error::GameError;
use crate::input::InputSource;
use crate::session::SessionState;

/// Running worker threads for one session.
pub struct Crew<I> {
    workers: Vec<(&'static str, JoinHandle<()>)>,
    input: Option<JoinHandle<I>>,
}

impl<I: InputSource> Crew<I> {
    /// Start every simulation worker plus the input pump that owns `source`.
    ///
    /// If any thread fails to start, the ones already running are stopped and
    /// joined before the error is returned.
    pub fn spawn(state: &Arc<SessionState>, source: I) -> Result<Self, GameError> {
        let mut crew = Self {
            workers: Vec::with_capacity(11),
            input: None,
        };
        if let Err(err) = crew.spawn_all(state, source) {
            state.stop();
            let _ = crew.join();
            return Err(err);
        }
        debug!(workers = crew.len(), "worker crew started");
        Ok(crew)
    }

    fn spawn_all(&mut self, state: &Arc<SessionState>, source: I) -> Result<(), GameError> {
        let config = state.config().clone();
        let update = config.update_cadence();

        self.periodic(state, "player-bullets", update, motion::player_bullets_step)?;
        self.periodic(state, "enemy-bullets", update, motion::enemy_bullets_step)?;
        self.periodic(state, "ship", update, ship::ship_step)?;
        self.periodic(state, "bullet-hits", config.bullet_hit_cadence(), |s| {
            let _ = collision::player_hits_step(s);
        })?;
        self.periodic(state, "ship-hits", update, |s| {
            let _ = collision::ship_hits_step(s);
        })?;

        let mut march = March::new();
        self.periodic(state, "enemy-march", update, move |s| {
            let _ = march.step(s);
        })?;

        let mut dice = StdRng::from_entropy();
        self.periodic(state, "enemy-fire", config.volley_cadence(), move |s| {
            let _ = volley::volley_step(s, &mut dice);
        })?;

        self.periodic(state, "level-check", config.level_check_cadence(), |s| {
            let _ = lifecycle::level_check_step(s);
        })?;

        let mut bonus = BonusLives::new(config.bonus_life_every);
        self.periodic(state, "bonus-lives", config.score_cadence(), move |s| {
            let _ = bonus.step(s);
        })?;

        self.periodic(state, "flash-timer", update, |s| {
            let _ = lifecycle::flash_step(s);
        })?;

        // The monitor blocks on the condvar inside its step, then pauses.
        self.periodic(state, "game-monitor", config.monitor_pause(), |s| {
            let _ = lifecycle::monitor_step(s);
        })?;

        self.input = Some(spawn_input(state, source)?);
        Ok(())
    }

    fn periodic<F>(
        &mut self,
        state: &Arc<SessionState>,
        name: &'static str,
        cadence: Cadence,
        mut step: F,
    ) -> Result<(), GameError>
    where
        F: FnMut(&SessionState) + Send + 'static,
    {
        let state = Arc::clone(state);
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let mut rng = rand::thread_rng();
                while state.is_running() {
                    step(&state);
                    state.clock().sleep(cadence.next_delay(&mut rng));
                }
                debug!(worker = name, "worker exited");
            })
            .map_err(|source| GameError::Spawn {
                worker: name,
                source,
            })?;
        self.workers.push((name, handle));
        Ok(())
    }

    /// Number of running threads, the input pump included.
    pub fn len(&self) -> usize {
        self.workers.len() + usize::from(self.input.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait for every worker to exit and hand the input source back.
    ///
    /// Blocks until `running` is cleared.  Every thread is joined even if one
    /// of them panicked; the first panic is then reported.
    pub fn join(self) -> Result<Option<I>, GameError> {
        let mut failure = None;
        for (name, handle) in self.workers {
            if handle.join().is_err() {
                error!(worker = name, "worker panicked");
                failure = failure.or(Some(GameError::WorkerPanicked { worker: name }));
            }
        }
        let source = match self.input {
            Some(handle) => match handle.join() {
                Ok(source) => Some(source),
                Err(_) => {
                    error!(worker = "input", "worker panicked");
                    failure = failure.or(Some(GameError::WorkerPanicked { worker: "input" }));
                    None
                }
            },
            None => None,
        };
        match failure {
            Some(err) => Err(err),
            None => Ok(source),
        }
    }
}

/// The input pump: feed commands from `source` into the session until it
/// stops, then return the source so the next session can reuse it.
fn spawn_input<I: InputSource>(
    state: &Arc<SessionState>,
    mut source: I,
) -> Result<JoinHandle<I>, GameError> {
    let state = Arc::clone(state);
    thread::Builder::new()
        .name("input".to_string())
        .spawn(move || {
            let poll = state.config().input_poll();
            while state.is_running() {
                if let Some(command) = source.next_command(poll) {
                    state.command(command);
                }
            }
            source
        })
        .map_err(|source| GameError::Spawn {
            worker: "input",
            source,
        })
}
