//! The frame coordinator: one play session from first worker to final score.
//!
//! ```text
//!   Session::start ──► workers running ──► Session::run (render every frame)
//!                                               │ running cleared
//!                                               ▼
//!                      Session::finish: join every worker, record score
//! ```
//!
//! A session cannot be restarted in place.  `finish` consumes it and joins
//! its workers before returning, so the next session's workers never overlap
//! with the previous one's.

use std::sync::Arc;

use tracing::{error, info};

use crate::clock::Clock;
use crate::config::Config;
use crate::entities::{Arena, Snapshot};
use crate::error::GameError;
use crate::highscores::PODIUM;
use crate::input::InputSource;
use crate::session::SessionState;
use crate::workers::Crew;

/// Turns a snapshot into a visible frame.  Must not touch shared state.
pub trait Renderer {
    fn render(&mut self, frame: &Snapshot) -> Result<(), GameError>;
}

/// Receives the final score of a session and returns the top scores,
/// highest first.
pub trait HighScoreStore {
    fn record(&mut self, final_score: u32) -> Result<[u32; PODIUM], GameError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ending {
    Victory,
    GameOver,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
    pub ending: Ending,
    pub score: u32,
    /// Highest level reached.
    pub level: u32,
    pub top_scores: [u32; PODIUM],
    pub last_frame: Snapshot,
}

pub struct Session<I> {
    state: Arc<SessionState>,
    crew: Crew<I>,
}

impl<I: InputSource> Session<I> {
    /// Build fresh shared state and start every worker.
    pub fn start(
        config: Config,
        arena: Arena,
        clock: Arc<dyn Clock>,
        input: I,
    ) -> Result<Self, GameError> {
        let state = Arc::new(SessionState::new(config, arena, clock));
        let crew = Crew::spawn(&state, input)?;
        info!(width = arena.width, height = arena.height, "session started");
        Ok(Self { state, crew })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    /// Ask every worker to wind down.
    pub fn stop(&self) {
        self.state.stop();
    }

    /// Render a frame per render cadence until `running` is cleared.  A
    /// renderer error stops the session before it is returned.
    pub fn run<R: Renderer>(&self, renderer: &mut R) -> Result<(), GameError> {
        let cadence = self.state.config().render_cadence();
        let mut rng = rand::thread_rng();
        while self.state.is_running() {
            if let Err(err) = renderer.render(&self.state.snapshot()) {
                self.state.stop();
                return Err(err);
            }
            self.state.clock().sleep(cadence.next_delay(&mut rng));
        }
        Ok(())
    }

    /// Stop and join every worker without recording anything.  Used when the
    /// session ends abnormally.
    pub fn abort(self) -> Result<Option<I>, GameError> {
        self.state.stop();
        self.crew.join()
    }

    /// Stop and join every worker, then hand the final score to `store`.
    /// Returns the outcome and the input source for reuse.
    pub fn finish<H: HighScoreStore>(
        self,
        store: &mut H,
    ) -> Result<(Outcome, Option<I>), GameError> {
        self.state.stop();
        let source = self.crew.join()?;

        let last_frame = self.state.snapshot();
        let ending = if last_frame.completed {
            Ending::Victory
        } else {
            Ending::GameOver
        };
        let top_scores = store.record(last_frame.score)?;
        info!(?ending, score = last_frame.score, level = last_frame.level, "session finished");

        let outcome = Outcome {
            ending,
            score: last_frame.score,
            level: last_frame.level.min(self.state.config().max_level),
            top_scores,
            last_frame,
        };
        Ok((outcome, source))
    }
}

/// Play one full session: start, render until it ends, join, draw the final
/// frame and record the score.
pub fn play<I, R, H>(
    config: Config,
    arena: Arena,
    clock: Arc<dyn Clock>,
    input: I,
    renderer: &mut R,
    store: &mut H,
) -> Result<(Outcome, Option<I>), GameError>
where
    I: InputSource,
    R: Renderer,
    H: HighScoreStore,
{
    let session = Session::start(config, arena, clock, input)?;
    if let Err(err) = session.run(renderer) {
        if let Err(join_err) = session.abort() {
            error!(%err, "renderer failed during a worker panic");
            return Err(join_err);
        }
        return Err(err);
    }
    let (outcome, source) = session.finish(store)?;
    renderer.render(&outcome.last_frame)?;
    Ok((outcome, source))
}
