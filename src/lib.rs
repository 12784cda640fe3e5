//! Terminal Galaga driven by a crew of cooperating simulation threads.
//!
//! The library holds the whole simulation core: the shared entity store and
//! its lock domains ([`session`]), the per-responsibility update steps
//! ([`compute`]), the threads that run them ([`workers`]) and the session
//! lifecycle that ties it all to a renderer ([`coordinator`]).  Terminal
//! drawing and keyboard capture live in the binary.

pub mod clock;
pub mod compute;
pub mod config;
pub mod coordinator;
pub mod entities;
pub mod error;
pub mod highscores;
pub mod input;
pub mod session;
pub mod workers;

pub use config::Config;
pub use coordinator::{Ending, HighScoreStore, Outcome, Renderer, Session};
pub use error::GameError;
pub use session::SessionState;
