//! Top-three leaderboard, persisted as a plain text file with one score per
//! line, highest first.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::coordinator::HighScoreStore;
use crate::error::GameError;

/// Number of scores kept.
pub const PODIUM: usize = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Leaderboard {
    scores: [u32; PODIUM],
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scores(&self) -> [u32; PODIUM] {
        self.scores
    }

    pub fn best(&self) -> u32 {
        self.scores[0]
    }

    /// Insert `score` above the first entry it beats, pushing the rest down.
    /// Ties do not displace.  Returns the 1-based rank, or `None` if it did not
    /// place.
    pub fn insert(&mut self, score: u32) -> Option<usize> {
        let pos = self.scores.iter().position(|&s| score > s)?;
        self.scores[pos..].rotate_right(1);
        self.scores[pos] = score;
        Some(pos + 1)
    }

    /// Parse the file format.  Missing or malformed lines count as 0.
    pub fn parse(text: &str) -> Self {
        let mut board = Self::new();
        for (slot, line) in board.scores.iter_mut().zip(text.lines()) {
            *slot = line.trim().parse().unwrap_or(0);
        }
        board
    }

    pub fn to_text(&self) -> String {
        self.scores.iter().map(|s| format!("{s}\n")).collect()
    }
}

/// In-memory store, handy for tests and for running without a file.
impl HighScoreStore for Leaderboard {
    fn record(&mut self, final_score: u32) -> Result<[u32; PODIUM], GameError> {
        let _ = self.insert(final_score);
        Ok(self.scores)
    }
}

/// Leaderboard backed by a text file.
#[derive(Clone, Debug)]
pub struct FileHighScores {
    path: PathBuf,
}

impl FileHighScores {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$HOME/.galaga_scores`, or the working directory without a home.
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".galaga_scores")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the board; a missing file is an empty board.
    pub fn load(&self) -> Result<Leaderboard, GameError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Leaderboard::parse(&text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no high score file yet");
                Ok(Leaderboard::new())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, board: &Leaderboard) -> Result<(), GameError> {
        std::fs::write(&self.path, board.to_text())?;
        Ok(())
    }
}

impl HighScoreStore for FileHighScores {
    fn record(&mut self, final_score: u32) -> Result<[u32; PODIUM], GameError> {
        let mut board = self.load()?;
        if let Some(rank) = board.insert(final_score) {
            debug!(rank, final_score, "new high score");
            if let Err(err) = self.save(&board) {
                warn!(path = %self.path.display(), "could not save high scores");
                return Err(err);
            }
        }
        Ok(board.scores())
    }
}
