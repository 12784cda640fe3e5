//! Tuning table for a play session.
//!
//! Every field has a default, so a config file only needs the keys it wants
//! to change:
//!
//! ```toml
//! update_ms = 20
//! shot_chance = 10
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::clock::Cadence;
use crate::error::GameError;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ship travel per update tick while a direction is held (columns).
    pub player_speed: f32,
    /// Rows a player bullet climbs per tick.
    pub player_bullet_speed: f32,
    /// Rows an enemy bullet falls per tick.
    pub enemy_bullet_speed: f32,

    pub base_enemy_rows: u32,
    pub enemy_columns: u32,
    /// The formation moves on every Nth tick of its controller.
    pub march_interval: u32,
    /// Per living enemy and volley: fire when `roll(0..shot_denominator) < shot_chance`.
    pub shot_chance: u32,
    pub shot_denominator: u32,

    /// Base simulation period; most workers tick at this rate.
    pub update_ms: u64,
    pub render_ms: u64,
    pub input_ms: u64,
    /// Upper bound of the random delay added to every worker sleep.
    pub jitter_ms: u64,
    /// Movement intent is dropped this long after the last key event.
    pub hold_timeout_ms: u64,
    pub flash_ms: u64,

    pub max_level: u32,
    pub starting_lives: u32,
    pub max_lives: u32,
    /// One bonus life for every multiple of this score.
    pub bonus_life_every: u32,
    pub points_per_kill: u32,

    pub monitor_wait_ms: u64,
    pub monitor_pause_ms: u64,
    pub score_poll_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            player_speed: 1.2,
            player_bullet_speed: 0.8,
            enemy_bullet_speed: 0.6,
            base_enemy_rows: 2,
            enemy_columns: 8,
            march_interval: 8,
            shot_chance: 6,
            shot_denominator: 1000,
            update_ms: 30,
            render_ms: 25,
            input_ms: 10,
            jitter_ms: 0,
            hold_timeout_ms: 80,
            flash_ms: 500,
            max_level: 3,
            starting_lives: 3,
            max_lives: 5,
            bonus_life_every: 300,
            points_per_kill: 10,
            monitor_wait_ms: 100,
            monitor_pause_ms: 50,
            score_poll_ms: 100,
        }
    }
}

impl Config {
    /// Parse a config from TOML text.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, GameError> {
        toml::from_str(text).map_err(|source| GameError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, GameError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text, path)
    }

    fn cadence(&self, period_ms: u64) -> Cadence {
        Cadence::every(Duration::from_millis(period_ms.max(1)))
            .with_jitter(Duration::from_millis(self.jitter_ms))
    }

    // ── Worker cadences ──────────────────────────────────────────────────────

    /// Bullet motion, ship steering, formation march, ship collision and the
    /// flash timer.
    pub fn update_cadence(&self) -> Cadence {
        self.cadence(self.update_ms)
    }

    pub fn bullet_hit_cadence(&self) -> Cadence {
        self.cadence(self.update_ms / 2)
    }

    pub fn volley_cadence(&self) -> Cadence {
        self.cadence(self.update_ms * 2)
    }

    pub fn level_check_cadence(&self) -> Cadence {
        self.cadence(self.update_ms * 3)
    }

    pub fn score_cadence(&self) -> Cadence {
        self.cadence(self.score_poll_ms)
    }

    pub fn monitor_pause(&self) -> Cadence {
        self.cadence(self.monitor_pause_ms)
    }

    pub fn render_cadence(&self) -> Cadence {
        Cadence::every(Duration::from_millis(self.render_ms.max(1)))
    }

    pub fn input_poll(&self) -> Duration {
        Duration::from_millis(self.input_ms.max(1))
    }

    pub fn hold_timeout(&self) -> Duration {
        Duration::from_millis(self.hold_timeout_ms)
    }

    pub fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.flash_ms)
    }

    pub fn monitor_wait(&self) -> Duration {
        Duration::from_millis(self.monitor_wait_ms)
    }
}
