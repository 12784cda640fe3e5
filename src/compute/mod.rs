//! Game-logic steps, one module per worker responsibility.
//!
//! Each module has two layers:
//!
//! * pure functions over the entity types (`climb`, `resolve_player_hits`,
//!   `check_level`, …) that tests can call with hand-built pools, and
//! * a `*_step(&SessionState)` wrapper that takes the locks it needs through
//!   a [`crate::session::Txn`] and delegates to the pure layer.
//!
//! No step returns an error.  Spawning into a full pool drops the request,
//! leaving the arena retires the entity, and collisions are resolved under
//! the same lock that retires entities, so a dead enemy or spent bullet is
//! never hit twice.

pub mod collision;
pub mod lifecycle;
pub mod march;
pub mod motion;
pub mod ship;
pub mod volley;
