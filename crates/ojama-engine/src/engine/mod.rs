//! Game engine logic and state management.
//!
//! This module drives the core data structures through time:
//!
//! - [`GameSession`] - One board: gravity, lock-in, line clears, top-out, player requests
//! - [`GameStats`] - Score, cleared lines, and the garbage trigger counter
//! - [`GarbageInjector`] - Obstruction rows falling from the top after enough clears
//! - [`SessionSeed`] - Seed for the session's deterministic random stream
//!
//! # Game Flow
//!
//! 1. Create a [`GameSession`] with a [`SessionSeed`] and start it
//! 2. Feed it elapsed time with [`GameSession::tick`] and player requests in between
//! 3. A piece that cannot fall locks; full lines clear and a new piece spawns
//! 4. Every fifth cleared line sends a garbage row down onto the stack
//! 5. A new piece that does not fit ends the game
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use ojama_engine::{GameSession, SessionConfig, SessionSeed};
//!
//! let mut session = GameSession::spawn(SessionConfig::default(), SessionSeed::from_u128(1));
//!
//! let result = loop {
//!     session.request_hard_drop();
//!     if let Some(result) = session.tick(Duration::from_millis(1000)) {
//!         break result;
//!     }
//! };
//!
//! assert!(session.state().is_game_over());
//! assert_eq!(result.score, session.stats().score());
//! ```

pub use self::{game_session::*, game_stats::*, garbage::*, session_seed::*};

mod game_session;
mod game_stats;
mod garbage;
mod session_seed;
