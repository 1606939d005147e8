//! Session controller for the gem-swap board.
//!
//! [`MatchEngine`] owns one grid, one piece pool and the score state, and runs
//! the swap / match / fall / refill cascade as a non-blocking state machine.
//! Presentation plugs in at two seams:
//!
//! - [`PiecePresenter`] receives per-piece motion requests and hands back
//!   [`MotionToken`](crate::core::MotionToken)s when animations finish.
//! - [`EventSink`] listeners receive [`EngineEvent`]s (score, level, game over).
//!
//! Configuration comes from [`EngineConfig`], either built in code, read from
//! `GEM_SWAP_*` environment variables, or parsed from JSON.

pub mod config;
pub mod cursor;
pub mod events;
pub mod match_engine;
pub mod presenter;

pub use gem_swap_core as core;
pub use gem_swap_types as types;

pub use config::{ConfigError, EngineConfig};
pub use cursor::SwapCursor;
pub use events::{EngineEvent, EventLog, EventSink};
pub use match_engine::{MatchEngine, Phase, Resolve, SwapOutcome};
pub use presenter::{NullPresenter, PiecePresenter};
