//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the board rules and the bookkeeping types the session
//! controller builds on. It has **no** knowledge of rendering, input, audio or
//! timing:
//!
//! - **Deterministic**: the only randomness is kind selection, injected through
//!   [`KindSource`]; the same seed produces the same boards.
//! - **Testable**: every rule is a plain method on plain data.
//!
//! # Module Structure
//!
//! - [`grid`]: the board, line detection, swap legality, gravity targets
//! - [`pool`]: recycled piece storage with generation- and serial-checked motion tokens
//! - [`rng`]: kind sources (seeded and scripted)
//! - [`scoring`]: score accumulation, level curve, progress percentage
//! - [`snapshot`]: serializable board + session view
//!
//! # Game Rules
//!
//! - **Match**: three or more same-kind gems in a row or column. Each axis is
//!   judged on its own; L and T shapes only count through their straight parts.
//! - **Swap**: two orthogonally adjacent gems may be swapped only if the swap
//!   puts at least one of them into a match.
//! - **Gravity**: gems fall straight down into empty cells; row 0 is the floor.
//! - **Dead board**: no legal swap remains. This ends the session.
//!
//! # Example
//!
//! ```
//! use gem_swap_core::Grid;
//! use gem_swap_core::types::GridPosition;
//!
//! let mut grid = Grid::from_rows(&[
//!     "A..",
//!     "BAA",
//! ]);
//!
//! // Swapping (0,1) down into (0,0) completes the bottom row.
//! assert!(grid.can_swap(GridPosition::new(0, 1), GridPosition::new(0, 0)));
//! assert!(grid.any_possible_matches());
//! assert!(!grid.any_matches());
//! ```

pub mod grid;
pub mod pool;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use gem_swap_types as types;

// Re-export commonly used types for convenience
pub use grid::{Cell, Gem, Grid};
pub use pool::{MotionToken, Piece, PieceHandle, PiecePool};
pub use rng::{KindSource, ScriptedKinds, SeededKinds};
pub use scoring::{LevelCurve, ScoreResult, Session};
pub use snapshot::BoardSnapshot;
