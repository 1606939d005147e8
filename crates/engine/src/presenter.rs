//! Presentation hooks for piece motion
//!
//! The engine decides where pieces go; the presentation layer decides how they
//! get there. Every fall or swap hands the presenter a [`MotionToken`]. When
//! the animation finishes, the token goes back through
//! [`MatchEngine::complete_motion`](crate::MatchEngine::complete_motion).
//! Until then the cascade waits.

use crate::core::{MotionToken, PieceHandle};
use crate::types::{GemKind, GridPosition, Point};

/// Per-piece lifecycle notifications. All methods default to no-ops.
pub trait PiecePresenter {
    /// A piece was activated (freshly minted or recycled) at `start`.
    fn piece_placed(&mut self, _handle: PieceHandle, _kind: GemKind, _start: Point) {}

    /// The piece should fall to grid cell `to`, at `target` in world space.
    fn fall_started(&mut self, _token: MotionToken, _to: GridPosition, _target: Point) {}

    /// The piece should slide to grid cell `to` as half of a swap.
    fn swap_started(&mut self, _token: MotionToken, _to: GridPosition, _target: Point) {}

    /// The piece left the board and went back to the pool.
    fn piece_removed(&mut self, _handle: PieceHandle) {}
}

/// Presenter that ignores everything (headless play, tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl PiecePresenter for NullPresenter {}
