//! Pool module - recycled piece storage
//!
//! Pieces live in an index-addressed arena. A piece that leaves the board is
//! never freed: its slot is marked inactive and its handle pushed onto a free
//! stack, and the next placement pops it again. Presentation layers can keep
//! one scene object per handle for the lifetime of the pool.
//!
//! Each activation bumps the slot's generation and each started motion bumps
//! its motion serial. A [`MotionToken`] records both, so a completion signal
//! for a recycled piece, or for a motion that a newer one replaced, is
//! recognised as stale and ignored.

use log::{debug, warn};

use crate::types::{GemKind, GridPosition, MovementState};

/// Stable index of a piece slot in its pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceHandle(u32);

impl PieceHandle {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for PieceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Completion ticket for one fall or swap animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MotionToken {
    pub handle: PieceHandle,
    pub generation: u32,
    pub serial: u32,
}

/// A gem's live state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Piece {
    pub kind: GemKind,
    pub position: GridPosition,
    pub motion: MovementState,
    generation: u32,
    serial: u32,
    active: bool,
}

impl Piece {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_moving(&self) -> bool {
        self.motion.is_moving()
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    fn token(&self, handle: PieceHandle) -> MotionToken {
        MotionToken {
            handle,
            generation: self.generation,
            serial: self.serial,
        }
    }
}

/// Arena of pieces plus a stack of free slots
#[derive(Debug, Clone, Default)]
pub struct PiecePool {
    pieces: Vec<Piece>,
    free: Vec<PieceHandle>,
    active_count: usize,
}

impl PiecePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pieces: Vec::with_capacity(capacity),
            free: Vec::with_capacity(capacity),
            active_count: 0,
        }
    }

    /// Activate a piece, reusing a free slot when one exists.
    pub fn acquire(&mut self, kind: GemKind, position: GridPosition) -> PieceHandle {
        let handle = match self.free.pop() {
            Some(handle) => {
                let piece = &mut self.pieces[handle.index()];
                piece.generation = piece.generation.wrapping_add(1);
                piece.kind = kind;
                piece.position = position;
                piece.motion = MovementState::Idle;
                piece.active = true;
                handle
            }
            None => {
                let handle = PieceHandle::new(self.pieces.len() as u32);
                self.pieces.push(Piece {
                    kind,
                    position,
                    motion: MovementState::Idle,
                    generation: 0,
                    serial: 0,
                    active: true,
                });
                handle
            }
        };
        self.active_count += 1;
        handle
    }

    /// Return a piece to the free stack.
    ///
    /// Panics if the piece is not active: releasing twice would hand the same
    /// slot out to two cells.
    pub fn release(&mut self, handle: PieceHandle) {
        let piece = &mut self.pieces[handle.index()];
        assert!(piece.active, "piece {} released while inactive", handle);
        piece.active = false;
        piece.motion = MovementState::Idle;
        self.free.push(handle);
        self.active_count -= 1;
    }

    /// Release every active piece; returns how many were released
    pub fn release_all(&mut self) -> usize {
        let handles: Vec<PieceHandle> = self.active_handles().collect();
        for &handle in &handles {
            self.release(handle);
        }
        handles.len()
    }

    pub fn get(&self, handle: PieceHandle) -> &Piece {
        &self.pieces[handle.index()]
    }

    pub fn get_mut(&mut self, handle: PieceHandle) -> &mut Piece {
        &mut self.pieces[handle.index()]
    }

    /// Handles of all active pieces in slot order
    pub fn active_handles(&self) -> impl Iterator<Item = PieceHandle> + '_ {
        self.pieces
            .iter()
            .enumerate()
            .filter(|(_, p)| p.active)
            .map(|(i, _)| PieceHandle::new(i as u32))
    }

    /// Mark a piece as moving and issue the token that completes the motion.
    ///
    /// Starting a motion on a piece that is already moving replaces the old
    /// motion; its token stops being accepted.
    pub fn start_motion(&mut self, handle: PieceHandle, motion: MovementState) -> MotionToken {
        let piece = &mut self.pieces[handle.index()];
        debug_assert!(piece.active, "motion started on inactive piece {}", handle);
        piece.motion = motion;
        piece.serial = piece.serial.wrapping_add(1);
        piece.token(handle)
    }

    /// Settle the motion behind `token`.
    ///
    /// Returns false when the token is stale (the piece was recycled, released
    /// or given a newer motion since) or the piece is not moving.
    pub fn complete_motion(&mut self, token: MotionToken) -> bool {
        let Some(piece) = self.pieces.get_mut(token.handle.index()) else {
            warn!("motion token for unknown piece {}", token.handle);
            return false;
        };
        if piece.generation != token.generation {
            warn!(
                "ignoring stale motion token for piece {} (generation {} vs {})",
                token.handle, token.generation, piece.generation
            );
            return false;
        }
        if !piece.active {
            debug!("motion token for released piece {}", token.handle);
            return false;
        }
        if piece.serial != token.serial || !piece.motion.is_moving() {
            debug!(
                "motion token for piece {} already settled or replaced",
                token.handle
            );
            return false;
        }
        piece.motion = MovementState::Idle;
        true
    }

    /// Settle every in-flight motion; returns how many were settled
    pub fn complete_all(&mut self) -> usize {
        let mut settled = 0;
        for piece in self.pieces.iter_mut().filter(|p| p.active) {
            if piece.motion.is_moving() {
                piece.motion = MovementState::Idle;
                settled += 1;
            }
        }
        settled
    }

    /// Tokens for every active piece still in motion
    pub fn in_flight(&self) -> impl Iterator<Item = MotionToken> + '_ {
        self.pieces
            .iter()
            .enumerate()
            .filter(|(_, p)| p.active && p.motion.is_moving())
            .map(|(i, p)| p.token(PieceHandle::new(i as u32)))
    }

    pub fn any_moving(&self) -> bool {
        self.pieces.iter().any(|p| p.active && p.motion.is_moving())
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Total slots ever minted
    pub fn capacity(&self) -> usize {
        self.pieces.len()
    }
}
