//! Core types module - shared data structures and constants
//!
//! This module defines the plain data types used throughout the workspace.
//! They carry no behaviour beyond small coordinate helpers, so they can be
//! shared by the board logic, the session controller and any presentation
//! layer without pulling in either.
//!
//! # Coordinates
//!
//! Grid coordinates are `(x, y)` with `x` growing to the right and `y` growing
//! upwards. Row 0 is the bottom row: gravity pulls pieces towards `y = 0` and
//! fresh pieces drop in from above `y = height - 1`.
//!
//! Positions are signed so that neighbour probing at the board edge (e.g.
//! `(-1, 0)`) can be expressed and rejected by bounds checks instead of
//! wrapping.
//!
//! # Default tuning
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_WIDTH` | 8 | Columns |
//! | `DEFAULT_HEIGHT` | 8 | Rows |
//! | `DEFAULT_PALETTE_SIZE` | 6 | Number of gem kinds |
//! | `DEFAULT_POINTS_PER_GEM` | 10 | Points per removed gem |
//! | `MIN_LINE_LENGTH` | 3 | Shortest run that counts as a match |
//!
//! # Examples
//!
//! ```
//! use gem_swap_types::{GemKind, GridPosition, GridSize};
//!
//! let size = GridSize::new(5, 5);
//! let pos = GridPosition::new(4, 0);
//! assert!(size.contains(pos));
//! assert!(!size.contains(pos.offset(1, 0)));
//!
//! assert!(pos.is_adjacent(GridPosition::new(4, 1)));
//! assert!(!pos.is_adjacent(GridPosition::new(3, 1)));
//!
//! assert_eq!(GemKind::new(2).index(), 2);
//! ```

use serde::{Deserialize, Serialize};

/// Default board width in cells
pub const DEFAULT_WIDTH: i32 = 8;

/// Default board height in cells
pub const DEFAULT_HEIGHT: i32 = 8;

/// Default number of distinct gem kinds
pub const DEFAULT_PALETTE_SIZE: u8 = 6;

/// Smallest palette that still lets a session start reliably
pub const MIN_PALETTE_SIZE: u8 = 3;

/// Default points awarded per removed gem
pub const DEFAULT_POINTS_PER_GEM: u32 = 10;

/// Points needed to leave level 1, 2, 3, ... (cumulative score)
pub const DEFAULT_LEVEL_CURVE: [u32; 8] = [100, 250, 450, 700, 1000, 1400, 1900, 2500];

/// Shortest run of same-kind gems that counts as a match
pub const MIN_LINE_LENGTH: usize = 3;

/// The four orthogonal unit steps, in the order neighbours are visited:
/// left, right, down, up.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// A cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Position shifted by `(dx, dy)`; may leave the board.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// True if `other` shares a row or column with `self` at distance exactly one.
    pub fn is_adjacent(self, other: GridPosition) -> bool {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        dx + dy == 1
    }

    /// The four orthogonal neighbours (unchecked against bounds).
    pub fn neighbors(self) -> [GridPosition; 4] {
        NEIGHBOR_OFFSETS.map(|(dx, dy)| self.offset(dx, dy))
    }

    /// World coordinates of this cell on a lattice anchored at `origin`.
    pub fn to_world(self, origin: Point, spacing: f32) -> Point {
        Point::new(
            origin.x + self.x as f32 * spacing,
            origin.y + self.y as f32 * spacing,
        )
    }
}

impl std::fmt::Display for GridPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Board dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub width: i32,
    pub height: i32,
}

impl GridSize {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Check if position lies on the board
    pub fn contains(self, pos: GridPosition) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Total number of cells
    pub fn cell_count(self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }

    /// Iterate every position, column by column from the bottom row up.
    pub fn positions(self) -> impl Iterator<Item = GridPosition> {
        (0..self.width).flat_map(move |x| (0..self.height).map(move |y| GridPosition::new(x, y)))
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

/// Identity of a gem type within the configured palette.
///
/// Kinds compare by index only; what a kind looks like is up to the
/// presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GemKind(u8);

impl GemKind {
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    pub const fn index(self) -> u8 {
        self.0
    }
}

/// Presentation-space coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// What a piece is currently doing on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementState {
    #[default]
    Idle,
    Falling,
    Swapping,
}

impl MovementState {
    pub fn is_moving(self) -> bool {
        !matches!(self, MovementState::Idle)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MovementState::Idle => "idle",
            MovementState::Falling => "falling",
            MovementState::Swapping => "swapping",
        }
    }
}
