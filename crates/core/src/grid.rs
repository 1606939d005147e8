//! Grid module - the board of gem slots
//!
//! The grid is a `width x height` array of optional gems stored row-major in a
//! flat `Vec` (`y * width + x`). Row 0 is the bottom row.
//!
//! The grid knows nothing about scoring, timing or presentation. It owns the
//! pure spatial rules: line detection, swap legality and gravity targets.
//!
//! Every position-taking mutator and `get` treats an out-of-bounds position as
//! caller misuse and panics. `can_swap` is the exception: it answers `false`
//! for positions off the board, since it is used to look at neighbours at the
//! edges.

use arrayvec::ArrayVec;

use crate::pool::PieceHandle;
use crate::types::{GemKind, GridPosition, GridSize, Point, MIN_LINE_LENGTH};

/// Board cell contents: which piece sits there and what kind it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Gem {
    pub handle: PieceHandle,
    pub kind: GemKind,
}

impl Gem {
    pub fn new(handle: PieceHandle, kind: GemKind) -> Self {
        Self { handle, kind }
    }
}

/// A single cell; `None` is empty
pub type Cell = Option<Gem>;

/// The game board
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    size: GridSize,
    origin: Point,
    spacing: f32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an empty grid whose cell `(0, 0)` maps to `origin` in world space.
    pub fn new(size: GridSize, origin: Point, spacing: f32) -> Self {
        assert!(
            size.width > 0 && size.height > 0,
            "grid dimensions must be positive, got {}x{}",
            size.width,
            size.height
        );
        Self {
            size,
            origin,
            spacing,
            cells: vec![None; size.cell_count()],
        }
    }

    /// Build a grid from text rows, top row first.
    ///
    /// Letters map to kinds (`A` = 0, `B` = 1, ...), `.` is an empty cell.
    /// Handles are assigned in reading order. Intended for fixtures in tests
    /// and benchmarks.
    ///
    /// ```
    /// use gem_swap_core::Grid;
    /// use gem_swap_core::types::GridPosition;
    ///
    /// let grid = Grid::from_rows(&[
    ///     "B..",
    ///     "AAA",
    /// ]);
    /// assert!(grid.is_part_of_match(GridPosition::new(1, 0)));
    /// assert!(!grid.is_part_of_match(GridPosition::new(0, 1)));
    /// ```
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as i32;
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0) as i32;
        let mut grid = Self::new(GridSize::new(width, height), Point::default(), 1.0);
        let mut next_handle = 0u32;

        for (row, line) in rows.iter().enumerate() {
            assert_eq!(
                line.chars().count() as i32,
                width,
                "row {} has a different width",
                row
            );
            let y = height - 1 - row as i32;
            for (x, ch) in line.chars().enumerate() {
                if ch == '.' {
                    continue;
                }
                assert!(ch.is_ascii_uppercase(), "unexpected cell {:?}", ch);
                let kind = GemKind::new(ch as u8 - b'A');
                grid.place(
                    Gem::new(PieceHandle::new(next_handle), kind),
                    GridPosition::new(x as i32, y),
                );
                next_handle += 1;
            }
        }

        grid
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn width(&self) -> i32 {
        self.size.width
    }

    pub fn height(&self) -> i32 {
        self.size.height
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Check if position lies on the board
    pub fn contains(&self, pos: GridPosition) -> bool {
        self.size.contains(pos)
    }

    /// Flat index for an in-bounds position
    #[inline(always)]
    fn index(&self, pos: GridPosition) -> Option<usize> {
        if !self.contains(pos) {
            return None;
        }
        Some((pos.y as usize) * (self.size.width as usize) + (pos.x as usize))
    }

    #[inline(always)]
    fn index_or_panic(&self, pos: GridPosition) -> usize {
        match self.index(pos) {
            Some(idx) => idx,
            None => panic!(
                "position {} is outside the {}x{} grid",
                pos, self.size.width, self.size.height
            ),
        }
    }

    /// Map grid coordinates to presentation coordinates.
    ///
    /// Not bounds-checked: positions above the board are used as spawn points
    /// for pieces dropping in.
    pub fn to_world_position(&self, pos: GridPosition) -> Point {
        pos.to_world(self.origin, self.spacing)
    }

    /// Put `gem` into the cell, replacing whatever was there
    pub fn place(&mut self, gem: Gem, pos: GridPosition) {
        let idx = self.index_or_panic(pos);
        self.cells[idx] = Some(gem);
    }

    pub fn get(&self, pos: GridPosition) -> Cell {
        self.cells[self.index_or_panic(pos)]
    }

    pub fn is_occupied(&self, pos: GridPosition) -> bool {
        self.get(pos).is_some()
    }

    /// Empty the cell, returning its previous contents
    pub fn remove(&mut self, pos: GridPosition) -> Cell {
        let idx = self.index_or_panic(pos);
        self.cells[idx].take()
    }

    pub fn remove_all(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }

    /// Exchange the contents of two cells unconditionally
    pub fn swap(&mut self, a: GridPosition, b: GridPosition) {
        let ia = self.index_or_panic(a);
        let ib = self.index_or_panic(b);
        self.cells.swap(ia, ib);
    }

    /// Same-kind gems adjacent to `pos` walking in direction `(dx, dy)`,
    /// not counting `pos` itself.
    fn run_length(&self, kind: GemKind, pos: GridPosition, dx: i32, dy: i32) -> usize {
        let mut count = 0;
        let mut cursor = pos.offset(dx, dy);
        while let Some(idx) = self.index(cursor) {
            match self.cells[idx] {
                Some(gem) if gem.kind == kind => count += 1,
                _ => break,
            }
            cursor = cursor.offset(dx, dy);
        }
        count
    }

    /// Length of the line through `pos` along one axis, including `pos`.
    fn line_length(&self, kind: GemKind, pos: GridPosition, dx: i32, dy: i32) -> usize {
        1 + self.run_length(kind, pos, dx, dy) + self.run_length(kind, pos, -dx, -dy)
    }

    /// True if the gem at `pos` is part of a horizontal or vertical run of at
    /// least three same-kind gems. Axes are checked independently.
    pub fn is_part_of_match(&self, pos: GridPosition) -> bool {
        let Some(gem) = self.get(pos) else {
            return false;
        };
        self.line_length(gem.kind, pos, 1, 0) >= MIN_LINE_LENGTH
            || self.line_length(gem.kind, pos, 0, 1) >= MIN_LINE_LENGTH
    }

    /// Would swapping `a` and `b` produce a match at either cell?
    ///
    /// False for off-board or non-adjacent pairs. Otherwise the swap is
    /// performed, both cells are checked with [`Grid::is_part_of_match`] and
    /// the swap is undone, so the hypothetical and the real result always
    /// agree. The board is unchanged on return.
    pub fn can_swap(&mut self, a: GridPosition, b: GridPosition) -> bool {
        if !self.contains(a) || !self.contains(b) || !a.is_adjacent(b) {
            return false;
        }

        self.swap(a, b);
        let matched = self.is_part_of_match(a) || self.is_part_of_match(b);
        self.swap(a, b);

        matched
    }

    /// Where the content of `pos` would land if it fell straight down.
    ///
    /// `None` at row 0 or when the cell directly below is occupied; otherwise
    /// the lowest cell of the empty run below `pos`.
    pub fn find_fall_target(&self, pos: GridPosition) -> Option<GridPosition> {
        let mut target = pos.offset(0, -1);
        if pos.y == 0 || self.is_occupied(target) {
            return None;
        }

        while target.y > 0 && !self.is_occupied(target.offset(0, -1)) {
            target = target.offset(0, -1);
        }

        Some(target)
    }

    /// Move the gem at `from` to `to`, leaving `from` empty
    pub fn commit_fall(&mut self, from: GridPosition, to: GridPosition) {
        let gem = self.remove(from);
        let idx = self.index_or_panic(to);
        self.cells[idx] = gem;
    }

    /// Any gem on the board currently in a line
    pub fn any_matches(&self) -> bool {
        self.size.positions().any(|pos| self.is_part_of_match(pos))
    }

    /// Every position currently in a line, column by column from the bottom.
    pub fn matched_positions(&self) -> Vec<GridPosition> {
        self.size
            .positions()
            .filter(|&pos| self.is_part_of_match(pos))
            .collect()
    }

    /// Neighbors of `pos` that lie on the board, in left, right, down, up order
    pub fn neighbors_on_board(&self, pos: GridPosition) -> ArrayVec<GridPosition, 4> {
        pos.neighbors()
            .into_iter()
            .filter(|&n| self.contains(n))
            .collect()
    }

    /// First adjacent pair (in column-major scan order, neighbours visited
    /// left, right, down, up) whose swap would create a match.
    pub fn find_possible_swap(&mut self) -> Option<(GridPosition, GridPosition)> {
        for pos in self.size.positions() {
            for other in self.neighbors_on_board(pos) {
                if self.can_swap(pos, other) {
                    return Some((pos, other));
                }
            }
        }
        None
    }

    /// Is there at least one legal move left? A `false` here means game over.
    pub fn any_possible_matches(&mut self) -> bool {
        self.find_possible_swap().is_some()
    }

    /// Positions of every occupied cell with its gem
    pub fn occupied(&self) -> impl Iterator<Item = (GridPosition, Gem)> + '_ {
        self.size
            .positions()
            .filter_map(move |pos| self.get(pos).map(|gem| (pos, gem)))
    }

    /// Get a reference to the internal cells (row-major, bottom row first)
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Render as text rows, top row first, in the format of [`Grid::from_rows`].
    pub fn to_rows(&self) -> Vec<String> {
        (0..self.size.height)
            .rev()
            .map(|y| {
                (0..self.size.width)
                    .map(|x| match self.get(GridPosition::new(x, y)) {
                        Some(gem) => (b'A' + gem.kind.index()) as char,
                        None => '.',
                    })
                    .collect()
            })
            .collect()
    }
}
