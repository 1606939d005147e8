//! Board cursor and two-step swap selection.
//!
//! Independent of any input device. A front end maps its keys or clicks onto
//! `move_by` / `toggle` and forwards whatever `confirm` yields to
//! [`MatchEngine::request_swap`](crate::MatchEngine::request_swap).

use crate::types::{GridPosition, GridSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapCursor {
    size: GridSize,
    position: GridPosition,
    selected: Option<GridPosition>,
}

impl SwapCursor {
    pub fn new(size: GridSize) -> Self {
        assert!(
            size.width > 0 && size.height > 0,
            "cursor needs a non-empty board, got {}x{}",
            size.width,
            size.height
        );
        Self {
            size,
            position: GridPosition::default(),
            selected: None,
        }
    }

    pub fn position(&self) -> GridPosition {
        self.position
    }

    /// The first half of a pending swap
    pub fn selected(&self) -> Option<GridPosition> {
        self.selected
    }

    pub fn is_selecting(&self) -> bool {
        self.selected.is_some()
    }

    /// Jump to `pos`, clamped onto the board
    pub fn move_to(&mut self, pos: GridPosition) {
        self.position = GridPosition::new(
            pos.x.clamp(0, self.size.width - 1),
            pos.y.clamp(0, self.size.height - 1),
        );
    }

    /// Step by `(dx, dy)`; stops at the board edge. Returns true if the cursor moved.
    pub fn move_by(&mut self, dx: i32, dy: i32) -> bool {
        let before = self.position;
        self.move_to(before.offset(dx, dy));
        self.position != before
    }

    /// Mark the cursor cell as the first half of a swap
    pub fn select(&mut self) {
        self.selected = Some(self.position);
    }

    pub fn cancel(&mut self) {
        self.selected = None;
    }

    /// Finish a pending selection. Yields `(selected, cursor)` and clears the
    /// selection; confirming on the selected cell itself just deselects.
    pub fn confirm(&mut self) -> Option<(GridPosition, GridPosition)> {
        let from = self.selected.take()?;
        (from != self.position).then_some((from, self.position))
    }

    /// Select when idle, confirm when a selection is pending
    pub fn toggle(&mut self) -> Option<(GridPosition, GridPosition)> {
        if self.is_selecting() {
            self.confirm()
        } else {
            self.select();
            None
        }
    }

    /// Back to (0,0) with nothing selected
    pub fn reset(&mut self) {
        self.position = GridPosition::default();
        self.selected = None;
    }
}
