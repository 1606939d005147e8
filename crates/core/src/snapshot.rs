use serde::Serialize;

use crate::grid::Grid;
use crate::scoring::Session;

/// Serializable view of a board and its session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BoardSnapshot {
    pub width: i32,
    pub height: i32,
    /// Kind index per cell, row-major with row 0 at the bottom; `None` is empty
    pub cells: Vec<Option<u8>>,
    pub score: u32,
    pub level: u32,
    pub is_over: bool,
}

impl BoardSnapshot {
    pub fn capture(grid: &Grid, session: &Session) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            cells: grid
                .cells()
                .iter()
                .map(|cell| cell.map(|gem| gem.kind.index()))
                .collect(),
            score: session.score(),
            level: session.level(),
            is_over: session.is_over(),
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }
}
