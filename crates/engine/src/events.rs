//! Engine events and listener registration
//!
//! The engine reports what happened as [`EngineEvent`] values published to
//! every registered [`EventSink`]. Sinks are pure listeners: nothing they do
//! feeds back into engine state. Sound cues, HUD text and game-over screens
//! all hang off this stream.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;

use crate::types::GridPosition;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    /// A session began; `reused_pieces` is true for a restart that recycled the pool
    SessionStarted { reused_pieces: bool },
    /// A legal swap was committed and the cascade armed
    SwapAccepted { from: GridPosition, to: GridPosition },
    /// The swap would not create a match (or was not between neighbours)
    SwapRejected { from: GridPosition, to: GridPosition },
    /// One resolution pass removed `count` gems
    GemsRemoved { count: u32 },
    /// Emitted once per level gained
    LevelChanged { level: u32 },
    /// Progress through the current level in `[0, 1]`
    PointsPercentageChanged { percentage: f32 },
    GameOver { level: u32, score: u32 },
}

impl EngineEvent {
    /// Short stable name, handy for logs and assertions
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::SessionStarted { .. } => "session_started",
            EngineEvent::SwapAccepted { .. } => "swap_accepted",
            EngineEvent::SwapRejected { .. } => "swap_rejected",
            EngineEvent::GemsRemoved { .. } => "gems_removed",
            EngineEvent::LevelChanged { .. } => "level_changed",
            EngineEvent::PointsPercentageChanged { .. } => "points_percentage_changed",
            EngineEvent::GameOver { .. } => "game_over",
        }
    }
}

/// Receiver of engine events
pub trait EventSink {
    fn publish(&mut self, event: &EngineEvent);
}

impl EventSink for mpsc::Sender<EngineEvent> {
    fn publish(&mut self, event: &EngineEvent) {
        // A dropped receiver just means nobody is listening any more.
        let _ = self.send(*event);
    }
}

/// Shared in-memory event recorder.
///
/// Clones share the same buffer, so one clone can be registered with the
/// engine while another is kept to read what was published.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<EngineEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.borrow().clone()
    }

    /// Take everything recorded so far
    pub fn drain(&self) -> Vec<EngineEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.name() == name)
            .count()
    }

    /// Sum of every `GemsRemoved` count recorded
    pub fn gems_removed(&self) -> u32 {
        self.events
            .borrow()
            .iter()
            .map(|e| match e {
                EngineEvent::GemsRemoved { count } => *count,
                _ => 0,
            })
            .sum()
    }
}

impl EventSink for EventLog {
    fn publish(&mut self, event: &EngineEvent) {
        self.events.borrow_mut().push(*event);
    }
}
