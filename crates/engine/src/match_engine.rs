//! Match engine - the session controller
//!
//! Owns the grid, the piece pool and the score state of one play session, and
//! drives the cascade:
//!
//! ```text
//! Idle --request_swap--> Resolving(Checking)
//! Resolving(Checking) --advance, motion settled, matches--> remove, fall, refill --> Resolving(Falling)
//! Resolving(Falling) --advance, motion settled--> Resolving(Checking)
//! Resolving(Checking) --advance, no matches--> Idle
//! Resolving(*) --advance, no legal swap left--> GameOver
//! ```
//!
//! Nothing blocks. Waiting for animations is a series of `advance()` calls
//! that return `false` until the presentation layer has returned every
//! [`MotionToken`] through [`MatchEngine::complete_motion`].

use log::{debug, info};

use crate::config::{ConfigError, EngineConfig};
use crate::core::{
    BoardSnapshot, Gem, Grid, KindSource, LevelCurve, MotionToken, Piece, PieceHandle, PiecePool,
    SeededKinds, Session,
};
use crate::events::{EngineEvent, EventSink};
use crate::presenter::{NullPresenter, PiecePresenter};
use crate::types::{GridPosition, GridSize, MovementState, Point};

const NOT_STARTED: &str = "match engine used before start_session";

/// Where a cascade currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolve {
    /// Disarmed: waiting for falls and refills to land
    Falling,
    /// Armed: the next `advance` with no motion in flight runs a pass
    Checking,
}

/// Engine lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Unstarted,
    Idle,
    Resolving(Resolve),
    GameOver,
}

/// Result of [`MatchEngine::request_swap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapOutcome {
    /// Swap committed; a cascade is armed
    Accepted,
    /// Not adjacent, off the board, or would not create a match
    Rejected,
    /// A cascade is still running
    Busy,
    /// The session has ended
    GameOver,
}

pub struct MatchEngine {
    config: EngineConfig,
    curve: LevelCurve,
    grid: Option<Grid>,
    pool: PiecePool,
    session: Session,
    phase: Phase,
    kinds: Box<dyn KindSource>,
    presenter: Box<dyn PiecePresenter>,
    sinks: Vec<Box<dyn EventSink>>,
}

impl std::fmt::Debug for MatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchEngine")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("session", &self.session)
            .field("active_pieces", &self.pool.active_count())
            .field("sinks", &self.sinks.len())
            .finish_non_exhaustive()
    }
}

impl MatchEngine {
    /// Build an engine drawing kinds from `SeededKinds::new(config.seed)`.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let curve = config.curve();
        let session = Session::new(&curve);
        let kinds = Box::new(SeededKinds::new(config.seed));

        Ok(Self {
            curve,
            grid: None,
            pool: PiecePool::with_capacity(config.grid_size().cell_count()),
            session,
            phase: Phase::Unstarted,
            kinds,
            presenter: Box::new(NullPresenter),
            sinks: Vec::new(),
            config,
        })
    }

    /// Replace the kind source (e.g. a scripted one in tests)
    pub fn with_kind_source(mut self, kinds: impl KindSource + 'static) -> Self {
        self.kinds = Box::new(kinds);
        self
    }

    pub fn with_presenter(mut self, presenter: impl PiecePresenter + 'static) -> Self {
        self.presenter = Box::new(presenter);
        self
    }

    /// Register a listener. Register before `start_session` to see every event.
    pub fn subscribe(&mut self, sink: impl EventSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    fn emit(&mut self, event: EngineEvent) {
        for sink in &mut self.sinks {
            sink.publish(&event);
        }
    }

    // ---- queries ----

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grid_size(&self) -> GridSize {
        self.config.grid_size()
    }

    pub fn to_world_position(&self, pos: GridPosition) -> Point {
        self.config.to_world_position(pos)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_started(&self) -> bool {
        self.phase != Phase::Unstarted
    }

    /// True while a swap's cascade has not yet gone quiet
    pub fn is_resolving(&self) -> bool {
        matches!(self.phase, Phase::Resolving(_))
    }

    pub fn is_over(&self) -> bool {
        self.session.is_over()
    }

    pub fn score(&self) -> u32 {
        self.session.score()
    }

    pub fn level(&self) -> u32 {
        self.session.level()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn grid(&self) -> &Grid {
        self.grid.as_ref().expect(NOT_STARTED)
    }

    fn grid_mut(&mut self) -> &mut Grid {
        self.grid.as_mut().expect(NOT_STARTED)
    }

    pub fn pool(&self) -> &PiecePool {
        &self.pool
    }

    pub fn piece(&self, handle: PieceHandle) -> &Piece {
        self.pool.get(handle)
    }

    pub fn any_piece_moving(&self) -> bool {
        self.pool.any_moving()
    }

    /// Tokens for every fall or swap not yet reported finished
    pub fn in_flight_motions(&self) -> Vec<MotionToken> {
        self.pool.in_flight().collect()
    }

    /// Would this swap be accepted right now (ignoring cascade state)?
    pub fn can_swap(&mut self, a: GridPosition, b: GridPosition) -> bool {
        self.grid_mut().can_swap(a, b)
    }

    /// A swap that would create a match, if any exists
    pub fn hint(&mut self) -> Option<(GridPosition, GridPosition)> {
        self.grid_mut().find_possible_swap()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::capture(self.grid(), &self.session)
    }

    // ---- commands ----

    /// Begin a new session.
    ///
    /// With `reuse_existing_pieces` the previous grid and pool are kept and
    /// their pieces recycled; otherwise both are rebuilt. Every cell is then
    /// filled with pieces dropping in from above, and the fill is redone
    /// until the board has no ready-made match and at least one legal swap.
    pub fn start_session(&mut self, reuse_existing_pieces: bool) {
        self.clear_board();
        self.session = Session::new(&self.curve);

        let reused = reuse_existing_pieces && self.grid.is_some();
        if !reused {
            let size = self.config.grid_size();
            self.grid = Some(Grid::new(size, self.config.origin, self.config.spacing));
            self.pool = PiecePool::with_capacity(size.cell_count());
        }

        self.drop_in_new_pieces();
        let mut reshuffles = 0u32;
        while self.grid().any_matches() || !self.grid_mut().any_possible_matches() {
            self.clear_board();
            self.drop_in_new_pieces();
            reshuffles += 1;
        }
        if reshuffles > 0 {
            debug!("initial board refilled {} times", reshuffles);
        }

        self.phase = Phase::Idle;
        info!(
            "session started on {}x{} board (reused pieces: {})",
            self.config.width, self.config.height, reused
        );
        self.emit(EngineEvent::SessionStarted {
            reused_pieces: reused,
        });
    }

    /// Ask to swap two cells.
    ///
    /// Legal swaps are committed to the grid at once, both pieces start their
    /// swap motion and the cascade is armed. Illegal ones publish
    /// `SwapRejected` and leave the board alone. While a cascade runs or after
    /// game over, requests are refused without an event.
    pub fn request_swap(&mut self, a: GridPosition, b: GridPosition) -> SwapOutcome {
        match self.phase {
            Phase::Unstarted => panic!("{}", NOT_STARTED),
            Phase::GameOver => return SwapOutcome::GameOver,
            Phase::Resolving(_) => {
                debug!("swap {} <-> {} refused: cascade in progress", a, b);
                return SwapOutcome::Busy;
            }
            Phase::Idle => {}
        }

        let grid = self.grid.as_mut().expect(NOT_STARTED);
        if !grid.can_swap(a, b) {
            self.emit(EngineEvent::SwapRejected { from: a, to: b });
            return SwapOutcome::Rejected;
        }

        grid.swap(a, b);
        for pos in [a, b] {
            let Some(gem) = grid.get(pos) else {
                continue;
            };
            self.pool.get_mut(gem.handle).position = pos;
            let token = self.pool.start_motion(gem.handle, MovementState::Swapping);
            self.presenter
                .swap_started(token, pos, grid.to_world_position(pos));
        }

        self.phase = Phase::Resolving(Resolve::Checking);
        self.emit(EngineEvent::SwapAccepted { from: a, to: b });
        SwapOutcome::Accepted
    }

    /// One step of the cascade. Returns true if anything changed.
    ///
    /// A no-op unless a cascade is running. When armed, a board with no legal
    /// swap left ends the session before anything else happens; otherwise,
    /// once no piece is moving, one resolution pass runs.
    pub fn advance(&mut self) -> bool {
        match self.phase {
            Phase::Resolving(Resolve::Falling) => {
                if self.pool.any_moving() {
                    return false;
                }
                self.phase = Phase::Resolving(Resolve::Checking);
            }
            Phase::Resolving(Resolve::Checking) => {}
            Phase::Unstarted | Phase::Idle | Phase::GameOver => return false,
        }

        if !self.grid_mut().any_possible_matches() {
            debug!("no legal swap left");
            self.end_session();
            return true;
        }

        if self.pool.any_moving() {
            return false;
        }

        self.resolve_matches();
        true
    }

    /// Report a finished animation. Returns false for stale or repeated tokens.
    pub fn complete_motion(&mut self, token: MotionToken) -> bool {
        self.pool.complete_motion(token)
    }

    /// Settle every animation at once; returns how many were in flight
    pub fn complete_all_motions(&mut self) -> usize {
        self.pool.complete_all()
    }

    /// Run the cascade to quiescence with every animation finishing
    /// instantly. Stops after `max_steps` advances; returns the number used.
    pub fn settle(&mut self, max_steps: usize) -> usize {
        let mut steps = 0;
        while self.is_resolving() && steps < max_steps {
            self.complete_all_motions();
            self.advance();
            steps += 1;
        }
        steps
    }

    /// End the session: freeze the score, return every piece to the pool and
    /// publish `GameOver`. Calling it again is a no-op.
    pub fn end_session(&mut self) {
        match self.phase {
            Phase::Unstarted => panic!("{}", NOT_STARTED),
            Phase::GameOver => return,
            Phase::Idle | Phase::Resolving(_) => {}
        }

        self.session.finish();
        self.clear_board();
        self.phase = Phase::GameOver;

        let level = self.session.level();
        let score = self.session.score();
        info!("game over at level {} with {} points", level, score);
        self.emit(EngineEvent::GameOver { level, score });
    }

    // ---- cascade internals ----

    /// Remove every matched piece, then drop and refill.
    fn resolve_matches(&mut self) {
        let grid = self.grid.as_mut().expect(NOT_STARTED);
        let matched: Vec<PieceHandle> = self
            .pool
            .active_handles()
            .filter(|&h| grid.is_part_of_match(self.pool.get(h).position))
            .collect();

        if matched.is_empty() {
            debug!("cascade settled");
            self.phase = Phase::Idle;
            return;
        }

        for &handle in &matched {
            let pos = self.pool.get(handle).position;
            debug_assert_eq!(grid.get(pos).map(|g| g.handle), Some(handle));
            grid.remove(pos);
            self.presenter.piece_removed(handle);
            self.pool.release(handle);
        }

        let fallen = self.apply_gravity();
        let refilled = self.drop_in_new_pieces();
        let count = matched.len() as u32;
        debug!(
            "removed {} gems, {} fell, {} dropped in",
            count, fallen, refilled
        );

        self.emit(EngineEvent::GemsRemoved { count });
        let result = self
            .session
            .award(count, self.config.points_per_gem, &self.curve);
        for level in result.new_levels() {
            self.emit(EngineEvent::LevelChanged { level });
        }
        let percentage = self.session.points_percentage();
        self.emit(EngineEvent::PointsPercentageChanged { percentage });

        self.phase = Phase::Resolving(Resolve::Falling);
    }

    /// Let every piece fall into the gaps below it. Grid cells are relinked
    /// immediately; the animation catches up later. Returns pieces moved.
    fn apply_gravity(&mut self) -> usize {
        let grid = self.grid.as_mut().expect(NOT_STARTED);
        let mut fallen = 0;

        for pos in grid.size().positions() {
            let Some(gem) = grid.get(pos) else {
                continue;
            };
            let Some(to) = grid.find_fall_target(pos) else {
                continue;
            };
            grid.commit_fall(pos, to);
            self.pool.get_mut(gem.handle).position = to;
            let token = self.pool.start_motion(gem.handle, MovementState::Falling);
            self.presenter
                .fall_started(token, to, grid.to_world_position(to));
            fallen += 1;
        }

        fallen
    }

    /// Fill every empty cell with a new piece dropping in from one board
    /// height above its cell. Returns pieces placed.
    fn drop_in_new_pieces(&mut self) -> usize {
        let grid = self.grid.as_mut().expect(NOT_STARTED);
        let height = grid.height();
        let mut placed = 0;

        for pos in grid.size().positions() {
            if grid.is_occupied(pos) {
                continue;
            }
            let kind = self.kinds.draw(self.config.palette_size);
            let handle = self.pool.acquire(kind, pos);
            grid.place(Gem::new(handle, kind), pos);

            let start = grid.to_world_position(pos.offset(0, height));
            self.presenter.piece_placed(handle, kind, start);
            let token = self.pool.start_motion(handle, MovementState::Falling);
            self.presenter
                .fall_started(token, pos, grid.to_world_position(pos));
            placed += 1;
        }

        placed
    }

    /// Return every active piece to the pool and empty the grid
    fn clear_board(&mut self) {
        let Some(grid) = self.grid.as_mut() else {
            return;
        };
        for handle in self.pool.active_handles() {
            self.presenter.piece_removed(handle);
        }
        self.pool.release_all();
        grid.remove_all();
    }
}
