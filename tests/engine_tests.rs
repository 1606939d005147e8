//! Match engine integration tests - sessions, cascades and motion handshakes

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;

use gem_swap::core::{MotionToken, PieceHandle, ScriptedKinds};
use gem_swap::engine::{
    EngineConfig, EngineEvent, EventLog, MatchEngine, Phase, PiecePresenter, Resolve, SwapOutcome,
};
use gem_swap::types::{GemKind, GridPosition, Point};

/// 5x5, five kinds: the start board needs no refill, and the first two hints
/// remove three and then four gems without chaining.
const TWO_MOVE_SCRIPT: [u8; 40] = [
    1, 0, 3, 2, 4, 3, 0, 2, 0, 0, 1, 3, 4, 1, 4, 0, 3, 1, 0, 3, 2, 1, 1, 0, 4, 2, 1, 4, 0, 0, 1, 0,
    0, 0, 4, 1, 3, 1, 4, 1,
];

/// 3x3, three kinds: the only hinted swap clears two columns and the refill
/// leaves no legal move.
const DEAD_END_SCRIPT: [u8; 30] = [
    2, 0, 0, 0, 2, 2, 2, 0, 0, 2, 1, 2, 1, 0, 0, 1, 2, 1, 2, 2, 0, 1, 1, 2, 2, 0, 1, 1, 2, 0,
];

fn pos(x: i32, y: i32) -> GridPosition {
    GridPosition::new(x, y)
}

fn config(width: i32, height: i32, palette_size: u8) -> EngineConfig {
    EngineConfig {
        width,
        height,
        palette_size,
        ..EngineConfig::default()
    }
}

fn scripted(config: EngineConfig, script: &[u8]) -> (MatchEngine, EventLog) {
    let mut engine = MatchEngine::new(config)
        .unwrap()
        .with_kind_source(ScriptedKinds::new(script));
    let log = EventLog::new();
    engine.subscribe(log.clone());
    engine.start_session(false);
    (engine, log)
}

fn play_hint(engine: &mut MatchEngine) -> (GridPosition, GridPosition) {
    let (a, b) = engine.hint().expect("board should have a legal move");
    assert_eq!(engine.request_swap(a, b), SwapOutcome::Accepted);
    engine.settle(1_000);
    (a, b)
}

#[derive(Default)]
struct Recorded {
    placed: Vec<(PieceHandle, GemKind, Point)>,
    motions: Vec<MotionToken>,
    removed: Vec<PieceHandle>,
}

/// Presenter that keeps every notification for later inspection
#[derive(Clone, Default)]
struct RecordingPresenter(Rc<RefCell<Recorded>>);

impl RecordingPresenter {
    fn take_motions(&self) -> Vec<MotionToken> {
        std::mem::take(&mut self.0.borrow_mut().motions)
    }
}

impl PiecePresenter for RecordingPresenter {
    fn piece_placed(&mut self, handle: PieceHandle, kind: GemKind, start: Point) {
        self.0.borrow_mut().placed.push((handle, kind, start));
    }

    fn fall_started(&mut self, token: MotionToken, _to: GridPosition, _target: Point) {
        self.0.borrow_mut().motions.push(token);
    }

    fn swap_started(&mut self, token: MotionToken, _to: GridPosition, _target: Point) {
        self.0.borrow_mut().motions.push(token);
    }

    fn piece_removed(&mut self, handle: PieceHandle) {
        self.0.borrow_mut().removed.push(handle);
    }
}

#[test]
fn test_start_session_yields_playable_board_for_many_seeds() {
    for seed in 0..40 {
        let mut engine = MatchEngine::new(EngineConfig {
            seed,
            ..config(6, 6, 4)
        })
        .unwrap();
        engine.start_session(false);

        assert_eq!(engine.phase(), Phase::Idle);
        assert!(engine.snapshot().is_full(), "seed {seed}");
        assert!(!engine.grid().any_matches(), "seed {seed}");
        assert!(engine.hint().is_some(), "seed {seed}");
        assert_eq!(engine.pool().active_count(), 36);
    }
}

#[test]
fn test_same_seed_same_board() {
    let start = |seed| {
        let mut engine = MatchEngine::new(EngineConfig {
            seed,
            ..EngineConfig::default()
        })
        .unwrap();
        engine.start_session(false);
        engine.grid().to_rows()
    };
    assert_eq!(start(7), start(7));
}

#[test]
fn test_swap_cascade_settles_without_matches() {
    let (mut engine, log) = scripted(config(5, 5, 5), &TWO_MOVE_SCRIPT);
    assert_eq!(
        engine.grid().to_rows(),
        vec!["EAEDE", "CABAA", "DCEBB", "AADDB", "BDBAC"]
    );

    let swap = play_hint(&mut engine);
    assert_eq!(swap, (pos(1, 0), pos(1, 1)));

    assert_eq!(engine.phase(), Phase::Idle);
    assert!(!engine.grid().any_matches());
    assert_eq!(log.gems_removed(), 3);
    assert_eq!(
        engine.grid().to_rows(),
        vec!["ECBEE", "CAEDA", "DABAB", "ACEBB", "BABAC"]
    );
}

#[test]
fn test_score_accumulates_across_removals() {
    let (mut engine, log) = scripted(
        EngineConfig {
            level_curve: vec![20, 40, 60],
            ..config(5, 5, 5)
        },
        &TWO_MOVE_SCRIPT,
    );

    play_hint(&mut engine);
    assert_eq!(engine.score(), 30);
    assert_eq!(engine.level(), 2);

    let second = play_hint(&mut engine);
    assert_eq!(second, (pos(0, 1), pos(1, 1)));
    assert_eq!(engine.score(), 70);
    assert_eq!(log.gems_removed(), 7);

    // 70 crosses both 40 and 60 in one removal
    assert_eq!(engine.level(), 4);
    let levels: Vec<u32> = log
        .events()
        .into_iter()
        .filter_map(|e| match e {
            EngineEvent::LevelChanged { level } => Some(level),
            _ => None,
        })
        .collect();
    assert_eq!(levels, vec![2, 3, 4]);

    // Level 4 spans 60..80 by repeating the last step of the curve
    assert_eq!(engine.session().threshold(), 80);
    assert_eq!(engine.session().points_percentage(), 0.5);
}

#[test]
fn test_removal_events_are_ordered() {
    let (mut engine, log) = scripted(
        EngineConfig {
            level_curve: vec![20, 40, 60],
            ..config(5, 5, 5)
        },
        &TWO_MOVE_SCRIPT,
    );
    log.drain();

    let (a, b) = play_hint(&mut engine);
    let names: Vec<&str> = log.events().iter().map(|e| e.name()).collect();
    assert_eq!(
        names,
        vec![
            "swap_accepted",
            "gems_removed",
            "level_changed",
            "points_percentage_changed",
        ]
    );
    assert_eq!(log.events()[0], EngineEvent::SwapAccepted { from: a, to: b });
}

#[test]
fn test_dead_board_after_cascade_ends_session() {
    let (mut engine, log) = scripted(config(3, 3, 3), &DEAD_END_SCRIPT);
    assert_eq!(engine.grid().to_rows(), vec!["ACA", "ACA", "CAC"]);
    log.drain();

    play_hint(&mut engine);

    assert!(engine.is_over());
    assert_eq!(engine.phase(), Phase::GameOver);
    assert_eq!(engine.score(), 60);
    assert_eq!(engine.pool().active_count(), 0);
    assert_eq!(engine.snapshot().occupied_count(), 0);

    let events = log.events();
    assert_eq!(events[1], EngineEvent::GemsRemoved { count: 6 });
    assert_eq!(
        events.last(),
        Some(&EngineEvent::GameOver {
            level: 1,
            score: 60
        })
    );
    assert_eq!(log.count("game_over"), 1);

    // Further input is refused quietly
    assert_eq!(
        engine.request_swap(pos(0, 0), pos(1, 0)),
        SwapOutcome::GameOver
    );
    assert!(!engine.advance());
    assert_eq!(log.count("swap_rejected"), 0);
}

#[test]
fn test_end_session_twice_publishes_once() {
    let (mut engine, log) = scripted(config(5, 5, 5), &TWO_MOVE_SCRIPT);
    engine.end_session();
    engine.end_session();
    assert_eq!(log.count("game_over"), 1);
    assert!(engine.session().is_over());
}

#[test]
fn test_illegal_swap_is_rejected_with_event() {
    let (mut engine, log) = scripted(config(5, 5, 5), &TWO_MOVE_SCRIPT);
    let before = engine.grid().to_rows();

    assert_eq!(
        engine.request_swap(pos(0, 0), pos(1, 1)),
        SwapOutcome::Rejected
    );
    assert_eq!(
        engine.request_swap(pos(4, 4), pos(5, 4)),
        SwapOutcome::Rejected
    );
    assert_eq!(engine.grid().to_rows(), before);
    assert_eq!(log.count("swap_rejected"), 2);
    assert_eq!(engine.phase(), Phase::Idle);
}

#[test]
fn test_swap_during_cascade_is_busy() {
    let (mut engine, log) = scripted(config(5, 5, 5), &TWO_MOVE_SCRIPT);
    engine.complete_all_motions();
    let (a, b) = engine.hint().unwrap();
    assert_eq!(engine.request_swap(a, b), SwapOutcome::Accepted);

    assert_eq!(engine.request_swap(a, b), SwapOutcome::Busy);
    assert_eq!(log.count("swap_accepted"), 1);
    assert_eq!(log.count("swap_rejected"), 0);
}

#[test]
fn test_cascade_waits_for_every_motion_token() {
    let presenter = RecordingPresenter::default();
    let mut engine = MatchEngine::new(config(5, 5, 5))
        .unwrap()
        .with_kind_source(ScriptedKinds::new(TWO_MOVE_SCRIPT))
        .with_presenter(presenter.clone());
    engine.start_session(false);

    let fills = presenter.take_motions();
    assert_eq!(fills.len(), 25);
    assert_eq!(presenter.0.borrow().placed.len(), 25);
    for token in &fills {
        assert!(engine.complete_motion(*token));
    }
    assert!(!engine.any_piece_moving());

    let (a, b) = engine.hint().unwrap();
    engine.request_swap(a, b);
    let swaps = presenter.take_motions();
    assert_eq!(swaps.len(), 2);

    // One half of the swap still animating blocks the pass
    assert!(engine.complete_motion(swaps[0]));
    assert!(!engine.advance());
    assert_eq!(engine.phase(), Phase::Resolving(Resolve::Checking));

    assert!(engine.complete_motion(swaps[1]));
    assert!(engine.advance());
    assert_eq!(engine.phase(), Phase::Resolving(Resolve::Falling));
    assert_eq!(presenter.0.borrow().removed.len(), 3);

    // Falls and refills are in flight; the cascade holds until they land
    let falls = presenter.take_motions();
    assert!(!falls.is_empty());
    assert_eq!(engine.in_flight_motions().len(), falls.len());
    assert!(!engine.advance());
    for token in &falls {
        assert!(engine.complete_motion(*token));
    }
    assert!(engine.advance());
    assert_eq!(engine.phase(), Phase::Idle);
}

#[test]
fn test_replaced_motion_token_does_not_release_swap() {
    let presenter = RecordingPresenter::default();
    let mut engine = MatchEngine::new(config(5, 5, 5))
        .unwrap()
        .with_kind_source(ScriptedKinds::new(TWO_MOVE_SCRIPT))
        .with_presenter(presenter.clone());
    engine.start_session(false);
    let fills = presenter.take_motions();
    assert_eq!(fills.len(), 25);

    // Swap while the drop-in falls are still animating
    let (a, b) = engine.hint().unwrap();
    assert_eq!(engine.request_swap(a, b), SwapOutcome::Accepted);
    let swaps = presenter.take_motions();
    assert_eq!(swaps.len(), 2);

    // The swapped pieces' fall tokens were replaced and no longer count
    for token in &fills {
        let replaced = swaps.iter().any(|s| s.handle == token.handle);
        assert_eq!(engine.complete_motion(*token), !replaced);
    }
    assert!(engine.any_piece_moving());
    assert_eq!(engine.in_flight_motions().len(), 2);
    assert!(!engine.advance());
    assert_eq!(engine.phase(), Phase::Resolving(Resolve::Checking));
    assert_eq!(presenter.0.borrow().removed.len(), 0);

    for token in &swaps {
        assert!(engine.complete_motion(*token));
    }
    assert!(engine.advance());
    assert_eq!(engine.phase(), Phase::Resolving(Resolve::Falling));
    assert_eq!(presenter.0.borrow().removed.len(), 3);
}

#[test]
fn test_refill_spawns_one_board_height_up() {
    let presenter = RecordingPresenter::default();
    let mut engine = MatchEngine::new(EngineConfig {
        origin: Point::new(10.0, 0.0),
        spacing: 2.0,
        ..config(5, 5, 5)
    })
    .unwrap()
    .with_kind_source(ScriptedKinds::new(TWO_MOVE_SCRIPT))
    .with_presenter(presenter.clone());
    engine.start_session(false);

    let recorded = presenter.0.borrow();
    // First placement is cell (0,0), spawned at (0,5) in grid units
    assert_eq!(recorded.placed[0].2, Point::new(10.0, 10.0));
    assert_eq!(engine.to_world_position(pos(1, 1)), Point::new(12.0, 2.0));
    for p in engine.grid_size().positions() {
        assert_eq!(engine.to_world_position(p), engine.grid().to_world_position(p));
    }
}

#[test]
fn test_stale_tokens_are_ignored_after_restart() {
    let presenter = RecordingPresenter::default();
    let mut engine = MatchEngine::new(config(5, 5, 5))
        .unwrap()
        .with_presenter(presenter.clone());
    engine.start_session(false);
    let old = presenter.take_motions();

    engine.start_session(true);
    assert_eq!(engine.pool().capacity(), 25);
    for token in old {
        assert!(!engine.complete_motion(token));
    }
    assert!(engine.any_piece_moving());

    for token in presenter.take_motions() {
        engine.complete_motion(token);
    }
    assert!(!engine.any_piece_moving());
}

#[test]
fn test_restart_resets_score_and_publishes() {
    let (mut engine, log) = scripted(config(5, 5, 5), &TWO_MOVE_SCRIPT);
    play_hint(&mut engine);
    assert!(engine.score() > 0);

    engine.end_session();
    engine.start_session(true);

    assert_eq!(engine.score(), 0);
    assert_eq!(engine.level(), 1);
    assert_eq!(engine.phase(), Phase::Idle);
    assert_eq!(
        log.events().last(),
        Some(&EngineEvent::SessionStarted {
            reused_pieces: true
        })
    );
}

#[test]
fn test_events_can_cross_a_channel() {
    let (tx, rx) = mpsc::channel();
    let mut engine = MatchEngine::new(config(5, 5, 5))
        .unwrap()
        .with_kind_source(ScriptedKinds::new(TWO_MOVE_SCRIPT));
    engine.subscribe(tx);
    engine.start_session(false);
    play_hint(&mut engine);

    let received: Vec<EngineEvent> = rx.try_iter().collect();
    assert_eq!(
        received.first(),
        Some(&EngineEvent::SessionStarted {
            reused_pieces: false
        })
    );
    assert!(received.contains(&EngineEvent::GemsRemoved { count: 3 }));
}

#[test]
fn test_autoplay_keeps_pool_and_grid_in_step() {
    let mut engine = MatchEngine::new(EngineConfig {
        seed: 99,
        ..EngineConfig::default()
    })
    .unwrap();
    engine.start_session(false);

    for _ in 0..30 {
        if engine.is_over() {
            break;
        }
        play_hint(&mut engine);
        assert!(!engine.is_resolving());
        if engine.is_over() {
            assert_eq!(engine.pool().active_count(), 0);
            break;
        }
        assert!(!engine.grid().any_matches());
        assert_eq!(engine.pool().active_count(), 64);
        for (p, gem) in engine.grid().occupied() {
            assert_eq!(engine.piece(gem.handle).position, p);
        }
    }
}
