//! Headless gem-swap runner (default binary).
//!
//! Plays a session by always taking the first available hint, finishing every
//! animation instantly, and prints the final board. Board and scoring settings
//! come from `GEM_SWAP_*` environment variables; set `RUST_LOG=debug` to watch
//! the cascade.

use anyhow::{bail, Context, Result};
use log::{debug, info};
use pico_args::Arguments;

use gem_swap::engine::{EngineConfig, EngineEvent, EventSink, MatchEngine, SwapOutcome};

const HELP: &str = "\
Play a headless gem-swap session

USAGE:
  gem-swap [OPTIONS]

OPTIONS:
  --moves  N     Swaps to attempt before stopping  [default: 50]
  --seed   N     Kind RNG seed  [default: env GEM_SWAP_SEED or 1]
  --json         Print the final board as JSON instead of rows

FLAGS:
  -h, --help     Print help information
";

/// Upper bound on `advance` calls spent settling one swap
const MAX_SETTLE_STEPS: usize = 10_000;

/// Swaps attempted when `--moves` is not given
const DEFAULT_MOVES: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    moves: u32,
    seed: Option<u64>,
    json: bool,
    help: bool,
}

fn parse_args(mut pargs: Arguments) -> Result<Args> {
    let args = Args {
        help: pargs.contains(["-h", "--help"]),
        json: pargs.contains("--json"),
        moves: pargs
            .opt_value_from_str("--moves")
            .context("invalid --moves value")?
            .unwrap_or(DEFAULT_MOVES),
        seed: pargs
            .opt_value_from_str("--seed")
            .context("invalid --seed value")?,
    };

    let unknown = pargs.finish();
    if !unknown.is_empty() {
        bail!("unknown arguments {unknown:?} (try --help)");
    }
    Ok(args)
}

/// Forwards engine events to the log
struct LogSink;

impl EventSink for LogSink {
    fn publish(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::GemsRemoved { count } => debug!("removed {count} gems"),
            EngineEvent::LevelChanged { level } => info!("reached level {level}"),
            EngineEvent::GameOver { level, score } => {
                info!("game over: level {level}, score {score}")
            }
            other => debug!("{}", other.name()),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let args = parse_args(Arguments::from_env())?;
    if args.help {
        print!("{HELP}");
        return Ok(());
    }

    let mut config = EngineConfig::from_env().context("reading GEM_SWAP_* configuration")?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let mut engine = MatchEngine::new(config).context("invalid engine configuration")?;
    engine.subscribe(LogSink);
    engine.start_session(false);

    let mut played = 0;
    while played < args.moves && !engine.is_over() {
        let Some((a, b)) = engine.hint() else {
            engine.end_session();
            break;
        };
        match engine.request_swap(a, b) {
            SwapOutcome::Accepted => {}
            outcome => bail!("hinted swap {a} <-> {b} was not accepted: {outcome:?}"),
        }
        engine.settle(MAX_SETTLE_STEPS);
        played += 1;
    }

    let snapshot = engine.snapshot();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        for row in engine.grid().to_rows() {
            println!("{row}");
        }
        println!(
            "moves {played}  score {}  level {}{}",
            snapshot.score,
            snapshot.level,
            if snapshot.is_over { "  (game over)" } else { "" }
        );
    }

    Ok(())
}
