//! Replay driver CLI.
//!
//! Grounded on `original_source/Driver.cpp`'s `main`: parse args, load
//! traces, build the graph and cache manager, replay, report (SPEC_FULL.md
//! §4.11). Argument parsing uses `clap`'s derive API since the teacher crate
//! is a library with no CLI of its own.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use predictive_cache_sim::constants::BLOCK_SIZE;
use predictive_cache_sim::graph::ProbabilityGraph;
use predictive_cache_sim::manager::CacheManager;
use predictive_cache_sim::router::{FsSimulator, PrintSink};
use predictive_cache_sim::trace::{parse_trace, TraceFormat};
use predictive_cache_sim::{Result, SimError};

/// Replay a recorded syscall trace through a predictive file-system cache.
#[derive(Parser, Debug)]
#[command(name = "driver", about = "Offline predictive-cache replay simulator")]
struct Args {
    /// Trace file to replay.
    test_trace: PathBuf,

    /// Cache size, in bytes.
    cache_bytes: u64,

    /// Minimum association strength (0.0-1.0) required to admit a prefetch.
    min_chance: f64,

    /// Lookahead window, in microseconds, used for graph mining.
    lookahead_us: u64,

    /// `[TRAIN_TRACE] PREFETCH` — clap can't express an optional positional
    /// ahead of a required one, so this tail is parsed by hand in `run`.
    #[arg(num_args = 1..=2)]
    rest: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    match run() {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(%err, "run failed");
            eprintln!("error: {err}");
            eprintln!(
                "usage: driver TEST_TRACE CACHE_BYTES MIN_CHANCE LOOKAHEAD_US [TRAIN_TRACE] PREFETCH"
            );
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<predictive_cache_sim::RunSummary> {
    // `rest`'s num_args(1..=2) already gives clap a floor of 5 required
    // positional arguments, so it rejects a short invocation on its own
    // (and handles --help/--version) without a hand-rolled count check
    // ahead of parsing. `e.exit()` prints clap's own message and picks the
    // right exit code for both cases.
    let args = Args::try_parse().unwrap_or_else(|e| e.exit());
    let (train_trace, prefetch_token) = match args.rest.as_slice() {
        [prefetch] => (None, prefetch.clone()),
        [train, prefetch] => (Some(PathBuf::from(train)), prefetch.clone()),
        _ => {
            return Err(SimError::Argument(
                "expected [TRAIN_TRACE] PREFETCH after LOOKAHEAD_US".to_string(),
            ))
        }
    };
    let prefetch = parse_bool(&prefetch_token)?;

    let total_pages = (args.cache_bytes / BLOCK_SIZE).max(1) as usize;

    let mut manager = CacheManager::new(total_pages, args.min_chance, args.lookahead_us, prefetch);

    if let Some(train_path) = &train_trace {
        let contents = fs::read_to_string(train_path)?;
        let calls = parse_trace(&contents, detect_format(&contents));
        let mut graph = ProbabilityGraph::new(args.lookahead_us);
        graph.create_nodes(&calls);
        graph.load_associations(&calls);
        manager.set_graph(graph);
    }

    let contents = fs::read_to_string(&args.test_trace)?;
    let calls = parse_trace(&contents, detect_format(&contents));

    let mut sink = PrintSink;
    let mut cache_hits = 0u64;
    let mut cache_misses = 0u64;
    let mut prefetch_hits = 0u64;
    let mut prefetch_misses = 0u64;

    {
        let mut sim = FsSimulator::new(&mut manager);
        for call in &calls {
            sim.send_request(call, &mut sink);
        }
    }

    cache_hits += manager.cache().inner().hits();
    cache_misses += manager.cache().inner().misses();
    prefetch_hits += manager.prefetch_buffer().inner().hits();
    prefetch_misses += manager.prefetch_buffer().inner().misses();

    Ok(predictive_cache_sim::RunSummary {
        calls_replayed: calls.len() as u64,
        cache_hits,
        cache_misses,
        prefetch_hits,
        prefetch_misses,
        final_cache_hit_ratio: manager.cache().inner().last_hit_ratio(),
        final_prefetch_hit_ratio: manager.prefetch_buffer().inner().last_hit_ratio(),
    })
}

fn parse_bool(token: &str) -> Result<bool> {
    match token {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(SimError::Argument(format!(
            "PREFETCH must be \"true\" or \"false\", got {other:?}"
        ))),
    }
}

/// `strace -tt` lines start with an `HH:MM:SS.ffffff` token; "seers" lines
/// don't, so a cheap heuristic on the first line tells them apart.
fn detect_format(contents: &str) -> TraceFormat {
    let first_line = contents.lines().next().unwrap_or("");
    let looks_like_strace = first_line
        .split_whitespace()
        .next()
        .map(|tok| tok.splitn(2, ':').count() == 2 || tok.contains(':'))
        .unwrap_or(false);
    if looks_like_strace {
        TraceFormat::Strace
    } else {
        TraceFormat::Seers
    }
}
