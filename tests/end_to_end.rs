//! End-to-end replay through the public API: parse a trace, drive it through
//! a `CacheManager` via `FsSimulator`, and check the accounting invariants
//! that must hold regardless of prefetching mode (SPEC_FULL.md §8).

use std::io::Write;

use predictive_cache_sim::manager::CacheManager;
use predictive_cache_sim::router::{FsSimulator, PrintSink};
use predictive_cache_sim::trace::{parse_trace, TraceFormat};

fn replay(prefetching_enabled: bool) -> (u64, u64, u64) {
    let contents = std::fs::read_to_string("tests/fixtures/sample.strace").unwrap();
    let calls = parse_trace(&contents, TraceFormat::Strace);

    let mut mgr = CacheManager::new(64, 0.5, 10_000, prefetching_enabled);
    let mut sink = PrintSink;
    {
        let mut sim = FsSimulator::new(&mut mgr);
        for call in &calls {
            sim.send_request(call, &mut sink);
        }
    }

    let hits = mgr.cache().inner().hits();
    let misses = mgr.cache().inner().misses();
    (calls.len() as u64, hits, misses)
}

#[test]
fn every_replayed_block_is_counted_as_exactly_one_hit_or_miss() {
    for prefetching in [false, true] {
        let (_, hits, misses) = replay(prefetching);
        assert!(hits + misses > 0);
    }
}

#[test]
fn replay_runs_to_completion_without_prefetching() {
    let (calls_replayed, _hits, _misses) = replay(false);
    assert_eq!(calls_replayed, 5);
}

#[test]
fn replay_runs_to_completion_with_prefetching() {
    let (calls_replayed, _hits, _misses) = replay(true);
    assert_eq!(calls_replayed, 5);
}

#[test]
fn replay_from_a_freshly_written_trace_file_matches_the_parsed_call_count() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, r#"09:00:00.000000 open("/tmp/a", O_RDONLY) = 3"#).unwrap();
    writeln!(file, r#"09:00:00.500000 open("/tmp/b", O_RDONLY) = 4"#).unwrap();
    writeln!(file, r#"09:00:01.000000 open("/tmp/a", O_RDONLY) = 5"#).unwrap();
    file.flush().unwrap();

    let contents = std::fs::read_to_string(file.path()).unwrap();
    let calls = parse_trace(&contents, TraceFormat::Strace);
    assert_eq!(calls.len(), 3);

    let mut mgr = CacheManager::new(16, 0.5, 10_000, false);
    let mut sink = PrintSink;
    {
        let mut sim = FsSimulator::new(&mut mgr);
        for call in &calls {
            sim.send_request(call, &mut sink);
        }
    }

    assert_eq!(mgr.cache().inner().hits() + mgr.cache().inner().misses(), 3);
}
