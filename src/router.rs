//! Request router ("FS simulator")
//!
//! Grounded on `original_source/FS_Simulator.h`: a thin pass-through that
//! hands each replayed call to the cache manager and reports the result
//! (SPEC_FULL.md §4.10). The reporting sink is a trait so tests can capture
//! output instead of writing to stdout.

use crate::clock::SimClock;
use crate::manager::CacheManager;
use crate::report::ReplayReport;
use crate::trace::Call;

pub trait ReportSink {
    fn emit(&mut self, report: &ReplayReport);
}

/// Default sink: one line per call on stdout.
#[derive(Debug, Default)]
pub struct PrintSink;

impl ReportSink for PrintSink {
    fn emit(&mut self, report: &ReplayReport) {
        println!("{report}");
    }
}

pub struct FsSimulator<'a, C: SimClock> {
    cache_manager: &'a mut CacheManager<C>,
}

impl<'a, C: SimClock> FsSimulator<'a, C> {
    pub fn new(cache_manager: &'a mut CacheManager<C>) -> Self {
        Self { cache_manager }
    }

    /// `send_request(call)`: forward to `allocate`, then report.
    pub fn send_request(&mut self, call: &Call, sink: &mut dyn ReportSink) -> bool {
        let hit = self.cache_manager.allocate(call);
        sink.emit(&self.cache_manager.report());
        hit
    }
}
