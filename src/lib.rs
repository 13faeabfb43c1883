//! Predictive cache simulator — offline replay of a predictive file-system
//! cache driven by recorded syscall traces.
//!
//! The core is a probability graph mined from inter-file co-access patterns
//! (`graph`) and a two-buffer cache manager (`manager`) that uses it to
//! drive admission, eviction, pipelined prefetching and adaptive
//! repartitioning between a demand (LRU) buffer and a prefetch buffer.

pub mod cache;
pub mod clock;
pub mod constants;
pub mod error;
pub mod graph;
pub mod manager;
pub mod report;
pub mod router;
pub mod trace;
pub mod window;

pub use clock::{Clock, FakeClock, SimClock};
pub use error::{Result, SimError};
pub use manager::CacheManager;
pub use report::{ReplayReport, RunSummary};
pub use router::{FsSimulator, PrintSink, ReportSink};
pub use trace::{Call, CallKind, WallTime};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
