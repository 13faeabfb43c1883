//! The `Call` record and its wall-clock timestamp
//!
//! Grounded on `original_source/Driver.h`'s `SystemCall`: equality is path
//! equality restricted to `open` calls, ordering is lexicographic on the
//! wall-clock fields, and subtraction wraps modulo 24h. `path` is an `Rc<str>`
//! rather than a raw pointer into parser-owned storage (SPEC_FULL.md §9):
//! Associations and call-window entries want their own snapshot of a `Call`
//! at the moment they observed it, so a cheap-to-clone value type stands in
//! for the original's non-owning pointer into a heap-allocated arena.

use std::cmp::Ordering;
use std::rc::Rc;

/// The syscall kind. Only `Open` participates in graph/cache identity; the
/// others are carried through parsing for completeness but otherwise inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    Open,
    Read,
    Write,
    Close,
    Other,
}

impl CallKind {
    pub fn from_token(token: &str) -> Self {
        match token {
            "open" | "openat" => CallKind::Open,
            "read" | "pread" | "pread64" => CallKind::Read,
            "write" | "pwrite" | "pwrite64" => CallKind::Write,
            "close" => CallKind::Close,
            _ => CallKind::Other,
        }
    }
}

/// Hour/minute/second/microsecond decomposition of a 24h wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WallTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub micros: u32,
}

impl WallTime {
    pub fn new(hour: u8, minute: u8, second: u8, micros: u32) -> Self {
        Self {
            hour,
            minute,
            second,
            micros,
        }
    }

    /// Build a `WallTime` from a number of seconds elapsed since midnight
    /// (used by the "seers" parser, which carries an epoch-like timestamp).
    pub fn from_seconds_since_midnight(total_seconds: f64) -> Self {
        let wrapped = total_seconds.rem_euclid(86_400.0);
        let whole = wrapped.floor() as u64;
        let micros = ((wrapped - whole as f64) * 1_000_000.0).round() as u32;
        let hour = (whole / 3600) % 24;
        let minute = (whole / 60) % 60;
        let second = whole % 60;
        Self::new(hour as u8, minute as u8, second as u8, micros)
    }

    /// Total seconds since midnight, as a float.
    pub fn as_seconds(&self) -> f64 {
        self.hour as f64 * 3600.0
            + self.minute as f64 * 60.0
            + self.second as f64
            + self.micros as f64 * 0.000_001
    }
}

/// `lhs - rhs`, wrapped modulo 24h so the result is always non-negative —
/// mirrors `operator-(const SystemCall&, const SystemCall&)` in the original.
impl std::ops::Sub for WallTime {
    type Output = f64;

    fn sub(self, rhs: WallTime) -> f64 {
        let left = self.as_seconds();
        let right = rhs.as_seconds();
        if left >= right {
            left - right
        } else {
            (86_400.0 - right) + left
        }
    }
}

/// A single parsed trace record.
#[derive(Debug, Clone)]
pub struct Call {
    pub kind: CallKind,
    pub path: Rc<str>,
    pub bytes: u64,
    pub wall_time: WallTime,
    pub stream_id: i64,
}

impl Call {
    pub fn new(kind: CallKind, path: impl Into<Rc<str>>, bytes: u64, wall_time: WallTime, stream_id: i64) -> Self {
        Self {
            kind,
            path: path.into(),
            bytes: if bytes == 0 { 512 } else { bytes },
            wall_time,
            stream_id,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.kind, CallKind::Open)
    }
}

/// Path equality, restricted to `open` calls on both sides — mirrors
/// `SystemCall::operator==`.
impl PartialEq for Call {
    fn eq(&self, other: &Self) -> bool {
        self.is_open() && other.is_open() && self.path == other.path
    }
}

impl Eq for Call {}

impl PartialOrd for Call {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Call {
    fn cmp(&self, other: &Self) -> Ordering {
        self.wall_time.cmp(&other.wall_time)
    }
}
