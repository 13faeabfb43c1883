//! Cache pages
//!
//! Grounded on `original_source/Cache_Manager.h`'s `struct Page` and
//! `pageComparison`, which orders strictly by timestamp (SPEC_FULL.md §3).
//! A `BTreeSet` needs its `Ord` to agree with identity (same `(path,
//! block_num)`), not with recency, so the oldest-stamp lookup the original
//! gets for free from an ordered `std::set` is a linear scan here instead
//! (`PageBuffer::evict_oldest`/`peek_oldest`).

use std::cmp::Ordering;

use crate::trace::Call;

#[derive(Debug, Clone)]
pub struct Page {
    pub file: Call,
    pub block_num: u64,
    pub stamp: f64,
}

impl Page {
    pub fn new(file: Call, block_num: u64, stamp: f64) -> Self {
        Self {
            file,
            block_num,
            stamp,
        }
    }
}

/// Two pages are equal iff `file.path` and `block_num` match.
impl PartialEq for Page {
    fn eq(&self, other: &Self) -> bool {
        self.file.path == other.file.path && self.block_num == other.block_num
    }
}

impl Eq for Page {}

impl PartialOrd for Page {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Order by `(path, block_num)`, matching `PartialEq` exactly, so `BTreeSet`
/// lookups (`get`/`contains`/`remove`) find a page by identity regardless of
/// its stamp. Ordering by stamp instead (like the original) would make
/// `Ord`-equality diverge from identity-equality, which a `BTreeSet` that
/// relies on `Ord` alone for deduplication cannot tolerate.
impl Ord for Page {
    fn cmp(&self, other: &Self) -> Ordering {
        self.file
            .path
            .cmp(&other.file.path)
            .then_with(|| self.block_num.cmp(&other.block_num))
    }
}
