//! Association edges
//!
//! Grounded on `original_source/Probability_Graph.h`'s `struct Association`.

use crate::trace::Call;

/// A directed edge from one file to a co-accessed file, with an integer
/// strength that accumulates every time the pair is observed together.
#[derive(Debug, Clone)]
pub struct Association {
    pub call: Call,
    pub strength: u32,
}

impl Association {
    pub fn new(call: Call) -> Self {
        Self { call, strength: 1 }
    }
}
