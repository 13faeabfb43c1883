//! Graph nodes
//!
//! Grounded on `original_source/Probability_Graph.h`'s `struct Node`. A node
//! represents one `open`-able file and the window of files it has been seen
//! co-accessed with.

use crate::trace::Call;

use super::association::Association;

#[derive(Debug, Clone)]
pub struct Node {
    pub call: Call,
    pub window: Vec<Association>,
    pub total_strength: u32,
}

impl Node {
    pub fn new(call: Call) -> Self {
        Self {
            call,
            window: Vec::new(),
            total_strength: 0,
        }
    }

    /// Recompute `total_strength` from the window — must hold after every
    /// mutation batch (SPEC_FULL.md §3 invariant 3).
    pub fn recompute_total_strength(&mut self) {
        self.total_strength = self.window.iter().map(|a| a.strength).sum();
    }

    /// Append an association, skipping self-associations (SPEC_FULL.md §3
    /// invariant 4: a node never associates with itself).
    pub fn push_association(&mut self, assoc: Association) {
        if assoc.call != self.call {
            self.total_strength += assoc.strength;
            self.window.push(assoc);
        }
    }

    /// Remove duplicate associations by path identity, merging strengths:
    /// for each earlier entry whose path matches a later one, add the
    /// earlier's strength into the later and erase the earlier (the later
    /// duplicate absorbs the earlier — SPEC_FULL.md §4.2).
    pub fn dedup_window(&mut self) {
        dedup_associations(&mut self.window);
        self.recompute_total_strength();
    }
}

/// `remove_dups(vector<Association>&)` from the original: scans without
/// skipping so an entry with multiple duplicates is fully absorbed.
pub fn dedup_associations(window: &mut Vec<Association>) {
    let mut i = 0;
    while i + 1 < window.len() {
        let mut matched = false;
        let mut j = i + 1;
        while j < window.len() {
            if window[i].call == window[j].call {
                let strength = window[i].strength;
                window[j].strength += strength;
                window.remove(i);
                matched = true;
                break;
            }
            j += 1;
        }
        if matched {
            i = i.saturating_sub(1);
        } else {
            i += 1;
        }
    }
}
