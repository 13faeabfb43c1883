//! Probability graph
//!
//! Grounded on `original_source/Probability_Graph.h`'s `Probability_Graph`
//! class: a flat `Vec<Node>` scanned linearly, exactly as the original scans
//! its `vector<Node>` (SPEC_FULL.md §4.2 does not ask for anything smarter —
//! trace sizes in this simulator are small enough that a hash index would be
//! premature).

use crate::trace::Call;

use super::association::Association;
use super::node::Node;

pub struct ProbabilityGraph {
    lookahead_window_secs: f64,
    pub nodes: Vec<Node>,
}

impl ProbabilityGraph {
    pub fn new(lookahead_window_us: u64) -> Self {
        Self {
            lookahead_window_secs: lookahead_window_us as f64 * 1e-6,
            nodes: Vec::new(),
        }
    }

    pub fn lookahead_window_secs(&self) -> f64 {
        self.lookahead_window_secs
    }

    /// Linear scan by path equality — only `open` calls are findable.
    pub fn find(&self, call: &Call) -> Option<&Node> {
        self.nodes.iter().find(|n| n.call == *call)
    }

    pub fn find_mut(&mut self, call: &Call) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.call == *call)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn association_count(&self) -> usize {
        self.nodes.iter().map(|n| n.window.len()).sum()
    }

    /// One node per call, empty window, zero total_strength.
    pub fn create_nodes(&mut self, calls: &[Call]) {
        self.nodes = calls.iter().cloned().map(Node::new).collect();
    }

    /// Mine associations from a training set of time-ordered calls: for each
    /// node, walk forward while the target stays within the lookahead
    /// window, append an association for every co-accessed different file,
    /// then dedup/merge at both node and window granularity and finally
    /// recompute every node's total_strength (SPEC_FULL.md §4.2).
    pub fn load_associations(&mut self, calls: &[Call]) {
        for i in 0..self.nodes.len() {
            let anchor = self.nodes[i].call.clone();
            let mut pending = Vec::new();
            for target in calls.iter().skip(i + 1) {
                if target.wall_time - anchor.wall_time > self.lookahead_window_secs {
                    break;
                }
                if *target != anchor {
                    pending.push(Association::new(target.clone()));
                }
            }
            self.nodes[i].window.extend(pending);
        }

        dedup_nodes(&mut self.nodes);
        for node in &mut self.nodes {
            node.dedup_window();
        }
    }
}

/// `remove_dups(vector<Node>&)`: duplicate nodes (identified by path) are
/// merged into the *earlier* occurrence — windows concatenated, strengths
/// summed. Merged windows are intentionally left un-deduped here; callers
/// run `Node::dedup_window` afterwards if they want that.
pub fn dedup_nodes(nodes: &mut Vec<Node>) {
    let mut i = 0;
    while i + 1 < nodes.len() {
        let mut j = i + 1;
        while j < nodes.len() {
            if nodes[i].call == nodes[j].call {
                let other = nodes.remove(j);
                nodes[i].window.extend(other.window);
                nodes[i].total_strength += other.total_strength;
            } else {
                j += 1;
            }
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{CallKind, WallTime};

    fn open(path: &str, h: u8, m: u8, s: u8, us: u32) -> Call {
        Call::new(CallKind::Open, path, 512, WallTime::new(h, m, s, us), 0)
    }

    #[test]
    fn lookahead_clipping() {
        // lookahead = 1000us, trace [A@0us, B@500us, C@1200us] -> A -> {B} only.
        let calls = vec![
            open("A", 0, 0, 0, 0),
            open("B", 0, 0, 0, 500),
            open("C", 0, 0, 0, 1200),
        ];
        let mut graph = ProbabilityGraph::new(1000);
        graph.create_nodes(&calls);
        graph.load_associations(&calls);

        let node_a = graph.find(&calls[0]).unwrap();
        assert_eq!(node_a.window.len(), 1);
        assert_eq!(&*node_a.window[0].call.path, "B");
    }

    #[test]
    fn repeated_open_merges_into_one_node() {
        let calls = vec![
            open("A", 0, 0, 0, 0),
            open("B", 0, 0, 0, 10),
            open("A", 0, 0, 0, 20),
        ];
        let mut graph = ProbabilityGraph::new(1_000_000);
        graph.create_nodes(&calls);
        graph.load_associations(&calls);

        // Only one node should remain for path "A".
        let a_nodes = graph.nodes.iter().filter(|n| &*n.call.path == "A").count();
        assert_eq!(a_nodes, 1);
    }

    #[test]
    fn total_strength_matches_window_sum_after_load() {
        let calls = vec![
            open("A", 0, 0, 0, 0),
            open("B", 0, 0, 0, 10),
            open("C", 0, 0, 0, 20),
        ];
        let mut graph = ProbabilityGraph::new(1_000_000);
        graph.create_nodes(&calls);
        graph.load_associations(&calls);

        for node in &graph.nodes {
            let sum: u32 = node.window.iter().map(|a| a.strength).sum();
            assert_eq!(sum, node.total_strength);
        }
    }

    #[test]
    fn no_node_associates_with_itself() {
        let calls = vec![open("A", 0, 0, 0, 0), open("A", 0, 0, 0, 10)];
        let mut graph = ProbabilityGraph::new(1_000_000);
        graph.create_nodes(&calls);
        graph.load_associations(&calls);

        for node in &graph.nodes {
            for assoc in &node.window {
                assert_ne!(assoc.call.path, node.call.path);
            }
        }
    }
}
