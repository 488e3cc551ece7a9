//! Per-source edge accumulation with duplicate tracking.

use crate::graph::RrEdge;
use crate::ids::RrNodeId;
use weft_arch::SwitchId;

/// Edges collected for one source node before they are committed.
///
/// `targeted` is sized to the node count and only the flags set since the
/// last [`EdgeScratch::commit`] are cleared, so reuse across sources costs
/// nothing proportional to the graph.
#[derive(Debug)]
pub(crate) struct EdgeScratch {
    pending: Vec<RrEdge>,
    targeted: Vec<bool>,
}

impl EdgeScratch {
    pub(crate) fn new(num_nodes: usize) -> Self {
        Self {
            pending: Vec::new(),
            targeted: vec![false; num_nodes],
        }
    }

    /// Appends an edge unconditionally.
    pub(crate) fn push(&mut self, to: RrNodeId, switch: SwitchId) {
        self.targeted[to.index()] = true;
        self.pending.push(RrEdge { to, switch });
    }

    /// Appends an edge unless `to` is already a target. Returns `true` if
    /// the edge was added.
    pub(crate) fn push_once(&mut self, to: RrNodeId, switch: SwitchId) -> bool {
        if self.targeted[to.index()] {
            return false;
        }
        self.push(to, switch);
        true
    }

    pub(crate) fn is_targeted(&self, to: RrNodeId) -> bool {
        self.targeted[to.index()]
    }

    /// Takes the pending edges and resets the duplicate flags.
    pub(crate) fn commit(&mut self) -> Vec<RrEdge> {
        for edge in &self.pending {
            self.targeted[edge.to.index()] = false;
        }
        std::mem::take(&mut self.pending)
    }
}
