//! Open-set strategies for the A* frontier.
//!
//! Both strategies pop the node with the lowest F-score and break ties by
//! insertion order, so a search returns the same path whichever one it uses.
//! The linear scan is the simple choice for small grids; the binary heap
//! scales to larger ones.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Index of a node in a search's node arena.
///
/// Nodes are appended to the arena in the order they are first discovered,
/// so a smaller id always means an earlier insertion.
pub type NodeId = usize;

/// Selects which [`OpenSet`] implementation a path finder uses.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OpenSetKind {
    /// Unordered list scanned for the minimum on every pop.
    #[default]
    LinearScan,
    /// Min-heap keyed by `(F, insertion order)` with lazy invalidation.
    BinaryHeap,
}

/// The frontier of an A* search.
///
/// Each node is inserted at most once. Its F-score may later be lowered with
/// [`OpenSet::decrease`] while it is still open.
pub trait OpenSet {
    /// Adds a newly discovered node.
    fn insert(&mut self, node: NodeId, f: f64);

    /// Lowers the F-score of a node that is still open.
    fn decrease(&mut self, node: NodeId, f: f64);

    /// Removes and returns the open node with the lowest F-score.
    /// Among equal scores the earliest inserted node wins.
    fn pop_min(&mut self) -> Option<NodeId>;

    /// Number of open nodes.
    fn len(&self) -> usize;

    /// True when no node is open.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Open set that keeps nodes in insertion order and scans for the minimum.
#[derive(Debug, Default, Clone)]
pub struct LinearScanOpenSet {
    entries: Vec<(NodeId, f64)>,
}

impl LinearScanOpenSet {
    /// Creates an empty open set.
    pub fn new() -> Self {
        Self::default()
    }
}

impl OpenSet for LinearScanOpenSet {
    fn insert(&mut self, node: NodeId, f: f64) {
        self.entries.push((node, f));
    }

    fn decrease(&mut self, node: NodeId, f: f64) {
        if let Some(entry) = self.entries.iter_mut().find(|(id, _)| *id == node) {
            entry.1 = f;
        }
    }

    fn pop_min(&mut self) -> Option<NodeId> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &(_, f)) in self.entries.iter().enumerate() {
            // Strictly lower only, so the first minimal entry is kept
            if best.is_none_or(|(_, best_f)| f < best_f) {
                best = Some((i, f));
            }
        }
        // `remove` rather than `swap_remove` keeps the insertion order intact
        best.map(|(i, _)| self.entries.remove(i).0)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct HeapEntry {
    f: f64,
    node: NodeId,
}

impl Eq for HeapEntry {}

// `BinaryHeap` is a max-heap, so the ordering is flipped to pop the lowest
// F first, then the lowest node id.
impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Open set backed by a binary heap.
///
/// Lowering a score pushes a fresh entry; the superseded one stays in the
/// heap and is discarded when popped.
#[derive(Debug, Default, Clone)]
pub struct BinaryHeapOpenSet {
    heap: BinaryHeap<HeapEntry>,
    /// Current F-score per node id, `None` once the node has been popped
    scores: Vec<Option<f64>>,
    open: usize,
}

impl BinaryHeapOpenSet {
    /// Creates an empty open set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty open set sized for `nodes` node ids.
    pub fn with_capacity(nodes: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(nodes),
            scores: Vec::with_capacity(nodes),
            open: 0,
        }
    }
}

impl OpenSet for BinaryHeapOpenSet {
    fn insert(&mut self, node: NodeId, f: f64) {
        if self.scores.len() <= node {
            self.scores.resize(node + 1, None);
        }
        if self.scores[node].is_none() {
            self.open += 1;
        }
        self.scores[node] = Some(f);
        self.heap.push(HeapEntry { f, node });
    }

    fn decrease(&mut self, node: NodeId, f: f64) {
        match self.scores.get_mut(node) {
            Some(score) if score.is_some() => {
                *score = Some(f);
                self.heap.push(HeapEntry { f, node });
            }
            _ => tracing::trace!(node, "decrease on a node that is not open"),
        }
    }

    fn pop_min(&mut self) -> Option<NodeId> {
        while let Some(entry) = self.heap.pop() {
            let live = self
                .scores
                .get(entry.node)
                .copied()
                .flatten()
                .is_some_and(|f| f.to_bits() == entry.f.to_bits());
            if live {
                self.scores[entry.node] = None;
                self.open -= 1;
                return Some(entry.node);
            }
        }
        None
    }

    fn len(&self) -> usize {
        self.open
    }
}
