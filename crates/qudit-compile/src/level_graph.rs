//! Hardware model of one qudit line: the energy-level transition graph.
//!
//! Nodes are the physical energy levels `0..d`; edges are the transitions the
//! hardware can drive natively, each carrying a sensitivity weight. Routing
//! never changes the topology: a level swap exchanges the mutable per-node
//! state (which logical level a node holds and its accumulated frame phase)
//! and leaves the edges and node roles untouched. Roles mark physical
//! hardware capability, so a detour moving a level onto an anchor node
//! makes that level cheap to drive.
//!
//! The immutable topology lives behind an `Arc` so branch-and-bound search
//! nodes can snapshot a graph cheaply; only the per-node vectors are cloned.

use std::collections::VecDeque;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{CompileError, CompileResult};

/// Role of a node in the level graph.
///
/// `Init` nodes are the anchors: levels the hardware can prepare and read
/// out directly. Rotations far from an anchor are penalized by the cost
/// model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeRole {
    /// Anchor node, directly initializable.
    Init,
    /// Reachable only through native transitions.
    Reachable,
}

/// One undirected native transition between two levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Lower endpoint.
    pub a: usize,
    /// Upper endpoint.
    pub b: usize,
    /// Hardware sensitivity weight of the transition.
    pub sensitivity: f64,
}

/// The immutable part of a level graph: node count, edges, adjacency,
/// node roles. Roles are hardware properties of the physical nodes, so
/// they stay put while level swaps exchange the mutable node state.
#[derive(Debug)]
struct Topology {
    num_levels: usize,
    edges: Vec<Edge>,
    /// Neighbor lists, each sorted ascending for deterministic traversal.
    adjacency: Vec<Vec<usize>>,
    roles: Vec<NodeRole>,
}

/// Energy-level graph of a single qudit line.
///
/// Cloning is cheap: the topology is shared, only the mutable per-node
/// state (`lpmap`, roles, phase accumulators) is copied.
#[derive(Debug, Clone)]
pub struct LevelGraph {
    topology: Arc<Topology>,
    /// Logical level currently held by each physical node.
    lpmap: Vec<usize>,
    /// Frame-phase accumulator per node, `None` until phase-storing mode
    /// is initialized.
    phase_storage: Option<Vec<f64>>,
}

impl LevelGraph {
    /// Build a graph from unweighted edges (sensitivity 1.0) and anchor
    /// nodes. Fails on out-of-range edges or anchors, self loops, or a
    /// disconnected topology.
    pub fn new(
        num_levels: usize,
        edges: &[(usize, usize)],
        anchors: &[usize],
    ) -> CompileResult<Self> {
        let weighted: Vec<Edge> = edges
            .iter()
            .map(|&(a, b)| Edge { a: a.min(b), b: a.max(b), sensitivity: 1.0 })
            .collect();
        Self::from_edges(num_levels, weighted, anchors)
    }

    /// Build a graph from sensitivity-weighted edges.
    pub fn weighted(
        num_levels: usize,
        edges: &[(usize, usize, f64)],
        anchors: &[usize],
    ) -> CompileResult<Self> {
        let weighted: Vec<Edge> = edges
            .iter()
            .map(|&(a, b, s)| Edge { a: a.min(b), b: a.max(b), sensitivity: s })
            .collect();
        Self::from_edges(num_levels, weighted, anchors)
    }

    fn from_edges(num_levels: usize, edges: Vec<Edge>, anchors: &[usize]) -> CompileResult<Self> {
        if num_levels < 2 {
            return Err(CompileError::Structural(format!(
                "graph needs at least 2 levels, got {num_levels}"
            )));
        }
        if anchors.is_empty() {
            return Err(CompileError::Structural("no anchor nodes given".into()));
        }
        let mut adjacency = vec![Vec::new(); num_levels];
        for e in &edges {
            if e.a == e.b {
                return Err(CompileError::Structural(format!("self loop on node {}", e.a)));
            }
            if e.b >= num_levels {
                return Err(CompileError::Structural(format!(
                    "edge ({}, {}) out of range for {num_levels} levels",
                    e.a, e.b
                )));
            }
            adjacency[e.a].push(e.b);
            adjacency[e.b].push(e.a);
        }
        for list in &mut adjacency {
            list.sort_unstable();
            list.dedup();
        }
        let mut roles = vec![NodeRole::Reachable; num_levels];
        for &a in anchors {
            if a >= num_levels {
                return Err(CompileError::Structural(format!(
                    "anchor {a} out of range for {num_levels} levels"
                )));
            }
            roles[a] = NodeRole::Init;
        }
        let graph = Self {
            topology: Arc::new(Topology { num_levels, edges, adjacency, roles }),
            lpmap: (0..num_levels).collect(),
            phase_storage: None,
        };
        // Every node must be reachable from node 0.
        let reached = graph.bfs_distances(0);
        if let Some(node) = reached.iter().position(Option::is_none) {
            return Err(CompileError::Structural(format!(
                "node {node} is disconnected"
            )));
        }
        Ok(graph)
    }

    /// Number of levels (nodes).
    pub fn num_levels(&self) -> usize {
        self.topology.num_levels
    }

    /// The edge list.
    pub fn edges(&self) -> &[Edge] {
        &self.topology.edges
    }

    /// Sensitivity weight of the edge between two nodes, if present.
    pub fn sensitivity(&self, a: usize, b: usize) -> Option<f64> {
        let (a, b) = (a.min(b), a.max(b));
        self.topology
            .edges
            .iter()
            .find(|e| e.a == a && e.b == b)
            .map(|e| e.sensitivity)
    }

    /// BFS distances from `start`, `None` for unreachable nodes.
    fn bfs_distances(&self, start: usize) -> Vec<Option<usize>> {
        let mut dist = vec![None; self.topology.num_levels];
        dist[start] = Some(0);
        let mut queue = VecDeque::from([start]);
        while let Some(n) = queue.pop_front() {
            let d = dist[n].unwrap_or(0);
            for &m in &self.topology.adjacency[n] {
                if dist[m].is_none() {
                    dist[m] = Some(d + 1);
                    queue.push_back(m);
                }
            }
        }
        dist
    }

    /// Unweighted hop count between two nodes.
    pub fn distance(&self, a: usize, b: usize) -> Option<usize> {
        self.bfs_distances(a)[b]
    }

    /// Shortest node path from `a` to `b` inclusive, ties broken toward
    /// lower-numbered neighbors.
    pub fn shortest_path(&self, a: usize, b: usize) -> Option<Vec<usize>> {
        if a == b {
            return Some(vec![a]);
        }
        let mut prev: Vec<Option<usize>> = vec![None; self.topology.num_levels];
        let mut seen = vec![false; self.topology.num_levels];
        seen[a] = true;
        let mut queue = VecDeque::from([a]);
        while let Some(n) = queue.pop_front() {
            for &m in &self.topology.adjacency[n] {
                if !seen[m] {
                    seen[m] = true;
                    prev[m] = Some(n);
                    if m == b {
                        let mut path = vec![b];
                        let mut cur = b;
                        while let Some(p) = prev[cur] {
                            path.push(p);
                            cur = p;
                        }
                        path.reverse();
                        return Some(path);
                    }
                    queue.push_back(m);
                }
            }
        }
        None
    }

    /// Exchange the mutable state of two nodes, the held level and the
    /// phase accumulator. Edge topology and node roles are untouched;
    /// swapping the same pair twice is the identity.
    pub fn swap(&mut self, a: usize, b: usize) {
        self.lpmap.swap(a, b);
        if let Some(phases) = &mut self.phase_storage {
            phases.swap(a, b);
        }
    }

    /// Whether a node is an anchor.
    pub fn is_anchor(&self, node: usize) -> bool {
        self.topology.roles[node] == NodeRole::Init
    }

    /// Whether a node is directly initializable. Synonym of
    /// [`LevelGraph::is_anchor`]; anchors are exactly the `Init` nodes.
    pub fn is_init(&self, node: usize) -> bool {
        self.is_anchor(node)
    }

    /// Minimum hop count from `node` to any anchor.
    pub fn anchor_distance(&self, node: usize) -> usize {
        let dist = self.bfs_distances(node);
        (0..self.topology.num_levels)
            .filter(|&n| self.is_anchor(n))
            .filter_map(|n| dist[n])
            .min()
            .unwrap_or(usize::MAX)
    }

    /// Logical level currently held by each node.
    pub fn lpmap(&self) -> &[usize] {
        &self.lpmap
    }

    /// Node currently holding a logical level.
    pub fn position(&self, level: usize) -> usize {
        self.lpmap
            .iter()
            .position(|&l| l == level)
            .unwrap_or(level)
    }

    /// Physical node of every logical level, ordered by logical id (the
    /// inverse permutation of [`LevelGraph::lpmap`]).
    pub fn log_phy_map(&self) -> Vec<usize> {
        let mut map = vec![0; self.topology.num_levels];
        for (node, &level) in self.lpmap.iter().enumerate() {
            map[level] = node;
        }
        map
    }

    /// Zero-initialize the per-node frame-phase accumulators.
    pub fn setup_phase_storage(&mut self) {
        self.phase_storage = Some(vec![0.0; self.topology.num_levels]);
    }

    /// Whether phase-storing mode is initialized.
    pub fn phase_storage_enabled(&self) -> bool {
        self.phase_storage.is_some()
    }

    /// The per-node phase accumulators, if initialized.
    pub fn phase_storage(&self) -> Option<&[f64]> {
        self.phase_storage.as_deref()
    }

    /// Accumulated frame phase of a node, zero while storage is disabled.
    pub fn phase(&self, node: usize) -> f64 {
        self.phase_storage.as_ref().map_or(0.0, |p| p[node])
    }

    /// Fold `delta` into a node's accumulator. No-op while storage is
    /// disabled.
    pub fn add_phase(&mut self, node: usize, delta: f64) {
        if let Some(phases) = &mut self.phase_storage {
            phases[node] += delta;
        }
    }

    /// Zero all accumulators, keeping storage enabled.
    pub fn reset_phase_storage(&mut self) {
        if let Some(phases) = &mut self.phase_storage {
            phases.fill(0.0);
        }
    }

    /// Copy of the current accumulators for later restoration.
    pub fn snapshot_phases(&self) -> Option<Vec<f64>> {
        self.phase_storage.clone()
    }

    /// Restore accumulators captured by [`LevelGraph::snapshot_phases`].
    pub fn restore_phases(&mut self, snapshot: Option<Vec<f64>>) {
        self.phase_storage = snapshot;
    }
}
