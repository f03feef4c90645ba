use fxhash::FxHashMap;
use log::info;

use crate::{LabelId, VertexId};

/// A labeled, undirected graph stored as compressed sparse row adjacency.
///
/// Neighbors of a vertex are stored contiguously in `adj`, sliced out via
/// `start_offset`, sorted ascending by id so [`Graph::is_neighbor`] can
/// binary search instead of scanning linearly.
#[derive(Debug, Clone)]
pub struct Graph {
    num_vertices: usize,
    num_edges: usize,
    label: Vec<LabelId>,
    adj: Vec<VertexId>,
    start_offset: Vec<usize>,
    label_frequency: FxHashMap<LabelId, usize>,
    /// Raw (uncanonicalized) edge labels, keyed by `(min(u,v), max(u,v))`.
    /// Consulted only when the backtracker runs in `--strict-edge-labels`
    /// mode; ignored otherwise, matching the reference format's default.
    edge_label: FxHashMap<(VertexId, VertexId), i32>,
}

impl Graph {
    /// Builds a graph from a dense vertex label array and a list of
    /// undirected edges. Self-loops are dropped; duplicate edges between
    /// the same pair of vertices are silently deduplicated rather than
    /// rejected (a documented implementation choice — candidate-filtered
    /// benchmark graphs in this domain are not adversarial inputs).
    ///
    /// `labels` must already be canonicalized (see [`crate::LabelMap`]);
    /// this constructor does not canonicalize on your behalf. Edge labels
    /// are carried through uncanonicalized, since they are only ever
    /// compared for equality between the two graphs.
    pub fn build(labels: Vec<LabelId>, edges: &[(VertexId, VertexId, i32)]) -> Self {
        let num_vertices = labels.len();
        let mut adj_lists: Vec<Vec<VertexId>> = vec![Vec::new(); num_vertices];
        let mut edge_label: FxHashMap<(VertexId, VertexId), i32> = FxHashMap::default();

        for &(u, v, label) in edges {
            if u == v {
                continue;
            }
            adj_lists[u as usize].push(v);
            adj_lists[v as usize].push(u);
            let key = (u.min(v), u.max(v));
            edge_label.insert(key, label);
        }

        for list in &mut adj_lists {
            list.sort_unstable();
            list.dedup();
        }

        let degree: Vec<usize> = adj_lists.iter().map(Vec::len).collect();
        let num_edges = degree.iter().sum::<usize>() / 2;

        let mut start_offset = Vec::with_capacity(num_vertices + 1);
        start_offset.push(0usize);
        for &d in &degree {
            start_offset.push(start_offset.last().unwrap() + d);
        }

        let mut label_frequency: FxHashMap<LabelId, usize> = FxHashMap::default();
        for &l in &labels {
            *label_frequency.entry(l).or_insert(0) += 1;
        }

        let mut adj = vec![0 as VertexId; start_offset[num_vertices]];
        for (v, neighbors) in adj_lists.iter().enumerate() {
            let base = start_offset[v];
            adj[base..base + neighbors.len()].copy_from_slice(neighbors);
        }

        info!(
            "built graph: {} vertices, {} edges, {} distinct labels",
            num_vertices,
            num_edges,
            label_frequency.len()
        );

        Self {
            num_vertices,
            num_edges,
            label: labels,
            adj,
            start_offset,
            label_frequency,
            edge_label,
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    pub fn label(&self, v: VertexId) -> LabelId {
        self.label[v as usize]
    }

    pub fn degree(&self, v: VertexId) -> usize {
        let v = v as usize;
        self.start_offset[v + 1] - self.start_offset[v]
    }

    pub fn neighbors(&self, v: VertexId) -> &[VertexId] {
        let v = v as usize;
        &self.adj[self.start_offset[v]..self.start_offset[v + 1]]
    }

    /// Whether `v` appears among `u`'s neighbors. Binary searches `u`'s
    /// id-sorted adjacency slice rather than scanning it linearly.
    pub fn is_neighbor(&self, u: VertexId, v: VertexId) -> bool {
        self.neighbors(u).binary_search(&v).is_ok()
    }

    pub fn label_frequency(&self, label: LabelId) -> usize {
        self.label_frequency.get(&label).copied().unwrap_or(0)
    }

    pub fn num_labels(&self) -> usize {
        self.label_frequency.len()
    }

    /// The raw edge label recorded for `{u, v}`, if that edge exists.
    pub fn edge_label(&self, u: VertexId, v: VertexId) -> Option<i32> {
        self.edge_label.get(&(u.min(v), u.max(v))).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Graph {
        Graph::build(vec![0, 0, 0], &[(0, 1, 0), (0, 2, 0), (1, 2, 0)])
    }

    #[test]
    fn counts_vertices_and_edges() {
        let g = triangle();
        assert_eq!(g.num_vertices(), 3);
        assert_eq!(g.num_edges(), 3);
    }

    #[test]
    fn degree_and_neighbors() {
        let g = triangle();
        assert_eq!(g.degree(0), 2);
        let mut n = g.neighbors(0).to_vec();
        n.sort_unstable();
        assert_eq!(n, vec![1, 2]);
    }

    #[test]
    fn is_neighbor_reflects_adjacency() {
        let g = triangle();
        assert!(g.is_neighbor(0, 1));
        assert!(g.is_neighbor(0, 2));
        assert!(!g.is_neighbor(0, 0));
    }

    #[test]
    fn self_loops_are_dropped() {
        let g = Graph::build(vec![0, 0], &[(0, 0, 0), (0, 1, 0)]);
        assert_eq!(g.num_edges(), 1);
        assert_eq!(g.degree(0), 1);
    }

    #[test]
    fn duplicate_edges_are_deduplicated() {
        let g = Graph::build(vec![0, 0], &[(0, 1, 0), (1, 0, 0), (0, 1, 0)]);
        assert_eq!(g.num_edges(), 1);
        assert_eq!(g.degree(0), 1);
        assert_eq!(g.degree(1), 1);
    }

    #[test]
    fn label_frequency_counts_vertices_by_label() {
        let g = Graph::build(vec![0, 0, 1], &[(0, 1, 0), (1, 2, 0)]);
        assert_eq!(g.label_frequency(0), 2);
        assert_eq!(g.label_frequency(1), 1);
        assert_eq!(g.label_frequency(99), 0);
        assert_eq!(g.num_labels(), 2);
    }

    #[test]
    fn edge_label_is_order_independent() {
        let g = Graph::build(vec![0, 0], &[(0, 1, 7)]);
        assert_eq!(g.edge_label(0, 1), Some(7));
        assert_eq!(g.edge_label(1, 0), Some(7));
        assert_eq!(g.edge_label(0, 2), None);
    }
}
