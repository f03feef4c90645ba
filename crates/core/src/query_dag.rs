use log::debug;

use crate::{csr::Graph, Error, Result, VertexId};

/// The DAG overlay attached to a query graph: a root plus, for every
/// vertex, the set of DAG-parents and DAG-children derived by orienting
/// each undirected query edge exactly once.
///
/// Owned exclusively by the query graph it was built for. The reference
/// source represents `parentQuery`/`childQuery` as raw owning `int**`
/// arrays sized by vertex degree with `-1` padding for unused slots; this
/// is replaced here with a jagged `Vec<Vec<VertexId>>`, one exactly-sized
/// sequence per vertex and no sentinel padding (see the crate's design
/// notes on this substitution).
#[derive(Debug, Clone)]
pub struct QueryDag {
    root: VertexId,
    parent_query: Vec<Vec<VertexId>>,
    child_query: Vec<Vec<VertexId>>,
}

impl QueryDag {
    /// Roots `query` on its minimum-selectivity vertex (§ root selection)
    /// and orients every edge via label-frequency/degree-driven BFS.
    ///
    /// Fails with [`Error::DisconnectedQuery`] if some query vertex is not
    /// reachable from the chosen root — this crate assumes a connected
    /// query graph and treats violations of that precondition as malformed
    /// input rather than silently building a partial DAG.
    pub fn build(query: &Graph, data: &Graph) -> Result<Self> {
        let n = query.num_vertices();
        let root = find_root(query, data);

        let mut parent_query: Vec<Vec<VertexId>> = vec![Vec::new(); n];
        let mut child_query: Vec<Vec<VertexId>> = vec![Vec::new(); n];

        let mut popped = vec![false; n];
        let mut visited = vec![false; n];
        let mut frontier = vec![root];
        visited[root as usize] = true;

        while !frontier.is_empty() {
            order_frontier(&mut frontier, query, data);

            let mut next_frontier = Vec::new();
            for &curr in &frontier {
                popped[curr as usize] = true;

                for &child in query.neighbors(curr) {
                    if !popped[child as usize] {
                        child_query[curr as usize].push(child);
                        parent_query[child as usize].push(curr);
                    }
                    if !visited[child as usize] {
                        visited[child as usize] = true;
                        next_frontier.push(child);
                    }
                }
            }

            frontier = next_frontier;
        }

        if let Some(unreached) = (0..n as VertexId).find(|&v| !popped[v as usize]) {
            return Err(Error::DisconnectedQuery(unreached));
        }

        debug!(
            "built query DAG: root={}, {} vertices",
            root,
            query.num_vertices()
        );

        let dag = Self {
            root,
            parent_query,
            child_query,
        };
        if !dag.is_acyclic(query) {
            return Err(Error::InvariantViolation(
                "query DAG is not acyclic or does not fully cover the query graph from its root"
                    .to_string(),
            ));
        }
        Ok(dag)
    }

    pub fn root(&self) -> VertexId {
        self.root
    }

    pub fn num_parent(&self, u: VertexId) -> usize {
        self.parent_query[u as usize].len()
    }

    pub fn num_child(&self, u: VertexId) -> usize {
        self.child_query[u as usize].len()
    }

    pub fn parents(&self, u: VertexId) -> &[VertexId] {
        &self.parent_query[u as usize]
    }

    pub fn children(&self, u: VertexId) -> &[VertexId] {
        &self.child_query[u as usize]
    }

    /// Invariant check promoted to a runtime `Error::InvariantViolation` at
    /// the end of [`QueryDag::build`]: every vertex but the root has
    /// exactly one DAG-parent-edge chain back to the root, and the root
    /// has none.
    fn is_acyclic(&self, query: &Graph) -> bool {
        if !self.parent_query[self.root as usize].is_empty() {
            return false;
        }
        // Every undirected edge must be oriented exactly once.
        for u in 0..query.num_vertices() as VertexId {
            for &v in query.neighbors(u) {
                let u_to_v = self.child_query[u as usize].contains(&v);
                let v_to_u = self.child_query[v as usize].contains(&u);
                if u_to_v == v_to_u {
                    return false;
                }
            }
        }
        // Reachability from root via parent chains (acyclic by construction
        // since parents are only ever assigned from an earlier BFS layer).
        let mut reached = vec![false; query.num_vertices()];
        reached[self.root as usize] = true;
        let mut stack = vec![self.root];
        while let Some(u) = stack.pop() {
            for &c in &self.child_query[u as usize] {
                if !reached[c as usize] {
                    reached[c as usize] = true;
                    stack.push(c);
                }
            }
        }
        reached.iter().all(|&r| r)
    }
}

/// Chooses the query vertex minimizing
/// `|{v in G : label(v) = label(r) and degree(v) >= degree(r)}| / degree(r)`,
/// ties broken by smallest vertex id.
///
/// A single-vertex query has degree 0 for its only vertex; the ratio would
/// divide by zero, so that vertex is returned directly without evaluating
/// it (the only query shape where this arises, per § boundary cases).
fn find_root(query: &Graph, data: &Graph) -> VertexId {
    if query.num_vertices() == 1 {
        return 0;
    }

    let mut best: Option<(f64, VertexId)> = None;

    for r in 0..query.num_vertices() as VertexId {
        let r_label = query.label(r);
        let r_degree = query.degree(r);

        let candidate_count = (0..data.num_vertices() as VertexId)
            .filter(|&v| data.label(v) == r_label && data.degree(v) >= r_degree)
            .count();

        let ratio = candidate_count as f64 / r_degree as f64;

        best = Some(match best {
            Some((best_ratio, best_r)) if best_ratio <= ratio => (best_ratio, best_r),
            _ => (ratio, r),
        });
    }

    best.expect("query graph has at least one vertex").1
}

/// Orders a BFS frontier in place via two successive stable sorts: first
/// by descending data-graph degree of same-labeled vertices (a proxy for
/// candidate count), then by ascending data-graph label frequency (the
/// dominant key — rarer labels go first).
fn order_frontier(frontier: &mut [VertexId], query: &Graph, data: &Graph) {
    frontier.sort_by_key(|&u| std::cmp::Reverse(degree_of_matching_label(query, data, u)));
    frontier.sort_by_key(|&u| data.label_frequency(query.label(u)));
}

/// Degree in `data` of vertices sharing `u`'s (canonicalized) label —
/// used purely as the first, tie-breaking sort key for BFS frontier order.
fn degree_of_matching_label(query: &Graph, data: &Graph, u: VertexId) -> usize {
    let label = query.label(u);
    (0..data.num_vertices() as VertexId)
        .filter(|&v| data.label(v) == label)
        .map(|v| data.degree(v))
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Graph {
        Graph::build(vec![0, 0, 0], &[(0, 1, 0), (0, 2, 0), (1, 2, 0)])
    }

    #[test]
    fn single_vertex_query_roots_on_its_only_vertex() {
        let q = Graph::build(vec![0], &[]);
        let g = triangle();
        let dag = QueryDag::build(&q, &g).unwrap();
        assert_eq!(dag.root(), 0);
        assert_eq!(dag.num_parent(0), 0);
        assert_eq!(dag.num_child(0), 0);
    }

    #[test]
    fn every_edge_oriented_exactly_once() {
        let q = triangle();
        let g = triangle();
        let dag = QueryDag::build(&q, &g).unwrap();

        for u in 0..q.num_vertices() as VertexId {
            for &v in q.neighbors(u) {
                let forward = dag.children(u).contains(&v);
                let backward = dag.children(v).contains(&u);
                assert_ne!(forward, backward, "edge {{{u},{v}}} must be oriented once");
            }
        }
    }

    #[test]
    fn root_has_no_parents_and_every_vertex_is_reachable() {
        let q = triangle();
        let g = triangle();
        let dag = QueryDag::build(&q, &g).unwrap();
        assert_eq!(dag.num_parent(dag.root()), 0);

        let mut reached = vec![false; q.num_vertices()];
        reached[dag.root() as usize] = true;
        let mut stack = vec![dag.root()];
        while let Some(u) = stack.pop() {
            for &c in dag.children(u) {
                reached[c as usize] = true;
                stack.push(c);
            }
        }
        assert!(reached.iter().all(|&r| r));
    }

    #[test]
    fn is_acyclic_detects_an_edge_oriented_both_ways() {
        let q = triangle();
        let broken = QueryDag {
            root: 0,
            parent_query: vec![vec![], vec![0], vec![1]],
            // 1 and 2 each claim the other as a child: edge {1,2} oriented twice.
            child_query: vec![vec![1], vec![2], vec![1]],
        };
        assert!(!broken.is_acyclic(&q));
    }

    #[test]
    fn disconnected_query_is_rejected() {
        // two isolated edges: 0-1 and 2-3, never joined.
        let q = Graph::build(vec![0, 0, 0, 0], &[(0, 1, 0), (2, 3, 0)]);
        let g = Graph::build(vec![0, 0, 0, 0], &[(0, 1, 0), (1, 2, 0), (2, 3, 0)]);
        let err = QueryDag::build(&q, &g).unwrap_err();
        assert!(matches!(err, Error::DisconnectedQuery(_)));
    }

    #[test]
    fn star_query_orients_center_to_leaves() {
        // center 0 connected to leaves 1,2,3; center has highest degree so
        // it is root-selective regardless of label-frequency tie-breaks
        // when all labels match.
        let q = Graph::build(vec![0, 1, 1, 1], &[(0, 1, 0), (0, 2, 0), (0, 3, 0)]);
        let g = Graph::build(
            vec![0, 1, 1, 1, 1],
            &[(0, 1, 0), (0, 2, 0), (0, 3, 0), (0, 4, 0)],
        );
        let dag = QueryDag::build(&q, &g).unwrap();
        assert_eq!(dag.root(), 0);
        assert_eq!(dag.num_child(0), 3);
        for leaf in [1, 2, 3] {
            assert_eq!(dag.num_parent(leaf), 1);
            assert_eq!(dag.parents(leaf), &[0]);
        }
    }
}
