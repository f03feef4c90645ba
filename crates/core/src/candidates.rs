use crate::VertexId;

/// Per-query-vertex set of data-vertex candidates, supplied by an external
/// filtering pass (LDF/GQL-style) this crate does not implement.
///
/// Treated as opaque and immutable by the backtracker: candidates are
/// consumed in whatever order `get` exposes them, then re-sorted by the
/// backtracker itself before use (see `extendable_candidates`).
pub trait CandidateSet {
    /// Number of candidates recorded for query vertex `u`.
    fn size(&self, u: VertexId) -> usize;

    /// The `i`-th candidate data-vertex for query vertex `u`.
    fn get(&self, u: VertexId, i: usize) -> VertexId;
}

/// A `CandidateSet` held fully in memory, one `Vec` per query vertex.
///
/// Mirrors the reference pack's own candidate representation
/// (`Box<[Vec<usize>]>`), adapted to this crate's `VertexId` type.
#[derive(Debug, Clone)]
pub struct InMemoryCandidateSet {
    candidates: Box<[Vec<VertexId>]>,
}

impl InMemoryCandidateSet {
    /// Builds a candidate set from one candidate list per query vertex, in
    /// increasing query-vertex-id order.
    pub fn new(candidates: Vec<Vec<VertexId>>) -> Self {
        Self {
            candidates: candidates.into_boxed_slice(),
        }
    }

    /// Number of query vertices this set has candidate lists for.
    pub fn num_query_vertices(&self) -> usize {
        self.candidates.len()
    }
}

impl CandidateSet for InMemoryCandidateSet {
    fn size(&self, u: VertexId) -> usize {
        self.candidates[u as usize].len()
    }

    fn get(&self, u: VertexId, i: usize) -> VertexId {
        self.candidates[u as usize][i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_size_and_candidates() {
        let cs = InMemoryCandidateSet::new(vec![vec![0, 1, 2], vec![3]]);
        assert_eq!(cs.num_query_vertices(), 2);
        assert_eq!(cs.size(0), 3);
        assert_eq!(cs.size(1), 1);
        assert_eq!(cs.get(0, 1), 1);
        assert_eq!(cs.get(1, 0), 3);
    }

    #[test]
    fn empty_candidate_list_has_zero_size() {
        let cs = InMemoryCandidateSet::new(vec![vec![]]);
        assert_eq!(cs.size(0), 0);
    }
}
