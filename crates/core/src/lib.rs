//! CSR graph storage, label canonicalization and query DAG construction for
//! subgraph isomorphism search.
//!
//! This crate owns the data model shared by the backtracking search: a
//! [`Graph`] (compressed sparse row adjacency with label buckets), a
//! [`LabelMap`] that canonicalizes raw input labels into dense integers, a
//! [`QueryDag`] overlay that roots and orients a query graph, and a
//! [`CandidateSet`] contract for the externally-supplied per-vertex
//! candidate lists.

mod candidates;
mod csr;
mod label;
mod query_dag;
mod reader;
mod search;

pub use candidates::{CandidateSet, InMemoryCandidateSet};
pub use csr::Graph;
pub use label::LabelMap;
pub use query_dag::QueryDag;
pub use reader::{load_candidate_set, load_data_graph, load_query_graph};
pub use search::{print_all_matches, MatchSink, SearchConfig, WriterSink};

use std::path::PathBuf;

/// Vertex identifier. Densely numbered 0..N-1 per graph.
pub type VertexId = i32;
/// Canonicalized label identifier. -1 is the "absent from data graph" sentinel.
pub type LabelId = i32;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: malformed record: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("query graph is disconnected: vertex {0} is not reachable from the DAG root")]
    DisconnectedQuery(VertexId),

    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
