use std::io::{self, Write};

use bitvec::prelude::*;

use crate::{candidates::CandidateSet, csr::Graph, query_dag::QueryDag, VertexId};

/// Runtime toggles for the backtracker, threaded through as an explicit
/// value rather than held in global state (mirrors [`crate::LabelMap`]'s
/// treatment of the reference source's process-wide label table).
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchConfig {
    /// When set, `extendable_candidates` additionally requires that the
    /// query edge label recorded between a DAG-parent and `u` matches the
    /// data edge label between the parent's image and the candidate. Off
    /// by default: edge labels are parsed but unused, matching the
    /// reference source.
    pub strict_edge_labels: bool,
}

/// Where emitted matches go. One line per call, built into a single
/// `String` before the write so a line is never interleaved even if a
/// future caller shares the sink across threads — the core itself stays
/// single-threaded (§ concurrency model).
pub trait MatchSink {
    fn emit_header(&mut self, num_query_vertices: usize) -> io::Result<()>;
    fn emit_match(&mut self, mapping: &[VertexId]) -> io::Result<()>;
}

/// A [`MatchSink`] writing plain text lines to any `impl Write`.
pub struct WriterSink<W> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> MatchSink for WriterSink<W> {
    fn emit_header(&mut self, num_query_vertices: usize) -> io::Result<()> {
        self.writer
            .write_all(format!("t {num_query_vertices}\n").as_bytes())
    }

    fn emit_match(&mut self, mapping: &[VertexId]) -> io::Result<()> {
        let mut line = String::from("a");
        for v in mapping {
            line.push(' ');
            line.push_str(&v.to_string());
        }
        line.push('\n');
        self.writer.write_all(line.as_bytes())
    }
}

/// Entry point: prints the `t <|V(Q)|>` header, then every subgraph
/// isomorphic embedding of `query` into `data` as an `a ...` line.
pub fn print_all_matches<CS: CandidateSet>(
    data: &Graph,
    query: &Graph,
    dag: &QueryDag,
    cs: &CS,
    config: &SearchConfig,
    sink: &mut impl MatchSink,
) -> io::Result<()> {
    let num_query_vertices = query.num_vertices();
    sink.emit_header(num_query_vertices)?;

    let mut mapping: Vec<Option<VertexId>> = vec![None; num_query_vertices];
    let mut visited: BitVec = BitVec::repeat(false, data.num_vertices());

    extend(data, query, dag, cs, config, &mut mapping, 0, &mut visited, sink)
}

/// Recursive backtracking step. Every push onto `mapping`/`visited` in
/// this function is paired with exactly one pop, performed immediately
/// after the recursive call that follows it, within the branch that did
/// the pushing. Neither the complete-match branch nor the dead-end branch
/// pushes anything, so neither pops — unlike the reference source, which
/// unconditionally pops at the tail of every call, including the initial
/// call where nothing was ever pushed (documented as a bug in § design
/// notes).
fn extend<CS: CandidateSet>(
    data: &Graph,
    query: &Graph,
    dag: &QueryDag,
    cs: &CS,
    config: &SearchConfig,
    mapping: &mut [Option<VertexId>],
    num_matched: usize,
    visited: &mut BitVec,
    sink: &mut impl MatchSink,
) -> io::Result<()> {
    if num_matched == query.num_vertices() {
        let full: Vec<VertexId> = mapping.iter().map(|v| v.expect("every query vertex is mapped")).collect();
        return sink.emit_match(&full);
    }

    if num_matched == 0 {
        let root = dag.root();
        for i in 0..cs.size(root) {
            let v = cs.get(root, i);
            mapping[root as usize] = Some(v);
            visited.set(v as usize, true);
            extend(data, query, dag, cs, config, mapping, 1, visited, sink)?;
            visited.set(v as usize, false);
            mapping[root as usize] = None;
        }
        return Ok(());
    }

    let Some(u) = choose_extendable(query, dag, cs, mapping) else {
        return Ok(());
    };

    let candidates = extendable_candidates(data, query, dag, cs, mapping, visited, u, config);

    for v in candidates {
        if visited[v as usize] {
            // Defensive: extendable_candidates already excludes visited
            // images, but the contract documents this as a guard, not an
            // invariant the caller may rely on skipping.
            continue;
        }
        mapping[u as usize] = Some(v);
        visited.set(v as usize, true);
        extend(data, query, dag, cs, config, mapping, num_matched + 1, visited, sink)?;
        visited.set(v as usize, false);
        mapping[u as usize] = None;
    }

    Ok(())
}

/// Picks the extendable query vertex with the fewest candidates, ties
/// broken by smallest id. A vertex is extendable iff it is unmapped and
/// every one of its DAG-parents is already mapped.
fn choose_extendable<CS: CandidateSet>(
    query: &Graph,
    dag: &QueryDag,
    cs: &CS,
    mapping: &[Option<VertexId>],
) -> Option<VertexId> {
    let mut best: Option<(usize, VertexId)> = None;

    for u in 0..query.num_vertices() as VertexId {
        if mapping[u as usize].is_some() {
            continue;
        }
        let parents_mapped = dag
            .parents(u)
            .iter()
            .all(|&p| mapping[p as usize].is_some());
        if !parents_mapped {
            continue;
        }

        let size = cs.size(u);
        best = Some(match best {
            Some((best_size, best_u)) if best_size <= size => (best_size, best_u),
            _ => (size, u),
        });
    }

    best.map(|(_, u)| u)
}

/// Candidates for extendable vertex `u`: every `cs(u)` entry not already
/// used as an image, that is a data-graph neighbor of every already-mapped
/// DAG-parent's image (and, under `--strict-edge-labels`, whose edge label
/// to that parent matches). Ordered ascending by data-graph degree, ties
/// by ascending vertex id.
fn extendable_candidates<CS: CandidateSet>(
    data: &Graph,
    query: &Graph,
    dag: &QueryDag,
    cs: &CS,
    mapping: &[Option<VertexId>],
    visited: &BitVec,
    u: VertexId,
    config: &SearchConfig,
) -> Vec<VertexId> {
    let parents = dag.parents(u);
    let parent_images: Vec<VertexId> = parents
        .iter()
        .map(|&p| mapping[p as usize].expect("DAG-parent of an extendable vertex is mapped"))
        .collect();

    let mut accepted = Vec::new();

    for i in 0..cs.size(u) {
        let w = cs.get(u, i);
        if visited[w as usize] {
            continue;
        }

        let mut is_connected = true;
        for (&p, &v_parent) in parents.iter().zip(parent_images.iter()) {
            if !data.is_neighbor(v_parent, w) {
                is_connected = false;
                break;
            }
            if config.strict_edge_labels {
                if let (Some(query_label), Some(data_label)) =
                    (query.edge_label(p, u), data.edge_label(v_parent, w))
                {
                    if query_label != data_label {
                        is_connected = false;
                        break;
                    }
                }
            }
        }

        if is_connected {
            accepted.push(w);
        }
    }

    accepted.sort_by_key(|&w| (data.degree(w), w));
    accepted
}
