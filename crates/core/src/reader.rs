use std::{fs::File, path::Path};

use linereader::LineReader;
use log::info;

use crate::{candidates::InMemoryCandidateSet, csr::Graph, label::LabelMap, Error, Result, VertexId};

/// Loads the data graph `G` and returns it alongside the [`LabelMap`] that
/// canonicalized its labels. The map must be threaded into
/// [`load_query_graph`] so the query graph shares the same canonicalization.
pub fn load_data_graph(path: impl AsRef<Path>) -> Result<(Graph, LabelMap)> {
    let raw = parse_graph_records(path.as_ref())?;
    let label_map = LabelMap::build(raw.labels.iter().copied());
    let labels = raw.labels.iter().map(|&l| label_map.canonicalize(l)).collect();
    let graph = Graph::build(labels, &raw.edges);
    info!("loaded data graph from {:?}", path.as_ref());
    Ok((graph, label_map))
}

/// Loads a query graph, canonicalizing its labels through a `LabelMap`
/// already built from the data graph. Labels absent from the data graph
/// map to the `-1` sentinel (no candidate can ever satisfy them).
pub fn load_query_graph(path: impl AsRef<Path>, label_map: &LabelMap) -> Result<Graph> {
    let raw = parse_graph_records(path.as_ref())?;
    let labels = raw
        .labels
        .iter()
        .map(|&l| label_map.canonicalize(l))
        .collect();
    let graph = Graph::build(labels, &raw.edges);
    info!("loaded query graph from {:?}", path.as_ref());
    Ok(graph)
}

struct RawRecords {
    labels: Vec<i32>,
    edges: Vec<(VertexId, VertexId, i32)>,
}

/// Parses the graph text format: a `t <graph_id> <num_vertices>` header,
/// followed by `v <id> <label>` and `e <v1> <v2> <label>` records in any
/// order. Vertex records are expected to cover every id in
/// `0..num_vertices` exactly once; a missing vertex record is a
/// malformed-input error rather than an implicit label-0 default, since
/// silently defaulting would corrupt label canonicalization.
fn parse_graph_records(path: &Path) -> Result<RawRecords> {
    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut lines = LineReader::new(file);
    let mut line_no = 0usize;

    let header = read_line(&mut lines, path, &mut line_no)?
        .ok_or_else(|| parse_error(path, line_no, "expected header line"))?;
    let header_tokens = tokenize(header);
    if header_tokens.len() != 3 || header_tokens[0] != "t" {
        return Err(parse_error(
            path,
            line_no,
            "expected header of the form 't <graph_id> <num_vertices>'",
        ));
    }
    let num_vertices: usize = parse_token(path, line_no, header_tokens[2])?;

    let mut labels: Vec<Option<i32>> = vec![None; num_vertices];
    let mut edges = Vec::new();

    while let Some(line) = read_line(&mut lines, path, &mut line_no)? {
        let tokens = tokenize(line);
        match tokens.first().copied() {
            Some("v") => {
                if tokens.len() != 3 {
                    return Err(parse_error(
                        path,
                        line_no,
                        "expected vertex record 'v <id> <label>'",
                    ));
                }
                let id: usize = parse_token(path, line_no, tokens[1])?;
                let label: i32 = parse_token(path, line_no, tokens[2])?;
                if id >= num_vertices {
                    return Err(parse_error(
                        path,
                        line_no,
                        format!("vertex id {id} out of range 0..{num_vertices}"),
                    ));
                }
                labels[id] = Some(label);
            }
            Some("e") => {
                if tokens.len() != 4 {
                    return Err(parse_error(
                        path,
                        line_no,
                        "expected edge record 'e <v1> <v2> <label>'",
                    ));
                }
                let v1: VertexId = parse_token(path, line_no, tokens[1])?;
                let v2: VertexId = parse_token(path, line_no, tokens[2])?;
                let label: i32 = parse_token(path, line_no, tokens[3])?;
                edges.push((v1, v2, label));
            }
            Some(other) => {
                return Err(parse_error(
                    path,
                    line_no,
                    format!("unrecognized record type '{other}'"),
                ))
            }
            None => continue,
        }
    }

    let labels = labels
        .into_iter()
        .enumerate()
        .map(|(id, l)| {
            l.ok_or_else(|| parse_error(path, 0, format!("missing vertex record for id {id}")))
        })
        .collect::<Result<Vec<i32>>>()?;

    Ok(RawRecords { labels, edges })
}

/// Loads a candidate set from the `c <num_query_vertices>` / `<u> <size>
/// <cand_0> … <cand_size-1>` text format (§ candidate set format).
pub fn load_candidate_set(path: impl AsRef<Path>) -> Result<InMemoryCandidateSet> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut lines = LineReader::new(file);
    let mut line_no = 0usize;

    let header = read_line(&mut lines, path, &mut line_no)?
        .ok_or_else(|| parse_error(path, line_no, "expected header line"))?;
    let header_tokens = tokenize(header);
    if header_tokens.len() != 2 || header_tokens[0] != "c" {
        return Err(parse_error(
            path,
            line_no,
            "expected header of the form 'c <num_query_vertices>'",
        ));
    }
    let num_query_vertices: usize = parse_token(path, line_no, header_tokens[1])?;

    let mut candidates: Vec<Option<Vec<VertexId>>> = vec![None; num_query_vertices];

    while let Some(line) = read_line(&mut lines, path, &mut line_no)? {
        let tokens = tokenize(line);
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() < 2 {
            return Err(parse_error(
                path,
                line_no,
                "expected candidate record '<u> <size> <cand_0> ...'",
            ));
        }
        let u: usize = parse_token(path, line_no, tokens[0])?;
        let size: usize = parse_token(path, line_no, tokens[1])?;
        if tokens.len() != 2 + size {
            return Err(parse_error(
                path,
                line_no,
                format!("candidate record declares size {size} but lists {} ids", tokens.len().saturating_sub(2)),
            ));
        }
        if u >= num_query_vertices {
            return Err(parse_error(
                path,
                line_no,
                format!("query vertex id {u} out of range 0..{num_query_vertices}"),
            ));
        }
        let ids = tokens[2..]
            .iter()
            .map(|t| parse_token(path, line_no, t))
            .collect::<Result<Vec<VertexId>>>()?;
        candidates[u] = Some(ids);
    }

    let candidates = candidates
        .into_iter()
        .enumerate()
        .map(|(u, c)| {
            c.ok_or_else(|| parse_error(path, 0, format!("missing candidate record for query vertex {u}")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(InMemoryCandidateSet::new(candidates))
}

fn read_line<'a, R: std::io::Read>(
    lines: &'a mut LineReader<R>,
    path: &Path,
    line_no: &mut usize,
) -> Result<Option<&'a str>> {
    match lines.next_line() {
        Some(Ok(bytes)) => {
            *line_no += 1;
            let text = std::str::from_utf8(bytes).map_err(|_| {
                parse_error(path, *line_no, "line is not valid UTF-8")
            })?;
            Ok(Some(text.trim_end()))
        }
        Some(Err(source)) => Err(Error::Io {
            path: path.to_path_buf(),
            source,
        }),
        None => Ok(None),
    }
}

/// Splits a line into whitespace-separated tokens. Blank lines yield an
/// empty `Vec` rather than an error — callers skip them rather than treat
/// them as malformed records.
fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

fn parse_token<T: atoi::FromRadix10SignedChecked>(
    path: &Path,
    line_no: usize,
    token: &str,
) -> Result<T> {
    atoi::atoi::<T>(token.as_bytes())
        .ok_or_else(|| parse_error(path, line_no, format!("could not parse '{token}' as a number")))
}

fn parse_error(path: &Path, line: usize, message: impl Into<String>) -> Error {
    Error::Parse {
        path: path.to_path_buf(),
        line,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_a_simple_graph() {
        let file = write_temp("t 0 3\nv 0 5\nv 1 5\nv 2 6\ne 0 1 0\ne 1 2 0\n");
        let (graph, map) = load_data_graph(file.path()).unwrap();
        assert_eq!(graph.num_vertices(), 3);
        assert_eq!(graph.num_edges(), 2);
        assert_eq!(map.num_labels(), 2);
    }

    #[test]
    fn query_graph_shares_the_data_graphs_label_map() {
        let data = write_temp("t 0 2\nv 0 5\nv 1 6\ne 0 1 0\n");
        let (_, map) = load_data_graph(data.path()).unwrap();

        let query = write_temp("t 1 1\nv 0 5\n");
        let q = load_query_graph(query.path(), &map).unwrap();
        assert_eq!(q.label(0), map.canonicalize(5));
    }

    #[test]
    fn unknown_query_label_maps_to_sentinel() {
        let data = write_temp("t 0 1\nv 0 5\n");
        let (_, map) = load_data_graph(data.path()).unwrap();

        let query = write_temp("t 1 1\nv 0 99\n");
        let q = load_query_graph(query.path(), &map).unwrap();
        assert_eq!(q.label(0), -1);
    }

    #[test]
    fn missing_vertex_record_is_a_parse_error() {
        let file = write_temp("t 0 2\nv 0 5\n");
        let err = load_data_graph(file.path()).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_data_graph("/nonexistent/path/does/not/exist.graph").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn loads_a_candidate_set() {
        let file = write_temp("c 2\n0 3 0 1 2\n1 1 3\n");
        let cs = load_candidate_set(file.path()).unwrap();
        assert_eq!(cs.num_query_vertices(), 2);
        assert_eq!(cs.size(0), 3);
        assert_eq!(cs.get(0, 2), 2);
        assert_eq!(cs.size(1), 1);
        assert_eq!(cs.get(1, 0), 3);
    }

    #[test]
    fn candidate_record_size_mismatch_is_rejected() {
        let file = write_temp("c 1\n0 2 1\n");
        let err = load_candidate_set(file.path()).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }
}
