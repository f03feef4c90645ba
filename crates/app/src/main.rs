use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use graph_core::{
    load_candidate_set, load_data_graph, load_query_graph, print_all_matches, Error, QueryDag,
    SearchConfig, WriterSink,
};
use log::LevelFilter;

/// Enumerates every subgraph isomorphic embedding of a query graph into a
/// data graph, subject to vertex-label compatibility and edge preservation.
#[derive(Debug, Parser)]
#[command(author, version, about, propagate_version = true)]
struct Cli {
    /// Path to the data graph, in the `t`/`v`/`e` text format.
    data_graph: PathBuf,

    /// Path to the query graph, same text format as the data graph.
    query_graph: PathBuf,

    /// Path to the precomputed candidate set (`c`/per-vertex text format).
    candidates: PathBuf,

    /// Also require edge labels to match between a DAG-parent edge and its
    /// data-graph counterpart. Off by default: edge labels are parsed but
    /// otherwise unused.
    #[arg(long)]
    strict_edge_labels: bool,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    if std::env::var_os("RUST_LOG").is_some() {
        env_logger::init();
        return;
    }
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    let (data_graph, label_map) = load_data_graph(&cli.data_graph)?;
    let query_graph = load_query_graph(&cli.query_graph, &label_map)?;
    let candidates = load_candidate_set(&cli.candidates)?;
    let dag = QueryDag::build(&query_graph, &data_graph)?;

    let config = SearchConfig {
        strict_edge_labels: cli.strict_edge_labels,
    };

    let stdout = std::io::stdout();
    let mut sink = WriterSink::new(stdout.lock());
    print_all_matches(
        &data_graph,
        &query_graph,
        &dag,
        &candidates,
        &config,
        &mut sink,
    )
    .map_err(|source| Error::Io {
        path: PathBuf::from("<stdout>"),
        source,
    })?;

    Ok(())
}
