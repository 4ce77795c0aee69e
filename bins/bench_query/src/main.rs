//! Query-log replay benchmark CLI.
//!
//! Replays a query log against a tantivy index from a configurable number
//! of worker threads (one warm-up pass, one measured pass) and writes
//! per-query match counts and timings as CSV.
//!
//! ```bash
//! bench_query --threads 8 ./index queries.log results.csv
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use querylog_harness::{load_queries, write_csv, FulltextIndex, QueryLogRunner, RunnerConfig};

#[derive(Parser)]
#[command(name = "bench_query")]
#[command(version, about = "Concurrent query-log replay benchmark over a fulltext index")]
struct Cli {
    /// The number of query processing threads
    #[arg(short = 't', long = "threads", default_value_t = 1)]
    threads: usize,

    /// The index directory
    index: PathBuf,

    /// The query log file, one query per line
    queries: PathBuf,

    /// The output file with match counts and timings for each query
    outfile: PathBuf,

    /// Result cap passed to the engine for every query
    #[arg(long, default_value_t = 1000)]
    max_results: usize,
}

fn main() -> Result<()> {
    // Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // Setup failures abort here, before any worker thread exists.
    let index = FulltextIndex::open(&cli.index)
        .with_context(|| format!("failed to open index {}", cli.index.display()))?;
    let queries = load_queries(&cli.queries)?;

    let config = RunnerConfig {
        max_results: cli.max_results,
        ..Default::default()
    };
    let runner = QueryLogRunner::with_config(queries, config)?;

    let report = runner.run(cli.threads, |_| Ok(index.engine()))?;

    write_csv(&cli.outfile, runner.queries(), &report)
        .with_context(|| format!("failed to write results to {}", cli.outfile.display()))?;

    println!("{report}");
    Ok(())
}
