//! Reproducible concurrent replay harness for query logs.
//!
//! Replays a fixed log of queries against an index from a configurable
//! number of worker threads: one warm-up pass over the full log, then one
//! precisely timed measurement pass, with per-query latency and match-count
//! records and an aggregate throughput summary.
//!
//! ## Components
//!
//! - [`sync`] - phase gates (single-use rendezvous barriers that record
//!   their release instant)
//! - [`work`] - lock-free distribution of query slots across workers
//! - [`outcome`] - shared per-query result buffers
//! - [`runner`] - run coordinator and worker loop
//! - [`engine`] - the query-engine seam the harness drives
//! - [`fulltext`] - tantivy-backed engine implementation
//! - [`querylog`] - query log loading
//! - [`report`] - throughput/latency reporting and CSV output
//!
//! ## Timing discipline
//!
//! Elapsed time is the interval between the release instants of the
//! measurement gate and the finish gate: the window in which every worker
//! is known to be doing measured work. Thread spawn and join overhead never
//! pollutes the throughput number.
//!
//! # Example
//!
//! ```ignore
//! use querylog_harness::{FulltextIndex, QueryLogRunner, load_queries, write_csv};
//!
//! let index = FulltextIndex::open(Path::new("./index"))?;
//! let runner = QueryLogRunner::new(load_queries(Path::new("queries.log"))?)?;
//! let report = runner.run(8, |_| Ok(index.engine()))?;
//! write_csv(Path::new("results.csv"), runner.queries(), &report)?;
//! println!("{report}");
//! ```

pub mod engine;
pub mod fulltext;
pub mod outcome;
pub mod querylog;
pub mod report;
pub mod runner;
pub mod sync;
pub mod work;

pub use engine::{EngineError, QueryEngine, SearchHit};
pub use fulltext::{FulltextEngine, FulltextIndex};
pub use outcome::QueryOutcome;
pub use querylog::load_queries;
pub use report::{write_csv, LatencyStats, RunReport};
pub use runner::{QueryLogRunner, RunnerConfig};
pub use sync::Rendezvous;
pub use work::WorkQueue;
