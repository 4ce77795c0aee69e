//! The query-engine seam the harness drives.
//!
//! The replay core treats the engine as a black box: it hands over a query
//! string and a result buffer, times the call, and records how many matches
//! came back. Engines are held one instance per worker thread and never
//! shared, so implementations need `Send` but no interior synchronization.

use thiserror::Error;

/// A single match returned by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    /// Engine-assigned document identity.
    pub doc: u64,
    /// Relevance score.
    pub score: f32,
}

/// Failures the engine can signal for one query.
///
/// All three are recoverable at the worker level: the offending query's
/// record is marked failed and the replay moves on to the next claim.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The query text does not parse under the active grammar.
    #[error("query parse error: {0}")]
    Parse(String),
    /// The parsed query cannot be compiled into an executable plan.
    #[error("query plan error: {0}")]
    Build(String),
    /// Underlying index storage failed.
    #[error("index i/o error: {0}")]
    Io(String),
}

/// Index-query engine driven by the replay harness.
pub trait QueryEngine {
    /// Execute `query`, appending up to `max_results` matches starting at
    /// `offset` into `out`. The buffer arrives cleared and is reused across
    /// calls by the worker.
    fn process(
        &mut self,
        query: &str,
        offset: usize,
        max_results: usize,
        out: &mut Vec<SearchHit>,
    ) -> Result<(), EngineError>;
}
