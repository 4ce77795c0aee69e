//! Shared mock engine for harness integration tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use querylog_harness::{EngineError, QueryEngine, SearchHit};

/// Query log whose entries encode their own index (`q0000`, `q0001`, ...),
/// so the mock can attribute each engine call to a slot.
pub fn indexed_log(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("q{i:04}")).collect()
}

/// Shared state behind every worker's [`MockEngine`] for one run.
pub struct MockState {
    /// Engine invocations per query index, across both passes.
    pub calls: Vec<AtomicU64>,
    /// Total invocations across all workers, used to tell the warm-up pass
    /// (first `query_count` calls) from the measurement pass.
    pub total_calls: AtomicU64,
    pub query_count: usize,
    pub fail_indices: HashSet<usize>,
    pub warmup_delay: Duration,
    pub measured_delay: Duration,
}

impl MockState {
    pub fn new(query_count: usize) -> Arc<Self> {
        Arc::new(Self {
            calls: (0..query_count).map(|_| AtomicU64::new(0)).collect(),
            total_calls: AtomicU64::new(0),
            query_count,
            fail_indices: HashSet::new(),
            warmup_delay: Duration::ZERO,
            measured_delay: Duration::ZERO,
        })
    }

    pub fn with_failures(query_count: usize, fail: &[usize]) -> Arc<Self> {
        let mut state = Self::new(query_count);
        Arc::get_mut(&mut state).unwrap().fail_indices = fail.iter().copied().collect();
        state
    }

    pub fn with_delays(query_count: usize, warmup: Duration, measured: Duration) -> Arc<Self> {
        let mut state = Self::new(query_count);
        let inner = Arc::get_mut(&mut state).unwrap();
        inner.warmup_delay = warmup;
        inner.measured_delay = measured;
        state
    }
}

/// Scripted engine: match count is `index % 5`, scripted indices fail,
/// per-pass sleeps emulate engine work.
pub struct MockEngine {
    state: Arc<MockState>,
}

impl MockEngine {
    pub fn new(state: Arc<MockState>) -> Self {
        Self { state }
    }
}

impl QueryEngine for MockEngine {
    fn process(
        &mut self,
        query: &str,
        _offset: usize,
        max_results: usize,
        out: &mut Vec<SearchHit>,
    ) -> Result<(), EngineError> {
        let index: usize = query
            .strip_prefix('q')
            .and_then(|rest| rest.parse().ok())
            .ok_or_else(|| EngineError::Parse(format!("unrecognized query {query}")))?;

        let seq = self.state.total_calls.fetch_add(1, Ordering::SeqCst);
        self.state.calls[index].fetch_add(1, Ordering::SeqCst);

        let delay = if (seq as usize) < self.state.query_count {
            self.state.warmup_delay
        } else {
            self.state.measured_delay
        };
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        if self.state.fail_indices.contains(&index) {
            return Err(EngineError::Parse("scripted failure".to_string()));
        }

        for doc in 0..(index % 5).min(max_results) {
            out.push(SearchHit {
                doc: doc as u64,
                score: 1.0,
            });
        }
        Ok(())
    }
}
