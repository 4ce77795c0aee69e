//! Run coordinator and worker loop for the replay protocol.
//!
//! One run replays the whole query log twice: a warm-up pass whose values
//! are discarded, then a measurement pass whose values are kept. All
//! workers move through the passes in lock-step via three phase gates:
//!
//! ```text
//! spawn → [warm-up gate] → drain warm-up queue
//!       → [measurement gate] → drain measurement queue (timed)
//!       → [finish gate] → join
//! ```
//!
//! Between gates each worker races the others for slots on the phase's
//! [`WorkQueue`]; the measurement interval is the time between the
//! measurement gate release and the finish gate release, so spawn and join
//! overhead never counts toward throughput.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use anyhow::{anyhow, ensure, Context, Result};
use tracing::{debug, info, warn};

use crate::engine::{EngineError, QueryEngine, SearchHit};
use crate::outcome::OutcomeBuffers;
use crate::report::RunReport;
use crate::sync::{AbortGuard, Rendezvous};
use crate::work::WorkQueue;

/// Per-call engine parameters, fixed for the lifetime of a runner.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Result cap passed to the engine for every query.
    pub max_results: usize,
    /// Result offset passed to the engine for every query.
    pub result_offset: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_results: 1000,
            result_offset: 0,
        }
    }
}

/// Replays a fixed query log against an engine from a pool of worker
/// threads and reports measured throughput.
///
/// The runner owns the log and the shared result buffers; workers hold
/// only references to them plus a private engine instance. Repeat calls to
/// [`QueryLogRunner::run`] reset the buffers, so a runner can be reused
/// across thread counts.
pub struct QueryLogRunner {
    queries: Vec<String>,
    config: RunnerConfig,
    outcomes: OutcomeBuffers,
    any_failed: AtomicBool,
}

impl QueryLogRunner {
    /// Runner over `queries` with default engine parameters.
    pub fn new(queries: Vec<String>) -> Result<Self> {
        Self::with_config(queries, RunnerConfig::default())
    }

    /// Rejects an empty log up front: the slot mapping divides by the log
    /// length.
    pub fn with_config(queries: Vec<String>, config: RunnerConfig) -> Result<Self> {
        ensure!(!queries.is_empty(), "query log is empty");
        let outcomes = OutcomeBuffers::new(queries.len());
        Ok(Self {
            queries,
            config,
            outcomes,
            any_failed: AtomicBool::new(false),
        })
    }

    /// The query log, in original order.
    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    /// Replay the full log once for warm-up and once for measurement across
    /// `thread_count` workers.
    ///
    /// `make_engine` runs on the calling thread, once per worker, before
    /// any worker is spawned; a failure there aborts the run while no
    /// thread exists yet. Per-query engine failures during the run never
    /// abort it: the query's record is marked failed and replay continues.
    pub fn run<E, F>(&self, thread_count: usize, mut make_engine: F) -> Result<RunReport>
    where
        E: QueryEngine + Send,
        F: FnMut(usize) -> Result<E, EngineError>,
    {
        ensure!(thread_count >= 1, "thread count must be at least 1");

        // Clear out any values from an earlier run.
        self.outcomes.reset();
        self.any_failed.store(false, Ordering::Relaxed);

        let mut engines = Vec::with_capacity(thread_count);
        for worker in 0..thread_count {
            let engine = make_engine(worker)
                .with_context(|| format!("failed to build engine for worker {worker}"))?;
            engines.push(engine);
        }

        let query_count = self.queries.len();
        let warmup_queue = WorkQueue::new(query_count)?;
        let measured_queue = WorkQueue::new(query_count)?;
        let warmup_gate = Rendezvous::new(thread_count);
        let measurement_gate = Rendezvous::new(thread_count);
        let finish_gate = Rendezvous::new(thread_count);

        info!(threads = thread_count, queries = query_count, "starting replay workers");

        let worker_results: Vec<Result<()>> = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(thread_count);
            for mut engine in engines {
                let warmup_queue = &warmup_queue;
                let measured_queue = &measured_queue;
                let warmup_gate = &warmup_gate;
                let measurement_gate = &measurement_gate;
                let finish_gate = &finish_gate;

                handles.push(scope.spawn(move || {
                    let guard =
                        AbortGuard::new([warmup_gate, measurement_gate, finish_gate]);
                    let result = self.worker_loop(
                        &mut engine,
                        warmup_queue,
                        measured_queue,
                        warmup_gate,
                        measurement_gate,
                        finish_gate,
                    );
                    if result.is_ok() {
                        guard.disarm();
                    }
                    result
                }));
            }

            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(result) => result,
                    Err(_) => Err(anyhow!("replay worker panicked")),
                })
                .collect()
        });

        for result in worker_results {
            result?;
        }

        let measured_at = measurement_gate
            .release_instant()
            .context("measurement gate never released")?;
        let finished_at = finish_gate
            .release_instant()
            .context("finish gate never released")?;
        let elapsed = finished_at.duration_since(measured_at);

        let outcomes = self.outcomes.snapshot();
        let failed_queries = outcomes.iter().filter(|o| !o.succeeded).count();
        if self.any_failed.load(Ordering::Relaxed) {
            warn!(failed = failed_queries, "some queries failed to execute");
        }

        let report = RunReport {
            thread_count,
            query_count,
            elapsed,
            failed_queries,
            outcomes,
        };
        info!(
            elapsed_secs = report.elapsed.as_secs_f64(),
            qps = report.qps(),
            "replay finished"
        );
        Ok(report)
    }

    fn worker_loop<E: QueryEngine>(
        &self,
        engine: &mut E,
        warmup_queue: &WorkQueue,
        measured_queue: &WorkQueue,
        warmup_gate: &Rendezvous,
        measurement_gate: &Rendezvous,
        finish_gate: &Rendezvous,
    ) -> Result<()> {
        warmup_gate.arrive_and_wait()?;
        self.drain(engine, warmup_queue);
        measurement_gate.arrive_and_wait()?;
        self.drain(engine, measured_queue);
        finish_gate.arrive_and_wait()?;
        Ok(())
    }

    /// Claim and execute slots until the phase budget is exhausted.
    ///
    /// Both passes run the same path; the measurement pass simply
    /// overwrites whatever the warm-up pass recorded for each slot.
    fn drain<E: QueryEngine>(&self, engine: &mut E, queue: &WorkQueue) {
        let mut hits: Vec<SearchHit> = Vec::new();
        while let Some(index) = queue.claim() {
            hits.clear();
            let start = Instant::now();
            let result = engine.process(
                &self.queries[index],
                self.config.result_offset,
                self.config.max_results,
                &mut hits,
            );
            match result {
                Ok(()) => self.outcomes.record_success(index, start.elapsed(), hits.len()),
                Err(err) => {
                    self.outcomes.record_failure(index);
                    self.any_failed.store(true, Ordering::Relaxed);
                    debug!(index, %err, "query failed");
                }
            }
        }
    }
}
