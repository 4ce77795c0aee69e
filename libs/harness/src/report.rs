//! Run reporting: console summary, latency statistics, CSV output.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{ensure, Context, Result};

use crate::outcome::QueryOutcome;

/// Aggregate results of one replay run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Worker threads used for the run.
    pub thread_count: usize,
    /// Queries replayed per pass.
    pub query_count: usize,
    /// Interval between the measurement gate release and the finish gate
    /// release: the window in which every worker was doing measured work.
    pub elapsed: Duration,
    /// Queries the engine rejected during the measurement pass.
    pub failed_queries: usize,
    /// Per-query measurement outcomes, in query-log order.
    pub outcomes: Vec<QueryOutcome>,
}

impl RunReport {
    /// Queries per second over the measured interval.
    ///
    /// Failed queries stay in the numerator: they consumed a slot during
    /// measurement, and keeping them makes QPS comparable across runs with
    /// differing failure counts.
    pub fn qps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.query_count as f64 / secs
        } else {
            0.0
        }
    }

    /// Latency statistics over successful measured queries.
    pub fn latency_stats(&self) -> LatencyStats {
        LatencyStats::from_durations(
            self.outcomes
                .iter()
                .filter(|o| o.succeeded)
                .map(|o| o.duration),
        )
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Query Replay Results ===")?;
        writeln!(f, "Thread count: {}", self.thread_count)?;
        writeln!(f, "Query count: {}", self.query_count)?;
        writeln!(f, "Total time (synchronized): {:.6}s", self.elapsed.as_secs_f64())?;
        writeln!(f, "QPS: {:.1}", self.qps())?;
        let stats = self.latency_stats();
        if stats.count > 0 {
            writeln!(f, "Latency: {}", stats.summary())?;
        }
        if self.failed_queries > 0 {
            writeln!(f, "WARNING: {} queries failed to execute.", self.failed_queries)?;
        }
        Ok(())
    }
}

/// Latency statistics from a replay run.
#[derive(Debug, Clone, Default)]
pub struct LatencyStats {
    /// Average latency in milliseconds
    pub avg_ms: f64,
    /// Median (p50) latency in milliseconds
    pub p50_ms: f64,
    /// 95th percentile latency in milliseconds
    pub p95_ms: f64,
    /// 99th percentile latency in milliseconds
    pub p99_ms: f64,
    /// Minimum latency in milliseconds
    pub min_ms: f64,
    /// Maximum latency in milliseconds
    pub max_ms: f64,
    /// Number of measurements
    pub count: usize,
}

impl LatencyStats {
    /// Compute latency statistics from per-query durations.
    pub fn from_durations(durations: impl IntoIterator<Item = Duration>) -> Self {
        let mut sorted: Vec<f64> = durations
            .into_iter()
            .map(|d| d.as_secs_f64() * 1e3)
            .collect();
        if sorted.is_empty() {
            return Self::default();
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let sum: f64 = sorted.iter().sum();
        Self {
            avg_ms: sum / sorted.len() as f64,
            p50_ms: percentile(&sorted, 50.0),
            p95_ms: percentile(&sorted, 95.0),
            p99_ms: percentile(&sorted, 99.0),
            min_ms: sorted[0],
            max_ms: sorted[sorted.len() - 1],
            count: sorted.len(),
        }
    }

    /// Format as a summary string.
    pub fn summary(&self) -> String {
        format!(
            "avg={:.3}ms, p50={:.3}ms, p95={:.3}ms, p99={:.3}ms, max={:.3}ms",
            self.avg_ms, self.p50_ms, self.p95_ms, self.p99_ms, self.max_ms
        )
    }
}

/// Nearest-rank percentile over an ascending-sorted slice.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
}

/// Write per-query rows in original log order.
///
/// Row format is `query,matchCount,elapsedSeconds`, or
/// `query,FAILED,FAILED` for a query the engine rejected.
pub fn write_csv(path: &Path, queries: &[String], report: &RunReport) -> Result<()> {
    ensure!(
        queries.len() == report.outcomes.len(),
        "query log length {} does not match outcome count {}",
        queries.len(),
        report.outcomes.len()
    );

    let file = File::create(path)
        .with_context(|| format!("failed to create results file {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for (query, outcome) in queries.iter().zip(&report.outcomes) {
        if outcome.succeeded {
            writeln!(
                writer,
                "{},{},{:.6}",
                query,
                outcome.match_count,
                outcome.duration.as_secs_f64()
            )?;
        } else {
            writeln!(writer, "{},FAILED,FAILED", query)?;
        }
    }

    writer
        .flush()
        .with_context(|| format!("failed to flush results file {}", path.display()))?;
    Ok(())
}
