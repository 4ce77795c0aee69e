//! Full pipeline over a real tantivy index: open, replay a small log from
//! multiple workers, and write the CSV report.

use std::sync::atomic::{AtomicUsize, Ordering};

use querylog_harness::{
    load_queries, write_csv, FulltextIndex, QueryLogRunner, RunnerConfig,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tantivy::schema::{Schema, STORED, TEXT};
use tantivy::{doc, Index, IndexWriter};
use tempfile::TempDir;

const VOCABULARY: &[&str] = &[
    "graph", "vector", "storage", "snapshot", "mutation", "channel", "worker", "index",
    "segment", "query", "latency", "barrier",
];

/// Build a disk index of `num_docs` documents. Every document contains the
/// term `common`; every even-numbered document also contains `evenmarker`.
fn build_index(dir: &std::path::Path, num_docs: usize) {
    let mut builder = Schema::builder();
    let title = builder.add_text_field("title", TEXT | STORED);
    let body = builder.add_text_field("body", TEXT);
    let index = Index::create_in_dir(dir, builder.build()).unwrap();

    let mut rng = StdRng::seed_from_u64(42);
    let mut writer: IndexWriter = index.writer(50_000_000).unwrap();
    for i in 0..num_docs {
        let filler: Vec<&str> = (0..5)
            .map(|_| VOCABULARY[rng.gen_range(0..VOCABULARY.len())])
            .collect();
        let marker = if i % 2 == 0 { "evenmarker" } else { "oddmarker" };
        writer
            .add_document(doc!(
                title => format!("doc {i}"),
                body => format!("common {} {}", marker, filler.join(" ")),
            ))
            .unwrap();
    }
    writer.commit().unwrap();
}

#[test]
fn replay_against_disk_index_end_to_end() {
    const DOCS: usize = 50;

    let temp = TempDir::new().unwrap();
    let index_dir = temp.path().join("index");
    std::fs::create_dir_all(&index_dir).unwrap();
    build_index(&index_dir, DOCS);

    let index = FulltextIndex::open(&index_dir).unwrap();

    let queries = vec![
        "common".to_string(),
        "evenmarker".to_string(),
        "\"unterminated phrase".to_string(),
        "absentterm".to_string(),
    ];
    let config = RunnerConfig {
        max_results: 100,
        result_offset: 0,
    };
    let runner = QueryLogRunner::with_config(queries, config).unwrap();

    let engines_built = AtomicUsize::new(0);
    let report = runner
        .run(2, |_| {
            engines_built.fetch_add(1, Ordering::SeqCst);
            Ok(index.engine())
        })
        .unwrap();

    assert_eq!(engines_built.load(Ordering::SeqCst), 2);
    assert_eq!(report.query_count, 4);
    assert_eq!(report.failed_queries, 1);

    assert!(report.outcomes[0].succeeded);
    assert_eq!(report.outcomes[0].match_count, DOCS);
    assert!(report.outcomes[1].succeeded);
    assert_eq!(report.outcomes[1].match_count, DOCS / 2);
    assert!(!report.outcomes[2].succeeded);
    assert!(report.outcomes[3].succeeded);
    assert_eq!(report.outcomes[3].match_count, 0);

    // CSV rows come out in query-log order with FAILED markers.
    let csv_path = temp.path().join("results.csv");
    write_csv(&csv_path, runner.queries(), &report).unwrap();
    let contents = std::fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with(&format!("common,{DOCS},")));
    assert!(lines[1].starts_with(&format!("evenmarker,{},", DOCS / 2)));
    assert_eq!(lines[2], "\"unterminated phrase,FAILED,FAILED");
    assert!(lines[3].starts_with("absentterm,0,"));
}

#[test]
fn open_rejects_missing_index() {
    let temp = TempDir::new().unwrap();
    assert!(FulltextIndex::open(&temp.path().join("nowhere")).is_err());
}

#[test]
fn query_log_round_trip_through_loader() {
    let temp = TempDir::new().unwrap();
    let log_path = temp.path().join("queries.log");
    std::fs::write(&log_path, "common\nevenmarker\n\n").unwrap();

    let queries = load_queries(&log_path).unwrap();
    assert_eq!(queries, vec!["common", "evenmarker"]);
}
