//! Query log loading.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

/// Load a query log, one query per line. Blank lines are skipped; trailing
/// whitespace is trimmed so CRLF logs replay the same as LF logs.
pub fn load_queries(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open query log {}", path.display()))?;

    let mut queries = Vec::new();
    for line in BufReader::new(file).lines() {
        let line =
            line.with_context(|| format!("failed to read query log {}", path.display()))?;
        let trimmed = line.trim_end();
        if !trimmed.is_empty() {
            queries.push(trimmed.to_string());
        }
    }

    info!(count = queries.len(), path = %path.display(), "loaded query log");
    Ok(queries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_lines_and_skips_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queries.log");
        let mut file = File::create(&path).unwrap();
        write!(file, "first query\r\n\nsecond query\ntrailing space \n\n").unwrap();

        let queries = load_queries(&path).unwrap();
        assert_eq!(queries, vec!["first query", "second query", "trailing space"]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_queries(&dir.path().join("absent.log")).is_err());
    }
}
