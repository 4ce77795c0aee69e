//! Tantivy-backed query engine for replaying logs against an on-disk index.
//!
//! [`FulltextIndex`] opens the index once and hands out one
//! [`FulltextEngine`] per worker; each engine owns its own searcher and
//! query parser, so workers never share engine state.

use std::path::Path;

use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::{Field, FieldType};
use tantivy::{DocAddress, Index, IndexReader, Searcher};
use tracing::info;

use crate::engine::{EngineError, QueryEngine, SearchHit};

/// An opened tantivy index plus the plumbing shared by per-worker engines.
pub struct FulltextIndex {
    index: Index,
    reader: IndexReader,
    default_fields: Vec<Field>,
}

impl FulltextIndex {
    /// Open an existing index directory.
    ///
    /// Every indexed text field in the schema becomes a query-parser
    /// default, so bare terms in the log search all text content.
    pub fn open(dir: &Path) -> Result<Self, EngineError> {
        let index = Index::open_in_dir(dir).map_err(|e| {
            EngineError::Io(format!("failed to open index at {}: {e}", dir.display()))
        })?;

        let schema = index.schema();
        let default_fields: Vec<Field> = schema
            .fields()
            .filter(|(_, entry)| {
                entry.is_indexed() && matches!(entry.field_type(), FieldType::Str(_))
            })
            .map(|(field, _)| field)
            .collect();
        if default_fields.is_empty() {
            return Err(EngineError::Build(
                "index schema has no indexed text fields to query".to_string(),
            ));
        }

        let reader = index.reader().map_err(|e| EngineError::Io(e.to_string()))?;

        info!(path = %dir.display(), fields = default_fields.len(), "opened fulltext index");
        Ok(Self {
            index,
            reader,
            default_fields,
        })
    }

    /// Build a per-worker engine with its own searcher and parser.
    pub fn engine(&self) -> FulltextEngine {
        FulltextEngine {
            searcher: self.reader.searcher(),
            parser: QueryParser::for_index(&self.index, self.default_fields.clone()),
        }
    }
}

/// One worker's handle on the index: a pinned searcher plus query parser.
pub struct FulltextEngine {
    searcher: Searcher,
    parser: QueryParser,
}

impl QueryEngine for FulltextEngine {
    fn process(
        &mut self,
        query: &str,
        offset: usize,
        max_results: usize,
        out: &mut Vec<SearchHit>,
    ) -> Result<(), EngineError> {
        let parsed = self
            .parser
            .parse_query(query)
            .map_err(|e| EngineError::Parse(e.to_string()))?;

        // TopDocs rejects a zero limit.
        let collector = TopDocs::with_limit(max_results.max(1)).and_offset(offset);
        let hits = self
            .searcher
            .search(&*parsed, &collector)
            .map_err(|e| EngineError::Io(e.to_string()))?;

        for (score, address) in hits {
            out.push(SearchHit {
                doc: pack_address(address),
                score,
            });
        }
        Ok(())
    }
}

fn pack_address(address: DocAddress) -> u64 {
    (u64::from(address.segment_ord) << 32) | u64::from(address.doc_id)
}
