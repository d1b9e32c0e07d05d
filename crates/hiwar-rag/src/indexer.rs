//! Dialogue CSV indexer
//!
//! The knowledge base ships as a CSV of agent/visitor dialogue with one
//! combined-text column. Each non-empty row becomes one indexed passage.

use std::path::Path;

use hiwar_core::{Error, Result};

use crate::store::LocalVectorStore;

/// Outcome of one indexing run
#[derive(Debug, Clone, Default)]
pub struct IndexingReport {
    pub indexed: usize,
    pub skipped: usize,
}

/// Read `column` from the CSV at `path` and index every non-empty row
/// into `store`. The caller saves the store afterwards.
pub fn index_dialogue_csv(
    store: &mut LocalVectorStore,
    path: impl AsRef<Path>,
    column: &str,
) -> Result<IndexingReport> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path.as_ref())
        .map_err(|e| Error::Retrieval(format!("cannot open dialogue data: {}", e)))?;

    let headers = reader
        .headers()
        .map_err(|e| Error::Serialization(e.to_string()))?;
    let column_index = headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| Error::InvalidInput(format!("no '{}' column in dialogue data", column)))?;

    let mut report = IndexingReport::default();

    for record in reader.records() {
        let record = record.map_err(|e| Error::Serialization(e.to_string()))?;
        let text = record.get(column_index).unwrap_or("").trim();

        if text.is_empty() {
            report.skipped += 1;
            continue;
        }

        store.index_passage(text);
        report.indexed += 1;
    }

    Ok(report)
}
