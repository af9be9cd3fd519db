//! Entity universe: which entities a sync run covers.
//!
//! Sources, in priority order: symbols given on the command line, a universe CSV
//! file, then the `symbols` list of the config.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::SyncConfig;

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("failed to read universe file {path}: {source}")]
    Read { path: PathBuf, source: csv::Error },
    #[error("universe file {path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: String },
}

/// Read entity identifiers from `column` of a CSV file.
///
/// Values are trimmed; blanks are skipped and duplicates dropped keeping the first
/// occurrence.
pub fn load_entities(path: &Path, column: &str) -> Result<Vec<String>, UniverseError> {
    let read_err = |source| UniverseError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(read_err)?;

    let headers = reader.headers().map_err(read_err)?.clone();
    let index = headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == column)
        .ok_or_else(|| UniverseError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        })?;

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record.map_err(read_err)?;
        if let Some(value) = record.get(index) {
            values.push(value.to_string());
        }
    }
    Ok(dedup_entities(values))
}

/// Trim, drop blanks and remove duplicates preserving first occurrence.
pub fn dedup_entities<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter_map(|v| {
            let v = v.as_ref().trim();
            (!v.is_empty() && seen.insert(v.to_string())).then(|| v.to_string())
        })
        .collect()
}

/// Resolve the entities for a run.
pub fn resolve_entities(
    config: &SyncConfig,
    cli_symbols: &[String],
    universe_override: Option<&Path>,
) -> Result<Vec<String>, UniverseError> {
    if !cli_symbols.is_empty() {
        return Ok(dedup_entities(cli_symbols));
    }
    if let Some(path) = universe_override.or(config.universe.path.as_deref()) {
        return load_entities(path, &config.universe.column);
    }
    Ok(dedup_entities(&config.symbols))
}
