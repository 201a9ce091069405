use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use tracing::{info, warn};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::config::CoreColumns;
use crate::error::{CorpusError, KeyCollision};
use crate::fields::TagMap;
use crate::record::{self, DocumentKey, Record};
use crate::table::Table;

/// Outcome of one corpus build.
#[derive(Debug)]
pub struct CorpusBuild {
    pub table: Table,
    /// Matching files found under the input directory.
    pub files: usize,
    /// Files dropped for a malformed name or body.
    pub skipped: usize,
}

/// Regular files under `dir` whose names start with `prefix`, sorted by
/// path. Sorting makes row order a pure function of the document set. An
/// unreadable directory logs a warning and reads as empty.
pub fn collect_input_files(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            let e = CorpusError::UnreadableDirectory { path: dir.to_path_buf(), source: err };
            warn!("{e}");
            return Vec::new();
        }
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().starts_with(prefix))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

/// Build the occupation corpus from every matching document under `dir`.
///
/// A document that cannot be keyed or parsed is logged and skipped; the
/// build goes on without it. A composite key shared by two surviving
/// documents is fatal.
pub fn build_corpus(
    dir: &Path,
    prefix: &str,
    tags: &TagMap,
    exclude: &HashSet<String>,
    columns: &CoreColumns,
) -> Result<CorpusBuild, CorpusError> {
    let files = collect_input_files(dir, prefix);
    info!(files = files.len(), dir = %dir.display(), "building corpus");
    from_files(&files, tags, exclude, columns)
}

/// Build the corpus table from an already-collected document list. Row
/// order is the given file order.
pub fn from_files(
    files: &[PathBuf],
    tags: &TagMap,
    exclude: &HashSet<String>,
    columns: &CoreColumns,
) -> Result<CorpusBuild, CorpusError> {
    let mut rows = Vec::with_capacity(files.len());
    let mut keyed: Vec<(DocumentKey, PathBuf)> = Vec::with_capacity(files.len());
    let mut skipped = 0usize;
    for (path, result) in files.iter().zip(assemble_all(files, tags, exclude, columns)) {
        match result {
            Ok((key, rec)) => {
                keyed.push((key, path.clone()));
                rows.push(rec);
            }
            Err(err) => {
                warn!("{err}");
                skipped += 1;
            }
        }
    }

    verify_unique_keys(&keyed)?;

    let table = Table::from_records(rows, vec![columns.id.clone(), columns.date.clone()]);
    info!(rows = table.len(), skipped, "corpus built");
    Ok(CorpusBuild { table, files: files.len(), skipped })
}

#[cfg(feature = "rayon")]
fn assemble_all(
    files: &[PathBuf],
    tags: &TagMap,
    exclude: &HashSet<String>,
    columns: &CoreColumns,
) -> Vec<Result<(DocumentKey, Record), CorpusError>> {
    files
        .par_iter()
        .map(|path| record::assemble_record(path, tags, exclude, columns))
        .collect()
}

#[cfg(not(feature = "rayon"))]
fn assemble_all(
    files: &[PathBuf],
    tags: &TagMap,
    exclude: &HashSet<String>,
    columns: &CoreColumns,
) -> Vec<Result<(DocumentKey, Record), CorpusError>> {
    files
        .iter()
        .map(|path| record::assemble_record(path, tags, exclude, columns))
        .collect()
}

fn verify_unique_keys(keyed: &[(DocumentKey, PathBuf)]) -> Result<(), CorpusError> {
    let groups = keyed.iter().map(|(key, path)| (*key, path.clone())).into_group_map();
    let mut collisions: Vec<KeyCollision> = groups
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .map(|(key, paths)| KeyCollision { id: key.id, year: key.year, paths })
        .collect();
    if collisions.is_empty() {
        return Ok(());
    }
    collisions.sort_by_key(|c| (c.id, c.year));
    Err(CorpusError::DuplicateKey { collisions })
}
