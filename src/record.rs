use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::config::CoreColumns;
use crate::error::CorpusError;
use crate::extract;
use crate::fields::TagMap;
use crate::xml;

static DIGIT_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

/// One cell of a record. Serializes untagged, so JSON output reads as
/// plain null / number / string / array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Text(String),
    List(Vec<String>),
}

/// One document's sparse row: ordered (column, value) pairs. Re-inserting
/// a column overwrites the value but keeps the original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    cells: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Record::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        match self.cells.iter_mut().find(|(c, _)| *c == column) {
            Some((_, existing)) => *existing = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Composite identifier of one document: occupation id plus dump year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentKey {
    pub id: i64,
    pub year: i64,
}

/// Pull the composite key out of a file name: the first numeric run is the
/// occupation id, the second the year. Fewer than two runs (or a run too
/// large for an id) makes the name malformed.
pub fn parse_document_key(path: &Path) -> Result<DocumentKey, CorpusError> {
    let Some(name) = path.file_name() else {
        return Err(CorpusError::MalformedFilename { path: path.to_path_buf() });
    };
    let name = name.to_string_lossy();
    let mut runs = DIGIT_RUN_RE.find_iter(&name);
    let id = runs.next().and_then(|m| m.as_str().parse::<i64>().ok());
    let year = runs.next().and_then(|m| m.as_str().parse::<i64>().ok());
    match (id, year) {
        (Some(id), Some(year)) => Ok(DocumentKey { id, year }),
        _ => Err(CorpusError::MalformedFilename { path: path.to_path_buf() }),
    }
}

/// Read one document and build its record: identifier columns first, then
/// the column pair of every declared field present in the body.
pub fn assemble_record(
    path: &Path,
    tags: &TagMap,
    exclude: &HashSet<String>,
    columns: &CoreColumns,
) -> Result<(DocumentKey, Record), CorpusError> {
    let key = parse_document_key(path)?;
    let raw = fs::read_to_string(path).map_err(|err| CorpusError::MalformedDocument {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    let root = xml::parse_document(&raw).map_err(|err| CorpusError::MalformedDocument {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;

    let mut record = Record::new();
    record.insert(columns.id.clone(), Value::Int(key.id));
    record.insert(columns.date.clone(), Value::Int(key.year));
    extract::dispatch_fields(&root, tags, exclude, &mut record);
    Ok((key, record))
}
