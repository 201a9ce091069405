use std::collections::HashSet;

use crate::record::{Record, Value};

/// In-memory corpus table: the ordered union of every row's columns, a
/// designated key column set and the rows themselves in input order. Cells
/// a row never set are simply absent; readers treat them as null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    key: Vec<String>,
    rows: Vec<Record>,
}

impl Table {
    /// Build a table from assembled records. The column list is the union
    /// of row columns in first-seen order.
    pub fn from_records(rows: Vec<Record>, key: Vec<String>) -> Self {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for col in row.columns() {
                if seen.insert(col) {
                    columns.push(col.to_string());
                }
            }
        }
        Table { columns, key, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn key(&self) -> &[String] {
        &self.key
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn project(&self, columns: Vec<String>) -> Table {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut out = Record::new();
                for col in &columns {
                    if let Some(v) = row.get(col) {
                        out.insert(col.clone(), v.clone());
                    }
                }
                out
            })
            .collect();
        Table { columns, key: self.key.clone(), rows }
    }

    /// Split the table into per-field views: for each tag, the key columns
    /// plus every column named `<tag>_...`. Tags with no matching column
    /// are omitted. Order follows the given tag order.
    pub fn partition_by_field<'a, I>(&self, tags: I) -> Vec<(String, Table)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut out = Vec::new();
        for tag in tags {
            let prefix = format!("{tag}_");
            let matched: Vec<String> =
                self.columns.iter().filter(|c| c.starts_with(&prefix)).cloned().collect();
            if matched.is_empty() {
                continue;
            }
            let mut cols = self.key.clone();
            cols.extend(matched);
            out.push((tag.to_string(), self.project(cols)));
        }
        out
    }

    /// Row-normalize one list column: every element becomes its own row
    /// with all other cells repeated. An empty list leaves a single null
    /// row; a row whose cell is not a list passes through unchanged. Row
    /// identity in the result is positional, so the key designation is
    /// dropped.
    pub fn explode(&self, column: &str) -> Table {
        let mut rows = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            match row.get(column) {
                Some(Value::List(items)) if !items.is_empty() => {
                    for item in items {
                        let mut out = row.clone();
                        out.insert(column.to_string(), Value::Text(item.clone()));
                        rows.push(out);
                    }
                }
                Some(Value::List(_)) => {
                    let mut out = row.clone();
                    out.insert(column.to_string(), Value::Null);
                    rows.push(out);
                }
                _ => rows.push(row.clone()),
            }
        }
        Table { columns: self.columns.clone(), key: Vec::new(), rows }
    }
}
