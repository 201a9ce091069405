use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// One repeated composite key and every file that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCollision {
    pub id: i64,
    pub year: i64,
    pub paths: Vec<PathBuf>,
}

impl fmt::Display for KeyCollision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let paths: Vec<String> = self.paths.iter().map(|p| p.display().to_string()).collect();
        write!(f, "(id={}, year={}) from [{}]", self.id, self.year, paths.join(", "))
    }
}

/// Errors raised while building a corpus from a directory of documents.
#[derive(Error, Debug)]
pub enum CorpusError {
    /// Input directory missing or unreadable. Recovered at the call site
    /// (logged, treated as an empty document set).
    #[error("cannot read input directory {}: {source}", .path.display())]
    UnreadableDirectory { path: PathBuf, source: io::Error },

    /// File name does not carry the two numeric runs that form the key.
    #[error("file name carries fewer than two numeric runs: {}", .path.display())]
    MalformedFilename { path: PathBuf },

    /// Document could not be read or parsed into a tree.
    #[error("cannot parse document {}: {reason}", .path.display())]
    MalformedDocument { path: PathBuf, reason: String },

    /// Two or more surviving documents resolved to the same (id, year).
    /// Always fatal for the build that detects it.
    #[error("duplicate document keys: {}", format_collisions(.collisions))]
    DuplicateKey { collisions: Vec<KeyCollision> },
}

fn format_collisions(collisions: &[KeyCollision]) -> String {
    let parts: Vec<String> = collisions.iter().map(|c| c.to_string()).collect();
    parts.join("; ")
}

/// Failures while building an element tree from raw XML.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XmlError {
    #[error("XML syntax error: {0}")]
    Syntax(String),

    #[error("bad attribute on <{0}>: {1}")]
    Attribute(String, String),

    #[error("unexpected closing tag </{0}>")]
    UnexpectedClose(String),

    #[error("content after the document root")]
    TrailingContent,

    #[error("document has no root element")]
    NoRoot,

    #[error("document ended inside <{0}>")]
    Truncated(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_names_every_path() {
        let err = CorpusError::DuplicateKey {
            collisions: vec![KeyCollision {
                id: 7,
                year: 2020,
                paths: vec![PathBuf::from("a_7_2020.xml"), PathBuf::from("a_0007_2020.xml")],
            }],
        };
        let msg = err.to_string();
        assert!(msg.contains("id=7"));
        assert!(msg.contains("a_7_2020.xml"));
        assert!(msg.contains("a_0007_2020.xml"));
    }

    #[test]
    fn malformed_filename_message() {
        let err = CorpusError::MalformedFilename { path: PathBuf::from("desc.xml") };
        assert!(err.to_string().contains("desc.xml"));
    }
}
