//! Extraction of structured occupation records from BERUFENET XML dumps
//! and their reshaping into field-partitioned, row-per-observation tables.

pub mod config;
pub mod corpus;
pub mod error;
pub mod extract;
pub mod fields;
pub mod meta;
pub mod record;
pub mod table;
pub mod xml;

pub use config::{CoreColumns, Settings};
pub use corpus::{build_corpus, collect_input_files, CorpusBuild};
pub use error::{CorpusError, KeyCollision, XmlError};
pub use fields::{FieldSpec, Strategy, TagMap};
pub use meta::{build_meta, MetaBuild, MetaRecord};
pub use record::{DocumentKey, Record, Value};
pub use table::Table;
