use std::collections::HashSet;
use std::path::PathBuf;

use config::Config;
use serde::Deserialize;
use tracing::warn;

/// Names of the identifier columns carried by every table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoreColumns {
    pub id: String,
    pub date: String,
}

impl Default for CoreColumns {
    fn default() -> Self {
        CoreColumns { id: "dkz_id".to_string(), date: "year".to_string() }
    }
}

/// Runtime settings. Defaults cover the BERUFENET raw-data layout;
/// an `occ.toml` in the working directory and `OCC_*` environment
/// variables override them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the raw XML dumps.
    pub raw_data_dir: PathBuf,
    /// File-name prefix of occupation description documents.
    pub occ_prefix: String,
    /// File-name prefix of occupation metadata documents.
    pub meta_prefix: String,
    pub columns: CoreColumns,
    /// Tags whose subtrees are dropped during text extraction.
    pub exclude_tags: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            raw_data_dir: PathBuf::from("data/raw"),
            occ_prefix: "beschreibung_beruf_".to_string(),
            meta_prefix: "berufe".to_string(),
            columns: CoreColumns::default(),
            exclude_tags: Vec::new(),
        }
    }
}

impl Settings {
    /// Layer defaults, an optional `occ.toml` and the `OCC_*` environment.
    pub fn load() -> Self {
        let cfg = Config::builder()
            .add_source(config::File::with_name("occ").required(false))
            .add_source(config::Environment::with_prefix("OCC"))
            .build()
            .unwrap_or_default();
        cfg.try_deserialize().unwrap_or_else(|err| {
            warn!(error = %err, "settings rejected, falling back to defaults");
            Settings::default()
        })
    }

    pub fn exclude_set(&self) -> HashSet<String> {
        self.exclude_tags.iter().cloned().collect()
    }
}
