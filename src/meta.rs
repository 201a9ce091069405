use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::corpus;
use crate::error::CorpusError;
use crate::xml::{self, Element};

/// Attributes of one occupation from the metadata dumps, flattened. The
/// `nf_` / `vg_` groups carry the successor and predecessor occupation
/// when the entry names one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetaRecord {
    pub dkz_id: i64,
    pub codenr: Option<String>,
    /// Digits 2..7 of the code number, the five-digit occupational group.
    pub fuenfsteller: Option<i64>,
    pub kurzbezeichnung: Option<String>,
    pub qualistufe: Option<String>,
    pub reglementiert: Option<String>,
    pub bkgr: Option<String>,
    pub nf_dkz_id: Option<i64>,
    pub nf_codenr: Option<String>,
    pub nf_fuenfsteller: Option<i64>,
    pub nf_kurzbezeichnung: Option<String>,
    pub vg_dkz_id: Option<i64>,
    pub vg_codenr: Option<String>,
    pub vg_fuenfsteller: Option<i64>,
    pub vg_kurzbezeichnung: Option<String>,
}

/// Outcome of one metadata build.
#[derive(Debug)]
pub struct MetaBuild {
    pub records: Vec<MetaRecord>,
    pub files: usize,
    /// Files dropped because they could not be read or parsed.
    pub skipped: usize,
}

/// Parse every metadata document under `dir` into one flat record list,
/// in sorted file order. Unlike the description corpus there is no
/// uniqueness rule; repeated ids across dumps simply repeat.
pub fn build_meta(dir: &Path, prefix: &str) -> MetaBuild {
    let files = corpus::collect_input_files(dir, prefix);
    info!(files = files.len(), dir = %dir.display(), "parsing occupation metadata");

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for path in &files {
        match parse_meta_file(path) {
            Ok(mut recs) => records.append(&mut recs),
            Err(err) => {
                warn!("{err}");
                skipped += 1;
            }
        }
    }
    MetaBuild { records, files: files.len(), skipped }
}

/// Parse the occupation entries of one metadata document. Entries without
/// a usable integer id are logged and skipped.
pub fn parse_meta_file(path: &Path) -> Result<Vec<MetaRecord>, CorpusError> {
    let raw = fs::read_to_string(path).map_err(|err| CorpusError::MalformedDocument {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    let root = xml::parse_document(&raw).map_err(|err| CorpusError::MalformedDocument {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;

    let mut records = Vec::new();
    for beruf in root.children_by_tag("beruf") {
        match meta_record(beruf) {
            Some(rec) => records.push(rec),
            None => {
                warn!(path = %path.display(), "occupation entry without usable id, skipping");
            }
        }
    }
    Ok(records)
}

fn meta_record(beruf: &Element) -> Option<MetaRecord> {
    let dkz_id = beruf.attr("id")?.parse::<i64>().ok()?;
    let codenr = beruf.attr("codenr").map(str::to_string);
    let mut rec = MetaRecord {
        dkz_id,
        fuenfsteller: fuenfsteller(codenr.as_deref()),
        codenr,
        kurzbezeichnung: beruf.attr("kurzbezeichnung").map(str::to_string),
        qualistufe: beruf.attr("qualistufe").map(str::to_string),
        reglementiert: beruf.attr("reglementiert").map(str::to_string),
        bkgr: beruf.attr("bkgr").map(str::to_string),
        ..Default::default()
    };
    if let Some(nachf) = beruf.children_by_tag("nachfolger").next() {
        rec.nf_dkz_id = nachf.attr("id").and_then(|v| v.parse().ok());
        rec.nf_codenr = nachf.attr("codenr").map(str::to_string);
        rec.nf_fuenfsteller = fuenfsteller(rec.nf_codenr.as_deref());
        rec.nf_kurzbezeichnung = nachf.attr("kurzbezeichnung").map(str::to_string);
    }
    if let Some(vorg) = beruf.children_by_tag("vorgaenger").next() {
        rec.vg_dkz_id = vorg.attr("id").and_then(|v| v.parse().ok());
        rec.vg_codenr = vorg.attr("codenr").map(str::to_string);
        rec.vg_fuenfsteller = fuenfsteller(rec.vg_codenr.as_deref());
        rec.vg_kurzbezeichnung = vorg.attr("kurzbezeichnung").map(str::to_string);
    }
    Some(rec)
}

/// Code numbers read like `B 10000-101`; positions 2..7 hold the group.
fn fuenfsteller(codenr: Option<&str>) -> Option<i64> {
    codenr.and_then(|c| c.get(2..7)).and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const META_DIR: &str = "tests/fixtures/meta";

    #[test]
    fn parses_entries_with_relations() {
        let recs = parse_meta_file(Path::new("tests/fixtures/meta/berufe_2023.xml")).unwrap();
        assert_eq!(recs.len(), 2);

        let a = &recs[0];
        assert_eq!(a.dkz_id, 1000);
        assert_eq!(a.codenr.as_deref(), Some("B 10000-101"));
        assert_eq!(a.fuenfsteller, Some(10000));
        assert_eq!(a.kurzbezeichnung.as_deref(), Some("Beruf A"));
        assert_eq!(a.qualistufe.as_deref(), Some("1"));
        assert_eq!(a.reglementiert, None);
        assert_eq!(a.nf_dkz_id, Some(1001));
        assert_eq!(a.nf_fuenfsteller, Some(20000));
        assert_eq!(a.nf_kurzbezeichnung.as_deref(), Some("Beruf B"));
        assert_eq!(a.vg_dkz_id, None);

        let b = &recs[1];
        assert_eq!(b.dkz_id, 2000);
        assert_eq!(b.vg_dkz_id, Some(1999));
        assert_eq!(b.vg_codenr.as_deref(), Some("B 20000-201"));
        assert_eq!(b.nf_dkz_id, None);
    }

    #[test]
    fn entry_without_id_is_skipped() {
        let recs = parse_meta_file(Path::new("tests/fixtures/meta/berufe_broken_entry.xml"))
            .unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].dkz_id, 3000);
    }

    #[test]
    fn build_walks_every_file() {
        let built = build_meta(Path::new(META_DIR), "berufe");
        assert_eq!(built.files, 2);
        assert_eq!(built.skipped, 0);
        assert_eq!(built.records.len(), 3);
        // sorted file order keeps dump order stable
        assert_eq!(built.records[0].dkz_id, 1000);
        assert_eq!(built.records[2].dkz_id, 3000);
    }

    #[test]
    fn fuenfsteller_slice() {
        assert_eq!(fuenfsteller(Some("B 10000-101")), Some(10000));
        assert_eq!(fuenfsteller(Some("B 123")), None);
        assert_eq!(fuenfsteller(None), None);
    }
}
