/// How a matched field's subtree becomes a cell value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// List of trimmed text fragments in document order.
    Fragments,
    /// All subtree text joined into one spaced string.
    Joined,
    /// One fragment per list-item marker.
    ListItems,
    /// Identifiers collected from cross-system reference markers.
    References,
}

/// One declared field: the tag matched against a document root's direct
/// children, a human-readable label and the extraction strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub tag: String,
    pub label: String,
    pub strategy: Strategy,
}

/// Ordered field declarations plus the marker tag used by the list-item
/// strategy. Declaration order fixes column and partition order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMap {
    pub fields: Vec<FieldSpec>,
    pub listitem_tag: String,
}

const DEFAULT_LISTITEM_TAG: &str = "listitem";

const BERUFENET_FIELDS: &[(&str, &str, Strategy)] = &[
    ("b10-1-2", "Trends", Strategy::Fragments),
    ("b11-0", "Aufgaben und Taetigkeiten kompakt", Strategy::Joined),
    ("b11-1", "Aufgaben und Taetigkeiten Beschreibung", Strategy::Fragments),
    ("b11-2", "Aufgaben und Taetigkeiten im Einzelnen", Strategy::ListItems),
    ("b12-02", "Arbeitsorte", Strategy::Fragments),
    ("b12-1", "Branchen im Einzelnen", Strategy::Fragments),
    ("b15-0", "Arbeitsgegenstaende / Arbeitsmittel", Strategy::Fragments),
    ("b20-2", "Faehigkeiten, Kenntnisse, Fertigkeiten", Strategy::Fragments),
    ("b20-32", "Kompetenzen", Strategy::References),
    ("b40-02", "Digitalisierung", Strategy::Fragments),
    ("b50-0", "Verdienst", Strategy::Fragments),
];

impl TagMap {
    pub fn new(fields: Vec<FieldSpec>, listitem_tag: impl Into<String>) -> Self {
        TagMap { fields, listitem_tag: listitem_tag.into() }
    }

    /// The BERUFENET description fields this pipeline was built for.
    pub fn berufenet() -> Self {
        let fields = BERUFENET_FIELDS
            .iter()
            .map(|(tag, label, strategy)| FieldSpec {
                tag: (*tag).to_string(),
                label: (*label).to_string(),
                strategy: *strategy,
            })
            .collect();
        TagMap::new(fields, DEFAULT_LISTITEM_TAG)
    }

    pub fn get(&self, tag: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.tag == tag)
    }

    /// Declared tags in declaration order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.tag.as_str())
    }

    /// The first field using the list-item strategy, if any. This is the
    /// column the task exploder runs on.
    pub fn list_field(&self) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.strategy == Strategy::ListItems)
    }
}
