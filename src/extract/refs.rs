use crate::xml::Element;

const REF_TAG: &str = "extsysref";
const MATRIX_ATTR: &str = "matrix";
const IDREF_ATTR: &str = "idref";

/// Identifiers referenced by a subtree's cross-system markers: every
/// descendant `extsysref` whose `matrix` attribute is the literal `"true"`,
/// in document order, duplicates kept. A marker without an `idref`
/// attribute carries no value and is skipped.
pub fn reference_ids(elem: Option<&Element>) -> Vec<String> {
    let Some(elem) = elem else {
        return Vec::new();
    };
    elem.descendants()
        .filter(|e| e.tag == REF_TAG && e.attr(MATRIX_ATTR) == Some("true"))
        .filter_map(|e| e.attr(IDREF_ATTR).map(str::to_string))
        .collect()
}
