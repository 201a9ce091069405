pub mod refs;
pub mod text;

use std::collections::HashSet;

use crate::fields::{Strategy, TagMap};
use crate::record::{Record, Value};
use crate::xml::Element;

/// Column suffix carrying a field's extracted content.
pub const TEXT_SUFFIX: &str = "_text";
/// Column suffix carrying a field's revision date attribute.
pub const REV_SUFFIX: &str = "_revd";

const REV_ATTR: &str = "rev";

/// Match every declared field against the document root's direct children
/// and write the resulting column pairs into the record. A later match of
/// the same tag overwrites the earlier pair; an unmatched tag writes
/// nothing, leaving the record sparse.
pub fn dispatch_fields(
    root: &Element,
    tags: &TagMap,
    exclude: &HashSet<String>,
    record: &mut Record,
) {
    for spec in &tags.fields {
        for matched in root.children_by_tag(&spec.tag) {
            let rev = match matched.attr(REV_ATTR) {
                Some(v) => Value::Text(v.to_string()),
                None => Value::Null,
            };
            record.insert(format!("{}{}", spec.tag, REV_SUFFIX), rev);
            let value = apply_strategy(spec.strategy, matched, tags, exclude);
            record.insert(format!("{}{}", spec.tag, TEXT_SUFFIX), value);
        }
    }
}

fn apply_strategy(
    strategy: Strategy,
    elem: &Element,
    tags: &TagMap,
    exclude: &HashSet<String>,
) -> Value {
    match strategy {
        Strategy::Fragments => Value::List(text::ordered_fragments(Some(elem), exclude)),
        Strategy::Joined => match text::joined_text(Some(elem), exclude) {
            Some(s) => Value::Text(s),
            None => Value::Null,
        },
        Strategy::ListItems => {
            Value::List(text::listitem_fragments(Some(elem), &tags.listitem_tag, exclude))
        }
        Strategy::References => Value::List(refs::reference_ids(Some(elem))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;

    fn dispatch(xml: &str, exclude: &[&str]) -> Record {
        let root = parse_document(xml).unwrap();
        let tags = TagMap::berufenet();
        let exclude: HashSet<String> = exclude.iter().map(|t| t.to_string()).collect();
        let mut record = Record::new();
        dispatch_fields(&root, &tags, &exclude, &mut record);
        record
    }

    #[test]
    fn rev_and_text_pair_per_match() {
        let rec = dispatch(
            r#"<beruf><b50-0 rev="2024-03-01">Some <p>pay</p> info</b50-0></beruf>"#,
            &[],
        );
        assert_eq!(rec.get("b50-0_revd"), Some(&Value::Text("2024-03-01".into())));
        assert_eq!(
            rec.get("b50-0_text"),
            Some(&Value::List(vec!["Some".into(), "pay".into(), "info".into()]))
        );
    }

    #[test]
    fn missing_rev_attribute_is_null() {
        let rec = dispatch("<beruf><b50-0>x</b50-0></beruf>", &[]);
        assert_eq!(rec.get("b50-0_revd"), Some(&Value::Null));
    }

    #[test]
    fn unmatched_tags_write_nothing() {
        let rec = dispatch("<beruf><b50-0>x</b50-0></beruf>", &[]);
        assert!(!rec.contains("b11-0_text"));
        assert!(!rec.contains("b11-0_revd"));
        assert_eq!(rec.len(), 2);
    }

    #[test]
    fn matching_is_direct_children_only() {
        let rec = dispatch("<beruf><wrap><b50-0>deep</b50-0></wrap></beruf>", &[]);
        assert!(!rec.contains("b50-0_text"));
    }

    #[test]
    fn last_match_wins_keeps_position() {
        let rec = dispatch(
            r#"<beruf><b50-0 rev="a">one</b50-0><b11-0>mid</b11-0><b50-0 rev="b">two</b50-0></beruf>"#,
            &[],
        );
        assert_eq!(rec.get("b50-0_revd"), Some(&Value::Text("b".into())));
        assert_eq!(rec.get("b50-0_text"), Some(&Value::List(vec!["two".into()])));
        // overwrite does not move the pair behind later declarations
        let cols: Vec<_> = rec.columns().collect();
        assert_eq!(cols, vec!["b11-0_revd", "b11-0_text", "b50-0_revd", "b50-0_text"]);
    }

    #[test]
    fn strategies_follow_the_tag_binding() {
        let rec = dispatch(
            r#"<beruf>
                 <b11-0><p>This is a short description.</p></b11-0>
                 <b11-2><listitem>Task A</listitem><listitem>Task B</listitem></b11-2>
                 <b20-32><extsysref matrix="true" idref="100"/></b20-32>
               </beruf>"#,
            &[],
        );
        assert_eq!(
            rec.get("b11-0_text"),
            Some(&Value::Text("This is a short description.".into()))
        );
        assert_eq!(
            rec.get("b11-2_text"),
            Some(&Value::List(vec!["Task A".into(), "Task B".into()]))
        );
        assert_eq!(rec.get("b20-32_text"), Some(&Value::List(vec!["100".into()])));
    }

    #[test]
    fn joined_field_with_excluded_root_is_null() {
        let rec = dispatch("<beruf><b11-0><p>x</p></b11-0></beruf>", &["b11-0"]);
        assert_eq!(rec.get("b11-0_text"), Some(&Value::Null));
    }

    #[test]
    fn excluded_tag_inside_items_is_dropped() {
        let rec = dispatch(
            "<beruf><b11-2><listitem>Task A</listitem>\
             <irrelevant_tag>Ignore</irrelevant_tag></b11-2></beruf>",
            &["irrelevant_tag"],
        );
        assert_eq!(rec.get("b11-2_text"), Some(&Value::List(vec!["Task A".into()])));
    }
}
