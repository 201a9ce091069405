use std::collections::HashSet;

use itertools::Itertools;

use crate::xml::Element;

/// Trimmed text fragments of a subtree in document order, one per non-empty
/// text or tail segment. An excluded element contributes nothing: not its
/// text, not its descendants, not its tail. The root's own tail lies outside
/// the subtree and is never read.
pub fn ordered_fragments(elem: Option<&Element>, exclude: &HashSet<String>) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(elem) = elem {
        if !exclude.contains(&elem.tag) {
            collect_fragments(elem, exclude, &mut out);
        }
    }
    out
}

fn collect_fragments(elem: &Element, exclude: &HashSet<String>, out: &mut Vec<String>) {
    push_trimmed(elem.text.as_deref(), out);
    for child in &elem.children {
        if exclude.contains(&child.tag) {
            continue;
        }
        collect_fragments(child, exclude, out);
        push_trimmed(child.tail.as_deref(), out);
    }
}

fn push_trimmed(segment: Option<&str>, out: &mut Vec<String>) {
    if let Some(s) = segment {
        let t = s.trim();
        if !t.is_empty() {
            out.push(t.to_string());
        }
    }
}

/// All subtree text flattened into one single-spaced string. Exclusion
/// applies to the root tag only; below it every segment is read. `None` for
/// an absent or excluded element, an empty string for one with no text.
pub fn joined_text(elem: Option<&Element>, exclude: &HashSet<String>) -> Option<String> {
    let elem = elem?;
    if exclude.contains(&elem.tag) {
        return None;
    }
    let mut segments = Vec::new();
    collect_itertext(elem, &mut segments);
    Some(segments.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).join(" "))
}

fn collect_itertext<'a>(elem: &'a Element, out: &mut Vec<&'a str>) {
    if let Some(t) = elem.text.as_deref() {
        out.push(t);
    }
    for child in &elem.children {
        collect_itertext(child, out);
        if let Some(t) = child.tail.as_deref() {
            out.push(t);
        }
    }
}

/// One trimmed fragment per list-item marker in the subtree, in document
/// order, empty items omitted. Inside an item: a nested marker contributes
/// only its tail, an excluded child contributes nothing (tail included),
/// any other child contributes its own flattened text plus its tail.
pub fn listitem_fragments(
    elem: Option<&Element>,
    listitem_tag: &str,
    exclude: &HashSet<String>,
) -> Vec<String> {
    let Some(elem) = elem else {
        return Vec::new();
    };
    elem.descendants()
        .filter(|e| e.tag == listitem_tag)
        .map(|item| item_text(item, listitem_tag, exclude))
        .filter(|s| !s.is_empty())
        .collect()
}

fn item_text(elem: &Element, listitem_tag: &str, exclude: &HashSet<String>) -> String {
    let mut text = elem.text.clone().unwrap_or_default();
    for child in &elem.children {
        if child.tag == listitem_tag {
            text.push_str(child.tail.as_deref().unwrap_or(""));
        } else if exclude.contains(&child.tag) {
            continue;
        } else {
            text.push_str(&item_text(child, listitem_tag, exclude));
            text.push_str(child.tail.as_deref().unwrap_or(""));
        }
    }
    text.trim().to_string()
}
