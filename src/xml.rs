use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::XmlError;

/// One element of a parsed document.
///
/// Character data placement follows the text/tail convention: `text` is the
/// data between the opening tag and the first child, `tail` the data between
/// this element's closing tag and the next sibling's opening tag. The tail
/// belongs to this element but reads as part of the parent's content stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub text: Option<String>,
    pub tail: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    /// Value of the named attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    /// Direct children with the given tag, in document order.
    pub fn children_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// Every element below this one in document order, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: self.children.iter().rev().collect() }
    }
}

/// Pre-order traversal over an element's subtree.
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let elem = self.stack.pop()?;
        self.stack.extend(elem.children.iter().rev());
        Some(elem)
    }
}

/// Parse a complete XML document and return its root element.
///
/// Comments, processing instructions and the declaration are skipped, so
/// character data around them merges into one segment.
pub fn parse_document(xml: &str) -> Result<Element, XmlError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if root.is_some() && stack.is_empty() {
                    return Err(XmlError::TrailingContent);
                }
                stack.push(element_from_start(&e)?);
            }
            Ok(Event::Empty(e)) => {
                if root.is_some() && stack.is_empty() {
                    return Err(XmlError::TrailingContent);
                }
                let elem = element_from_start(&e)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(elem),
                    None => root = Some(elem),
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let Some(elem) = stack.pop() else {
                    return Err(XmlError::UnexpectedClose(name));
                };
                if elem.tag != name {
                    return Err(XmlError::Syntax(format!(
                        "closing tag </{name}> does not match <{}>",
                        elem.tag
                    )));
                }
                match stack.last_mut() {
                    Some(parent) => parent.children.push(elem),
                    None => root = Some(elem),
                }
            }
            Ok(Event::Text(e)) => {
                let txt = e.unescape().map_err(|err| XmlError::Syntax(err.to_string()))?;
                append_text(&mut stack, &root, &txt)?;
            }
            Ok(Event::CData(e)) => {
                let txt = String::from_utf8_lossy(&e.into_inner()).into_owned();
                append_text(&mut stack, &root, &txt)?;
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(XmlError::Syntax(err.to_string())),
            // Decl, comments, PIs, doctype
            Ok(_) => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(XmlError::Truncated(open.tag.clone()));
    }
    root.ok_or(XmlError::NoRoot)
}

/// Attach character data to the innermost open element: before any child it
/// extends the element's `text`, after a child it extends that child's
/// `tail`. Adjacent segments concatenate. Outside the root only whitespace
/// is tolerated.
fn append_text(
    stack: &mut [Element],
    root: &Option<Element>,
    txt: &str,
) -> Result<(), XmlError> {
    let Some(top) = stack.last_mut() else {
        if txt.trim().is_empty() {
            return Ok(());
        }
        return Err(if root.is_some() {
            XmlError::TrailingContent
        } else {
            XmlError::Syntax("character data before the document root".to_string())
        });
    };
    let slot = match top.children.last_mut() {
        Some(child) => &mut child.tail,
        None => &mut top.text,
    };
    match slot {
        Some(existing) => existing.push_str(txt),
        None => *slot = Some(txt.to_string()),
    }
    Ok(())
}

fn element_from_start(e: &BytesStart<'_>) -> Result<Element, XmlError> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| XmlError::Attribute(tag.clone(), err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| XmlError::Attribute(tag.clone(), err.to_string()))?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(Element { tag, attrs, ..Default::default() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_and_tail_attribution() {
        let root = parse_document("<a>x<b>y</b>z</a>").unwrap();
        assert_eq!(root.tag, "a");
        assert_eq!(root.text.as_deref(), Some("x"));
        let b = &root.children[0];
        assert_eq!(b.text.as_deref(), Some("y"));
        assert_eq!(b.tail.as_deref(), Some("z"));
        assert_eq!(root.tail, None);
    }

    #[test]
    fn empty_element_gets_tail_not_text() {
        let root = parse_document("<a><b/>after</a>").unwrap();
        let b = &root.children[0];
        assert_eq!(b.text, None);
        assert_eq!(b.tail.as_deref(), Some("after"));
    }

    #[test]
    fn comment_does_not_split_text() {
        let root = parse_document("<a>he<!-- note -->llo</a>").unwrap();
        assert_eq!(root.text.as_deref(), Some("hello"));
    }

    #[test]
    fn attributes_unescaped() {
        let root = parse_document(r#"<a id="1" name="x &amp; y"/>"#).unwrap();
        assert_eq!(root.attr("id"), Some("1"));
        assert_eq!(root.attr("name"), Some("x & y"));
        assert_eq!(root.attr("missing"), None);
    }

    #[test]
    fn entities_in_text() {
        let root = parse_document("<a>1 &lt; 2 &amp; 3</a>").unwrap();
        assert_eq!(root.text.as_deref(), Some("1 < 2 & 3"));
    }

    #[test]
    fn cdata_is_text() {
        let root = parse_document("<a><![CDATA[x < y]]></a>").unwrap();
        assert_eq!(root.text.as_deref(), Some("x < y"));
    }

    #[test]
    fn children_by_tag_is_direct_only() {
        let root = parse_document("<a><b>1</b><c><b>2</b></c><b>3</b></a>").unwrap();
        let texts: Vec<_> = root
            .children_by_tag("b")
            .map(|e| e.text.as_deref().unwrap_or(""))
            .collect();
        assert_eq!(texts, vec!["1", "3"]);
    }

    #[test]
    fn descendants_preorder() {
        let root = parse_document("<a><b><c/></b><d/></a>").unwrap();
        let tags: Vec<_> = root.descendants().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["b", "c", "d"]);
    }

    #[test]
    fn declaration_and_prolog_whitespace() {
        let root = parse_document("<?xml version=\"1.0\"?>\n<a>t</a>\n").unwrap();
        assert_eq!(root.tag, "a");
        assert_eq!(root.text.as_deref(), Some("t"));
    }

    #[test]
    fn second_root_rejected() {
        let err = parse_document("<a/><b/>").unwrap_err();
        assert_eq!(err, XmlError::TrailingContent);
    }

    #[test]
    fn text_after_root_rejected() {
        let err = parse_document("<a/>junk").unwrap_err();
        assert_eq!(err, XmlError::TrailingContent);
        assert!(parse_document("junk<a/>").is_err());
    }

    #[test]
    fn truncated_document_rejected() {
        assert!(parse_document("<a><b>half").is_err());
    }

    #[test]
    fn mismatched_close_rejected() {
        assert!(parse_document("<a><b></a></b>").is_err());
    }

    #[test]
    fn empty_input_rejected() {
        assert_eq!(parse_document("").unwrap_err(), XmlError::NoRoot);
        assert_eq!(parse_document("   \n").unwrap_err(), XmlError::NoRoot);
    }
}
