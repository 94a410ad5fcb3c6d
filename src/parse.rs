//! Markup parsing.
//!
//! The only place raw text turns into trees. XML goes through `roxmltree`
//! and is strict: malformed input is an error. HTML goes through
//! `dom_query` (html5ever) and is tolerant: it always yields a document.

use crate::document::DocumentView;
use crate::encoding;
use crate::error::Result;
use crate::node::Element;

/// Parse strict XML into an element view rooted at the document element.
///
/// # Example
///
/// ```rust
/// use rs_treemanager::parse_xml;
///
/// let root = parse_xml("<root><item>1</item></root>")?;
/// assert_eq!(root.name(), "root");
/// assert!(parse_xml("<root>").is_err());
/// # Ok::<(), rs_treemanager::Error>(())
/// ```
pub fn parse_xml(xml: &str) -> Result<Element> {
    let document = roxmltree::Document::parse(xml).inspect_err(|e| {
        tracing::debug!(error = %e, len = xml.len(), "xml parse failed");
    })?;
    let root = Element::from_node(&document.root_element());
    tracing::debug!(len = xml.len(), root = root.name(), "parsed xml");
    Ok(root)
}

/// Parse raw XML bytes, honouring a byte-order mark or encoding declaration.
pub fn parse_xml_bytes(bytes: &[u8]) -> Result<Element> {
    let text = encoding::transcode_to_utf8(bytes);
    parse_xml(&encoding::relabel_xml_declaration(&text))
}

/// Parse HTML into both views: the full document and a snapshot of its
/// root element.
///
/// Never fails. The HTML parser always produces an `<html>` root, so the
/// element view is always present.
#[must_use]
pub fn parse_html(html: &str) -> (Element, DocumentView) {
    let document = DocumentView::parse(html);
    let element = document
        .to_element()
        .unwrap_or_else(|| Element::new("html"));
    (element, document)
}

/// Parse raw HTML bytes, honouring a byte-order mark or `<meta>` charset.
#[must_use]
pub fn parse_html_bytes(bytes: &[u8]) -> (Element, DocumentView) {
    parse_html(&encoding::transcode_to_utf8(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_parse_xml_builds_element_tree() {
        let root = match parse_xml("<root a=\"1\"><item>1</item><item>2</item></root>") {
            Ok(root) => root,
            Err(e) => panic!("valid xml rejected: {e}"),
        };
        assert_eq!(root.name(), "root");
        assert_eq!(root.attribute("a"), Some("1"));
        assert_eq!(root.children().len(), 2);
    }

    #[test]
    fn test_parse_xml_malformed_is_parse_error() {
        assert!(matches!(parse_xml("<root><open></root>"), Err(Error::ParseError(_))));
        assert!(matches!(parse_xml(""), Err(Error::ParseError(_))));
    }

    #[test]
    fn test_parse_xml_strips_namespace_prefix() {
        let xml = r#"<s:Envelope xmlns:s="urn:soap"><s:Body>x</s:Body></s:Envelope>"#;
        let root = match parse_xml(xml) {
            Ok(root) => root,
            Err(e) => panic!("valid xml rejected: {e}"),
        };
        assert_eq!(root.name(), "Envelope");
        assert_eq!(root.children()[0].name(), "Body");
    }

    #[test]
    fn test_parse_xml_bytes_latin1() {
        let bytes = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><root>Caf\xE9</root>";
        let root = match parse_xml_bytes(bytes) {
            Ok(root) => root,
            Err(e) => panic!("latin-1 xml rejected: {e}"),
        };
        assert_eq!(root.text(), "Café");
    }

    #[test]
    fn test_parse_html_tolerates_garbage() {
        let (element, document) = parse_html("<p>unclosed<div>nested");
        assert_eq!(element.name(), "html");
        assert!(!document.is_authoritative());
        assert!(document.text().contains("nested"));
    }

    #[test]
    fn test_parse_html_bytes_meta_charset() {
        let bytes = b"<html><head><meta charset=\"windows-1252\"></head><body><p>Caf\xE9</p></body></html>";
        let (_, document) = parse_html_bytes(bytes);
        assert!(document.text().contains("Café"));
    }
}
