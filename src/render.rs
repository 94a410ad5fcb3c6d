//! Markup rendering.
//!
//! Writes the element view back out as markup, and gives one entry point
//! for rendering either view.

use std::fmt::Write as _;

use crate::document::DocumentView;
use crate::node::Element;

/// Either of the two views, for callers that render whatever they hold.
#[derive(Debug, Clone, Copy)]
pub enum RenderSource<'a> {
    Element(&'a Element),
    Document(&'a DocumentView),
}

/// Render a view as markup.
#[must_use]
pub fn as_html(source: RenderSource<'_>) -> String {
    match source {
        RenderSource::Element(element) => render_element(element),
        RenderSource::Document(document) => document.render_html(None),
    }
}

/// Serialize an element view as markup.
///
/// An element's own text is written before its children; the element view
/// does not keep text interleaved between children. Elements with neither
/// text nor children are self-closing.
///
/// ```rust
/// use rs_treemanager::{render::render_element, Element};
///
/// let root = Element::new("p")
///     .with_attribute("title", "a \"quote\"")
///     .with_text("1 < 2")
///     .with_child(Element::new("br"));
/// assert_eq!(render_element(&root), r#"<p title="a &quot;quote&quot;">1 &lt; 2<br/></p>"#);
/// ```
#[must_use]
pub fn render_element(element: &Element) -> String {
    let mut out = String::new();
    write_element(&mut out, element);
    out
}

fn write_element(out: &mut String, element: &Element) {
    let _ = write!(out, "<{}", element.name());
    for (name, value) in element.attributes() {
        let _ = write!(out, " {name}=\"{}\"", escape(value, true));
    }

    if element.text().is_empty() && element.children().is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    out.push_str(&escape(element.text(), false));
    for child in element.children() {
        write_element(out, child);
    }
    let _ = write!(out, "</{}>", element.name());
}

fn escape(raw: &str, attribute: bool) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if attribute => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
