//! Full HTML document view.
//!
//! Wraps a `dom_query::Document` together with the document type
//! declaration the HTML tree builder attached to it. The declaration is what
//! makes this view authoritative for operations both views support.

use dom_query::{Document, NodeData, NodeRef, Selection};

use crate::node::{Element, TreeNode};

/// Document type declaration of a parsed document.
///
/// `name` is empty for a bare `<!DOCTYPE>`; the declaration still counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctype {
    pub name: String,
    pub public_id: Option<String>,
    pub system_id: Option<String>,
}

impl Doctype {
    /// Read the declaration node among the children of `document`'s root.
    #[must_use]
    pub fn from_document(document: &Document) -> Option<Self> {
        let node = document
            .root()
            .children()
            .into_iter()
            .find(NodeRef::is_doctype)?;
        node.query(|tree_node| match &tree_node.data {
            NodeData::Doctype {
                name,
                public_id,
                system_id,
            } => Some(Self {
                name: name.to_ascii_lowercase(),
                public_id: non_empty(public_id),
                system_id: non_empty(system_id),
            }),
            _ => None,
        })
        .flatten()
    }
}

fn non_empty(id: &str) -> Option<String> {
    (!id.is_empty()).then(|| id.to_string())
}

/// A fully parsed HTML document.
///
/// Parsing is tolerant: malformed markup is recovered by the HTML5 tree
/// builder and never fails.
pub struct DocumentView {
    document: Document,
    doctype: Option<Doctype>,
}

impl std::fmt::Debug for DocumentView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentView")
            .field("doctype", &self.doctype)
            .finish_non_exhaustive()
    }
}

impl DocumentView {
    /// Parse an HTML document.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        let document = Document::from(html);
        let doctype = Doctype::from_document(&document);
        tracing::debug!(
            len = html.len(),
            doctype = doctype.as_ref().map(|d| d.name.as_str()),
            "parsed html document"
        );
        Self { document, doctype }
    }

    /// The document type declaration, if the source carried one.
    #[must_use]
    pub fn doctype(&self) -> Option<&Doctype> {
        self.doctype.as_ref()
    }

    /// Whether this view wins over the element view for shared operations.
    #[must_use]
    pub fn is_authoritative(&self) -> bool {
        self.doctype.is_some()
    }

    /// The underlying `dom_query` document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The top-level element (`<html>` for anything the HTML parser built).
    #[must_use]
    pub fn root_element(&self) -> Option<NodeRef<'_>> {
        self.document
            .root()
            .children()
            .into_iter()
            .find(NodeRef::is_element)
    }

    /// Snapshot the root element as an element view.
    #[must_use]
    pub fn to_element(&self) -> Option<Element> {
        self.root_element().map(|root| Element::from_node(&root))
    }

    /// Tag name of the root element.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.root_element().map(|root| TreeNode::name(&root).into_owned())
    }

    /// All text content of the document.
    #[must_use]
    pub fn text(&self) -> String {
        self.document.root().text().to_string()
    }

    /// Outer HTML of every element matching a CSS selector, in document order.
    ///
    /// An invalid selector matches nothing.
    #[must_use]
    pub fn query(&self, selector: &str) -> Vec<String> {
        let matches = self.select(selector);
        tracing::trace!(selector, count = matches.len(), "document query");
        matches
            .into_iter()
            .map(|node| Selection::from(node).html().to_string())
            .collect()
    }

    /// Render the whole document, or the first element matching `selector`.
    ///
    /// A selector that matches nothing renders as an empty string.
    #[must_use]
    pub fn render_html(&self, selector: Option<&str>) -> String {
        match selector {
            None => self.document.html().to_string(),
            Some(selector) => self
                .select(selector)
                .first()
                .map(|node| Selection::from(*node).html().to_string())
                .unwrap_or_default(),
        }
    }

    fn select(&self, selector: &str) -> Vec<NodeRef<'_>> {
        Selection::from(self.document.root())
            .try_select(selector)
            .map(|found| found.nodes().to_vec())
            .unwrap_or_default()
    }
}
