//! The tree manager: one logical tree held in two views.
//!
//! `TreeManager` owns an optional element view and an optional document
//! view, replaces them on load, and routes named operations to the view that
//! is authoritative at call time.
//!
//! A manager is single-owner state. It provides no internal locking; share
//! one across threads only behind your own lock, or use one per request.

use serde_json::Value;

use crate::dispatch::{self, Backend, BackendState};
use crate::document::DocumentView;
use crate::error::{Error, Result};
use crate::node::Element;
use crate::options::Options;
use crate::parse;
use crate::render::render_element;
use crate::serialize::{self, SerializedTree};
use crate::walker::{self, LeafRecord, LeafVisitor, WalkStep};

/// Element name used when pairs are appended before anything was loaded.
const DEFAULT_ROOT: &str = "root";

/// A pair of tree views with dual-backend dispatch.
///
/// # Example
///
/// ```rust
/// use rs_treemanager::TreeManager;
/// use serde_json::json;
///
/// let mut tree = TreeManager::new();
/// tree.load_xml(r#"<root><a href="http://x">hi</a><item>1</item><item>2</item></root>"#)?;
///
/// assert_eq!(tree.links()?, vec!["http://x".to_string()]);
/// assert_eq!(tree.dispatch("name", &[])?, json!("root"));
/// # Ok::<(), rs_treemanager::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct TreeManager {
    element: Option<Element>,
    document: Option<DocumentView>,
    options: Options,
}

impl TreeManager {
    /// An empty manager with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty manager with custom options.
    #[must_use]
    pub fn with_options(options: Options) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// A manager holding only an element view.
    #[must_use]
    pub fn from_element(element: Element) -> Self {
        Self {
            element: Some(element),
            ..Self::default()
        }
    }

    /// A manager holding a document view and its root element snapshot.
    #[must_use]
    pub fn from_document(document: DocumentView) -> Self {
        Self {
            element: document.to_element(),
            document: Some(document),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn set_options(&mut self, options: Options) -> &mut Self {
        self.options = options;
        self
    }

    // === Loading ===

    /// Replace the element view with parsed XML and drop the document view.
    ///
    /// On a parse error both views are left untouched.
    pub fn load_xml(&mut self, xml: &str) -> Result<&mut Self> {
        let element = parse::parse_xml(xml)?;
        Ok(self.replace(Some(element), None))
    }

    /// Like [`TreeManager::load_xml`], for raw bytes in any declared encoding.
    pub fn load_xml_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        let element = parse::parse_xml_bytes(bytes)?;
        Ok(self.replace(Some(element), None))
    }

    /// Replace both views with parsed HTML. Never fails.
    pub fn load_html(&mut self, html: &str) -> &mut Self {
        let (element, document) = parse::parse_html(html);
        self.replace(Some(element), Some(document))
    }

    /// Like [`TreeManager::load_html`], for raw bytes in any declared charset.
    pub fn load_html_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        let (element, document) = parse::parse_html_bytes(bytes);
        self.replace(Some(element), Some(document))
    }

    /// Replace the element view, keeping the document view.
    pub fn set_element(&mut self, element: Element) -> &mut Self {
        self.element = Some(element);
        self
    }

    /// Replace the document view, keeping the element view.
    pub fn set_document(&mut self, document: DocumentView) -> &mut Self {
        self.document = Some(document);
        self
    }

    fn replace(&mut self, element: Option<Element>, document: Option<DocumentView>) -> &mut Self {
        self.element = element;
        self.document = document;
        tracing::debug!(state = ?self.state(), "tree views replaced");
        self
    }

    // === Views ===

    #[must_use]
    pub fn element(&self) -> Option<&Element> {
        self.element.as_ref()
    }

    #[must_use]
    pub fn document(&self) -> Option<&DocumentView> {
        self.document.as_ref()
    }

    /// Routing-relevant snapshot of what is loaded.
    #[must_use]
    pub fn state(&self) -> BackendState {
        BackendState::new(self.element.as_ref(), self.document.as_ref())
    }

    fn require_element(&self, operation: &str) -> Result<&Element> {
        self.element.as_ref().ok_or_else(|| Error::MissingBackend {
            operation: operation.to_string(),
            backend: Backend::Element,
        })
    }

    fn require_document(&self, operation: &str) -> Result<&DocumentView> {
        self.document.as_ref().ok_or_else(|| Error::MissingBackend {
            operation: operation.to_string(),
            backend: Backend::Document,
        })
    }

    // === Dispatch ===

    /// Run a named operation on whichever view is authoritative right now.
    pub fn dispatch(&self, operation: &str, args: &[&str]) -> Result<Value> {
        match dispatch::resolve(operation, self.state())? {
            Backend::Element => self.call_element(operation, args),
            Backend::Document => self.call_document(operation, args),
        }
    }

    /// Run a named operation on the element view, skipping authority checks.
    pub fn call_element(&self, operation: &str, args: &[&str]) -> Result<Value> {
        dispatch::ensure_supported(operation, Backend::Element)?;
        dispatch::invoke_element(self.require_element(operation)?, operation, args, &self.options)
    }

    /// Run a named operation on the document view, skipping authority checks.
    pub fn call_document(&self, operation: &str, args: &[&str]) -> Result<Value> {
        dispatch::ensure_supported(operation, Backend::Document)?;
        dispatch::invoke_document(self.require_document(operation)?, operation, args)
    }

    // === Element view operations ===

    /// Serialize the element view.
    pub fn to_map(&self) -> Result<SerializedTree> {
        serialize::to_map(&self.require_element("to_map")?, &self.options)
    }

    /// Serialize the element view as JSON.
    pub fn to_json(&self) -> Result<String> {
        serialize::to_json(&self.require_element("to_json")?, &self.options)
    }

    /// Links of all leaves below anchors, one entry per leaf.
    pub fn links(&self) -> Result<Vec<String>> {
        walker::extract_links(&self.require_element("links")?, &self.options)
    }

    /// Hand every leaf of the element view to `visitor`.
    pub fn walk_leaves<V: LeafVisitor + ?Sized>(&self, visitor: &mut V) -> Result<WalkStep> {
        walker::walk_leaves(&self.require_element("leaves")?, &self.options, visitor)
    }

    /// Every leaf of the element view.
    pub fn leaves(&self) -> Result<Vec<LeafRecord>> {
        walker::collect_leaves(&self.require_element("leaves")?, &self.options)
    }

    /// First child of the element root whose attribute `name` equals `value`.
    pub fn query_attribute(&self, name: &str, value: &str) -> Result<Option<&Element>> {
        Ok(self
            .require_element("query_attribute")?
            .query_attribute(name, value))
    }

    /// Append every scalar leaf of a JSON object or array as a child of the
    /// element root.
    ///
    /// Nested containers are flattened: `{"a": {"b": 1}, "c": [2, 3]}`
    /// appends `<b>1</b>`, `<c>2</c>` and `<c>3</c>` (array items take the
    /// key of the array). Top-level array items without a key are named
    /// `item`. Keys are appended in input order. With no element view
    /// loaded, a `<root/>` is created first.
    ///
    /// Every key must be a valid XML name; otherwise nothing is appended.
    pub fn extend_from_value(&mut self, value: &Value) -> Result<&mut Self> {
        if !(value.is_object() || value.is_array()) {
            return Err(Error::InvalidInput(format!(
                "expected a JSON object or array to append, got {value}"
            )));
        }
        check_keys(value)?;

        let root = self
            .element
            .get_or_insert_with(|| Element::new(DEFAULT_ROOT));
        append_scalars(root, "item", value);
        Ok(self)
    }

    /// The element view as markup.
    pub fn render_element(&self) -> Result<String> {
        Ok(render_element(self.require_element("render")?))
    }

    // === Document view operations ===

    /// Outer HTML of every element matching a CSS selector.
    pub fn query(&self, selector: &str) -> Result<Vec<String>> {
        Ok(self.require_document("query")?.query(selector))
    }

    /// The whole document, or the first match of `selector`, as HTML.
    pub fn render_html(&self, selector: Option<&str>) -> Result<String> {
        Ok(self.require_document("render")?.render_html(selector))
    }
}

fn check_keys(value: &Value) -> Result<()> {
    match value {
        Value::Object(map) => map.iter().try_for_each(|(key, child)| {
            if !is_xml_name(key) {
                return Err(Error::InvalidInput(format!(
                    "'{key}' is not a valid element name"
                )));
            }
            check_keys(child)
        }),
        Value::Array(items) => items.iter().try_for_each(check_keys),
        _ => Ok(()),
    }
}

/// XML `Name` production, restricted to letters for the non-ASCII ranges.
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_' || first == ':')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.' | '\u{b7}'))
}

fn append_scalars(root: &mut Element, key: &str, value: &Value) {
    match value {
        Value::Object(map) => {
            for (child_key, child) in map {
                append_scalars(root, child_key, child);
            }
        }
        Value::Array(items) => {
            for item in items {
                append_scalars(root, key, item);
            }
        }
        Value::String(text) => {
            root.add_child(key, text.as_str());
        }
        Value::Null => {
            root.add_child(key, "");
        }
        scalar => {
            root.add_child(key, scalar.to_string());
        }
    }
}
