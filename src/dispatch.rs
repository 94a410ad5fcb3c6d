//! Dual-backend dispatch.
//!
//! One logical tree is held in two views: the lightweight element view and
//! the full document view. Each operation name is looked up in a static
//! capability table that says which views support it. Authority is a pure
//! function of the current [`BackendState`], re-evaluated on every call,
//! because loading new markup can add or drop the document view at any time.
//!
//! Routing rules:
//!
//! - supported by both views: the document view if it carries a doctype,
//!   otherwise the element view; with no element view and no doctype the
//!   call is a [`Error::MethodClash`]
//! - supported by one view: that view, or [`Error::MissingBackend`] if it is
//!   not loaded
//! - supported by neither: [`Error::UnknownOperation`]

use std::fmt;

use serde_json::Value;

use crate::document::DocumentView;
use crate::error::{Error, Result};
use crate::node::Element;
use crate::options::Options;
use crate::render::render_element;
use crate::{serialize, walker};

/// The two views an operation can run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Element,
    Document,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element => f.write_str("element"),
            Self::Document => f.write_str("document"),
        }
    }
}

/// Which views support one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    pub name: &'static str,
    pub element: bool,
    pub document: bool,
}

impl Capability {
    const fn both(name: &'static str) -> Self {
        Self {
            name,
            element: true,
            document: true,
        }
    }

    const fn element(name: &'static str) -> Self {
        Self {
            name,
            element: true,
            document: false,
        }
    }

    const fn document(name: &'static str) -> Self {
        Self {
            name,
            element: false,
            document: true,
        }
    }

    #[must_use]
    pub fn supports(&self, backend: Backend) -> bool {
        match backend {
            Backend::Element => self.element,
            Backend::Document => self.document,
        }
    }
}

/// Every operation the dispatcher knows about.
pub const CAPABILITIES: &[Capability] = &[
    Capability::both("name"),
    Capability::both("text"),
    Capability::both("render"),
    Capability::element("attributes"),
    Capability::element("children"),
    Capability::element("to_map"),
    Capability::element("to_json"),
    Capability::element("links"),
    Capability::element("leaves"),
    Capability::element("query_attribute"),
    Capability::document("query"),
    Capability::document("doctype"),
];

/// Capability entry for an operation name.
#[must_use]
pub fn capability(operation: &str) -> Option<&'static Capability> {
    CAPABILITIES.iter().find(|cap| cap.name == operation)
}

/// What is currently loaded, as far as routing is concerned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendState {
    pub has_element: bool,
    pub has_document: bool,
    pub document_has_doctype: bool,
}

impl BackendState {
    #[must_use]
    pub fn new(element: Option<&Element>, document: Option<&DocumentView>) -> Self {
        Self {
            has_element: element.is_some(),
            has_document: document.is_some(),
            document_has_doctype: document.is_some_and(DocumentView::is_authoritative),
        }
    }

    /// Whether a document view is loaded, with or without a doctype.
    #[must_use]
    pub fn is_document_aware(&self) -> bool {
        self.has_document
    }

    fn has(&self, backend: Backend) -> bool {
        match backend {
            Backend::Element => self.has_element,
            Backend::Document => self.has_document,
        }
    }
}

/// Decide which view runs `operation`.
pub fn resolve(operation: &str, state: BackendState) -> Result<Backend> {
    let cap = capability(operation).ok_or_else(|| Error::UnknownOperation(operation.to_string()))?;

    let backend = match (cap.element, cap.document) {
        (true, true) => {
            if state.has_document && state.document_has_doctype {
                Backend::Document
            } else if state.has_element {
                Backend::Element
            } else if state.has_document {
                return Err(Error::MethodClash(operation.to_string()));
            } else {
                Backend::Element
            }
        }
        (true, false) => Backend::Element,
        (false, true) => Backend::Document,
        (false, false) => return Err(Error::UnknownOperation(operation.to_string())),
    };

    if !state.has(backend) {
        return Err(Error::MissingBackend {
            operation: operation.to_string(),
            backend,
        });
    }

    tracing::debug!(operation, %backend, ?state, "dispatch resolved");
    Ok(backend)
}

/// Check that `backend` supports `operation`, for explicit per-view calls.
pub fn ensure_supported(operation: &str, backend: Backend) -> Result<()> {
    match capability(operation) {
        Some(cap) if cap.supports(backend) => Ok(()),
        _ => Err(Error::UnknownOperation(format!("{operation} (on the {backend} view)"))),
    }
}

fn required_arg<'a>(operation: &str, args: &[&'a str], index: usize, name: &str) -> Result<&'a str> {
    args.get(index).copied().ok_or_else(|| {
        Error::InvalidInput(format!("operation '{operation}' needs argument #{index} ({name})"))
    })
}

/// Run an operation on the element view.
pub fn invoke_element(element: &Element, operation: &str, args: &[&str], options: &Options) -> Result<Value> {
    ensure_supported(operation, Backend::Element)?;
    tracing::trace!(operation, ?args, "invoking on element view");

    Ok(match operation {
        "name" => Value::from(element.name()),
        "text" => Value::from(element.text()),
        "render" => Value::from(render_element(element)),
        "attributes" => element
            .attributes()
            .iter()
            .map(|(key, value)| (key.clone(), Value::from(value.as_str())))
            .collect::<serde_json::Map<_, _>>()
            .into(),
        "children" => element.children().iter().map(Element::name).collect::<Vec<_>>().into(),
        "to_map" => serialize::to_value(&element, options)?,
        "to_json" => Value::from(serialize::to_json(&element, options)?),
        "links" => Value::from(walker::extract_links(&element, options)?),
        "leaves" => {
            let glued;
            let options = match args.first() {
                Some(glue) => {
                    glued = Options {
                        glue: (*glue).to_string(),
                        ..options.clone()
                    };
                    &glued
                }
                None => options,
            };
            serde_json::to_value(walker::collect_leaves(&element, options)?)?
        }
        "query_attribute" => {
            let name = required_arg(operation, args, 0, "attribute name")?;
            let value = required_arg(operation, args, 1, "attribute value")?;
            match element.query_attribute(name, value) {
                Some(found) => serialize::to_value(&found, options)?,
                None => Value::Null,
            }
        }
        _ => return Err(Error::UnknownOperation(operation.to_string())),
    })
}

/// Run an operation on the document view.
pub fn invoke_document(document: &DocumentView, operation: &str, args: &[&str]) -> Result<Value> {
    ensure_supported(operation, Backend::Document)?;
    tracing::trace!(operation, ?args, "invoking on document view");

    Ok(match operation {
        "name" => document.name().map_or(Value::Null, Value::from),
        "text" => Value::from(document.text()),
        "render" => Value::from(document.render_html(args.first().copied())),
        "query" => {
            let selector = required_arg(operation, args, 0, "selector")?;
            Value::from(document.query(selector))
        }
        "doctype" => document
            .doctype()
            .map_or(Value::Null, |doctype| Value::from(doctype.name.as_str())),
        _ => return Err(Error::UnknownOperation(operation.to_string())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ELEMENT_ONLY: BackendState = BackendState {
        has_element: true,
        has_document: false,
        document_has_doctype: false,
    };

    const BOTH_WITH_DOCTYPE: BackendState = BackendState {
        has_element: true,
        has_document: true,
        document_has_doctype: true,
    };

    const BOTH_WITHOUT_DOCTYPE: BackendState = BackendState {
        has_element: true,
        has_document: true,
        document_has_doctype: false,
    };

    #[test]
    fn test_table_names_are_unique() {
        for (i, cap) in CAPABILITIES.iter().enumerate() {
            assert!(cap.element || cap.document, "{} is unreachable", cap.name);
            assert!(
                CAPABILITIES[i + 1..].iter().all(|other| other.name != cap.name),
                "{} listed twice",
                cap.name
            );
        }
    }

    #[test]
    fn test_element_only_operation_ignores_document() {
        assert_eq!(resolve("to_map", ELEMENT_ONLY).ok(), Some(Backend::Element));
        assert_eq!(resolve("to_map", BOTH_WITH_DOCTYPE).ok(), Some(Backend::Element));
    }

    #[test]
    fn test_shared_operation_follows_doctype() {
        assert_eq!(resolve("render", BOTH_WITH_DOCTYPE).ok(), Some(Backend::Document));
        assert_eq!(resolve("render", BOTH_WITHOUT_DOCTYPE).ok(), Some(Backend::Element));
        assert_eq!(resolve("render", ELEMENT_ONLY).ok(), Some(Backend::Element));
    }

    #[test]
    fn test_shared_operation_without_authority_clashes() {
        let state = BackendState {
            has_element: false,
            has_document: true,
            document_has_doctype: false,
        };
        assert!(matches!(resolve("name", state), Err(Error::MethodClash(_))));
    }

    #[test]
    fn test_unknown_operation() {
        assert!(matches!(
            resolve("frobnicate", BOTH_WITH_DOCTYPE),
            Err(Error::UnknownOperation(_))
        ));
    }

    #[test]
    fn test_missing_backend() {
        assert!(matches!(
            resolve("query", ELEMENT_ONLY),
            Err(Error::MissingBackend { backend: Backend::Document, .. })
        ));
        assert!(matches!(
            resolve("name", BackendState::default()),
            Err(Error::MissingBackend { backend: Backend::Element, .. })
        ));
    }

    #[test]
    fn test_ensure_supported() {
        assert!(ensure_supported("query", Backend::Document).is_ok());
        assert!(matches!(
            ensure_supported("query", Backend::Element),
            Err(Error::UnknownOperation(_))
        ));
    }

    #[test]
    fn test_invoke_element_operations() {
        let element = Element::new("root")
            .with_attribute("id", "r")
            .with_child(Element::new("a").with_attribute("href", "/x").with_text("hi"))
            .with_child(Element::new("entry").with_attribute("name", "k").with_text("v"));
        let options = Options::default();

        let call = |op: &str, args: &[&str]| invoke_element(&element, op, args, &options).ok();
        assert_eq!(call("name", &[]), Some(json!("root")));
        assert_eq!(call("attributes", &[]), Some(json!({"id": "r"})));
        assert_eq!(call("children", &[]), Some(json!(["a", "entry"])));
        assert_eq!(call("links", &[]), Some(json!(["/x"])));
        assert_eq!(
            call("query_attribute", &["name", "k"]),
            Some(json!({"entry": {"@attributes": {"name": "k"}, "value": "v"}}))
        );
        assert_eq!(call("query_attribute", &["name", "zz"]), Some(Value::Null));
        assert_eq!(
            call("leaves", &["/"]),
            Some(json!([
                {"path": "root/a", "value": "hi", "link": "/x"},
                {"path": "root/entry", "value": "v", "link": null}
            ]))
        );
    }

    #[test]
    fn test_invoke_missing_argument() {
        let element = Element::new("root");
        assert!(matches!(
            invoke_element(&element, "query_attribute", &["name"], &Options::default()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_invoke_document_operations() {
        let document = DocumentView::parse("<!DOCTYPE html><ul><li>1</li><li>2</li></ul>");
        assert_eq!(invoke_document(&document, "doctype", &[]).ok(), Some(json!("html")));
        assert_eq!(
            invoke_document(&document, "query", &["li"]).ok(),
            Some(json!(["<li>1</li>", "<li>2</li>"]))
        );
        assert!(matches!(
            invoke_document(&document, "to_map", &[]),
            Err(Error::UnknownOperation(_))
        ));
    }

    #[test]
    fn test_state_from_loaded_views() {
        let element = Element::new("root");
        let plain = DocumentView::parse("<p>x</p>");
        let declared = DocumentView::parse("<!DOCTYPE html><p>x</p>");

        let state = BackendState::new(Some(&element), None);
        assert_eq!(state, ELEMENT_ONLY);
        assert!(!state.is_document_aware());

        let state = BackendState::new(None, Some(&plain));
        assert!(state.is_document_aware());
        assert!(!state.document_has_doctype);

        assert_eq!(
            BackendState::new(Some(&element), Some(&declared)),
            BOTH_WITH_DOCTYPE
        );
    }
}
