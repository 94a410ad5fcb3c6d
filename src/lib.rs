//! # rs-treemanager
//!
//! A backend-agnostic engine for hierarchical markup trees.
//!
//! Markup is parsed once (strict XML via `roxmltree`, tolerant HTML via
//! `dom_query`) and then read through a uniform node view to:
//!
//! - normalize the tree into a nested map or JSON, with repeated sibling
//!   tags grouped into lists
//! - walk every leaf depth-first with its dotted path and the link of the
//!   nearest enclosing anchor
//! - route named operations between a lightweight element view and a full
//!   document view
//!
//! ## Quick Start
//!
//! ```rust
//! use rs_treemanager::{extract_links, parse_xml, to_json};
//!
//! let root = parse_xml(r#"<root><a href="http://x">hi</a><item>1</item><item>2</item></root>"#)?;
//!
//! assert_eq!(
//!     to_json(&&root)?,
//!     r#"{"root":{"a":{"@attributes":{"href":"http://x"},"value":"hi"},"item":[{"value":"1"},{"value":"2"}]}}"#
//! );
//! assert_eq!(extract_links(&&root)?, vec!["http://x".to_string()]);
//! # Ok::<(), rs_treemanager::Error>(())
//! ```
//!
//! ## Views
//!
//! - [`Element`]: owned element tree, produced by every load
//! - [`DocumentView`]: full HTML document, produced by HTML loads; it is
//!   authoritative for shared operations when it carries a doctype
//! - [`TreeManager`]: holds both and dispatches between them

mod error;
mod options;

/// Uniform node view over parsed markup.
pub mod node;

/// Full HTML document view.
pub mod document;

/// XML and HTML parsing.
pub mod parse;

/// Character encoding detection and transcoding.
pub mod encoding;

/// Sibling-group classification.
pub mod classify;

/// Tree-to-map and JSON serialization.
pub mod serialize;

/// Depth-first leaf and link walking.
pub mod walker;

/// Markup rendering of both views.
pub mod render;

/// Capability table and authority resolution.
pub mod dispatch;

/// The two-view tree manager.
pub mod manager;

// Public API - re-exports
pub use dispatch::Backend;
pub use document::{Doctype, DocumentView};
pub use error::{Error, Result};
pub use manager::TreeManager;
pub use node::{Element, TreeNode};
pub use options::Options;
pub use parse::{parse_html, parse_xml};
pub use serialize::{ChildEntry, ChildMap, SerializedTree, SerializedValue};
pub use walker::{LeafRecord, LeafVisitor, WalkStep};

/// Serialize a tree with default options.
///
/// Wraps the result under the root's tag name.
pub fn to_map<N: TreeNode>(tree: &N) -> Result<SerializedTree> {
    serialize::to_map(tree, &Options::default())
}

/// Serialize a tree to compact JSON with default options.
pub fn to_json<N: TreeNode>(tree: &N) -> Result<String> {
    serialize::to_json(tree, &Options::default())
}

/// Links of every leaf below an anchor, in document order, one per leaf.
pub fn extract_links<N: TreeNode>(tree: &N) -> Result<Vec<String>> {
    walker::extract_links(tree, &Options::default())
}

/// Walk every leaf of a tree with a custom path separator.
///
/// # Example
///
/// ```rust
/// use rs_treemanager::{parse_xml, walk_leaves, LeafRecord};
///
/// let root = parse_xml("<root><x><y>1</y></x></root>")?;
/// let mut found = Vec::new();
/// walk_leaves(&&root, "/", &mut |leaf: LeafRecord| {
///     found.push((leaf.path, leaf.value));
///     Ok(())
/// })?;
/// assert_eq!(found, vec![("root/x/y".to_string(), "1".to_string())]);
/// # Ok::<(), rs_treemanager::Error>(())
/// ```
pub fn walk_leaves<N, V>(tree: &N, glue: &str, visitor: &mut V) -> Result<WalkStep>
where
    N: TreeNode,
    V: LeafVisitor + ?Sized,
{
    let options = Options {
        glue: glue.to_string(),
        ..Options::default()
    };
    walker::walk_leaves(tree, &options, visitor)
}
