//! Leaf and link walking.
//!
//! Depth-first traversal that builds a dotted path for every node, carries
//! the link of the nearest enclosing anchor down the recursion, and hands
//! every leaf to a visitor.
//!
//! ## Leaf detection
//!
//! The recursive call on a node reports how many children it processed in
//! a [`WalkStep`]. A node is a leaf exactly when that count is zero; a node
//! whose children are all leaves still has children and is never reported.
//!
//! ## Link scoping
//!
//! An anchor's link applies to the anchor itself and its own subtree only.
//! It replaces, never merges with, the link inherited from above, and it
//! does not carry over to the anchor's following siblings.

use serde::Serialize;
use url::Url;

use crate::error::{Error, Result};
use crate::node::TreeNode;
use crate::options::Options;

/// One leaf reported by the walker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeafRecord {
    /// Tag names from the root down to the leaf, joined by `Options::glue`.
    pub path: String,
    /// The leaf's own text.
    pub value: String,
    /// Link of the nearest anchor at or above the leaf.
    pub link: Option<String>,
}

/// Result of walking one node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStep {
    /// Direct children processed.
    pub child_count: usize,
    /// Leaves reported from this node's subtree, the node included.
    pub emitted: usize,
}

impl WalkStep {
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.child_count == 0
    }
}

/// Receives leaves in document order.
///
/// Returning an error stops the walk; the error reaches the caller of
/// [`walk_leaves`] unchanged.
pub trait LeafVisitor {
    fn visit(&mut self, record: LeafRecord) -> Result<()>;
}

impl<F> LeafVisitor for F
where
    F: FnMut(LeafRecord) -> Result<()>,
{
    fn visit(&mut self, record: LeafRecord) -> Result<()> {
        self(record)
    }
}

struct Walker<'o> {
    options: &'o Options,
    base: Option<Url>,
}

impl<'o> Walker<'o> {
    fn new(options: &'o Options) -> Result<Self> {
        Ok(Self {
            options,
            base: options.parsed_base_url()?,
        })
    }

    /// Link opened by `node`, if it is an anchor carrying the link attribute.
    fn anchor_link<N: TreeNode>(&self, node: &N) -> Option<String> {
        if node.name() != self.options.anchor_tag.as_str() {
            return None;
        }
        let href = node.attribute(&self.options.link_attribute)?;
        match &self.base {
            Some(base) => Some(base.join(&href).map_or(href, String::from)),
            None => Some(href),
        }
    }

    fn walk<N, V>(
        &self,
        node: &N,
        path: &str,
        inherited_link: Option<&str>,
        depth: usize,
        visitor: &mut V,
    ) -> Result<WalkStep>
    where
        N: TreeNode,
        V: LeafVisitor + ?Sized,
    {
        if depth > self.options.max_depth {
            return Err(Error::InvalidInput(format!(
                "tree is deeper than the configured maximum of {} levels",
                self.options.max_depth
            )));
        }

        let own_link = self.anchor_link(node);
        let link = own_link.as_deref().or(inherited_link);

        let mut step = WalkStep::default();
        for child in node.children() {
            step.child_count += 1;
            let child_path = format!("{path}{}{}", self.options.glue, child.name());
            let child_step = self.walk(&child, &child_path, link, depth + 1, visitor)?;
            step.emitted += child_step.emitted;
        }

        if step.is_leaf() {
            visitor.visit(LeafRecord {
                path: path.to_string(),
                value: node.text().into_owned(),
                link: link.map(str::to_string),
            })?;
            step.emitted = 1;
        }

        Ok(step)
    }
}

/// Walk the subtree of `node`, starting from an explicit path and link.
///
/// This is the building block behind [`walk_leaves`]; use it to continue a
/// walk below a node reached some other way.
pub fn walk<N, V>(
    node: &N,
    path: &str,
    inherited_link: Option<&str>,
    options: &Options,
    visitor: &mut V,
) -> Result<WalkStep>
where
    N: TreeNode,
    V: LeafVisitor + ?Sized,
{
    Walker::new(options)?.walk(node, path, inherited_link, 0, visitor)
}

/// Walk a whole tree, reporting every leaf to `visitor`.
///
/// Paths start with the root's tag name, e.g. `root.item`.
///
/// # Example
///
/// ```rust
/// use rs_treemanager::{parse_xml, walker::{walk_leaves, LeafRecord}, Options};
///
/// let root = parse_xml("<root><a href=\"/x\">hi</a><b>yo</b></root>")?;
/// let mut paths = Vec::new();
/// walk_leaves(&&root, &Options::default(), &mut |leaf: LeafRecord| {
///     paths.push(leaf.path);
///     Ok(())
/// })?;
/// assert_eq!(paths, ["root.a", "root.b"]);
/// # Ok::<(), rs_treemanager::Error>(())
/// ```
pub fn walk_leaves<N, V>(root: &N, options: &Options, visitor: &mut V) -> Result<WalkStep>
where
    N: TreeNode,
    V: LeafVisitor + ?Sized,
{
    let step = walk(root, &root.name(), None, options, visitor)?;
    tracing::debug!(
        root = %root.name(),
        children = step.child_count,
        leaves = step.emitted,
        "walk complete"
    );
    Ok(step)
}

/// Collect every leaf of a tree.
pub fn collect_leaves<N: TreeNode>(root: &N, options: &Options) -> Result<Vec<LeafRecord>> {
    let mut leaves = Vec::new();
    walk_leaves(root, options, &mut |leaf: LeafRecord| {
        leaves.push(leaf);
        Ok(())
    })?;
    Ok(leaves)
}

/// Links of all leaves that sit below an anchor, in document order.
///
/// One entry per leaf, not per distinct link: an anchor with three leaves
/// below it contributes its link three times.
pub fn extract_links<N: TreeNode>(root: &N, options: &Options) -> Result<Vec<String>> {
    let mut links = Vec::new();
    walk_leaves(root, options, &mut |leaf: LeafRecord| {
        links.extend(leaf.link);
        Ok(())
    })?;
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Element;

    fn anchor(href: &str) -> Element {
        Element::new("a").with_attribute("href", href)
    }

    fn leaves(root: &Element) -> Vec<LeafRecord> {
        match collect_leaves(&root, &Options::default()) {
            Ok(leaves) => leaves,
            Err(e) => panic!("walk failed: {e}"),
        }
    }

    #[test]
    fn test_childless_root_is_its_own_leaf() {
        let root = Element::new("root");
        let found = leaves(&root);
        assert_eq!(
            found,
            vec![LeafRecord {
                path: "root".to_string(),
                value: String::new(),
                link: None,
            }]
        );
    }

    #[test]
    fn test_anchor_is_leaf_with_its_own_link() {
        let root = Element::new("root")
            .with_child(anchor("http://x").with_text("hi"))
            .with_child(Element::new("item").with_text("1"));
        let found = leaves(&root);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].path, "root.a");
        assert_eq!(found[0].link.as_deref(), Some("http://x"));
        assert_eq!(found[1].link, None);
    }

    #[test]
    fn test_link_does_not_leak_into_next_sibling() {
        let root = Element::new("root")
            .with_child(Element::new("nav").with_child(anchor("/one").with_text("1")))
            .with_child(Element::new("p").with_text("plain"));
        let found = leaves(&root);
        assert_eq!(found[0].link.as_deref(), Some("/one"));
        assert_eq!(found[1].path, "root.p");
        assert_eq!(found[1].link, None);
    }

    #[test]
    fn test_innermost_anchor_wins() {
        let inner = anchor("inner").with_child(Element::new("span").with_text("deep"));
        let outer = anchor("outer")
            .with_child(Element::new("b").with_text("shallow"))
            .with_child(inner);
        let root = Element::new("root").with_child(outer);

        let found = leaves(&root);
        let links: Vec<_> = found.iter().map(|l| (l.path.as_str(), l.link.as_deref())).collect();
        assert_eq!(
            links,
            vec![("root.a.b", Some("outer")), ("root.a.a.span", Some("inner"))]
        );
    }

    #[test]
    fn test_anchor_without_href_inherits() {
        let root = anchor("top").with_child(Element::new("a").with_text("no href"));
        let found = leaves(&root);
        assert_eq!(found[0].link.as_deref(), Some("top"));
    }

    #[test]
    fn test_extract_links_one_per_leaf() {
        let root = Element::new("root").with_child(
            anchor("http://x")
                .with_child(Element::new("i").with_text("1"))
                .with_child(Element::new("i").with_text("2")),
        );
        let links = extract_links(&&root, &Options::default());
        assert!(matches!(links, Ok(ref l) if l == &["http://x", "http://x"]));
    }

    #[test]
    fn test_custom_glue_and_base_url() {
        let root = Element::new("root").with_child(anchor("page.html").with_text("x"));
        let options = Options {
            glue: "/".to_string(),
            base_url: Some("https://example.com/docs/".to_string()),
            ..Options::default()
        };
        let found = collect_leaves(&&root, &options);
        let Ok(found) = found else {
            panic!("walk failed");
        };
        assert_eq!(found[0].path, "root/a");
        assert_eq!(found[0].link.as_deref(), Some("https://example.com/docs/page.html"));
    }

    #[test]
    fn test_walk_step_counts() {
        let root = Element::new("root")
            .with_child(Element::new("x").with_child(Element::new("y")).with_child(Element::new("z")))
            .with_child(Element::new("w"));
        let mut seen = 0;
        let step = walk_leaves(&&root, &Options::default(), &mut |_leaf: LeafRecord| {
            seen += 1;
            Ok(())
        });
        assert_eq!(step.ok(), Some(WalkStep { child_count: 2, emitted: 3 }));
        assert_eq!(seen, 3);
    }

    #[test]
    fn test_visitor_error_aborts_walk() {
        let root = Element::new("root")
            .with_child(Element::new("first"))
            .with_child(Element::new("second"));
        let mut visited = Vec::new();
        let result = walk_leaves(&&root, &Options::default(), &mut |leaf: LeafRecord| {
            visited.push(leaf.path);
            Err(Error::VisitorAborted("stop".to_string()))
        });
        assert!(matches!(result, Err(Error::VisitorAborted(_))));
        assert_eq!(visited, vec!["root.first".to_string()]);
    }
}
