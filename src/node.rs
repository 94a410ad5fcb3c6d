//! Tree Node Adapter
//!
//! A uniform read-only view over parsed markup nodes. The engine never walks
//! parser types directly; it goes through [`TreeNode`], which is implemented
//! for:
//!
//! - [`Element`], the owned lightweight element view kept by `TreeManager`
//! - `roxmltree::Node`, for callers holding a borrowed XML document
//! - `dom_query::NodeRef`, for nodes of a full HTML document
//!
//! Only element children are exposed. Text, comment and processing
//! instruction nodes never show up in [`TreeNode::children`]; direct text
//! children are concatenated into [`TreeNode::text`].

use std::borrow::Cow;

use dom_query::NodeRef;

use crate::error::Result;

/// Read-only projection of one markup element.
///
/// Implementors must describe a finite, acyclic tree. That is a contract of
/// the parser that produced the nodes, not something checked here.
pub trait TreeNode: Sized {
    /// Tag name, without namespace prefix.
    fn name(&self) -> Cow<'_, str>;

    /// Attributes in document order. Names are unique within a node.
    fn attributes(&self) -> Vec<(String, String)>;

    /// The node's own text, excluding descendant text.
    fn text(&self) -> Cow<'_, str>;

    /// Element children in document order.
    fn children(&self) -> Vec<Self>;

    /// Value of a single attribute.
    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes()
            .into_iter()
            .find_map(|(key, value)| (key == name).then_some(value))
    }
}

/// Owned element tree: the lightweight element view.
///
/// Built from parser output with [`Element::from_node`], or by hand with the
/// builder methods.
///
/// # Example
///
/// ```rust
/// use rs_treemanager::{Element, TreeNode};
///
/// let root = Element::new("root")
///     .with_child(Element::new("item").with_text("1"))
///     .with_child(Element::new("item").with_text("2"));
///
/// let node = &root;
/// assert_eq!(node.children().len(), 2);
/// assert_eq!(node.children()[1].text(), "2");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    /// Create an empty element with the given tag name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse strict XML into an element view.
    ///
    /// Shorthand for [`crate::parse::parse_xml`].
    pub fn parse(xml: &str) -> Result<Self> {
        crate::parse::parse_xml(xml)
    }

    /// Snapshot any [`TreeNode`] into an owned element tree.
    #[must_use]
    pub fn from_node<N: TreeNode>(node: &N) -> Self {
        Self {
            name: node.name().into_owned(),
            attributes: node.attributes(),
            text: node.text().into_owned(),
            children: node.children().iter().map(Self::from_node).collect(),
        }
    }

    /// Builder: set an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder: set the element's own text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Builder: append a child.
    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Set an attribute, replacing an existing one with the same name.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Append an existing element as the last child.
    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Append a new text-only child and return it.
    pub fn add_child(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Element {
        self.children.push(Element::new(name).with_text(value));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find_map(|(key, value)| (key == name).then_some(value.as_str()))
    }

    #[must_use]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// First direct child whose attribute `name` equals `value`.
    #[must_use]
    pub fn query_attribute(&self, name: &str, value: &str) -> Option<&Element> {
        self.children
            .iter()
            .find(|&child| Element::attribute(child, name) == Some(value))
    }
}

impl<'a> TreeNode for &'a Element {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }

    fn attributes(&self) -> Vec<(String, String)> {
        self.attributes.clone()
    }

    fn text(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.text)
    }

    fn children(&self) -> Vec<Self> {
        let element: &'a Element = self;
        element.children.iter().collect()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        Element::attribute(self, name).map(str::to_string)
    }
}

impl<'a, 'input> TreeNode for roxmltree::Node<'a, 'input> {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.tag_name().name())
    }

    fn attributes(&self) -> Vec<(String, String)> {
        roxmltree::Node::attributes(self)
            .map(|attr| (attr.name().to_string(), attr.value().to_string()))
            .collect()
    }

    fn text(&self) -> Cow<'_, str> {
        let mut texts = roxmltree::Node::children(self)
            .filter(roxmltree::Node::is_text)
            .filter_map(|child| child.text());

        // Single text child is the common case; borrow it.
        match (texts.next(), texts.next()) {
            (None, _) => Cow::Borrowed(""),
            (Some(only), None) => Cow::Borrowed(only),
            (Some(first), Some(second)) => {
                let mut joined = String::from(first);
                joined.push_str(second);
                texts.for_each(|rest| joined.push_str(rest));
                Cow::Owned(joined)
            }
        }
    }

    fn children(&self) -> Vec<Self> {
        roxmltree::Node::children(self)
            .filter(roxmltree::Node::is_element)
            .collect()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        roxmltree::Node::attribute(self, name).map(str::to_string)
    }
}

impl TreeNode for NodeRef<'_> {
    fn name(&self) -> Cow<'_, str> {
        Cow::Owned(
            self.node_name()
                .map(|tag| tag.to_string())
                .unwrap_or_default(),
        )
    }

    fn attributes(&self) -> Vec<(String, String)> {
        self.attrs()
            .iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect()
    }

    fn text(&self) -> Cow<'_, str> {
        Cow::Owned(
            NodeRef::children(self)
                .iter()
                .filter(|child| child.is_text())
                .map(|child| child.text().to_string())
                .collect(),
        )
    }

    fn children(&self) -> Vec<Self> {
        NodeRef::children(self)
            .into_iter()
            .filter(NodeRef::is_element)
            .collect()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attr(name).map(|value| value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_accessors() {
        let mut root = Element::new("root").with_attribute("id", "r1");
        root.add_child("item", "1").set_attribute("kind", "first");
        root.add_child("item", "2");

        assert_eq!(root.name(), "root");
        assert_eq!(root.attribute("id"), Some("r1"));
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.children()[0].attribute("kind"), Some("first"));
        assert_eq!(root.children()[1].text(), "2");
    }

    #[test]
    fn test_parse_then_push_child() {
        let Ok(mut root) = Element::parse("<root><a>1</a></root>") else {
            panic!("valid xml failed to parse");
        };
        root.push_child(Element::new("b").with_text("2"));

        let names: Vec<&str> = root.children().iter().map(Element::name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(Element::parse("<root>").is_err());
    }

    #[test]
    fn test_set_attribute_replaces() {
        let element = Element::new("a")
            .with_attribute("href", "one")
            .with_attribute("href", "two");
        assert_eq!(element.attributes(), &[("href".to_string(), "two".to_string())]);
    }

    #[test]
    fn test_query_attribute_first_match() {
        let root = Element::new("list")
            .with_child(Element::new("entry").with_attribute("name", "x").with_text("first"))
            .with_child(Element::new("entry").with_attribute("name", "link").with_text("second"))
            .with_child(Element::new("entry").with_attribute("name", "link").with_text("third"));

        let found = root.query_attribute("name", "link").map(Element::text);
        assert_eq!(found, Some("second"));
        assert!(root.query_attribute("name", "missing").is_none());
    }

    #[test]
    fn test_roxmltree_adapter_own_text_and_element_children() {
        let xml = "<root>head<!-- note --><a href=\"x\">hi</a>tail<b/></root>";
        let doc = match roxmltree::Document::parse(xml) {
            Ok(doc) => doc,
            Err(e) => panic!("valid xml failed to parse: {e}"),
        };
        let root = doc.root_element();

        assert_eq!(TreeNode::name(&root), "root");
        assert_eq!(TreeNode::text(&root), "headtail");
        let children = TreeNode::children(&root);
        assert_eq!(children.len(), 2);
        assert_eq!(TreeNode::attribute(&children[0], "href").as_deref(), Some("x"));
    }

    #[test]
    fn test_dom_query_adapter() {
        let doc = dom_query::Document::from("<div id=\"d\">own<p>inner</p></div>");
        let selection = doc.select("div");
        let Some(div) = selection.nodes().first().copied() else {
            panic!("div must exist");
        };

        assert_eq!(TreeNode::name(&div), "div");
        assert_eq!(TreeNode::text(&div), "own");
        assert_eq!(TreeNode::attribute(&div, "id").as_deref(), Some("d"));
        let children = TreeNode::children(&div);
        assert_eq!(children.len(), 1);
        assert_eq!(TreeNode::name(&children[0]), "p");
    }

    #[test]
    fn test_from_node_snapshot_matches_source() {
        let xml = "<root x=\"1\"><item>1</item><item>2</item></root>";
        let doc = match roxmltree::Document::parse(xml) {
            Ok(doc) => doc,
            Err(e) => panic!("valid xml failed to parse: {e}"),
        };
        let element = Element::from_node(&doc.root_element());

        let expected = Element::new("root")
            .with_attribute("x", "1")
            .with_child(Element::new("item").with_text("1"))
            .with_child(Element::new("item").with_text("2"));
        assert_eq!(element, expected);
    }
}
