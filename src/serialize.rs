//! Tree-to-map serialization.
//!
//! Converts a tree into a generic nested structure suitable for JSON:
//!
//! - a node without children becomes a [`SerializedValue::Leaf`] carrying its text
//! - a node with children becomes a [`SerializedValue::Group`] keyed by child tag
//! - within a group, a tag that occurs once maps to a bare value and a tag
//!   that occurs more than once maps to a list in document order
//!
//! Serialization is pure. A failure anywhere (only the depth guard can fail)
//! aborts the whole conversion; no partial tree is ever returned.

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::classify::{classify, SiblingGroup};
use crate::error::{Error, Result};
use crate::node::TreeNode;
use crate::options::Options;

/// JSON key used for a non-empty attribute map.
///
/// `@` cannot start an XML name, so this never collides with a child tag.
pub const ATTRIBUTES_KEY: &str = "@attributes";

/// JSON key holding the text of a leaf.
pub const VALUE_KEY: &str = "value";

/// Serialized form of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializedValue {
    /// Node with zero children.
    Leaf {
        attributes: BTreeMap<String, String>,
        value: String,
    },
    /// Node with at least one child.
    Group {
        attributes: BTreeMap<String, String>,
        children: ChildMap,
    },
}

impl SerializedValue {
    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        match self {
            Self::Leaf { attributes, .. } | Self::Group { attributes, .. } => attributes,
        }
    }

    /// Leaf text, `None` for groups.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Leaf { value, .. } => Some(value),
            Self::Group { .. } => None,
        }
    }

    /// Child entries, `None` for leaves.
    #[must_use]
    pub fn children(&self) -> Option<&ChildMap> {
        match self {
            Self::Leaf { .. } => None,
            Self::Group { children, .. } => Some(children),
        }
    }

    /// Entry for a child tag.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&ChildEntry> {
        self.children().and_then(|children| children.get(tag))
    }
}

/// What a child tag maps to inside a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChildEntry {
    /// The tag occurs exactly once under this parent.
    Single(SerializedValue),
    /// The tag occurs more than once; values in document order.
    Sequence(Vec<SerializedValue>),
}

impl ChildEntry {
    #[must_use]
    pub fn as_single(&self) -> Option<&SerializedValue> {
        match self {
            Self::Single(value) => Some(value),
            Self::Sequence(_) => None,
        }
    }

    #[must_use]
    pub fn as_sequence(&self) -> Option<&[SerializedValue]> {
        match self {
            Self::Single(_) => None,
            Self::Sequence(values) => Some(values),
        }
    }
}

/// Child entries of a group, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildMap {
    entries: Vec<(String, ChildEntry)>,
}

impl ChildMap {
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&ChildEntry> {
        self.entries
            .iter()
            .find_map(|(key, entry)| (key == tag).then_some(entry))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChildEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add `value` under `tag`, shaped by the tag's sibling group.
    fn insert(&mut self, tag: String, group: SiblingGroup, value: SerializedValue) {
        if let Some((_, entry)) = self.entries.iter_mut().find(|(key, _)| *key == tag) {
            match entry {
                ChildEntry::Sequence(values) => values.push(value),
                ChildEntry::Single(_) => {
                    let previous = std::mem::replace(entry, ChildEntry::Sequence(Vec::new()));
                    if let ChildEntry::Single(first) = previous {
                        *entry = ChildEntry::Sequence(vec![first, value]);
                    }
                }
            }
            return;
        }

        let entry = match group {
            SiblingGroup::Singleton => ChildEntry::Single(value),
            SiblingGroup::Multiple => ChildEntry::Sequence(vec![value]),
        };
        self.entries.push((tag, entry));
    }
}

/// Serialized tree: `{ root_tag: value }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedTree {
    pub root: String,
    pub value: SerializedValue,
}

impl Serialize for SerializedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if !self.attributes().is_empty() {
            map.serialize_entry(ATTRIBUTES_KEY, self.attributes())?;
        }
        match self {
            Self::Leaf { value, .. } => map.serialize_entry(VALUE_KEY, value)?,
            Self::Group { children, .. } => {
                for (tag, entry) in children.iter() {
                    map.serialize_entry(tag, entry)?;
                }
            }
        }
        map.end()
    }
}

impl Serialize for SerializedTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.root, &self.value)?;
        map.end()
    }
}

/// Serialize a single node (without the root wrapper).
pub fn serialize<N: TreeNode>(node: &N, options: &Options) -> Result<SerializedValue> {
    serialize_at(node, 0, options.max_depth)
}

fn serialize_at<N: TreeNode>(node: &N, depth: usize, max_depth: usize) -> Result<SerializedValue> {
    if depth > max_depth {
        return Err(Error::InvalidInput(format!(
            "tree is deeper than the configured maximum of {max_depth} levels"
        )));
    }

    let attributes: BTreeMap<String, String> = node.attributes().into_iter().collect();
    let children = node.children();
    if children.is_empty() {
        return Ok(SerializedValue::Leaf {
            attributes,
            value: node.text().into_owned(),
        });
    }

    let mut map = ChildMap::default();
    for child in &children {
        let tag = child.name().into_owned();
        let group = match map.get(&tag) {
            Some(_) => SiblingGroup::Multiple,
            None => classify(node, &tag),
        };
        let value = serialize_at(child, depth + 1, max_depth)?;
        map.insert(tag, group, value);
    }

    Ok(SerializedValue::Group {
        attributes,
        children: map,
    })
}

/// Serialize a tree, wrapping the result under the root's tag name.
///
/// # Example
///
/// ```rust
/// use rs_treemanager::{parse_xml, serialize::to_map, Options};
///
/// let root = parse_xml("<root><item>1</item><item>2</item></root>")?;
/// let tree = to_map(&&root, &Options::default())?;
/// let items = tree.value.get("item").and_then(|e| e.as_sequence());
/// assert_eq!(items.map(<[_]>::len), Some(2));
/// # Ok::<(), rs_treemanager::Error>(())
/// ```
pub fn to_map<N: TreeNode>(root: &N, options: &Options) -> Result<SerializedTree> {
    Ok(SerializedTree {
        root: root.name().into_owned(),
        value: serialize(root, options)?,
    })
}

/// Serialize a tree straight into a `serde_json::Value`.
pub fn to_value<N: TreeNode>(root: &N, options: &Options) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(to_map(root, options)?)?)
}

/// Serialize a tree to a compact JSON string.
pub fn to_json<N: TreeNode>(root: &N, options: &Options) -> Result<String> {
    Ok(serde_json::to_string(&to_map(root, options)?)?)
}

/// Serialize a tree to an indented JSON string.
pub fn to_json_pretty<N: TreeNode>(root: &N, options: &Options) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_map(root, options)?)?)
}
