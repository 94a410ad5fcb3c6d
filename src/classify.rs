//! Sibling-group classification.
//!
//! Decides whether a child tag under a given parent is rendered as a single
//! value or as an ordered list. The decision is local: the same tag name may
//! be a singleton under one parent and a list under another, so nothing is
//! memoized across parents.

use crate::node::TreeNode;

/// How a tag occurs among the children of one parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiblingGroup {
    /// Exactly one child carries the tag.
    Singleton,
    /// More than one child carries the tag.
    Multiple,
}

/// Number of children of `parent` whose tag is `tag`.
#[must_use]
pub fn sibling_count<N: TreeNode>(parent: &N, tag: &str) -> usize {
    parent
        .children()
        .iter()
        .filter(|child| child.name() == tag)
        .count()
}

/// Classify `tag` among the children of `parent`.
///
/// A tag with no occurrence at all is reported as `Singleton`; callers only
/// ask about tags they found among the children.
#[must_use]
pub fn classify<N: TreeNode>(parent: &N, tag: &str) -> SiblingGroup {
    if sibling_count(parent, tag) > 1 {
        SiblingGroup::Multiple
    } else {
        SiblingGroup::Singleton
    }
}
