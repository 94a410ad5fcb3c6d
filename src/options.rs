//! Configuration options for tree walking and serialization.
//!
//! The `Options` struct controls how leaf paths are built, which elements
//! count as anchors, and how deep the engine is willing to recurse.

use url::Url;

use crate::error::{Error, Result};

/// Configuration options for tree operations.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use rs_treemanager::Options;
///
/// // Use defaults
/// let options = Options::default();
/// assert_eq!(options.glue, ".");
///
/// // Customize specific fields
/// let options = Options {
///     glue: "/".to_string(),
///     base_url: Some("https://example.com/docs/".to_string()),
///     ..Options::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// Separator placed between tag names in leaf paths.
    ///
    /// Default: `"."`
    pub glue: String,

    /// Tag name that opens a new link context.
    ///
    /// Matched exactly. HTML input is already lower-cased by the parser.
    ///
    /// Default: `"a"`
    pub anchor_tag: String,

    /// Attribute on the anchor element that carries the link.
    ///
    /// Default: `"href"`
    pub link_attribute: String,

    /// Base URL used to resolve relative links.
    ///
    /// When `None`, links are reported exactly as written in the markup.
    ///
    /// Default: `None`
    pub base_url: Option<String>,

    /// Maximum nesting depth accepted by serialization and walking.
    ///
    /// Deeper trees fail with `Error::InvalidInput` instead of being
    /// partially processed.
    ///
    /// Default: `256`
    pub max_depth: usize,
}

impl Options {
    /// Parse `base_url`, if any.
    pub(crate) fn parsed_base_url(&self) -> Result<Option<Url>> {
        self.base_url
            .as_deref()
            .map(|raw| {
                Url::parse(raw)
                    .map_err(|e| Error::InvalidInput(format!("base_url '{raw}' is not a URL: {e}")))
            })
            .transpose()
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            glue: ".".to_string(),
            anchor_tag: "a".to_string(),
            link_attribute: "href".to_string(),
            base_url: None,
            max_depth: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = Options::default();
        assert_eq!(options.glue, ".");
        assert_eq!(options.anchor_tag, "a");
        assert_eq!(options.link_attribute, "href");
        assert!(options.base_url.is_none());
        assert_eq!(options.max_depth, 256);
    }

    #[test]
    fn test_parsed_base_url() {
        let options = Options {
            base_url: Some("https://example.com/a/".to_string()),
            ..Options::default()
        };
        let base = options.parsed_base_url();
        assert!(matches!(base, Ok(Some(ref u)) if u.host_str() == Some("example.com")));

        assert!(matches!(Options::default().parsed_base_url(), Ok(None)));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let options = Options {
            base_url: Some("not a url".to_string()),
            ..Options::default()
        };
        assert!(matches!(
            options.parsed_base_url(),
            Err(Error::InvalidInput(_))
        ));
    }
}
