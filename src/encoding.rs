//! Character encoding detection and transcoding.
//!
//! Raw markup is sniffed for a charset before it is handed to a parser.
//! Both HTML (`<meta>` declarations) and XML (`<?xml encoding=...?>`)
//! inputs are covered.

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Number of leading bytes inspected for a declaration.
const SNIFF_LEN: usize = 1024;

/// Match `<?xml version="1.0" encoding="..."?>`
#[allow(clippy::expect_used)]
static XML_DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*<\?xml[^>]*\bencoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#).expect("valid regex")
});

/// Match `<meta charset="...">`
#[allow(clippy::expect_used)]
static CHARSET_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>/]+)"#).expect("valid regex")
});

/// Match `<meta http-equiv="Content-Type" content="...; charset=...">`
#[allow(clippy::expect_used)]
static CONTENT_TYPE_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+http-equiv\s*=\s*["']?content-type["']?[^>]+content\s*=\s*["']?[^"'>]*;\s*charset\s*=\s*([^"'\s>]+)"#).expect("valid regex")
});

/// Where an encoding decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingSource {
    ByteOrderMark,
    XmlDeclaration,
    MetaCharset,
    ContentType,
    Default,
}

/// Detect the character encoding of raw markup.
///
/// Checked in order:
/// 1. Byte-order mark
/// 2. `<?xml ... encoding="..."?>`
/// 3. `<meta http-equiv="Content-Type" content="...; charset=...">`
/// 4. `<meta charset="...">`
/// 5. UTF-8
///
/// Unknown labels are skipped rather than treated as errors.
#[must_use]
pub fn detect_encoding(bytes: &[u8]) -> (&'static Encoding, EncodingSource) {
    if let Some((encoding, _bom_len)) = Encoding::for_bom(bytes) {
        return (encoding, EncodingSource::ByteOrderMark);
    }

    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(SNIFF_LEN)]);

    let candidates = [
        (&*XML_DECL_RE, EncodingSource::XmlDeclaration),
        // http-equiv first: its content attribute also matches the bare charset pattern
        (&*CONTENT_TYPE_CHARSET_RE, EncodingSource::ContentType),
        (&*CHARSET_META_RE, EncodingSource::MetaCharset),
    ];
    for (pattern, source) in candidates {
        let label = pattern
            .captures(&head)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str());
        if let Some(encoding) = label.and_then(|l| Encoding::for_label(l.as_bytes())) {
            return (encoding, source);
        }
    }

    (UTF_8, EncodingSource::Default)
}

/// Transcode raw markup to a UTF-8 string.
///
/// Invalid sequences become U+FFFD; this never fails. A byte-order mark is
/// stripped.
///
/// # Examples
///
/// ```
/// use rs_treemanager::encoding::transcode_to_utf8;
///
/// let xml = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><root>Caf\xE9</root>";
/// assert!(transcode_to_utf8(xml).contains("Café"));
/// ```
#[must_use]
pub fn transcode_to_utf8(bytes: &[u8]) -> String {
    let (encoding, source) = detect_encoding(bytes);
    tracing::trace!(encoding = encoding.name(), ?source, "transcoding markup");

    // decode() sniffs and strips the BOM itself
    let (decoded, _encoding_used, _had_errors) = encoding.decode(bytes);
    decoded.into_owned()
}

/// Rewrite the XML declaration of already-transcoded text to say UTF-8.
///
/// The declared label no longer describes the decoded string, and a parser
/// reading the declaration must not try to honour it.
#[must_use]
pub fn relabel_xml_declaration(text: &str) -> Cow<'_, str> {
    match XML_DECL_RE.captures(text).and_then(|c| c.get(1)) {
        Some(label) if !label.as_str().eq_ignore_ascii_case("utf-8") => {
            let mut relabeled = String::with_capacity(text.len());
            relabeled.push_str(&text[..label.start()]);
            relabeled.push_str("UTF-8");
            relabeled.push_str(&text[label.end()..]);
            Cow::Owned(relabeled)
        }
        _ => Cow::Borrowed(text),
    }
}
