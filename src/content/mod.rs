//! Raw content sources and the first two pipeline stages.
//!
//! ```text
//! RawSource ──split()──► RawSegment* ──parse()──► (FrontMatter, body)
//! ```
//!
//! A source is one content file. It may bundle several articles joined by a
//! literal separator token; each article becomes one [`RawSegment`] that
//! borrows from the source text.

pub mod front_matter;
pub mod splitter;

pub use front_matter::{FrontMatter, ParseError, parse};
pub use splitter::split;

use std::path::Path;

/// Separator token placed between bundled articles.
///
/// Treated as an opaque literal; nothing inspects its inner structure.
pub const DEFAULT_SEPARATOR: &str = "<!-- folio:article-break -->";

/// Front matter fence markers and the header dialect each one opens.
pub const FENCES: &[(&str, FenceKind)] = &[("---", FenceKind::Yaml), ("+++", FenceKind::Toml)];

/// Header dialect selected by the opening fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceKind {
    Yaml,
    Toml,
}

/// One content file's text and the identifier it is reported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSource {
    /// Path relative to the content root with `/` separators, or a free-form name.
    pub id: String,
    pub text: String,
}

impl RawSource {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// Build the identifier from `path` relative to `root`.
    ///
    /// Falls back to the full path when `path` is not under `root`.
    pub fn id_for(path: &Path, root: &Path) -> String {
        path.strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

/// A contiguous slice of a [`RawSource`] holding one logical article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSegment<'a> {
    pub source: &'a str,
    /// 0-based position within the source
    pub ordinal: usize,
    pub text: &'a str,
}
