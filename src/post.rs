//! Post records and their construction.
//!
//! A [`Post`] is the validated output unit of the pipeline. Its fields are
//! private: the only way to obtain one is [`PostBuilder`], so every `Post`
//! in existence has a non-empty body and a non-empty slug.

use crate::{
    config::SlugMode,
    content::{FrontMatter, ParseError, RawSegment, parse},
    utils::slug::slugify,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{collections::BTreeSet, path::Path};
use thiserror::Error;

/// Record validation problems.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("post body is empty")]
    EmptyBody,

    #[error("invalid header: {0}")]
    InvalidHeader(#[from] ParseError),
}

/// One article, ready for a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    slug: String,
    #[serde(flatten)]
    front_matter: FrontMatter,
    source: String,
    ordinal: usize,
    word_count: usize,
    body: String,
}

impl Post {
    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn front_matter(&self) -> &FrontMatter {
        &self.front_matter
    }

    pub fn title(&self) -> Option<&str> {
        self.front_matter.title.as_deref()
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.front_matter.date
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.front_matter.tags
    }

    pub fn is_draft(&self) -> bool {
        self.front_matter.draft
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Only the registry renames posts, and only before they are stored.
    pub(crate) fn set_slug(&mut self, slug: String) {
        self.slug = slug;
    }
}

/// Turns parsed segments into [`Post`]s.
///
/// Pure: the same input always yields the same post. Slug uniqueness is not
/// checked here; see [`crate::registry::PostRegistry::ingest`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PostBuilder {
    mode: SlugMode,
}

impl PostBuilder {
    pub fn new(mode: SlugMode) -> Self {
        Self { mode }
    }

    /// Parse a raw segment and build it.
    pub fn build_segment(&self, segment: &RawSegment<'_>) -> Result<Post, BuildError> {
        let (header, body) = parse(segment)?;
        self.build(segment.source, segment.ordinal, header, body)
    }

    /// Validate `header` + `body` and compute the derived fields.
    ///
    /// The slug comes from the title; a missing title, or one without any
    /// letters or digits, falls back to `<source>-<ordinal>`.
    pub fn build(
        &self,
        source: &str,
        ordinal: usize,
        header: FrontMatter,
        body: &str,
    ) -> Result<Post, BuildError> {
        let body = trim_blank_lines(body);
        if body.is_empty() {
            return Err(BuildError::EmptyBody);
        }

        let slug = header
            .title
            .as_deref()
            .map(|title| slugify(title, self.mode))
            .filter(|slug| !slug.is_empty())
            .unwrap_or_else(|| self.fallback_slug(source, ordinal));

        Ok(Post {
            slug,
            word_count: body.split_whitespace().count(),
            body: body.to_owned(),
            front_matter: header,
            source: source.to_owned(),
            ordinal,
        })
    }

    fn fallback_slug(&self, source: &str, ordinal: usize) -> String {
        let stem = Path::new(source).with_extension("");
        let base = slugify(&stem.to_string_lossy(), self.mode);
        if base.is_empty() {
            format!("post-{ordinal}")
        } else {
            format!("{base}-{ordinal}")
        }
    }
}

/// Drop blank lines at both ends, keeping the first line's indentation.
fn trim_blank_lines(text: &str) -> &str {
    let text = text.trim_end();
    let start = text
        .split_inclusive('\n')
        .take_while(|line| line.trim().is_empty())
        .map(str::len)
        .sum::<usize>();
    &text[start..]
}
