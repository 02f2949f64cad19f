//! The per-build collection of ingested posts.
//!
//! A registry is created empty for each build, filled through
//! [`PostRegistry::ingest`], and read once ingestion is over. Ingestion takes
//! `&mut self`, so reads can never interleave with writes and the order of
//! `ingest` calls alone decides how slug collisions are resolved.
//!
//! # Slug collisions
//!
//! Duplicate titles are expected when bundles are concatenated. The first
//! post keeps its slug, later ones get the first free `-2`, `-3`, … suffix
//! in ingestion order:
//!
//! ```text
//! ingest("Introduction")  → introduction
//! ingest("Introduction")  → introduction-2
//! ingest("Introduction 3")→ introduction-3
//! ingest("Introduction")  → introduction-4
//! ```

use crate::{log, post::Post};
use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use std::{cmp::Ordering, collections::BTreeMap};
use thiserror::Error;

/// Registry-level conflicts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("no free slug for `{base}` up to suffix -{max_suffix}")]
    SuffixExhausted { base: String, max_suffix: u32 },
}

/// Tag → slugs of the posts carrying it, alphabetical by tag.
pub type TagIndex<'a> = BTreeMap<&'a str, Vec<&'a str>>;

/// Newest first; undated posts after dated ones.
fn compare_by_date(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Owning, write-once collection of the posts of one build.
#[derive(Debug, Default)]
pub struct PostRegistry {
    /// Ingestion order
    posts: Vec<Post>,
    /// Slug → index into `posts`
    slugs: FxHashMap<String, usize>,
    /// Base slug → lowest suffix not yet known to be taken
    next_suffix: FxHashMap<String, u32>,
    /// 0 = unlimited
    max_suffix: u32,
}

impl PostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that gives up after `-{max_suffix}` (0 = never).
    pub fn with_max_suffix(max_suffix: u32) -> Self {
        Self {
            max_suffix,
            ..Self::default()
        }
    }

    /// Add a post, renaming it if its slug is already taken.
    ///
    /// Returns the stored post with its final slug.
    pub fn ingest(&mut self, mut post: Post) -> Result<&Post, IngestError> {
        if self.slugs.contains_key(post.slug()) {
            let base = post.slug().to_owned();
            let slug = self.free_slug(&base)?;
            log!(
                "warn";
                "slug `{}` taken, {}#{} ingested as `{}`",
                base,
                post.source(),
                post.ordinal(),
                slug
            );
            post.set_slug(slug);
        }

        let index = self.posts.len();
        self.slugs.insert(post.slug().to_owned(), index);
        self.posts.push(post);
        Ok(&self.posts[index])
    }

    /// First `base-N` (N ≥ 2) not in use.
    fn free_slug(&mut self, base: &str) -> Result<String, IngestError> {
        let max_suffix = self.max_suffix;
        let exhausted = || IngestError::SuffixExhausted {
            base: base.to_owned(),
            max_suffix,
        };

        let mut suffix = self.next_suffix.get(base).copied().unwrap_or(2);
        loop {
            if max_suffix != 0 && suffix > max_suffix {
                return Err(exhausted());
            }
            let candidate = format!("{base}-{suffix}");
            let next = suffix.checked_add(1).ok_or_else(exhausted)?;
            if !self.slugs.contains_key(&candidate) {
                self.next_suffix.insert(base.to_owned(), next);
                return Ok(candidate);
            }
            suffix = next;
        }
    }

    /// All posts, newest first; ties keep ingestion order.
    pub fn all(&self) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.posts.iter().collect();
        posts.sort_by(|a, b| compare_by_date(a.date(), b.date()));
        posts
    }

    /// Posts carrying `tag` (case-insensitive), in [`Self::all`] order.
    pub fn by_tag(&self, tag: &str) -> Vec<&Post> {
        self.all()
            .into_iter()
            .filter(|post| post.front_matter().has_tag(tag))
            .collect()
    }

    /// [`Self::all`] without drafts.
    pub fn published(&self) -> Vec<&Post> {
        self.all().into_iter().filter(|post| !post.is_draft()).collect()
    }

    /// Tag index over published posts; slugs within a tag in [`Self::all`] order.
    pub fn tags(&self) -> TagIndex<'_> {
        let mut index = TagIndex::new();
        for post in self.published() {
            for tag in post.tags() {
                index.entry(tag.as_str()).or_default().push(post.slug());
            }
        }
        index
    }

    pub fn get(&self, slug: &str) -> Option<&Post> {
        self.slugs.get(slug).map(|&index| &self.posts[index])
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}
