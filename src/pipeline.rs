//! Build orchestration: content directory in, registry and report out.
//!
//! # Architecture
//!
//! ```text
//! run()
//!     │
//!     ├── load_sources()      walk content dir → Vec<RawSource> (sorted by id)
//!     │
//!     └── ingest_sources()
//!             │
//!             ├── par_iter over sources (rayon, order preserving)
//!             │       split() → build_segment() per segment
//!             │
//!             └── sequential ingest in (source, ordinal) order
//!                     → PostRegistry + Report
//! ```
//!
//! Splitting, parsing and building have no cross-source state, so they run
//! in parallel. Ingestion is single-writer: slug disambiguation depends on
//! ingestion order, and results are ingested in the same order whether the
//! pool ran or not.

use crate::{
    config::SiteConfig,
    content::{RawSource, split},
    log,
    post::{BuildError, Post, PostBuilder},
    registry::{IngestError, PostRegistry},
};
use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use std::{fmt, fs};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Why a single segment did not make it into the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

/// A rejected segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub source: String,
    pub ordinal: usize,
    pub error: PipelineError,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}: {}", self.source, self.ordinal, self.error)
    }
}

/// Aggregate outcome of one build.
#[derive(Debug, Default)]
pub struct Report {
    pub sources: usize,
    pub segments: usize,
    pub ingested: usize,
    pub failures: Vec<Failure>,
}

impl Report {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Built (or rejected) segments of one source, in ordinal order.
type SourceResults = Vec<(usize, Result<Post, BuildError>)>;

/// Load sources and ingest them into a fresh registry.
///
/// Only unreadable files or a missing content directory are errors; every
/// per-segment problem ends up in the report.
pub fn run(config: &SiteConfig) -> Result<(PostRegistry, Report)> {
    let sources = load_sources(config)?;
    log!("ingest"; "found {} sources", sources.len());
    Ok(ingest_sources(&sources, config))
}

/// Read every content file under `[build.content]`, sorted by id.
///
/// Hidden files and directories are skipped. Only a file that cannot be
/// read at all is an error; bad encoding is repaired per file.
pub fn load_sources(config: &SiteConfig) -> Result<Vec<RawSource>> {
    let content_dir = &config.build.content;
    if !content_dir.is_dir() {
        bail!("Content directory not found: {}", content_dir.display());
    }

    let mut sources = Vec::new();
    for entry in WalkDir::new(content_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
    {
        let entry = entry.with_context(|| format!("Failed to walk {}", content_dir.display()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || !config.is_content_file(path) {
            continue;
        }

        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read content file: {}", path.display()))?;
        let id = RawSource::id_for(path, content_dir);
        let text = decode_text(&id, bytes);
        sources.push(RawSource::new(id, text));
    }

    sources.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(sources)
}

/// Invalid UTF-8 sequences become U+FFFD; the file is still ingested.
fn decode_text(id: &str, bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|err| {
        log!("warn"; "{} is not valid UTF-8, invalid bytes replaced", id);
        String::from_utf8_lossy(err.as_bytes()).into_owned()
    })
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

/// Split, parse and build every source, then ingest in deterministic order.
pub fn ingest_sources(sources: &[RawSource], config: &SiteConfig) -> (PostRegistry, Report) {
    let builder = PostBuilder::new(config.slug.mode);
    let separator = config.build.separator.as_str();
    let process = |source: &RawSource| -> SourceResults {
        split(source, separator)
            .map(|segment| (segment.ordinal, builder.build_segment(&segment)))
            .collect()
    };

    let results: Vec<SourceResults> = if config.build.parallel {
        sources.par_iter().map(process).collect()
    } else {
        sources.iter().map(process).collect()
    };

    let mut registry = PostRegistry::with_max_suffix(config.slug.max_suffix);
    let mut report = Report {
        sources: sources.len(),
        ..Report::default()
    };

    for (source, segments) in sources.iter().zip(results) {
        for (ordinal, built) in segments {
            report.segments += 1;
            let outcome = built
                .map_err(PipelineError::from)
                .and_then(|post| registry.ingest(post).map(|_| ()).map_err(PipelineError::from));

            match outcome {
                Ok(()) => report.ingested += 1,
                Err(error) => {
                    let failure = Failure {
                        source: source.id.clone(),
                        ordinal,
                        error,
                    };
                    log!("error"; "{}", failure);
                    report.failures.push(failure);
                }
            }
        }
    }

    (registry, report)
}
