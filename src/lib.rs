//! Folio - content ingestion for Markdown blogs.
//!
//! Bundled Markdown sources are split into articles, their front matter is
//! decoded, and the resulting posts are collected into a [`PostRegistry`]
//! with unique slugs.

pub mod cli;
pub mod config;
pub mod content;
pub mod export;
pub mod logger;
pub mod pipeline;
pub mod post;
pub mod registry;
pub mod utils;

pub use config::SiteConfig;
pub use content::{FrontMatter, ParseError, RawSegment, RawSource};
pub use pipeline::{Failure, PipelineError, Report};
pub use post::{BuildError, Post, PostBuilder};
pub use registry::{IngestError, PostRegistry};
