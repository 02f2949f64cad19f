//! JSON output for renderers.
//!
//! | File         | Content                                   |
//! |--------------|-------------------------------------------|
//! | `posts.json` | published posts, newest first             |
//! | `tags.json`  | tag → slugs of published posts            |

use crate::registry::PostRegistry;
use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const POSTS_FILE: &str = "posts.json";
pub const TAGS_FILE: &str = "tags.json";

pub fn posts_to_json(registry: &PostRegistry) -> Result<String> {
    serde_json::to_string_pretty(&registry.published()).context("Failed to serialize posts")
}

pub fn tags_to_json(registry: &PostRegistry) -> Result<String> {
    serde_json::to_string_pretty(&registry.tags()).context("Failed to serialize tags index")
}

/// Write `posts.json` and `tags.json` into `output_dir`, creating it if needed.
///
/// Returns the written paths.
pub fn write_to_disk(registry: &PostRegistry, output_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output dir: {}", output_dir.display()))?;

    let files = [
        (POSTS_FILE, posts_to_json(registry)?),
        (TAGS_FILE, tags_to_json(registry)?),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (name, json) in files {
        let path = output_dir.join(name);
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    Ok(written)
}
