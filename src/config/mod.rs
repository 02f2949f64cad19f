//! Configuration management for `folio.toml`.
//!
//! # Sections
//!
//! | Section   | Purpose                                           |
//! |-----------|---------------------------------------------------|
//! | `[build]` | Content/output paths, file extensions, separator |
//! | `[slug]`  | Slug transliteration mode and collision cap       |
//!
//! # Example
//!
//! ```toml
//! [build]
//! content = "content"
//! output = "public"
//! extensions = ["md", "markdown"]
//! separator = "<!-- folio:article-break -->"
//! parallel = true
//!
//! [slug]
//! mode = "ascii"
//! max_suffix = 0
//! ```

pub mod defaults;
mod error;

pub use error::ConfigError;

use crate::cli::Cli;
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// How titles are turned into slugs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlugMode {
    /// Transliterate to ASCII (e.g., "Café Crème" → "cafe-creme").
    #[default]
    Ascii,
    /// Keep non-ASCII letters and digits, lower-cased.
    Unicode,
}

/// Root configuration structure representing folio.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute project root (set after loading)
    #[serde(skip)]
    pub root: PathBuf,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub slug: SlugConfig,
}

/// `[build]` section
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Directory walked for content files
    #[serde(default = "defaults::build::content")]
    #[educe(Default = defaults::build::content())]
    pub content: PathBuf,

    /// Directory receiving `posts.json` and `tags.json`
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// File extensions treated as content sources (without the dot)
    #[serde(default = "defaults::build::extensions")]
    #[educe(Default = defaults::build::extensions())]
    pub extensions: Vec<String>,

    /// Literal token separating bundled articles; empty disables splitting
    #[serde(default = "defaults::build::separator")]
    #[educe(Default = defaults::build::separator())]
    pub separator: String,

    /// Split/parse/build sources on the rayon pool
    #[serde(default = "defaults::r#true")]
    #[educe(Default = defaults::r#true())]
    pub parallel: bool,
}

/// `[slug]` section
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SlugConfig {
    #[serde(default = "defaults::slug::mode")]
    #[educe(Default = defaults::slug::mode())]
    pub mode: SlugMode,

    /// Highest disambiguation suffix tried before ingestion fails (0 = unlimited)
    #[serde(default = "defaults::slug::max_suffix")]
    #[educe(Default = defaults::slug::max_suffix())]
    pub max_suffix: u32,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Resolve root and config file from the CLI, load (or default), apply
    /// overrides and validate.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = Self::normalize_path(&expand_tilde(
            cli.root.as_deref().unwrap_or(Path::new("./")),
        ));
        let config_path = root.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        config.config_path = config_path;
        config.update_with_cli(cli, &root);
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI overrides and make every directory absolute under `root`.
    pub fn update_with_cli(&mut self, cli: &Cli, root: &Path) {
        self.root = root.to_path_buf();

        Self::update_option(&mut self.build.content, cli.content.as_ref());
        Self::update_option(&mut self.build.output, cli.output.as_ref());

        self.build.content = Self::normalize_path(&root.join(expand_tilde(&self.build.content)));
        self.build.output = Self::normalize_path(&root.join(expand_tilde(&self.build.output)));
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.build.extensions.is_empty() {
            bail!(ConfigError::Validation(
                "[build.extensions] must list at least one extension".into()
            ));
        }

        if self.build.extensions.iter().any(|ext| ext.starts_with('.')) {
            bail!(ConfigError::Validation(
                "[build.extensions] entries are given without the leading dot".into()
            ));
        }

        let separator = self.build.separator.as_str();
        if !separator.is_empty() && separator.trim().is_empty() {
            bail!(ConfigError::Validation(
                "[build.separator] must not be whitespace only".into()
            ));
        }
        if crate::content::FENCES.iter().any(|(fence, _)| separator.trim() == *fence) {
            bail!(ConfigError::Validation(format!(
                "[build.separator] `{separator}` collides with a front matter fence"
            )));
        }

        Ok(())
    }

    /// Whether a path has one of the configured content extensions.
    pub fn is_content_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.build
                    .extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
