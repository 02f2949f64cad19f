//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

pub fn r#true() -> bool {
    true
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn content() -> PathBuf {
        "content".into()
    }

    pub fn output() -> PathBuf {
        "public".into()
    }

    pub fn extensions() -> Vec<String> {
        vec!["md".into(), "markdown".into()]
    }

    pub fn separator() -> String {
        crate::content::DEFAULT_SEPARATOR.into()
    }
}

// ============================================================================
// [slug] Section Defaults
// ============================================================================

pub mod slug {
    use crate::config::SlugMode;

    pub fn mode() -> SlugMode {
        SlugMode::default()
    }

    /// 0 disables the cap.
    pub fn max_suffix() -> u32 {
        0
    }
}
