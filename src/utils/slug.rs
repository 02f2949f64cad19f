//! Title slugification.
//!
//! Turns free-form titles into URL-safe identifiers:
//!
//! | Title                   | ascii                 | unicode          |
//! |-------------------------|-----------------------|------------------|
//! | `Hello, World!`         | `hello-world`         | `hello-world`    |
//! | `Don't Panic`           | `dont-panic`          | `dont-panic`     |
//! | `Café Crème`            | `cafe-creme`          | `café-crème`     |
//! | `你好 世界`              | `ni-hao-shi-jie`      | `你好-世界`       |
//! | `!!!`                   | (empty)               | (empty)          |

use crate::config::SlugMode;

/// Characters removed outright instead of becoming a word boundary
const ELIDED_CHARS: &[char] = &['\'', '\u{2019}', '"', '`'];

/// Convert text to a lower-case, hyphen-separated slug.
///
/// Runs of whitespace and punctuation collapse into a single hyphen; leading
/// and trailing hyphens are trimmed. May return an empty string.
pub fn slugify(text: &str, mode: SlugMode) -> String {
    let text = elide(text);
    match mode {
        SlugMode::Ascii => slug::slugify(text),
        SlugMode::Unicode => slugify_unicode(&text),
    }
}

/// Drop apostrophes and quotes so `Don't` stays one word.
fn elide(text: &str) -> String {
    text.chars().filter(|c| !ELIDED_CHARS.contains(c)).collect()
}

/// Same shape as [`slug::slugify`], but letters and digits outside ASCII
/// are kept instead of transliterated.
fn slugify_unicode(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut boundary = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if boundary && !slug.is_empty() {
                slug.push('-');
            }
            boundary = false;
            slug.extend(c.to_lowercase());
        } else {
            boundary = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Introduction", SlugMode::Ascii), "introduction");
        assert_eq!(slugify("Hello World", SlugMode::Ascii), "hello-world");
    }

    #[test]
    fn test_slugify_collapses_punctuation_and_whitespace() {
        assert_eq!(slugify("  Hello,   World!  ", SlugMode::Ascii), "hello-world");
        assert_eq!(slugify("C++ vs. Rust", SlugMode::Ascii), "c-vs-rust");
        assert_eq!(slugify("a\t-\nb", SlugMode::Ascii), "a-b");
    }

    #[test]
    fn test_slugify_elides_apostrophes() {
        assert_eq!(slugify("Don't Panic", SlugMode::Ascii), "dont-panic");
        assert_eq!(slugify("Don\u{2019}t Panic", SlugMode::Unicode), "dont-panic");
    }

    #[test]
    fn test_slugify_transliterates() {
        assert_eq!(slugify("Café Crème", SlugMode::Ascii), "cafe-creme");
        assert_eq!(slugify("Straße", SlugMode::Ascii), "strasse");
    }

    #[test]
    fn test_slugify_unicode_mode_keeps_letters() {
        assert_eq!(slugify("Café Crème", SlugMode::Unicode), "café-crème");
        assert_eq!(slugify("你好 世界", SlugMode::Unicode), "你好-世界");
    }

    #[test]
    fn test_slugify_digits() {
        assert_eq!(slugify("Part 2: The Return", SlugMode::Ascii), "part-2-the-return");
    }

    #[test]
    fn test_slugify_empty_results() {
        assert_eq!(slugify("", SlugMode::Ascii), "");
        assert_eq!(slugify("!!! ???", SlugMode::Ascii), "");
        assert_eq!(slugify("---", SlugMode::Unicode), "");
    }

    #[test]
    fn test_slugify_ascii_matches_slug_crate() {
        for title in ["Hello, World!", "C++ vs. Rust", "Café Crème", "你好 世界"] {
            assert_eq!(slugify(title, SlugMode::Ascii), slug::slugify(title));
        }
    }

    #[test]
    fn test_slugify_is_url_safe() {
        let slug = slugify("Ünïcödé <script> & \"quotes\" / path?", SlugMode::Ascii);
        assert!(slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
        assert!(!slug.starts_with('-') && !slug.ends_with('-'));
        assert!(!slug.contains("--"));
    }
}
