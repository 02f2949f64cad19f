//! Front matter extraction.
//!
//! A segment may open with a metadata header fenced by a marker line and
//! closed by the same marker:
//!
//! ```markdown
//! ---
//! title: "Writing a Parser"
//! date: 2024-01-15
//! tags: [rust, parsing]
//! authors:
//!   - Ada
//! ---
//!
//! Body starts here.
//! ```
//!
//! `---` opens a YAML header, `+++` a TOML one. Both dialects decode to the
//! same [`FrontMatter`]. A segment whose first non-blank line is not a fence
//! has no header at all and is returned whole as body.
//!
//! # Keys
//!
//! | Key                     | Accepted values                          |
//! |-------------------------|------------------------------------------|
//! | `title`                 | string (surrounding quotes stripped)     |
//! | `date`                  | ISO-8601 date or date-time               |
//! | `tags`                  | list, or comma-separated string          |
//! | `authors` / `author`    | list, or single string                   |
//! | `summary` / `description` | string                                 |
//! | `draft`                 | boolean                                  |
//!
//! Any other key is ignored.

use super::{FENCES, FenceKind, RawSegment};
use crate::utils::date::parse_date;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeSet;
use thiserror::Error;

/// Pseudo-key reported when the header as a whole cannot be decoded
const HEADER_KEY: &str = "<header>";

/// Opening/closing quote pairs stripped from around a title
const TITLE_QUOTES: &[(char, char)] = &[
    ('"', '"'),
    ('\'', '\''),
    ('`', '`'),
    ('\u{201c}', '\u{201d}'),
    ('\u{2018}', '\u{2019}'),
];

/// Structural problems with a segment's header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("front matter opened with `{fence}` is never closed")]
    MissingFence { fence: &'static str },

    #[error("front matter field `{key}` is malformed: {reason}")]
    MalformedField { key: &'static str, reason: String },

    #[error("nothing follows the front matter")]
    EmptyBody,
}

fn malformed(key: &'static str, reason: impl Into<String>) -> ParseError {
    ParseError::MalformedField {
        key,
        reason: reason.into(),
    }
}

/// Metadata decoded from a segment header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrontMatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,

    /// Lower-cased and deduplicated
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub draft: bool,
}

impl FrontMatter {
    /// Serialize as a YAML mapping (without fences) that [`parse`] reads back
    /// to an equal value.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(&tag.trim().to_lowercase())
    }
}

/// Split a segment into its header and body.
///
/// Returns a default header and the untouched text when the segment has no
/// opening fence. The returned body never contains the header.
///
/// # Errors
///
/// - [`ParseError::MissingFence`]: opening fence without a closing one
/// - [`ParseError::MalformedField`]: header syntax error, or a known key
///   holding a value of the wrong shape (including unparseable dates)
/// - [`ParseError::EmptyBody`]: only whitespace after the closing fence
pub fn parse<'a>(segment: &RawSegment<'a>) -> Result<(FrontMatter, &'a str), ParseError> {
    let text = segment.text;
    let rest = &text[leading_blank_len(text)..];
    let rest = rest.strip_prefix('\u{feff}').unwrap_or(rest);

    let (first_line, after_open) = match rest.find('\n') {
        Some(pos) => (&rest[..pos], &rest[pos + 1..]),
        None => (rest, ""),
    };
    let Some(&(fence, kind)) = FENCES
        .iter()
        .find(|(fence, _)| first_line.trim_end() == *fence)
    else {
        return Ok((FrontMatter::default(), text));
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end() == fence {
            let header = &after_open[..offset];
            let body = &after_open[offset + line.len()..];

            if body.trim().is_empty() {
                return Err(ParseError::EmptyBody);
            }
            return Ok((decode(header, kind)?, body));
        }
        offset += line.len();
    }

    Err(ParseError::MissingFence { fence })
}

/// Byte length of the blank lines at the start of `text`.
fn leading_blank_len(text: &str) -> usize {
    text.split_inclusive('\n')
        .take_while(|line| line.trim().is_empty() && line.ends_with('\n'))
        .map(str::len)
        .sum()
}

fn decode(header: &str, kind: FenceKind) -> Result<FrontMatter, ParseError> {
    let value = match kind {
        FenceKind::Yaml => {
            serde_yaml::from_str::<Value>(header).map_err(|e| malformed(HEADER_KEY, e.to_string()))?
        }
        FenceKind::Toml => header
            .parse::<toml::Table>()
            .map(|table| toml_to_yaml(toml::Value::Table(table)))
            .map_err(|e| malformed(HEADER_KEY, e.message().to_owned()))?,
    };

    let fields = match value {
        Value::Mapping(map) => map,
        Value::Null => Mapping::new(),
        _ => return Err(malformed(HEADER_KEY, "expected key/value pairs")),
    };

    Ok(FrontMatter {
        title: decode_title(fields.get("title"))?,
        date: decode_date(lookup(&fields, &["date"]))?,
        tags: decode_list("tags", lookup(&fields, &["tags"]), Some(','))?
            .into_iter()
            .map(|tag| tag.to_lowercase())
            .collect(),
        authors: decode_list("authors", lookup(&fields, &["authors", "author"]), None)?,
        summary: decode_summary(lookup(&fields, &["summary", "description"]))?,
        draft: decode_draft(lookup(&fields, &["draft"]))?,
    })
}

/// First present key wins; null counts as absent.
fn lookup<'v>(fields: &'v Mapping, keys: &[&str]) -> Option<&'v Value> {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .find(|value| !value.is_null())
}

fn scalar_string(key: &'static str, value: &Value) -> Result<String, ParseError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(malformed(key, "expected a string")),
    }
}

fn decode_title(value: Option<&Value>) -> Result<Option<String>, ParseError> {
    let value = match value {
        None => return Ok(None),
        Some(Value::Null) => return Err(malformed("title", "empty title")),
        Some(value) => value,
    };
    let raw = scalar_string("title", value)?;
    let title = strip_quotes(&raw);
    if title.is_empty() {
        return Err(malformed("title", "empty title"));
    }
    Ok(Some(title.to_owned()))
}

/// Peel matching quote pairs (and surrounding whitespace) off both ends.
///
/// A pair only wraps the title when neither quote character reappears
/// inside it: `"Rust" vs "Go"` starts and ends with quotes that belong to
/// two different quotations and is kept as is.
fn strip_quotes(mut s: &str) -> &str {
    loop {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next_back()) {
            (Some(open), Some(close))
                if TITLE_QUOTES.contains(&(open, close))
                    && !chars.as_str().contains([open, close]) =>
            {
                s = chars.as_str();
            }
            _ => return trimmed,
        }
    }
}

fn decode_date(value: Option<&Value>) -> Result<Option<DateTime<Utc>>, ParseError> {
    match value {
        None => Ok(None),
        Some(Value::String(s)) => parse_date(s)
            .map(Some)
            .ok_or_else(|| malformed("date", format!("`{s}` is not an ISO-8601 date"))),
        Some(_) => Err(malformed("date", "expected an ISO-8601 date string")),
    }
}

/// A sequence of scalars, or one string (split on `delimiter` when given).
fn decode_list(
    key: &'static str,
    value: Option<&Value>,
    delimiter: Option<char>,
) -> Result<Vec<String>, ParseError> {
    let items = match value {
        None => return Ok(Vec::new()),
        Some(Value::Sequence(seq)) => seq
            .iter()
            .map(|item| scalar_string(key, item))
            .collect::<Result<Vec<_>, _>>()?,
        Some(Value::String(s)) => match delimiter {
            Some(delimiter) => s.split(delimiter).map(str::to_owned).collect(),
            None => vec![s.clone()],
        },
        Some(_) => return Err(malformed(key, "expected a list of strings")),
    };

    Ok(items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect())
}

fn decode_summary(value: Option<&Value>) -> Result<Option<String>, ParseError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let summary = scalar_string("summary", value)?;
    let summary = summary.trim();
    Ok((!summary.is_empty()).then(|| summary.to_owned()))
}

fn decode_draft(value: Option<&Value>) -> Result<bool, ParseError> {
    match value {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(malformed("draft", "expected true or false")),
    }
}

/// Map a TOML tree onto the YAML value model so both dialects share one decoder.
fn toml_to_yaml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => Value::Number(f.into()),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Sequence(items.into_iter().map(toml_to_yaml).collect()),
        toml::Value::Table(table) => Value::Mapping(
            table
                .into_iter()
                .map(|(key, value)| (Value::String(key), toml_to_yaml(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn segment(text: &str) -> RawSegment<'_> {
        RawSegment {
            source: "test.md",
            ordinal: 0,
            text,
        }
    }

    fn tags(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_yaml_header() {
        let text = "---\ntitle: Writing a Parser\ndate: 2024-01-15\ntags: [Rust, parsing]\nauthors:\n  - Ada\n  - Grace\n---\n\nBody text.\n";
        let (header, body) = parse(&segment(text)).unwrap();

        assert_eq!(header.title.as_deref(), Some("Writing a Parser"));
        assert_eq!(header.date.unwrap().year(), 2024);
        assert_eq!(header.tags, tags(&["rust", "parsing"]));
        assert_eq!(header.authors, vec!["Ada", "Grace"]);
        assert!(!header.draft);
        assert_eq!(body, "\nBody text.\n");
    }

    #[test]
    fn test_parse_toml_header() {
        let text = "+++\ntitle = \"Toml Post\"\ndate = 2024-03-01T09:00:00Z\ntags = [\"a\", \"B\"]\ndraft = true\n+++\nBody\n";
        let (header, body) = parse(&segment(text)).unwrap();

        assert_eq!(header.title.as_deref(), Some("Toml Post"));
        assert_eq!(header.date.unwrap().month(), 3);
        assert_eq!(header.tags, tags(&["a", "b"]));
        assert!(header.draft);
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn test_parse_skips_leading_blank_lines() {
        let text = "\n\n  \n---\ntitle: After Separator\n---\nBody\n";
        let (header, _) = parse(&segment(text)).unwrap();
        assert_eq!(header.title.as_deref(), Some("After Separator"));
    }

    #[test]
    fn test_parse_without_fence_is_all_body() {
        let text = "# Just Markdown\n\nNo header here.";
        let (header, body) = parse(&segment(text)).unwrap();

        assert_eq!(header, FrontMatter::default());
        assert_eq!(body, text);
    }

    #[test]
    fn test_parse_missing_closing_fence() {
        let text = "---\ntitle: Broken\n\nBody without a closing fence.\n";
        let err = parse(&segment(text)).unwrap_err();
        assert_eq!(err, ParseError::MissingFence { fence: "---" });
    }

    #[test]
    fn test_parse_other_fence_does_not_close() {
        let text = "---\ntitle: Mixed\n+++\nBody\n";
        assert!(matches!(
            parse(&segment(text)),
            Err(ParseError::MissingFence { fence: "---" })
        ));
    }

    #[test]
    fn test_parse_empty_body() {
        assert_eq!(
            parse(&segment("---\ntitle: Nothing\n---\n\n   \n")).unwrap_err(),
            ParseError::EmptyBody
        );
        assert_eq!(
            parse(&segment("---\ntitle: Nothing\n---")).unwrap_err(),
            ParseError::EmptyBody
        );
    }

    #[test]
    fn test_parse_closing_fence_trailing_whitespace() {
        let (header, body) = parse(&segment("---  \ntitle: T\n---   \nBody")).unwrap();
        assert_eq!(header.title.as_deref(), Some("T"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_parse_empty_header() {
        let (header, body) = parse(&segment("---\n---\nBody")).unwrap();
        assert_eq!(header, FrontMatter::default());
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_title_quotes_stripped() {
        let (header, _) = parse(&segment("---\ntitle: \"'Quoted'\"\n---\nBody")).unwrap();
        assert_eq!(header.title.as_deref(), Some("Quoted"));

        let (header, _) = parse(&segment("---\ntitle: '\"Double\"'\n---\nBody")).unwrap();
        assert_eq!(header.title.as_deref(), Some("Double"));
    }

    #[test]
    fn test_title_unbalanced_quote_kept() {
        let (header, _) = parse(&segment("---\ntitle: 'The \"Best\"'\n---\nBody")).unwrap();
        assert_eq!(header.title.as_deref(), Some("The \"Best\""));
    }

    #[test]
    fn test_title_inner_quotations_kept() {
        let (header, _) =
            parse(&segment("---\ntitle: '\"Rust\" vs \"Go\"'\n---\nBody")).unwrap();
        assert_eq!(header.title.as_deref(), Some("\"Rust\" vs \"Go\""));

        let (header, _) =
            parse(&segment("---\ntitle: \"\u{201c}A\u{201d} and \u{201c}B\u{201d}\"\n---\nBody"))
                .unwrap();
        assert_eq!(header.title.as_deref(), Some("\u{201c}A\u{201d} and \u{201c}B\u{201d}"));
    }

    #[test]
    fn test_title_wrapped_around_inner_quote_of_other_kind() {
        let (header, _) = parse(&segment("---\ntitle: '\"Don''t Panic\"'\n---\nBody")).unwrap();
        assert_eq!(header.title.as_deref(), Some("Don't Panic"));
    }

    #[test]
    fn test_title_null_rejected() {
        for text in ["---\ntitle:\n---\nBody", "---\ntitle: ~\n---\nBody"] {
            let err = parse(&segment(text)).unwrap_err();
            assert!(
                matches!(err, ParseError::MalformedField { key: "title", .. }),
                "{text:?}"
            );
        }
    }

    #[test]
    fn test_title_empty_after_stripping() {
        let err = parse(&segment("---\ntitle: \"''\"\n---\nBody")).unwrap_err();
        assert!(matches!(err, ParseError::MalformedField { key: "title", .. }));
    }

    #[test]
    fn test_title_numeric_accepted() {
        let (header, _) = parse(&segment("---\ntitle: 1984\n---\nBody")).unwrap();
        assert_eq!(header.title.as_deref(), Some("1984"));
    }

    #[test]
    fn test_title_non_scalar_rejected() {
        let err = parse(&segment("---\ntitle: [a, b]\n---\nBody")).unwrap_err();
        assert!(matches!(err, ParseError::MalformedField { key: "title", .. }));
    }

    #[test]
    fn test_missing_keys_default() {
        let (header, _) = parse(&segment("---\ncategory: misc\n---\nBody")).unwrap();
        assert_eq!(header.title, None);
        assert_eq!(header.date, None);
        assert!(header.tags.is_empty());
        assert!(header.authors.is_empty());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let text = "---\ntitle: T\nlayout: post\nextra:\n  nested: true\n---\nBody";
        let (header, _) = parse(&segment(text)).unwrap();
        assert_eq!(header.title.as_deref(), Some("T"));
    }

    #[test]
    fn test_unparseable_date() {
        let err = parse(&segment("---\ntitle: T\ndate: last tuesday\n---\nBody")).unwrap_err();
        assert!(matches!(err, ParseError::MalformedField { key: "date", .. }));
    }

    #[test]
    fn test_impossible_date() {
        let err = parse(&segment("---\ndate: 2023-02-29\n---\nBody")).unwrap_err();
        assert!(matches!(err, ParseError::MalformedField { key: "date", .. }));
    }

    #[test]
    fn test_tags_normalized_and_deduplicated() {
        let text = "---\ntags: [Rust, rust, ' RUST ', Web, '']\n---\nBody";
        let (header, _) = parse(&segment(text)).unwrap();
        assert_eq!(header.tags, tags(&["rust", "web"]));
    }

    #[test]
    fn test_tags_comma_separated_string() {
        let (header, _) = parse(&segment("---\ntags: rust, Web ,  cli\n---\nBody")).unwrap();
        assert_eq!(header.tags, tags(&["cli", "rust", "web"]));
    }

    #[test]
    fn test_tags_wrong_shape() {
        let err = parse(&segment("---\ntags:\n  a: b\n---\nBody")).unwrap_err();
        assert!(matches!(err, ParseError::MalformedField { key: "tags", .. }));
    }

    #[test]
    fn test_single_author_alias() {
        let (header, _) = parse(&segment("---\nauthor: Ada Lovelace\n---\nBody")).unwrap();
        assert_eq!(header.authors, vec!["Ada Lovelace"]);
    }

    #[test]
    fn test_authors_order_preserved() {
        let (header, _) = parse(&segment("---\nauthors: [Zed, Amy, Mo]\n---\nBody")).unwrap();
        assert_eq!(header.authors, vec!["Zed", "Amy", "Mo"]);
    }

    #[test]
    fn test_summary_alias_and_draft() {
        let text = "---\ndescription: A short intro.\ndraft: true\n---\nBody";
        let (header, _) = parse(&segment(text)).unwrap();
        assert_eq!(header.summary.as_deref(), Some("A short intro."));
        assert!(header.draft);
    }

    #[test]
    fn test_draft_wrong_type() {
        let err = parse(&segment("---\ndraft: maybe\n---\nBody")).unwrap_err();
        assert!(matches!(err, ParseError::MalformedField { key: "draft", .. }));
    }

    #[test]
    fn test_invalid_yaml_header() {
        let err = parse(&segment("---\ntitle: [unclosed\n---\nBody")).unwrap_err();
        assert!(matches!(err, ParseError::MalformedField { key: "<header>", .. }));
    }

    #[test]
    fn test_non_mapping_header() {
        let err = parse(&segment("---\n- just\n- a list\n---\nBody")).unwrap_err();
        assert!(matches!(err, ParseError::MalformedField { key: "<header>", .. }));
    }

    #[test]
    fn test_invalid_toml_header() {
        let err = parse(&segment("+++\ntitle = \n+++\nBody")).unwrap_err();
        assert!(matches!(err, ParseError::MalformedField { key: "<header>", .. }));
    }

    #[test]
    fn test_reparse_body_is_not_a_header() {
        let text = "---\ntitle: Outer\n---\n\nSome text.\n\n---\n\nMore after a rule.\n";
        let (_, body) = parse(&segment(text)).unwrap();
        let (header, again) = parse(&segment(body)).unwrap();

        assert_eq!(header, FrontMatter::default());
        assert_eq!(again, body);
    }

    #[test]
    fn test_yaml_round_trip() {
        let original = FrontMatter {
            title: Some("Round Trip: Part 2".into()),
            date: parse_date("2024-05-06T07:08:09Z"),
            tags: tags(&["rust", "yaml", "zeta"]),
            authors: vec!["Ada".into(), "Grace".into()],
            summary: Some("yes".into()),
            draft: true,
        };
        let text = format!("---\n{}---\nBody\n", original.to_yaml().unwrap());
        let (decoded, _) = parse(&segment(&text)).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn test_has_tag_case_insensitive() {
        let header = FrontMatter {
            tags: tags(&["rust"]),
            ..Default::default()
        };
        assert!(header.has_tag("Rust"));
        assert!(!header.has_tag("go"));
    }
}
