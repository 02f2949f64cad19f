//! Splitting bundled sources into per-article segments.

use super::{RawSegment, RawSource};

/// Split `source` on every literal occurrence of `separator`.
///
/// Yields `N + 1` segments for `N` occurrences, in order, with the separator
/// itself dropped. Empty segments (leading, trailing or doubled separators)
/// are yielded as-is and rejected later by validation. An empty separator
/// never splits.
///
/// The iterator is lazy and borrows from `source`; calling `split` again
/// restarts from the beginning.
pub fn split<'a>(
    source: &'a RawSource,
    separator: &'a str,
) -> impl Iterator<Item = RawSegment<'a>> + 'a {
    let pieces: Box<dyn Iterator<Item = &'a str> + 'a> = if separator.is_empty() {
        Box::new(std::iter::once(source.text.as_str()))
    } else {
        Box::new(source.text.split(separator))
    };

    pieces.enumerate().map(move |(ordinal, text)| RawSegment {
        source: &source.id,
        ordinal,
        text,
    })
}
