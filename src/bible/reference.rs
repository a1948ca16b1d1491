//! Scripture reference parsing.
//!
//! Turns typed references like `John 3:16-18` or
//! `1 Corinthians 1:2-1 Corinthians 3:4` into a [`ScriptureRange`]. Only the
//! shape is checked here; whether the book or verses exist is up to the store.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ReferenceError;

/// `Book C:V-Book C:V`, book repeated on both sides.
#[allow(clippy::expect_used)]
static RE_CROSS_BOOK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\s+([0-9]+):([0-9]+)\s*-\s*(.+?)\s+([0-9]+):([0-9]+)$")
        .expect("valid regex: RE_CROSS_BOOK")
});

/// `Book C:V-C:V`, book given once.
#[allow(clippy::expect_used)]
static RE_CROSS_CHAPTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\s+([0-9]+):([0-9]+)\s*-\s*([0-9]+):([0-9]+)$")
        .expect("valid regex: RE_CROSS_CHAPTER")
});

/// `Book C`, `Book C:V` or `Book C:V-V`.
#[allow(clippy::expect_used)]
static RE_SIMPLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\s+([0-9]+)(?::([0-9]+)(?:\s*-\s*([0-9]+))?)?$")
        .expect("valid regex: RE_SIMPLE")
});

/// A parsed reference: one book, a starting chapter, and an optional verse span.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScriptureRange {
    /// Book name exactly as typed (trimmed).
    pub book: String,
    /// Chapter the range starts in.
    pub start_chapter: u32,
    /// First verse; `None` requests the whole chapter.
    pub start_verse: Option<u32>,
    /// Last chapter; `None` keeps the range inside `start_chapter`.
    pub end_chapter: Option<u32>,
    /// Last verse.
    pub end_verse: Option<u32>,
}

impl ScriptureRange {
    /// A whole chapter.
    pub fn chapter(book: impl Into<String>, chapter: u32) -> Self {
        Self {
            book: book.into(),
            start_chapter: chapter,
            start_verse: None,
            end_chapter: None,
            end_verse: None,
        }
    }

    /// A single verse.
    pub fn single(book: impl Into<String>, chapter: u32, verse: u32) -> Self {
        Self::verses(book, chapter, verse, verse)
    }

    /// A verse span inside one chapter.
    pub fn verses(book: impl Into<String>, chapter: u32, start: u32, end: u32) -> Self {
        Self {
            book: book.into(),
            start_chapter: chapter,
            start_verse: Some(start),
            end_chapter: None,
            end_verse: Some(end),
        }
    }

    /// Whether the whole chapter was requested.
    pub const fn is_whole_chapter(&self) -> bool {
        self.start_verse.is_none()
    }

    /// Whether the range continues past `start_chapter`.
    pub fn is_cross_chapter(&self) -> bool {
        self.end_chapter.is_some_and(|end| end != self.start_chapter)
    }

    /// Chapter the range ends in.
    pub fn last_chapter(&self) -> u32 {
        self.end_chapter.unwrap_or(self.start_chapter)
    }

    /// Reference text using `book` in place of the parsed book name.
    pub fn label_with_book(&self, book: &str) -> String {
        let mut out = format!("{book} {}", self.start_chapter);
        if let Some(start) = self.start_verse {
            out.push_str(&format!(":{start}"));
        }
        match (self.end_chapter.filter(|_| self.is_cross_chapter()), self.end_verse) {
            (Some(ch), Some(v)) => out.push_str(&format!("-{ch}:{v}")),
            (Some(ch), None) => out.push_str(&format!("-{ch}")),
            (None, Some(v)) if Some(v) != self.start_verse => out.push_str(&format!("-{v}")),
            _ => {}
        }
        out
    }
}

impl fmt::Display for ScriptureRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label_with_book(&self.book))
    }
}

/// Parse a typed scripture reference.
///
/// Supports formats like:
/// - "Psalms 23"
/// - "John 3:16"
/// - "John 3:16-18"
/// - "John 3:16-4:2"
/// - "1 Corinthians 1:2-1 Corinthians 3:4"
pub fn parse_reference(input: &str) -> Result<ScriptureRange, ReferenceError> {
    let text = input.trim();
    let number = |s: &str| -> Result<u32, ReferenceError> {
        s.parse().map_err(|_| ReferenceError::InvalidFormat { input: text.to_string() })
    };

    if let Some(caps) = RE_CROSS_CHAPTER.captures(text) {
        return span_chapters(
            caps[1].trim(),
            (number(&caps[2])?, number(&caps[3])?),
            (number(&caps[4])?, number(&caps[5])?),
        );
    }

    if let Some(caps) = RE_CROSS_BOOK.captures(text) {
        let start_book = caps[1].trim();
        let end_book = caps[4].trim();
        if start_book != end_book {
            return Err(ReferenceError::CrossBookUnsupported {
                start_book: start_book.to_string(),
                end_book: end_book.to_string(),
            });
        }
        return span_chapters(
            start_book,
            (number(&caps[2])?, number(&caps[3])?),
            (number(&caps[5])?, number(&caps[6])?),
        );
    }

    let caps = RE_SIMPLE
        .captures(text)
        .ok_or_else(|| ReferenceError::InvalidFormat { input: text.to_string() })?;
    let book = caps[1].trim();
    let chapter = number(&caps[2])?;

    let Some(start) = caps.get(3) else {
        return Ok(ScriptureRange::chapter(book, chapter));
    };
    let start = number(start.as_str())?;
    let end = caps.get(4).map(|m| number(m.as_str())).transpose()?.unwrap_or(start);

    if end < start {
        return Err(ReferenceError::InvalidRange {
            start_chapter: chapter,
            start_verse: start,
            end_chapter: chapter,
            end_verse: end,
        });
    }
    Ok(ScriptureRange::verses(book, chapter, start, end))
}

/// Build a range from explicit `(chapter, verse)` endpoints.
fn span_chapters(
    book: &str,
    (start_chapter, start_verse): (u32, u32),
    (end_chapter, end_verse): (u32, u32),
) -> Result<ScriptureRange, ReferenceError> {
    if (end_chapter, end_verse) < (start_chapter, start_verse) {
        return Err(ReferenceError::InvalidRange {
            start_chapter,
            start_verse,
            end_chapter,
            end_verse,
        });
    }
    if end_chapter == start_chapter {
        return Ok(ScriptureRange::verses(book, start_chapter, start_verse, end_verse));
    }
    Ok(ScriptureRange {
        book: book.to_string(),
        start_chapter,
        start_verse: Some(start_verse),
        end_chapter: Some(end_chapter),
        end_verse: Some(end_verse),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn whole_chapter() {
        let r = parse_reference("Psalms 23").unwrap();
        assert_eq!(r, ScriptureRange::chapter("Psalms", 23));
        assert!(r.is_whole_chapter());
        assert_eq!(r.end_verse, None);
        assert_eq!(r.end_chapter, None);
    }

    #[test]
    fn single_verse() {
        let r = parse_reference("John 3:16").unwrap();
        assert_eq!(r.start_verse, Some(16));
        assert_eq!(r.end_verse, Some(16));
        assert_eq!(r.end_chapter, None);
    }

    #[test]
    fn verse_range() {
        let r = parse_reference("John 3:16-18").unwrap();
        assert_eq!(
            r,
            ScriptureRange {
                book: "John".into(),
                start_chapter: 3,
                start_verse: Some(16),
                end_chapter: None,
                end_verse: Some(18),
            }
        );
    }

    #[test]
    fn identical_bounds_are_a_single_verse() {
        let r = parse_reference("John 3:16-16").unwrap();
        assert_eq!(r, ScriptureRange::single("John", 3, 16));
    }

    #[test]
    fn numbered_book_keeps_its_space() {
        let r = parse_reference("  1 John 3:1-3 ").unwrap();
        assert_eq!(r.book, "1 John");
        assert_eq!(r.start_chapter, 3);

        let r = parse_reference("Song of Solomon 2").unwrap();
        assert_eq!(r.book, "Song of Solomon");
        assert_eq!(r.start_chapter, 2);
    }

    #[test]
    fn cross_chapter_same_book() {
        let r = parse_reference("1 Corinthians 1:2-1 Corinthians 3:4").unwrap();
        assert_eq!(
            r,
            ScriptureRange {
                book: "1 Corinthians".into(),
                start_chapter: 1,
                start_verse: Some(2),
                end_chapter: Some(3),
                end_verse: Some(4),
            }
        );
        assert!(r.is_cross_chapter());
        assert_eq!(r.last_chapter(), 3);

        assert_eq!(parse_reference("1 Corinthians 1:2 - 1 Corinthians 3:4").unwrap(), r);
        assert_eq!(parse_reference("1 Corinthians 1:2 -1 Corinthians 3:4").unwrap(), r);
    }

    #[test]
    fn cross_chapter_without_repeated_book() {
        let r = parse_reference("John 3:16-4:2").unwrap();
        assert_eq!(r.book, "John");
        assert_eq!(r.end_chapter, Some(4));
        assert_eq!(r.end_verse, Some(2));
    }

    #[test]
    fn cross_book_is_rejected() {
        let err = parse_reference("1 Corinthians 1:2-2 Timothy 3:4").unwrap_err();
        assert_eq!(
            err,
            ReferenceError::CrossBookUnsupported {
                start_book: "1 Corinthians".into(),
                end_book: "2 Timothy".into(),
            }
        );
    }

    #[test]
    fn backwards_range_is_rejected() {
        let err = parse_reference("John 5:10-5:2").unwrap_err();
        assert!(matches!(
            err,
            ReferenceError::InvalidRange { start_verse: 10, end_verse: 2, .. }
        ));

        assert!(matches!(
            parse_reference("John 3:18-16"),
            Err(ReferenceError::InvalidRange { .. })
        ));
        assert!(matches!(
            parse_reference("John 4:1-John 3:5"),
            Err(ReferenceError::InvalidRange { start_chapter: 4, end_chapter: 3, .. })
        ));
    }

    #[test]
    fn same_chapter_span_collapses() {
        let r = parse_reference("John 5:2-5:10").unwrap();
        assert_eq!(r, ScriptureRange::verses("John", 5, 2, 10));
    }

    #[test]
    fn malformed_input_is_invalid_format() {
        for input in ["", "John", "3:16", "John 3:", "John 3:16-", "John three", "John 99999999999"] {
            assert!(
                matches!(parse_reference(input), Err(ReferenceError::InvalidFormat { .. })),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn display_round_trips_canonical_forms() {
        for input in ["Psalms 23", "John 3:16", "John 3:16-18", "1 Corinthians 1:2-3:4"] {
            assert_eq!(parse_reference(input).unwrap().to_string(), input);
        }
    }

    #[test]
    fn label_with_abbreviated_book() {
        let r = parse_reference("Genesis 1:1-3").unwrap();
        assert_eq!(r.label_with_book("Gen"), "Gen 1:1-3");
    }
}
