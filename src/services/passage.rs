//! Passage assembly.
//!
//! Expands a [`ScriptureRange`] into store lookups, formats each verse with
//! the translation's rules, and composes the text that gets inserted into a
//! note: plain text, a Bible Gateway link, or a fenced `bible` code block.

use std::fmt;
use std::str::FromStr;

use crate::bible::reference::{parse_reference, ScriptureRange};
use crate::bible::rules::VerseFormatter;
use crate::bible::{book_abbreviation, suggest_book};
use crate::config::Config;
use crate::constants::{gateway, output};
use crate::error::{Error, Result};
use crate::services::scripture::VerseStore;

/// How a passage is written into a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputType {
    /// `John 3:16 (KJV): For God so loved...`
    Text,
    /// `[John 3:16 (KJV)](https://www.biblegateway.com/...)`
    Link,
    /// Fenced block that re-renders from its header line.
    #[default]
    CodeBlock,
}

impl OutputType {
    /// Returns all output types in display order.
    pub const fn all() -> &'static [Self] {
        &[Self::Text, Self::Link, Self::CodeBlock]
    }

    /// Name used in configuration.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Link => "link",
            Self::CodeBlock => "codeblock",
        }
    }
}

impl FromStr for OutputType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::config(format!("unknown output type '{s}'"), "Use text, link or codeblock")
            })
    }
}

/// Display switches carried in a code block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockOption {
    /// Show verse numbers.
    Verse,
    /// Show chapter numbers.
    Chapter,
    /// Highlight words of Christ.
    RedText,
    /// Append a Bible Gateway link.
    Link,
}

impl BlockOption {
    /// Returns all options in display order.
    pub const fn all() -> &'static [Self] {
        &[Self::Verse, Self::Chapter, Self::RedText, Self::Link]
    }

    /// Keyword used in code block headers.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Verse => "verse",
            Self::Chapter => "chapter",
            Self::RedText => "red-text",
            Self::Link => "link",
        }
    }

    /// Match a header keyword, ignoring case.
    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|o| o.name().eq_ignore_ascii_case(word.trim()))
    }
}

/// Header line of a fenced `bible` block: `[opts] TRANSLATION REFERENCE [opts]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlockRequest {
    /// Translation abbreviation.
    pub translation: String,
    /// Reference text, not yet parsed.
    pub reference: String,
    /// Display switches, without duplicates.
    pub options: Vec<BlockOption>,
}

impl CodeBlockRequest {
    /// Parse a header line.
    ///
    /// Options may lead as bare words (`verse link KJV John 3:16`) or trail
    /// in brackets separated by `,` or `|` (`KJV John 3:16 [verse|link]`).
    pub fn parse(line: &str) -> Result<Self> {
        let mut body = line.trim();
        let mut trailing = Vec::new();
        if body.ends_with(']') {
            if let Some(open) = body.rfind('[') {
                for word in body[open + 1..body.len() - 1].split(|c| c == ',' || c == '|') {
                    match BlockOption::from_keyword(word) {
                        Some(opt) => trailing.push(opt),
                        None if word.trim().is_empty() => {}
                        None => tracing::debug!("Ignoring unknown code block option '{}'", word.trim()),
                    }
                }
                body = body[..open].trim_end();
            }
        }

        let mut leading = Vec::new();
        let mut parts = body.split_whitespace().peekable();
        while let Some(opt) = parts.peek().and_then(|w| BlockOption::from_keyword(w)) {
            leading.push(opt);
            parts.next();
        }
        let options = leading.into_iter().chain(trailing).fold(Vec::new(), |mut acc, opt| {
            if !acc.contains(&opt) {
                acc.push(opt);
            }
            acc
        });

        let translation = parts.next();
        let reference = parts.collect::<Vec<_>>().join(" ");
        match translation {
            Some(translation) if !reference.is_empty() => Ok(Self {
                translation: translation.to_string(),
                reference,
                options,
            }),
            _ => Err(Error::parse(
                "Invalid format. Use: [option1,option2] TRANSLATION REFERENCE or TRANSLATION REFERENCE [option1,option2]",
                None,
            )),
        }
    }

    /// Parse the reference part.
    pub fn range(&self) -> Result<ScriptureRange> {
        Ok(parse_reference(&self.reference)?)
    }

    /// Whether an option is set.
    pub fn has(&self, option: BlockOption) -> bool {
        self.options.contains(&option)
    }
}

impl fmt::Display for CodeBlockRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.translation, self.reference)?;
        if !self.options.is_empty() {
            let names: Vec<_> = self.options.iter().map(|o| o.name()).collect();
            write!(f, " [{}]", names.join("|"))?;
        }
        Ok(())
    }
}

/// Settings that shape rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Use short book names in text and link labels.
    pub abbreviate_book: bool,
    /// Info string of fenced blocks.
    pub code_block_language: String,
    /// Options written into code block headers.
    pub block_options: Vec<BlockOption>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            abbreviate_book: false,
            code_block_language: output::DEFAULT_CODE_BLOCK_LANGUAGE.to_string(),
            block_options: Vec::new(),
        }
    }
}

impl RenderOptions {
    /// Take display settings from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            abbreviate_book: config.show_book_abbr,
            code_block_language: config.code_block_language.clone(),
            block_options: Vec::new(),
        }
    }
}

/// One verse fetched for a passage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassageVerse {
    /// Chapter number.
    pub chapter: u32,
    /// Verse number.
    pub verse: u32,
    /// Raw text from the store.
    pub text: String,
}

/// The verses a range resolved to in one translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    /// The requested range.
    pub range: ScriptureRange,
    /// Translation abbreviation.
    pub translation: String,
    /// Verses found, in reading order.
    pub verses: Vec<PassageVerse>,
}

/// Fetch every verse of `range` that the store has.
///
/// Only chapters the store lists are visited. Whole chapters and the open
/// ends of cross-chapter ranges follow the store's own verse listing.
/// Missing verses are skipped.
pub fn resolve_passage<S>(range: &ScriptureRange, translation: &str, store: &S) -> Result<Passage>
where
    S: VerseStore + ?Sized,
{
    let last_chapter = range.last_chapter();
    let mut verses = Vec::new();

    let chapters = store
        .chapters(&range.book, translation)
        .into_iter()
        .filter(|c| (range.start_chapter..=last_chapter).contains(c));

    for chapter in chapters {
        let lo = if chapter == range.start_chapter { range.start_verse.unwrap_or(0) } else { 0 };
        let hi = if chapter == last_chapter { range.end_verse.unwrap_or(u32::MAX) } else { u32::MAX };

        for verse in store
            .verses_in_chapter(&range.book, chapter, translation)
            .into_iter()
            .filter(|v| (lo..=hi).contains(v))
        {
            if let Some(text) = store.verse(&range.book, chapter, verse, translation) {
                verses.push(PassageVerse { chapter, verse, text: text.to_string() });
            }
        }
    }

    if verses.is_empty() {
        if !store.has_book(&range.book, translation) {
            let books = store.books(translation);
            return Err(Error::Scripture {
                message: format!("Book not found: {} in {translation}", range.book),
                suggestion: suggest_book(&range.book, books.iter().map(String::as_str)),
            });
        }
        return Err(Error::scripture(format!("Invalid reference: {range} in {translation}")));
    }

    tracing::debug!("Resolved {range} ({translation}) to {} verses", verses.len());
    Ok(Passage {
        range: range.clone(),
        translation: translation.to_string(),
        verses,
    })
}

/// Bible Gateway URL for a reference label.
pub fn bible_gateway_url(reference: &str, translation: &str) -> String {
    let version = gateway::TRANSLATION_CODES
        .iter()
        .find(|(ours, _)| *ours == translation)
        .map_or(translation, |(_, theirs)| *theirs);
    format!(
        "{}?search={}&version={version}",
        gateway::PASSAGE_URL,
        urlencoding::encode(reference)
    )
}

impl Passage {
    /// Reference label, optionally with the short book name.
    pub fn label(&self, abbreviate_book: bool) -> String {
        let book = if abbreviate_book {
            book_abbreviation(&self.range.book).unwrap_or(&self.range.book)
        } else {
            &self.range.book
        };
        self.range.label_with_book(book)
    }

    /// Each verse run through `formatter`.
    pub fn formatted(&self, formatter: &VerseFormatter) -> Vec<String> {
        self.verses.iter().map(|v| formatter.format(&v.text)).collect()
    }

    /// Compose the insertable text.
    pub fn render(&self, output: OutputType, options: &RenderOptions, formatter: &VerseFormatter) -> String {
        let label = self.label(options.abbreviate_book);
        match output {
            OutputType::Text => {
                let numbered = self.verses.len() > 1;
                let spans_chapters = self.verses.windows(2).any(|w| w[0].chapter != w[1].chapter);
                let body: Vec<String> = self
                    .verses
                    .iter()
                    .zip(self.formatted(formatter))
                    .map(|(v, text)| match (numbered, spans_chapters) {
                        (_, true) => format!("{}:{} {text}", v.chapter, v.verse),
                        (true, false) => format!("{} {text}", v.verse),
                        (false, false) => text,
                    })
                    .collect();
                format!("{label} ({}): {}", self.translation, body.join(" "))
            }
            OutputType::Link => format!(
                "[{label} ({})]({})",
                self.translation,
                bible_gateway_url(&self.range.to_string(), &self.translation)
            ),
            OutputType::CodeBlock => {
                let header = CodeBlockRequest {
                    translation: self.translation.clone(),
                    reference: self.range.to_string(),
                    options: options.block_options.clone(),
                };
                format!(
                    "```{}\n{header}\n{}\n```",
                    options.code_block_language,
                    self.formatted(formatter).join(" ")
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::bible::database::{BibleDatabase, TranslationMeta};
    use crate::bible::rules::ProcessingRule;
    use crate::services::scripture::RuleProvider;

    fn store() -> BibleDatabase {
        let mut db = BibleDatabase::new("bible_data.json");
        let kjv = db
            .add_translation(
                TranslationMeta::new("King James Version", "KJV")
                    .with_rules(vec![ProcessingRule::escaped(r"\[([^\]]+)\]", "<em>$1</em>")]),
            )
            .unwrap();
        for (ch, v, text) in [
            (3, 16, "For God so [loved] the world"),
            (3, 17, "For God sent not his Son"),
            (3, 18, "He that believeth"),
            (4, 1, "When therefore the Lord knew"),
            (4, 2, "Though Jesus himself baptized not"),
            (4, 3, "He left Judaea"),
        ] {
            db.add_verse(kjv, "John", ch, v, text).unwrap();
        }
        db.add_verse(kjv, "Genesis", 1, 1, "In the beginning").unwrap();
        db
    }

    fn numbers(p: &Passage) -> Vec<(u32, u32)> {
        p.verses.iter().map(|v| (v.chapter, v.verse)).collect()
    }

    #[test]
    fn resolves_verse_span() {
        let db = store();
        let p = resolve_passage(&parse_reference("John 3:16-17").unwrap(), "KJV", &db).unwrap();
        assert_eq!(numbers(&p), [(3, 16), (3, 17)]);
    }

    #[test]
    fn resolves_whole_chapter_from_listing() {
        let db = store();
        let p = resolve_passage(&parse_reference("John 4").unwrap(), "KJV", &db).unwrap();
        assert_eq!(numbers(&p), [(4, 1), (4, 2), (4, 3)]);
    }

    #[test]
    fn resolves_cross_chapter() {
        let db = store();
        let range = parse_reference("John 3:17-John 4:2").unwrap();
        let p = resolve_passage(&range, "KJV", &db).unwrap();
        assert_eq!(numbers(&p), [(3, 17), (3, 18), (4, 1), (4, 2)]);
    }

    #[test]
    fn missing_verses_are_skipped() {
        let db = store();
        let p = resolve_passage(&parse_reference("John 3:18-30").unwrap(), "KJV", &db).unwrap();
        assert_eq!(numbers(&p), [(3, 18)]);
    }

    #[test]
    fn unknown_book_suggests_close_match() {
        let db = store();
        let err = resolve_passage(&parse_reference("Jon 3:16").unwrap(), "KJV", &db).unwrap_err();
        match err {
            Error::Scripture { suggestion, .. } => assert_eq!(suggestion.as_deref(), Some("John")),
            other => panic!("Expected Scripture error, got {other:?}"),
        }
    }

    #[test]
    fn empty_range_in_known_book_is_an_error() {
        let db = store();
        let err = resolve_passage(&parse_reference("John 9:1").unwrap(), "KJV", &db).unwrap_err();
        assert!(matches!(err, Error::Scripture { suggestion: None, .. }));
    }

    #[test]
    fn renders_text_with_numbers_for_multiple_verses() {
        let db = store();
        let p = resolve_passage(&parse_reference("John 3:16-17").unwrap(), "KJV", &db).unwrap();
        let out = p.render(OutputType::Text, &RenderOptions::default(), &db.formatter("KJV"));
        assert_eq!(
            out,
            "John 3:16-17 (KJV): 16 For God so <em>loved</em> the world 17 For God sent not his Son"
        );
    }

    #[test]
    fn renders_cross_chapter_text_with_chapter_numbers() {
        let db = store();
        let p = resolve_passage(&parse_reference("John 3:18-4:1").unwrap(), "KJV", &db).unwrap();
        let out = p.render(OutputType::Text, &RenderOptions::default(), &VerseFormatter::passthrough("KJV"));
        assert_eq!(
            out,
            "John 3:18-4:1 (KJV): 3:18 He that believeth 4:1 When therefore the Lord knew"
        );
    }

    #[test]
    fn huge_end_chapter_only_visits_stored_chapters() {
        let db = store();
        let range = parse_reference("John 3:18-4000000000:1").unwrap();
        assert_eq!(range.last_chapter(), 4_000_000_000);
        let p = resolve_passage(&range, "KJV", &db).unwrap();
        assert_eq!(numbers(&p), [(3, 18), (4, 1), (4, 2), (4, 3)]);

        let range = parse_reference(&format!("John 3:16-{}:1", u32::MAX)).unwrap();
        let p = resolve_passage(&range, "KJV", &db).unwrap();
        assert_eq!(p.verses.len(), 6);
    }

    #[test]
    fn renders_single_verse_text_with_abbreviation() {
        let db = store();
        let p = resolve_passage(&parse_reference("Genesis 1:1").unwrap(), "KJV", &db).unwrap();
        let options = RenderOptions { abbreviate_book: true, ..RenderOptions::default() };
        let out = p.render(OutputType::Text, &options, &VerseFormatter::passthrough("KJV"));
        assert_eq!(out, "Gen 1:1 (KJV): In the beginning");
    }

    #[test]
    fn renders_link() {
        let db = store();
        let p = resolve_passage(&parse_reference("John 3:16").unwrap(), "KJV", &db).unwrap();
        let out = p.render(OutputType::Link, &RenderOptions::default(), &db.formatter("KJV"));
        assert_eq!(
            out,
            "[John 3:16 (KJV)](https://www.biblegateway.com/passage/?search=John%203%3A16&version=KJV)"
        );
    }

    #[test]
    fn gateway_maps_translation_codes() {
        assert!(bible_gateway_url("John 1:1", "SpaRV").ends_with("&version=RVR1909"));
        assert!(bible_gateway_url("John 1:1", "WEB").ends_with("&version=WEB"));
    }

    #[test]
    fn renders_code_block_that_parses_back() {
        let db = store();
        let p = resolve_passage(&parse_reference("John 3:16").unwrap(), "KJV", &db).unwrap();
        let options = RenderOptions {
            block_options: vec![BlockOption::Verse, BlockOption::Link],
            ..RenderOptions::default()
        };
        let out = p.render(OutputType::CodeBlock, &options, &db.formatter("KJV"));
        assert_eq!(
            out,
            "```bible\nKJV John 3:16 [verse|link]\nFor God so <em>loved</em> the world\n```"
        );

        let header = out.lines().nth(1).unwrap();
        let request = CodeBlockRequest::parse(header).unwrap();
        assert_eq!(request.range().unwrap(), p.range);
        assert!(request.has(BlockOption::Link));
    }

    #[test]
    fn parses_leading_and_trailing_options() {
        let r = CodeBlockRequest::parse("verse red-text KJV 1 John 3:1-3 [link, verse]").unwrap();
        assert_eq!(r.translation, "KJV");
        assert_eq!(r.reference, "1 John 3:1-3");
        assert_eq!(r.options, [BlockOption::Verse, BlockOption::RedText, BlockOption::Link]);

        let r = CodeBlockRequest::parse("ASV Psalms 23").unwrap();
        assert!(r.options.is_empty());
        assert_eq!(r.range().unwrap(), ScriptureRange::chapter("Psalms", 23));
    }

    #[test]
    fn rejects_header_without_reference() {
        assert!(matches!(CodeBlockRequest::parse("KJV"), Err(Error::Parse { .. })));
        assert!(matches!(CodeBlockRequest::parse("verse [link]"), Err(Error::Parse { .. })));
    }

    #[test]
    fn output_type_from_str() {
        assert_eq!("Link".parse::<OutputType>().unwrap(), OutputType::Link);
        assert_eq!("codeblock".parse::<OutputType>().unwrap(), OutputType::CodeBlock);
        assert!(matches!("html".parse::<OutputType>(), Err(Error::Config { .. })));
    }
}
