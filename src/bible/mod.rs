//! Bible data model, reference parsing and verse formatting.

pub mod database;
pub mod reference;
pub mod rules;

use std::cmp::Ordering;
use std::collections::HashMap;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use lazy_static::lazy_static;

pub use database::{
    BibleDatabase, DatabaseData, DatabaseStats, NewVerse, Translation, TranslationMeta, TranslationStats,
    Verse,
};
pub use reference::{parse_reference, ScriptureRange};
pub use rules::{apply_processing_rules, FormattedVerse, ProcessingRule, VerseFormatter};

/// The 66 books in canonical order.
pub const BOOK_ORDER: &[&str] = &[
    "Genesis", "Exodus", "Leviticus", "Numbers", "Deuteronomy",
    "Joshua", "Judges", "Ruth", "1 Samuel", "2 Samuel",
    "1 Kings", "2 Kings", "1 Chronicles", "2 Chronicles",
    "Ezra", "Nehemiah", "Esther", "Job", "Psalms",
    "Proverbs", "Ecclesiastes", "Song of Solomon", "Isaiah",
    "Jeremiah", "Lamentations", "Ezekiel", "Daniel",
    "Hosea", "Joel", "Amos", "Obadiah", "Jonah",
    "Micah", "Nahum", "Habakkuk", "Zephaniah", "Haggai",
    "Zechariah", "Malachi", "Matthew", "Mark", "Luke",
    "John", "Acts", "Romans", "1 Corinthians", "2 Corinthians",
    "Galatians", "Ephesians", "Philippians", "Colossians",
    "1 Thessalonians", "2 Thessalonians", "1 Timothy", "2 Timothy",
    "Titus", "Philemon", "Hebrews", "James", "1 Peter",
    "2 Peter", "1 John", "2 John", "3 John", "Jude",
    "Revelation",
];

lazy_static! {
    /// Three-character book abbreviations used in compact reference labels
    static ref BOOK_ABBREVIATIONS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("Genesis", "Gen");
        m.insert("Exodus", "Exo");
        m.insert("Leviticus", "Lev");
        m.insert("Numbers", "Num");
        m.insert("Deuteronomy", "Deu");
        m.insert("Joshua", "Jos");
        m.insert("Judges", "Jdg");
        m.insert("Ruth", "Rut");
        m.insert("1 Samuel", "1Sa");
        m.insert("2 Samuel", "2Sa");
        m.insert("1 Kings", "1Ki");
        m.insert("2 Kings", "2Ki");
        m.insert("1 Chronicles", "1Ch");
        m.insert("2 Chronicles", "2Ch");
        m.insert("Ezra", "Ezr");
        m.insert("Nehemiah", "Neh");
        m.insert("Esther", "Est");
        m.insert("Job", "Job");
        m.insert("Psalms", "Psa");
        m.insert("Proverbs", "Pro");
        m.insert("Ecclesiastes", "Ecc");
        m.insert("Song of Solomon", "Sng");
        m.insert("Isaiah", "Isa");
        m.insert("Jeremiah", "Jer");
        m.insert("Lamentations", "Lam");
        m.insert("Ezekiel", "Ezk");
        m.insert("Daniel", "Dan");
        m.insert("Hosea", "Hos");
        m.insert("Joel", "Jol");
        m.insert("Amos", "Amo");
        m.insert("Obadiah", "Oba");
        m.insert("Jonah", "Jon");
        m.insert("Micah", "Mic");
        m.insert("Nahum", "Nah");
        m.insert("Habakkuk", "Hab");
        m.insert("Zephaniah", "Zep");
        m.insert("Haggai", "Hag");
        m.insert("Zechariah", "Zec");
        m.insert("Malachi", "Mal");
        // New Testament
        m.insert("Matthew", "Mat");
        m.insert("Mark", "Mrk");
        m.insert("Luke", "Luk");
        m.insert("John", "Jhn");
        m.insert("Acts", "Act");
        m.insert("Romans", "Rom");
        m.insert("1 Corinthians", "1Co");
        m.insert("2 Corinthians", "2Co");
        m.insert("Galatians", "Gal");
        m.insert("Ephesians", "Eph");
        m.insert("Philippians", "Php");
        m.insert("Colossians", "Col");
        m.insert("1 Thessalonians", "1Th");
        m.insert("2 Thessalonians", "2Th");
        m.insert("1 Timothy", "1Ti");
        m.insert("2 Timothy", "2Ti");
        m.insert("Titus", "Tit");
        m.insert("Philemon", "Phm");
        m.insert("Hebrews", "Heb");
        m.insert("James", "Jas");
        m.insert("1 Peter", "1Pe");
        m.insert("2 Peter", "2Pe");
        m.insert("1 John", "1Jn");
        m.insert("2 John", "2Jn");
        m.insert("3 John", "3Jn");
        m.insert("Jude", "Jud");
        m.insert("Revelation", "Rev");
        m
    };
}

/// Short form of a canonical book name, if it has one.
pub fn book_abbreviation(book: &str) -> Option<&'static str> {
    BOOK_ABBREVIATIONS.get(book).copied()
}

/// Position of `book` in the canon.
pub fn canonical_position(book: &str) -> Option<usize> {
    BOOK_ORDER.iter().position(|b| *b == book)
}

/// Order books canonically; unknown books sort after known ones, alphabetically.
pub fn compare_books(a: &str, b: &str) -> Ordering {
    match (canonical_position(a), canonical_position(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Closest match for a mistyped book name among `candidates`.
pub fn suggest_book<'a, I>(name: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    // Below this the match is mostly noise
    const MIN_SCORE: i64 = 30;

    let matcher = SkimMatcherV2::default().ignore_case();
    candidates
        .into_iter()
        .filter_map(|c| matcher.fuzzy_match(c, name.trim()).map(|score| (score, c)))
        .filter(|(score, _)| *score >= MIN_SCORE)
        .max_by_key(|(score, _)| *score)
        .map(|(_, c)| c.to_string())
}
