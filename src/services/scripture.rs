//! Scripture lookup abstractions.
//!
//! The passage service only talks to verse data through these traits, so a
//! store can be the JSON database, a fixture in tests, or anything else.

use crate::bible::rules::{ProcessingRule, VerseFormatter};

/// Trait for verse text providers.
pub trait VerseStore {
    /// Raw text of one verse, or `None` if the store does not have it.
    fn verse(&self, book: &str, chapter: u32, verse: u32, translation: &str) -> Option<&str>;

    /// Chapter numbers present in one book, ascending.
    fn chapters(&self, book: &str, translation: &str) -> Vec<u32>;

    /// Verse numbers present in one chapter, ascending.
    fn verses_in_chapter(&self, book: &str, chapter: u32, translation: &str) -> Vec<u32>;

    /// Books available in a translation.
    fn books(&self, translation: &str) -> Vec<String>;

    /// Check if a book exists in a translation.
    fn has_book(&self, book: &str, translation: &str) -> bool {
        self.books(translation).iter().any(|b| b == book)
    }
}

/// Trait for translation metadata providers.
pub trait RuleProvider {
    /// Ordered processing rules of a translation; empty when it is unknown.
    fn processing_rules(&self, translation: &str) -> &[ProcessingRule];

    /// Compile the rules of `translation` into a reusable formatter.
    fn formatter(&self, translation: &str) -> VerseFormatter {
        VerseFormatter::new(translation, self.processing_rules(translation))
    }
}
