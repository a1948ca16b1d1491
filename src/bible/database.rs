//! JSON flat-file verse store.
//!
//! All translations and verses live in a single `bible_data.json`:
//!
//! ```json
//! {
//!   "translations": [{ "id": 1, "name": "...", "abbreviation": "KJV",
//!                      "language": "English", "category": "Standard",
//!                      "processingRules": [] }],
//!   "verses": [{ "id": 1, "translation_id": 1, "book": "John",
//!                "chapter": 3, "verse": 16, "text": "..." }],
//!   "nextTranslationId": 2,
//!   "nextVerseId": 2
//! }
//! ```
//!
//! Mutations only touch memory; call [`BibleDatabase::save`] to persist.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::rules::ProcessingRule;
use crate::error::{Error, Result};
use crate::services::scripture::{RuleProvider, VerseStore};

/// A translation and the rules used to format its verses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    /// Database id, referenced by verses.
    pub id: u32,
    /// Full name (e.g., "American Standard Version").
    pub name: String,
    /// Short code used in references (e.g., "ASV").
    pub abbreviation: String,
    /// Language name.
    pub language: String,
    /// Free-form grouping label.
    pub category: String,
    /// Ordered formatting rules.
    #[serde(default)]
    pub processing_rules: Vec<ProcessingRule>,
}

/// Editable translation fields, used when adding or updating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationMeta {
    /// Full name.
    pub name: String,
    /// Short code; must be unique.
    pub abbreviation: String,
    /// Language name.
    pub language: String,
    /// Free-form grouping label.
    pub category: String,
    /// Ordered formatting rules.
    pub processing_rules: Vec<ProcessingRule>,
}

impl TranslationMeta {
    /// English, "Standard" category, no rules.
    pub fn new(name: impl Into<String>, abbreviation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            abbreviation: abbreviation.into(),
            language: "English".to_string(),
            category: "Standard".to_string(),
            processing_rules: Vec::new(),
        }
    }

    /// Replace the rule list.
    #[must_use]
    pub fn with_rules(mut self, rules: Vec<ProcessingRule>) -> Self {
        self.processing_rules = rules;
        self
    }
}

/// One stored verse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    /// Database id.
    pub id: u32,
    /// Owning translation.
    pub translation_id: u32,
    /// Book name.
    pub book: String,
    /// Chapter number.
    pub chapter: u32,
    /// Verse number.
    pub verse: u32,
    /// Raw verse text.
    pub text: String,
}

/// A verse waiting to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVerse {
    /// Owning translation.
    pub translation_id: u32,
    /// Book name.
    pub book: String,
    /// Chapter number.
    pub chapter: u32,
    /// Verse number.
    pub verse: u32,
    /// Raw verse text.
    pub text: String,
}

/// On-disk shape of the data file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseData {
    /// All translations.
    pub translations: Vec<Translation>,
    /// All verses of every translation.
    pub verses: Vec<Verse>,
    /// Id handed to the next translation.
    pub next_translation_id: u32,
    /// Id handed to the next verse.
    pub next_verse_id: u32,
}

impl Default for DatabaseData {
    fn default() -> Self {
        Self {
            translations: Vec::new(),
            verses: Vec::new(),
            next_translation_id: 1,
            next_verse_id: 1,
        }
    }
}

/// Whole-database counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseStats {
    /// Number of translations.
    pub translations: usize,
    /// Number of verses across all translations.
    pub verses: usize,
}

/// Per-translation summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationStats {
    /// Full translation name.
    pub name: String,
    /// Verses stored for it.
    pub verse_count: usize,
    /// Books present, alphabetically.
    pub books: Vec<String>,
}

/// translation id -> book -> (chapter, verse) -> index into `verses`
type VerseIndex = HashMap<u32, HashMap<String, BTreeMap<(u32, u32), usize>>>;

/// In-memory view of `bible_data.json` with a lookup index.
#[derive(Debug, Clone)]
pub struct BibleDatabase {
    path: PathBuf,
    data: DatabaseData,
    index: VerseIndex,
}

impl BibleDatabase {
    /// Create an empty database that will be saved to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::from_data(path, DatabaseData::default())
    }

    /// Wrap already-decoded data.
    pub fn from_data(path: impl Into<PathBuf>, data: DatabaseData) -> Self {
        let mut db = Self {
            path: path.into(),
            data,
            index: HashMap::new(),
        };
        db.rebuild_index();
        db
    }

    /// Load the data file. A missing file yields an empty database.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            tracing::info!("No Bible data file at {}, starting fresh", path.display());
            return Ok(Self::new(path));
        }

        let content = fs_err::read_to_string(&path).map_err(|e| Error::io(e, path.clone()))?;
        let data: DatabaseData =
            serde_json::from_str(&content).map_err(|e| Error::json(e, path.clone()))?;

        tracing::info!(
            "Loaded {} translations, {} verses from {}",
            data.translations.len(),
            data.verses.len(),
            path.display()
        );
        Ok(Self::from_data(path, data))
    }

    /// Write the data file, creating its directory if needed.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs_err::create_dir_all(parent).map_err(|e| Error::io(e, parent.to_path_buf()))?;
        }
        let content = serde_json::to_string_pretty(&self.data)
            .map_err(|e| Error::json(e, self.path.clone()))?;
        fs_err::write(&self.path, content).map_err(|e| Error::io(e, self.path.clone()))?;

        tracing::debug!(
            "Saved {} translations, {} verses to {}",
            self.data.translations.len(),
            self.data.verses.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Location of the data file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw data, as it would be saved.
    pub const fn data(&self) -> &DatabaseData {
        &self.data
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (idx, verse) in self.data.verses.iter().enumerate() {
            index_verse(&mut self.index, verse, idx);
        }
    }

    fn chapter_map(&self, book: &str, translation: &str) -> Option<&BTreeMap<(u32, u32), usize>> {
        let id = self.translation(translation)?.id;
        self.index.get(&id)?.get(book)
    }

    /// Translations sorted by abbreviation.
    pub fn translations(&self) -> Vec<&Translation> {
        let mut list: Vec<_> = self.data.translations.iter().collect();
        list.sort_by(|a, b| a.abbreviation.cmp(&b.abbreviation));
        list
    }

    /// Look up a translation by abbreviation.
    pub fn translation(&self, abbreviation: &str) -> Option<&Translation> {
        self.data.translations.iter().find(|t| t.abbreviation == abbreviation)
    }

    /// Whether a translation with this abbreviation exists.
    pub fn has_translation(&self, abbreviation: &str) -> bool {
        self.translation(abbreviation).is_some()
    }

    /// Every book of every translation, in canonical order.
    pub fn books(&self) -> Vec<String> {
        let mut books: Vec<String> = self
            .index
            .values()
            .flat_map(HashMap::keys)
            .cloned()
            .collect();
        sort_books(&mut books);
        books
    }

    /// Books present in one translation, in canonical order.
    pub fn books_for(&self, translation: &str) -> Vec<String> {
        let Some(id) = self.translation(translation).map(|t| t.id) else {
            return Vec::new();
        };
        let mut books: Vec<String> = self
            .index
            .get(&id)
            .map(|books| books.keys().cloned().collect())
            .unwrap_or_default();
        sort_books(&mut books);
        books
    }

    /// Chapters of `book` in `translation`, ascending.
    pub fn chapters_for_book(&self, book: &str, translation: &str) -> Vec<u32> {
        let mut chapters: Vec<u32> = self
            .chapter_map(book, translation)
            .map(|m| m.keys().map(|(ch, _)| *ch).collect())
            .unwrap_or_default();
        chapters.dedup();
        chapters
    }

    /// Verse numbers of one chapter, ascending.
    pub fn verses_for_chapter(&self, book: &str, chapter: u32, translation: &str) -> Vec<u32> {
        self.chapter_map(book, translation)
            .map(|m| m.range((chapter, 0)..=(chapter, u32::MAX)).map(|((_, v), _)| *v).collect())
            .unwrap_or_default()
    }

    /// Fetch a single verse.
    pub fn get_verse(&self, book: &str, chapter: u32, verse: u32, translation: &str) -> Option<&Verse> {
        let idx = *self.chapter_map(book, translation)?.get(&(chapter, verse))?;
        self.data.verses.get(idx)
    }

    /// Add a translation, returning its new id.
    pub fn add_translation(&mut self, meta: TranslationMeta) -> Result<u32> {
        if self.has_translation(&meta.abbreviation) {
            return Err(Error::Translation(format!(
                "Translation with abbreviation '{}' already exists",
                meta.abbreviation
            )));
        }

        let id = self.data.next_translation_id;
        self.data.next_translation_id = id
            .checked_add(1)
            .ok_or_else(|| Error::Translation("Translation ids exhausted".to_string()))?;
        tracing::info!("Added translation: {} ({}) with ID {id}", meta.name, meta.abbreviation);
        self.data.translations.push(Translation {
            id,
            name: meta.name,
            abbreviation: meta.abbreviation,
            language: meta.language,
            category: meta.category,
            processing_rules: meta.processing_rules,
        });
        Ok(id)
    }

    /// Replace the editable fields of translation `id`.
    pub fn update_translation(&mut self, id: u32, meta: TranslationMeta) -> Result<()> {
        if self
            .data
            .translations
            .iter()
            .any(|t| t.id != id && t.abbreviation == meta.abbreviation)
        {
            return Err(Error::Translation(format!(
                "Translation abbreviation '{}' already exists",
                meta.abbreviation
            )));
        }

        let translation = self
            .data
            .translations
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::Translation(format!("Translation {id} not found")))?;

        translation.name = meta.name;
        translation.abbreviation = meta.abbreviation;
        translation.language = meta.language;
        translation.category = meta.category;
        translation.processing_rules = meta.processing_rules;
        Ok(())
    }

    /// Add one verse, returning its id.
    pub fn add_verse(
        &mut self,
        translation_id: u32,
        book: impl Into<String>,
        chapter: u32,
        verse: u32,
        text: impl Into<String>,
    ) -> Result<u32> {
        self.push_verse(NewVerse {
            translation_id,
            book: book.into(),
            chapter,
            verse,
            text: text.into(),
        })
    }

    /// Add many verses at once, returning how many were added.
    ///
    /// All or nothing: every verse is checked before any is inserted.
    pub fn add_verses_batch(&mut self, verses: impl IntoIterator<Item = NewVerse>) -> Result<usize> {
        let verses: Vec<NewVerse> = verses.into_iter().collect();
        for verse in &verses {
            self.check_translation_id(verse.translation_id)?;
        }
        let count = verses.len();
        if u32::try_from(count)
            .ok()
            .and_then(|n| self.data.next_verse_id.checked_add(n))
            .is_none()
        {
            return Err(Error::Translation("Verse ids exhausted".to_string()));
        }

        let start_id = self.data.next_verse_id;
        for verse in verses {
            self.push_verse(verse)?;
        }
        if count == 0 {
            tracing::debug!("No verses to add");
        } else {
            tracing::info!(
                "Added {count} verses (IDs {start_id}-{})",
                self.data.next_verse_id - 1
            );
        }
        Ok(count)
    }

    fn check_translation_id(&self, translation_id: u32) -> Result<()> {
        if self.data.translations.iter().any(|t| t.id == translation_id) {
            Ok(())
        } else {
            Err(Error::Translation(format!("Translation {translation_id} not found")))
        }
    }

    fn push_verse(&mut self, verse: NewVerse) -> Result<u32> {
        self.check_translation_id(verse.translation_id)?;

        let id = self.data.next_verse_id;
        self.data.next_verse_id = id
            .checked_add(1)
            .ok_or_else(|| Error::Translation("Verse ids exhausted".to_string()))?;
        let stored = Verse {
            id,
            translation_id: verse.translation_id,
            book: verse.book,
            chapter: verse.chapter,
            verse: verse.verse,
            text: verse.text,
        };
        let idx = self.data.verses.len();
        index_verse(&mut self.index, &stored, idx);
        self.data.verses.push(stored);
        Ok(id)
    }

    /// Remove a translation and all of its verses.
    pub fn remove_translation(&mut self, abbreviation: &str) -> bool {
        let Some(pos) = self
            .data
            .translations
            .iter()
            .position(|t| t.abbreviation == abbreviation)
        else {
            return false;
        };

        let removed = self.data.translations.remove(pos);
        self.data.verses.retain(|v| v.translation_id != removed.id);
        self.rebuild_index();
        tracing::info!("Removed translation {abbreviation}");
        true
    }

    /// Whole-database counts.
    pub fn stats(&self) -> DatabaseStats {
        DatabaseStats {
            translations: self.data.translations.len(),
            verses: self.data.verses.len(),
        }
    }

    /// Summary of one translation.
    pub fn translation_stats(&self, abbreviation: &str) -> Option<TranslationStats> {
        let translation = self.translation(abbreviation)?;
        let books = self.index.get(&translation.id);
        let verse_count = books.map_or(0, |b| b.values().map(BTreeMap::len).sum::<usize>());
        let mut names: Vec<String> = books.map(|b| b.keys().cloned().collect()).unwrap_or_default();
        names.sort();

        Some(TranslationStats {
            name: translation.name.clone(),
            verse_count,
            books: names,
        })
    }
}

fn index_verse(index: &mut VerseIndex, verse: &Verse, idx: usize) {
    index
        .entry(verse.translation_id)
        .or_default()
        .entry(verse.book.clone())
        .or_default()
        .entry((verse.chapter, verse.verse))
        .or_insert(idx);
}

fn sort_books(books: &mut Vec<String>) {
    books.sort_by(|a, b| super::compare_books(a, b));
    books.dedup();
}

impl VerseStore for BibleDatabase {
    fn verse(&self, book: &str, chapter: u32, verse: u32, translation: &str) -> Option<&str> {
        self.get_verse(book, chapter, verse, translation).map(|v| v.text.as_str())
    }

    fn chapters(&self, book: &str, translation: &str) -> Vec<u32> {
        self.chapters_for_book(book, translation)
    }

    fn verses_in_chapter(&self, book: &str, chapter: u32, translation: &str) -> Vec<u32> {
        self.verses_for_chapter(book, chapter, translation)
    }

    fn books(&self, translation: &str) -> Vec<String> {
        self.books_for(translation)
    }
}

impl RuleProvider for BibleDatabase {
    fn processing_rules(&self, translation: &str) -> &[ProcessingRule] {
        self.translation(translation)
            .map(|t| t.processing_rules.as_slice())
            .unwrap_or_default()
    }
}
