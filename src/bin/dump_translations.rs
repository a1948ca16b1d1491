//! Dump the translations in the Bible data file for inspection.
//!
//! Usage: cargo run --bin dump_translations [-- --path bible_data.json]

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use biblelink::bible::{BibleDatabase, VerseFormatter};
use biblelink::config::Config;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")))
        .init();

    let config = Config::load().context("loading configuration")?;
    let path = std::env::args()
        .position(|a| a == "--path")
        .and_then(|i| std::env::args().nth(i + 1))
        .map_or_else(|| config.data_path.clone(), std::path::PathBuf::from);

    let db = BibleDatabase::load(&path).with_context(|| format!("loading {}", path.display()))?;
    let stats = db.stats();

    println!("{} {}", config.app_name(), config.app_version());
    println!("=== {} ===", db.path().display());
    println!("{} translations, {} verses\n", stats.translations, stats.verses);

    for t in db.translations() {
        println!("--- {} | {} | {} | {} ---", t.abbreviation, t.name, t.language, t.category);

        if let Some(ts) = db.translation_stats(&t.abbreviation) {
            println!("  {} verses in {} books", ts.verse_count, ts.books.len());
        }

        let formatter = VerseFormatter::new(&t.abbreviation, &t.processing_rules);
        for (i, rule) in t.processing_rules.iter().enumerate() {
            let escape = if rule.escape_captures { " (escaped)" } else { "" };
            println!("  rule {:>2}: /{}/ => {}{escape}", i + 1, rule.pattern, rule.replacement);
        }
        for warning in formatter.warnings() {
            println!("  !! {warning}");
        }
    }

    Ok(())
}
