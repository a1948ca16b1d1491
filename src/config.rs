//! Application configuration.
//!
//! Handles loading configuration from environment variables and .env files.

use dotenv::dotenv;
use std::env;
use std::path::PathBuf;

use crate::constants::{output, storage};
use crate::error::{Error, Result};
use crate::services::passage::OutputType;

/// Configuration for the application.
#[derive(Debug, Clone)]
pub struct Config {
    /// The application name
    app_name: String,
    /// The application version
    app_version: String,
    /// Path to `bible_data.json`
    pub data_path: PathBuf,
    /// Translation used when a request names none
    pub default_translation: String,
    /// How inserted passages are written
    pub output_type: OutputType,
    /// Info string of fenced blocks
    pub code_block_language: String,
    /// Use short book names in labels
    pub show_book_abbr: bool,
}

impl Config {
    /// Get the application name.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Get the application version.
    #[must_use]
    pub fn app_version(&self) -> &str {
        &self.app_version
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: env!("CARGO_PKG_NAME").to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            data_path: default_data_path(),
            default_translation: output::DEFAULT_TRANSLATION.to_string(),
            output_type: OutputType::default(),
            code_block_language: output::DEFAULT_CODE_BLOCK_LANGUAGE.to_string(),
            show_book_abbr: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self> {
        // Try to load .env file if present
        dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = var("BIBLE_DATA_PATH") {
            config.data_path = PathBuf::from(shellexpand::tilde(&path).to_string());
        }

        if let Some(translation) = var("BIBLE_TRANSLATION").filter(|t| !t.trim().is_empty()) {
            config.default_translation = translation.trim().to_string();
        }

        if let Some(kind) = var("BIBLE_OUTPUT") {
            config.output_type = kind.parse()?;
        }

        if let Some(lang) = var("BIBLE_CODE_BLOCK_LANGUAGE").filter(|l| !l.trim().is_empty()) {
            config.code_block_language = lang.trim().to_string();
        }

        if let Some(flag) = var("BIBLE_SHOW_BOOK_ABBR") {
            config.show_book_abbr = parse_flag(&flag).ok_or_else(|| {
                Error::config(
                    format!("BIBLE_SHOW_BOOK_ABBR has invalid value '{flag}'"),
                    "Use true/false, yes/no or 1/0",
                )
            })?;
        }

        Ok(config)
    }
}

/// `~/.local/share/biblelink/bible_data.json` or the platform equivalent
fn default_data_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(storage::DATA_DIR_NAME)
        .join(storage::DATA_FILE_NAME)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
