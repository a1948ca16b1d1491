//! Application constants.
//!
//! Centralizes defaults and fixed values for better maintainability.

/// Output defaults.
pub mod output {
    /// Translation used when none is configured.
    pub const DEFAULT_TRANSLATION: &str = "ASV";

    /// Info string of inserted fenced blocks.
    pub const DEFAULT_CODE_BLOCK_LANGUAGE: &str = "bible";
}

/// Data file location.
pub mod storage {
    /// Directory under the platform data dir.
    pub const DATA_DIR_NAME: &str = "biblelink";

    /// Name of the verse database file.
    pub const DATA_FILE_NAME: &str = "bible_data.json";
}

/// Bible Gateway linking.
pub mod gateway {
    /// Passage search endpoint.
    pub const PASSAGE_URL: &str = "https://www.biblegateway.com/passage/";

    /// Local abbreviations that Bible Gateway spells differently.
    /// Anything not listed is passed through unchanged.
    pub const TRANSLATION_CODES: &[(&str, &str)] = &[
        ("SpaRV", "RVR1909"),
        ("Vulgate", "VULGATE"),
        ("Byz", "BYZ"),
    ];
}
