//! `BibleLink` - scripture references for plain-text notes.
//!
//! This crate parses typed scripture references, looks verses up in a JSON
//! flat-file store, and formats them with per-translation regex rules.

pub mod bible;
pub mod config;
pub mod constants;
pub mod error;
pub mod services;
