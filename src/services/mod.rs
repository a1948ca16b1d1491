//! Service modules built on top of the Bible data layer.
//!
//! Lookup traits live in `scripture`; `passage` turns a parsed range into
//! insertable text.

pub mod passage;
pub mod scripture;
