//! Tag scanning and aggregation.
//!
//! ## Pipeline
//!
//! 1. [`file_scanner`] finds source files, [`scanner`] extracts tag calls.
//! 2. [`aggregate`] merges valid tags into collections, with [`provenance`]
//!    naming the owner of every conflicting path.
//! 3. [`writer`] persists collections through the configured [`collector`].
//!
//! [`generator`] derives tag configs from file locations for `regenerate-tags`.

pub mod aggregate;
pub mod collector;
pub mod conflict;
pub mod context;
pub mod file_scanner;
pub mod generator;
pub mod json5;
pub mod provenance;
pub mod scanner;
pub mod writer;

pub use aggregate::{CollectError, CollectOutcome, Collections, FileTags, group_tags_to_collections};
pub use context::CollectContext;
pub use scanner::{ArgPosition, ProcessedTag, TagScanner, TagValidity};
