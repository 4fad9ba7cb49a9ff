//! langtag - collect inline translation tags into locale files
//!
//! Source files declare their translations next to the code that uses them,
//! as `lang({ title: 'Hello' }, { namespace: 'home', path: 'hero' })` calls.
//! langtag scans those calls, merges them into per-namespace translation trees,
//! reports conflicting writes with the tags responsible, and persists the trees
//! as JSON locale files.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface (arguments, commands, report)
//! - `config`: `.langtagrc.json` loading
//! - `core`: Tag scanner, aggregation engine, collectors and persistence

pub mod cli;
pub mod config;
pub mod core;
