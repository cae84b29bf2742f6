//! # Configuration Modules
//!
//! Plain configuration structs consumed by the pipeline constructors. Loading
//! and layering (file, environment, CLI) is the job of the binary that embeds
//! the library.

/// Stream, cache and upstream fetch settings.
pub mod watch_config;
