//! # Commands
//!
//! One module per CLI subcommand; the interactive prompt backs `search`
//! when no query is given.

pub mod index;
pub mod prompt;
pub mod search;
