//! # Snapfind Library
//!
//! Find local images by describing their visual content in plain language.
//! Provides concurrent indexing (caption + embedding per image) backed by a
//! SQLite record store, and ranked semantic search with relative time filters.

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod core;
pub mod pipeline;
pub mod storage;
pub mod ui;
