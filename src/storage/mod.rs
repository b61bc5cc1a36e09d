//! # Record Store
//!
//! SQLite-backed persistence for indexed image records.

pub mod store;

pub use store::{RecordStore, StoreError};
