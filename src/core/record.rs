//! Indexed image records

use chrono::{DateTime, Utc};

use crate::core::Embedding;

/// One row in the record store, keyed by absolute path. Re-indexing the same
/// path overwrites the record; nothing here is ever merged.
#[derive(Debug, Clone)]
pub struct ImageRecord {
	pub path: String,
	pub caption: String,
	pub created_at: DateTime<Utc>,
	pub embedding: Embedding,
}
