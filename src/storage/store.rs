//! SQLite record store

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;

use crate::core::{Embedding, ImageRecord};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS images (
	path TEXT PRIMARY KEY,
	caption TEXT NOT NULL,
	created_at TEXT NOT NULL,
	embedding BLOB NOT NULL
);
CREATE TABLE IF NOT EXISTS meta (
	key TEXT PRIMARY KEY,
	value TEXT NOT NULL
);
"#;

const META_EMBEDDING_DIM: &str = "embedding_dim";

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
	#[error("database error: {0}")]
	Sqlite(#[from] rusqlite::Error),
	#[error("could not create data directory: {0}")]
	Io(#[from] std::io::Error),
	#[error("embedding dimension mismatch: store holds {expected}, record has {actual}")]
	DimensionMismatch { expected: usize, actual: usize },
	#[error("invalid stored value: {0}")]
	InvalidValue(String),
}

/// Persistent table of indexed images, keyed by path. The inner mutex
/// serializes writes from concurrent pipeline workers; a record is written
/// in a single statement and is never visible half-finished.
pub struct RecordStore {
	conn: Mutex<Connection>,
}

impl RecordStore {
	/// Open the store, creating the file and schema if missing. Idempotent,
	/// safe to call at every process start.
	pub fn open(path: &Path) -> Result<Self> {
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		let conn = Connection::open(path)?;
		conn.pragma_update(None, "journal_mode", "wal")?;
		conn.execute_batch(SCHEMA)?;
		Ok(Self { conn: Mutex::new(conn) })
	}

	/// In-memory store for tests.
	pub fn open_in_memory() -> Result<Self> {
		let conn = Connection::open_in_memory()?;
		conn.execute_batch(SCHEMA)?;
		Ok(Self { conn: Mutex::new(conn) })
	}

	pub fn exists(&self, path: &str) -> Result<bool> {
		let conn = self.conn.lock().expect("store mutex poisoned");
		let row: Option<i64> = conn
			.query_row("SELECT 1 FROM images WHERE path = ?", [path], |row| row.get(0))
			.optional()?;
		Ok(row.is_some())
	}

	/// Insert or fully replace the record for its path. Caption, timestamp,
	/// and embedding commit together or not at all. Rejects embeddings whose
	/// dimension differs from the store's recorded dimension.
	pub fn upsert(&self, record: &ImageRecord) -> Result<()> {
		let mut conn = self.conn.lock().expect("store mutex poisoned");
		let tx = conn.transaction()?;

		let dim = record.embedding.len();
		match stored_dimension(&tx)? {
			Some(expected) if expected != dim => {
				return Err(StoreError::DimensionMismatch { expected, actual: dim });
			}
			Some(_) => {}
			None => {
				tx.execute(
					"INSERT INTO meta (key, value) VALUES (?, ?)",
					params![META_EMBEDDING_DIM, dim.to_string()],
				)?;
			}
		}

		tx.execute(
			"INSERT OR REPLACE INTO images (path, caption, created_at, embedding)
			 VALUES (?, ?, ?, ?)",
			params![
				record.path,
				record.caption,
				record.created_at.to_rfc3339(),
				embedding_to_bytes(&record.embedding),
			],
		)?;
		tx.commit()?;
		Ok(())
	}

	/// Every stored record, loaded once per search invocation.
	pub fn all(&self) -> Result<Vec<ImageRecord>> {
		let conn = self.conn.lock().expect("store mutex poisoned");
		let mut stmt =
			conn.prepare("SELECT path, caption, created_at, embedding FROM images")?;
		let rows = stmt.query_map([], |row| {
			Ok((
				row.get::<_, String>(0)?,
				row.get::<_, String>(1)?,
				row.get::<_, String>(2)?,
				row.get::<_, Vec<u8>>(3)?,
			))
		})?;

		let mut records = Vec::new();
		for row in rows {
			let (path, caption, created_at, blob) = row?;
			let created_at = parse_timestamp(&created_at)?;
			records.push(ImageRecord {
				path,
				caption,
				created_at,
				embedding: bytes_to_embedding(&blob),
			});
		}
		Ok(records)
	}

	pub fn count(&self) -> Result<u64> {
		let conn = self.conn.lock().expect("store mutex poisoned");
		let count: i64 = conn.query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))?;
		Ok(count as u64)
	}
}

fn stored_dimension(conn: &Connection) -> Result<Option<usize>> {
	let value: Option<String> = conn
		.query_row(
			"SELECT value FROM meta WHERE key = ?",
			[META_EMBEDDING_DIM],
			|row| row.get(0),
		)
		.optional()?;
	match value {
		Some(v) => {
			let dim = v
				.parse::<usize>()
				.map_err(|_| StoreError::InvalidValue(format!("embedding_dim = {v}")))?;
			Ok(Some(dim))
		}
		None => Ok(None),
	}
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
	DateTime::parse_from_rfc3339(text)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|_| StoreError::InvalidValue(format!("created_at = {text}")))
}

fn embedding_to_bytes(embedding: &Embedding) -> Vec<u8> {
	let mut bytes = Vec::with_capacity(embedding.len() * 4);
	for value in embedding.as_slice() {
		bytes.extend_from_slice(&value.to_le_bytes());
	}
	bytes
}

fn bytes_to_embedding(bytes: &[u8]) -> Embedding {
	let values = bytes
		.chunks_exact(4)
		.map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
		.collect();
	Embedding::new(values)
}
