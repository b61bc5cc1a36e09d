//! End-to-end pipeline tests against a mock caption/embed backend.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use snapfind::client::{CaptionEmbed, CaptionError, EmbedError};
use snapfind::core::{rank, timeexpr, Embedding};
use snapfind::pipeline;
use snapfind::storage::RecordStore;

/// Stand-in for the remote API: the "caption" of an image is its file
/// content, and embeddings are a deterministic bag-of-letters vector so
/// identical texts score 1.0 against each other.
struct MockClient {
	calls: AtomicUsize,
	cancel_on_caption: Option<Arc<AtomicBool>>,
}

impl MockClient {
	fn new() -> Self {
		Self { calls: AtomicUsize::new(0), cancel_on_caption: None }
	}

	/// Raises the given flag on the first caption call, simulating a Ctrl+C
	/// that arrives while a file is in flight.
	fn cancelling(flag: Arc<AtomicBool>) -> Self {
		Self { calls: AtomicUsize::new(0), cancel_on_caption: Some(flag) }
	}

	fn call_count(&self) -> usize {
		self.calls.load(Ordering::Relaxed)
	}
}

fn letter_vector(text: &str) -> Vec<f32> {
	let count = |c: char| text.chars().filter(|&ch| ch == c).count() as f32;
	vec![count('a'), count('e'), count('o'), count('t'), text.len() as f32]
}

impl CaptionEmbed for MockClient {
	async fn caption(&self, image: &[u8], _mime: &str) -> Result<String, CaptionError> {
		self.calls.fetch_add(1, Ordering::Relaxed);
		if let Some(flag) = &self.cancel_on_caption {
			flag.store(true, Ordering::Relaxed);
		}
		let text = String::from_utf8_lossy(image).trim().to_string();
		if text.contains("FAIL") {
			return Err(CaptionError::MalformedResponse);
		}
		Ok(text)
	}

	async fn embed(&self, text: &str) -> Result<Embedding, EmbedError> {
		self.calls.fetch_add(1, Ordering::Relaxed);
		Ok(Embedding::new(letter_vector(text)))
	}
}

fn write_image(dir: &std::path::Path, name: &str, caption: &str) -> PathBuf {
	let path = dir.join(name);
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent).unwrap();
	}
	fs::write(&path, caption).unwrap();
	path
}

async fn index(store: &Arc<RecordStore>, client: &MockClient, root: &std::path::Path) -> pipeline::IndexSummary {
	let cancel = Arc::new(AtomicBool::new(false));
	pipeline::run(Arc::clone(store), client, &[root.to_path_buf()], 2, cancel)
		.await
		.unwrap()
}

#[tokio::test]
async fn indexing_is_incremental_and_idempotent() {
	let dir = tempfile::tempdir().unwrap();
	write_image(dir.path(), "a.png", "a cat sleeping on a sofa");
	write_image(dir.path(), "b.jpg", "a mountain lake at dawn");
	write_image(dir.path(), "nested/c.jpeg", "a whiteboard full of diagrams");
	write_image(dir.path(), "notes.txt", "not an image");

	let store = Arc::new(RecordStore::open(&dir.path().join("db/snapfind.db")).unwrap());
	let client = MockClient::new();

	let first = index(&store, &client, dir.path()).await;
	assert_eq!(first.new, 3);
	assert_eq!(first.skipped, 0);
	assert_eq!(first.failed, 0);
	assert_eq!(store.count().unwrap(), 3);
	// caption + embed per image
	assert_eq!(client.call_count(), 6);

	// Second run finds everything already indexed and never hits the API.
	let second = index(&store, &client, dir.path()).await;
	assert_eq!(second.new, 0);
	assert_eq!(second.skipped, 3);
	assert_eq!(second.failed, 0);
	assert_eq!(store.count().unwrap(), 3);
	assert_eq!(client.call_count(), 6);
}

#[tokio::test]
async fn one_bad_file_does_not_abort_the_run() {
	let dir = tempfile::tempdir().unwrap();
	write_image(dir.path(), "good.png", "a red bicycle against a wall");
	write_image(dir.path(), "bad.png", "FAIL");
	write_image(dir.path(), "fine.jpg", "a bowl of ramen");

	let store = Arc::new(RecordStore::open(&dir.path().join("db/snapfind.db")).unwrap());
	let client = MockClient::new();

	let summary = index(&store, &client, dir.path()).await;
	assert_eq!(summary.new, 2);
	assert_eq!(summary.failed, 1);
	assert_eq!(store.count().unwrap(), 2);

	// A failed file is not marked indexed; the next run retries it.
	let retry = index(&store, &client, dir.path()).await;
	assert_eq!(retry.skipped, 2);
	assert_eq!(retry.failed, 1);
}

#[tokio::test]
async fn indexed_images_are_found_by_their_description() {
	let dir = tempfile::tempdir().unwrap();
	let cat = write_image(dir.path(), "cat.png", "a cat sleeping on a sofa");
	write_image(dir.path(), "lake.jpg", "a mountain lake at dawn");

	let store = Arc::new(RecordStore::open(&dir.path().join("db/snapfind.db")).unwrap());
	let client = MockClient::new();
	index(&store, &client, dir.path()).await;

	let plan = timeexpr::parse_query("a cat sleeping on a sofa", Utc::now());
	let hits = rank::execute(&client, store.all().unwrap(), &plan, 5)
		.await
		.unwrap();

	assert_eq!(hits.len(), 2);
	assert_eq!(hits[0].path, cat.canonicalize().unwrap().to_string_lossy());
	assert!(hits[0].score > hits[1].score);
	assert!((hits[0].score - 1.0).abs() < 1e-5);
}

#[tokio::test]
async fn cancelled_run_indexes_nothing_and_still_reports() {
	let dir = tempfile::tempdir().unwrap();
	write_image(dir.path(), "a.png", "a cat sleeping on a sofa");
	write_image(dir.path(), "b.jpg", "a mountain lake at dawn");

	let store = Arc::new(RecordStore::open(&dir.path().join("db/snapfind.db")).unwrap());
	let client = MockClient::new();

	let cancel = Arc::new(AtomicBool::new(true));
	let summary = pipeline::run(Arc::clone(&store), &client, &[dir.path().to_path_buf()], 2, cancel)
		.await
		.unwrap();

	assert_eq!(summary.new, 0);
	assert_eq!(summary.failed, 0);
	assert_eq!(store.count().unwrap(), 0);
	assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn mid_run_cancel_keeps_finished_records() {
	let dir = tempfile::tempdir().unwrap();
	write_image(dir.path(), "a.png", "a poster on a brick wall");
	write_image(dir.path(), "b.jpg", "a bowl of ramen");
	write_image(dir.path(), "c.jpeg", "a whiteboard full of diagrams");

	let store = Arc::new(RecordStore::open(&dir.path().join("db/snapfind.db")).unwrap());
	let cancel = Arc::new(AtomicBool::new(false));
	// The flag flips while the first file is captioned; that file completes
	// and is stored, the rest are dropped.
	let client = MockClient::cancelling(Arc::clone(&cancel));

	let summary =
		pipeline::run(Arc::clone(&store), &client, &[dir.path().to_path_buf()], 1, cancel)
			.await
			.unwrap();

	assert_eq!(summary.new, 1);
	assert_eq!(summary.failed, 0);
	assert_eq!(store.count().unwrap(), 1);
}

#[tokio::test]
async fn unreadable_roots_are_counted_as_warnings() {
	let dir = tempfile::tempdir().unwrap();
	write_image(dir.path(), "a.png", "a bowl of ramen");

	let store = Arc::new(RecordStore::open(&dir.path().join("db/snapfind.db")).unwrap());
	let client = MockClient::new();

	let cancel = Arc::new(AtomicBool::new(false));
	let roots = vec![dir.path().join("missing"), dir.path().to_path_buf()];
	let summary = pipeline::run(Arc::clone(&store), &client, &roots, 2, cancel)
		.await
		.unwrap();

	// The bad root is a warning, not a failure; the good root still indexes.
	assert_eq!(summary.warnings, 1);
	assert_eq!(summary.failed, 0);
	assert_eq!(summary.new, 1);
}

#[tokio::test]
async fn duplicate_roots_index_each_file_once() {
	let dir = tempfile::tempdir().unwrap();
	write_image(dir.path(), "a.png", "a poster on a brick wall");

	let store = Arc::new(RecordStore::open(&dir.path().join("db/snapfind.db")).unwrap());
	let client = MockClient::new();

	let cancel = Arc::new(AtomicBool::new(false));
	let roots = vec![dir.path().to_path_buf(), dir.path().to_path_buf()];
	let summary = pipeline::run(Arc::clone(&store), &client, &roots, 2, cancel)
		.await
		.unwrap();

	assert_eq!(summary.new, 1);
	assert_eq!(store.count().unwrap(), 1);
}
