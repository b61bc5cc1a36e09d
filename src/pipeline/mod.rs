//! # Indexing Pipeline
//!
//! Streams scanned files through a bounded pool of caption+embed workers
//! and writes the results into the record store.

pub mod scan;

use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::client::{mime_for, CaptionEmbed};
use crate::core::ImageRecord;
use crate::storage::RecordStore;
use crate::ui;
use scan::ScanResult;

/// Outcome counters for one indexing run.
#[derive(Debug, Default)]
pub struct IndexSummary {
	pub new: usize,
	pub skipped: usize,
	pub failed: usize,
	pub warnings: usize,
}

/// Index every image under the given roots. The scanner runs on a blocking
/// thread and feeds a bounded queue; up to `workers` files are captioned and
/// embedded concurrently. Already-indexed files are skipped without touching
/// the network. A per-file failure is logged and counted, never fatal.
pub async fn run<C: CaptionEmbed>(
	store: Arc<RecordStore>,
	client: &C,
	roots: &[PathBuf],
	workers: usize,
	cancel: Arc<AtomicBool>,
) -> anyhow::Result<IndexSummary> {
	let (tx, rx) = mpsc::channel::<ScanResult>(workers * 2);

	let scanner = {
		let store = Arc::clone(&store);
		let cancel = Arc::clone(&cancel);
		let roots = roots.to_vec();
		tokio::task::spawn_blocking(move || scan::scan_roots(&roots, &store, tx, &cancel))
	};

	let new = AtomicUsize::new(0);
	let skipped = AtomicUsize::new(0);
	let failed = AtomicUsize::new(0);

	let candidates =
		futures::stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|item| (item, rx)) });

	candidates
		.for_each_concurrent(workers, |candidate| {
			let store = Arc::clone(&store);
			let cancel = Arc::clone(&cancel);
			let new = &new;
			let skipped = &skipped;
			let failed = &failed;
			async move {
				if cancel.load(Ordering::Relaxed) {
					return;
				}
				if candidate.already_indexed {
					ui::debug(&format!("Skipping (indexed): {}", candidate.path.display()));
					skipped.fetch_add(1, Ordering::Relaxed);
					return;
				}
				match index_one(&store, client, &candidate.path).await {
					Ok(record) => {
						ui::success(&format!(
							"Indexed {}: {}",
							ui::path_link(&candidate.path, 60),
							record.caption
						));
						new.fetch_add(1, Ordering::Relaxed);
					}
					Err(e) => {
						ui::error(&format!("Failed {}: {e:#}", candidate.path.display()));
						failed.fetch_add(1, Ordering::Relaxed);
					}
				}
			}
		})
		.await;

	let warnings = scanner.await?;

	Ok(IndexSummary {
		new: new.into_inner(),
		skipped: skipped.into_inner(),
		failed: failed.into_inner(),
		warnings,
	})
}

/// Caption, embed, and store a single image. The record timestamp comes from
/// the file's modification time so re-indexing an untouched file is stable.
async fn index_one<C: CaptionEmbed>(
	store: &RecordStore,
	client: &C,
	path: &Path,
) -> anyhow::Result<ImageRecord> {
	let bytes = tokio::fs::read(path).await?;
	let created_at = file_timestamp(path).await?;

	let caption = client.caption(&bytes, mime_for(path)).await?;
	let embedding = client.embed(&caption).await?;

	let record = ImageRecord {
		path: path.to_string_lossy().into_owned(),
		caption,
		created_at,
		embedding,
	};
	store.upsert(&record)?;
	Ok(record)
}

async fn file_timestamp(path: &Path) -> std::io::Result<chrono::DateTime<chrono::Utc>> {
	let modified = tokio::fs::metadata(path).await?.modified()?;
	Ok(modified.into())
}
