//! Directory scanning for candidate images

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc::Sender;
use walkdir::WalkDir;

use crate::config::IMAGE_EXTENSIONS;
use crate::storage::RecordStore;
use crate::ui;

/// A candidate file plus its dedup status, produced by the scanner and
/// consumed once by a pipeline worker.
#[derive(Debug)]
pub struct ScanResult {
	pub path: PathBuf,
	pub already_indexed: bool,
}

fn has_image_extension(path: &Path) -> bool {
	path.extension()
		.and_then(|e| e.to_str())
		.map(|ext| IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)))
		.unwrap_or(false)
}

/// Walk the roots and feed candidates into the worker queue. The indexed
/// flag is set via the store's `exists` check before yielding; writes that
/// land during the scan are tolerated (at-least-once semantics). Returns the
/// number of non-fatal scan warnings.
///
/// Runs on a blocking thread; it streams into the queue while workers drain
/// it concurrently.
pub fn scan_roots(
	roots: &[PathBuf],
	store: &RecordStore,
	tx: Sender<ScanResult>,
	cancel: &AtomicBool,
) -> usize {
	let mut warnings = 0usize;
	let mut seen: HashSet<PathBuf> = HashSet::new();

	for root in roots {
		ui::debug(&format!("Scanning: {}", root.display()));

		for entry in WalkDir::new(root) {
			if cancel.load(Ordering::Relaxed) {
				return warnings;
			}

			let entry = match entry {
				Ok(entry) => entry,
				Err(e) => {
					ui::warn(&format!("Skipping unreadable path: {e}"));
					warnings += 1;
					continue;
				}
			};

			if !entry.file_type().is_file() {
				continue;
			}

			let path = entry.into_path();
			if !has_image_extension(&path) {
				continue;
			}

			// Canonicalize so the same file reached through different roots
			// is only dispatched once per run.
			let path = path.canonicalize().unwrap_or(path);
			if !seen.insert(path.clone()) {
				continue;
			}

			let already_indexed = match store.exists(&path.to_string_lossy()) {
				Ok(found) => found,
				Err(e) => {
					ui::warn(&format!("Dedup check failed for {}: {e}", path.display()));
					warnings += 1;
					false
				}
			};

			// Workers gone means the run is over; stop scanning.
			if tx.blocking_send(ScanResult { path, already_indexed }).is_err() {
				return warnings;
			}
		}
	}

	warnings
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn extension_filter_is_case_insensitive() {
		assert!(has_image_extension(Path::new("/a/b.png")));
		assert!(has_image_extension(Path::new("/a/b.JPG")));
		assert!(has_image_extension(Path::new("/a/b.JpEg")));
		assert!(!has_image_extension(Path::new("/a/b.gif")));
		assert!(!has_image_extension(Path::new("/a/b.txt")));
		assert!(!has_image_extension(Path::new("/a/noext")));
	}
}
