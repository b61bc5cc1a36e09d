//! Index command - caption and embed images under one or more roots

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::client::OpenAiClient;
use crate::config::Config;
use crate::pipeline;
use crate::storage::RecordStore;
use crate::ui;

pub async fn run(config: &Config, roots: &[PathBuf], workers: usize) -> Result<()> {
	let store = Arc::new(
		RecordStore::open(&config.db_path)
			.with_context(|| format!("could not open database at {}", config.db_path.display()))?,
	);
	let client = OpenAiClient::new(config).context("could not build HTTP client")?;

	ui::info(&format!(
		"Indexing {} with {} workers",
		roots
			.iter()
			.map(|r| r.display().to_string())
			.collect::<Vec<_>>()
			.join(", "),
		workers
	));

	// First Ctrl+C stops dispatching new files; in-flight requests finish and
	// their records are kept.
	let cancel = Arc::new(AtomicBool::new(false));
	{
		let cancel = Arc::clone(&cancel);
		tokio::spawn(async move {
			if tokio::signal::ctrl_c().await.is_ok() {
				ui::warn("Interrupted, finishing in-flight files...");
				cancel.store(true, Ordering::Relaxed);
			}
		});
	}

	let summary = pipeline::run(Arc::clone(&store), &client, roots, workers, cancel).await?;

	println!();
	ui::success(&format!("Indexed {} new images", summary.new));
	if summary.skipped > 0 {
		ui::info(&format!("Skipped {} already-indexed images", summary.skipped));
	}
	if summary.failed > 0 {
		ui::warn(&format!("Failed to index {} images (see errors above)", summary.failed));
	}
	if summary.warnings > 0 {
		ui::warn(&format!("{} paths could not be scanned", summary.warnings));
	}
	ui::info(&format!("Store now holds {} images", store.count()?));

	Ok(())
}
