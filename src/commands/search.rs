//! Search command - find indexed images from a text description

use anyhow::{Context, Result};
use chrono::Utc;
use colored::*;

use crate::client::OpenAiClient;
use crate::config::Config;
use crate::core::{rank, timeexpr, SearchHit};
use crate::storage::RecordStore;
use crate::ui;

pub async fn run(config: &Config, query: Option<&str>, top_k: usize, json: bool) -> Result<()> {
	let store = RecordStore::open(&config.db_path)
		.with_context(|| format!("could not open database at {}", config.db_path.display()))?;
	let client = OpenAiClient::new(config).context("could not build HTTP client")?;

	match query {
		Some(text) => {
			search_once(&store, &client, text, top_k, json).await?;
			Ok(())
		}
		None => crate::commands::prompt::run(&store, &client, top_k).await,
	}
}

/// One search round trip: parse the time expression, embed the residual
/// text, rank, and print. Returns the number of hits. A failed query
/// embedding is reported as an error, not as an empty result.
pub(crate) async fn search_once(
	store: &RecordStore,
	client: &OpenAiClient,
	query: &str,
	top_k: usize,
	json: bool,
) -> Result<usize> {
	let start = std::time::Instant::now();

	let plan = timeexpr::parse_query(query, Utc::now());
	if let Some(cutoff) = plan.cutoff {
		ui::debug(&format!("Only images taken since {}", cutoff.format("%Y-%m-%d")));
	}
	ui::info(&format!("Searching for: \"{}\"", plan.text));

	let records = store.all()?;
	if records.is_empty() {
		ui::warn("No indexed images found. Run 'snapfind index' first.");
		return Ok(0);
	}

	let hits = match rank::execute(client, records, &plan, top_k).await {
		Ok(hits) => hits,
		Err(e) => {
			ui::error(&format!("Search failed: {e}"));
			return Ok(0);
		}
	};

	if hits.is_empty() {
		ui::warn("No matches found");
		return Ok(0);
	}

	if json {
		println!("{}", serde_json::to_string_pretty(&hits)?);
		return Ok(hits.len());
	}

	ui::header("Results");
	for (i, hit) in hits.iter().enumerate() {
		print_hit(i, hit);
	}

	let duration = start.elapsed().as_millis();
	println!();
	ui::success(&format!("Found {} matches in {}ms", hits.len(), duration));

	Ok(hits.len())
}

fn print_hit(index: usize, hit: &SearchHit) {
	let link = ui::path_link(std::path::Path::new(&hit.path), 60);
	let percentage = (hit.score * 100.0).round() as i32;

	println!(
		"{}. {} {} {}",
		format!("{:2}", index + 1).bright_blue().bold(),
		link.bright_white(),
		format!("{}%", percentage).dimmed(),
		hit.created_at.format("%Y-%m-%d").to_string().dimmed(),
	);
	println!("    {}", hit.caption.dimmed());
}
