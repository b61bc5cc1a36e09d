//! Interactive prompt - repeated searches in one session

use anyhow::Result;
use colored::Colorize;
use std::io::{self, Write};

use crate::client::OpenAiClient;
use crate::storage::RecordStore;
use crate::ui;

pub async fn run(store: &RecordStore, client: &OpenAiClient, top_k: usize) -> Result<()> {
	ui::info("Interactive search. Type a description, or 'exit' to quit.");

	let indexed = store.count()?;
	if indexed == 0 {
		ui::warn("No indexed images found. Run 'snapfind index' first.");
		return Ok(());
	}
	ui::success(&format!("Searching {} indexed images", indexed));
	println!();

	loop {
		print!("{} ", "snapfind>".bright_blue().bold());
		io::stdout().flush()?;

		let mut input = String::new();
		// EOF ends the session like 'exit' does.
		if io::stdin().read_line(&mut input)? == 0 {
			break;
		}

		let query = input.trim();

		if query.is_empty() {
			continue;
		}

		if query == "exit" || query == "quit" || query == "q" {
			break;
		}

		if query == "help" {
			show_help();
			continue;
		}

		crate::commands::search::search_once(store, client, query, top_k, false).await?;
		println!();
	}

	Ok(())
}

fn show_help() {
	println!("{}", "Prompt commands:".bright_blue().bold());
	println!("  {}  Search with a description (time phrases like 'from 2 weeks ago' work)", "<text>".dimmed());
	println!("  {}    Show this help message", "help".dimmed());
	println!("  {}    Leave the prompt", "exit".dimmed());
}
