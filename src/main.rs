//! snapfind - describe an image, get it back
//!
//! A command-line tool that indexes local images through a captioning and
//! embedding API, then finds them again from free-text descriptions.

use clap::Parser;

use snapfind::cli::{Cli, Command};
use snapfind::commands;
use snapfind::config::Config;
use snapfind::ui;

#[tokio::main]
async fn main() {
	let cli = Cli::parse();

	ui::Log::set_verbose(cli.verbose);

	let config = match Config::load(cli.db) {
		Ok(config) => config,
		Err(e) => {
			ui::error(&e.to_string());
			std::process::exit(1);
		}
	};

	let result = match cli.command {
		Command::Index { roots, workers } => {
			commands::index::run(&config, &roots, workers).await
		}
		Command::Search { query, top_k, json } => {
			commands::search::run(&config, query.as_deref(), top_k, json).await
		}
	};

	// Per-file indexing failures are reported inline and do not change the
	// exit code; only unrecoverable startup errors land here.
	if let Err(e) = result {
		ui::error(&format!("{e:#}"));
		std::process::exit(1);
	}
}
