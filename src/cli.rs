use clap::builder::styling::{AnsiColor, Color, Style, Styles};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::{DEFAULT_TOP_K, DEFAULT_WORKERS};

fn parse_workers(s: &str) -> Result<usize, String> {
	let val: usize = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
	if val == 0 {
		Err("workers must be at least 1".to_string())
	} else {
		Ok(val)
	}
}

fn styles() -> Styles {
	Styles::styled()
		.header(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Blue))))
		.usage(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Blue))))
		.literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue))))
		.placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))))
		.valid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue))))
		.invalid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))))
}

#[derive(Parser, Debug)]
#[command(
	name = "snapfind",
	author,
	version,
	about = "Find local images by describing them",
	styles = styles(),
	after_help = format!(
		"{title}
  {bin} {index}   {index_args}       {index_desc}
  {bin} {index}   {index_w_args}   {index_w_desc}
  {bin} {search}  {search_args}   {search_desc}
  {bin} {search}              {prompt_desc}",
		title = "Examples:".bright_blue().bold(),
		bin = "snapfind".bright_blue(),
		index = "index".yellow(),
		index_args = "~/Pictures",
		index_desc = "Index a directory".dimmed(),
		index_w_args = "~/Pictures -w 8",
		index_w_desc = "Index with 8 workers".dimmed(),
		search = "search".yellow(),
		search_args = "\"cat on a sofa\"",
		search_desc = "One-shot search".dimmed(),
		prompt_desc = "Interactive prompt".dimmed(),
	),
)]
pub struct Cli {
	/// Enable verbose debug output
	#[arg(short = 'v', long = "verbose", global = true)]
	pub verbose: bool,

	/// Path to the record database (default: platform data directory)
	#[arg(long = "db", global = true, value_name = "PATH")]
	pub db: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Index images by captioning and embedding them
	Index {
		/// One or more root directories to scan for images
		#[arg(value_name = "DIR", required = true)]
		roots: Vec<PathBuf>,

		/// Number of parallel workers for API calls
		#[arg(short = 'w', long = "workers", default_value_t = DEFAULT_WORKERS, value_parser = parse_workers)]
		workers: usize,
	},

	/// Search indexed images by text description
	Search {
		/// Description of the image you are looking for (omit for an interactive prompt)
		#[arg(value_name = "QUERY")]
		query: Option<String>,

		/// Number of results to return
		#[arg(short = 'k', long = "top-k", default_value_t = DEFAULT_TOP_K)]
		top_k: usize,

		/// Print results as JSON instead of a table
		#[arg(long = "json")]
		json: bool,
	},
}
