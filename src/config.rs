//! Application configuration and constants

use directories::ProjectDirs;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

// === Remote API ===
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const CAPTION_MODEL: &str = "gpt-4.1-mini";
pub const EMBED_MODEL: &str = "text-embedding-3-small";
pub const CAPTION_PROMPT: &str = "Describe this image briefly in one short sentence. \
	Focus on what a person might remember about it for search.";
pub const CAPTION_MAX_TOKENS: u32 = 64;
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// === Storage ===
pub const DB_FILE: &str = "snapfind.db";

// === File Extensions ===
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

// === Defaults ===
pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_TOP_K: usize = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("OPENAI_API_KEY is not set; export it before running")]
	MissingApiKey,
	#[error("could not determine a data directory for this platform")]
	NoDataDir,
}

/// Configuration assembled once at startup and passed by reference into the
/// pipeline and search paths. No ambient global state.
#[derive(Debug, Clone)]
pub struct Config {
	pub api_key: String,
	pub base_url: String,
	pub db_path: PathBuf,
}

impl Config {
	pub fn load(db_override: Option<PathBuf>) -> Result<Self, ConfigError> {
		let api_key = std::env::var("OPENAI_API_KEY")
			.ok()
			.filter(|key| !key.trim().is_empty())
			.ok_or(ConfigError::MissingApiKey)?;

		let base_url = std::env::var("OPENAI_BASE_URL")
			.ok()
			.filter(|url| !url.trim().is_empty())
			.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

		let db_path = match db_override {
			Some(path) => path,
			None => default_db_path()?,
		};

		Ok(Self { api_key, base_url, db_path })
	}
}

/// Database location inside the platform data directory (e.g.
/// `~/.local/share/snapfind/snapfind.db` on Linux).
fn default_db_path() -> Result<PathBuf, ConfigError> {
	let dirs = ProjectDirs::from("", "", "snapfind").ok_or(ConfigError::NoDataDir)?;
	Ok(dirs.data_dir().join(DB_FILE))
}
