//! # Caption/Embed Client
//!
//! Capability boundary for the remote vision and embedding models. All
//! dynamic response parsing is isolated behind this trait; the rest of the
//! crate only sees captions, vectors, and typed failures.

pub mod openai;

use std::path::Path;

use thiserror::Error;

use crate::core::Embedding;

pub use openai::OpenAiClient;

#[derive(Debug, Error)]
pub enum CaptionError {
	#[error("caption request failed: {0}")]
	Http(#[from] reqwest::Error),
	#[error("caption API returned {status}: {body}")]
	Api { status: u16, body: String },
	#[error("caption response had no content")]
	MalformedResponse,
}

#[derive(Debug, Error)]
pub enum EmbedError {
	#[error("embedding request failed: {0}")]
	Http(#[from] reqwest::Error),
	#[error("embedding API returned {status}: {body}")]
	Api { status: u16, body: String },
	#[error("embedding response had no vector")]
	MalformedResponse,
}

/// Two operations, two typed failures. Both are network round trips with no
/// latency bound of their own; implementations apply a request timeout.
#[allow(async_fn_in_trait)]
pub trait CaptionEmbed {
	/// Short natural-language description of the image bytes.
	async fn caption(&self, image: &[u8], mime: &str) -> Result<String, CaptionError>;

	/// Fixed-length vector for the given text.
	async fn embed(&self, text: &str) -> Result<Embedding, EmbedError>;
}

/// MIME type for the data URL, chosen from the file extension the same way
/// the extension filter admits files.
pub fn mime_for(path: &Path) -> &'static str {
	match path.extension().and_then(|e| e.to_str()) {
		Some(ext) if ext.eq_ignore_ascii_case("png") => "image/png",
		_ => "image/jpeg",
	}
}
