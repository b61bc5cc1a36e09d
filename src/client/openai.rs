//! OpenAI-compatible API client

use base64::Engine as _;
use serde_json::{json, Value};

use crate::client::{CaptionEmbed, CaptionError, EmbedError};
use crate::config::{
	Config, CAPTION_MAX_TOKENS, CAPTION_MODEL, CAPTION_PROMPT, EMBED_MODEL, REQUEST_TIMEOUT,
};
use crate::core::Embedding;

/// Production client: chat completions for vision captions, the embeddings
/// endpoint for vectors. Works against any OpenAI-compatible base URL.
pub struct OpenAiClient {
	http: reqwest::Client,
	base_url: String,
	api_key: String,
}

enum ApiFailure {
	Http(reqwest::Error),
	Api { status: u16, body: String },
}

impl From<ApiFailure> for CaptionError {
	fn from(failure: ApiFailure) -> Self {
		match failure {
			ApiFailure::Http(e) => CaptionError::Http(e),
			ApiFailure::Api { status, body } => CaptionError::Api { status, body },
		}
	}
}

impl From<ApiFailure> for EmbedError {
	fn from(failure: ApiFailure) -> Self {
		match failure {
			ApiFailure::Http(e) => EmbedError::Http(e),
			ApiFailure::Api { status, body } => EmbedError::Api { status, body },
		}
	}
}

impl OpenAiClient {
	pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
		let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
		Ok(Self {
			http,
			base_url: config.base_url.trim_end_matches('/').to_string(),
			api_key: config.api_key.clone(),
		})
	}

	async fn post(&self, endpoint: &str, body: Value) -> Result<Value, ApiFailure> {
		let url = format!("{}/{}", self.base_url, endpoint);
		let response = self
			.http
			.post(&url)
			.header("Authorization", format!("Bearer {}", self.api_key))
			.json(&body)
			.send()
			.await
			.map_err(ApiFailure::Http)?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(ApiFailure::Api { status: status.as_u16(), body });
		}

		response.json().await.map_err(ApiFailure::Http)
	}
}

impl CaptionEmbed for OpenAiClient {
	async fn caption(&self, image: &[u8], mime: &str) -> Result<String, CaptionError> {
		let b64 = base64::engine::general_purpose::STANDARD.encode(image);
		let data_url = format!("data:{};base64,{}", mime, b64);

		let body = json!({
			"model": CAPTION_MODEL,
			"max_tokens": CAPTION_MAX_TOKENS,
			"messages": [{
				"role": "user",
				"content": [
					{"type": "text", "text": CAPTION_PROMPT},
					{"type": "image_url", "image_url": {"url": data_url}}
				]
			}]
		});

		let value = self.post("chat/completions", body).await?;
		let caption = value
			.pointer("/choices/0/message/content")
			.and_then(|c| c.as_str())
			.map(|c| c.trim().to_string())
			.filter(|c| !c.is_empty())
			.ok_or(CaptionError::MalformedResponse)?;

		Ok(caption)
	}

	async fn embed(&self, text: &str) -> Result<Embedding, EmbedError> {
		let body = json!({
			"model": EMBED_MODEL,
			"input": text,
		});

		let value = self.post("embeddings", body).await?;
		let vector = value
			.pointer("/data/0/embedding")
			.and_then(|v| v.as_array())
			.ok_or(EmbedError::MalformedResponse)?
			.iter()
			.map(|n| n.as_f64().map(|f| f as f32))
			.collect::<Option<Vec<f32>>>()
			.ok_or(EmbedError::MalformedResponse)?;

		if vector.is_empty() {
			return Err(EmbedError::MalformedResponse);
		}

		Ok(Embedding::new(vector))
	}
}
