//! Ranked retrieval over stored records

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use thiserror::Error;

use crate::client::{CaptionEmbed, EmbedError};
use crate::core::timeexpr::QueryPlan;
use crate::core::{Embedding, ImageRecord};

/// One ranked result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
	pub path: String,
	pub score: f32,
	pub caption: String,
	pub created_at: DateTime<Utc>,
}

/// Embedding the query itself failed; the search returns no results rather
/// than falling back to unscored output.
#[derive(Debug, Error)]
#[error("failed to embed query: {0}")]
pub struct QueryEmbedError(#[from] pub EmbedError);

/// Embed the residual query text once, then score, filter, and order the
/// records deterministically.
pub async fn execute<C: CaptionEmbed>(
	client: &C,
	records: Vec<ImageRecord>,
	plan: &QueryPlan,
	top_k: usize,
) -> Result<Vec<SearchHit>, QueryEmbedError> {
	let query_embedding = client.embed(&plan.text).await?;
	Ok(rank(records, &query_embedding, plan.cutoff, top_k))
}

/// Pure ranking step: cosine-score every record, drop those older than the
/// cutoff, sort by (score desc, created_at desc, path asc), keep top K.
pub fn rank(
	records: Vec<ImageRecord>,
	query: &Embedding,
	cutoff: Option<DateTime<Utc>>,
	top_k: usize,
) -> Vec<SearchHit> {
	let mut hits: Vec<SearchHit> = records
		.into_iter()
		.filter(|record| cutoff.map_or(true, |c| record.created_at >= c))
		.map(|record| SearchHit {
			score: query.cosine(&record.embedding),
			path: record.path,
			caption: record.caption,
			created_at: record.created_at,
		})
		.collect();

	hits.sort_by(|a, b| {
		b.score
			.partial_cmp(&a.score)
			.unwrap_or(Ordering::Equal)
			.then_with(|| b.created_at.cmp(&a.created_at))
			.then_with(|| a.path.cmp(&b.path))
	});
	hits.truncate(top_k);
	hits
}
