//! Embedding vectors for semantic similarity

/// Fixed-length vector produced by the embedding model. Stored unnormalized;
/// similarity is computed as a true cosine.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding(Vec<f32>);

impl Embedding {
	pub fn new(data: Vec<f32>) -> Self {
		Self(data)
	}

	pub fn as_slice(&self) -> &[f32] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Cosine similarity in [-1.0, 1.0]. Returns 0.0 when either vector has
	/// zero norm, so degenerate embeddings never divide by zero.
	pub fn cosine(&self, other: &Self) -> f32 {
		let dot: f32 = self.0.iter().zip(other.0.iter()).map(|(a, b)| a * b).sum();
		let norm_a: f32 = self.0.iter().map(|x| x * x).sum::<f32>().sqrt();
		let norm_b: f32 = other.0.iter().map(|x| x * x).sum::<f32>().sqrt();

		if norm_a == 0.0 || norm_b == 0.0 {
			return 0.0;
		}
		dot / (norm_a * norm_b)
	}
}
