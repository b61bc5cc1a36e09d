//! Core domain types

pub mod embedding;
pub mod rank;
pub mod record;
pub mod timeexpr;

pub use embedding::Embedding;
pub use rank::{QueryEmbedError, SearchHit};
pub use record::ImageRecord;
pub use timeexpr::QueryPlan;
