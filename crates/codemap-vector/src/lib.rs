//! Codemap Vector — embeddings, cosine index and hybrid retrieval

pub mod embedder;
pub mod index;
pub mod retriever;


pub use embedder::{EmbedStats, Embedder, EmbedderConfig};
pub use index::{SearchHit, VectorIndex};
pub use retriever::{HybridResult, Retriever, SearchMode};
