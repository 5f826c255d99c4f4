//! # Codewiki Semantic
//!
//! TF-IDF similarity index over chunks, used for search, related-code lookup
//! and relationship discovery.
//!
//! ## Architecture
//!
//! ```text
//! Chunk
//!   │  name + docs + signature + parameters + return type
//!   ▼
//! Tokenizer (word split → camelCase split → lowercase → stop words)
//!   │
//!   ▼
//! IndexBuilder ── document frequencies ──> IDF = ln((N+1)/(df+1)) + 1
//!   │
//!   ▼
//! IndexedChunk { tf, keywords, category, importance,
//!                embedding = L2(Σ tf·idf hashed into D dims) }
//!   │
//!   ▼
//! SemanticIndexer: search · find_related · discover_relationships
//! ```
//!
//! Embeddings are unit length, so cosine similarity is a dot product.

mod config;
mod error;
mod index;
mod indexer;
mod tokenizer;
mod types;

pub use config::IndexConfig;
pub use error::{Result, SemanticError};
pub use index::{cosine, inverse_document_frequency, IndexBuilder, SemanticIndex};
pub use indexer::{CancelFlag, RelationshipOptions, RelationshipScan, SemanticIndexer};
pub use tokenizer::{chunk_text, split_identifier, tokenize, STOP_WORDS};
pub use types::{
    categorize, ChunkCategory, IndexedChunk, RelationshipType, SearchHit, SemanticRelationship,
};
