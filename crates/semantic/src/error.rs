use thiserror::Error;

pub type Result<T> = std::result::Result<T, SemanticError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("Semantic index has not been built")]
    IndexNotBuilt,

    #[error("Chunk not found: {0}")]
    ChunkNotFound(String),

    #[error("Invalid index configuration: {0}")]
    InvalidConfig(String),
}
