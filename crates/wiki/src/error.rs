use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WikiError>;

#[derive(Error, Debug)]
pub enum WikiError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Chunker error: {0}")]
    ChunkerError(#[from] codewiki_chunker::ChunkerError),

    #[error("Indexer error: {0}")]
    IndexerError(#[from] codewiki_indexer::IndexerError),

    #[error("Semantic error: {0}")]
    SemanticError(#[from] codewiki_semantic::SemanticError),

    #[error("Frontmatter error: {0}")]
    FrontmatterError(#[from] serde_yaml::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Analysis task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),

    /// A document could not be written after every attempt
    #[error("Failed to write {} after {attempts} attempts: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        attempts: u32,
        source: std::io::Error,
    },
}
