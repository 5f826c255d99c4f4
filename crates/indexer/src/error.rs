use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Chunker error: {0}")]
    ChunkerError(#[from] codewiki_chunker::ChunkerError),

    #[error("Invalid project path: {0}")]
    InvalidPath(String),

    #[error("Invalid glob pattern: {0}")]
    InvalidPattern(#[from] globset::Error),

    #[error("{0}")]
    Other(String),
}
