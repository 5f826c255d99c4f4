use std::path::PathBuf;
use thiserror::Error;

/// Result type for chunker operations
pub type Result<T> = std::result::Result<T, ChunkerError>;

/// Errors that can occur while analyzing a source file
#[derive(Error, Debug)]
pub enum ChunkerError {
    /// The requested path does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The file extension is not one of the supported source extensions
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// The file exceeds the configured size limit
    #[error("File too large: {} ({size} bytes, limit {limit})", .path.display())]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        limit: u64,
    },

    /// Failed to parse the source code
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Tree-sitter error
    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),
}

impl ChunkerError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create an unsupported file type error
    pub fn unsupported(ext: impl Into<String>) -> Self {
        Self::UnsupportedFileType(ext.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a tree-sitter error
    pub fn tree_sitter(msg: impl Into<String>) -> Self {
        Self::TreeSitterError(msg.into())
    }
}
