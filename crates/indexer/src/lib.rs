//! # Codewiki Indexer
//!
//! Whole-codebase analysis on top of the chunker.
//!
//! ## Pipeline
//!
//! ```text
//! Directory
//!     │
//!     ├──> File Scanner (include/ignore globs, .gitignore aware)
//!     │      └─> Source files
//!     │
//!     └──> Chunker (spawn_blocking, bounded batches)
//!            ├─> FileAnalysis[] sorted by relative path
//!            └─> Diagnostic[] for files that failed
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use codewiki_indexer::CodebaseAnalyzer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let analyzer = CodebaseAnalyzer::new("/path/to/project")?;
//!     let scan = analyzer.analyze().await?;
//!
//!     println!("Analyzed {} files, {} chunks", scan.stats.files, scan.stats.chunks);
//!     Ok(())
//! }
//! ```

mod analyzer;
mod error;
mod scanner;
mod stats;

pub use analyzer::{CodebaseAnalyzer, CodebaseScan, Diagnostic};
pub use error::{IndexerError, Result};
pub use scanner::{FileScanner, ScanOptions, DEFAULT_IGNORES};
pub use stats::ScanStats;
