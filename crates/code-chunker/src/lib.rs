//! # Codewiki Chunker
//!
//! AST-aware extraction of semantic units from TypeScript and JavaScript sources.
//!
//! ## Architecture
//!
//! ```text
//! Source File
//!     │
//!     ├──> Language Detection (from extension)
//!     │
//!     ├──> Tree-sitter Parsing → AST
//!     │
//!     ├──> Depth-first traversal, dispatched by node kind
//!     │    ├─> imports / exports
//!     │    ├─> declarations → Chunk (nested under classes and namespaces)
//!     │    └─> complexity, dependencies, documentation
//!     │
//!     └──> FileSummary (line classification + aggregates)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use codewiki_chunker::{Chunker, Language};
//!
//! let chunker = Chunker::default();
//! let code = r#"
//! /** Persists users. */
//! export class UserRepository {
//!     async findById(id: string) {
//!         return this.db.users.find(id);
//!     }
//! }
//! "#;
//!
//! let analysis = chunker
//!     .analyze_source(code, "src/user.repository.ts", "src/user.repository.ts", Language::TypeScript)
//!     .unwrap();
//! for chunk in &analysis.chunks {
//!     println!("{} at lines {}-{}", chunk.id, chunk.start_line, chunk.end_line);
//! }
//! ```

mod ast_analyzer;
mod chunker;
mod config;
mod error;
mod language;
mod summary;
mod types;

pub use chunker::{relative_path, Chunker};
pub use config::ChunkerConfig;
pub use error::{ChunkerError, Result};
pub use language::{is_supported_path, Language, SUPPORTED_EXTENSIONS};
pub use summary::{classify_line, count_lines, LineCounts, LineKind};
pub use types::{
    AccessModifier, Chunk, ChunkMetadata, ChunkType, Dependency, DependencyKind, ExportInfo,
    ExportKind, FileAnalysis, FileSummary, ImportInfo, ImportSpecifier, Modifier, Parameter,
};
