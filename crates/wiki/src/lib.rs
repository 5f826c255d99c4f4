//! # Codewiki Wiki
//!
//! Renders the analysis of a codebase as linked Markdown pages with YAML
//! frontmatter.
//!
//! ## Pipeline
//!
//! ```text
//! Directory
//!     │
//!     ├──> CodebaseAnalyzer (scan + chunk, bounded spawn_blocking batches)
//!     │
//!     ├──> fan-out (spawn_blocking, joined before continuing)
//!     │      ├─ GraphBuilder       → DependencyGraph
//!     │      ├─ PatternDetector    → ArchitecturalPattern[]
//!     │      ├─ ModuleAnalyzer     → ModuleInfo[]
//!     │      └─ SemanticIndexer    → TF-IDF index
//!     │
//!     ├──> DomainAnalyzer + CodebaseMetrics
//!     │
//!     ├──> PageRenderer → WikiDocument[] (overview, architecture, patterns/,
//!     │                   modules/, domain-model, entities/, services/,
//!     │                   workflows/, metrics, index)
//!     │
//!     └──> write_documents (per-document result, retried, no rollback)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use codewiki_wiki::{WikiConfig, WikiGenerator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let generator = WikiGenerator::new(WikiConfig::default())?;
//!     let wiki = generator.generate("/path/to/project").await?;
//!     for outcome in generator.write(&wiki.documents).await {
//!         outcome.result?;
//!     }
//!     Ok(())
//! }
//! ```

mod analysis;
mod config;
mod document;
mod error;
mod generator;
mod metrics;
mod pages;
mod writer;

pub use analysis::{analyze_files, WikiAnalysis};
pub use config::WikiConfig;
pub use document::{parse_frontmatter, slugify, split_frontmatter, Frontmatter, Section, WikiDocument};
pub use error::{Result, WikiError};
pub use generator::{GeneratedWiki, WikiGenerator};
pub use metrics::{health_score, CodebaseMetrics, Hotspot, MAX_HEALTH};
pub use pages::{
    entity_path, file_page, file_path, module_path, pattern_path, relative_link, service_path,
    workflow_path, PageMap, PageRenderer, ARCHITECTURE, DOMAIN_MODEL, INDEX, METRICS, OVERVIEW,
};
pub use writer::{write_documents, DocumentWrite};
