use crate::error::Result;
use crate::metrics::CodebaseMetrics;
use codewiki_chunker::FileAnalysis;
use codewiki_domain::{DomainAnalyzer, DomainModel, ModuleAnalyzer, ModuleInfo};
use codewiki_graph::{DependencyGraph, GraphBuilder};
use codewiki_indexer::Diagnostic;
use codewiki_patterns::{ArchitecturalPattern, PatternDetector};
use codewiki_semantic::{IndexConfig, SemanticIndexer};
use std::sync::Arc;

/// Everything the pages are rendered from
#[derive(Debug)]
pub struct WikiAnalysis {
    /// Display name, usually the root directory name
    pub project: String,
    /// Sorted by relative path
    pub files: Vec<FileAnalysis>,
    /// Files that failed to analyze
    pub diagnostics: Vec<Diagnostic>,
    pub graph: DependencyGraph,
    pub patterns: Vec<ArchitecturalPattern>,
    pub modules: Vec<ModuleInfo>,
    pub domain: DomainModel,
    pub indexer: SemanticIndexer,
    pub metrics: CodebaseMetrics,
}

/// Run the whole-corpus stages over already chunked files.
///
/// Graph building, pattern detection, module analysis and indexing only read
/// the files, so they run as parallel blocking tasks. Domain analysis needs
/// the modules and patterns and starts once all four have finished.
pub async fn analyze_files(
    project: String,
    files: Vec<FileAnalysis>,
    diagnostics: Vec<Diagnostic>,
    index_config: IndexConfig,
    hotspot_complexity: u32,
) -> Result<WikiAnalysis> {
    let mut indexer = SemanticIndexer::new(index_config)?;
    let files = Arc::new(files);

    let graph_task = tokio::task::spawn_blocking({
        let files = Arc::clone(&files);
        move || GraphBuilder::new().build(&files)
    });
    let patterns_task = tokio::task::spawn_blocking({
        let files = Arc::clone(&files);
        move || PatternDetector::new().detect(&files)
    });
    let modules_task = tokio::task::spawn_blocking({
        let files = Arc::clone(&files);
        move || ModuleAnalyzer::new().analyze(&files)
    });
    let index_task = tokio::task::spawn_blocking({
        let files = Arc::clone(&files);
        move || {
            indexer.build(&files);
            indexer
        }
    });

    let (graph, patterns, modules, indexer) =
        tokio::try_join!(graph_task, patterns_task, modules_task, index_task)?;

    let files = Arc::try_unwrap(files).unwrap_or_else(|shared| (*shared).clone());
    let domain = DomainAnalyzer::new().analyze(&files, &modules, &patterns);
    let metrics = CodebaseMetrics::compute(&files, &graph, hotspot_complexity);

    log::info!(
        "Analysis of {project}: {} nodes, {} patterns, {} modules, {} entities, health {}",
        graph.node_count(),
        patterns.len(),
        modules.len(),
        domain.entities.len(),
        metrics.health_score
    );

    Ok(WikiAnalysis {
        project,
        files,
        diagnostics,
        graph,
        patterns,
        modules,
        domain,
        indexer,
        metrics,
    })
}
