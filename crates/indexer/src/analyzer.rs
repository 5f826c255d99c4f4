use crate::error::{IndexerError, Result};
use crate::scanner::{FileScanner, ScanOptions};
use crate::stats::ScanStats;
use codewiki_chunker::{relative_path, Chunker, ChunkerConfig, FileAnalysis};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// A file that could not be analyzed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub path: String,
    pub message: String,
}

/// Result of analyzing a whole codebase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodebaseScan {
    pub root: PathBuf,
    /// Successful analyses sorted by relative path
    pub files: Vec<FileAnalysis>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: ScanStats,
}

impl CodebaseScan {
    /// Look up a file by its relative path
    pub fn file(&self, relative_path: &str) -> Option<&FileAnalysis> {
        self.files.iter().find(|f| f.relative_path == relative_path)
    }
}

/// Analyzes every matching file under a root directory
pub struct CodebaseAnalyzer {
    root: PathBuf,
    chunker: Arc<Chunker>,
    options: ScanOptions,
    max_concurrent: usize,
}

impl CodebaseAnalyzer {
    /// Create analyzer for a project root
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        Self::with_config(root, ChunkerConfig::default())
    }

    pub fn with_config(root: impl AsRef<Path>, config: ChunkerConfig) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(IndexerError::InvalidPath(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        // Mixed IO + parsing per file; keep fan-out small and adaptive.
        let max_concurrent = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .clamp(2, 8);

        Ok(Self {
            root,
            chunker: Arc::new(Chunker::new(config)?),
            options: ScanOptions::default(),
            max_concurrent,
        })
    }

    #[must_use]
    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Discover files with the scan options, then analyze them
    pub async fn analyze(&self) -> Result<CodebaseScan> {
        let scanner = FileScanner::new(&self.root).with_options(self.options.clone());
        let files = scanner.scan()?;
        self.analyze_paths(files).await
    }

    /// Analyze an explicit file list. Per-file failures become diagnostics.
    pub async fn analyze_paths(&self, files: Vec<PathBuf>) -> Result<CodebaseScan> {
        let start = Instant::now();
        let mut stats = ScanStats::new();
        let mut analyses = Vec::with_capacity(files.len());
        let mut diagnostics = Vec::new();

        for batch in files.chunks(self.max_concurrent) {
            let mut tasks = Vec::with_capacity(batch.len());
            for path in batch {
                let display = relative_path(path, Some(&self.root));
                let path = path.clone();
                let root = self.root.clone();
                let chunker = Arc::clone(&self.chunker);
                let task =
                    tokio::task::spawn_blocking(move || chunker.analyze_file(&path, Some(&root)));
                tasks.push((display, task));
            }

            for (display, task) in tasks {
                match task.await {
                    Ok(Ok(analysis)) => {
                        stats.add_file(analysis.language.as_str(), analysis.summary.total_lines);
                        stats.add_chunks(analysis.chunks.len());
                        analyses.push(analysis);
                    }
                    Ok(Err(e)) => {
                        log::warn!("Skipping {display}: {e}");
                        stats.add_error();
                        diagnostics.push(Diagnostic {
                            path: display,
                            message: e.to_string(),
                        });
                    }
                    Err(e) => {
                        log::warn!("Analysis task for {display} panicked: {e}");
                        stats.add_error();
                        diagnostics.push(Diagnostic {
                            path: display,
                            message: format!("Task panicked: {e}"),
                        });
                    }
                }
            }
        }

        analyses.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        diagnostics.sort_by(|a, b| a.path.cmp(&b.path));
        stats.time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        log::info!(
            "Analyzed {} files ({} chunks, {} skipped) in {} ms",
            stats.files,
            stats.chunks,
            stats.failed,
            stats.time_ms
        );

        Ok(CodebaseScan {
            root: self.root.clone(),
            files: analyses,
            diagnostics,
            stats,
        })
    }
}
