use crate::analysis::{analyze_files, WikiAnalysis};
use crate::config::WikiConfig;
use crate::document::WikiDocument;
use crate::error::Result;
use crate::pages::{file_page, PageRenderer};
use crate::writer::{write_documents, DocumentWrite};
use chrono::{DateTime, Utc};
use codewiki_chunker::{Chunker, ChunkerConfig, FileAnalysis};
use codewiki_indexer::Diagnostic;
use std::path::Path;

/// Analysis plus the pages rendered from it
#[derive(Debug)]
pub struct GeneratedWiki {
    pub analysis: WikiAnalysis,
    pub documents: Vec<WikiDocument>,
}

/// Turns a source tree into wiki pages
#[derive(Debug, Clone)]
pub struct WikiGenerator {
    config: WikiConfig,
}

impl WikiGenerator {
    pub fn new(config: WikiConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &WikiConfig {
        &self.config
    }

    /// Scan and chunk `root`, then run every analysis stage
    pub async fn analyze(&self, root: impl AsRef<Path>) -> Result<WikiAnalysis> {
        let root = root.as_ref();
        let scan = self.config.analyzer(root)?.analyze().await?;
        self.analyze_files(project_name(root), scan.files, scan.diagnostics)
            .await
    }

    /// Run the analysis stages over files chunked elsewhere
    pub async fn analyze_files(
        &self,
        project: impl Into<String>,
        files: Vec<FileAnalysis>,
        diagnostics: Vec<Diagnostic>,
    ) -> Result<WikiAnalysis> {
        analyze_files(
            project.into(),
            files,
            diagnostics,
            self.config.index.clone(),
            self.config.hotspot_complexity,
        )
        .await
    }

    /// Render every page, stamped with the current time
    pub fn render(&self, analysis: &WikiAnalysis) -> Vec<WikiDocument> {
        self.render_at(analysis, Utc::now())
    }

    pub fn render_at(&self, analysis: &WikiAnalysis, generated: DateTime<Utc>) -> Vec<WikiDocument> {
        let documents =
            PageRenderer::new(analysis, generated, self.config.related_limit).render_all();
        log::info!("Rendered {} documents", documents.len());
        documents
    }

    /// Analyze `root` and render its pages without writing anything
    pub async fn generate(&self, root: impl AsRef<Path>) -> Result<GeneratedWiki> {
        let analysis = self.analyze(root).await?;
        let documents = self.render(&analysis);
        Ok(GeneratedWiki {
            analysis,
            documents,
        })
    }

    /// Write documents under the configured output directory
    pub async fn write(&self, documents: &[WikiDocument]) -> Vec<DocumentWrite> {
        write_documents(&self.config.output_dir, documents, self.config.write_retries).await
    }

    /// Document a single file; `base` sets the relative path shown on the page
    pub fn document_file(&self, path: impl AsRef<Path>, base: Option<&Path>) -> Result<WikiDocument> {
        let analysis = Chunker::new(ChunkerConfig::default())?.analyze_file(path, base)?;
        Ok(file_page(&analysis, Utc::now()))
    }
}

fn project_name(root: &Path) -> String {
    root.canonicalize()
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .or_else(|| root.file_name())
        .map_or_else(|| "project".to_string(), |name| name.to_string_lossy().into_owned())
}
