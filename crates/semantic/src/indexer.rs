use crate::config::IndexConfig;
use crate::error::{Result, SemanticError};
use crate::index::{cosine, IndexBuilder, SemanticIndex};
use crate::types::{IndexedChunk, RelationshipType, SearchHit, SemanticRelationship};
use codewiki_chunker::{ChunkType, FileAnalysis};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

/// Cooperative cancellation shared between the caller and a long scan
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::Relaxed)
    }
}

/// Bounds for pairwise relationship discovery
#[derive(Debug, Clone)]
pub struct RelationshipOptions {
    /// Pairs below this similarity are dropped
    pub threshold: f32,
    /// Only the first `max_chunks` indexed chunks take part
    pub max_chunks: Option<usize>,
    pub cancel: Option<CancelFlag>,
}

impl Default for RelationshipOptions {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            max_chunks: None,
            cancel: None,
        }
    }
}

impl RelationshipOptions {
    pub fn with_threshold(threshold: f32) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = Some(max_chunks);
        self
    }

    #[must_use]
    pub fn cancel_on(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }
}

/// Outcome of [`SemanticIndexer::discover_relationships`]
#[derive(Debug, Clone, Default)]
pub struct RelationshipScan {
    pub relationships: Vec<SemanticRelationship>,
    /// Chunks that took part after applying the cap
    pub evaluated_chunks: usize,
    /// True when the scan stopped early; `relationships` holds what was found
    pub cancelled: bool,
}

/// Builds and queries the TF-IDF index
#[derive(Debug)]
pub struct SemanticIndexer {
    config: IndexConfig,
    index: Option<SemanticIndex>,
}

impl Default for SemanticIndexer {
    fn default() -> Self {
        Self {
            config: IndexConfig::default(),
            index: None,
        }
    }
}

impl SemanticIndexer {
    pub fn new(config: IndexConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            index: None,
        })
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Index every chunk of every file, replacing any previous index
    pub fn build(&mut self, files: &[FileAnalysis]) -> &SemanticIndex {
        let mut builder = IndexBuilder::new(self.config.clone());
        for file in files {
            builder.add_file(file);
        }
        self.index.insert(builder.build())
    }

    pub fn index(&self) -> Result<&SemanticIndex> {
        self.index.as_ref().ok_or(SemanticError::IndexNotBuilt)
    }

    /// Chunks similar to a free-text query, best first
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let index = self.index()?;
        let query = index.embed_text(query);
        Ok(ranked(
            index.chunks.iter().map(|c| (c, cosine(&query, &c.embedding))),
            self.config.search_threshold,
            limit,
        ))
    }

    /// Chunks similar to an indexed chunk, excluding itself
    pub fn find_related(&self, chunk_id: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let index = self.index()?;
        let source = index
            .chunk(chunk_id)
            .ok_or_else(|| SemanticError::ChunkNotFound(chunk_id.to_string()))?;
        Ok(ranked(
            index
                .chunks
                .iter()
                .filter(|c| c.chunk_id != source.chunk_id)
                .map(|c| (c, cosine(&source.embedding, &c.embedding))),
            self.config.related_threshold,
            limit,
        ))
    }

    /// Classify every unordered pair at or above the threshold
    pub fn discover_relationships(&self, options: &RelationshipOptions) -> Result<RelationshipScan> {
        let index = self.index()?;
        let cap = options.max_chunks.unwrap_or(usize::MAX).min(index.chunks.len());
        let chunks = &index.chunks[..cap];
        if cap < index.chunks.len() {
            log::warn!(
                "Relationship discovery capped at {cap} of {} chunks",
                index.chunks.len()
            );
        }

        let mut scan = RelationshipScan {
            evaluated_chunks: cap,
            ..RelationshipScan::default()
        };

        for (i, a) in chunks.iter().enumerate() {
            if options.cancel.as_ref().is_some_and(CancelFlag::is_cancelled) {
                log::info!("Relationship discovery cancelled after {i} chunks");
                scan.cancelled = true;
                break;
            }
            for b in &chunks[i + 1..] {
                let similarity = cosine(&a.embedding, &b.embedding);
                if similarity < options.threshold || similarity.is_nan() {
                    continue;
                }
                let shared = shared_keywords(a, b);
                scan.relationships.push(SemanticRelationship {
                    from: a.chunk_id.clone(),
                    to: b.chunk_id.clone(),
                    relationship: classify(a, b, shared.len(), self.config.collaborator_keywords),
                    similarity,
                    shared_keywords: shared,
                });
            }
        }

        scan.relationships.sort_by(|x, y| {
            y.similarity
                .partial_cmp(&x.similarity)
                .unwrap_or(Ordering::Equal)
                .then_with(|| x.from.cmp(&y.from))
                .then_with(|| x.to.cmp(&y.to))
        });
        Ok(scan)
    }
}

fn ranked<'a>(
    scored: impl Iterator<Item = (&'a IndexedChunk, f32)>,
    threshold: f32,
    limit: usize,
) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = scored
        .filter(|(_, similarity)| *similarity > threshold)
        .map(|(chunk, similarity)| SearchHit::from_chunk(chunk, similarity))
        .collect();
    hits.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.chunk_id.cmp(&b.chunk_id))
    });
    hits.truncate(limit);
    hits
}

fn shared_keywords(a: &IndexedChunk, b: &IndexedChunk) -> Vec<String> {
    a.keywords
        .iter()
        .filter(|k| b.keywords.contains(*k))
        .cloned()
        .collect()
}

fn classify(a: &IndexedChunk, b: &IndexedChunk, shared: usize, needed: usize) -> RelationshipType {
    let interface_class = matches!(
        (a.chunk_type, b.chunk_type),
        (ChunkType::Interface, ChunkType::Class) | (ChunkType::Class, ChunkType::Interface)
    );
    if a.chunk_type == b.chunk_type {
        RelationshipType::SimilarFunctionality
    } else if a.category == b.category {
        RelationshipType::SameDomain
    } else if interface_class {
        RelationshipType::Extension
    } else if shared >= needed {
        RelationshipType::Collaborator
    } else {
        RelationshipType::Similar
    }
}
