use crate::config::IndexConfig;
use crate::tokenizer::{chunk_text, tokenize};
use crate::types::{categorize, IndexedChunk};
use codewiki_chunker::{Chunk, FileAnalysis};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Vocabulary, IDF table and per-chunk vectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticIndex {
    /// Term to position, assigned in sorted term order
    pub vocabulary: BTreeMap<String, usize>,
    pub idf: BTreeMap<String, f64>,
    pub document_count: usize,
    pub dimensions: usize,
    pub chunks: Vec<IndexedChunk>,
}

impl SemanticIndex {
    pub fn chunk(&self, chunk_id: &str) -> Option<&IndexedChunk> {
        self.chunks.iter().find(|c| c.chunk_id == chunk_id)
    }

    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Embed free text with the corpus IDF. Terms outside the vocabulary are ignored.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let tokens = tokenize(text);
        let tf = term_frequencies(&tokens);
        embed(&tf, &self.idf, self.dimensions)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// `ln((N + 1) / (df + 1)) + 1`
#[must_use]
pub fn inverse_document_frequency(documents: usize, document_frequency: usize) -> f64 {
    ((documents as f64 + 1.0) / (document_frequency as f64 + 1.0)).ln() + 1.0
}

/// Dot product; vectors are unit length so this is the cosine
#[must_use]
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

fn normalize(vec: &mut [f32]) {
    let norm = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return;
    }
    for value in vec {
        *value /= norm;
    }
}

fn term_frequencies(tokens: &[String]) -> BTreeMap<String, f64> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for token in tokens {
        *counts.entry(token.clone()).or_default() += 1;
    }
    let total = tokens.len().max(1) as f64;
    counts
        .into_iter()
        .map(|(term, count)| (term, count as f64 / total))
        .collect()
}

fn embed(tf: &BTreeMap<String, f64>, idf: &BTreeMap<String, f64>, dimensions: usize) -> Vec<f32> {
    let mut vec = vec![0.0f32; dimensions];
    if dimensions == 0 {
        return vec;
    }
    for (term, freq) in tf {
        let Some(weight) = idf.get(term) else {
            continue;
        };
        let slot = (fnv1a_64(term.as_bytes()) % dimensions as u64) as usize;
        vec[slot] += (freq * weight) as f32;
    }
    normalize(&mut vec);
    vec
}

struct PendingChunk {
    chunk_id: String,
    name: String,
    file_path: String,
    chunk_type: codewiki_chunker::ChunkType,
    tokens: Vec<String>,
    exported: bool,
    top_level: bool,
    documented: bool,
    children: usize,
    complexity: u32,
}

/// Accumulates chunks, then computes IDF and embeddings in one pass
pub struct IndexBuilder {
    config: IndexConfig,
    pending: Vec<PendingChunk>,
    document_frequency: HashMap<String, usize>,
}

impl IndexBuilder {
    pub fn new(config: IndexConfig) -> Self {
        Self {
            config,
            pending: Vec::new(),
            document_frequency: HashMap::new(),
        }
    }

    pub fn add_file(&mut self, file: &FileAnalysis) -> &mut Self {
        for chunk in &file.chunks {
            self.add_chunk(chunk);
        }
        self
    }

    pub fn add_chunk(&mut self, chunk: &Chunk) -> &mut Self {
        let tokens = tokenize(&chunk_text(chunk));
        let distinct: BTreeSet<&String> = tokens.iter().collect();
        for term in distinct {
            *self.document_frequency.entry(term.clone()).or_default() += 1;
        }
        self.pending.push(PendingChunk {
            chunk_id: chunk.id.clone(),
            name: chunk.name.clone(),
            file_path: chunk.file_path.clone(),
            chunk_type: chunk.chunk_type,
            tokens,
            exported: chunk.exported,
            top_level: chunk.is_top_level(),
            documented: chunk.documentation.as_deref().is_some_and(|d| !d.trim().is_empty()),
            children: chunk.children.len(),
            complexity: chunk.metadata.complexity,
        });
        self
    }

    pub fn build(self) -> SemanticIndex {
        let documents = self.pending.len();
        let idf: BTreeMap<String, f64> = self
            .document_frequency
            .iter()
            .map(|(term, df)| (term.clone(), inverse_document_frequency(documents, *df)))
            .collect();
        let vocabulary = idf
            .keys()
            .enumerate()
            .map(|(position, term)| (term.clone(), position))
            .collect();

        let chunks = self
            .pending
            .into_iter()
            .map(|pending| finish_chunk(pending, &idf, &self.config))
            .collect();

        log::info!(
            "Built semantic index: {documents} chunks, {} terms",
            idf.len()
        );

        SemanticIndex {
            vocabulary,
            idf,
            document_count: documents,
            dimensions: self.config.dimensions,
            chunks,
        }
    }
}

fn finish_chunk(
    pending: PendingChunk,
    idf: &BTreeMap<String, f64>,
    config: &IndexConfig,
) -> IndexedChunk {
    let tf = term_frequencies(&pending.tokens);

    let mut scored: Vec<(&String, f64)> = tf
        .iter()
        .map(|(term, freq)| (term, freq * idf.get(term).copied().unwrap_or(0.0)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    let keywords: Vec<String> = scored
        .into_iter()
        .take(config.max_keywords)
        .map(|(term, _)| term.clone())
        .collect();

    let importance = importance(&pending, keywords.len(), config.max_keywords);
    let embedding = embed(&tf, idf, config.dimensions);

    IndexedChunk {
        category: categorize(&pending.file_path, &pending.name, pending.chunk_type),
        chunk_id: pending.chunk_id,
        name: pending.name,
        file_path: pending.file_path,
        chunk_type: pending.chunk_type,
        tokens: pending.tokens,
        term_frequencies: tf,
        keywords,
        importance,
        embedding,
    }
}

/// Exported 0.3, top-level 0.2, documented 0.2, then children, complexity and
/// keyword count at 0.1 each, saturating
fn importance(chunk: &PendingChunk, keywords: usize, max_keywords: usize) -> f64 {
    let flag = |on: bool, weight: f64| if on { weight } else { 0.0 };
    let ratio = |value: f64, cap: f64| (value / cap).min(1.0);

    let score = flag(chunk.exported, 0.3)
        + flag(chunk.top_level, 0.2)
        + flag(chunk.documented, 0.2)
        + 0.1 * ratio(chunk.children as f64, 5.0)
        + 0.1 * ratio(f64::from(chunk.complexity), 10.0)
        + 0.1 * ratio(keywords as f64, max_keywords.max(1) as f64);
    score.clamp(0.0, 1.0)
}
