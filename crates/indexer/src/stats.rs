use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statistics about a codebase scan
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanStats {
    /// Number of files analyzed successfully
    pub files: usize,

    /// Number of chunks extracted
    pub chunks: usize,

    /// Total lines across analyzed files
    pub total_lines: usize,

    /// Time taken in milliseconds
    pub time_ms: u64,

    /// Files per language
    pub languages: BTreeMap<String, usize>,

    /// Files skipped because analysis failed
    pub failed: usize,
}

impl ScanStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, language: &str, lines: usize) {
        self.files += 1;
        self.total_lines += lines;
        *self.languages.entry(language.to_string()).or_insert(0) += 1;
    }

    pub fn add_chunks(&mut self, count: usize) {
        self.chunks += count;
    }

    pub fn add_error(&mut self) {
        self.failed += 1;
    }
}
