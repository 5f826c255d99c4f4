use crate::ast_analyzer::AstAnalyzer;
use crate::config::ChunkerConfig;
use crate::error::{ChunkerError, Result};
use crate::language::Language;
use crate::summary::build_summary;
use crate::types::FileAnalysis;
use std::path::Path;

/// Main entry point for analyzing source files
#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    /// Create a new chunker with a validated configuration
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate().map_err(ChunkerError::invalid_config)?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Analyze one file on disk.
    ///
    /// `base` is used to compute the relative path that prefixes chunk ids;
    /// without it the path is used as given.
    pub fn analyze_file(&self, path: impl AsRef<Path>, base: Option<&Path>) -> Result<FileAnalysis> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ChunkerError::FileNotFound(path.to_path_buf()));
        }
        let language = Language::from_path(path)?;

        let size = std::fs::metadata(path)?.len();
        if size > self.config.max_file_size_bytes {
            return Err(ChunkerError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                limit: self.config.max_file_size_bytes,
            });
        }

        let content = std::fs::read_to_string(path)?;
        let relative = relative_path(path, base);
        log::debug!("Analyzing {relative} ({} bytes)", content.len());

        self.analyze_source(&content, &path.display().to_string(), &relative, language)
    }

    /// Analyze in-memory source with an explicit language
    pub fn analyze_source(
        &self,
        content: &str,
        file_path: &str,
        relative_path: &str,
        language: Language,
    ) -> Result<FileAnalysis> {
        let mut analyzer = AstAnalyzer::new(self.config.clone(), language)?;
        let extraction = analyzer.analyze(content, relative_path)?;
        let summary = build_summary(
            content,
            &extraction.chunks,
            &extraction.imports,
            &extraction.exports,
        );

        Ok(FileAnalysis {
            file_path: file_path.to_string(),
            relative_path: relative_path.to_string(),
            language,
            chunks: extraction.chunks,
            imports: extraction.imports,
            exports: extraction.exports,
            summary,
        })
    }
}

/// Path relative to `base` with forward slashes; falls back to the path itself
pub fn relative_path(path: &Path, base: Option<&Path>) -> String {
    match base.and_then(|base| path.strip_prefix(base).ok()) {
        Some(relative) => relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .filter(|c| *c != ".")
            .collect::<Vec<_>>()
            .join("/"),
        None => path.to_string_lossy().replace('\\', "/"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkType;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file() {
        let chunker = Chunker::default();
        let err = chunker
            .analyze_file("/definitely/not/here.ts", None)
            .unwrap_err();
        assert!(matches!(err, ChunkerError::FileNotFound(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.md");
        fs::write(&path, "# hi").unwrap();

        let err = Chunker::default().analyze_file(&path, None).unwrap_err();
        assert!(matches!(err, ChunkerError::UnsupportedFileType(ref ext) if ext == ".md"));
    }

    #[test]
    fn test_size_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.ts");
        fs::write(&path, "const a = 1;\n".repeat(10)).unwrap();

        let chunker = Chunker::new(ChunkerConfig {
            max_file_size_bytes: 16,
            ..Default::default()
        })
        .unwrap();
        let err = chunker.analyze_file(&path, None).unwrap_err();
        assert!(matches!(err, ChunkerError::FileTooLarge { .. }));
    }

    #[test]
    fn test_relative_ids() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/users")).unwrap();
        let path = dir.path().join("src/users/user.ts");
        fs::write(&path, "export interface User { id: string }\n").unwrap();

        let analysis = Chunker::default()
            .analyze_file(&path, Some(dir.path()))
            .unwrap();
        assert_eq!(analysis.relative_path, "src/users/user.ts");
        assert_eq!(analysis.directory(), "src/users");
        assert_eq!(analysis.chunks[0].id, "src/users/user.ts:interface:User");
        assert_eq!(analysis.summary.exports, vec!["User".to_string()]);
        assert_eq!(analysis.summary.chunk_types.get(&ChunkType::Interface), Some(&1));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ChunkerConfig {
            max_file_size_bytes: 0,
            ..Default::default()
        };
        assert!(matches!(
            Chunker::new(config),
            Err(ChunkerError::InvalidConfig(_))
        ));
    }
}
