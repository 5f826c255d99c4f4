use crate::error::{ChunkerError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Extensions the chunker accepts, without the leading dot
pub const SUPPORTED_EXTENSIONS: &[&str] = &["ts", "mts", "cts", "tsx", "js", "mjs", "cjs", "jsx"];

/// Supported source language (grammar flavour)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    TypeScript,
    Tsx,
    JavaScript,
}

impl Language {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "ts" | "mts" | "cts" => Some(Language::TypeScript),
            "tsx" => Some(Language::Tsx),
            "js" | "mjs" | "cjs" | "jsx" => Some(Language::JavaScript),
            _ => None,
        }
    }

    /// Detect language from file path, failing with `UnsupportedFileType`
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Self::from_extension(ext).ok_or_else(|| {
            if ext.is_empty() {
                ChunkerError::unsupported(path.display().to_string())
            } else {
                ChunkerError::unsupported(format!(".{ext}"))
            }
        })
    }

    /// Get language name as string
    pub fn as_str(self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::Tsx => "tsx",
            Language::JavaScript => "javascript",
        }
    }

    /// Get Tree-sitter language instance
    pub fn tree_sitter_language(self) -> tree_sitter::Language {
        match self {
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Language::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            // JSX is part of the javascript grammar
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        }
    }
}

/// Check whether a path carries one of the supported extensions
pub fn is_supported_path(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(Language::from_extension)
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(Language::from_extension("ts"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("TS"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("tsx"), Some(Language::Tsx));
        assert_eq!(Language::from_extension("jsx"), Some(Language::JavaScript));
        assert_eq!(Language::from_extension("rs"), None);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(
            Language::from_path("src/app.ts").unwrap(),
            Language::TypeScript
        );
        assert_eq!(
            Language::from_path("src/App.tsx").unwrap(),
            Language::Tsx
        );
        let err = Language::from_path("README.md").unwrap_err();
        assert!(matches!(err, ChunkerError::UnsupportedFileType(ref ext) if ext == ".md"));
        assert!(Language::from_path("Makefile").is_err());
    }

    #[test]
    fn test_supported_paths() {
        assert!(is_supported_path("a/b/c.mjs"));
        assert!(!is_supported_path("a/b/c.py"));
    }
}
