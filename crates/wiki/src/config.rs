use crate::error::{Result, WikiError};
use codewiki_indexer::{CodebaseAnalyzer, ScanOptions};
use codewiki_semantic::IndexConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Wiki generation settings, usually read from `codewiki.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiConfig {
    /// Root directory documents are written under
    pub output_dir: PathBuf,

    /// Include globs; empty means every supported source file
    pub include: Vec<String>,

    /// Extra ignore globs on top of the defaults
    pub ignore: Vec<String>,

    /// Additional attempts per document after a failed write
    pub write_retries: u32,

    /// Entries in each "Related code" section
    pub related_limit: usize,

    /// Callables at or above this complexity count as hotspots
    pub hotspot_complexity: u32,

    /// Files analyzed concurrently; `None` picks from the CPU count
    pub max_concurrent: Option<usize>,

    pub index: IndexConfig,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("wiki"),
            include: Vec::new(),
            ignore: Vec::new(),
            write_retries: 2,
            related_limit: 5,
            hotspot_complexity: 10,
            max_concurrent: None,
            index: IndexConfig::default(),
        }
    }
}

impl WikiConfig {
    /// Load and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(WikiError::InvalidConfig(
                "output_dir must not be empty".to_string(),
            ));
        }
        if self.hotspot_complexity == 0 {
            return Err(WikiError::InvalidConfig(
                "hotspot_complexity must be greater than 0".to_string(),
            ));
        }
        if self.max_concurrent == Some(0) {
            return Err(WikiError::InvalidConfig(
                "max_concurrent must be greater than 0".to_string(),
            ));
        }
        self.index.validate()?;
        Ok(())
    }

    /// File discovery options for the scanner
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions::default()
            .with_include(self.include.clone())
            .with_ignore(self.ignore.clone())
    }

    /// Codebase scanner for `root` with this config's globs and concurrency
    pub fn analyzer(&self, root: &Path) -> Result<CodebaseAnalyzer> {
        let mut analyzer = CodebaseAnalyzer::new(root)?.with_options(self.scan_options());
        if let Some(max) = self.max_concurrent {
            analyzer = analyzer.with_max_concurrent(max);
        }
        Ok(analyzer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: WikiConfig = toml::from_str(
            r#"
            output_dir = "docs/wiki"
            ignore = ["fixtures"]

            [index]
            dimensions = 128
            "#,
        )
        .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("docs/wiki"));
        assert_eq!(config.write_retries, 2);
        assert_eq!(config.index.dimensions, 128);
        assert_eq!(config.index.max_keywords, 10);
        assert!(config.validate().is_ok());
        assert!(config.scan_options().ignore.contains(&"fixtures".to_string()));
        assert!(config.scan_options().ignore.contains(&"node_modules".to_string()));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = WikiConfig {
            hotspot_complexity: 0,
            ..WikiConfig::default()
        };
        assert!(matches!(config.validate(), Err(WikiError::InvalidConfig(_))));

        let mut config = WikiConfig::default();
        config.index.dimensions = 0;
        assert!(matches!(config.validate(), Err(WikiError::SemanticError(_))));
    }
}
