use crate::error::{Result, SemanticError};
use serde::{Deserialize, Serialize};

/// Settings for index construction and queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Number of hashed embedding dimensions
    pub dimensions: usize,

    /// Minimum similarity (exclusive) for `search` hits
    pub search_threshold: f32,

    /// Minimum similarity (exclusive) for `find_related` hits
    pub related_threshold: f32,

    /// Keywords kept per chunk
    pub max_keywords: usize,

    /// Shared keywords needed to call two chunks collaborators
    pub collaborator_keywords: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dimensions: 256,
            search_threshold: 0.1,
            related_threshold: 0.2,
            max_keywords: 10,
            collaborator_keywords: 3,
        }
    }
}

impl IndexConfig {
    pub fn validate(&self) -> Result<()> {
        if self.dimensions == 0 {
            return Err(SemanticError::InvalidConfig(
                "dimensions must be greater than 0".to_string(),
            ));
        }
        for (name, value) in [
            ("search_threshold", self.search_threshold),
            ("related_threshold", self.related_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SemanticError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.max_keywords == 0 {
            return Err(SemanticError::InvalidConfig(
                "max_keywords must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(IndexConfig::default().validate().is_ok());
        let bad = IndexConfig {
            dimensions: 0,
            ..IndexConfig::default()
        };
        assert!(bad.validate().is_err());
        let bad = IndexConfig {
            search_threshold: 1.5,
            ..IndexConfig::default()
        };
        assert!(matches!(bad.validate(), Err(SemanticError::InvalidConfig(_))));
    }
}
