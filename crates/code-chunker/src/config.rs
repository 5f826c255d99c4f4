use serde::{Deserialize, Serialize};

/// Configuration for source analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Extract leading `/** ... */` comments into chunk documentation
    pub include_documentation: bool,

    /// Keep the verbatim declaration text on each chunk
    pub include_source: bool,

    /// Harvest call/property references inside bodies
    pub track_dependencies: bool,

    /// Files larger than this are rejected
    pub max_file_size_bytes: u64,

    /// Maximum characters of documentation kept per chunk (0 = unlimited)
    pub max_documentation_chars: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            include_documentation: true,
            include_source: true,
            track_dependencies: true,
            max_file_size_bytes: 1_048_576,
            max_documentation_chars: 0,
        }
    }
}

impl ChunkerConfig {
    /// Create config optimized for speed (structure only)
    pub fn for_speed() -> Self {
        Self {
            include_documentation: false,
            include_source: false,
            track_dependencies: false,
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_file_size_bytes == 0 {
            return Err("max_file_size_bytes must be > 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(ChunkerConfig::default().validate().is_ok());
        assert!(ChunkerConfig::for_speed().validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = ChunkerConfig {
            max_file_size_bytes: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: ChunkerConfig =
            serde_json::from_str(r#"{"include_source": false}"#).unwrap();
        assert!(!config.include_source);
        assert!(config.include_documentation);
        assert_eq!(config.max_file_size_bytes, 1_048_576);
    }
}
