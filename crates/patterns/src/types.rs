use serde::{Deserialize, Serialize};

/// Architectural idioms the detector recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternType {
    Repository,
    ServiceLayer,
    Factory,
    Singleton,
    Observer,
    Provider,
    Hook,
    Middleware,
    DataTransferObject,
    DependencyInjection,
    LayeredArchitecture,
}

impl PatternType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Repository => "repository",
            Self::ServiceLayer => "service-layer",
            Self::Factory => "factory",
            Self::Singleton => "singleton",
            Self::Observer => "observer",
            Self::Provider => "provider",
            Self::Hook => "hook",
            Self::Middleware => "middleware",
            Self::DataTransferObject => "data-transfer-object",
            Self::DependencyInjection => "dependency-injection",
            Self::LayeredArchitecture => "layered-architecture",
        }
    }

    /// Human-readable name
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Repository => "Repository Pattern",
            Self::ServiceLayer => "Service Layer",
            Self::Factory => "Factory Pattern",
            Self::Singleton => "Singleton Pattern",
            Self::Observer => "Observer Pattern",
            Self::Provider => "Provider Pattern",
            Self::Hook => "Custom Hooks",
            Self::Middleware => "Middleware Pipeline",
            Self::DataTransferObject => "Data Transfer Objects",
            Self::DependencyInjection => "Dependency Injection",
            Self::LayeredArchitecture => "Layered Architecture",
        }
    }
}

impl std::fmt::Display for PatternType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a pattern was observed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternLocation {
    /// Relative file path
    pub file: String,
    /// Chunks taking part in the pattern at this location
    pub chunk_ids: Vec<String>,
    /// Role label (`repository`, `subject`, `hook`, ...)
    pub role: String,
}

/// A detected architectural idiom with its justification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchitecturalPattern {
    pub pattern_type: PatternType,
    pub name: String,
    pub description: String,
    /// Always within [0, 1]
    pub confidence: f64,
    pub locations: Vec<PatternLocation>,
    pub evidence: Vec<String>,
}

impl ArchitecturalPattern {
    pub fn new(pattern_type: PatternType, description: impl Into<String>) -> Self {
        Self {
            pattern_type,
            name: pattern_type.display_name().to_string(),
            description: description.into(),
            confidence: 0.0,
            locations: Vec::new(),
            evidence: Vec::new(),
        }
    }

    /// Distinct files the pattern was seen in
    pub fn files(&self) -> Vec<&str> {
        let mut files: Vec<&str> = self.locations.iter().map(|l| l.file.as_str()).collect();
        files.sort_unstable();
        files.dedup();
        files
    }
}

/// Confidence growing with independent locations, bounded into [0, 1]
#[must_use]
pub fn scaled_confidence(base: f64, locations: usize, bonus: f64) -> f64 {
    let extra = 0.1 * locations.saturating_sub(1) as f64;
    let value = base + extra + bonus;
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
