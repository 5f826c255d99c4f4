use codewiki_chunker::ChunkType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Coarse role of a chunk, inferred from its path and name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChunkCategory {
    Api,
    BusinessLogic,
    DataAccess,
    UiComponent,
    Utility,
    Configuration,
    Testing,
    TypeDefinition,
    General,
}

impl ChunkCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::BusinessLogic => "business-logic",
            Self::DataAccess => "data-access",
            Self::UiComponent => "ui-component",
            Self::Utility => "utility",
            Self::Configuration => "configuration",
            Self::Testing => "testing",
            Self::TypeDefinition => "type-definition",
            Self::General => "general",
        }
    }
}

/// Marker words checked against the lowercased file path and chunk name, in order
const CATEGORY_MARKERS: &[(ChunkCategory, &[&str])] = &[
    (ChunkCategory::Testing, &[".test.", ".spec.", "__tests__", "/tests/", "mock"]),
    (
        ChunkCategory::Api,
        &["controller", "route", "handler", "endpoint", "/api/", "resolver"],
    ),
    (
        ChunkCategory::DataAccess,
        &["repository", "/repositories/", "dao", "model", "entity", "schema", "migration"],
    ),
    (ChunkCategory::BusinessLogic, &["service", "usecase", "domain"]),
    (
        ChunkCategory::UiComponent,
        &["component", ".tsx", ".jsx", "view", "page", "screen"],
    ),
    (ChunkCategory::Configuration, &["config", "settings", "/env", "environment"]),
    (ChunkCategory::Utility, &["util", "helper", "/lib/", "common"]),
];

/// Category from path markers, then from the declaration kind
pub fn categorize(file_path: &str, name: &str, chunk_type: ChunkType) -> ChunkCategory {
    let haystack = format!("/{}/{}", file_path.to_lowercase(), name.to_lowercase());
    CATEGORY_MARKERS
        .iter()
        .find(|(_, markers)| markers.iter().any(|m| haystack.contains(m)))
        .map(|(category, _)| *category)
        .unwrap_or(match chunk_type {
            ChunkType::Interface | ChunkType::Type | ChunkType::Enum => {
                ChunkCategory::TypeDefinition
            }
            _ => ChunkCategory::General,
        })
}

/// One chunk as stored in the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub chunk_id: String,
    pub name: String,
    pub file_path: String,
    pub chunk_type: ChunkType,
    pub tokens: Vec<String>,
    /// Term count divided by token count
    pub term_frequencies: BTreeMap<String, f64>,
    /// Highest tf-idf terms, best first
    pub keywords: Vec<String>,
    pub category: ChunkCategory,
    /// Weighted prominence in [0, 1]
    pub importance: f64,
    /// Unit length unless the chunk has no tokens
    pub embedding: Vec<f32>,
}

/// A ranked query or relatedness result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub chunk_id: String,
    pub name: String,
    pub file_path: String,
    pub chunk_type: ChunkType,
    pub similarity: f32,
}

impl SearchHit {
    pub(crate) fn from_chunk(chunk: &IndexedChunk, similarity: f32) -> Self {
        Self {
            chunk_id: chunk.chunk_id.clone(),
            name: chunk.name.clone(),
            file_path: chunk.file_path.clone(),
            chunk_type: chunk.chunk_type,
            similarity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipType {
    SimilarFunctionality,
    SameDomain,
    Extension,
    Collaborator,
    Similar,
}

impl RelationshipType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SimilarFunctionality => "similar-functionality",
            Self::SameDomain => "same-domain",
            Self::Extension => "extension",
            Self::Collaborator => "collaborator",
            Self::Similar => "similar",
        }
    }
}

/// A pair of chunks whose embeddings are close
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticRelationship {
    pub from: String,
    pub to: String,
    pub relationship: RelationshipType,
    pub similarity: f32,
    pub shared_keywords: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize() {
        assert_eq!(
            categorize("src/users/user.repository.ts", "UserRepository", ChunkType::Class),
            ChunkCategory::DataAccess
        );
        assert_eq!(
            categorize("src/users/user.service.spec.ts", "UserService", ChunkType::Class),
            ChunkCategory::Testing
        );
        assert_eq!(
            categorize("src/shapes.ts", "Point", ChunkType::Interface),
            ChunkCategory::TypeDefinition
        );
        assert_eq!(categorize("src/main.ts", "main", ChunkType::Function), ChunkCategory::General);
    }
}
