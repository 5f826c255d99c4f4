use serde::{Deserialize, Serialize};

/// What a directory-scoped module is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModulePurpose {
    UiComponent,
    BusinessLogic,
    DataAccess,
    Utility,
    Configuration,
    ApiClient,
    StateManagement,
    Routing,
    Middleware,
    Testing,
    Types,
    Infrastructure,
    Unknown,
}

impl ModulePurpose {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UiComponent => "ui-component",
            Self::BusinessLogic => "business-logic",
            Self::DataAccess => "data-access",
            Self::Utility => "utility",
            Self::Configuration => "configuration",
            Self::ApiClient => "api-client",
            Self::StateManagement => "state-management",
            Self::Routing => "routing",
            Self::Middleware => "middleware",
            Self::Testing => "testing",
            Self::Types => "types",
            Self::Infrastructure => "infrastructure",
            Self::Unknown => "unknown",
        }
    }

    /// One-line description used in generated pages
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UiComponent => "User interface components and views",
            Self::BusinessLogic => "Business rules and application services",
            Self::DataAccess => "Persistence and data-access code",
            Self::Utility => "Shared helpers and utilities",
            Self::Configuration => "Configuration and settings",
            Self::ApiClient => "Clients for remote APIs",
            Self::StateManagement => "Application state management",
            Self::Routing => "Routing and navigation",
            Self::Middleware => "Request middleware",
            Self::Testing => "Tests, fixtures and mocks",
            Self::Types => "Shared type declarations",
            Self::Infrastructure => "Infrastructure and adapters",
            Self::Unknown => "Unclassified code",
        }
    }
}

impl std::fmt::Display for ModulePurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directory-scoped group of files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleInfo {
    /// Directory relative to the analysis root (`.` for the root)
    pub path: String,
    pub name: String,
    pub purpose: ModulePurpose,
    /// Exported top-level names, sorted
    pub public_api: Vec<String>,
    /// Paths of other modules this one imports from
    pub internal_dependencies: Vec<String>,
    /// External package names
    pub external_dependencies: Vec<String>,
    pub complexity: u32,
    /// Internal cross-references over possible references, in [0, 1]
    pub cohesion: f64,
    pub files: Vec<String>,
    pub chunk_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipKind {
    HasOne,
    HasMany,
    BelongsTo,
}

impl RelationshipKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HasOne => "has-one",
            Self::HasMany => "has-many",
            Self::BelongsTo => "belongs-to",
        }
    }

    /// Ownership edges followed when grouping aggregates
    #[must_use]
    pub const fn is_ownership(self) -> bool {
        matches!(self, Self::HasOne | Self::HasMany)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub kind: RelationshipKind,
    /// Target entity name
    pub target: String,
    /// Attribute or dependency the relationship was inferred from
    pub via: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub type_annotation: Option<String>,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub file: String,
    pub chunk_id: String,
    pub description: String,
    pub attributes: Vec<Attribute>,
    /// Public method names
    pub behaviors: Vec<String>,
    pub relationships: Vec<Relationship>,
}

/// A cluster of entities reachable from one root through ownership edges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    pub name: String,
    pub root: String,
    /// Member entity names in discovery order, root first
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    pub name: String,
    pub input: String,
    pub output: String,
    pub business_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainService {
    pub name: String,
    pub file: String,
    pub chunk_id: String,
    pub description: String,
    pub capabilities: Vec<Capability>,
    /// Names of types the service calls or receives
    pub collaborators: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub name: String,
    pub file: String,
    pub chunk_id: String,
    /// Ids of chunks that appear to handle the event
    pub handlers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// 1-based position
    pub order: usize,
    pub name: String,
    pub file: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub name: String,
    pub description: String,
    pub steps: Vec<WorkflowStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundedContext {
    pub name: String,
    /// Module paths
    pub modules: Vec<String>,
    pub entities: Vec<String>,
    pub services: Vec<String>,
}

/// Business-domain view inferred from naming conventions and structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainModel {
    pub name: String,
    pub description: String,
    pub entities: Vec<Entity>,
    pub aggregates: Vec<Aggregate>,
    pub services: Vec<DomainService>,
    pub events: Vec<DomainEvent>,
    pub workflows: Vec<Workflow>,
    pub bounded_contexts: Vec<BoundedContext>,
}

impl DomainModel {
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn service(&self, name: &str) -> Option<&DomainService> {
        self.services.iter().find(|s| s.name == name)
    }
}
