//! # Codewiki Domain
//!
//! Directory-scoped module classification and a lightweight business-domain
//! model inferred from naming conventions and structure.
//!
//! ## Architecture
//!
//! ```text
//! FileAnalysis[]
//!     │
//!     ├──> ModuleAnalyzer
//!     │      ├─ group by directory
//!     │      ├─ purpose: directory taxonomy → content heuristics → unknown
//!     │      └─ public API, dependencies, complexity, cohesion
//!     │
//!     └──> DomainAnalyzer (+ modules, patterns)
//!            ├─ domain name from weighted lexicons
//!            ├─ entities → relationships → aggregates (BFS)
//!            ├─ services → capabilities
//!            ├─ events → handlers
//!            ├─ workflows from multi-location patterns
//!            └─ bounded contexts by top-level directory
//! ```
//!
//! Both analyzers are infallible: missing evidence produces empty lists.

mod analyzer;
mod lexicon;
mod modules;
mod types;

pub use analyzer::{context_name, DomainAnalyzer};
pub use lexicon::{infer_domain, words, DomainLexicon, DOMAIN_THRESHOLD, FALLBACK_DOMAIN, LEXICONS};
pub use modules::{cohesion, purpose_from_content, purpose_from_path, ModuleAnalyzer};
pub use types::{
    Aggregate, Attribute, BoundedContext, Capability, DomainEvent, DomainModel, DomainService,
    Entity, ModuleInfo, ModulePurpose, Relationship, RelationshipKind, Workflow, WorkflowStep,
};
