//! # Codewiki Patterns
//!
//! Heuristic recognition of architectural idioms in analyzed TypeScript and
//! JavaScript code.
//!
//! ## Architecture
//!
//! ```text
//! FileAnalysis[]
//!     │
//!     └──> PatternDetector (registry of named rules)
//!            ├─ naming rules     (UserRepository, createUser, useAuth)
//!            ├─ structural rules (private constructor, (req, res, next))
//!            ├─ path rules       (services/, *.dto.ts, layer directories)
//!            │
//!            └─> ArchitecturalPattern { confidence ∈ [0, 1], locations, evidence }
//!                sorted by descending confidence
//! ```
//!
//! Detectors are plain functions, so extra rules can be registered with
//! [`PatternDetector::with_detector`].

mod detector;
mod detectors;
mod types;

pub use detector::{DetectorFn, PatternDetector};
pub use detectors::{
    detect_dependency_injection, detect_dto, detect_factory, detect_hooks,
    detect_layered_architecture, detect_middleware, detect_observer, detect_provider,
    detect_repository, detect_service_layer, detect_singleton,
};
pub use types::{scaled_confidence, ArchitecturalPattern, PatternLocation, PatternType};
