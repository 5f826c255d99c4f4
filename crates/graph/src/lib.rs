//! # Codewiki Graph
//!
//! Cross-file dependency graph over analyzed sources.
//!
//! ## Architecture
//!
//! ```text
//! FileAnalysis[]
//!     │
//!     ├──> Graph Builder
//!     │      ├─ File + chunk nodes (contains edges)
//!     │      ├─ Chunk dependencies resolved by bare name
//!     │      └─ Relative imports resolved with suffix guessing
//!     │
//!     └──> Dependency Graph (petgraph)
//!            ├─ Nodes/edges deduplicated by id and (from, to, kind)
//!            └─ Queries: incoming/outgoing, fan-in/out, import cycles
//! ```

mod builder;
mod error;
mod graph;
mod types;

pub use builder::{resolve_import, GraphBuilder, RESOLUTION_SUFFIXES};
pub use error::{GraphError, Result};
pub use types::{DependencyGraph, EdgeData, EdgeKind, GraphEdge, GraphNode, GraphSnapshot, NodeKind};
