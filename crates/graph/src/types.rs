use codewiki_chunker::{ChunkType, DependencyKind};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Whether a node stands for a file or for a chunk inside one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    File,
    Chunk,
}

/// Type of relationship between nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    /// A contains B (file contains chunk, class contains method)
    Contains,

    /// File A imports file B
    Imports,

    /// A extends B
    Extends,

    /// A implements B
    Implements,

    /// A calls, instantiates or injects B
    Uses,

    /// A accesses a member named like B
    References,
}

impl EdgeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Imports => "imports",
            Self::Extends => "extends",
            Self::Implements => "implements",
            Self::Uses => "uses",
            Self::References => "references",
        }
    }
}

impl From<DependencyKind> for EdgeKind {
    fn from(kind: DependencyKind) -> Self {
        match kind {
            DependencyKind::Import => Self::Imports,
            DependencyKind::Reference => Self::References,
            DependencyKind::Extends => Self::Extends,
            DependencyKind::Implements => Self::Implements,
            DependencyKind::Uses => Self::Uses,
        }
    }
}

/// Node in the dependency graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// File relative path or chunk id
    pub id: String,
    pub kind: NodeKind,
    pub name: String,
    pub file_path: String,
    pub chunk_type: Option<ChunkType>,
    /// Free-form attributes (language, line span, complexity, ...)
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// Edge payload stored in the petgraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeData {
    pub kind: EdgeKind,
    /// Number of times the same `(from, to, kind)` was observed
    pub weight: u32,
}

/// Materialized edge with endpoint ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
    pub weight: u32,
}

/// Serializable node/edge lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// File and chunk graph, deduplicated by node id and by `(from, to, kind)`
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Directed graph (node -> node with relationships)
    pub graph: DiGraph<GraphNode, EdgeData>,

    /// Node id -> NodeIndex mapping for fast lookup
    pub node_index: HashMap<String, NodeIndex>,

    edge_index: HashMap<(NodeIndex, NodeIndex, EdgeKind), EdgeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add node to graph; an existing id keeps its first node
    pub fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(&node.id) {
            return idx;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.node_index.insert(id, idx);
        idx
    }

    /// Add edge between nodes; a repeated edge bumps the weight instead
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, kind: EdgeKind) -> EdgeIndex {
        if let Some(&edge) = self.edge_index.get(&(from, to, kind)) {
            if let Some(data) = self.graph.edge_weight_mut(edge) {
                data.weight += 1;
            }
            return edge;
        }
        let edge = self.graph.add_edge(from, to, EdgeData { kind, weight: 1 });
        self.edge_index.insert((from, to, kind), edge);
        edge
    }

    /// Find node by id
    pub fn find_node(&self, id: &str) -> Option<NodeIndex> {
        self.node_index.get(id).copied()
    }

    /// Get node data
    pub fn get_node(&self, idx: NodeIndex) -> Option<&GraphNode> {
        self.graph.node_weight(idx)
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.find_node(id).and_then(|idx| self.get_node(idx))
    }

    /// Get all nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_weights()
    }

    /// Get all edges in insertion order
    pub fn edges(&self) -> Vec<GraphEdge> {
        self.graph
            .edge_indices()
            .filter_map(|edge| self.materialize(edge))
            .collect()
    }

    pub(crate) fn materialize(&self, edge: EdgeIndex) -> Option<GraphEdge> {
        let (from, to) = self.graph.edge_endpoints(edge)?;
        let data = self.graph.edge_weight(edge)?;
        Some(GraphEdge {
            from: self.get_node(from)?.id.clone(),
            to: self.get_node(to)?.id.clone(),
            kind: data.kind,
            weight: data.weight,
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes().cloned().collect(),
            edges: self.edges(),
        }
    }
}
