use crate::error::{GraphError, Result};
use crate::types::{DependencyGraph, EdgeKind, GraphEdge, NodeKind};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

impl DependencyGraph {
    fn require(&self, id: &str) -> Result<NodeIndex> {
        self.find_node(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))
    }

    /// Edges leaving a node
    pub fn outgoing(&self, id: &str) -> Result<Vec<GraphEdge>> {
        let node = self.require(id)?;
        Ok(self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .filter_map(|e| self.materialize(e.id()))
            .collect())
    }

    /// Edges entering a node
    pub fn incoming(&self, id: &str) -> Result<Vec<GraphEdge>> {
        let node = self.require(id)?;
        Ok(self
            .graph
            .edges_directed(node, Direction::Incoming)
            .filter_map(|e| self.materialize(e.id()))
            .collect())
    }

    /// Outgoing edges of one kind
    pub fn targets_of(&self, id: &str, kind: EdgeKind) -> Result<Vec<String>> {
        Ok(self
            .outgoing(id)?
            .into_iter()
            .filter(|edge| edge.kind == kind)
            .map(|edge| edge.to)
            .collect())
    }

    /// Number of distinct files importing this file
    pub fn fan_in(&self, file: &str) -> Result<usize> {
        let node = self.require(file)?;
        Ok(self
            .graph
            .edges_directed(node, Direction::Incoming)
            .filter(|e| e.weight().kind == EdgeKind::Imports)
            .count())
    }

    /// Number of distinct files this file imports
    pub fn fan_out(&self, file: &str) -> Result<usize> {
        let node = self.require(file)?;
        Ok(self
            .graph
            .edges(node)
            .filter(|e| e.weight().kind == EdgeKind::Imports)
            .count())
    }

    /// Ids of all file nodes
    pub fn file_ids(&self) -> Vec<&str> {
        self.nodes()
            .filter(|node| node.kind == NodeKind::File)
            .map(|node| node.id.as_str())
            .collect()
    }

    /// File-level import cycles (strongly connected components of size > 1,
    /// plus files importing themselves). Each cycle is sorted; the list is sorted.
    pub fn import_cycles(&self) -> Vec<Vec<String>> {
        let mut files: DiGraph<NodeIndex, ()> = DiGraph::new();
        let mut local: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        for idx in self.graph.node_indices() {
            if self.graph[idx].kind == NodeKind::File {
                local.insert(idx, files.add_node(idx));
            }
        }

        let mut self_loops = Vec::new();
        for edge in self.graph.edge_references() {
            if edge.weight().kind != EdgeKind::Imports {
                continue;
            }
            let (Some(&from), Some(&to)) = (local.get(&edge.source()), local.get(&edge.target())) else {
                continue;
            };
            if from == to {
                self_loops.push(edge.source());
            } else {
                files.add_edge(from, to, ());
            }
        }

        let mut cycles: Vec<Vec<String>> = tarjan_scc(&files)
            .into_iter()
            .filter(|component| component.len() > 1)
            .map(|component| {
                let mut ids: Vec<String> = component
                    .into_iter()
                    .map(|local_idx| self.graph[files[local_idx]].id.clone())
                    .collect();
                ids.sort();
                ids
            })
            .collect();
        cycles.extend(
            self_loops
                .into_iter()
                .map(|idx| vec![self.graph[idx].id.clone()]),
        );

        cycles.sort();
        cycles.dedup();
        cycles
    }
}
