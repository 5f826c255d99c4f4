use crate::types::{DependencyGraph, EdgeKind, GraphNode, NodeKind};
use codewiki_chunker::{Chunk, FileAnalysis};
use serde_json::json;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Suffixes tried when a relative import names a file without extension
pub const RESOLUTION_SUFFIXES: &[&str] = &[
    ".ts",
    ".tsx",
    ".js",
    ".jsx",
    "/index.ts",
    "/index.tsx",
    "/index.js",
    "/index.jsx",
];

/// Build the dependency graph from analyzed files
#[derive(Debug, Default)]
pub struct GraphBuilder;

impl GraphBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, files: &[FileAnalysis]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();

        // Phase 1: file and chunk nodes with containment
        for file in files {
            let file_idx = graph.add_node(file_node(file));
            for chunk in &file.chunks {
                let chunk_idx = graph.add_node(chunk_node(chunk));
                match &chunk.parent {
                    None => {
                        graph.add_edge(file_idx, chunk_idx, EdgeKind::Contains);
                    }
                    Some(parent) => {
                        if let Some(parent_idx) = graph.find_node(parent) {
                            graph.add_edge(parent_idx, chunk_idx, EdgeKind::Contains);
                        }
                    }
                }
            }
        }

        // Phase 2: bare-name resolution, first declaration in corpus order wins
        let mut by_name: HashMap<&str, &str> = HashMap::new();
        for chunk in files.iter().flat_map(|f| &f.chunks) {
            by_name.entry(chunk.name.as_str()).or_insert(chunk.id.as_str());
        }

        for chunk in files.iter().flat_map(|f| &f.chunks) {
            let Some(from) = graph.find_node(&chunk.id) else {
                continue;
            };
            for dep in &chunk.dependencies {
                if dep.external {
                    continue;
                }
                let Some(target) = by_name.get(dep.name.as_str()) else {
                    continue;
                };
                if let Some(to) = graph.find_node(target) {
                    graph.add_edge(from, to, EdgeKind::from(dep.kind));
                }
            }
        }

        // Phase 3: relative imports between files
        let known: HashSet<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();
        for file in files {
            let Some(from) = graph.find_node(&file.relative_path) else {
                continue;
            };
            for import in file.imports.iter().filter(|i| i.is_relative()) {
                match resolve_import(&file.relative_path, &import.source, &known) {
                    Some(target) => {
                        if let Some(to) = graph.find_node(&target) {
                            graph.add_edge(from, to, EdgeKind::Imports);
                        }
                    }
                    None => log::debug!(
                        "{}: unresolved import '{}'",
                        file.relative_path,
                        import.source
                    ),
                }
            }
        }

        log::info!(
            "Built dependency graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        graph
    }
}

fn file_node(file: &FileAnalysis) -> GraphNode {
    let mut metadata = BTreeMap::new();
    metadata.insert("language".to_string(), json!(file.language.as_str()));
    metadata.insert("lines".to_string(), json!(file.summary.total_lines));
    metadata.insert("complexity".to_string(), json!(file.summary.complexity));
    metadata.insert("chunks".to_string(), json!(file.chunks.len()));

    let name = file
        .relative_path
        .rsplit('/')
        .next()
        .unwrap_or(&file.relative_path)
        .to_string();

    GraphNode {
        id: file.relative_path.clone(),
        kind: NodeKind::File,
        name,
        file_path: file.relative_path.clone(),
        chunk_type: None,
        metadata,
    }
}

fn chunk_node(chunk: &Chunk) -> GraphNode {
    let mut metadata = BTreeMap::new();
    metadata.insert("start_line".to_string(), json!(chunk.start_line));
    metadata.insert("end_line".to_string(), json!(chunk.end_line));
    metadata.insert("exported".to_string(), json!(chunk.exported));
    metadata.insert("complexity".to_string(), json!(chunk.metadata.complexity));

    GraphNode {
        id: chunk.id.clone(),
        kind: NodeKind::Chunk,
        name: chunk.name.clone(),
        file_path: chunk.file_path.clone(),
        chunk_type: Some(chunk.chunk_type),
        metadata,
    }
}

/// Resolve a relative specifier against the importing file's directory.
///
/// Tries the literal path, then each suffix in [`RESOLUTION_SUFFIXES`]; a
/// `.js` specifier also matches a `.ts` source (ESM-style imports).
pub fn resolve_import(importer: &str, specifier: &str, known: &HashSet<&str>) -> Option<String> {
    let dir = match importer.rfind('/') {
        Some(idx) => &importer[..idx],
        None => "",
    };
    let base = normalize(&format!("{dir}/{specifier}"))?;

    let mut candidates = vec![base.clone()];
    candidates.extend(RESOLUTION_SUFFIXES.iter().map(|suffix| format!("{base}{suffix}")));
    for (js, ts) in [(".js", ".ts"), (".jsx", ".tsx")] {
        if let Some(stem) = base.strip_suffix(js) {
            candidates.push(format!("{stem}{ts}"));
        }
    }

    candidates
        .into_iter()
        .find(|candidate| known.contains(candidate.as_str()))
}

/// Lexically collapse `.` and `..`; `None` when the path escapes the root
fn normalize(path: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolve_import() {
        let known: HashSet<&str> = [
            "src/users/user.repository.ts",
            "src/shared/index.ts",
            "src/app.tsx",
            "src/lib/esm.ts",
        ]
        .into_iter()
        .collect();

        assert_eq!(
            resolve_import("src/users/user.service.ts", "./user.repository", &known).as_deref(),
            Some("src/users/user.repository.ts")
        );
        assert_eq!(
            resolve_import("src/users/user.service.ts", "../shared", &known).as_deref(),
            Some("src/shared/index.ts")
        );
        assert_eq!(
            resolve_import("src/main.ts", "./app", &known).as_deref(),
            Some("src/app.tsx")
        );
        assert_eq!(
            resolve_import("src/main.ts", "./lib/esm.js", &known).as_deref(),
            Some("src/lib/esm.ts")
        );
        assert_eq!(
            resolve_import("src/shared/nested/deep.ts", "..", &known).as_deref(),
            Some("src/shared/index.ts")
        );
        assert_eq!(resolve_import("src/main.ts", "./missing", &known), None);
        assert_eq!(resolve_import("main.ts", "../../outside", &known), None);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("src/a/../b/./c").as_deref(), Some("src/b/c"));
        assert_eq!(normalize("/./x").as_deref(), Some("x"));
        assert_eq!(normalize("../x"), None);
    }
}
