use codewiki_chunker::{Chunker, FileAnalysis, Language};
use codewiki_graph::{EdgeKind, GraphBuilder, NodeKind};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

const REPOSITORY: &str = r#"
export class UserRepository {
    async findById(id: string) {
        return null;
    }
}
"#;

const SERVICE: &str = r#"
import { UserRepository } from './user.repository';
import { Logger } from '@nestjs/common';

export class UserService {
    private readonly logger = new Logger();

    constructor(private readonly users: UserRepository) {}

    async getUser(id: string) {
        this.logger.log(id);
        return this.users.findById(id);
    }
}
"#;

fn analyze(code: &str, path: &str) -> FileAnalysis {
    Chunker::default()
        .analyze_source(code, path, path, Language::TypeScript)
        .unwrap()
}

fn corpus() -> Vec<FileAnalysis> {
    vec![
        analyze(REPOSITORY, "src/users/user.repository.ts"),
        analyze(SERVICE, "src/users/user.service.ts"),
    ]
}

#[test]
fn service_depends_on_repository() {
    let graph = GraphBuilder::new().build(&corpus());

    assert_eq!(graph.file_ids().len(), 2);

    let file_imports = graph
        .targets_of("src/users/user.service.ts", EdgeKind::Imports)
        .unwrap();
    assert_eq!(file_imports, vec!["src/users/user.repository.ts".to_string()]);

    let class_uses = graph
        .targets_of("src/users/user.service.ts:class:UserService", EdgeKind::Uses)
        .unwrap();
    assert!(class_uses.contains(&"src/users/user.repository.ts:class:UserRepository".to_string()));

    let method_uses = graph
        .targets_of("src/users/user.service.ts:method:UserService.getUser", EdgeKind::Uses)
        .unwrap();
    assert!(method_uses
        .contains(&"src/users/user.repository.ts:method:UserRepository.findById".to_string()));

    assert_eq!(graph.fan_in("src/users/user.repository.ts").unwrap(), 1);
    assert!(graph.import_cycles().is_empty());
}

#[test]
fn containment_is_complete_and_deduplicated() {
    let files = corpus();
    let graph = GraphBuilder::new().build(&files);

    let chunk_count: usize = files.iter().map(|f| f.chunks.len()).sum();
    assert_eq!(graph.node_count(), files.len() + chunk_count);

    let contains = graph
        .edges()
        .into_iter()
        .filter(|e| e.kind == EdgeKind::Contains)
        .count();
    assert_eq!(contains, chunk_count);

    let keys: HashSet<_> = graph
        .edges()
        .into_iter()
        .map(|e| (e.from, e.to, e.kind))
        .collect();
    assert_eq!(keys.len(), graph.edge_count());

    let service_file = graph.node("src/users/user.service.ts").unwrap();
    assert_eq!(service_file.kind, NodeKind::File);
    assert_eq!(service_file.name, "user.service.ts");

    let snapshot = graph.snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(json.contains("\"kind\":\"imports\""));
}
