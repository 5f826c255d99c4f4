use codewiki_chunker::{Chunker, FileAnalysis, Language};
use codewiki_semantic::{
    CancelFlag, ChunkCategory, IndexConfig, RelationshipOptions, SemanticError, SemanticIndexer,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const REPOSITORY: &str = r#"
/** Loads and stores user records in the database. */
export class UserRepository {
    /** Find a user record by its identifier. */
    async findUserById(id: string): Promise<User | null> {
        return this.db.users.find(id);
    }

    /** Persist a user record. */
    async saveUser(user: User): Promise<User> {
        return this.db.users.save(user);
    }
}
"#;

const INVOICE: &str = r#"
/** Renders invoices as printable documents. */
export function renderInvoicePdf(invoice: Invoice, template: PdfTemplate): Buffer {
    return template.render(invoice);
}
"#;

fn analyze(code: &str, path: &str) -> FileAnalysis {
    Chunker::default()
        .analyze_source(code, path, path, Language::TypeScript)
        .unwrap()
}

fn corpus() -> Vec<FileAnalysis> {
    vec![
        analyze(INVOICE, "src/billing/invoice.ts"),
        analyze(REPOSITORY, "src/users/user.repository.ts"),
    ]
}

fn built() -> SemanticIndexer {
    let mut indexer = SemanticIndexer::default();
    indexer.build(&corpus());
    indexer
}

#[test]
fn queries_before_build_fail() {
    let indexer = SemanticIndexer::default();
    assert_eq!(indexer.search("user", 5), Err(SemanticError::IndexNotBuilt));
    assert_eq!(
        indexer.find_related("x", 5),
        Err(SemanticError::IndexNotBuilt)
    );
    assert!(matches!(
        indexer.discover_relationships(&RelationshipOptions::default()),
        Err(SemanticError::IndexNotBuilt)
    ));
}

#[test]
fn index_contents() {
    let indexer = built();
    let index = indexer.index().unwrap();

    assert_eq!(index.document_count, 4);
    assert!(index.term_index("user").is_some());
    assert_eq!(index.term_index("string"), None);
    let positions: Vec<usize> = index.vocabulary.values().copied().collect();
    assert_eq!(positions, (0..index.vocabulary.len()).collect::<Vec<_>>());
    assert_eq!(index.vocabulary.len(), index.idf.len());

    let repo = index
        .chunk("src/users/user.repository.ts:class:UserRepository")
        .unwrap();
    assert_eq!(repo.category, ChunkCategory::DataAccess);
    assert!(repo.keywords.iter().any(|k| k == "user"));
    assert!(repo.importance > 0.7);

    for chunk in &index.chunks {
        assert!((0.0..=1.0).contains(&chunk.importance));
        if !chunk.tokens.is_empty() {
            let norm: f32 = chunk.embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-4, "{} has norm {norm}", chunk.chunk_id);
        }
    }
}

#[test]
fn search_ranks_matching_chunks_first() {
    let indexer = built();
    let hits = indexer.search("find user by id", 3).unwrap();
    assert!(!hits.is_empty());
    assert_eq!(
        hits[0].chunk_id,
        "src/users/user.repository.ts:method:UserRepository.findUserById"
    );
    assert!(hits.windows(2).all(|w| w[0].similarity >= w[1].similarity));
    assert!(hits.iter().all(|h| h.similarity > 0.1));

    assert_eq!(indexer.search("find user by id", 1).unwrap().len(), 1);
    assert!(indexer.search("zebra quantum", 10).unwrap().is_empty());
}

#[test]
fn related_chunks_exclude_self() {
    let indexer = built();
    let id = "src/users/user.repository.ts:method:UserRepository.saveUser";
    let related = indexer.find_related(id, 10).unwrap();
    assert!(related.iter().all(|h| h.chunk_id != id));
    assert!(related.iter().any(|h| h.chunk_id.ends_with("findUserById")));

    assert_eq!(
        indexer.find_related("missing", 10),
        Err(SemanticError::ChunkNotFound("missing".to_string()))
    );
}

#[test]
fn relationships_are_classified() {
    let indexer = built();
    let scan = indexer
        .discover_relationships(&RelationshipOptions::with_threshold(0.2))
        .unwrap();
    assert!(!scan.cancelled);
    assert_eq!(scan.evaluated_chunks, 4);

    let methods = scan
        .relationships
        .iter()
        .find(|r| r.from.ends_with("findUserById") && r.to.ends_with("saveUser"))
        .unwrap();
    assert_eq!(methods.relationship.as_str(), "similar-functionality");
}

#[test]
fn cancellation_and_cap() {
    let indexer = built();

    let flag = CancelFlag::new();
    flag.cancel();
    let scan = indexer
        .discover_relationships(&RelationshipOptions::with_threshold(0.0).cancel_on(flag))
        .unwrap();
    assert!(scan.cancelled);
    assert!(scan.relationships.is_empty());

    let scan = indexer
        .discover_relationships(&RelationshipOptions::with_threshold(0.0).max_chunks(2))
        .unwrap();
    assert_eq!(scan.evaluated_chunks, 2);
    assert!(scan.relationships.len() <= 1);
}

#[test]
fn invalid_config_is_rejected() {
    let config = IndexConfig {
        dimensions: 0,
        ..IndexConfig::default()
    };
    assert!(matches!(
        SemanticIndexer::new(config),
        Err(SemanticError::InvalidConfig(_))
    ));
}

proptest! {
    #[test]
    fn relationships_respect_threshold(threshold in 0.0f32..1.0) {
        let indexer = built();
        let scan = indexer
            .discover_relationships(&RelationshipOptions::with_threshold(threshold))
            .unwrap();
        for relationship in &scan.relationships {
            prop_assert!(relationship.similarity >= threshold);
        }
    }
}
