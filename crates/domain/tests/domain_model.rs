use codewiki_chunker::{Chunker, FileAnalysis, Language};
use codewiki_domain::{
    cohesion, DomainAnalyzer, ModuleAnalyzer, ModuleInfo, ModulePurpose, RelationshipKind,
};
use codewiki_patterns::{ArchitecturalPattern, PatternDetector, PatternLocation, PatternType};
use pretty_assertions::assert_eq;

const USER_MODEL: &str = r#"
/** A registered customer of the platform. */
export class User {
    id: string;
    email: string;
    orders: Order[];
    profile?: Profile;
}

export class Order {
    id: string;
    total: number;
}

export interface Profile {
    avatar: string;
}
"#;

const REPOSITORY: &str = r#"
import { User } from '../models/user';

export class UserRepository {
    async findById(id: string): Promise<User | null> {
        return null;
    }

    async save(user: User): Promise<User> {
        return user;
    }
}
"#;

const SERVICE: &str = r#"
import { UserRepository } from '../repositories/user.repository';
import { UserCreatedEvent } from '../events/user-created.event';

export class UserService {
    constructor(private readonly users: UserRepository) {}

    async getUser(id: string) {
        return this.users.findById(id);
    }

    onUserCreated(event: UserCreatedEvent): void {
        console.log(event.userId);
    }
}
"#;

const EVENT: &str = r#"
export class UserCreatedEvent {
    constructor(public readonly userId: string) {}
}
"#;

fn analyze(code: &str, path: &str) -> FileAnalysis {
    Chunker::default()
        .analyze_source(code, path, path, Language::TypeScript)
        .unwrap()
}

fn corpus() -> Vec<FileAnalysis> {
    vec![
        analyze(EVENT, "src/events/user-created.event.ts"),
        analyze(USER_MODEL, "src/models/user.ts"),
        analyze(REPOSITORY, "src/repositories/user.repository.ts"),
        analyze(SERVICE, "src/services/user.service.ts"),
    ]
}

fn module<'a>(modules: &'a [ModuleInfo], path: &str) -> &'a ModuleInfo {
    modules.iter().find(|m| m.path == path).unwrap()
}

#[test]
fn modules_are_classified_by_directory() {
    let modules = ModuleAnalyzer::new().analyze(&corpus());

    let paths: Vec<&str> = modules.iter().map(|m| m.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["src/events", "src/models", "src/repositories", "src/services"]
    );

    let repositories = module(&modules, "src/repositories");
    assert_eq!(repositories.purpose, ModulePurpose::DataAccess);
    assert_eq!(repositories.name, "repositories");
    assert_eq!(repositories.public_api, vec!["UserRepository".to_string()]);
    assert_eq!(repositories.internal_dependencies, vec!["src/models".to_string()]);

    let services = module(&modules, "src/services");
    assert_eq!(services.purpose, ModulePurpose::BusinessLogic);
    assert_eq!(
        services.internal_dependencies,
        vec!["src/events".to_string(), "src/repositories".to_string()]
    );
    assert_eq!(services.files, vec!["src/services/user.service.ts".to_string()]);

    for module in &modules {
        assert!((0.0..=1.0).contains(&module.cohesion));
    }
}

#[test]
fn content_heuristics_when_directory_is_unhelpful() {
    let files = vec![analyze(REPOSITORY, "src/users/user.repository.ts")];
    let modules = ModuleAnalyzer::new().analyze(&files);
    assert_eq!(modules[0].purpose, ModulePurpose::DataAccess);

    let files = vec![analyze("export const answer = 42;", "src/misc/answer.ts")];
    let modules = ModuleAnalyzer::new().analyze(&files);
    assert_eq!(modules[0].purpose, ModulePurpose::Unknown);
}

#[test]
fn cohesion_counts_internal_references() {
    let code = r#"
function a() {
    return b();
}

function b() {
    return 1;
}
"#;
    let file = analyze(code, "src/math/ops.ts");
    assert_eq!(cohesion(&[&file]), 0.5);

    let single = analyze("export function lonely() { return 1; }", "src/x/lonely.ts");
    assert_eq!(cohesion(&[&single]), 0.0);
}

#[test]
fn domain_model_from_user_corpus() {
    let files = corpus();
    let modules = ModuleAnalyzer::new().analyze(&files);
    let patterns = PatternDetector::new().detect(&files);
    let model = DomainAnalyzer::new().analyze(&files, &modules, &patterns);

    assert_eq!(model.name, "User Management");

    let entity_names: Vec<&str> = model.entities.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(entity_names, vec!["Order", "Profile", "User"]);

    let user = model.entity("User").unwrap();
    assert_eq!(user.description, "A registered customer of the platform.");
    assert_eq!(user.attributes.len(), 4);
    assert!(user.attributes.iter().any(|a| a.name == "profile" && a.optional));
    let relations: Vec<(RelationshipKind, &str)> = user
        .relationships
        .iter()
        .map(|r| (r.kind, r.target.as_str()))
        .collect();
    assert_eq!(
        relations,
        vec![
            (RelationshipKind::HasMany, "Order"),
            (RelationshipKind::HasOne, "Profile"),
        ]
    );

    assert_eq!(model.aggregates.len(), 1);
    assert_eq!(model.aggregates[0].root, "User");
    assert_eq!(model.aggregates[0].members, vec!["User", "Order", "Profile"]);

    assert_eq!(model.services.len(), 1);
    let service = model.service("UserService").unwrap();
    assert!(service.collaborators.contains(&"UserRepository".to_string()));
    let get_user = service
        .capabilities
        .iter()
        .find(|c| c.name == "getUser")
        .unwrap();
    assert_eq!(get_user.input, "id: string");
    assert_eq!(get_user.output, "Promise (inferred)");
    assert_eq!(get_user.business_value, "Retrieves user for callers");

    assert_eq!(model.events.len(), 1);
    assert_eq!(model.events[0].name, "UserCreatedEvent");
    assert_eq!(
        model.events[0].handlers,
        vec!["src/services/user.service.ts:method:UserService.onUserCreated".to_string()]
    );

    let services_ctx = model
        .bounded_contexts
        .iter()
        .find(|c| c.name == "services")
        .unwrap();
    assert_eq!(services_ctx.services, vec!["UserService".to_string()]);
}

#[test]
fn workflows_need_several_locations() {
    let files = vec![
        analyze(
            "export function auth(req: Request, next: Next) { next(); }\n",
            "src/middleware/auth.ts",
        ),
        analyze(
            "function log(req: Request) {}\nfunction log(req: Request, next: Next) { next(); }\n",
            "src/middleware/log.ts",
        ),
    ];
    let modules = ModuleAnalyzer::new().analyze(&files);

    let auth = &files[0].chunks[0];
    // the redeclared `log` carries a line-suffixed id
    let log = files[1].chunks.iter().rev().find(|c| c.name == "log").unwrap();
    assert_ne!(log.id, format!("{}:function:log", files[1].relative_path));

    let mut pattern = ArchitecturalPattern::new(PatternType::Middleware, "chain");
    for chunk in [auth, log] {
        pattern.locations.push(PatternLocation {
            file: chunk.file_path.clone(),
            chunk_ids: vec![chunk.id.clone()],
            role: "middleware".to_string(),
        });
    }

    let model = DomainAnalyzer::new().analyze(&files, &modules, &[pattern.clone()]);
    assert_eq!(model.workflows.len(), 1);
    let steps: Vec<(usize, &str)> = model.workflows[0]
        .steps
        .iter()
        .map(|s| (s.order, s.name.as_str()))
        .collect();
    assert_eq!(steps, vec![(1, "auth"), (2, "log")]);

    pattern.locations.truncate(1);
    let model = DomainAnalyzer::new().analyze(&files, &modules, &[pattern]);
    assert!(model.workflows.is_empty());
}

#[test]
fn empty_corpus_yields_fallback_model() {
    let model = DomainAnalyzer::new().analyze(&[], &[], &[]);
    assert_eq!(model.name, codewiki_domain::FALLBACK_DOMAIN);
    assert!(model.entities.is_empty());
    assert!(model.bounded_contexts.is_empty());
}
