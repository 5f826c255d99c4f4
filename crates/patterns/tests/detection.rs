use codewiki_chunker::{Chunker, FileAnalysis, Language};
use codewiki_patterns::{
    detect_singleton, scaled_confidence, ArchitecturalPattern, PatternDetector, PatternLocation,
    PatternType,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn analyze(code: &str, path: &str) -> FileAnalysis {
    let language = if path.ends_with(".tsx") {
        Language::Tsx
    } else if path.ends_with(".js") {
        Language::JavaScript
    } else {
        Language::TypeScript
    };
    Chunker::default()
        .analyze_source(code, path, path, language)
        .unwrap()
}

fn find(patterns: &[ArchitecturalPattern], kind: PatternType) -> Option<&ArchitecturalPattern> {
    patterns.iter().find(|p| p.pattern_type == kind)
}

const REPOSITORY: &str = r#"
import { Injectable } from '@nestjs/common';

@Injectable()
export class UserRepository {
    async findById(id: string) {
        return null;
    }

    async save(user: User) {
        return user;
    }
}
"#;

const SERVICE: &str = r#"
import { UserRepository } from '../repositories/user.repository';

export class UserService {
    constructor(private readonly users: UserRepository) {}

    async getUser(id: string) {
        return this.users.findById(id);
    }
}
"#;

const CONTROLLER: &str = r#"
import { UserService } from '../services/user.service';

export class UserController {
    constructor(private readonly service: UserService) {}

    show(id: string) {
        return this.service.getUser(id);
    }
}
"#;

fn layered_corpus() -> Vec<FileAnalysis> {
    vec![
        analyze(CONTROLLER, "src/controllers/user.controller.ts"),
        analyze(REPOSITORY, "src/repositories/user.repository.ts"),
        analyze(SERVICE, "src/services/user.service.ts"),
    ]
}

#[test]
fn repository_and_service_layer() {
    let patterns = PatternDetector::new().detect(&layered_corpus());

    let repository = find(&patterns, PatternType::Repository).unwrap();
    assert_eq!(repository.files(), vec!["src/repositories/user.repository.ts"]);
    assert_eq!(repository.locations[0].role, "repository");
    assert!(repository.locations[0]
        .chunk_ids
        .contains(&"src/repositories/user.repository.ts:method:UserRepository.findById".to_string()));
    assert!(repository.confidence > 0.6);

    let service = find(&patterns, PatternType::ServiceLayer).unwrap();
    assert!(service
        .evidence
        .iter()
        .any(|e| e == "UserService delegates persistence to UserRepository"));

    let injection = find(&patterns, PatternType::DependencyInjection).unwrap();
    assert_eq!(injection.locations.len(), 3);
    assert!(injection
        .evidence
        .iter()
        .any(|e| e == "UserRepository is decorated with @Injectable"));

    let layered = find(&patterns, PatternType::LayeredArchitecture).unwrap();
    let mut roles: Vec<&str> = layered.locations.iter().map(|l| l.role.as_str()).collect();
    roles.sort_unstable();
    assert_eq!(roles, vec!["application", "data", "presentation"]);
}

#[test]
fn results_sorted_by_confidence() {
    let patterns = PatternDetector::new().detect(&layered_corpus());
    assert!(!patterns.is_empty());
    for pair in patterns.windows(2) {
        assert!(pair[0].confidence >= pair[1].confidence);
    }
    for pattern in &patterns {
        assert!((0.0..=1.0).contains(&pattern.confidence));
        assert!(!pattern.locations.is_empty());
    }
}

#[test]
fn two_layers_are_not_layered() {
    let files = vec![
        analyze(REPOSITORY, "src/repositories/user.repository.ts"),
        analyze(SERVICE, "src/services/user.service.ts"),
    ];
    let patterns = PatternDetector::new().detect(&files);
    assert!(find(&patterns, PatternType::LayeredArchitecture).is_none());
}

#[test]
fn singleton_with_private_constructor() {
    let code = r#"
export class Config {
    private static instance: Config;

    private constructor() {}

    static getInstance(): Config {
        if (!Config.instance) {
            Config.instance = new Config();
        }
        return Config.instance;
    }
}
"#;
    let pattern = detect_singleton(&[analyze(code, "src/config.ts")]).unwrap();
    assert_eq!(pattern.locations.len(), 1);
    assert_eq!(pattern.locations[0].role, "singleton");
    assert!(pattern
        .evidence
        .contains(&"Config has a private constructor".to_string()));
    assert!(pattern
        .evidence
        .contains(&"Config keeps a static instance returned by getInstance()".to_string()));
}

#[test]
fn singleton_with_static_instance_and_accessor() {
    let code = r#"
export class Registry {
    static shared: Registry = new Registry();

    static getShared(): Registry {
        return Registry.shared;
    }
}
"#;
    let pattern = detect_singleton(&[analyze(code, "src/registry.ts")]).unwrap();
    assert_eq!(pattern.locations.len(), 1);
    assert_eq!(pattern.locations[0].chunk_ids.len(), 3);
    assert_eq!(
        pattern.evidence,
        vec!["Registry keeps a static shared returned by getShared()".to_string()]
    );
}

#[test]
fn singleton_with_private_constructor_only() {
    let code = r#"
export class Clock {
    private constructor(private readonly zone: string) {}

    now(): number {
        return Date.now();
    }
}
"#;
    let pattern = detect_singleton(&[analyze(code, "src/clock.ts")]).unwrap();
    assert_eq!(pattern.locations.len(), 1);
    assert_eq!(pattern.locations[0].chunk_ids.len(), 2);
    assert_eq!(
        pattern.evidence,
        vec!["Clock has a private constructor".to_string()]
    );
}

#[test]
fn static_instance_without_accessor_is_not_singleton() {
    let code = r#"
export class Session {
    static current: Session;

    constructor(public readonly user: string) {}

    getInstance(): Session {
        return this;
    }
}
"#;
    assert!(detect_singleton(&[analyze(code, "src/session.ts")]).is_none());
}

#[test]
fn plain_class_is_not_singleton() {
    let code = r#"
export class Counter {
    private count = 0;

    constructor(start: number) {
        this.count = start;
    }

    static create(): Counter {
        return new Counter(0);
    }
}
"#;
    assert!(detect_singleton(&[analyze(code, "src/counter.ts")]).is_none());
}

#[test]
fn hooks_and_provider() {
    let code = r#"
import { createContext, useContext, useState } from 'react';

export const AuthContext = createContext(null);

export function AuthProvider({ children }) {
    const [user, setUser] = useState(null);
    return <AuthContext.Provider value={{ user, setUser }}>{children}</AuthContext.Provider>;
}

export function useAuth() {
    return useContext(AuthContext);
}
"#;
    let patterns = PatternDetector::new().detect(&[analyze(code, "src/auth.tsx")]);

    let hooks = find(&patterns, PatternType::Hook).unwrap();
    assert_eq!(hooks.locations.len(), 1);
    assert!(hooks.evidence[0].starts_with("useAuth composes useContext"));

    let provider = find(&patterns, PatternType::Provider).unwrap();
    let mut roles: Vec<&str> = provider.locations.iter().map(|l| l.role.as_str()).collect();
    roles.sort_unstable();
    assert_eq!(roles, vec!["context", "provider"]);
}

#[test]
fn express_middleware() {
    let code = r#"
function requireAuth(req, res, next) {
    if (!req.user) {
        return res.status(401).end();
    }
    next();
}

module.exports = { requireAuth };
"#;
    let patterns = PatternDetector::new().detect(&[analyze(code, "src/auth.js")]);
    let middleware = find(&patterns, PatternType::Middleware).unwrap();
    assert_eq!(
        middleware.evidence,
        vec!["requireAuth takes a request and a next callback".to_string()]
    );
}

#[test]
fn custom_detector_registration() {
    fn always(files: &[FileAnalysis]) -> Option<ArchitecturalPattern> {
        let mut pattern = ArchitecturalPattern::new(PatternType::Factory, "custom");
        pattern.confidence = 7.5;
        pattern.locations.push(PatternLocation {
            file: files.first()?.relative_path.clone(),
            chunk_ids: Vec::new(),
            role: "custom".to_string(),
        });
        Some(pattern)
    }

    let detector = PatternDetector::empty().with_detector("always", always);
    assert_eq!(detector.names(), vec!["always"]);

    let patterns = detector.detect(&[analyze("export const x = 1;", "src/x.ts")]);
    assert_eq!(patterns.len(), 1);
    assert_eq!(patterns[0].confidence, 1.0);
    assert!(detector.detect(&[]).is_empty());

    let replaced = PatternDetector::new().with_detector("singleton", always);
    assert_eq!(replaced.names().len(), 11);
}

proptest! {
    #[test]
    fn confidence_stays_in_unit_range(base in -2.0f64..2.0, locations in 0usize..50, bonus in -1.0f64..1.0) {
        let value = scaled_confidence(base, locations, bonus);
        prop_assert!((0.0..=1.0).contains(&value));
    }

    #[test]
    fn more_locations_never_lower_confidence(base in 0.0f64..1.0, locations in 1usize..20) {
        prop_assert!(scaled_confidence(base, locations + 1, 0.0) >= scaled_confidence(base, locations, 0.0));
    }
}
