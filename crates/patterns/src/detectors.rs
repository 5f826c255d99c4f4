//! Built-in detectors. Each one is a pure function over the analyzed corpus.

use crate::types::{scaled_confidence, ArchitecturalPattern, PatternLocation, PatternType};
use codewiki_chunker::{AccessModifier, Chunk, ChunkType, DependencyKind, FileAnalysis, Modifier};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Define a `fn(&str) -> bool` backed by a lazily compiled regex.
/// Patterns are literals, so a compile failure is a bug and panics on first use.
macro_rules! name_matcher {
    ($name:ident, $pattern:expr) => {
        pub(crate) fn $name(text: &str) -> bool {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| {
                Regex::new($pattern)
                    .unwrap_or_else(|e| panic!("invalid {} pattern: {e}", stringify!($name)))
            })
            .is_match(text)
        }
    };
}

name_matcher!(is_repository_name, r"(Repository|Repo|Dao|DAO)$");
name_matcher!(
    is_repository_path,
    r"(?i)(^|/)(repositor(y|ies)|dao)(/|$)|\.(repository|repo|dao)\.[cm]?[jt]sx?$"
);
name_matcher!(
    is_crud_method,
    r"^(find|get|save|create|update|delete|remove|insert|upsert|query|fetch|list|count|exists)"
);
name_matcher!(is_service_name, r"Service$");
name_matcher!(is_service_path, r"(?i)(^|/)services?(/|$)|\.service\.[cm]?[jt]sx?$");
name_matcher!(is_factory_class, r"Factory$");
name_matcher!(is_factory_method, r"^(create|make|build)[A-Z]");
name_matcher!(is_instance_field, r"(?i)^[_#]?(instance|shared|singleton|default)$");
name_matcher!(is_instance_accessor, r"(?i)^(get)?(instance|shared|singleton|default)$");
name_matcher!(
    is_observer_name,
    r"(Observer|Listener|Subscriber|Emitter|Subject|EventBus|Observable)$"
);
name_matcher!(
    is_subscribe_method,
    r"^(subscribe|on|once|addListener|addEventListener|attach|register|watch)$"
);
name_matcher!(is_notify_method, r"^(notify|emit|publish|dispatch|trigger|broadcast)");
name_matcher!(is_provider_name, r"Provider$");
name_matcher!(is_hook_name, r"^use[A-Z0-9]");
name_matcher!(is_middleware_name, r"(?i)(middleware|interceptor)|Guard$");
name_matcher!(is_next_param, r"^(next|done)$");
name_matcher!(is_request_param, r"^(req|request|ctx|context)$");
name_matcher!(is_dto_name, r"(Dto|DTO|Request|Response|Payload|Input|Output|Params)$");
name_matcher!(is_dto_path, r"(?i)(^|/)dtos?(/|$)|\.dto\.[cm]?[jt]sx?$");
name_matcher!(
    is_di_decorator,
    r"^(Injectable|Inject|Service|Component|Controller|Module|Singleton|injectable|inject)$"
);
name_matcher!(
    is_presentation_path,
    r"(?i)(^|/)(controllers?|routes?|handlers?|api|pages|views|components|ui)(/|$)|\.(controller|routes?|handler|component|page|view)\.[cm]?[jt]sx?$"
);
name_matcher!(
    is_application_path,
    r"(?i)(^|/)(services?|use-?cases?|application|domain)(/|$)|\.(service|usecase)\.[cm]?[jt]sx?$"
);
name_matcher!(
    is_data_path,
    r"(?i)(^|/)(repositor(y|ies)|dal|data|models?|entities|db|persistence)(/|$)|\.(repository|model|entity|schema)\.[cm]?[jt]sx?$"
);
name_matcher!(
    is_infrastructure_path,
    r"(?i)(^|/)(infra|infrastructure|adapters?|config|providers)(/|$)"
);

/// Primitive and container types that do not indicate an injected collaborator
const NON_INJECTABLE_TYPES: &[&str] = &[
    "Date", "Array", "Record", "Map", "Set", "Promise", "Partial", "Readonly", "Function",
    "Object", "String", "Number", "Boolean",
];

fn all_chunks(files: &[FileAnalysis]) -> impl Iterator<Item = (&FileAnalysis, &Chunk)> {
    files
        .iter()
        .flat_map(|file| file.chunks.iter().map(move |chunk| (file, chunk)))
}

fn children<'a>(file: &'a FileAnalysis, chunk: &'a Chunk) -> Vec<&'a Chunk> {
    file.children_of(chunk).collect()
}

fn location(file: &FileAnalysis, chunk_ids: Vec<String>, role: &str) -> PatternLocation {
    PatternLocation {
        file: file.relative_path.clone(),
        chunk_ids,
        role: role.to_string(),
    }
}

fn finish(mut pattern: ArchitecturalPattern, base: f64, bonus: f64) -> Option<ArchitecturalPattern> {
    if pattern.locations.is_empty() {
        return None;
    }
    pattern.confidence = scaled_confidence(base, pattern.locations.len(), bonus);
    Some(pattern)
}

fn names(chunks: &[&Chunk]) -> String {
    chunks
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Whether `type_text` mentions `name` as a whole identifier
fn mentions_type(type_text: &str, name: &str) -> bool {
    type_text
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .any(|token| token == name)
}

fn injected_types(constructor: &Chunk) -> Vec<String> {
    constructor
        .metadata
        .parameters
        .iter()
        .filter_map(|param| param.type_annotation.as_deref())
        .map(|ty| ty.split('<').next().unwrap_or(ty).trim().to_string())
        .filter(|ty| {
            ty.chars().next().is_some_and(char::is_uppercase)
                && !NON_INJECTABLE_TYPES.contains(&ty.as_str())
        })
        .collect()
}

// ── Repository ──────────────────────────────────────────────────────

pub fn detect_repository(files: &[FileAnalysis]) -> Option<ArchitecturalPattern> {
    let mut pattern = ArchitecturalPattern::new(
        PatternType::Repository,
        "Data access is encapsulated behind repository abstractions that expose collection-like query and persistence methods.",
    );
    let mut has_crud = false;

    for (file, chunk) in all_chunks(files) {
        if !matches!(chunk.chunk_type, ChunkType::Class | ChunkType::Interface) {
            continue;
        }
        let by_path = chunk.is_top_level()
            && chunk.chunk_type == ChunkType::Class
            && is_repository_path(&file.relative_path);
        if !is_repository_name(&chunk.name) && !by_path {
            continue;
        }

        let crud: Vec<&Chunk> = children(file, chunk)
            .into_iter()
            .filter(|c| c.chunk_type == ChunkType::Method && is_crud_method(&c.name))
            .collect();

        let mut ids = vec![chunk.id.clone()];
        ids.extend(crud.iter().map(|c| c.id.clone()));
        let role = if chunk.chunk_type == ChunkType::Interface {
            "repository-contract"
        } else {
            "repository"
        };
        pattern.locations.push(location(file, ids, role));

        if crud.is_empty() {
            pattern
                .evidence
                .push(format!("{} is named as a repository", chunk.name));
        } else {
            has_crud = true;
            pattern.evidence.push(format!(
                "{} exposes data-access methods: {}",
                chunk.name,
                names(&crud)
            ));
        }
    }

    finish(pattern, 0.6, if has_crud { 0.1 } else { 0.0 })
}

// ── Service layer ───────────────────────────────────────────────────

pub fn detect_service_layer(files: &[FileAnalysis]) -> Option<ArchitecturalPattern> {
    let mut pattern = ArchitecturalPattern::new(
        PatternType::ServiceLayer,
        "Business operations are grouped into service classes that coordinate lower layers.",
    );
    let mut delegates = false;

    for (file, chunk) in all_chunks(files) {
        if chunk.chunk_type != ChunkType::Class {
            continue;
        }
        let by_path = chunk.is_top_level() && is_service_path(&file.relative_path);
        if !is_service_name(&chunk.name) && !by_path {
            continue;
        }

        let methods: Vec<&Chunk> = children(file, chunk)
            .into_iter()
            .filter(|c| {
                c.chunk_type == ChunkType::Method && c.name != "constructor" && !c.is_non_public()
            })
            .collect();

        let mut ids = vec![chunk.id.clone()];
        ids.extend(methods.iter().map(|c| c.id.clone()));
        pattern.locations.push(location(file, ids, "service"));
        pattern.evidence.push(format!(
            "{} offers {} public operation(s)",
            chunk.name,
            methods.len()
        ));

        for dep in &chunk.dependencies {
            if dep.kind == DependencyKind::Uses && is_repository_name(&dep.name) {
                delegates = true;
                pattern
                    .evidence
                    .push(format!("{} delegates persistence to {}", chunk.name, dep.name));
            }
        }
    }

    finish(pattern, 0.55, if delegates { 0.15 } else { 0.0 })
}

// ── Factory ─────────────────────────────────────────────────────────

pub fn detect_factory(files: &[FileAnalysis]) -> Option<ArchitecturalPattern> {
    let mut pattern = ArchitecturalPattern::new(
        PatternType::Factory,
        "Object creation is centralised in factory classes or functions instead of scattered constructor calls.",
    );

    for (file, chunk) in all_chunks(files) {
        match chunk.chunk_type {
            ChunkType::Class if is_factory_class(&chunk.name) => {
                pattern
                    .locations
                    .push(location(file, vec![chunk.id.clone()], "factory"));
                pattern
                    .evidence
                    .push(format!("{} is a dedicated factory class", chunk.name));
            }
            ChunkType::Function | ChunkType::Method if is_factory_method(&chunk.name) => {
                let standalone = chunk.is_top_level() || chunk.has_modifier(Modifier::Static);
                let constructs: Vec<&str> = chunk
                    .dependencies
                    .iter()
                    .filter(|d| {
                        d.kind == DependencyKind::Uses
                            && d.name.chars().next().is_some_and(char::is_uppercase)
                    })
                    .map(|d| d.name.as_str())
                    .collect();
                if !standalone || constructs.is_empty() {
                    continue;
                }
                pattern
                    .locations
                    .push(location(file, vec![chunk.id.clone()], "factory-method"));
                pattern.evidence.push(format!(
                    "{} constructs {}",
                    chunk.name,
                    constructs.join(", ")
                ));
            }
            _ => {}
        }
    }

    finish(pattern, 0.5, 0.0)
}

// ── Singleton ───────────────────────────────────────────────────────

pub fn detect_singleton(files: &[FileAnalysis]) -> Option<ArchitecturalPattern> {
    let mut pattern = ArchitecturalPattern::new(
        PatternType::Singleton,
        "A class restricts itself to a single shared instance.",
    );

    for (file, class) in all_chunks(files) {
        if class.chunk_type != ChunkType::Class {
            continue;
        }
        let members = children(file, class);

        let private_ctor = members.iter().find(|m| {
            m.chunk_type == ChunkType::Method
                && m.name == "constructor"
                && m.metadata.access == Some(AccessModifier::Private)
        });
        let instance_field = members.iter().find(|m| {
            m.chunk_type == ChunkType::Property
                && m.has_modifier(Modifier::Static)
                && (is_instance_field(&m.name)
                    || m
                        .metadata
                        .type_annotation
                        .as_deref()
                        .is_some_and(|ty| mentions_type(ty, &class.name)))
        });
        let accessor = members.iter().find(|m| {
            m.chunk_type == ChunkType::Method
                && m.has_modifier(Modifier::Static)
                && (is_instance_accessor(&m.name)
                    || m
                        .metadata
                        .return_type
                        .as_deref()
                        .is_some_and(|ty| mentions_type(ty, &class.name)))
        });

        let mut ids = vec![class.id.clone()];
        if let Some(ctor) = private_ctor {
            ids.push(ctor.id.clone());
            pattern
                .evidence
                .push(format!("{} has a private constructor", class.name));
        }
        let paired = match (instance_field, accessor) {
            (Some(field), Some(accessor)) => {
                ids.push(field.id.clone());
                ids.push(accessor.id.clone());
                pattern.evidence.push(format!(
                    "{} keeps a static {} returned by {}()",
                    class.name, field.name, accessor.name
                ));
                true
            }
            _ => false,
        };

        if private_ctor.is_some() || paired {
            pattern.locations.push(location(file, ids, "singleton"));
        }
    }

    finish(pattern, 0.7, 0.0)
}

// ── Observer ────────────────────────────────────────────────────────

pub fn detect_observer(files: &[FileAnalysis]) -> Option<ArchitecturalPattern> {
    let mut pattern = ArchitecturalPattern::new(
        PatternType::Observer,
        "Subjects notify registered observers or listeners when their state changes.",
    );
    let mut subjects = 0;
    let mut observers = 0;

    for (file, chunk) in all_chunks(files) {
        if chunk.chunk_type != ChunkType::Class {
            continue;
        }
        let members = children(file, chunk);
        let subscribe: Vec<&Chunk> = members
            .iter()
            .copied()
            .filter(|m| m.chunk_type == ChunkType::Method && is_subscribe_method(&m.name))
            .collect();
        let notify: Vec<&Chunk> = members
            .iter()
            .copied()
            .filter(|m| m.chunk_type == ChunkType::Method && is_notify_method(&m.name))
            .collect();
        let extends_emitter = chunk
            .dependencies
            .iter()
            .any(|d| d.kind == DependencyKind::Extends && is_observer_name(&d.name));

        if (!subscribe.is_empty() && !notify.is_empty()) || extends_emitter {
            subjects += 1;
            let mut ids = vec![chunk.id.clone()];
            ids.extend(subscribe.iter().chain(notify.iter()).map(|m| m.id.clone()));
            pattern.locations.push(location(file, ids, "subject"));
            if extends_emitter {
                pattern
                    .evidence
                    .push(format!("{} extends an event emitter", chunk.name));
            } else {
                pattern.evidence.push(format!(
                    "{} registers listeners ({}) and notifies them ({})",
                    chunk.name,
                    names(&subscribe),
                    names(&notify)
                ));
            }
        } else if is_observer_name(&chunk.name) {
            observers += 1;
            pattern
                .locations
                .push(location(file, vec![chunk.id.clone()], "observer"));
            pattern
                .evidence
                .push(format!("{} is named as an observer", chunk.name));
        }
    }

    let bonus = if subjects > 0 && observers > 0 { 0.1 } else { 0.0 };
    finish(pattern, 0.5, bonus)
}

// ── Provider ────────────────────────────────────────────────────────

pub fn detect_provider(files: &[FileAnalysis]) -> Option<ArchitecturalPattern> {
    let mut pattern = ArchitecturalPattern::new(
        PatternType::Provider,
        "Shared state or services are made available to a subtree through provider components or contexts.",
    );

    for (file, chunk) in all_chunks(files) {
        if !chunk.is_top_level() {
            continue;
        }
        let creates_context = chunk.dependencies.iter().any(|d| d.name == "createContext");
        match chunk.chunk_type {
            ChunkType::Function | ChunkType::Variable | ChunkType::Class
                if is_provider_name(&chunk.name) =>
            {
                pattern
                    .locations
                    .push(location(file, vec![chunk.id.clone()], "provider"));
                pattern
                    .evidence
                    .push(format!("{} provides values to its consumers", chunk.name));
            }
            ChunkType::Variable if creates_context => {
                pattern
                    .locations
                    .push(location(file, vec![chunk.id.clone()], "context"));
                pattern
                    .evidence
                    .push(format!("{} is created with createContext", chunk.name));
            }
            _ => {}
        }
    }

    finish(pattern, 0.55, 0.0)
}

// ── Hooks ───────────────────────────────────────────────────────────

pub fn detect_hooks(files: &[FileAnalysis]) -> Option<ArchitecturalPattern> {
    let mut pattern = ArchitecturalPattern::new(
        PatternType::Hook,
        "Reusable stateful logic is packaged as custom hooks.",
    );
    let mut composes = false;

    for (file, chunk) in all_chunks(files) {
        if chunk.chunk_type != ChunkType::Function || !chunk.is_top_level() || !is_hook_name(&chunk.name) {
            continue;
        }
        let inner: Vec<&str> = chunk
            .dependencies
            .iter()
            .filter(|d| d.kind == DependencyKind::Uses && is_hook_name(&d.name))
            .map(|d| d.name.as_str())
            .collect();

        pattern
            .locations
            .push(location(file, vec![chunk.id.clone()], "hook"));
        if inner.is_empty() {
            pattern.evidence.push(format!("{} follows the use* hook convention", chunk.name));
        } else {
            composes = true;
            pattern
                .evidence
                .push(format!("{} composes {}", chunk.name, inner.join(", ")));
        }
    }

    finish(pattern, 0.5, if composes { 0.1 } else { 0.0 })
}

// ── Middleware ──────────────────────────────────────────────────────

pub fn detect_middleware(files: &[FileAnalysis]) -> Option<ArchitecturalPattern> {
    let mut pattern = ArchitecturalPattern::new(
        PatternType::Middleware,
        "Requests pass through a chain of middleware functions before reaching handlers.",
    );

    for (file, chunk) in all_chunks(files) {
        let reason = match chunk.chunk_type {
            ChunkType::Class if is_middleware_name(&chunk.name) => Some("is named as middleware"),
            ChunkType::Class
                if chunk.dependencies.iter().any(|d| {
                    d.kind == DependencyKind::Implements && is_middleware_name(&d.name)
                }) =>
            {
                Some("implements a middleware contract")
            }
            ChunkType::Function | ChunkType::Method => {
                let params = &chunk.metadata.parameters;
                let chained = params.iter().any(|p| is_next_param(&p.name))
                    && params.iter().any(|p| is_request_param(&p.name));
                if chained {
                    Some("takes a request and a next callback")
                } else if chunk.chunk_type == ChunkType::Function && is_middleware_name(&chunk.name) {
                    Some("is named as middleware")
                } else {
                    None
                }
            }
            _ => None,
        };

        if let Some(reason) = reason {
            pattern
                .locations
                .push(location(file, vec![chunk.id.clone()], "middleware"));
            pattern.evidence.push(format!("{} {reason}", chunk.name));
        }
    }

    finish(pattern, 0.55, 0.0)
}

// ── Data transfer objects ───────────────────────────────────────────

pub fn detect_dto(files: &[FileAnalysis]) -> Option<ArchitecturalPattern> {
    let mut pattern = ArchitecturalPattern::new(
        PatternType::DataTransferObject,
        "Plain data shapes carry values across layer and network boundaries.",
    );

    for (file, chunk) in all_chunks(files) {
        if !matches!(
            chunk.chunk_type,
            ChunkType::Class | ChunkType::Interface | ChunkType::Type
        ) {
            continue;
        }
        if !is_dto_name(&chunk.name) && !(chunk.is_top_level() && is_dto_path(&file.relative_path)) {
            continue;
        }
        let members = children(file, chunk);
        if members.iter().any(|m| m.chunk_type == ChunkType::Method) {
            continue;
        }

        pattern
            .locations
            .push(location(file, vec![chunk.id.clone()], "dto"));
        pattern.evidence.push(format!(
            "{} carries {} field(s) and no behaviour",
            chunk.name,
            members.len()
        ));
    }

    finish(pattern, 0.5, 0.0)
}

// ── Dependency injection ────────────────────────────────────────────

pub fn detect_dependency_injection(files: &[FileAnalysis]) -> Option<ArchitecturalPattern> {
    let mut pattern = ArchitecturalPattern::new(
        PatternType::DependencyInjection,
        "Collaborators are supplied from outside, through constructors or an injection container.",
    );
    let mut decorated = false;

    for (file, chunk) in all_chunks(files) {
        if chunk.chunk_type != ChunkType::Class {
            continue;
        }
        let decorators: Vec<&str> = chunk
            .metadata
            .decorators
            .iter()
            .map(String::as_str)
            .filter(|d| is_di_decorator(d))
            .collect();
        let injected: Vec<String> = children(file, chunk)
            .into_iter()
            .find(|m| m.chunk_type == ChunkType::Method && m.name == "constructor")
            .map(injected_types)
            .unwrap_or_default();

        if decorators.is_empty() && injected.is_empty() {
            continue;
        }

        let role = if decorators.is_empty() { "consumer" } else { "injectable" };
        pattern
            .locations
            .push(location(file, vec![chunk.id.clone()], role));
        if !decorators.is_empty() {
            decorated = true;
            pattern
                .evidence
                .push(format!("{} is decorated with @{}", chunk.name, decorators.join(", @")));
        }
        if !injected.is_empty() {
            pattern.evidence.push(format!(
                "{} receives {} via its constructor",
                chunk.name,
                injected.join(", ")
            ));
        }
    }

    finish(pattern, 0.5, if decorated { 0.1 } else { 0.0 })
}

// ── Layered architecture ────────────────────────────────────────────

/// Layer label for a file path, checked from the outermost layer inwards
pub(crate) fn layer_of(path: &str) -> Option<&'static str> {
    if is_presentation_path(path) {
        Some("presentation")
    } else if is_application_path(path) {
        Some("application")
    } else if is_data_path(path) {
        Some("data")
    } else if is_infrastructure_path(path) {
        Some("infrastructure")
    } else {
        None
    }
}

/// Number of distinct layers required before the codebase counts as layered
const MIN_LAYERS: usize = 3;

pub fn detect_layered_architecture(files: &[FileAnalysis]) -> Option<ArchitecturalPattern> {
    let mut layers: BTreeMap<&'static str, Vec<&FileAnalysis>> = BTreeMap::new();
    for file in files {
        if let Some(layer) = layer_of(&file.relative_path) {
            layers.entry(layer).or_default().push(file);
        }
    }
    if layers.len() < MIN_LAYERS {
        return None;
    }

    let mut pattern = ArchitecturalPattern::new(
        PatternType::LayeredArchitecture,
        "The codebase separates presentation, application and data concerns into distinct layers.",
    );
    for (layer, members) in &layers {
        pattern.evidence.push(format!("{} layer: {} file(s)", layer, members.len()));
        for file in members {
            let ids = file.top_level_chunks().map(|c| c.id.clone()).collect();
            pattern.locations.push(location(file, ids, layer));
        }
    }

    pattern.confidence = scaled_confidence(0.3, layers.len(), 0.0);
    Some(pattern)
}
