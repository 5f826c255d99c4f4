use crate::lexicon::{infer_domain, words, FALLBACK_DESCRIPTION, FALLBACK_DOMAIN};
use crate::types::{
    Aggregate, Attribute, BoundedContext, Capability, DomainEvent, DomainModel, DomainService,
    Entity, ModuleInfo, ModulePurpose, Relationship, RelationshipKind, Workflow, WorkflowStep,
};
use codewiki_chunker::{Chunk, ChunkType, DependencyKind, FileAnalysis, Modifier};
use codewiki_patterns::{ArchitecturalPattern, PatternType};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::OnceLock;

macro_rules! name_matcher {
    ($name:ident, $pattern:expr) => {
        fn $name(text: &str) -> bool {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| {
                Regex::new($pattern)
                    .unwrap_or_else(|e| panic!("invalid {} pattern: {e}", stringify!($name)))
            })
            .is_match(text)
        }
    };
}

name_matcher!(
    is_non_entity_name,
    r"(Service|Repository|Repo|Dao|DAO|Controller|Util|Utils|Helper|Helpers|Factory|Provider|Middleware|Module|Config|Configuration|Manager|Handler|Listener|Guard|Interceptor|Dto|DTO|Props|Options|State|Error|Exception|Test|Spec|Client|Router|Store|Context)$"
);
name_matcher!(is_event_name, r"(Event|Message|Notification)s?$");
name_matcher!(is_handler_name, r"^(handle|on)[A-Z_]|(Handler|Listener|Subscriber)$");
name_matcher!(is_collection_type, r"(\[\]|^(Array|ReadonlyArray|Set|Map|Collection|List)<)");
name_matcher!(is_framework_prefix, r"^(src|lib|app|packages)$");

/// Infers a business-domain model from analyzed files
#[derive(Debug, Default)]
pub struct DomainAnalyzer;

impl DomainAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Build the domain model. Never fails; missing evidence yields empty lists.
    pub fn analyze(
        &self,
        files: &[FileAnalysis],
        modules: &[ModuleInfo],
        patterns: &[ArchitecturalPattern],
    ) -> DomainModel {
        let (name, description) = domain_identity(files);
        let entities = extract_entities(files);
        let aggregates = build_aggregates(&entities);
        let services = extract_services(files, modules);
        let events = extract_events(files);
        let workflows = extract_workflows(patterns, files);
        let bounded_contexts = group_contexts(modules, &entities, &services);

        log::info!(
            "Domain '{}': {} entities, {} aggregates, {} services, {} events, {} workflows",
            name,
            entities.len(),
            aggregates.len(),
            services.len(),
            events.len(),
            workflows.len()
        );

        DomainModel {
            name,
            description,
            entities,
            aggregates,
            services,
            events,
            workflows,
            bounded_contexts,
        }
    }
}

fn domain_identity(files: &[FileAnalysis]) -> (String, String) {
    let mut text = String::new();
    for file in files {
        text.push_str(&file.relative_path);
        text.push(' ');
        for chunk in &file.chunks {
            text.push_str(&chunk.name);
            text.push(' ');
        }
    }
    match infer_domain(&text) {
        Some(lexicon) => (lexicon.name.to_string(), lexicon.description.to_string()),
        None => (FALLBACK_DOMAIN.to_string(), FALLBACK_DESCRIPTION.to_string()),
    }
}

fn top_level_of<'a>(
    files: &'a [FileAnalysis],
    types: &'a [ChunkType],
) -> impl Iterator<Item = (&'a FileAnalysis, &'a Chunk)> + 'a {
    files.iter().flat_map(move |file| {
        file.top_level_chunks()
            .filter(move |c| types.contains(&c.chunk_type))
            .map(move |c| (file, c))
    })
}

fn first_sentence(doc: &str) -> String {
    let line = doc.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    match line.find(". ") {
        Some(idx) => line[..=idx].to_string(),
        None => line.to_string(),
    }
}

/// Words of an identifier joined by spaces (`findById` -> `find by id`)
fn humanize(name: &str) -> String {
    words(name).join(" ")
}

// ── Entities ────────────────────────────────────────────────────────

fn extract_entities(files: &[FileAnalysis]) -> Vec<Entity> {
    let candidates: Vec<(&FileAnalysis, &Chunk)> =
        top_level_of(files, &[ChunkType::Class, ChunkType::Interface])
            .filter(|(file, chunk)| {
                !is_non_entity_name(&chunk.name)
                    && !is_event_name(&chunk.name)
                    && !file.relative_path.contains(".test.")
                    && !file.relative_path.contains(".spec.")
            })
            .collect();

    // First declaration of a name wins, matching graph resolution.
    let mut seen = HashSet::new();
    let candidates: Vec<_> = candidates
        .into_iter()
        .filter(|(_, chunk)| seen.insert(chunk.name.as_str()))
        .collect();
    let names: HashSet<&str> = candidates.iter().map(|(_, c)| c.name.as_str()).collect();

    let mut entities: Vec<Entity> = candidates
        .iter()
        .map(|(file, chunk)| build_entity(file, chunk, &names))
        .collect();
    entities.sort_by(|a, b| a.name.cmp(&b.name));
    entities
}

fn build_entity(file: &FileAnalysis, chunk: &Chunk, entities: &HashSet<&str>) -> Entity {
    let members: Vec<&Chunk> = file.children_of(chunk).collect();

    let attributes: Vec<Attribute> = members
        .iter()
        .filter(|m| m.chunk_type == ChunkType::Property)
        .map(|m| Attribute {
            name: m.name.clone(),
            type_annotation: m.metadata.type_annotation.clone(),
            optional: m.has_modifier(Modifier::Optional),
        })
        .collect();

    let behaviors = members
        .iter()
        .filter(|m| m.chunk_type == ChunkType::Method && m.name != "constructor" && !m.is_non_public())
        .map(|m| m.name.clone())
        .collect();

    let mut relationships: Vec<Relationship> = Vec::new();
    let mut related = HashSet::new();

    for attribute in &attributes {
        let Some(ty) = attribute.type_annotation.as_deref() else {
            continue;
        };
        let Some(target) = type_names(ty).find(|name| entities.contains(name) && *name != chunk.name)
        else {
            continue;
        };
        let kind = if is_collection_type(ty) || is_plural_of(&attribute.name, target) {
            RelationshipKind::HasMany
        } else {
            RelationshipKind::HasOne
        };
        if related.insert(target.to_string()) {
            relationships.push(Relationship {
                kind,
                target: target.to_string(),
                via: attribute.name.clone(),
            });
        }
    }

    for dep in &chunk.dependencies {
        if dep.name == chunk.name || !entities.contains(dep.name.as_str()) {
            continue;
        }
        let kind = match dep.kind {
            DependencyKind::Extends => RelationshipKind::BelongsTo,
            DependencyKind::Uses | DependencyKind::Reference => RelationshipKind::HasOne,
            _ => continue,
        };
        if related.insert(dep.name.clone()) {
            relationships.push(Relationship {
                kind,
                target: dep.name.clone(),
                via: dep.kind.as_str().to_string(),
            });
        }
    }

    let description = chunk
        .documentation
        .as_deref()
        .map(first_sentence)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| {
            format!(
                "{} with {} attribute(s), declared in {}",
                humanize(&chunk.name),
                attributes.len(),
                file.relative_path
            )
        });

    Entity {
        name: chunk.name.clone(),
        file: file.relative_path.clone(),
        chunk_id: chunk.id.clone(),
        description,
        attributes,
        behaviors,
        relationships,
    }
}

fn type_names(ty: &str) -> impl Iterator<Item = &str> {
    ty.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
}

/// `orders` holding `Order`
fn is_plural_of(attribute: &str, target: &str) -> bool {
    let attribute = attribute.to_ascii_lowercase();
    let target = target.to_ascii_lowercase();
    attribute == format!("{target}s")
        || attribute == format!("{target}es")
        || (target.ends_with('y') && attribute == format!("{}ies", &target[..target.len() - 1]))
}

// ── Aggregates ──────────────────────────────────────────────────────

fn build_aggregates(entities: &[Entity]) -> Vec<Aggregate> {
    let edges: HashMap<&str, Vec<&str>> = entities
        .iter()
        .map(|entity| {
            let owned: Vec<&str> = entity
                .relationships
                .iter()
                .filter(|r| r.kind.is_ownership())
                .map(|r| r.target.as_str())
                .collect();
            (entity.name.as_str(), owned)
        })
        .collect();

    let owned: HashSet<&str> = edges.values().flatten().copied().collect();
    // Entities nobody owns are tried first so they end up as roots.
    let mut roots: Vec<&str> = entities.iter().map(|e| e.name.as_str()).collect();
    roots.sort_by_key(|name| (owned.contains(name), *name));

    let mut visited: HashSet<&str> = HashSet::new();
    let mut aggregates = Vec::new();

    for root in roots {
        if visited.contains(root) {
            continue;
        }

        let mut members = Vec::new();
        let mut queue = VecDeque::from([root]);
        visited.insert(root);
        while let Some(current) = queue.pop_front() {
            members.push(current.to_string());
            for &next in edges.get(current).into_iter().flatten() {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        if members.len() > 1 {
            aggregates.push(Aggregate {
                name: format!("{root} Aggregate"),
                root: root.to_string(),
                members,
            });
        }
    }
    aggregates
}

// ── Services ────────────────────────────────────────────────────────

fn extract_services(files: &[FileAnalysis], modules: &[ModuleInfo]) -> Vec<DomainService> {
    let business: HashSet<&str> = modules
        .iter()
        .filter(|m| m.purpose == ModulePurpose::BusinessLogic)
        .flat_map(|m| m.files.iter().map(String::as_str))
        .collect();

    let mut services: Vec<DomainService> = top_level_of(files, &[ChunkType::Class])
        .filter(|(file, _)| business.contains(file.relative_path.as_str()))
        .map(|(file, chunk)| build_service(file, chunk))
        .collect();
    services.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.file.cmp(&b.file)));
    services
}

fn build_service(file: &FileAnalysis, chunk: &Chunk) -> DomainService {
    let capabilities = file
        .children_of(chunk)
        .filter(|m| m.chunk_type == ChunkType::Method && m.name != "constructor" && !m.is_non_public())
        .map(|method| capability(&chunk.name, method))
        .collect();

    let collaborators: BTreeSet<String> = chunk
        .dependencies
        .iter()
        .filter(|d| {
            d.kind == DependencyKind::Uses && d.name.chars().next().is_some_and(char::is_uppercase)
        })
        .map(|d| d.name.clone())
        .collect();

    let description = chunk
        .documentation
        .as_deref()
        .map(first_sentence)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| format!("Coordinates {} operations", humanize(&chunk.name)));

    DomainService {
        name: chunk.name.clone(),
        file: file.relative_path.clone(),
        chunk_id: chunk.id.clone(),
        description,
        capabilities,
        collaborators: collaborators.into_iter().collect(),
    }
}

fn capability(service: &str, method: &Chunk) -> Capability {
    let input = if method.metadata.parameters.is_empty() {
        "none".to_string()
    } else {
        method
            .metadata
            .parameters
            .iter()
            .map(|p| match &p.type_annotation {
                Some(ty) => format!("{}: {ty}", p.name),
                None => p.name.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    };

    let output = match (&method.metadata.return_type, method.has_modifier(Modifier::Async)) {
        (Some(ty), _) => ty.clone(),
        (None, true) => "Promise (inferred)".to_string(),
        (None, false) => "inferred".to_string(),
    };

    Capability {
        name: method.name.clone(),
        input,
        output,
        business_value: business_value(service, &method.name),
    }
}

fn business_value(service: &str, method: &str) -> String {
    let parts = words(method);
    let Some((verb, rest)) = parts.split_first() else {
        return format!("Supports {}", humanize(service));
    };
    let object = if rest.is_empty() {
        "data".to_string()
    } else {
        rest.join(" ")
    };

    match verb.as_str() {
        "get" | "find" | "fetch" | "list" | "load" | "read" | "search" | "query" => {
            format!("Retrieves {object} for callers")
        }
        "create" | "add" | "register" | "insert" | "save" | "store" => {
            format!("Records new {object}")
        }
        "update" | "edit" | "change" | "set" | "patch" => format!("Keeps {object} up to date"),
        "delete" | "remove" | "destroy" | "archive" => format!("Removes {object}"),
        "validate" | "check" | "verify" | "ensure" => {
            format!("Enforces business rules on {object}")
        }
        "send" | "notify" | "emit" | "publish" => format!("Communicates {object} to other parties"),
        "calculate" | "compute" | "count" | "sum" => format!("Derives {object}"),
        "process" | "handle" | "execute" | "run" => format!("Carries out {object} processing"),
        _ => format!("Supports the {} workflow", humanize(service)),
    }
}

// ── Events ──────────────────────────────────────────────────────────

fn extract_events(files: &[FileAnalysis]) -> Vec<DomainEvent> {
    let kinds = [
        ChunkType::Class,
        ChunkType::Interface,
        ChunkType::Type,
        ChunkType::Enum,
        ChunkType::Variable,
    ];
    let handlers: Vec<&Chunk> = files
        .iter()
        .flat_map(|f| f.chunks.iter())
        .filter(|c| {
            (c.chunk_type.is_callable() || c.chunk_type == ChunkType::Class)
                && is_handler_name(&c.name)
        })
        .collect();

    let mut events: Vec<DomainEvent> = top_level_of(files, &kinds)
        .filter(|(_, chunk)| is_event_name(&chunk.name))
        .map(|(file, chunk)| {
            let stem = event_stem(&chunk.name).to_ascii_lowercase();
            let handled_by = handlers
                .iter()
                .filter(|h| !stem.is_empty() && h.name.to_ascii_lowercase().contains(&stem))
                .map(|h| h.id.clone())
                .collect();
            DomainEvent {
                name: chunk.name.clone(),
                file: file.relative_path.clone(),
                chunk_id: chunk.id.clone(),
                handlers: handled_by,
            }
        })
        .collect();
    events.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.file.cmp(&b.file)));
    events
}

/// `UserCreatedEvent` -> `UserCreated`
fn event_stem(name: &str) -> &str {
    let name = name.strip_suffix('s').unwrap_or(name);
    ["Event", "Message", "Notification"]
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
        .unwrap_or(name)
}

// ── Workflows ───────────────────────────────────────────────────────

fn extract_workflows(patterns: &[ArchitecturalPattern], files: &[FileAnalysis]) -> Vec<Workflow> {
    let names: HashMap<&str, &str> = files
        .iter()
        .flat_map(|file| file.chunks.iter())
        .map(|chunk| (chunk.id.as_str(), chunk.name.as_str()))
        .collect();

    patterns
        .iter()
        .filter(|p| {
            matches!(
                p.pattern_type,
                PatternType::ServiceLayer | PatternType::Middleware
            ) && p.locations.len() > 1
        })
        .map(|pattern| {
            let steps = pattern
                .locations
                .iter()
                .enumerate()
                .map(|(idx, location)| WorkflowStep {
                    order: idx + 1,
                    name: location
                        .chunk_ids
                        .first()
                        .and_then(|id| names.get(id.as_str()).copied())
                        .unwrap_or(&location.file)
                        .to_string(),
                    file: location.file.clone(),
                    role: location.role.clone(),
                })
                .collect();
            let name = match pattern.pattern_type {
                PatternType::Middleware => "Request Pipeline",
                _ => "Service Orchestration",
            };
            Workflow {
                name: name.to_string(),
                description: pattern.description.clone(),
                steps,
            }
        })
        .collect()
}

// ── Bounded contexts ────────────────────────────────────────────────

/// Top-level directory after dropping conventional source roots
pub fn context_name(module_path: &str) -> String {
    module_path
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .find(|s| !is_framework_prefix(s))
        .unwrap_or("core")
        .to_string()
}

fn group_contexts(
    modules: &[ModuleInfo],
    entities: &[Entity],
    services: &[DomainService],
) -> Vec<BoundedContext> {
    let mut contexts: BTreeMap<String, BoundedContext> = BTreeMap::new();
    let mut file_context: HashMap<&str, String> = HashMap::new();

    for module in modules {
        let name = context_name(&module.path);
        for file in &module.files {
            file_context.insert(file.as_str(), name.clone());
        }
        contexts
            .entry(name.clone())
            .or_insert_with(|| BoundedContext {
                name,
                modules: Vec::new(),
                entities: Vec::new(),
                services: Vec::new(),
            })
            .modules
            .push(module.path.clone());
    }

    for entity in entities {
        if let Some(ctx) = file_context
            .get(entity.file.as_str())
            .and_then(|name| contexts.get_mut(name))
        {
            ctx.entities.push(entity.name.clone());
        }
    }
    for service in services {
        if let Some(ctx) = file_context
            .get(service.file.as_str())
            .and_then(|name| contexts.get_mut(name))
        {
            ctx.services.push(service.name.clone());
        }
    }

    contexts.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_matcher_compiles() {
        let matchers: &[fn(&str) -> bool] = &[
            is_non_entity_name,
            is_event_name,
            is_handler_name,
            is_collection_type,
            is_framework_prefix,
        ];
        for matcher in matchers {
            assert!(!matcher(""));
        }
    }

    #[test]
    fn test_context_name() {
        assert_eq!(context_name("src/billing/services"), "billing");
        assert_eq!(context_name("src"), "core");
        assert_eq!(context_name("."), "core");
        assert_eq!(context_name("packages/api/src"), "api");
    }

    #[test]
    fn test_event_stem() {
        assert_eq!(event_stem("UserCreatedEvent"), "UserCreated");
        assert_eq!(event_stem("OrderMessages"), "Order");
        assert_eq!(event_stem("Notification"), "");
    }

    #[test]
    fn test_business_value() {
        assert_eq!(business_value("UserService", "getUser"), "Retrieves user for callers");
        assert_eq!(business_value("UserService", "deleteAll"), "Removes all");
        assert_eq!(
            business_value("UserService", "frobnicate"),
            "Supports the user service workflow"
        );
    }

    #[test]
    fn test_is_plural_of() {
        assert!(is_plural_of("orders", "Order"));
        assert!(is_plural_of("categories", "Category"));
        assert!(!is_plural_of("owner", "User"));
    }
}
