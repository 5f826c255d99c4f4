use crate::types::{ModuleInfo, ModulePurpose};
use codewiki_chunker::{ChunkType, FileAnalysis};
use codewiki_graph::resolve_import;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::OnceLock;

/// Directory-name taxonomy, checked in order against a single path segment
const PURPOSE_PATTERNS: &[(ModulePurpose, &str)] = &[
    (ModulePurpose::Testing, r"^(tests?|__tests__|specs?|e2e|mocks?|__mocks__|fixtures)$"),
    (ModulePurpose::UiComponent, r"^(components?|ui|views?|pages|widgets|screens|layouts?)$"),
    (ModulePurpose::BusinessLogic, r"^(services?|domain|use-?cases?|business|core|application)$"),
    (
        ModulePurpose::DataAccess,
        r"^(repositor(y|ies)|dal|dao|data|db|database|models?|entities|persistence|schemas?)$",
    ),
    (ModulePurpose::Utility, r"^(utils?|utilities|helpers?|lib|common|shared)$"),
    (ModulePurpose::Configuration, r"^(config|configs|configuration|settings|env|constants)$"),
    (ModulePurpose::ApiClient, r"^(api|apis|clients?|http|sdk|gateways?)$"),
    (
        ModulePurpose::StateManagement,
        r"^(store|stores|state|redux|reducers?|slices?|contexts?|atoms|hooks)$",
    ),
    (ModulePurpose::Routing, r"^(routes?|routers?|routing|navigation|controllers?)$"),
    (ModulePurpose::Middleware, r"^(middlewares?|interceptors?|guards?|pipes)$"),
    (ModulePurpose::Types, r"^(types|typings|interfaces|@types|dtos?|contracts)$"),
    (
        ModulePurpose::Infrastructure,
        r"^(infra|infrastructure|adapters?|providers?|server|jobs|workers?|queues?|deploy)$",
    ),
];

/// Compile a literal pattern; a bad literal is a bug and panics on first use
fn compile(source: &str) -> Regex {
    Regex::new(source).unwrap_or_else(|e| panic!("invalid pattern {source:?}: {e}"))
}

fn purpose_matchers() -> &'static [(ModulePurpose, Regex)] {
    static MATCHERS: OnceLock<Vec<(ModulePurpose, Regex)>> = OnceLock::new();
    MATCHERS.get_or_init(|| {
        PURPOSE_PATTERNS
            .iter()
            .map(|(purpose, pattern)| (*purpose, compile(pattern)))
            .collect()
    })
}

fn lazy_match(pattern: &'static OnceLock<Regex>, source: &str, text: &str) -> bool {
    pattern.get_or_init(|| compile(source)).is_match(text)
}

fn is_component_name(name: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    lazy_match(&RE, r"(Component|View|Page|Screen|Widget|Layout|Modal|Button|Form)$", name)
}

fn is_data_access_name(name: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    lazy_match(&RE, r"(Repository|Repo|Dao|DAO|Model|Entity|Schema|Store)$", name)
}

fn is_service_name(name: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    lazy_match(&RE, r"(Service|UseCase|Interactor)$", name)
}

fn is_test_file(path: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    lazy_match(&RE, r"\.(test|spec)\.[cm]?[jt]sx?$", path)
}

/// Purpose from the directory name alone, innermost segment first
pub fn purpose_from_path(dir: &str) -> Option<ModulePurpose> {
    let lowered = dir.to_ascii_lowercase();
    lowered.rsplit('/').find_map(|segment| {
        purpose_matchers()
            .iter()
            .find(|(_, regex)| regex.is_match(segment))
            .map(|(purpose, _)| *purpose)
    })
}

/// Purpose from what the files declare, when the directory name says nothing
pub fn purpose_from_content(files: &[&FileAnalysis]) -> ModulePurpose {
    if !files.is_empty() && files.iter().all(|f| is_test_file(&f.relative_path)) {
        return ModulePurpose::Testing;
    }

    let names: Vec<&str> = files
        .iter()
        .flat_map(|f| f.top_level_chunks())
        .filter(|c| c.chunk_type != ChunkType::Import && c.chunk_type != ChunkType::Export)
        .map(|c| c.name.as_str())
        .collect();
    if names.is_empty() {
        return ModulePurpose::Unknown;
    }

    let tsx = files
        .iter()
        .any(|f| f.relative_path.ends_with(".tsx") || f.relative_path.ends_with(".jsx"));
    let declarations = files
        .iter()
        .flat_map(|f| f.top_level_chunks())
        .filter(|c| matches!(c.chunk_type, ChunkType::Interface | ChunkType::Type))
        .count();
    // Type-only modules need declarations to be the majority.
    let types = if declarations * 2 > names.len() { declarations } else { 0 };

    let counts = [
        (
            ModulePurpose::UiComponent,
            names.iter().filter(|n| is_component_name(n)).count() + usize::from(tsx),
        ),
        (
            ModulePurpose::DataAccess,
            names.iter().filter(|n| is_data_access_name(n)).count(),
        ),
        (
            ModulePurpose::BusinessLogic,
            names.iter().filter(|n| is_service_name(n)).count(),
        ),
        (ModulePurpose::Types, types),
    ];

    counts
        .into_iter()
        .filter(|(_, count)| *count > 0)
        // Earlier entries win ties.
        .fold(None, |best: Option<(ModulePurpose, usize)>, (purpose, count)| match best {
            Some((_, top)) if top >= count => best,
            _ => Some((purpose, count)),
        })
        .map_or(ModulePurpose::Unknown, |(purpose, _)| purpose)
}

/// Groups analyzed files into directory-scoped modules
#[derive(Debug, Default)]
pub struct ModuleAnalyzer;

impl ModuleAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// One module per directory, sorted by path
    pub fn analyze(&self, files: &[FileAnalysis]) -> Vec<ModuleInfo> {
        let mut by_dir: BTreeMap<String, Vec<&FileAnalysis>> = BTreeMap::new();
        for file in files {
            by_dir.entry(file.directory()).or_default().push(file);
        }

        let known: HashSet<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();
        let dir_of: HashMap<&str, String> = files
            .iter()
            .map(|f| (f.relative_path.as_str(), f.directory()))
            .collect();

        let modules: Vec<ModuleInfo> = by_dir
            .iter()
            .map(|(dir, members)| build_module(dir, members, &known, &dir_of))
            .collect();

        log::info!("Grouped {} files into {} modules", files.len(), modules.len());
        modules
    }
}

fn build_module(
    dir: &str,
    members: &[&FileAnalysis],
    known: &HashSet<&str>,
    dir_of: &HashMap<&str, String>,
) -> ModuleInfo {
    let purpose = purpose_from_path(dir).unwrap_or_else(|| purpose_from_content(members));

    let mut public_api = BTreeSet::new();
    let mut external = BTreeSet::new();
    let mut internal = BTreeSet::new();
    let mut complexity = 0u32;
    let mut chunk_count = 0usize;

    for file in members {
        public_api.extend(file.summary.exports.iter().cloned());
        external.extend(file.summary.external_dependencies.iter().cloned());
        complexity = complexity.saturating_add(file.summary.complexity);
        chunk_count += file.chunks.len();

        for import in file.imports.iter().filter(|i| i.is_relative()) {
            let Some(target) = resolve_import(&file.relative_path, &import.source, known) else {
                continue;
            };
            if let Some(target_dir) = dir_of.get(target.as_str()) {
                if target_dir != dir {
                    internal.insert(target_dir.clone());
                }
            }
        }
    }

    let name = match dir.rsplit('/').next() {
        Some(last) if !last.is_empty() && last != "." => last.to_string(),
        _ => "root".to_string(),
    };

    log::debug!("Module {dir} classified as {purpose}");

    ModuleInfo {
        path: dir.to_string(),
        name,
        purpose,
        public_api: public_api.into_iter().collect(),
        internal_dependencies: internal.into_iter().collect(),
        external_dependencies: external.into_iter().collect(),
        complexity,
        cohesion: cohesion(members),
        files: members.iter().map(|f| f.relative_path.clone()).collect(),
        chunk_count,
    }
}

/// References between distinct chunks of the module over `n * (n - 1)`
pub fn cohesion(files: &[&FileAnalysis]) -> f64 {
    let chunks: Vec<_> = files.iter().flat_map(|f| f.chunks.iter()).collect();
    let n = chunks.len();
    if n < 2 {
        return 0.0;
    }

    let mut by_name: HashMap<&str, Vec<&str>> = HashMap::new();
    for chunk in &chunks {
        by_name
            .entry(chunk.name.as_str())
            .or_default()
            .push(chunk.id.as_str());
    }

    let internal = chunks
        .iter()
        .flat_map(|chunk| chunk.dependencies.iter().map(move |dep| (chunk, dep)))
        .filter(|(chunk, dep)| {
            by_name
                .get(dep.name.as_str())
                .is_some_and(|ids| ids.iter().any(|id| *id != chunk.id))
        })
        .count();

    let possible = (n * (n - 1)) as f64;
    (internal as f64 / possible).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_pattern_compiles() {
        assert_eq!(purpose_matchers().len(), PURPOSE_PATTERNS.len());
        for matcher in [is_component_name, is_data_access_name, is_service_name, is_test_file] {
            assert!(!matcher(""));
        }
    }

    #[test]
    fn test_purpose_from_path() {
        assert_eq!(purpose_from_path("src/repositories"), Some(ModulePurpose::DataAccess));
        assert_eq!(purpose_from_path("src/services"), Some(ModulePurpose::BusinessLogic));
        assert_eq!(purpose_from_path("src/components/Button"), Some(ModulePurpose::UiComponent));
        assert_eq!(purpose_from_path("src/Utils"), Some(ModulePurpose::Utility));
        assert_eq!(purpose_from_path("src/users"), None);
        assert_eq!(purpose_from_path("."), None);
    }

    #[test]
    fn test_cohesion_bounds() {
        assert_eq!(cohesion(&[]), 0.0);
    }
}
