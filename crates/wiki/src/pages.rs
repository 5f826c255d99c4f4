use crate::analysis::WikiAnalysis;
use crate::document::{slugify, Frontmatter, WikiDocument};
use chrono::{DateTime, Utc};
use codewiki_chunker::{Chunk, FileAnalysis};
use codewiki_domain::{DomainService, Entity, ModuleInfo, Workflow};
use codewiki_graph::EdgeKind;
use codewiki_patterns::ArchitecturalPattern;
use std::collections::{BTreeMap, HashMap, HashSet};

pub const OVERVIEW: &str = "overview.md";
pub const ARCHITECTURE: &str = "architecture.md";
pub const DOMAIN_MODEL: &str = "domain-model.md";
pub const METRICS: &str = "metrics.md";
pub const INDEX: &str = "index.md";

pub fn pattern_path(pattern: &ArchitecturalPattern) -> String {
    format!("patterns/{}.md", slugify(pattern.pattern_type.as_str()))
}

pub fn module_path(module: &ModuleInfo) -> String {
    let slug = if module.path == "." {
        "root".to_string()
    } else {
        slugify(&module.path)
    };
    format!("modules/{slug}.md")
}

pub fn entity_path(name: &str) -> String {
    format!("entities/{}.md", slugify(name))
}

pub fn service_path(name: &str) -> String {
    format!("services/{}.md", slugify(name))
}

pub fn workflow_path(name: &str) -> String {
    format!("workflows/{}.md", slugify(name))
}

pub fn file_path(relative_path: &str) -> String {
    format!("files/{}.md", slugify(relative_path))
}

/// Link from the page at `from` to the page at `to`, both relative to the wiki root
pub fn relative_link(from: &str, to: &str) -> String {
    let from_parts: Vec<&str> = from.split('/').collect();
    let to_parts: Vec<&str> = to.split('/').collect();
    let from_dirs = &from_parts[..from_parts.len() - 1];
    let to_dirs = &to_parts[..to_parts.len() - 1];

    let common = from_dirs
        .iter()
        .zip(to_dirs)
        .take_while(|(a, b)| a == b)
        .count();
    let mut parts = vec![".."; from_dirs.len() - common];
    parts.extend(&to_parts[common..]);
    parts.join("/")
}

fn has_page(module: &ModuleInfo) -> bool {
    !module.public_api.is_empty()
}

fn pattern_key(pattern: &ArchitecturalPattern) -> String {
    format!("{}:{}", pattern.pattern_type.as_str(), pattern.name)
}

/// Directory part of a relative file path
fn directory_of(file: &str) -> &str {
    file.rsplit_once('/').map_or("root", |(dir, _)| dir)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PageKey {
    Pattern(String),
    Module(String),
    Entity(String),
    Service(String),
    Workflow(String),
}

/// Output path of every page in one analysis.
///
/// Pages are claimed in render order; a page whose slug is already taken gets
/// the slug of its source directory appended, then a counter.
#[derive(Debug, Clone, Default)]
pub struct PageMap {
    paths: HashMap<PageKey, String>,
    taken: HashSet<String>,
}

impl PageMap {
    pub fn new(analysis: &WikiAnalysis) -> Self {
        let mut map = Self::default();
        for fixed in [OVERVIEW, ARCHITECTURE, DOMAIN_MODEL, METRICS, INDEX] {
            map.taken.insert(fixed.to_string());
        }
        for pattern in &analysis.patterns {
            map.claim(
                PageKey::Pattern(pattern_key(pattern)),
                pattern_path(pattern),
                &pattern.name,
            );
        }
        for module in analysis.modules.iter().filter(|m| has_page(m)) {
            map.claim(
                PageKey::Module(module.path.clone()),
                module_path(module),
                &module.path,
            );
        }
        let domain = &analysis.domain;
        for entity in &domain.entities {
            map.claim(
                PageKey::Entity(entity.chunk_id.clone()),
                entity_path(&entity.name),
                directory_of(&entity.file),
            );
        }
        for service in &domain.services {
            map.claim(
                PageKey::Service(service.chunk_id.clone()),
                service_path(&service.name),
                directory_of(&service.file),
            );
        }
        for workflow in &domain.workflows {
            map.claim(
                PageKey::Workflow(workflow.name.clone()),
                workflow_path(&workflow.name),
                &workflow.name,
            );
        }
        map
    }

    fn claim(&mut self, key: PageKey, base: String, origin: &str) {
        if self.paths.contains_key(&key) {
            return;
        }
        let path = if self.taken.contains(&base) {
            let stem = base.strip_suffix(".md").unwrap_or(&base);
            let origin = slugify(origin);
            let mut path = if stem.ends_with(&origin) {
                format!("{stem}-2.md")
            } else {
                format!("{stem}-{origin}.md")
            };
            let mut n = 2;
            while self.taken.contains(&path) {
                path = format!("{stem}-{n}.md");
                n += 1;
            }
            log::debug!("{base} is taken, using {path}");
            path
        } else {
            base
        };
        self.taken.insert(path.clone());
        self.paths.insert(key, path);
    }

    fn get(&self, key: PageKey, fallback: impl FnOnce() -> String) -> String {
        self.paths.get(&key).cloned().unwrap_or_else(fallback)
    }

    pub fn pattern(&self, pattern: &ArchitecturalPattern) -> String {
        self.get(PageKey::Pattern(pattern_key(pattern)), || pattern_path(pattern))
    }

    pub fn module(&self, module: &ModuleInfo) -> String {
        self.get(PageKey::Module(module.path.clone()), || module_path(module))
    }

    pub fn entity(&self, entity: &Entity) -> String {
        self.get(PageKey::Entity(entity.chunk_id.clone()), || entity_path(&entity.name))
    }

    pub fn service(&self, service: &DomainService) -> String {
        self.get(PageKey::Service(service.chunk_id.clone()), || service_path(&service.name))
    }

    pub fn workflow(&self, workflow: &Workflow) -> String {
        self.get(PageKey::Workflow(workflow.name.clone()), || workflow_path(&workflow.name))
    }
}

/// Renders every page for one analysis with a shared timestamp
pub struct PageRenderer<'a> {
    analysis: &'a WikiAnalysis,
    pages: PageMap,
    generated: DateTime<Utc>,
    related_limit: usize,
}

impl<'a> PageRenderer<'a> {
    pub fn new(analysis: &'a WikiAnalysis, generated: DateTime<Utc>, related_limit: usize) -> Self {
        Self {
            analysis,
            pages: PageMap::new(analysis),
            generated,
            related_limit,
        }
    }

    pub fn pages(&self) -> &PageMap {
        &self.pages
    }

    /// All pages, with the index last
    pub fn render_all(&self) -> Vec<WikiDocument> {
        let a = self.analysis;
        let mut docs = vec![self.overview(), self.architecture()];
        docs.extend(a.patterns.iter().map(|p| self.pattern(p)));
        docs.extend(
            a.modules
                .iter()
                .filter(|m| has_page(m))
                .map(|m| self.module(m)),
        );
        docs.push(self.domain_model());
        docs.extend(a.domain.entities.iter().map(|e| self.entity(e)));
        docs.extend(a.domain.services.iter().map(|s| self.service(s)));
        docs.extend(a.domain.workflows.iter().map(|w| self.workflow(w)));
        docs.push(self.metrics());
        let index = self.index(&docs);
        docs.push(index);
        docs
    }

    fn frontmatter(&self, title: impl Into<String>, description: impl Into<String>) -> Frontmatter {
        Frontmatter::new(title, description, self.generated)
    }

    /// First entity declared under `name`
    fn entity_page(&self, name: &str) -> Option<String> {
        self.analysis.domain.entity(name).map(|e| self.pages.entity(e))
    }

    fn service_page(&self, name: &str) -> Option<String> {
        self.analysis.domain.service(name).map(|s| self.pages.service(s))
    }

    pub fn overview(&self) -> WikiDocument {
        let a = self.analysis;
        let m = &a.metrics;

        let mut summary = format!(
            "- Files: {}\n- Chunks: {}\n- Lines: {} ({} code, {} comment, {} blank)\n",
            m.files, m.chunks, m.total_lines, m.code_lines, m.comment_lines, m.blank_lines
        );
        let mut languages: BTreeMap<&str, usize> = BTreeMap::new();
        for file in &a.files {
            *languages.entry(file.language.as_str()).or_default() += 1;
        }
        if !languages.is_empty() {
            let list: Vec<String> = languages
                .iter()
                .map(|(lang, n)| format!("{lang} ({n})"))
                .collect();
            summary.push_str(&format!("- Languages: {}\n", list.join(", ")));
        }
        if !a.diagnostics.is_empty() {
            summary.push_str(&format!("- Skipped files: {}\n", a.diagnostics.len()));
        }

        let domain = format!(
            "**{}**\n\n{}\n\n{}",
            a.domain.name,
            a.domain.description,
            link(OVERVIEW, "Domain model", DOMAIN_MODEL)
        );

        let patterns = bullets(a.patterns.iter().map(|p| {
            format!(
                "{} ({:.0}% confidence)",
                link(OVERVIEW, &p.name, &self.pages.pattern(p)),
                p.confidence * 100.0
            )
        }));

        let modules = table(
            &["Module", "Purpose", "Files"],
            a.modules.iter().map(|module| {
                vec![
                    format!("`{}`", module.path),
                    module.purpose.as_str().to_string(),
                    module.files.len().to_string(),
                ]
            }),
        );

        let health = format!(
            "Health score **{}** / 100 ({}). See {}.",
            m.health_score,
            m.grade(),
            link(OVERVIEW, "metrics", METRICS)
        );

        WikiDocument::new(
            OVERVIEW,
            self.frontmatter(
                format!("{} Overview", a.project),
                format!("Overview of {}: {} files in the {} domain", a.project, m.files, a.domain.name),
            )
            .related([ARCHITECTURE, DOMAIN_MODEL, METRICS, INDEX].map(String::from))
            .tags(["overview"])
            .category("overview"),
        )
        .section("Summary", summary)
        .section("Domain", domain)
        .section("Architecture Patterns", patterns)
        .section("Modules", modules)
        .section("Health", health)
    }

    pub fn architecture(&self) -> WikiDocument {
        let a = self.analysis;

        let mut by_purpose: BTreeMap<&str, Vec<&ModuleInfo>> = BTreeMap::new();
        for module in &a.modules {
            by_purpose.entry(module.purpose.as_str()).or_default().push(module);
        }
        let mut layers = String::new();
        for (purpose, modules) in &by_purpose {
            let names: Vec<String> = modules.iter().map(|m| format!("`{}`", m.path)).collect();
            layers.push_str(&format!("- **{purpose}**: {}\n", names.join(", ")));
        }

        let dependencies = bullets(
            a.modules
                .iter()
                .filter(|m| !m.internal_dependencies.is_empty())
                .map(|m| {
                    let deps: Vec<String> =
                        m.internal_dependencies.iter().map(|d| format!("`{d}`")).collect();
                    format!("`{}` → {}", m.path, deps.join(", "))
                }),
        );

        let edge_counts = {
            let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
            for edge in a.graph.edges() {
                if edge.kind != EdgeKind::Contains {
                    *counts.entry(edge.kind.as_str()).or_default() += 1;
                }
            }
            counts
        };
        let mut graph = format!(
            "{} nodes, {} edges.\n\n",
            a.graph.node_count(),
            a.graph.edge_count()
        );
        graph.push_str(&table(
            &["Edge kind", "Count"],
            edge_counts
                .iter()
                .map(|(kind, n)| vec![(*kind).to_string(), n.to_string()]),
        ));

        let cycles = if a.metrics.cycles.is_empty() {
            "No circular imports.".to_string()
        } else {
            bullets(a.metrics.cycles.iter().map(|cycle| cycle.join(" ⇄ ")))
        };

        let patterns = bullets(
            a.patterns
                .iter()
                .map(|p| {
                    format!(
                        "{}: {}",
                        link(ARCHITECTURE, &p.name, &self.pages.pattern(p)),
                        p.description
                    )
                }),
        );

        WikiDocument::new(
            ARCHITECTURE,
            self.frontmatter(
                "Architecture",
                format!("Module layout and dependency structure of {}", a.project),
            )
            .related(a.patterns.iter().map(|p| self.pages.pattern(p)))
            .tags(["architecture"])
            .category("architecture"),
        )
        .section("Layers", layers)
        .section("Module Dependencies", dependencies)
        .section("Dependency Graph", graph)
        .section("Circular Dependencies", cycles)
        .section("Patterns", patterns)
    }

    pub fn pattern(&self, pattern: &ArchitecturalPattern) -> WikiDocument {
        let locations = table(
            &["File", "Role", "Chunks"],
            pattern.locations.iter().map(|loc| {
                vec![
                    format!("`{}`", loc.file),
                    loc.role.clone(),
                    loc.chunk_ids.len().to_string(),
                ]
            }),
        );

        WikiDocument::new(
            self.pages.pattern(pattern),
            self.frontmatter(pattern.name.clone(), pattern.description.clone())
                .related([ARCHITECTURE.to_string()])
                .sources(pattern.files().into_iter().map(String::from))
                .tags(["pattern", pattern.pattern_type.as_str()])
                .category("pattern"),
        )
        .section("Description", pattern.description.clone())
        .section(
            "Confidence",
            format!("{:.0}%", pattern.confidence * 100.0),
        )
        .section("Evidence", bullets(pattern.evidence.iter().cloned()))
        .section("Locations", locations)
    }

    pub fn module(&self, module: &ModuleInfo) -> WikiDocument {
        let mut deps = String::new();
        if !module.internal_dependencies.is_empty() {
            deps.push_str("Internal:\n\n");
            deps.push_str(&bullets(
                module.internal_dependencies.iter().map(|d| format!("`{d}`")),
            ));
            deps.push('\n');
        }
        if !module.external_dependencies.is_empty() {
            deps.push_str("External:\n\n");
            deps.push_str(&bullets(
                module.external_dependencies.iter().map(|d| format!("`{d}`")),
            ));
        }

        let metrics = format!(
            "- Complexity: {}\n- Cohesion: {:.2}\n- Chunks: {}\n",
            module.complexity, module.cohesion, module.chunk_count
        );

        let related = self
            .analysis
            .modules
            .iter()
            .filter(|m| module.internal_dependencies.contains(&m.path) && has_page(m))
            .map(|m| self.pages.module(m));

        WikiDocument::new(
            self.pages.module(module),
            self.frontmatter(
                format!("{} Module", module.name),
                format!("{} (`{}`)", module.purpose.description(), module.path),
            )
            .related(std::iter::once(ARCHITECTURE.to_string()).chain(related))
            .sources(module.files.iter().cloned())
            .tags(["module", module.purpose.as_str()])
            .category("module"),
        )
        .section("Purpose", module.purpose.description())
        .section(
            "Public API",
            bullets(module.public_api.iter().map(|name| format!("`{name}`"))),
        )
        .section("Files", bullets(module.files.iter().map(|f| format!("`{f}`"))))
        .section("Dependencies", deps)
        .section("Metrics", metrics)
    }

    pub fn domain_model(&self) -> WikiDocument {
        let d = &self.analysis.domain;

        let entities = table(
            &["Entity", "Attributes", "Relationships", "File"],
            d.entities.iter().map(|e| {
                vec![
                    link(DOMAIN_MODEL, &e.name, &self.pages.entity(e)),
                    e.attributes.len().to_string(),
                    e.relationships.len().to_string(),
                    format!("`{}`", e.file),
                ]
            }),
        );

        let aggregates = bullets(d.aggregates.iter().map(|agg| {
            format!("**{}** (root `{}`): {}", agg.name, agg.root, agg.members.join(", "))
        }));

        let services = bullets(d.services.iter().map(|s| {
            format!(
                "{}: {} capabilities",
                link(DOMAIN_MODEL, &s.name, &self.pages.service(s)),
                s.capabilities.len()
            )
        }));

        let events = bullets(d.events.iter().map(|event| {
            if event.handlers.is_empty() {
                format!("`{}`", event.name)
            } else {
                format!("`{}` handled by {}", event.name, code_list(&event.handlers))
            }
        }));

        let workflows = bullets(
            d.workflows
                .iter()
                .map(|w| link(DOMAIN_MODEL, &w.name, &self.pages.workflow(w))),
        );

        let contexts = bullets(d.bounded_contexts.iter().map(|ctx| {
            format!(
                "**{}**: modules {}; entities {}; services {}",
                ctx.name,
                code_list(&ctx.modules),
                or_none(&ctx.entities),
                or_none(&ctx.services)
            )
        }));

        let related = d
            .entities
            .iter()
            .map(|e| self.pages.entity(e))
            .chain(d.services.iter().map(|s| self.pages.service(s)))
            .chain(d.workflows.iter().map(|w| self.pages.workflow(w)));

        WikiDocument::new(
            DOMAIN_MODEL,
            self.frontmatter(format!("{} Domain Model", d.name), d.description.clone())
                .related(related)
                .tags(["domain"])
                .category("domain"),
        )
        .section("Entities", entities)
        .section("Aggregates", aggregates)
        .section("Services", services)
        .section("Events", events)
        .section("Workflows", workflows)
        .section("Bounded Contexts", contexts)
    }

    pub fn entity(&self, entity: &Entity) -> WikiDocument {
        let attributes = table(
            &["Attribute", "Type", "Optional"],
            entity.attributes.iter().map(|attr| {
                vec![
                    format!("`{}`", attr.name),
                    attr.type_annotation
                        .as_deref()
                        .map_or_else(|| "unknown".to_string(), |t| format!("`{t}`")),
                    if attr.optional { "yes" } else { "no" }.to_string(),
                ]
            }),
        );

        let path = self.pages.entity(entity);
        let relationships = bullets(entity.relationships.iter().map(|rel| {
            let target = match self.entity_page(&rel.target) {
                Some(page) => link(&path, &rel.target, &page),
                None => format!("`{}`", rel.target),
            };
            format!("{} {target} via `{}`", rel.kind.as_str(), rel.via)
        }));

        let related = entity
            .relationships
            .iter()
            .filter_map(|rel| self.entity_page(&rel.target))
            .collect::<Vec<_>>();

        WikiDocument::new(
            path,
            self.frontmatter(entity.name.clone(), entity.description.clone())
                .related(std::iter::once(DOMAIN_MODEL.to_string()).chain(dedup(related)))
                .sources([entity.file.clone()])
                .tags(["entity"])
                .category("entity"),
        )
        .section("Description", entity.description.clone())
        .section("Attributes", attributes)
        .section(
            "Behaviors",
            bullets(entity.behaviors.iter().map(|b| format!("`{b}()`"))),
        )
        .section("Relationships", relationships)
        .section("Related Code", self.related_code(&entity.chunk_id))
    }

    pub fn service(&self, service: &DomainService) -> WikiDocument {
        let capabilities = table(
            &["Capability", "Input", "Output", "Business value"],
            service.capabilities.iter().map(|cap| {
                vec![
                    format!("`{}`", cap.name),
                    cap.input.clone(),
                    cap.output.clone(),
                    cap.business_value.clone(),
                ]
            }),
        );

        let path = self.pages.service(service);
        let collaborator_page =
            |name: &str| self.entity_page(name).or_else(|| self.service_page(name));
        let related: Vec<String> = service
            .collaborators
            .iter()
            .filter_map(|name| collaborator_page(name))
            .collect();
        let collaborators = bullets(service.collaborators.iter().map(|name| {
            match collaborator_page(name) {
                Some(page) => link(&path, name, &page),
                None => format!("`{name}`"),
            }
        }));

        WikiDocument::new(
            path,
            self.frontmatter(service.name.clone(), service.description.clone())
                .related(std::iter::once(DOMAIN_MODEL.to_string()).chain(dedup(related)))
                .sources([service.file.clone()])
                .tags(["service"])
                .category("service"),
        )
        .section("Description", service.description.clone())
        .section("Capabilities", capabilities)
        .section("Collaborators", collaborators)
        .section("Related Code", self.related_code(&service.chunk_id))
    }

    pub fn workflow(&self, workflow: &Workflow) -> WikiDocument {
        let steps: String = workflow
            .steps
            .iter()
            .map(|step| {
                format!(
                    "{}. **{}** ({}) in `{}`\n",
                    step.order, step.name, step.role, step.file
                )
            })
            .collect();

        let mut sources: Vec<String> = workflow.steps.iter().map(|s| s.file.clone()).collect();
        sources.sort();
        sources.dedup();

        WikiDocument::new(
            self.pages.workflow(workflow),
            self.frontmatter(workflow.name.clone(), workflow.description.clone())
                .related([DOMAIN_MODEL.to_string()])
                .sources(sources)
                .tags(["workflow"])
                .category("workflow"),
        )
        .section("Description", workflow.description.clone())
        .section("Steps", steps)
    }

    pub fn metrics(&self) -> WikiDocument {
        let m = &self.analysis.metrics;

        let health = format!(
            "**{}** / 100 ({})\n\nThe score starts at 100 and loses points for high average \
             complexity, complexity hotspots and circular imports.",
            m.health_score,
            m.grade()
        );

        let size = table(
            &["Metric", "Value"],
            [
                ("Files", m.files.to_string()),
                ("Chunks", m.chunks.to_string()),
                ("Total lines", m.total_lines.to_string()),
                ("Code lines", m.code_lines.to_string()),
                ("Comment lines", m.comment_lines.to_string()),
                ("Blank lines", m.blank_lines.to_string()),
            ]
            .into_iter()
            .map(|(k, v)| vec![k.to_string(), v]),
        );

        let mut complexity = format!("Average complexity: {:.2}\n\n", m.average_complexity);
        if m.hotspots.is_empty() {
            complexity.push_str("No hotspots.\n");
        } else {
            complexity.push_str(&table(
                &["Hotspot", "File", "Complexity"],
                m.hotspots.iter().map(|h| {
                    vec![
                        format!("`{}`", h.name),
                        format!("`{}`", h.file),
                        h.complexity.to_string(),
                    ]
                }),
            ));
        }

        let cycles = if m.cycles.is_empty() {
            "None detected.".to_string()
        } else {
            bullets(m.cycles.iter().map(|cycle| code_list(cycle)))
        };

        let mut sources: Vec<String> = m.hotspots.iter().map(|h| h.file.clone()).collect();
        sources.sort();
        sources.dedup();

        WikiDocument::new(
            METRICS,
            self.frontmatter(
                "Code Metrics",
                format!("Size, complexity and health of {}", self.analysis.project),
            )
            .related([OVERVIEW.to_string(), ARCHITECTURE.to_string()])
            .sources(sources)
            .tags(["metrics"])
            .category("metrics"),
        )
        .section("Health Score", health)
        .section("Size", size)
        .section("Complexity", complexity)
        .section("Circular Dependencies", cycles)
    }

    /// Links to every other page, grouped by category
    pub fn index(&self, docs: &[WikiDocument]) -> WikiDocument {
        let mut groups: BTreeMap<&str, Vec<&WikiDocument>> = BTreeMap::new();
        for doc in docs {
            let category = doc.frontmatter.category.as_deref().unwrap_or("other");
            groups.entry(category).or_default().push(doc);
        }

        let mut document = WikiDocument::new(
            INDEX,
            self.frontmatter(
                format!("{} Wiki Index", self.analysis.project),
                format!("All {} generated pages", docs.len()),
            )
            .related(docs.iter().map(link_target))
            .tags(["index"])
            .category("index"),
        );
        for (category, docs) in groups {
            let links = bullets(docs.iter().map(|d| {
                format!(
                    "{}: {}",
                    link(INDEX, d.title(), &link_target(d)),
                    d.frontmatter.description
                )
            }));
            document = document.section(heading_case(category), links);
        }
        document
    }

    fn related_code(&self, chunk_id: &str) -> String {
        match self.analysis.indexer.find_related(chunk_id, self.related_limit) {
            Ok(hits) => bullets(hits.iter().map(|hit| {
                format!(
                    "`{}` ({}) in `{}`, similarity {:.2}",
                    hit.name, hit.chunk_type, hit.file_path, hit.similarity
                )
            })),
            Err(e) => {
                log::debug!("No related code for {chunk_id}: {e}");
                String::new()
            }
        }
    }
}

/// Page documenting one file; used directly by single-file mode
pub fn file_page(file: &FileAnalysis, generated: DateTime<Utc>) -> WikiDocument {
    let s = &file.summary;
    let summary = format!(
        "- Language: {}\n- Lines: {} ({} code, {} comment, {} blank)\n- Complexity: {}\n- Chunks: {}\n",
        file.language.as_str(),
        s.total_lines,
        s.code_lines,
        s.comment_lines,
        s.blank_lines,
        s.complexity,
        file.chunks.len()
    );

    let imports = bullets(file.imports.iter().map(|import| {
        let names: Vec<&str> = import.local_names().collect();
        if names.is_empty() {
            format!("`{}`", import.source)
        } else {
            format!("`{}` from `{}`", names.join(", "), import.source)
        }
    }));

    let exports = bullets(file.exports.iter().map(|export| format!("`{}`", export.name)));

    let mut declarations = String::new();
    for chunk in file.top_level_chunks() {
        declarations.push_str(&describe_chunk(chunk, 3));
        for child in file.children_of(chunk) {
            declarations.push_str(&describe_chunk(child, 4));
        }
    }

    WikiDocument::new(
        file_path(&file.relative_path),
        Frontmatter::new(
            file.relative_path.clone(),
            format!(
                "{} declarations in {}",
                file.top_level_chunks().count(),
                file.relative_path
            ),
            generated,
        )
        .sources([file.relative_path.clone()])
        .tags(["file", file.language.as_str()])
        .category("file"),
    )
    .section("Summary", summary)
    .section("Imports", imports)
    .section("Exports", exports)
    .section("Declarations", declarations)
}

fn describe_chunk(chunk: &Chunk, level: usize) -> String {
    let mut md = format!(
        "{} `{}` ({}, lines {}-{})\n\n",
        "#".repeat(level),
        chunk.name,
        chunk.chunk_type,
        chunk.start_line,
        chunk.end_line
    );
    if let Some(signature) = &chunk.signature {
        md.push_str(&format!("```ts\n{signature}\n```\n\n"));
    }
    if let Some(doc) = chunk.documentation.as_deref().filter(|d| !d.trim().is_empty()) {
        md.push_str(doc.trim());
        md.push_str("\n\n");
    }
    md
}

/// Markdown link from the page at `from` to the page at `to`
fn link(from: &str, label: &str, to: &str) -> String {
    format!("[{label}]({})", relative_link(from, to))
}

fn link_target(doc: &WikiDocument) -> String {
    doc.path.to_string_lossy().replace('\\', "/")
}

fn heading_case(category: &str) -> String {
    let mut chars = category.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn dedup(mut items: Vec<String>) -> Vec<String> {
    items.sort();
    items.dedup();
    items
}

fn code_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("`{item}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

fn bullets(items: impl Iterator<Item = String>) -> String {
    items.map(|item| format!("- {item}\n")).collect()
}

/// Markdown table; empty string when there are no rows
fn table(headers: &[&str], rows: impl Iterator<Item = Vec<String>>) -> String {
    let mut md = String::new();
    for row in rows {
        if md.is_empty() {
            md.push_str(&format!("| {} |\n", headers.join(" | ")));
            md.push_str(&format!("|{}\n", "---|".repeat(headers.len())));
        }
        let cells: Vec<String> = row.iter().map(|cell| escape_cell(cell)).collect();
        md.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_table() {
        let md = table(
            &["A", "B"],
            [vec!["x|y".to_string(), "1".to_string()]].into_iter(),
        );
        assert_eq!(md, "| A | B |\n|---|---|\n| x\\|y | 1 |\n");
        assert_eq!(table(&["A"], std::iter::empty()), "");
    }

    #[test]
    fn test_paths() {
        assert_eq!(entity_path("OrderItem"), "entities/order-item.md");
        assert_eq!(file_path("src/app.ts"), "files/src-app-ts.md");
        assert_eq!(heading_case("entity"), "Entity");
    }

    #[test]
    fn test_relative_link() {
        assert_eq!(relative_link("index.md", "entities/order.md"), "entities/order.md");
        assert_eq!(relative_link("entities/order.md", "entities/order-line.md"), "order-line.md");
        assert_eq!(relative_link("services/user.md", "entities/user.md"), "../entities/user.md");
        assert_eq!(relative_link("entities/order.md", "domain-model.md"), "../domain-model.md");
        assert_eq!(relative_link("overview.md", "metrics.md"), "metrics.md");
    }
}
