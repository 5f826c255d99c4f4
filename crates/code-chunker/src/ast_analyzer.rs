use crate::config::ChunkerConfig;
use crate::error::{ChunkerError, Result};
use crate::language::Language;
use crate::types::{
    AccessModifier, Chunk, ChunkMetadata, ChunkType, Dependency, DependencyKind, ExportInfo,
    ExportKind, ImportInfo, ImportSpecifier, Modifier, Parameter,
};
use std::collections::{BTreeSet, HashSet};
use tree_sitter::{Node, Parser};

/// Identifiers that never name a project symbol
const BUILTIN_NAMES: &[&str] = &[
    "this", "super", "console", "Math", "JSON", "Object", "Array", "Promise", "String", "Number",
    "Boolean", "Symbol", "Date", "Error", "RegExp", "Map", "Set", "window", "document", "process",
    "require", "undefined", "null", "log", "push", "then", "catch", "length", "toString",
];

/// Type names that carry no domain meaning
const BUILTIN_TYPES: &[&str] = &[
    "Array", "ReadonlyArray", "Promise", "Record", "Partial", "Required", "Readonly", "Pick",
    "Omit", "Map", "Set", "WeakMap", "WeakSet", "Date", "Error", "Function", "Object", "String",
    "Number", "Boolean", "Symbol", "RegExp", "Observable", "Exclude", "Extract", "NonNullable",
    "ReturnType", "Parameters", "InstanceType", "Awaited",
];

/// Node kinds the traversal dispatches on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Import,
    Export,
    Class,
    Interface,
    TypeAlias,
    Enum,
    Function,
    Method,
    Property,
    Variable,
    Namespace,
    Module,
    Decorator,
    /// Wrappers whose children are declarations (`declare ...`, `namespace` as statement)
    Transparent,
    Other,
}

impl NodeKind {
    fn of(kind: &str) -> Self {
        match kind {
            "import_statement" => Self::Import,
            "export_statement" => Self::Export,
            "class_declaration" | "abstract_class_declaration" | "class" => Self::Class,
            "interface_declaration" => Self::Interface,
            "type_alias_declaration" => Self::TypeAlias,
            "enum_declaration" => Self::Enum,
            "function_declaration" | "generator_function_declaration" => Self::Function,
            "method_definition" | "method_signature" | "abstract_method_signature" => Self::Method,
            "public_field_definition" | "field_definition" | "property_signature" => Self::Property,
            "lexical_declaration" | "variable_declaration" => Self::Variable,
            "internal_module" => Self::Namespace,
            "module" => Self::Module,
            "decorator" => Self::Decorator,
            "ambient_declaration" | "expression_statement" => Self::Transparent,
            _ => Self::Other,
        }
    }
}

/// Context inherited from wrapping statements
#[derive(Debug, Clone, Default)]
struct DeclContext {
    exported: bool,
    default_export: bool,
    declare: bool,
    decorators: Vec<String>,
}

impl DeclContext {
    fn with_decorators(&self, decorators: Vec<String>) -> Self {
        let mut ctx = self.clone();
        ctx.decorators.extend(decorators);
        ctx
    }
}

/// Raw extraction result for one file
#[derive(Debug, Default)]
pub struct Extraction {
    pub chunks: Vec<Chunk>,
    pub imports: Vec<ImportInfo>,
    pub exports: Vec<ExportInfo>,
}

/// AST-based analyzer producing chunks, imports and exports
pub struct AstAnalyzer {
    config: ChunkerConfig,
    parser: Parser,
    language: Language,
}

impl AstAnalyzer {
    /// Create new AST analyzer for a language
    pub fn new(config: ChunkerConfig, language: Language) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&language.tree_sitter_language())
            .map_err(|e| ChunkerError::tree_sitter(format!("Failed to set language: {e}")))?;

        Ok(Self {
            config,
            parser,
            language,
        })
    }

    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Parse and extract declarations in one depth-first pass
    pub fn analyze(&mut self, content: &str, file_path: &str) -> Result<Extraction> {
        let tree = self
            .parser
            .parse(content, None)
            .ok_or_else(|| ChunkerError::parse(format!("Failed to parse {file_path}")))?;

        let root = tree.root_node();
        if root.has_error() {
            log::debug!("{file_path}: syntax errors present, extracting what parsed");
        }

        let mut walker = Walker::new(content, file_path, &self.config);
        let ctx = DeclContext::default();
        walker.visit_children(root, None, &ctx);
        walker.finish();

        Ok(Extraction {
            chunks: walker.chunks,
            imports: walker.imports,
            exports: walker.exports,
        })
    }
}

/// Traversal state threaded through the extraction routines
struct Walker<'s> {
    source: &'s str,
    file_path: &'s str,
    config: &'s ChunkerConfig,
    total_lines: usize,
    chunks: Vec<Chunk>,
    /// Parent-qualified names, parallel to `chunks`
    qualified: Vec<String>,
    imports: Vec<ImportInfo>,
    exports: Vec<ExportInfo>,
    /// Local names exported through `export { a, b }`
    exported_locals: Vec<String>,
    seen_ids: HashSet<String>,
}

impl<'s> Walker<'s> {
    fn new(source: &'s str, file_path: &'s str, config: &'s ChunkerConfig) -> Self {
        Self {
            source,
            file_path,
            config,
            total_lines: source.lines().count().max(1),
            chunks: Vec::new(),
            qualified: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            exported_locals: Vec::new(),
            seen_ids: HashSet::new(),
        }
    }

    fn text(&self, node: Node) -> &'s str {
        &self.source[node.start_byte()..node.end_byte()]
    }

    fn field_text(&self, node: Node, field: &str) -> Option<String> {
        node.child_by_field_name(field)
            .map(|child| self.text(child).to_string())
    }

    // ── Dispatch ────────────────────────────────────────────────────

    fn visit_children(&mut self, node: Node, parent: Option<usize>, ctx: &DeclContext) {
        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        for child in children {
            self.visit(child, parent, ctx);
        }
    }

    /// Dispatch one node by kind; returns indices of chunks created directly for it
    fn visit(&mut self, node: Node, parent: Option<usize>, ctx: &DeclContext) -> Vec<usize> {
        match NodeKind::of(node.kind()) {
            NodeKind::Import => {
                self.record_import(node);
                Vec::new()
            }
            NodeKind::Export => {
                self.visit_export(node, parent, ctx);
                Vec::new()
            }
            NodeKind::Class => self.extract_class(node, parent, ctx).into_iter().collect(),
            NodeKind::Interface => self.extract_interface(node, parent, ctx).into_iter().collect(),
            NodeKind::TypeAlias => self.extract_type_alias(node, parent, ctx).into_iter().collect(),
            NodeKind::Enum => self.extract_enum(node, parent, ctx).into_iter().collect(),
            NodeKind::Function => self.extract_function(node, parent, ctx).into_iter().collect(),
            NodeKind::Method => self.extract_method(node, parent, ctx).into_iter().collect(),
            NodeKind::Property => self.extract_property(node, parent, ctx).into_iter().collect(),
            NodeKind::Variable => self.extract_variables(node, parent, ctx),
            NodeKind::Namespace => self
                .extract_namespace(node, parent, ctx, ChunkType::Namespace)
                .into_iter()
                .collect(),
            NodeKind::Module => self
                .extract_namespace(node, parent, ctx, ChunkType::Module)
                .into_iter()
                .collect(),
            NodeKind::Transparent => {
                let mut inner = ctx.clone();
                if node.kind() == "ambient_declaration" {
                    inner.declare = true;
                }
                let mut cursor = node.walk();
                let children: Vec<_> = node.named_children(&mut cursor).collect();
                children
                    .into_iter()
                    .flat_map(|child| self.visit(child, parent, &inner))
                    .collect()
            }
            NodeKind::Decorator | NodeKind::Other => Vec::new(),
        }
    }

    // ── Imports / exports ───────────────────────────────────────────

    fn record_import(&mut self, node: Node) {
        let Some(source) = node
            .child_by_field_name("source")
            .map(|s| unquote(self.text(s)))
        else {
            return;
        };

        let mut info = ImportInfo {
            source,
            named: Vec::new(),
            default_import: None,
            namespace_import: None,
            type_only: has_token(node, "type"),
            line: node.start_position().row + 1,
        };

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() != "import_clause" {
                continue;
            }
            let mut clause_cursor = child.walk();
            for part in child.named_children(&mut clause_cursor) {
                match part.kind() {
                    "identifier" => info.default_import = Some(self.text(part).to_string()),
                    "namespace_import" => {
                        info.namespace_import = first_named_of_kind(part, "identifier")
                            .map(|ident| self.text(ident).to_string());
                    }
                    "named_imports" => {
                        let mut spec_cursor = part.walk();
                        for spec in part.named_children(&mut spec_cursor) {
                            if spec.kind() != "import_specifier" {
                                continue;
                            }
                            if let Some(name) = self.field_text(spec, "name") {
                                info.named.push(ImportSpecifier {
                                    name,
                                    alias: self.field_text(spec, "alias"),
                                });
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        self.imports.push(info);
    }

    fn visit_export(&mut self, node: Node, parent: Option<usize>, ctx: &DeclContext) {
        let line = node.start_position().row + 1;
        let is_default = has_token(node, "default");
        let source = node
            .child_by_field_name("source")
            .map(|s| unquote(self.text(s)));
        let decorators = self.decorators_of(node);

        let export_ctx = DeclContext {
            exported: true,
            default_export: is_default,
            declare: ctx.declare,
            decorators,
        };

        if let Some(declaration) = node.child_by_field_name("declaration") {
            let created = self.visit(declaration, parent, &export_ctx);
            if parent.is_none() {
                for idx in created {
                    self.exports.push(ExportInfo {
                        name: self.chunks[idx].name.clone(),
                        kind: if is_default {
                            ExportKind::Default
                        } else {
                            ExportKind::Declaration
                        },
                        source: None,
                        line,
                    });
                }
            }
            return;
        }

        if let Some(value) = node.child_by_field_name("value") {
            let name = match value.kind() {
                "identifier" => {
                    let name = self.text(value).to_string();
                    self.exported_locals.push(name.clone());
                    name
                }
                "class" => {
                    let created = self.extract_class(value, parent, &export_ctx);
                    created
                        .map(|idx| self.chunks[idx].name.clone())
                        .unwrap_or_else(|| "default".to_string())
                }
                "arrow_function" | "function_expression" | "function" => {
                    let name = self
                        .field_text(value, "name")
                        .unwrap_or_else(|| "default".to_string());
                    let created = self.extract_callable_value(node, value, &name, parent, &export_ctx);
                    created
                        .map(|idx| self.chunks[idx].name.clone())
                        .unwrap_or_else(|| "default".to_string())
                }
                _ => "default".to_string(),
            };
            if parent.is_none() {
                self.exports.push(ExportInfo {
                    name,
                    kind: ExportKind::Default,
                    source: None,
                    line,
                });
            }
            return;
        }

        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        let mut recorded = false;
        for child in children {
            match child.kind() {
                "export_clause" => {
                    let mut spec_cursor = child.walk();
                    for spec in child.named_children(&mut spec_cursor) {
                        if spec.kind() != "export_specifier" {
                            continue;
                        }
                        let Some(local) = self.field_text(spec, "name") else {
                            continue;
                        };
                        let exported = self.field_text(spec, "alias").unwrap_or_else(|| local.clone());
                        if source.is_none() {
                            self.exported_locals.push(local);
                        }
                        self.exports.push(ExportInfo {
                            name: exported,
                            kind: if source.is_some() {
                                ExportKind::ReExport
                            } else {
                                ExportKind::Named
                            },
                            source: source.clone(),
                            line,
                        });
                    }
                    recorded = true;
                }
                "namespace_export" => {
                    let name = first_named_of_kind(child, "identifier")
                        .map(|ident| self.text(ident).to_string())
                        .unwrap_or_else(|| "*".to_string());
                    self.exports.push(ExportInfo {
                        name,
                        kind: ExportKind::Star,
                        source: source.clone(),
                        line,
                    });
                    recorded = true;
                }
                "identifier" => {
                    // `export = Foo`
                    let name = self.text(child).to_string();
                    self.exported_locals.push(name.clone());
                    self.exports.push(ExportInfo {
                        name,
                        kind: ExportKind::Default,
                        source: None,
                        line,
                    });
                    recorded = true;
                }
                _ => {}
            }
        }

        if !recorded && has_token(node, "*") {
            self.exports.push(ExportInfo {
                name: "*".to_string(),
                kind: ExportKind::Star,
                source,
                line,
            });
        }
    }

    // ── Declarations ────────────────────────────────────────────────

    fn extract_class(&mut self, node: Node, parent: Option<usize>, ctx: &DeclContext) -> Option<usize> {
        let name = self
            .field_text(node, "name")
            .unwrap_or_else(|| "default".to_string());
        let body = node.child_by_field_name("body");

        let mut chunk = self.new_chunk(node, ChunkType::Class, &name, ctx);
        if node.kind() == "abstract_class_declaration" {
            chunk.modifiers.insert(Modifier::Abstract);
        }
        chunk.metadata.decorators = ctx
            .decorators
            .iter()
            .cloned()
            .chain(self.decorators_of(node))
            .collect();
        chunk.metadata.generics = self.generics_of(node);
        chunk.metadata.complexity = body.map_or(1, complexity_of);
        chunk.signature = Some(self.signature_until(node, body));
        chunk.dependencies = self.heritage_dependencies(node);

        let idx = self.push_chunk(chunk, parent);

        if let Some(body) = body {
            let member_ctx = DeclContext {
                declare: ctx.declare,
                ..Default::default()
            };
            let mut pending: Vec<String> = Vec::new();
            let mut cursor = body.walk();
            let members: Vec<_> = body.named_children(&mut cursor).collect();
            for member in members {
                match NodeKind::of(member.kind()) {
                    NodeKind::Decorator => pending.push(decorator_name(self.text(member))),
                    NodeKind::Method | NodeKind::Property => {
                        let decorators = std::mem::take(&mut pending);
                        self.visit(member, Some(idx), &member_ctx.with_decorators(decorators));
                    }
                    _ => pending.clear(),
                }
            }
        }

        self.add_type_uses(idx);
        Some(idx)
    }

    fn extract_interface(&mut self, node: Node, parent: Option<usize>, ctx: &DeclContext) -> Option<usize> {
        let name = self.field_text(node, "name")?;
        let body = node.child_by_field_name("body");

        let mut chunk = self.new_chunk(node, ChunkType::Interface, &name, ctx);
        chunk.metadata.generics = self.generics_of(node);
        chunk.signature = Some(self.signature_until(node, body));

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "extends_type_clause" {
                let mut type_cursor = child.walk();
                for ty in child.named_children(&mut type_cursor) {
                    let base = base_type_name(self.text(ty));
                    if !base.is_empty() {
                        push_unique(&mut chunk.dependencies, Dependency::new(base, DependencyKind::Extends));
                    }
                }
            }
        }

        let idx = self.push_chunk(chunk, parent);

        if let Some(body) = body {
            let member_ctx = DeclContext {
                declare: ctx.declare,
                ..Default::default()
            };
            self.visit_children(body, Some(idx), &member_ctx);
        }

        self.add_type_uses(idx);
        Some(idx)
    }

    fn extract_type_alias(&mut self, node: Node, parent: Option<usize>, ctx: &DeclContext) -> Option<usize> {
        let name = self.field_text(node, "name")?;
        let mut chunk = self.new_chunk(node, ChunkType::Type, &name, ctx);
        chunk.metadata.generics = self.generics_of(node);
        chunk.signature = Some(collapse_whitespace(self.text(node).trim_end_matches(';')));

        if let Some(value) = node.child_by_field_name("value") {
            let value_text = self.text(value);
            chunk.metadata.type_annotation = Some(collapse_whitespace(value_text));
            for type_name in referenced_type_names(value_text) {
                if type_name != name {
                    push_unique(
                        &mut chunk.dependencies,
                        Dependency::new(type_name, DependencyKind::Reference),
                    );
                }
            }
        }

        Some(self.push_chunk(chunk, parent))
    }

    fn extract_enum(&mut self, node: Node, parent: Option<usize>, ctx: &DeclContext) -> Option<usize> {
        let name = self.field_text(node, "name")?;
        let mut chunk = self.new_chunk(node, ChunkType::Enum, &name, ctx);
        if has_token(node, "const") {
            chunk.modifiers.insert(Modifier::Const);
        }
        chunk.signature = Some(self.signature_until(node, node.child_by_field_name("body")));
        Some(self.push_chunk(chunk, parent))
    }

    fn extract_function(&mut self, node: Node, parent: Option<usize>, ctx: &DeclContext) -> Option<usize> {
        let name = self
            .field_text(node, "name")
            .unwrap_or_else(|| "default".to_string());
        let mut chunk = self.new_chunk(node, ChunkType::Function, &name, ctx);
        self.fill_callable(&mut chunk, node, node);
        if node.kind() == "generator_function_declaration" {
            chunk.modifiers.insert(Modifier::Generator);
        }
        Some(self.push_chunk(chunk, parent))
    }

    fn extract_method(&mut self, node: Node, parent: Option<usize>, ctx: &DeclContext) -> Option<usize> {
        let parent_idx = parent?;
        let name = self.field_text(node, "name")?;

        let mut chunk = self.new_chunk(node, ChunkType::Method, &name, ctx);
        chunk.metadata.decorators = ctx.decorators.clone();
        self.fill_member_modifiers(&mut chunk, node);
        if node.kind() == "abstract_method_signature" {
            chunk.modifiers.insert(Modifier::Abstract);
        }
        self.fill_callable(&mut chunk, node, node);

        Some(self.push_chunk(chunk, Some(parent_idx)))
    }

    fn extract_property(&mut self, node: Node, parent: Option<usize>, ctx: &DeclContext) -> Option<usize> {
        let parent_idx = parent?;
        let name = self
            .field_text(node, "name")
            .or_else(|| self.field_text(node, "property"))?;

        let mut chunk = self.new_chunk(node, ChunkType::Property, &name, ctx);
        chunk.metadata.decorators = ctx
            .decorators
            .iter()
            .cloned()
            .chain(self.decorators_of(node))
            .collect();
        self.fill_member_modifiers(&mut chunk, node);

        if let Some(ty) = node.child_by_field_name("type") {
            let annotation = annotation_text(self.text(ty));
            for type_name in referenced_type_names(&annotation) {
                push_unique(&mut chunk.dependencies, Dependency::new(type_name, DependencyKind::Uses));
            }
            chunk.metadata.type_annotation = Some(annotation);
        }

        match node.child_by_field_name("value") {
            Some(value) if is_function_value(value.kind()) => self.fill_callable(&mut chunk, node, value),
            Some(value) => {
                chunk.metadata.complexity = complexity_of(value);
                if self.config.track_dependencies {
                    for dep in harvest_dependencies(value, self.source) {
                        push_unique(&mut chunk.dependencies, dep);
                    }
                }
            }
            None => chunk.metadata.complexity = 1,
        }

        let signature = chunk
            .metadata
            .type_annotation
            .as_ref()
            .map_or_else(|| name.clone(), |ty| format!("{name}: {ty}"));
        chunk.signature = Some(signature);

        Some(self.push_chunk(chunk, Some(parent_idx)))
    }

    /// `const a = 1, b = () => {}` produces one chunk per declarator
    fn extract_variables(&mut self, node: Node, parent: Option<usize>, ctx: &DeclContext) -> Vec<usize> {
        let keyword = if has_token(node, "const") {
            Some(Modifier::Const)
        } else if has_token(node, "let") {
            Some(Modifier::Let)
        } else if has_token(node, "var") {
            Some(Modifier::Var)
        } else {
            None
        };

        let mut cursor = node.walk();
        let declarators: Vec<_> = node
            .named_children(&mut cursor)
            .filter(|child| child.kind() == "variable_declarator")
            .collect();
        let single = declarators.len() == 1;

        let mut created = Vec::new();
        for declarator in declarators {
            let Some(name_node) = declarator.child_by_field_name("name") else {
                continue;
            };
            let name = self.text(name_node).to_string();
            // Span the whole statement for single declarators so docs and `export` line up
            let span = if single { node } else { declarator };
            let value = declarator.child_by_field_name("value");

            let idx = match value {
                Some(value) if is_function_value(value.kind()) => {
                    self.extract_callable_value(span, value, &name, parent, ctx)
                }
                _ => {
                    let mut chunk = self.new_chunk(span, ChunkType::Variable, &name, ctx);
                    if let Some(ty) = declarator.child_by_field_name("type") {
                        let annotation = annotation_text(self.text(ty));
                        for type_name in referenced_type_names(&annotation) {
                            push_unique(&mut chunk.dependencies, Dependency::new(type_name, DependencyKind::Uses));
                        }
                        chunk.metadata.type_annotation = Some(annotation);
                    }
                    chunk.metadata.complexity = value.map_or(1, complexity_of);
                    if let (Some(value), true) = (value, self.config.track_dependencies) {
                        for dep in harvest_dependencies(value, self.source) {
                            push_unique(&mut chunk.dependencies, dep);
                        }
                    }
                    chunk.signature = Some(collapse_whitespace(
                        self.text(declarator).lines().next().unwrap_or_default(),
                    ));
                    Some(self.push_chunk(chunk, parent))
                }
            };

            if let (Some(idx), Some(keyword)) = (idx, keyword) {
                self.chunks[idx].modifiers.insert(keyword);
            }
            created.extend(idx);
        }
        created
    }

    /// Function chunk for `const name = () => {}` or `export default function () {}`
    fn extract_callable_value(
        &mut self,
        span: Node,
        value: Node,
        name: &str,
        parent: Option<usize>,
        ctx: &DeclContext,
    ) -> Option<usize> {
        let mut chunk = self.new_chunk(span, ChunkType::Function, name, ctx);
        self.fill_callable(&mut chunk, span, value);
        Some(self.push_chunk(chunk, parent))
    }

    fn extract_namespace(
        &mut self,
        node: Node,
        parent: Option<usize>,
        ctx: &DeclContext,
        chunk_type: ChunkType,
    ) -> Option<usize> {
        let name = unquote(self.text(node.child_by_field_name("name")?));
        let body = node.child_by_field_name("body");

        let mut chunk = self.new_chunk(node, chunk_type, &name, ctx);
        chunk.signature = Some(self.signature_until(node, body));
        chunk.metadata.complexity = body.map_or(1, complexity_of);
        let idx = self.push_chunk(chunk, parent);

        if let Some(body) = body {
            let inner = DeclContext {
                declare: ctx.declare,
                ..Default::default()
            };
            self.visit_children(body, Some(idx), &inner);
        }
        Some(idx)
    }

    // ── Chunk assembly ──────────────────────────────────────────────

    fn new_chunk(&self, node: Node, chunk_type: ChunkType, name: &str, ctx: &DeclContext) -> Chunk {
        let start_line = node.start_position().row + 1;
        let mut end_line = node.end_position().row + 1;
        if node.end_position().column == 0 && end_line > start_line {
            end_line -= 1;
        }
        let end_line = end_line.min(self.total_lines).max(start_line);

        let mut modifiers = BTreeSet::new();
        if ctx.exported {
            modifiers.insert(Modifier::Export);
        }
        if ctx.default_export {
            modifiers.insert(Modifier::Default);
        }
        if ctx.declare {
            modifiers.insert(Modifier::Declare);
        }
        if has_token(node, "async") {
            modifiers.insert(Modifier::Async);
        }

        let content = if self.config.include_source {
            self.text(node).to_string()
        } else {
            String::new()
        };

        Chunk {
            id: String::new(),
            chunk_type,
            name: name.to_string(),
            file_path: self.file_path.to_string(),
            start_line,
            end_line,
            content,
            documentation: self.leading_documentation(node),
            signature: None,
            modifiers,
            dependencies: Vec::new(),
            exported: ctx.exported,
            parent: None,
            children: Vec::new(),
            metadata: ChunkMetadata {
                complexity: 1,
                line_count: end_line - start_line + 1,
                ..Default::default()
            },
        }
    }

    /// Assign identity, link to parent and store
    fn push_chunk(&mut self, mut chunk: Chunk, parent: Option<usize>) -> usize {
        let qualified = match parent {
            Some(p) => format!("{}.{}", self.qualified[p], chunk.name),
            None => chunk.name.clone(),
        };

        let mut id = Chunk::make_id(self.file_path, chunk.chunk_type, &qualified);
        if self.seen_ids.contains(&id) {
            id = format!("{id}:{}", chunk.start_line);
            let base = id.clone();
            let mut n = 2;
            while self.seen_ids.contains(&id) {
                id = format!("{base}#{n}");
                n += 1;
            }
        }
        self.seen_ids.insert(id.clone());
        chunk.id = id.clone();

        if let Some(p) = parent {
            chunk.parent = Some(self.chunks[p].id.clone());
            self.chunks[p].children.push(id);
        }

        self.chunks.push(chunk);
        self.qualified.push(qualified);
        self.chunks.len() - 1
    }

    /// Parameters, return type, generics, complexity, dependencies and signature
    fn fill_callable(&self, chunk: &mut Chunk, span: Node, callable: Node) {
        let body = callable.child_by_field_name("body");

        if let Some(params) = callable.child_by_field_name("parameters") {
            chunk.metadata.parameters = self.parameters_of(params);
        } else if let Some(param) = callable.child_by_field_name("parameter") {
            // `x => x * 2`
            chunk.metadata.parameters = vec![Parameter {
                name: self.text(param).to_string(),
                type_annotation: None,
                optional: false,
                access: None,
            }];
        }

        chunk.metadata.return_type = callable
            .child_by_field_name("return_type")
            .map(|ty| annotation_text(self.text(ty)));
        if chunk.metadata.generics.is_empty() {
            chunk.metadata.generics = self.generics_of(callable);
        }
        if has_token(callable, "async") {
            chunk.modifiers.insert(Modifier::Async);
        }

        chunk.metadata.complexity = body.map_or(1, complexity_of);

        if self.config.track_dependencies {
            if let Some(body) = body {
                for dep in harvest_dependencies(body, self.source) {
                    push_unique(&mut chunk.dependencies, dep);
                }
            }
            for param in &chunk.metadata.parameters {
                if let Some(ty) = &param.type_annotation {
                    for type_name in referenced_type_names(ty) {
                        push_unique(&mut chunk.dependencies, Dependency::new(type_name, DependencyKind::Uses));
                    }
                }
            }
        }

        let body_start = if span.id() == callable.id() {
            body
        } else {
            body.filter(|b| b.start_byte() >= span.start_byte() && b.end_byte() <= span.end_byte())
        };
        let signature = self.signature_until(span, body_start);
        chunk.signature = Some(signature.trim_end_matches("=>").trim_end().to_string());
    }

    fn fill_member_modifiers(&self, chunk: &mut Chunk, node: Node) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "accessibility_modifier" => {
                    chunk.metadata.access = AccessModifier::parse(self.text(child));
                }
                "override_modifier" | "override" => {
                    chunk.modifiers.insert(Modifier::Override);
                }
                "static" => {
                    chunk.modifiers.insert(Modifier::Static);
                }
                "readonly" => {
                    chunk.modifiers.insert(Modifier::Readonly);
                }
                "abstract" => {
                    chunk.modifiers.insert(Modifier::Abstract);
                }
                "declare" => {
                    chunk.modifiers.insert(Modifier::Declare);
                }
                "get" => {
                    chunk.modifiers.insert(Modifier::Getter);
                }
                "set" => {
                    chunk.modifiers.insert(Modifier::Setter);
                }
                "*" => {
                    chunk.modifiers.insert(Modifier::Generator);
                }
                "?" => {
                    chunk.modifiers.insert(Modifier::Optional);
                }
                _ => {}
            }
        }
        if chunk.metadata.access.is_none() && chunk.name.starts_with('#') {
            chunk.metadata.access = Some(AccessModifier::Private);
        }
    }

    /// Record `uses` dependencies on a class/interface for injected and property types
    fn add_type_uses(&mut self, idx: usize) {
        let own_name = self.chunks[idx].name.clone();
        let mut uses = Vec::new();
        for child_id in &self.chunks[idx].children {
            let Some(child) = self.chunks.iter().find(|c| &c.id == child_id) else {
                continue;
            };
            match child.chunk_type {
                ChunkType::Method if child.name == "constructor" => {
                    for param in &child.metadata.parameters {
                        if let Some(ty) = &param.type_annotation {
                            uses.extend(referenced_type_names(ty));
                        }
                    }
                }
                ChunkType::Property => {
                    if let Some(ty) = &child.metadata.type_annotation {
                        uses.extend(referenced_type_names(ty));
                    }
                }
                _ => {}
            }
        }
        let chunk = &mut self.chunks[idx];
        for name in uses {
            if name != own_name {
                push_unique(&mut chunk.dependencies, Dependency::new(name, DependencyKind::Uses));
            }
        }
    }

    // ── Node helpers ────────────────────────────────────────────────

    fn heritage_dependencies(&self, class: Node) -> Vec<Dependency> {
        let mut deps = Vec::new();
        let mut cursor = class.walk();
        for child in class.named_children(&mut cursor) {
            if child.kind() != "class_heritage" {
                continue;
            }
            let mut heritage_cursor = child.walk();
            let clauses: Vec<_> = child.named_children(&mut heritage_cursor).collect();
            for clause in clauses {
                let kind = match clause.kind() {
                    "extends_clause" => DependencyKind::Extends,
                    "implements_clause" => DependencyKind::Implements,
                    // javascript: `class A extends B` has the expression directly
                    _ => {
                        let base = base_type_name(self.text(clause));
                        if !base.is_empty() {
                            push_unique(&mut deps, Dependency::new(base, DependencyKind::Extends));
                        }
                        continue;
                    }
                };
                let mut clause_cursor = clause.walk();
                for target in clause.named_children(&mut clause_cursor) {
                    if target.kind() == "type_arguments" {
                        continue;
                    }
                    let base = base_type_name(self.text(target));
                    if !base.is_empty() {
                        push_unique(&mut deps, Dependency::new(base, kind));
                    }
                }
            }
        }
        deps
    }

    fn parameters_of(&self, params: Node) -> Vec<Parameter> {
        let mut cursor = params.walk();
        let nodes: Vec<_> = params.named_children(&mut cursor).collect();
        nodes
            .into_iter()
            .filter_map(|param| match param.kind() {
                "required_parameter" | "optional_parameter" => {
                    let name = self
                        .field_text(param, "pattern")
                        .unwrap_or_else(|| self.text(param).to_string());
                    let access = first_named_of_kind(param, "accessibility_modifier")
                        .and_then(|m| AccessModifier::parse(self.text(m)));
                    Some(Parameter {
                        name,
                        type_annotation: param
                            .child_by_field_name("type")
                            .map(|ty| annotation_text(self.text(ty))),
                        optional: param.kind() == "optional_parameter"
                            || param.child_by_field_name("value").is_some(),
                        access,
                    })
                }
                "assignment_pattern" => Some(Parameter {
                    name: self
                        .field_text(param, "left")
                        .unwrap_or_else(|| self.text(param).to_string()),
                    type_annotation: None,
                    optional: true,
                    access: None,
                }),
                "comment" | "decorator" => None,
                _ => Some(Parameter {
                    name: self.text(param).to_string(),
                    type_annotation: None,
                    optional: false,
                    access: None,
                }),
            })
            .collect()
    }

    fn generics_of(&self, node: Node) -> Vec<String> {
        let Some(params) = node.child_by_field_name("type_parameters") else {
            return Vec::new();
        };
        let mut cursor = params.walk();
        let nodes: Vec<_> = params.named_children(&mut cursor).collect();
        nodes
            .into_iter()
            .filter(|p| p.kind() == "type_parameter")
            .filter_map(|p| self.field_text(p, "name"))
            .collect()
    }

    fn decorators_of(&self, node: Node) -> Vec<String> {
        let mut cursor = node.walk();
        let nodes: Vec<_> = node.named_children(&mut cursor).collect();
        nodes
            .into_iter()
            .filter(|child| child.kind() == "decorator")
            .map(|child| decorator_name(self.text(child)))
            .collect()
    }

    /// Declaration header: text from the first non-decorator token up to the body
    fn signature_until(&self, node: Node, body: Option<Node>) -> String {
        let mut start = node.start_byte();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if matches!(child.kind(), "decorator" | "comment") {
                start = child.end_byte();
            } else {
                break;
            }
        }
        let end = body.map_or(node.end_byte(), |b| b.start_byte()).max(start);
        let header = collapse_whitespace(&self.source[start..end]);
        header
            .trim_end_matches(|c: char| c == '{' || c == ';' || c == '=' || c.is_whitespace())
            .to_string()
    }

    /// `/** ... */` comment directly above the node or its `export` wrapper
    fn leading_documentation(&self, node: Node) -> Option<String> {
        if !self.config.include_documentation {
            return None;
        }

        let mut anchor = node;
        if let Some(parent) = node.parent() {
            if parent.kind() == "export_statement" {
                anchor = parent;
            }
        }

        let mut prev = anchor.prev_named_sibling();
        while let Some(p) = prev {
            if p.kind() == "decorator" {
                prev = p.prev_named_sibling();
            } else {
                break;
            }
        }

        let comment = prev.filter(|p| p.kind() == "comment")?;
        if anchor.start_position().row > comment.end_position().row + 1 {
            return None;
        }
        let text = self.text(comment);
        if !text.starts_with("/**") {
            return None;
        }

        let mut doc = strip_doc_comment(text);
        let limit = self.config.max_documentation_chars;
        if limit > 0 && doc.chars().count() > limit {
            doc = doc.chars().take(limit).collect();
        }
        (!doc.is_empty()).then_some(doc)
    }

    /// Post-pass: apply `export { name }` lists and the external flag
    fn finish(&mut self) {
        for local in std::mem::take(&mut self.exported_locals) {
            for chunk in self.chunks.iter_mut() {
                if chunk.is_top_level() && chunk.name == local {
                    chunk.exported = true;
                    chunk.modifiers.insert(Modifier::Export);
                }
            }
        }

        let external_names: HashSet<&str> = self
            .imports
            .iter()
            .filter(|import| !import.is_relative())
            .flat_map(ImportInfo::local_names)
            .collect();
        if external_names.is_empty() {
            return;
        }
        for chunk in self.chunks.iter_mut() {
            for dep in chunk.dependencies.iter_mut() {
                if external_names.contains(dep.name.as_str()) {
                    dep.external = true;
                }
            }
        }
    }
}

// ── Free helpers ────────────────────────────────────────────────────

/// Cyclomatic-style count: 1 + branches + short-circuit operators
pub(crate) fn complexity_of(node: Node) -> u32 {
    let mut complexity = 1;
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        match current.kind() {
            "if_statement" | "for_statement" | "for_in_statement" | "while_statement"
            | "do_statement" | "switch_case" | "catch_clause" | "ternary_expression" => {
                complexity += 1;
            }
            "binary_expression" => {
                if let Some(op) = current.child_by_field_name("operator") {
                    if matches!(op.kind(), "&&" | "||" | "??") {
                        complexity += 1;
                    }
                }
            }
            _ => {}
        }
        let mut cursor = current.walk();
        stack.extend(current.children(&mut cursor));
    }
    complexity
}

/// Walk calls and property accesses, deduplicated by `(name, kind)`
pub(crate) fn harvest_dependencies(node: Node, source: &str) -> Vec<Dependency> {
    let text = |n: Node| &source[n.start_byte()..n.end_byte()];
    let mut deps = Vec::new();
    let mut seen: HashSet<(String, DependencyKind)> = HashSet::new();
    let mut record = |name: &str, kind: DependencyKind, deps: &mut Vec<Dependency>| {
        if name.is_empty() || BUILTIN_NAMES.contains(&name) {
            return;
        }
        if seen.insert((name.to_string(), kind)) {
            deps.push(Dependency::new(name, kind));
        }
    };

    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        match current.kind() {
            "call_expression" | "new_expression" => {
                let field = if current.kind() == "call_expression" {
                    "function"
                } else {
                    "constructor"
                };
                if let Some(target) = current.child_by_field_name(field) {
                    match target.kind() {
                        "identifier" => record(text(target), DependencyKind::Uses, &mut deps),
                        "member_expression" => {
                            if let Some(prop) = target.child_by_field_name("property") {
                                record(text(prop), DependencyKind::Uses, &mut deps);
                            }
                            if let Some(object) = target.child_by_field_name("object") {
                                stack.push(object);
                            }
                        }
                        _ => stack.push(target),
                    }
                }
                for other in ["arguments", "type_arguments"] {
                    if let Some(args) = current.child_by_field_name(other) {
                        stack.push(args);
                    }
                }
                continue;
            }
            "member_expression" => {
                if let Some(prop) = current.child_by_field_name("property") {
                    record(text(prop), DependencyKind::Reference, &mut deps);
                }
                if let Some(object) = current.child_by_field_name("object") {
                    if object.kind() == "identifier" {
                        record(text(object), DependencyKind::Reference, &mut deps);
                    } else {
                        stack.push(object);
                    }
                }
                continue;
            }
            _ => {}
        }
        let mut cursor = current.walk();
        let mut children: Vec<_> = current.children(&mut cursor).collect();
        // keep source order when popping
        children.reverse();
        stack.extend(children);
    }

    deps
}

fn is_function_value(kind: &str) -> bool {
    matches!(
        kind,
        "arrow_function" | "function_expression" | "function" | "generator_function"
    )
}

fn has_token(node: Node, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token);
    found
}

fn first_named_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|child| child.kind() == kind);
    found
}

fn push_unique(deps: &mut Vec<Dependency>, dep: Dependency) {
    if !deps.iter().any(|d| d.name == dep.name && d.kind == dep.kind) {
        deps.push(dep);
    }
}

fn unquote(text: &str) -> String {
    text.trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .to_string()
}

/// `: Promise<User>` -> `Promise<User>`
fn annotation_text(text: &str) -> String {
    collapse_whitespace(text.trim().trim_start_matches(':').trim())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `@Injectable({ scope })` -> `Injectable`
pub(crate) fn decorator_name(text: &str) -> String {
    let text = text.trim().trim_start_matches('@');
    let end = text.find('(').unwrap_or(text.len());
    text[..end].trim().to_string()
}

/// `ns.Base<T>` -> `Base`
pub(crate) fn base_type_name(text: &str) -> String {
    let text = text.trim();
    let end = text.find('<').unwrap_or(text.len());
    text[..end]
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Capitalised, non-builtin identifiers inside a type annotation
pub(crate) fn referenced_type_names(annotation: &str) -> Vec<String> {
    let mut names = Vec::new();
    for token in annotation.split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$')) {
        let starts_upper = token.chars().next().is_some_and(char::is_uppercase);
        if starts_upper
            && token.len() > 1
            && !BUILTIN_TYPES.contains(&token)
            && !names.iter().any(|n| n == token)
        {
            names.push(token.to_string());
        }
    }
    names
}

/// Strip `/**`, `*/` and leading `*` gutters
pub(crate) fn strip_doc_comment(text: &str) -> String {
    let inner = text
        .trim()
        .trim_start_matches("/**")
        .trim_end_matches("*/");
    let lines: Vec<&str> = inner
        .lines()
        .map(|line| {
            let line = line.trim();
            let line = line.strip_prefix('*').unwrap_or(line);
            line.strip_prefix(' ').unwrap_or(line).trim_end()
        })
        .collect();

    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(start, |i| i + 1);
    lines[start..end].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn analyze(code: &str) -> Extraction {
        let mut analyzer = AstAnalyzer::new(ChunkerConfig::default(), Language::TypeScript).unwrap();
        analyzer.analyze(code, "src/sample.ts").unwrap()
    }

    fn find<'a>(extraction: &'a Extraction, name: &str) -> &'a Chunk {
        extraction
            .chunks
            .iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("chunk {name} not found"))
    }

    #[test]
    fn test_class_with_members() {
        let code = r#"
/**
 * Stores users.
 */
export class UserStore extends BaseStore<User> implements Store {
    private readonly items: User[] = [];
    static instance?: UserStore;

    constructor(private readonly db: Database) {
        super();
    }

    async find(id: string): Promise<User | undefined> {
        if (!id) {
            return undefined;
        }
        return this.items.find((u) => u.id === id) ?? this.db.load(id);
    }
}
"#;
        let extraction = analyze(code);
        let class = find(&extraction, "UserStore");
        assert_eq!(class.chunk_type, ChunkType::Class);
        assert!(class.exported);
        assert_eq!(class.documentation.as_deref(), Some("Stores users."));
        assert_eq!(class.id, "src/sample.ts:class:UserStore");
        assert!(class
            .dependencies
            .contains(&Dependency::new("BaseStore", DependencyKind::Extends)));
        assert!(class
            .dependencies
            .contains(&Dependency::new("Store", DependencyKind::Implements)));
        assert!(class.depends_on("Database"));
        assert!(class.depends_on("User"));
        assert_eq!(class.children.len(), 4);

        let find_method = find(&extraction, "find");
        assert_eq!(find_method.id, "src/sample.ts:method:UserStore.find");
        assert_eq!(find_method.parent.as_deref(), Some(class.id.as_str()));
        assert!(find_method.has_modifier(Modifier::Async));
        assert_eq!(find_method.metadata.return_type.as_deref(), Some("Promise<User | undefined>"));
        // if + `??`
        assert_eq!(find_method.metadata.complexity, 3);
        assert!(find_method.depends_on("load"));

        let items = find(&extraction, "items");
        assert_eq!(items.chunk_type, ChunkType::Property);
        assert_eq!(items.metadata.access, Some(AccessModifier::Private));
        assert!(items.has_modifier(Modifier::Readonly));

        let ctor = find(&extraction, "constructor");
        assert_eq!(ctor.metadata.parameters[0].name, "db");
        assert_eq!(ctor.metadata.parameters[0].access, Some(AccessModifier::Private));
        assert_eq!(
            ctor.metadata.parameters[0].type_annotation.as_deref(),
            Some("Database")
        );
    }

    #[test]
    fn test_imports_and_exports() {
        let code = r#"
import React, { useState as useLocalState } from 'react';
import * as path from "path";
import type { User } from './user';

const helper = () => 1;
export { helper };
export * from './shared';
export default function App() { return null; }
"#;
        let extraction = analyze(code);
        assert_eq!(extraction.imports.len(), 3);
        let react = &extraction.imports[0];
        assert_eq!(react.default_import.as_deref(), Some("React"));
        assert_eq!(react.named[0].local_name(), "useLocalState");
        assert_eq!(extraction.imports[1].namespace_import.as_deref(), Some("path"));
        assert!(extraction.imports[2].type_only);

        assert!(find(&extraction, "helper").exported);
        let kinds: Vec<_> = extraction.exports.iter().map(|e| (e.name.as_str(), e.kind)).collect();
        assert!(kinds.contains(&("helper", ExportKind::Named)));
        assert!(kinds.contains(&("*", ExportKind::Star)));
        assert!(kinds.contains(&("App", ExportKind::Default)));
    }

    #[test]
    fn test_interfaces_types_enums_namespaces() {
        let code = r#"
export interface Order extends Entity {
    id: string;
    lines: OrderLine[];
    total(): number;
}
export type OrderId = string | Brand<Order>;
export enum Status { Open, Closed }
namespace Billing {
    export function charge(order: Order) {}
}
"#;
        let extraction = analyze(code);
        let order = find(&extraction, "Order");
        assert_eq!(order.chunk_type, ChunkType::Interface);
        assert!(order
            .dependencies
            .contains(&Dependency::new("Entity", DependencyKind::Extends)));
        assert!(order.depends_on("OrderLine"));
        assert_eq!(order.children.len(), 3);

        assert_eq!(find(&extraction, "OrderId").chunk_type, ChunkType::Type);
        assert_eq!(find(&extraction, "Status").chunk_type, ChunkType::Enum);

        let billing = find(&extraction, "Billing");
        assert_eq!(billing.chunk_type, ChunkType::Namespace);
        let charge = find(&extraction, "charge");
        assert_eq!(charge.parent.as_deref(), Some(billing.id.as_str()));
        assert!(charge.exported);
    }

    #[test]
    fn test_duplicate_names_get_unique_ids() {
        let code = "function a() {}\nfunction a() {}\n";
        let extraction = analyze(code);
        let ids: HashSet<_> = extraction.chunks.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_helpers() {
        assert_eq!(decorator_name("@Injectable({ providedIn: 'root' })"), "Injectable");
        assert_eq!(base_type_name("ns.Base<T>"), "Base");
        assert_eq!(
            referenced_type_names("Promise<Map<string, Order[]>> | OrderLine"),
            vec!["Order".to_string(), "OrderLine".to_string()]
        );
        assert_eq!(strip_doc_comment("/**\n * Hello\n *   world\n */"), "Hello\n  world");
    }
}
