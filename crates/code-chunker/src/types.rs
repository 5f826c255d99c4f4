use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A semantic unit extracted from one source file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Identity in the form `file:type:name`
    pub id: String,

    /// Kind of declaration this chunk represents
    pub chunk_type: ChunkType,

    /// Declared name (unqualified)
    pub name: String,

    /// Source file (relative to the analysis base)
    pub file_path: String,

    /// Start line (1-indexed)
    pub start_line: usize,

    /// End line (1-indexed, inclusive)
    pub end_line: usize,

    /// Verbatim source text of the declaration
    pub content: String,

    /// Leading documentation comment with markers stripped
    pub documentation: Option<String>,

    /// Rendered one-line signature
    pub signature: Option<String>,

    /// Declaration modifiers (async, static, readonly, ...)
    #[serde(default)]
    pub modifiers: BTreeSet<Modifier>,

    /// Names this chunk depends on
    #[serde(default)]
    pub dependencies: Vec<Dependency>,

    /// Whether the declaration is exported from its file
    pub exported: bool,

    /// Id of the enclosing chunk (class or namespace)
    pub parent: Option<String>,

    /// Ids of directly nested chunks
    #[serde(default)]
    pub children: Vec<String>,

    /// Structural metadata
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Build the composite identity used for chunk ids
    #[must_use]
    pub fn make_id(file_path: &str, chunk_type: ChunkType, name: &str) -> String {
        format!("{file_path}:{}:{name}", chunk_type.as_str())
    }

    /// Get the number of lines in this chunk
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }

    /// Check if chunk contains a specific line
    #[must_use]
    pub const fn contains_line(&self, line: usize) -> bool {
        line >= self.start_line && line <= self.end_line
    }

    #[must_use]
    pub const fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }

    #[must_use]
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// Private or protected members, including `#private` names and `_underscored` ones
    #[must_use]
    pub fn is_non_public(&self) -> bool {
        matches!(
            self.metadata.access,
            Some(AccessModifier::Private | AccessModifier::Protected)
        ) || self.name.starts_with('#')
            || self.name.starts_with('_')
    }

    /// Check whether the chunk already records a dependency
    #[must_use]
    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies.iter().any(|dep| dep.name == name)
    }
}

/// Type of chunk based on semantic meaning
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ChunkType {
    Class,
    Interface,
    Type,
    Enum,
    Function,
    Method,
    Property,
    Variable,
    Import,
    Export,
    Namespace,
    Module,
}

impl ChunkType {
    /// Get human-readable name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Type => "type",
            Self::Enum => "enum",
            Self::Function => "function",
            Self::Method => "method",
            Self::Property => "property",
            Self::Variable => "variable",
            Self::Import => "import",
            Self::Export => "export",
            Self::Namespace => "namespace",
            Self::Module => "module",
        }
    }

    /// Class-like declarations that define a type
    #[must_use]
    pub const fn is_type_like(self) -> bool {
        matches!(self, Self::Class | Self::Interface | Self::Type | Self::Enum)
    }

    /// Declarations that have a callable body
    #[must_use]
    pub const fn is_callable(self) -> bool {
        matches!(self, Self::Function | Self::Method)
    }

    /// Declarations that may contain nested chunks
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(
            self,
            Self::Class | Self::Interface | Self::Namespace | Self::Module
        )
    }
}

impl std::fmt::Display for ChunkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declaration modifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Modifier {
    Export,
    Default,
    Declare,
    Abstract,
    Static,
    Readonly,
    Async,
    Generator,
    Override,
    Optional,
    Const,
    Let,
    Var,
    Getter,
    Setter,
}

/// Member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessModifier {
    Public,
    Private,
    Protected,
}

impl AccessModifier {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "public" => Some(Self::Public),
            "private" => Some(Self::Private),
            "protected" => Some(Self::Protected),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Protected => "protected",
        }
    }
}

/// Relation between a chunk and a name it refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyKind {
    Import,
    Reference,
    Extends,
    Implements,
    Uses,
}

impl DependencyKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Reference => "reference",
            Self::Extends => "extends",
            Self::Implements => "implements",
            Self::Uses => "uses",
        }
    }
}

/// A name referenced by a chunk
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub kind: DependencyKind,
    /// True when the name was imported from a package rather than a relative path
    pub external: bool,
}

impl Dependency {
    pub fn new(name: impl Into<String>, kind: DependencyKind) -> Self {
        Self {
            name: name.into(),
            kind,
            external: false,
        }
    }
}

/// A declared parameter of a function, method or constructor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_annotation: Option<String>,
    pub optional: bool,
    /// Set for constructor parameter properties (`private readonly repo: Repo`)
    pub access: Option<AccessModifier>,
}

/// Structural metadata about a chunk
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// Branch count seeded at 1
    pub complexity: u32,

    /// Number of source lines
    pub line_count: usize,

    #[serde(default)]
    pub parameters: Vec<Parameter>,

    pub return_type: Option<String>,

    /// Decorator names without the leading `@` or call arguments
    #[serde(default)]
    pub decorators: Vec<String>,

    /// Generic parameter names
    #[serde(default)]
    pub generics: Vec<String>,

    pub access: Option<AccessModifier>,

    /// Property or variable type annotation
    pub type_annotation: Option<String>,
}

/// A single named import binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSpecifier {
    pub name: String,
    pub alias: Option<String>,
}

impl ImportSpecifier {
    /// Name bound in the importing file
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// An import declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportInfo {
    /// Module specifier as written (`./user.repository`, `react`)
    pub source: String,
    #[serde(default)]
    pub named: Vec<ImportSpecifier>,
    pub default_import: Option<String>,
    pub namespace_import: Option<String>,
    pub type_only: bool,
    pub line: usize,
}

impl ImportInfo {
    /// Relative specifiers point into the analysed codebase
    #[must_use]
    pub fn is_relative(&self) -> bool {
        matches!(self.source.as_str(), "." | "..")
            || self.source.starts_with("./")
            || self.source.starts_with("../")
    }

    /// All names this import binds locally
    pub fn local_names(&self) -> impl Iterator<Item = &str> {
        self.default_import
            .as_deref()
            .into_iter()
            .chain(self.namespace_import.as_deref())
            .chain(self.named.iter().map(ImportSpecifier::local_name))
    }

    /// Package name for external imports (`@scope/pkg/sub` -> `@scope/pkg`)
    #[must_use]
    pub fn package_name(&self) -> Option<String> {
        if self.is_relative() {
            return None;
        }
        let mut parts = self.source.split('/');
        let first = parts.next()?;
        if first.starts_with('@') {
            parts.next().map(|second| format!("{first}/{second}"))
        } else {
            Some(first.to_string())
        }
    }
}

/// How a name leaves its file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportKind {
    /// `export class Foo {}`
    Declaration,
    /// `export { foo, bar as baz }`
    Named,
    /// `export default ...`
    Default,
    /// `export { foo } from './foo'`
    ReExport,
    /// `export * from './foo'`
    Star,
}

/// An export record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportInfo {
    pub name: String,
    pub kind: ExportKind,
    pub source: Option<String>,
    pub line: usize,
}

/// Per-file summary statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileSummary {
    pub total_lines: usize,
    pub code_lines: usize,
    pub comment_lines: usize,
    pub blank_lines: usize,
    /// Sum of top-level and nested callable complexity
    pub complexity: u32,
    /// Chunk count per chunk type
    pub chunk_types: BTreeMap<ChunkType, usize>,
    /// Top-level exported names
    pub exports: Vec<String>,
    /// External package names this file imports
    pub external_dependencies: Vec<String>,
}

/// Everything extracted from one source file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileAnalysis {
    pub file_path: String,
    pub relative_path: String,
    pub language: Language,
    pub chunks: Vec<Chunk>,
    pub imports: Vec<ImportInfo>,
    pub exports: Vec<ExportInfo>,
    pub summary: FileSummary,
}

impl FileAnalysis {
    /// Look up a chunk by id
    #[must_use]
    pub fn chunk(&self, id: &str) -> Option<&Chunk> {
        self.chunks.iter().find(|chunk| chunk.id == id)
    }

    pub fn top_level_chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter().filter(|chunk| chunk.is_top_level())
    }

    /// Direct children of a chunk in declaration order
    pub fn children_of<'a>(&'a self, parent: &'a Chunk) -> impl Iterator<Item = &'a Chunk> {
        parent.children.iter().filter_map(move |id| self.chunk(id))
    }

    /// Directory containing the file, relative to the analysis base (`.` for the root)
    #[must_use]
    pub fn directory(&self) -> String {
        match self.relative_path.rfind('/') {
            Some(idx) => self.relative_path[..idx].to_string(),
            None => ".".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import(source: &str) -> ImportInfo {
        ImportInfo {
            source: source.to_string(),
            named: vec![ImportSpecifier {
                name: "a".into(),
                alias: Some("b".into()),
            }],
            default_import: Some("D".into()),
            namespace_import: None,
            type_only: false,
            line: 1,
        }
    }

    #[test]
    fn test_make_id() {
        assert_eq!(
            Chunk::make_id("src/user.ts", ChunkType::Class, "User"),
            "src/user.ts:class:User"
        );
    }

    #[test]
    fn test_import_helpers() {
        let relative = import("./user");
        assert!(relative.is_relative());
        assert_eq!(relative.package_name(), None);
        assert_eq!(relative.local_names().collect::<Vec<_>>(), vec!["D", "b"]);

        assert_eq!(
            import("@nestjs/common/decorators").package_name().as_deref(),
            Some("@nestjs/common")
        );
        assert_eq!(import("lodash/fp").package_name().as_deref(), Some("lodash"));
    }

    #[test]
    fn test_parent_directory_import_is_relative() {
        for source in [".", "..", "../..", "./index"] {
            assert!(import(source).is_relative(), "{source}");
            assert_eq!(import(source).package_name(), None);
        }
        assert!(!import("..lib").is_relative());
    }

    #[test]
    fn test_chunk_type_groups() {
        assert!(ChunkType::Class.is_type_like());
        assert!(ChunkType::Method.is_callable());
        assert!(ChunkType::Namespace.is_container());
        assert!(!ChunkType::Variable.is_container());
    }
}
