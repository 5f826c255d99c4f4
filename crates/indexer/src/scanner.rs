use crate::error::Result;
use codewiki_chunker::{is_supported_path, SUPPORTED_EXTENSIONS};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory names skipped unless the caller overrides the ignore list
pub const DEFAULT_IGNORES: &[&str] = &[
    "node_modules",
    "dist",
    "build",
    "coverage",
    ".git",
    ".next",
    "out",
];

/// Which files a scan picks up, as globs relative to the scan root
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScanOptions {
    /// Files must match at least one include glob
    pub include: Vec<String>,

    /// Paths matching any ignore glob (or bare directory name) are pruned
    pub ignore: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            include: SUPPORTED_EXTENSIONS
                .iter()
                .map(|ext| format!("**/*.{ext}"))
                .collect(),
            ignore: DEFAULT_IGNORES.iter().map(ToString::to_string).collect(),
        }
    }
}

impl ScanOptions {
    /// Replace the include globs; an empty list keeps the defaults
    #[must_use]
    pub fn with_include(mut self, include: Vec<String>) -> Self {
        if !include.is_empty() {
            self.include = include;
        }
        self
    }

    /// Add ignore globs on top of the current list
    #[must_use]
    pub fn with_ignore(mut self, ignore: impl IntoIterator<Item = String>) -> Self {
        for pattern in ignore {
            if !self.ignore.contains(&pattern) {
                self.ignore.push(pattern);
            }
        }
        self
    }
}

/// Compiled include/ignore matchers
struct Matchers {
    include: GlobSet,
    ignore: GlobSet,
}

impl Matchers {
    fn compile(options: &ScanOptions) -> Result<Self> {
        let mut include = GlobSetBuilder::new();
        for pattern in &options.include {
            include.add(Glob::new(pattern)?);
        }

        let mut ignore = GlobSetBuilder::new();
        for pattern in &options.ignore {
            // a bare name such as `node_modules` matches that directory at any depth
            if is_bare_name(pattern) {
                ignore.add(Glob::new(&format!("**/{pattern}"))?);
                ignore.add(Glob::new(&format!("**/{pattern}/**"))?);
            } else {
                ignore.add(Glob::new(pattern)?);
            }
        }

        Ok(Self {
            include: include.build()?,
            ignore: ignore.build()?,
        })
    }
}

fn is_bare_name(pattern: &str) -> bool {
    !pattern.contains(['/', '*', '?', '[', '{'])
}

/// Scanner for finding source files in a project
pub struct FileScanner {
    root: PathBuf,
    options: ScanOptions,
}

impl FileScanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            options: ScanOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scan the root for matching source files, sorted by path
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        let matchers = Matchers::compile(&self.options)?;
        let ignore_set = matchers.ignore.clone();
        let root = self.root.clone();

        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true);
        builder.filter_entry(move |entry| {
            match entry.path().strip_prefix(&root) {
                Ok(relative) if !relative.as_os_str().is_empty() => !ignore_set.is_match(relative),
                _ => true,
            }
        });

        let mut files = Vec::new();
        for result in builder.build() {
            match result {
                Ok(entry) => {
                    let Some(file_type) = entry.file_type() else {
                        continue;
                    };
                    if !file_type.is_file() {
                        continue;
                    }

                    let path = entry.path();
                    let Ok(relative) = path.strip_prefix(&self.root) else {
                        continue;
                    };
                    if !matchers.include.is_match(relative) || !is_supported_path(path) {
                        continue;
                    }

                    files.push(path.to_path_buf());
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        files.sort();
        log::info!("Found {} source files under {}", files.len(), self.root.display());
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn relative(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn skips_default_ignored_directories() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        for dir in ["src/users", "node_modules/pkg", "dist", "packages/app/build"] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        fs::write(root.join("src/users/user.ts"), "export class User {}").unwrap();
        fs::write(root.join("src/index.js"), "export {}").unwrap();
        fs::write(root.join("src/readme.md"), "# docs").unwrap();
        fs::write(root.join("node_modules/pkg/index.ts"), "export {}").unwrap();
        fs::write(root.join("dist/bundle.js"), "").unwrap();
        fs::write(root.join("packages/app/build/out.ts"), "").unwrap();

        let files = FileScanner::new(root).scan().unwrap();
        assert_eq!(
            relative(root, &files),
            vec!["src/index.js".to_string(), "src/users/user.ts".to_string()]
        );
    }

    #[test]
    fn custom_include_and_ignore_globs() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("src/api")).unwrap();
        fs::write(root.join("src/api/client.ts"), "").unwrap();
        fs::write(root.join("src/api/client.spec.ts"), "").unwrap();
        fs::write(root.join("src/app.js"), "").unwrap();

        let options = ScanOptions::default()
            .with_include(vec!["src/**/*.ts".to_string()])
            .with_ignore(vec!["**/*.spec.ts".to_string()]);
        let files = FileScanner::new(root).with_options(options).scan().unwrap();
        assert_eq!(relative(root, &files), vec!["src/api/client.ts".to_string()]);
    }

    #[test]
    fn invalid_glob_is_an_error() {
        let temp = tempdir().unwrap();
        let options = ScanOptions {
            include: vec!["src/[".to_string()],
            ignore: Vec::new(),
        };
        assert!(FileScanner::new(temp.path()).with_options(options).scan().is_err());
    }

    #[test]
    fn bare_names_are_recognised() {
        assert!(is_bare_name("node_modules"));
        assert!(!is_bare_name("**/*.spec.ts"));
        assert!(!is_bare_name("src/generated"));
    }
}
