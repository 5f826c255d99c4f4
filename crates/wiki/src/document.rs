use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// YAML header of every generated page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
    pub title: String,
    /// Serialized as RFC 3339 (ISO-8601)
    pub generated: DateTime<Utc>,
    pub description: String,
    /// Paths of linked documents, relative to the wiki root
    #[serde(default)]
    pub related: Vec<String>,
    /// Source files the page was derived from
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Frontmatter {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        generated: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            generated,
            description: description.into(),
            related: Vec::new(),
            sources: Vec::new(),
            tags: Vec::new(),
            category: None,
        }
    }

    #[must_use]
    pub fn related(mut self, related: impl IntoIterator<Item = String>) -> Self {
        self.related.extend(related);
        self
    }

    #[must_use]
    pub fn sources(mut self, sources: impl IntoIterator<Item = String>) -> Self {
        self.sources.extend(sources);
        self
    }

    #[must_use]
    pub fn tags<'a>(mut self, tags: impl IntoIterator<Item = &'a str>) -> Self {
        self.tags.extend(tags.into_iter().map(ToString::to_string));
        self
    }

    #[must_use]
    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }
}

/// A `##` section of a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

/// One generated page: frontmatter plus ordered sections.
///
/// The title lives only in the frontmatter; the body starts at the first section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WikiDocument {
    /// Path relative to the output root, e.g. `patterns/repository.md`
    pub path: PathBuf,
    pub frontmatter: Frontmatter,
    pub sections: Vec<Section>,
}

impl WikiDocument {
    pub fn new(path: impl Into<PathBuf>, frontmatter: Frontmatter) -> Self {
        Self {
            path: path.into(),
            frontmatter,
            sections: Vec::new(),
        }
    }

    /// Append a section; blank bodies are dropped
    #[must_use]
    pub fn section(mut self, heading: impl Into<String>, body: impl Into<String>) -> Self {
        let body = body.into();
        if !body.trim().is_empty() {
            self.sections.push(Section {
                heading: heading.into(),
                body: body.trim_end().to_string(),
            });
        }
        self
    }

    pub fn title(&self) -> &str {
        &self.frontmatter.title
    }

    /// Markdown without the frontmatter
    pub fn body(&self) -> String {
        let mut md = String::new();
        for section in &self.sections {
            if !md.is_empty() {
                md.push('\n');
            }
            md.push_str(&format!("## {}\n\n{}\n", section.heading, section.body));
        }
        md
    }

    /// Full page text: `---`, YAML, `---`, blank line, body
    pub fn render(&self) -> Result<String> {
        let yaml = serde_yaml::to_string(&self.frontmatter)?;
        let mut out = String::with_capacity(yaml.len() + 256);
        out.push_str("---\n");
        out.push_str(&yaml);
        if !yaml.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("---\n\n");
        out.push_str(&self.body());
        Ok(out)
    }
}

/// Split rendered text into its YAML header and body
pub fn split_frontmatter(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix("---\n")?;
    let end = rest.find("\n---\n")?;
    let yaml = &rest[..=end];
    let body = rest[end + "\n---\n".len()..].trim_start_matches('\n');
    Some((yaml, body))
}

/// Parse the header of a rendered page
pub fn parse_frontmatter(text: &str) -> Result<Option<Frontmatter>> {
    match split_frontmatter(text) {
        Some((yaml, _)) => Ok(Some(serde_yaml::from_str(yaml)?)),
        None => Ok(None),
    }
}

/// Deterministic file-name slug: ASCII lowercase words joined by single hyphens.
///
/// camelCase boundaries become hyphens, so `UserService` and `user service`
/// share a slug. Text with no ASCII letters or digits maps to `page`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            let boundary = ch.is_ascii_uppercase()
                && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit());
            if boundary && !slug.ends_with('-') {
                slug.push('-');
            }
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
        prev = Some(ch);
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "page".to_string()
    } else {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Repository Pattern"), "repository-pattern");
        assert_eq!(slugify("UserService"), "user-service");
        assert_eq!(slugify("src/users/user.repository.ts"), "src-users-user-repository-ts");
        assert_eq!(slugify("  --Hello,   World!--  "), "hello-world");
        assert_eq!(slugify("Ünïcödé"), "n-c-d");
        assert_eq!(slugify("日本"), "page");
    }

    #[test]
    fn test_render_has_frontmatter_and_no_title_heading() {
        let doc = WikiDocument::new(
            "overview.md",
            Frontmatter::new("Overview", "Project overview", at())
                .related(["index.md".to_string()])
                .tags(["overview"])
                .category("overview"),
        )
        .section("Summary", "Two files.\n")
        .section("Empty", "   ");

        let text = doc.render().unwrap();
        assert!(text.starts_with("---\ntitle: Overview\n"));
        assert!(text.contains("2024-05-01T12:00:00Z"));
        assert!(!text.contains("# Overview"));
        assert!(!text.contains("## Empty"));

        let (_, body) = split_frontmatter(&text).unwrap();
        assert_eq!(body, "## Summary\n\nTwo files.\n");

        let parsed = parse_frontmatter(&text).unwrap().unwrap();
        assert_eq!(parsed, doc.frontmatter);
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let doc = WikiDocument::new("a.md", Frontmatter::new("A", "a", at()));
        let text = doc.render().unwrap();
        assert!(!text.contains("tags:"));
        assert!(!text.contains("category:"));
        assert!(text.contains("related:"));
        assert_eq!(parse_frontmatter("no header").unwrap(), None);
    }
}
