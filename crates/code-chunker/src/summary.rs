use crate::types::{Chunk, ExportInfo, ExportKind, FileSummary, ImportInfo};
use std::collections::BTreeSet;

/// Classification of one physical source line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Code,
    Comment,
    Blank,
}

/// Line counts from a single pass over raw text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineCounts {
    pub total: usize,
    pub code: usize,
    pub comment: usize,
    pub blank: usize,
}

/// Classify every line of `content`, carrying block-comment state across lines.
///
/// A line counts as code when any non-whitespace character sits outside a
/// comment, so `foo(); /* note */` is code and `/* a */ /* b */` is comment.
pub fn count_lines(content: &str) -> LineCounts {
    let mut counts = LineCounts::default();
    let mut in_block = false;

    for line in content.lines() {
        counts.total += 1;
        match classify_line(line, &mut in_block) {
            LineKind::Code => counts.code += 1,
            LineKind::Comment => counts.comment += 1,
            LineKind::Blank => counts.blank += 1,
        }
    }

    counts
}

/// Classify one line, updating the block-comment state
pub fn classify_line(line: &str, in_block: &mut bool) -> LineKind {
    let chars: Vec<char> = line.trim().chars().collect();
    if chars.is_empty() {
        return if *in_block {
            LineKind::Comment
        } else {
            LineKind::Blank
        };
    }

    let mut has_code = false;
    let mut has_comment = false;
    let mut i = 0;

    while i < chars.len() {
        if *in_block {
            has_comment = true;
            if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                *in_block = false;
                i += 2;
            } else {
                i += 1;
            }
            continue;
        }

        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match (c, next) {
            ('/', Some('/')) => {
                has_comment = true;
                break;
            }
            ('/', Some('*')) => {
                has_comment = true;
                *in_block = true;
                i += 2;
            }
            ('"' | '\'' | '`', _) => {
                has_code = true;
                i = skip_string(&chars, i);
            }
            _ => {
                if !c.is_whitespace() {
                    has_code = true;
                }
                i += 1;
            }
        }
    }

    if has_code {
        LineKind::Code
    } else if has_comment {
        LineKind::Comment
    } else {
        LineKind::Blank
    }
}

/// Index just past the closing quote of the string starting at `start`
fn skip_string(chars: &[char], start: usize) -> usize {
    let quote = chars[start];
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

/// Assemble the per-file summary
pub fn build_summary(
    content: &str,
    chunks: &[Chunk],
    imports: &[ImportInfo],
    exports: &[ExportInfo],
) -> FileSummary {
    let counts = count_lines(content);

    let mut summary = FileSummary {
        total_lines: counts.total,
        code_lines: counts.code,
        comment_lines: counts.comment,
        blank_lines: counts.blank,
        ..Default::default()
    };

    for chunk in chunks {
        *summary.chunk_types.entry(chunk.chunk_type).or_insert(0) += 1;
        if chunk.chunk_type.is_callable() {
            summary.complexity += chunk.metadata.complexity;
        }
    }

    let mut exported: BTreeSet<String> = chunks
        .iter()
        .filter(|chunk| chunk.is_top_level() && chunk.exported)
        .map(|chunk| chunk.name.clone())
        .collect();
    for export in exports {
        if matches!(export.kind, ExportKind::Named | ExportKind::ReExport) {
            exported.insert(export.name.clone());
        }
    }
    summary.exports = exported.into_iter().collect();

    let external: BTreeSet<String> = imports
        .iter()
        .filter_map(ImportInfo::package_name)
        .collect();
    summary.external_dependencies = external.into_iter().collect();

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn counts_multiline_block_comments() {
        let source = "/**\n * Docs\n */\nconst a = 1;\n\n// trailing\n";
        let counts = count_lines(source);
        assert_eq!(
            counts,
            LineCounts {
                total: 6,
                code: 1,
                comment: 4,
                blank: 1,
            }
        );
    }

    #[test]
    fn same_line_block_comment_does_not_leak_state() {
        let mut in_block = false;
        assert_eq!(classify_line("/* one-liner */", &mut in_block), LineKind::Comment);
        assert!(!in_block);
        assert_eq!(classify_line("let x = 1;", &mut in_block), LineKind::Code);
    }

    #[test]
    fn code_around_comments_is_code() {
        let mut in_block = false;
        assert_eq!(classify_line("foo(); /* start", &mut in_block), LineKind::Code);
        assert!(in_block);
        assert_eq!(classify_line("still comment", &mut in_block), LineKind::Comment);
        assert_eq!(classify_line("end */ bar();", &mut in_block), LineKind::Code);
        assert!(!in_block);
    }

    #[test]
    fn comment_markers_inside_strings_are_code() {
        let mut in_block = false;
        assert_eq!(
            classify_line("const url = \"http://example.com/*\";", &mut in_block),
            LineKind::Code
        );
        assert!(!in_block);
    }

    proptest! {
        #[test]
        fn proptest_line_kinds_partition_total(lines in prop::collection::vec("[a-z/* ]{0,12}", 0..40)) {
            let content = lines.join("\n");
            let counts = count_lines(&content);
            prop_assert_eq!(counts.code + counts.comment + counts.blank, counts.total);
            prop_assert_eq!(counts.total, content.lines().count());
        }
    }
}
