use codewiki_chunker::Chunk;
use unicode_segmentation::UnicodeSegmentation;

/// Words with no discriminating value, including TypeScript keywords and
/// primitive type names
pub static STOP_WORDS: &[&str] = &[
    // English
    "the", "and", "for", "with", "from", "this", "that", "these", "those", "are", "was", "were",
    "will", "into", "onto", "its", "has", "have", "had", "not", "but", "all", "any", "can", "may",
    "should", "would", "could", "when", "then", "than", "each", "which", "who", "what", "where",
    "how", "also", "only", "use", "used", "uses", "using", "given", "returns", "return", "param",
    "see", "example",
    // Language keywords
    "const", "let", "var", "function", "class", "interface", "type", "enum", "namespace",
    "module", "declare", "export", "import", "default", "new", "extends", "implements", "public",
    "private", "protected", "readonly", "static", "abstract", "override", "async", "await",
    "yield", "typeof", "keyof", "instanceof", "void", "null", "undefined", "true", "false",
    "get", "set",
    // Primitive and utility types
    "string", "number", "boolean", "bigint", "symbol", "object", "unknown", "never", "promise",
    "array", "record", "partial", "readonlyarray", "required", "omit", "pick",
];

/// Minimum token length kept
const MIN_TOKEN_LEN: usize = 3;

/// Split one word on underscores and case boundaries (`HTTPServer` -> HTTP, Server)
pub fn split_identifier(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut parts = Vec::new();
    let mut current = String::new();

    for (idx, &ch) in chars.iter().enumerate() {
        if !ch.is_alphanumeric() {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
            continue;
        }
        if idx > 0 && !current.is_empty() && ch.is_uppercase() {
            let prev = chars[idx - 1];
            let next_is_lower = chars.get(idx + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary {
                parts.push(std::mem::take(&mut current));
            }
        }
        current.push(ch);
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Lowercased content tokens of free text or code identifiers
pub fn tokenize(text: &str) -> Vec<String> {
    text.unicode_words()
        .flat_map(split_identifier)
        .map(|part| part.to_lowercase())
        .filter(|token| {
            token.chars().count() >= MIN_TOKEN_LEN && !STOP_WORDS.contains(&token.as_str())
        })
        .collect()
}

/// Text describing a chunk: name, documentation, signature, parameters, return type
pub fn chunk_text(chunk: &Chunk) -> String {
    let mut parts: Vec<&str> = vec![chunk.name.as_str()];
    if let Some(doc) = &chunk.documentation {
        parts.push(doc);
    }
    if let Some(signature) = &chunk.signature {
        parts.push(signature);
    }
    for param in &chunk.metadata.parameters {
        parts.push(&param.name);
        if let Some(ty) = &param.type_annotation {
            parts.push(ty);
        }
    }
    if let Some(ret) = &chunk.metadata.return_type {
        parts.push(ret);
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_identifier() {
        assert_eq!(split_identifier("getUserById"), vec!["get", "User", "By", "Id"]);
        assert_eq!(split_identifier("HTTPServer"), vec!["HTTP", "Server"]);
        assert_eq!(split_identifier("user_id"), vec!["user", "id"]);
        assert_eq!(split_identifier("v2Api"), vec!["v2", "Api"]);
    }

    #[test]
    fn test_tokenize_drops_noise() {
        assert_eq!(
            tokenize("async findUserByEmail(email: string): Promise<User>"),
            vec!["find", "user", "email", "email", "user"]
        );
        assert!(tokenize("a an of to by").is_empty());
        assert!(tokenize("").is_empty());
    }
}
