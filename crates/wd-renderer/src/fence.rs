//! Fenced code blocks as seen by the fence rule.

use std::collections::HashMap;

/// A fenced code block handed to the fence rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeBlock {
    /// Language identifier (first word of the info string), if any.
    pub language: Option<String>,
    /// Full info string after the opening fence.
    pub info: String,
    /// Attributes parsed from the info string (`key=value` pairs).
    pub attrs: HashMap<String, String>,
    /// Raw content, including the trailing newline.
    pub content: String,
    /// Zero-based index of this block among fenced blocks in the document.
    pub index: usize,
}

impl CodeBlock {
    /// Build a code block from a fence info string and its content.
    #[must_use]
    pub fn new(info: &str, content: impl Into<String>, index: usize) -> Self {
        let (language, attrs) = parse_fence_info(info);
        Self {
            language: (!language.is_empty()).then_some(language),
            info: info.trim().to_owned(),
            attrs,
            content: content.into(),
            index,
        }
    }

    /// Language identifier or empty string.
    #[must_use]
    pub fn lang(&self) -> &str {
        self.language.as_deref().unwrap_or("")
    }
}

/// Parse fence info string into language and attributes.
///
/// Format: `language [key=value ...]`
#[must_use]
pub fn parse_fence_info(info: &str) -> (String, HashMap<String, String>) {
    let mut parts = info.split_whitespace();
    let language = parts.next().unwrap_or("").to_owned();

    let mut attrs = HashMap::new();
    for part in parts {
        if let Some((key, value)) = part.split_once('=') {
            let value = value.trim_matches('"').trim_matches('\'');
            attrs.insert(key.to_owned(), value.to_owned());
        }
    }

    (language, attrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fence_info_language_only() {
        let (lang, attrs) = parse_fence_info("rust");
        assert_eq!(lang, "rust");
        assert!(attrs.is_empty());
    }

    #[test]
    fn test_parse_fence_info_with_attrs() {
        let (lang, attrs) = parse_fence_info("mermaid theme=dark title='Flow'");
        assert_eq!(lang, "mermaid");
        assert_eq!(attrs.get("theme"), Some(&"dark".to_owned()));
        assert_eq!(attrs.get("title"), Some(&"Flow".to_owned()));
    }

    #[test]
    fn test_parse_fence_info_empty() {
        let (lang, attrs) = parse_fence_info("   ");
        assert_eq!(lang, "");
        assert!(attrs.is_empty());
    }

    #[test]
    fn test_code_block_without_language() {
        let block = CodeBlock::new("", "plain\n", 0);
        assert_eq!(block.language, None);
        assert_eq!(block.lang(), "");
    }
}
