//! Render environment and render output types.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Table of contents entry.
///
/// Serialized with both `depth` and `level` keys, which always carry the same
/// value. Deserialization reads `level` and falls back to `depth`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "HeadingRepr", try_from = "HeadingRepr")]
pub struct Heading {
    /// Heading text without markup.
    pub title: String,
    /// Anchor ID for linking.
    pub slug: String,
    /// Heading level (1-6).
    pub level: u8,
}

impl Heading {
    /// Create a heading entry.
    #[must_use]
    pub fn new(title: impl Into<String>, slug: impl Into<String>, level: u8) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            level,
        }
    }

    /// Alias for [`level`](Self::level), kept for consumers reading `depth`.
    #[must_use]
    pub fn depth(&self) -> u8 {
        self.level
    }
}

#[derive(Serialize, Deserialize)]
struct HeadingRepr {
    title: String,
    slug: String,
    #[serde(default)]
    depth: Option<u8>,
    #[serde(default)]
    level: Option<u8>,
}

impl From<Heading> for HeadingRepr {
    fn from(heading: Heading) -> Self {
        Self {
            title: heading.title,
            slug: heading.slug,
            depth: Some(heading.level),
            level: Some(heading.level),
        }
    }
}

impl TryFrom<HeadingRepr> for Heading {
    type Error = String;

    fn try_from(repr: HeadingRepr) -> Result<Self, Self::Error> {
        let level = repr
            .level
            .or(repr.depth)
            .ok_or_else(|| "heading requires `level` or `depth`".to_owned())?;
        Ok(Self {
            title: repr.title,
            slug: repr.slug,
            level,
        })
    }
}

/// Output of one render pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rendered {
    /// Rendered HTML.
    pub html: String,
    /// Headings in document order.
    pub toc: Vec<Heading>,
}

/// Mutable state attached to a single render pass.
///
/// Rules receive the environment so they can append table of contents
/// entries or warnings. A new environment is created for every pass and never
/// shared between passes.
#[derive(Debug, Default)]
pub struct RenderEnv {
    /// Table of contents, appended by the heading rule.
    pub toc: Vec<Heading>,
    /// Free-form sidecar for custom rules.
    pub meta: BTreeMap<String, serde_json::Value>,
    /// Non-fatal problems found during the pass.
    pub warnings: Vec<String>,
    slug_counts: HashMap<String, usize>,
}

impl RenderEnv {
    /// Create an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a slug unique within this pass.
    ///
    /// The first occurrence keeps the base slug; repeats get `-1`, `-2`, ...
    pub fn unique_slug(&mut self, base: &str) -> String {
        let count = self.slug_counts.entry(base.to_owned()).or_default();
        let slug = match *count {
            0 => base.to_owned(),
            n => format!("{base}-{n}"),
        };
        *count += 1;
        slug
    }

    /// Record a non-fatal warning.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(warning = %message, "Render warning");
        self.warnings.push(message);
    }

    /// Split the environment into the render output.
    #[must_use]
    pub fn into_rendered(self, html: String) -> Rendered {
        Rendered {
            html,
            toc: self.toc,
        }
    }
}

/// Convert heading text to a URL fragment.
///
/// Lowercases ASCII letters and replaces every run of characters that are not
/// ASCII alphanumerics with a single hyphen. Leading and trailing hyphens are
/// dropped.
///
/// # Examples
///
/// ```
/// use wd_renderer::slugify;
///
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("snake_case name"), "snake-case-name");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !result.is_empty() {
                result.push('-');
            }
            pending_dash = false;
            result.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Spaces  "), "spaces");
        assert_eq!(slugify("What's New?"), "what-s-new");
        assert_eq!(slugify("kebab--case"), "kebab-case");
        assert_eq!(slugify("v1.2 Release"), "v1-2-release");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_non_ascii_collapses() {
        assert_eq!(slugify("Über Café"), "ber-caf");
    }

    #[test]
    fn test_unique_slug() {
        let mut env = RenderEnv::new();
        assert_eq!(env.unique_slug("faq"), "faq");
        assert_eq!(env.unique_slug("faq"), "faq-1");
        assert_eq!(env.unique_slug("faq"), "faq-2");
        assert_eq!(env.unique_slug("other"), "other");
    }

    #[test]
    fn test_heading_serializes_depth_and_level() {
        let heading = Heading::new("Intro", "intro", 2);
        let json = serde_json::to_value(&heading).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"title": "Intro", "slug": "intro", "depth": 2, "level": 2})
        );
    }

    #[test]
    fn test_heading_deserializes_from_depth_only() {
        let heading: Heading =
            serde_json::from_str(r#"{"title":"A","slug":"a","depth":3}"#).unwrap();
        assert_eq!(heading.level, 3);
        assert_eq!(heading.depth(), 3);
    }

    #[test]
    fn test_heading_without_level_rejected() {
        let result: Result<Heading, _> = serde_json::from_str(r#"{"title":"A","slug":"a"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_warn_records_message() {
        let mut env = RenderEnv::new();
        env.warn("missing include");
        assert_eq!(env.warnings, vec!["missing include".to_owned()]);
    }
}
