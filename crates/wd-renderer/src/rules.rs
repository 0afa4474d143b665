//! Render rules: the hook points a parser exposes to transformers.
//!
//! Each hook point holds exactly one handler. Installing a rule replaces the
//! previous one; a rule that wants to extend the current behavior reads the
//! installed handler first and delegates to it.

use std::borrow::Cow;
use std::error::Error;

use crate::container::ContainerBlock;
use crate::env::RenderEnv;
use crate::fence::CodeBlock;
use crate::state::escape_html;

/// Error raised by a rule during a render pass.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// The rule failed with an underlying error.
    #[error("{rule} rule failed: {source}")]
    Failed {
        /// Name of the failing rule.
        rule: String,
        /// Underlying error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The rule failed with a message.
    #[error("{rule} rule failed: {message}")]
    Message {
        /// Name of the failing rule.
        rule: String,
        /// Failure description.
        message: String,
    },
}

impl RuleError {
    /// Wrap an underlying error.
    pub fn failed(rule: impl Into<String>, source: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self::Failed {
            rule: rule.into(),
            source: source.into(),
        }
    }

    /// Create an error from a message.
    pub fn message(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Message {
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// Name of the rule that failed.
    #[must_use]
    pub fn rule(&self) -> &str {
        match self {
            Self::Failed { rule, .. } | Self::Message { rule, .. } => rule,
        }
    }
}

/// Heading content handed to the heading rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadingBlock {
    /// Heading level (1-6).
    pub level: u8,
    /// Plain text, used for slugs and the table of contents.
    pub text: String,
    /// Rendered inline HTML.
    pub html: String,
}

/// Renders fenced code blocks.
pub trait FenceRule: Send + Sync {
    /// Write the HTML for `block` to `out`.
    fn render(
        &self,
        block: &CodeBlock,
        env: &mut RenderEnv,
        out: &mut String,
    ) -> Result<(), RuleError>;
}

impl<F> FenceRule for F
where
    F: Fn(&CodeBlock, &mut RenderEnv, &mut String) -> Result<(), RuleError> + Send + Sync,
{
    fn render(
        &self,
        block: &CodeBlock,
        env: &mut RenderEnv,
        out: &mut String,
    ) -> Result<(), RuleError> {
        self(block, env, out)
    }
}

/// Renders headings.
pub trait HeadingRule: Send + Sync {
    /// Write the HTML for `heading` to `out`.
    fn render(
        &self,
        heading: &HeadingBlock,
        env: &mut RenderEnv,
        out: &mut String,
    ) -> Result<(), RuleError>;
}

impl<F> HeadingRule for F
where
    F: Fn(&HeadingBlock, &mut RenderEnv, &mut String) -> Result<(), RuleError> + Send + Sync,
{
    fn render(
        &self,
        heading: &HeadingBlock,
        env: &mut RenderEnv,
        out: &mut String,
    ) -> Result<(), RuleError> {
        self(heading, env, out)
    }
}

/// Renders the opening and closing of a `:::kind` container.
pub trait ContainerRule: Send + Sync {
    /// Write the opening markup.
    fn open(
        &self,
        container: &ContainerBlock,
        env: &mut RenderEnv,
        out: &mut String,
    ) -> Result<(), RuleError>;

    /// Write the closing markup.
    fn close(
        &self,
        container: &ContainerBlock,
        env: &mut RenderEnv,
        out: &mut String,
    ) -> Result<(), RuleError>;
}

/// Rewrites the markdown source before it is parsed.
///
/// Source rules run in registration order. Return [`Cow::Borrowed`] when the
/// source is unchanged.
pub trait SourceRule: Send + Sync {
    /// Transform `source`.
    fn apply<'a>(&self, source: &'a str, env: &mut RenderEnv)
    -> Result<Cow<'a, str>, RuleError>;
}

/// Fence rule installed on every new parser.
///
/// Produces `<pre><code class="language-x">` with escaped content.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultFence;

impl FenceRule for DefaultFence {
    fn render(
        &self,
        block: &CodeBlock,
        _env: &mut RenderEnv,
        out: &mut String,
    ) -> Result<(), RuleError> {
        write_plain_code(block.language.as_deref(), &block.content, out);
        Ok(())
    }
}

/// Heading rule installed on every new parser: `<hN>` without an ID.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHeading;

impl HeadingRule for DefaultHeading {
    fn render(
        &self,
        heading: &HeadingBlock,
        _env: &mut RenderEnv,
        out: &mut String,
    ) -> Result<(), RuleError> {
        let level = heading.level;
        out.push_str(&format!("<h{level}>{}</h{level}>", heading.html));
        Ok(())
    }
}

/// Container rule used when a container type is registered without a
/// renderer of its own.
///
/// Renders `<div class="custom-container {kind}">` with a title paragraph.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultContainer;

impl ContainerRule for DefaultContainer {
    fn open(
        &self,
        container: &ContainerBlock,
        _env: &mut RenderEnv,
        out: &mut String,
    ) -> Result<(), RuleError> {
        out.push_str(&format!(
            r#"<div class="custom-container {}"><p class="custom-container-title">{}</p>"#,
            escape_html(&container.kind),
            escape_html(&container.display_title()),
        ));
        Ok(())
    }

    fn close(
        &self,
        _container: &ContainerBlock,
        _env: &mut RenderEnv,
        out: &mut String,
    ) -> Result<(), RuleError> {
        out.push_str("</div>");
        Ok(())
    }
}

/// Write a code block without highlighting.
pub fn write_plain_code(lang: Option<&str>, content: &str, out: &mut String) {
    match lang {
        Some(lang) => out.push_str(&format!(
            r#"<pre><code class="language-{}">{}</code></pre>"#,
            escape_html(lang),
            escape_html(content)
        )),
        None => out.push_str(&format!("<pre><code>{}</code></pre>", escape_html(content))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_fence_with_language() {
        let mut out = String::new();
        let block = CodeBlock::new("rust", "fn main() {}\n", 0);
        DefaultFence
            .render(&block, &mut RenderEnv::new(), &mut out)
            .unwrap();
        assert_eq!(
            out,
            "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>"
        );
    }

    #[test]
    fn test_default_fence_escapes() {
        let mut out = String::new();
        let block = CodeBlock::new("", "<b>", 0);
        DefaultFence
            .render(&block, &mut RenderEnv::new(), &mut out)
            .unwrap();
        assert_eq!(out, "<pre><code>&lt;b&gt;</code></pre>");
    }

    #[test]
    fn test_default_heading_has_no_id() {
        let mut out = String::new();
        let heading = HeadingBlock {
            level: 3,
            text: "Title".to_owned(),
            html: "<em>Title</em>".to_owned(),
        };
        DefaultHeading
            .render(&heading, &mut RenderEnv::new(), &mut out)
            .unwrap();
        assert_eq!(out, "<h3><em>Title</em></h3>");
    }

    #[test]
    fn test_default_container_title() {
        let mut out = String::new();
        let mut env = RenderEnv::new();
        let container = ContainerBlock::new("tip", None);
        DefaultContainer.open(&container, &mut env, &mut out).unwrap();
        DefaultContainer.close(&container, &mut env, &mut out).unwrap();
        assert_eq!(
            out,
            r#"<div class="custom-container tip"><p class="custom-container-title">Tip</p></div>"#
        );
    }

    #[test]
    fn test_closure_as_fence_rule() {
        let rule = |block: &CodeBlock, _env: &mut RenderEnv, out: &mut String| -> Result<(), RuleError> {
            out.push_str(block.lang());
            Ok(())
        };
        let mut out = String::new();
        rule.render(&CodeBlock::new("sh", "", 0), &mut RenderEnv::new(), &mut out)
            .unwrap();
        assert_eq!(out, "sh");
    }

    #[test]
    fn test_rule_error_names_rule() {
        let err = RuleError::message("highlighter", "theme missing");
        assert_eq!(err.rule(), "highlighter");
        assert_eq!(err.to_string(), "highlighter rule failed: theme missing");
    }
}
