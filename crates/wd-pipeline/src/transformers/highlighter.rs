use std::sync::Arc;

use wd_renderer::{CodeBlock, FenceRule, MarkdownParser, RenderEnv, RuleError};

use crate::highlight::{DEFAULT_THEME, Highlighter};
use crate::transformer::{SetupError, Transformer};

/// Highlights fenced code with a pre-loaded [`Highlighter`].
///
/// Fences in languages the highlighter does not know are rendered by the
/// previously installed rule.
#[derive(Debug, Clone)]
pub struct HighlighterTransformer {
    highlighter: Arc<Highlighter>,
    theme: String,
}

impl HighlighterTransformer {
    /// Use the default theme.
    pub fn new(highlighter: Arc<Highlighter>) -> Self {
        Self::with_theme(highlighter, DEFAULT_THEME)
    }

    pub fn with_theme(highlighter: Arc<Highlighter>, theme: impl Into<String>) -> Self {
        Self {
            highlighter,
            theme: theme.into(),
        }
    }
}

impl Transformer for HighlighterTransformer {
    fn name(&self) -> &str {
        "highlighter"
    }

    fn priority(&self) -> i32 {
        200
    }

    fn apply(&self, parser: &mut MarkdownParser) -> Result<(), SetupError> {
        if self.highlighter.theme(&self.theme).is_none() {
            return Err(SetupError::UnknownTheme {
                theme: self.theme.clone(),
                available: self.highlighter.theme_names(),
            });
        }
        let fallback = parser.fence_rule();
        parser.set_fence_rule(HighlightFence {
            highlighter: Arc::clone(&self.highlighter),
            theme: self.theme.clone(),
            fallback,
        });
        Ok(())
    }
}

struct HighlightFence {
    highlighter: Arc<Highlighter>,
    theme: String,
    fallback: Arc<dyn FenceRule>,
}

impl FenceRule for HighlightFence {
    fn render(
        &self,
        block: &CodeBlock,
        env: &mut RenderEnv,
        out: &mut String,
    ) -> Result<(), RuleError> {
        match self
            .highlighter
            .highlight(&block.content, block.lang(), &self.theme)
        {
            Ok(Some(html)) => {
                out.push_str(&html);
                Ok(())
            }
            Ok(None) => self.fallback.render(block, env, out),
            Err(e) => Err(RuleError::failed("highlighter", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::LazyLock;

    static HIGHLIGHTER: LazyLock<Arc<Highlighter>> =
        LazyLock::new(|| Arc::new(Highlighter::load_defaults()));

    #[test]
    fn test_known_language_highlighted() {
        let mut parser = MarkdownParser::new();
        HighlighterTransformer::new(Arc::clone(&HIGHLIGHTER))
            .apply(&mut parser)
            .unwrap();
        let html = parser
            .render_document("```rust\nlet x = 1;\n```")
            .unwrap()
            .html;
        assert!(html.starts_with(r#"<pre class="highlight""#));
        assert!(html.contains(r#"<code class="language-rust">"#));
    }

    #[test]
    fn test_unknown_language_falls_back() {
        let mut parser = MarkdownParser::new();
        HighlighterTransformer::new(Arc::clone(&HIGHLIGHTER))
            .apply(&mut parser)
            .unwrap();
        let html = parser
            .render_document("```nosuchlang\nx\n```")
            .unwrap()
            .html;
        assert_eq!(html, "<pre><code class=\"language-nosuchlang\">x\n</code></pre>");
    }

    #[test]
    fn test_missing_theme_fails_setup() {
        let mut parser = MarkdownParser::new();
        let err = HighlighterTransformer::with_theme(Arc::clone(&HIGHLIGHTER), "vitesse-light")
            .apply(&mut parser)
            .unwrap_err();
        assert!(matches!(err, SetupError::UnknownTheme { ref theme, .. } if theme == "vitesse-light"));
    }
}
