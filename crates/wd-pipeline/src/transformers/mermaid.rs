use std::sync::Arc;

use wd_renderer::{CodeBlock, FenceRule, MarkdownParser, RenderEnv, RuleError, escape_html};

use crate::transformer::{SetupError, Transformer};

/// Renders `mermaid` fences as `<div class="mermaid">` for client-side
/// rendering. Other fences go to the previously installed rule.
#[derive(Debug, Default, Clone, Copy)]
pub struct MermaidTransformer;

impl Transformer for MermaidTransformer {
    fn name(&self) -> &str {
        "mermaid"
    }

    fn priority(&self) -> i32 {
        70
    }

    fn apply(&self, parser: &mut MarkdownParser) -> Result<(), SetupError> {
        let previous = parser.fence_rule();
        parser.set_fence_rule(MermaidFence { previous });
        Ok(())
    }
}

struct MermaidFence {
    previous: Arc<dyn FenceRule>,
}

impl FenceRule for MermaidFence {
    fn render(
        &self,
        block: &CodeBlock,
        env: &mut RenderEnv,
        out: &mut String,
    ) -> Result<(), RuleError> {
        if block.lang() != "mermaid" {
            return self.previous.render(block, env, out);
        }
        out.push_str(r#"<div class="mermaid">"#);
        out.push_str(&escape_html(&block.content));
        out.push_str("</div>");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parser() -> MarkdownParser {
        let mut parser = MarkdownParser::new();
        MermaidTransformer.apply(&mut parser).unwrap();
        parser
    }

    #[test]
    fn test_mermaid_block() {
        let html = parser()
            .render_document("```mermaid\ngraph TD\n  A --> B\n```")
            .unwrap()
            .html;
        assert_eq!(html, "<div class=\"mermaid\">graph TD\n  A --&gt; B\n</div>");
    }

    #[test]
    fn test_other_languages_fall_through() {
        let html = parser()
            .render_document("```js\nlet a;\n```")
            .unwrap()
            .html;
        assert_eq!(html, "<pre><code class=\"language-js\">let a;\n</code></pre>");
    }
}
