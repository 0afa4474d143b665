use std::sync::Arc;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use wd_renderer::{CodeBlock, FenceRule, MarkdownParser, RenderEnv, RuleError};

use crate::transformer::{SetupError, Transformer};

/// Characters escaped by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const BUTTON_CLASS: &str = "copy-code-button absolute top-2 right-2 p-1.5 rounded-md bg-gray-800/70 text-white text-xs opacity-0 group-hover:opacity-100 transition-opacity focus:opacity-100";

/// Wraps every rendered code fence with a copy-to-clipboard button.
///
/// The raw code is carried percent-encoded in the button's `data-code`
/// attribute so the client can decode it with `decodeURIComponent`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CodeCopyTransformer;

impl Transformer for CodeCopyTransformer {
    fn name(&self) -> &str {
        "code-copy"
    }

    fn priority(&self) -> i32 {
        50
    }

    fn apply(&self, parser: &mut MarkdownParser) -> Result<(), SetupError> {
        let previous = parser.fence_rule();
        parser.set_fence_rule(CodeCopyFence { previous });
        Ok(())
    }
}

struct CodeCopyFence {
    previous: Arc<dyn FenceRule>,
}

impl FenceRule for CodeCopyFence {
    fn render(
        &self,
        block: &CodeBlock,
        env: &mut RenderEnv,
        out: &mut String,
    ) -> Result<(), RuleError> {
        let encoded = utf8_percent_encode(&block.content, URI_COMPONENT);
        out.push_str(&format!(
            r#"<div class="code-block-wrapper relative group"><button class="{BUTTON_CLASS}" data-code="{encoded}">Copy</button>"#
        ));
        self.previous.render(block, env, out)?;
        out.push_str("</div>");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transformers::MermaidTransformer;

    #[test]
    fn test_encodes_like_encode_uri_component() {
        let encoded = utf8_percent_encode("a b&c=\"d\"\n(e)!*'~é", URI_COMPONENT).to_string();
        assert_eq!(encoded, "a%20b%26c%3D%22d%22%0A(e)!*'~%C3%A9");
    }

    #[test]
    fn test_wraps_previous_rule() {
        let mut parser = MarkdownParser::new();
        CodeCopyTransformer.apply(&mut parser).unwrap();
        let html = parser
            .render_document("```sh\necho <hi>\n```")
            .unwrap()
            .html;
        assert!(html.starts_with(r#"<div class="code-block-wrapper relative group"><button class="copy-code-button"#));
        assert!(html.contains(r#"data-code="echo%20%3Chi%3E%0A">Copy</button>"#));
        assert!(html.ends_with(
            "<pre><code class=\"language-sh\">echo &lt;hi&gt;\n</code></pre></div>"
        ));
    }

    #[test]
    fn test_wraps_mermaid_too() {
        let mut parser = MarkdownParser::new();
        MermaidTransformer.apply(&mut parser).unwrap();
        CodeCopyTransformer.apply(&mut parser).unwrap();
        let html = parser
            .render_document("```mermaid\nA\n```")
            .unwrap()
            .html;
        assert!(html.contains(r#"data-code="A%0A">Copy</button><div class="mermaid">A"#));
    }

    #[test]
    fn test_indented_code_not_wrapped() {
        let mut parser = MarkdownParser::new();
        CodeCopyTransformer.apply(&mut parser).unwrap();
        let html = parser.render_document("    code\n").unwrap().html;
        assert!(!html.contains("copy-code-button"));
    }
}
