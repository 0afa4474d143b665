use wd_renderer::{
    Heading, HeadingBlock, HeadingRule, MarkdownParser, RenderEnv, RuleError, slugify,
};

use crate::transformer::{SetupError, Transformer};

/// Adds `id` attributes and permalinks to headings and records every heading
/// in the table of contents.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnchorTransformer;

impl Transformer for AnchorTransformer {
    fn name(&self) -> &str {
        "anchor"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn apply(&self, parser: &mut MarkdownParser) -> Result<(), SetupError> {
        parser.set_heading_rule(AnchorRule);
        Ok(())
    }
}

/// Slug used when a heading has no ASCII alphanumerics.
const FALLBACK_SLUG: &str = "section";

struct AnchorRule;

impl HeadingRule for AnchorRule {
    fn render(
        &self,
        heading: &HeadingBlock,
        env: &mut RenderEnv,
        out: &mut String,
    ) -> Result<(), RuleError> {
        let base = slugify(&heading.text);
        let base = if base.is_empty() {
            FALLBACK_SLUG
        } else {
            base.as_str()
        };
        let slug = env.unique_slug(base);
        let level = heading.level;

        out.push_str(&format!(
            r##"<h{level} id="{slug}" tabindex="-1"><a class="header-anchor" href="#{slug}" aria-hidden="true">#</a> {}</h{level}>"##,
            heading.html
        ));
        env.toc.push(Heading::new(&heading.text, slug, level));
        Ok(())
    }
}
