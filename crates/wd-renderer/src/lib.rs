//! Rule-based markdown renderer.
//!
//! This crate wraps `pulldown-cmark` in a [`MarkdownParser`] whose rendering of
//! fenced code, headings and `:::` containers is delegated to replaceable
//! rules. Rules receive a per-pass [`RenderEnv`] through which they report
//! table of contents entries and warnings.
//!
//! # Architecture
//!
//! - [`MarkdownParser`]: configuration surface (`&mut`) and render entry point (`&self`)
//! - [`rules`]: the rule traits and the default rules installed on every parser
//! - [`RenderEnv`]: state for one render pass, turned into [`Rendered`] at the end
//!
//! Container syntax and source rules are applied to the text before it is
//! parsed; everything else is handled while walking parser events.
//!
//! # Example
//!
//! ```
//! use wd_renderer::{Heading, HeadingBlock, MarkdownParser, RenderEnv, RuleError, slugify};
//!
//! let mut parser = MarkdownParser::new();
//! parser.set_heading_rule(
//!     |heading: &HeadingBlock, env: &mut RenderEnv, out: &mut String| -> Result<(), RuleError> {
//!         let slug = env.unique_slug(&slugify(&heading.text));
//!         out.push_str(&format!("<h{0} id=\"{slug}\">{1}</h{0}>", heading.level, heading.html));
//!         env.toc.push(Heading::new(&heading.text, slug, heading.level));
//!         Ok(())
//!     },
//! );
//!
//! let rendered = parser.render_document("# Hello\n\n**Bold** text").unwrap();
//! assert_eq!(rendered.html, r#"<h1 id="hello">Hello</h1><p><strong>Bold</strong> text</p>"#);
//! assert_eq!(rendered.toc[0].slug, "hello");
//! ```

mod container;
mod env;
mod fence;
mod html;
mod parser;
mod renderer;
pub mod rules;
mod state;

pub use container::ContainerBlock;
pub use env::{Heading, RenderEnv, Rendered, slugify};
pub use fence::{CodeBlock, parse_fence_info};
pub use html::{AlertKind, alert_end, alert_start, container_alert_start};
pub use parser::{MarkdownParser, ParserOptions};
pub use rules::{
    ContainerRule, FenceRule, HeadingBlock, HeadingRule, RuleError, SourceRule, write_plain_code,
};
pub use state::escape_html;
