//! Markdown parser configuration and rendering entry point.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use pulldown_cmark::{Options, Parser};

use crate::container::{Containers, expand_containers};
use crate::env::{RenderEnv, Rendered};
use crate::renderer::RenderPass;
use crate::rules::{
    ContainerRule, DefaultContainer, DefaultFence, DefaultHeading, FenceRule, HeadingRule,
    RuleError, SourceRule,
};

/// Parser options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParserOptions {
    /// Enable GitHub Flavored Markdown (tables, strikethrough, task lists).
    pub gfm: bool,
    /// Pass raw HTML through. When disabled, raw HTML is escaped.
    pub html: bool,
    /// Render `> [!NOTE]` style blockquotes as alerts. Off by default, so
    /// such blockquotes stay plain blockquotes.
    pub alerts: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            html: true,
            alerts: false,
        }
    }
}

impl ParserOptions {
    fn to_cmark(self) -> Options {
        let mut options = Options::empty();
        if self.gfm {
            options |= Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS;
        }
        if self.alerts {
            options |= Options::ENABLE_GFM;
        }
        options
    }
}

/// Markdown parser with replaceable render rules.
///
/// A parser is configured through `&mut` methods, then rendered through
/// `&self`. Every hook point holds one handler:
///
/// - fence rule: fenced code blocks
/// - heading rule: headings (and the table of contents)
/// - container rules: one per registered `:::kind`
/// - source rules: named rewrites of the source, run in insertion order
///
/// # Example
///
/// ```
/// use wd_renderer::MarkdownParser;
///
/// let parser = MarkdownParser::new();
/// let rendered = parser.render_document("# Title\n\nHello").unwrap();
/// assert_eq!(rendered.html, "<h1>Title</h1><p>Hello</p>");
/// assert!(rendered.toc.is_empty());
/// ```
#[derive(Clone)]
pub struct MarkdownParser {
    options: ParserOptions,
    fence: Arc<dyn FenceRule>,
    heading: Arc<dyn HeadingRule>,
    containers: HashMap<String, Arc<dyn ContainerRule>>,
    source_rules: Vec<(String, Arc<dyn SourceRule>)>,
}

impl MarkdownParser {
    /// Create a parser with default options and rules.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ParserOptions::default())
    }

    /// Create a parser with the given options and default rules.
    #[must_use]
    pub fn with_options(options: ParserOptions) -> Self {
        Self {
            options,
            fence: Arc::new(DefaultFence),
            heading: Arc::new(DefaultHeading),
            containers: HashMap::new(),
            source_rules: Vec::new(),
        }
    }

    #[must_use]
    pub fn options(&self) -> ParserOptions {
        self.options
    }

    pub fn set_options(&mut self, options: ParserOptions) {
        self.options = options;
    }

    /// Currently installed fence rule.
    ///
    /// Wrapping rules keep this handle and delegate to it.
    #[must_use]
    pub fn fence_rule(&self) -> Arc<dyn FenceRule> {
        Arc::clone(&self.fence)
    }

    /// Replace the fence rule.
    pub fn set_fence_rule(&mut self, rule: impl FenceRule + 'static) {
        self.fence = Arc::new(rule);
    }

    #[must_use]
    pub fn heading_rule(&self) -> Arc<dyn HeadingRule> {
        Arc::clone(&self.heading)
    }

    /// Replace the heading rule.
    pub fn set_heading_rule(&mut self, rule: impl HeadingRule + 'static) {
        self.heading = Arc::new(rule);
    }

    /// Register a container type with the default container markup.
    ///
    /// Re-registering an existing type resets its rule.
    pub fn add_container(&mut self, kind: impl Into<String>) {
        self.set_container_rule(kind, DefaultContainer);
    }

    /// Register a container type with a custom rule, replacing any existing one.
    pub fn set_container_rule(&mut self, kind: impl Into<String>, rule: impl ContainerRule + 'static) {
        self.containers.insert(kind.into(), Arc::new(rule));
    }

    #[must_use]
    pub fn container_rule(&self, kind: &str) -> Option<Arc<dyn ContainerRule>> {
        self.containers.get(kind).map(Arc::clone)
    }

    #[must_use]
    pub fn has_container(&self, kind: &str) -> bool {
        self.containers.contains_key(kind)
    }

    /// Registered container types, sorted.
    #[must_use]
    pub fn container_kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.containers.keys().cloned().collect();
        kinds.sort();
        kinds
    }

    /// Add a source rule.
    ///
    /// A rule with the same name is replaced in place, keeping its position.
    pub fn set_source_rule(&mut self, name: impl Into<String>, rule: impl SourceRule + 'static) {
        let name = name.into();
        let rule: Arc<dyn SourceRule> = Arc::new(rule);
        if let Some(slot) = self.source_rules.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = rule;
        } else {
            self.source_rules.push((name, rule));
        }
    }

    /// Source rule names in execution order.
    #[must_use]
    pub fn source_rule_names(&self) -> Vec<&str> {
        self.source_rules.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Render `markdown` into HTML, recording side data in `env`.
    ///
    /// Source rules run first, then container syntax is expanded, then the
    /// document is parsed and rendered through the installed rules.
    pub fn render(&self, markdown: &str, env: &mut RenderEnv) -> Result<String, RuleError> {
        let mut source = Cow::Borrowed(markdown);
        for (name, rule) in &self.source_rules {
            let next = match rule.apply(&source, env)? {
                Cow::Borrowed(_) => None,
                Cow::Owned(next) => Some(next),
            };
            if let Some(next) = next {
                tracing::trace!(rule = %name, "Source rule rewrote document");
                source = Cow::Owned(next);
            }
        }

        let options = self.options.to_cmark();
        let expanded = if self.containers.is_empty() {
            None
        } else {
            expand_containers(&source, options, |kind| self.containers.contains_key(kind))
        };
        let no_containers = Containers::default();
        let (text, containers) = match &expanded {
            Some(expanded) => (expanded.source.as_str(), &expanded.containers),
            None => (&*source, &no_containers),
        };

        let events = Parser::new_ext(text, options);
        RenderPass::new(self, env, containers).run(events)
    }

    /// Render `markdown` with a fresh environment.
    pub fn render_document(&self, markdown: &str) -> Result<Rendered, RuleError> {
        let mut env = RenderEnv::new();
        let html = self.render(markdown, &mut env)?;
        Ok(env.into_rendered(html))
    }
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MarkdownParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkdownParser")
            .field("options", &self.options)
            .field("containers", &self.container_kinds())
            .field("source_rules", &self.source_rule_names())
            .finish_non_exhaustive()
    }
}
