//! `wd render` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, ValueEnum};
use wd_config::{CliSettings, Config};
use wd_pipeline::{
    AlertTransformer, AnchorTransformer, CodeCopyTransformer, ContainerTransformer, Highlighter,
    HighlighterTransformer, IncludeTransformer, MarkdownPipeline, MermaidTransformer, Rendered,
};

use crate::error::CliError;
use crate::output::Output;

/// Output format for rendered documents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    /// `{"html": ..., "toc": [...]}` as pretty-printed JSON.
    #[default]
    Json,
    /// HTML only.
    Html,
}

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Path to the markdown file.
    file: PathBuf,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Root directory for include directives (overrides config).
    #[arg(long)]
    include_root: Option<PathBuf>,

    /// Highlighting theme (overrides config).
    #[arg(long, env = "WD_THEME")]
    theme: Option<String>,

    /// Disable syntax highlighting.
    #[arg(long)]
    no_highlight: bool,

    /// Disable the result cache.
    #[arg(long)]
    no_cache: bool,

    /// Path to configuration file (default: auto-discover wdocs.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output (pipeline assembly and timing logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, reading the file or rendering fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            include_root: self.include_root,
            cache_enabled: self.no_cache.then_some(false),
            highlight_enabled: self.no_highlight.then_some(false),
            theme: self.theme,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        let markdown = std::fs::read_to_string(&self.file)?;
        let pipeline = build_pipeline(&config);
        let rendered = pipeline.parse(&markdown, config.cache.enabled)?;

        output.document(&format_rendered(&rendered, self.format)?)?;
        Ok(())
    }
}

/// Build a pipeline with the transformers enabled in `config`.
pub(crate) fn build_pipeline(config: &Config) -> MarkdownPipeline {
    let markdown = &config.markdown_resolved;
    let mut pipeline = MarkdownPipeline::with_ttl(config.cache.ttl());

    if config.highlight.enabled {
        let highlighter = Arc::new(Highlighter::load_defaults());
        pipeline.add_transformer(HighlighterTransformer::with_theme(
            highlighter,
            config.highlight.theme.as_str(),
        ));
    }
    if markdown.anchors {
        pipeline.add_transformer(AnchorTransformer);
    }
    for kind in &markdown.containers {
        pipeline.add_transformer(ContainerTransformer::new(kind.as_str()));
    }
    if let Some(root) = &markdown.include_root {
        pipeline.add_transformer(IncludeTransformer::new(root.as_path()));
    }
    if markdown.mermaid {
        pipeline.add_transformer(MermaidTransformer);
    }
    if markdown.alerts {
        pipeline.add_transformer(AlertTransformer);
    }
    if markdown.code_copy {
        pipeline.add_transformer(CodeCopyTransformer);
    }

    tracing::debug!(
        transformers = ?pipeline.registry().names(),
        "Pipeline configured"
    );
    pipeline
}

fn format_rendered(rendered: &Rendered, format: Format) -> Result<String, CliError> {
    match format {
        Format::Json => Ok(serde_json::to_string_pretty(rendered)?),
        Format::Html => Ok(rendered.html.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wd_pipeline::PipelineError;

    fn config_without_highlight() -> Config {
        let mut config = Config::default();
        config.highlight.enabled = false;
        config
    }

    #[test]
    fn test_default_transformers() {
        let pipeline = build_pipeline(&Config::default());
        assert_eq!(
            pipeline.registry().names(),
            vec![
                "highlighter",
                "anchor",
                "container-info",
                "container-tip",
                "container-warning",
                "container-danger",
                "container-details",
                "mermaid",
                "alert",
                "code-copy",
            ]
        );
    }

    #[test]
    fn test_disabled_features_not_registered() {
        let mut config = config_without_highlight();
        config.markdown_resolved.anchors = false;
        config.markdown_resolved.code_copy = false;
        config.markdown_resolved.containers.clear();

        let pipeline = build_pipeline(&config);
        assert_eq!(pipeline.registry().names(), vec!["mermaid", "alert"]);

        let rendered = pipeline.parse("# Title", false).unwrap();
        assert_eq!(rendered.html, "<h1>Title</h1>");
        assert!(rendered.toc.is_empty());
    }

    #[test]
    fn test_render_with_containers_and_anchors() {
        let pipeline = build_pipeline(&config_without_highlight());
        let rendered = pipeline
            .parse("# Guide\n\n:::tip Shortcut\nUse it.\n:::", true)
            .unwrap();
        assert_eq!(rendered.toc[0].slug, "guide");
        assert!(rendered.html.contains(r#"<div class="alert alert-tip">"#));
        assert!(rendered.html.contains("Shortcut</div>"));
    }

    #[test]
    fn test_include_root_from_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("part.md"), "## Included\n").unwrap();

        let mut config = config_without_highlight();
        config.markdown_resolved.include_root = Some(dir.path().to_path_buf());

        let pipeline = build_pipeline(&config);
        let rendered = pipeline
            .parse("# Main\n\n!!!include(part.md)!!!\n", false)
            .unwrap();
        let titles: Vec<&str> = rendered.toc.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, vec!["Main", "Included"]);
    }

    #[test]
    fn test_highlighting_enabled() {
        let pipeline = build_pipeline(&Config::default());
        let rendered = pipeline.parse("```rust\nfn main() {}\n```", false).unwrap();
        assert!(rendered.html.contains(r#"<pre class="highlight""#));
        assert!(rendered.html.contains("code-block-wrapper"));
    }

    #[test]
    fn test_unknown_theme_fails_on_parse() {
        let mut config = Config::default();
        config.highlight.theme = "no-such-theme".to_owned();

        let err = build_pipeline(&config).parse("text", false).unwrap_err();
        assert!(matches!(err, PipelineError::Setup { ref transformer, .. } if transformer == "highlighter"));
        assert!(err.to_string().contains("no-such-theme"));
    }

    #[test]
    fn test_format_json() {
        let pipeline = build_pipeline(&config_without_highlight());
        let rendered = pipeline.parse("## Intro", false).unwrap();

        let json = format_rendered(&rendered, Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["toc"][0]["slug"], "intro");
        assert_eq!(value["toc"][0]["depth"], 2);
        assert_eq!(value["toc"][0]["level"], 2);
        assert_eq!(value["html"], rendered.html.as_str());
    }

    #[test]
    fn test_format_html() {
        let rendered = Rendered {
            html: "<p>x</p>".to_owned(),
            toc: Vec::new(),
        };
        assert_eq!(format_rendered(&rendered, Format::Html).unwrap(), "<p>x</p>");
    }
}
