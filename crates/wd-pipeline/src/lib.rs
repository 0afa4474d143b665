//! Markdown to HTML pipeline.
//!
//! A [`MarkdownPipeline`] turns markdown into [`Rendered`] output (`html` and
//! `toc`). Behavior comes from [`Transformer`]s: named, prioritized units that
//! install rules on the underlying [`MarkdownParser`]. The parser is assembled
//! lazily from the registered transformers, highest priority first, and reused
//! until the transformer set changes.
//!
//! Results can be cached by content hash for a configurable TTL.
//!
//! # Example
//!
//! ```
//! use wd_pipeline::{
//!     AlertTransformer, AnchorTransformer, CodeCopyTransformer, ContainerTransformer,
//!     MarkdownPipeline,
//! };
//!
//! let mut pipeline = MarkdownPipeline::new();
//! pipeline
//!     .add_transformer(AnchorTransformer)
//!     .add_transformer(ContainerTransformer::new("warning"))
//!     .add_transformer(AlertTransformer)
//!     .add_transformer(CodeCopyTransformer);
//!
//! let rendered = pipeline
//!     .parse("# Setup\n\n:::warning\nBack up first.\n:::", true)
//!     .unwrap();
//! assert_eq!(rendered.toc.len(), 1);
//! assert!(rendered.html.contains("alert alert-warning"));
//! ```

mod highlight;
mod key;
mod pipeline;
mod registry;
mod transformer;
pub mod transformers;

pub use highlight::{DEFAULT_THEME, Highlighter};
pub use key::cache_key;
pub use pipeline::{MarkdownPipeline, PipelineError};
pub use registry::TransformerRegistry;
pub use transformer::{FnTransformer, SetupError, Transformer};
pub use transformers::{
    AlertTransformer, AnchorTransformer, CodeCopyTransformer, ContainerTransformer,
    HighlighterTransformer, IncludeTransformer, MermaidTransformer,
};
pub use wd_renderer::{Heading, MarkdownParser, RenderEnv, Rendered};
