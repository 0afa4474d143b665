//! Pipeline facade: cache lookup, lazy parser assembly, render, cache write.

use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use wd_cache::{Clock, DEFAULT_TTL, TtlCache};
use wd_renderer::{MarkdownParser, Rendered, RuleError};

use crate::key::cache_key;
use crate::registry::TransformerRegistry;
use crate::transformer::{SetupError, Transformer};

/// Error returned by [`MarkdownPipeline::parse`].
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A transformer failed while the parser was being assembled.
    #[error("transformer '{transformer}' failed to apply: {source}")]
    Setup {
        transformer: String,
        #[source]
        source: SetupError,
    },
    /// A render rule failed during the render pass.
    #[error(transparent)]
    Render(#[from] RuleError),
}

/// Markdown to `{html, toc}` pipeline.
///
/// Transformers are registered through `&mut self`; rendering and
/// invalidation take `&self`, so a configured pipeline can be shared between
/// threads behind an `Arc`.
///
/// The parser is assembled on first use and reassembled after the transformer
/// set changes or [`invalidate`](Self::invalidate) is called. Assembly uses
/// double-checked locking: concurrent callers that find no parser wait for a
/// single build instead of building their own.
///
/// # Example
///
/// ```
/// use wd_pipeline::{AnchorTransformer, ContainerTransformer, MarkdownPipeline};
///
/// let mut pipeline = MarkdownPipeline::new();
/// pipeline
///     .add_transformer(AnchorTransformer)
///     .add_transformer(ContainerTransformer::new("tip"));
///
/// let rendered = pipeline.parse("# Intro\n\n:::tip\nHi\n:::", true).unwrap();
/// assert_eq!(rendered.toc[0].slug, "intro");
/// assert!(rendered.html.contains("custom-container tip"));
/// ```
pub struct MarkdownPipeline {
    registry: TransformerRegistry,
    /// Assembled parser, `None` until first use or after a change.
    parser: RwLock<Option<Arc<MarkdownParser>>>,
    /// Serializes assembly.
    assembly_lock: Mutex<()>,
    /// Bumped by `invalidate`. Results rendered under an older generation
    /// are not written to the cache.
    generation: RwLock<u64>,
    cache: TtlCache<Rendered>,
}

impl MarkdownPipeline {
    /// Create a pipeline with the default cache TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_cache(TtlCache::new(DEFAULT_TTL))
    }

    /// Create a pipeline whose cache entries live for `ttl`.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::with_cache(TtlCache::new(ttl))
    }

    /// Create a pipeline with the given TTL and cache clock.
    #[must_use]
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self::with_cache(TtlCache::with_clock(ttl, clock))
    }

    /// Create a pipeline around an existing cache.
    #[must_use]
    pub fn with_cache(cache: TtlCache<Rendered>) -> Self {
        Self {
            registry: TransformerRegistry::new(),
            parser: RwLock::new(None),
            assembly_lock: Mutex::new(()),
            generation: RwLock::new(0),
            cache,
        }
    }

    /// Register a transformer.
    pub fn add_transformer(&mut self, transformer: impl Transformer + 'static) -> &mut Self {
        self.registry.add(Arc::new(transformer));
        self.reset_parser();
        self
    }

    /// Register several transformers.
    pub fn add_transformers(
        &mut self,
        transformers: impl IntoIterator<Item = Arc<dyn Transformer>>,
    ) -> &mut Self {
        self.registry.add_many(transformers);
        self.reset_parser();
        self
    }

    /// Remove all transformers.
    pub fn clear_transformers(&mut self) -> &mut Self {
        self.registry.clear();
        self.reset_parser();
        self
    }

    #[must_use]
    pub fn registry(&self) -> &TransformerRegistry {
        &self.registry
    }

    /// Number of cached results, including expired ones not yet evicted.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Drop expired cache entries. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.cache.purge_expired()
    }

    fn reset_parser(&mut self) {
        *self
            .parser
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Whether a parser is currently assembled.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    #[must_use]
    pub fn is_assembled(&self) -> bool {
        self.parser.read().unwrap().is_some()
    }

    /// Return the assembled parser, building it if needed.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    pub fn ensure_assembled(&self) -> Result<Arc<MarkdownParser>, PipelineError> {
        // Fast path: already assembled
        if let Some(parser) = self.parser.read().unwrap().as_ref() {
            return Ok(Arc::clone(parser));
        }

        // Slow path: acquire assembly lock
        let _guard = self.assembly_lock.lock().unwrap();

        // Double-check after acquiring lock
        if let Some(parser) = self.parser.read().unwrap().as_ref() {
            return Ok(Arc::clone(parser));
        }

        let start = Instant::now();
        let parser = Arc::new(self.assemble()?);
        *self.parser.write().unwrap() = Some(Arc::clone(&parser));

        tracing::info!(
            transformers = self.registry.len(),
            elapsed_ms = elapsed_ms(start),
            "Parser assembled"
        );
        Ok(parser)
    }

    fn assemble(&self) -> Result<MarkdownParser, PipelineError> {
        let mut parser = MarkdownParser::new();
        for transformer in self.registry.iter() {
            tracing::debug!(
                transformer = transformer.name(),
                priority = transformer.priority(),
                "Applying transformer"
            );
            transformer.apply(&mut parser).map_err(|source| {
                tracing::error!(
                    transformer = transformer.name(),
                    error = %source,
                    "Transformer failed to apply"
                );
                PipelineError::Setup {
                    transformer: transformer.name().to_owned(),
                    source,
                }
            })?;
        }
        Ok(parser)
    }

    /// Render `markdown` to HTML and a table of contents.
    ///
    /// With `use_cache`, a fresh cached result for identical content is
    /// returned without rendering, and a new result is stored. Errors are
    /// never cached, and neither is a result whose render overlapped an
    /// [`invalidate`](Self::invalidate).
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    pub fn parse(&self, markdown: &str, use_cache: bool) -> Result<Rendered, PipelineError> {
        let key = use_cache.then(|| cache_key(markdown));

        if let Some(key) = &key
            && let Some(cached) = self.cache.get(key)
        {
            tracing::debug!(key = %key, "Cache hit");
            return Ok(cached);
        }

        let generation = *self.generation.read().unwrap();
        let parser = self.ensure_assembled()?;
        let start = Instant::now();
        let rendered = parser.render_document(markdown).map_err(|e| {
            tracing::warn!(error = %e, "Render failed");
            PipelineError::Render(e)
        })?;
        tracing::debug!(
            bytes = markdown.len(),
            headings = rendered.toc.len(),
            elapsed_ms = elapsed_ms(start),
            "Rendered markdown"
        );

        if let Some(key) = key {
            let current = self.generation.read().unwrap();
            if *current == generation {
                self.cache.set(key, rendered.clone());
            } else {
                tracing::debug!(key = %key, "Pipeline invalidated during render, result not cached");
            }
        }
        Ok(rendered)
    }

    /// Shorthand for [`parse`](Self::parse) with the cache enabled.
    pub fn parse_cached(&self, markdown: &str) -> Result<Rendered, PipelineError> {
        self.parse(markdown, true)
    }

    /// Clear the cache and force reassembly on the next parse.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    pub fn invalidate(&self) {
        {
            let mut generation = self.generation.write().unwrap();
            *generation += 1;
            self.cache.clear();
        }
        let _guard = self.assembly_lock.lock().unwrap();
        *self.parser.write().unwrap() = None;
        tracing::debug!("Pipeline invalidated");
    }
}

impl Default for MarkdownPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MarkdownPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkdownPipeline")
            .field("transformers", &self.registry)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
