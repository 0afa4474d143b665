//! Ordered transformer collection.

use std::fmt;
use std::sync::Arc;

use crate::transformer::Transformer;

/// Transformers kept in application order: priority descending, ties in
/// insertion order.
#[derive(Clone, Default)]
pub struct TransformerRegistry {
    transformers: Vec<Arc<dyn Transformer>>,
}

impl TransformerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a transformer and restore priority order.
    ///
    /// Duplicate names are kept; both transformers are applied.
    pub fn add(&mut self, transformer: Arc<dyn Transformer>) {
        self.transformers.push(transformer);
        // Stable sort keeps insertion order among equal priorities.
        self.transformers
            .sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// Insert several transformers, preserving their order among equal priorities.
    pub fn add_many(&mut self, transformers: impl IntoIterator<Item = Arc<dyn Transformer>>) {
        for transformer in transformers {
            self.add(transformer);
        }
    }

    pub fn clear(&mut self) {
        self.transformers.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }

    /// Transformer names in application order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.transformers.iter().map(|t| t.name()).collect()
    }

    /// Iterate in application order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Transformer>> {
        self.transformers.iter()
    }
}

impl fmt::Debug for TransformerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
