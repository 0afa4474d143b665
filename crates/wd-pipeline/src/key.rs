//! Cache key computation.

use sha2::{Digest, Sha256};

/// Compute the cache key for a Markdown document.
///
/// `md_` followed by the hex SHA-256 of the full text, so any change to the
/// content produces a different key.
#[must_use]
pub fn cache_key(markdown: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(markdown.as_bytes());
    format!("md_{}", hex::encode(hasher.finalize()))
}
