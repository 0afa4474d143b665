//! Transformer trait.

use std::fmt;

use wd_renderer::MarkdownParser;

/// Error returned by [`Transformer::apply`].
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// The requested highlighting theme is not loaded.
    #[error("theme '{theme}' is not loaded (available: {})", available.join(", "))]
    UnknownTheme {
        theme: String,
        available: Vec<String>,
    },
    /// A container type name is empty or contains whitespace.
    #[error("invalid container type '{0}'")]
    InvalidContainerKind(String),
    #[error("{0}")]
    Other(String),
}

/// A named, prioritized unit of rendering behavior.
///
/// Transformers configure a [`MarkdownParser`] by installing rules. Higher
/// priorities are applied first, so for a hook point that holds a single
/// rule the lowest-priority transformer that replaces it wins.
pub trait Transformer: Send + Sync {
    /// Identifier used in logs and errors. Need not be unique.
    fn name(&self) -> &str;

    /// Application order, highest first.
    fn priority(&self) -> i32 {
        0
    }

    /// Install behavior on the parser.
    fn apply(&self, parser: &mut MarkdownParser) -> Result<(), SetupError>;
}

/// [`Transformer`] built from a closure.
///
/// # Example
///
/// ```
/// use wd_pipeline::{FnTransformer, Transformer};
///
/// let tip = FnTransformer::new("tip", 10, |parser| {
///     parser.add_container("tip");
///     Ok(())
/// });
/// assert_eq!(tip.priority(), 10);
/// ```
pub struct FnTransformer<F> {
    name: String,
    priority: i32,
    apply: F,
}

impl<F> FnTransformer<F>
where
    F: Fn(&mut MarkdownParser) -> Result<(), SetupError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, priority: i32, apply: F) -> Self {
        Self {
            name: name.into(),
            priority,
            apply,
        }
    }
}

impl<F> Transformer for FnTransformer<F>
where
    F: Fn(&mut MarkdownParser) -> Result<(), SetupError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn apply(&self, parser: &mut MarkdownParser) -> Result<(), SetupError> {
        (self.apply)(parser)
    }
}

impl<F> fmt::Debug for FnTransformer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTransformer")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl Transformer for Plain {
        fn name(&self) -> &str {
            "plain"
        }

        fn apply(&self, _parser: &mut MarkdownParser) -> Result<(), SetupError> {
            Ok(())
        }
    }

    #[test]
    fn test_default_priority_is_zero() {
        assert_eq!(Plain.priority(), 0);
    }

    #[test]
    fn test_fn_transformer_applies() {
        let transformer = FnTransformer::new("tip", 5, |parser: &mut MarkdownParser| {
            parser.add_container("tip");
            Ok(())
        });
        let mut parser = MarkdownParser::new();
        transformer.apply(&mut parser).unwrap();
        assert!(parser.has_container("tip"));
        assert_eq!(transformer.name(), "tip");
    }

    #[test]
    fn test_unknown_theme_message() {
        let err = SetupError::UnknownTheme {
            theme: "nope".to_owned(),
            available: vec!["a".to_owned(), "b".to_owned()],
        };
        assert_eq!(err.to_string(), "theme 'nope' is not loaded (available: a, b)");
    }
}
