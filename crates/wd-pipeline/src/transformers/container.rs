use wd_renderer::MarkdownParser;

use crate::transformer::{SetupError, Transformer};

/// Registers the `:::<kind> [title]` container syntax.
#[derive(Debug, Clone)]
pub struct ContainerTransformer {
    kind: String,
    name: String,
}

impl ContainerTransformer {
    pub fn new(kind: impl Into<String>) -> Self {
        let kind = kind.into();
        Self {
            name: format!("container-{kind}"),
            kind,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }
}

impl Transformer for ContainerTransformer {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        90
    }

    fn apply(&self, parser: &mut MarkdownParser) -> Result<(), SetupError> {
        if self.kind.is_empty() || self.kind.contains(char::is_whitespace) {
            return Err(SetupError::InvalidContainerKind(self.kind.clone()));
        }
        parser.add_container(&self.kind);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_name_includes_kind() {
        let transformer = ContainerTransformer::new("warning");
        assert_eq!(transformer.name(), "container-warning");
        assert_eq!(transformer.kind(), "warning");
        assert_eq!(transformer.priority(), 90);
    }

    #[test]
    fn test_renders_container() {
        let mut parser = MarkdownParser::new();
        ContainerTransformer::new("warning").apply(&mut parser).unwrap();
        let html = parser
            .render_document("::: warning Mind the gap\nText\n:::")
            .unwrap()
            .html;
        assert_eq!(
            html,
            r#"<div class="custom-container warning"><p class="custom-container-title">Mind the gap</p><p>Text</p></div>"#
        );
    }

    #[test]
    fn test_invalid_kind() {
        let mut parser = MarkdownParser::new();
        let err = ContainerTransformer::new("two words")
            .apply(&mut parser)
            .unwrap_err();
        assert!(matches!(err, SetupError::InvalidContainerKind(kind) if kind == "two words"));
        assert!(ContainerTransformer::new("").apply(&mut parser).is_err());
    }
}
