use wd_renderer::{
    ContainerBlock, ContainerRule, MarkdownParser, ParserOptions, RenderEnv, RuleError,
    alert_end, container_alert_start,
};

use crate::transformer::{SetupError, Transformer};

/// Renders containers as alerts.
///
/// Replaces the rule of every container type registered when it is applied,
/// so it must run after the container transformers (it has a lower priority).
/// It also turns on GitHub style `> [!NOTE]` blockquote alerts.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlertTransformer;

impl Transformer for AlertTransformer {
    fn name(&self) -> &str {
        "alert"
    }

    fn priority(&self) -> i32 {
        60
    }

    fn apply(&self, parser: &mut MarkdownParser) -> Result<(), SetupError> {
        for kind in parser.container_kinds() {
            parser.set_container_rule(kind, AlertRule);
        }
        parser.set_options(ParserOptions {
            alerts: true,
            ..parser.options()
        });
        Ok(())
    }
}

struct AlertRule;

impl ContainerRule for AlertRule {
    fn open(
        &self,
        container: &ContainerBlock,
        _env: &mut RenderEnv,
        out: &mut String,
    ) -> Result<(), RuleError> {
        container_alert_start(&container.kind, &container.display_title(), out);
        Ok(())
    }

    fn close(
        &self,
        _container: &ContainerBlock,
        _env: &mut RenderEnv,
        out: &mut String,
    ) -> Result<(), RuleError> {
        alert_end(out);
        Ok(())
    }
}
