//! Syntax highlighting backed by syntect.

use std::fmt::{self, Write};

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{IncludeBackground, styled_line_to_highlighted_html};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use wd_renderer::escape_html;

/// Theme used when none is configured.
pub const DEFAULT_THEME: &str = "InspiredGitHub";

/// Loaded syntax definitions and themes.
///
/// Loading is slow, so a highlighter is built once and shared between
/// pipelines; highlighting itself does no I/O.
pub struct Highlighter {
    syntaxes: SyntaxSet,
    themes: ThemeSet,
}

impl Highlighter {
    /// Load syntect's bundled syntaxes and themes.
    #[must_use]
    pub fn load_defaults() -> Self {
        Self::new(SyntaxSet::load_defaults_newlines(), ThemeSet::load_defaults())
    }

    #[must_use]
    pub fn new(syntaxes: SyntaxSet, themes: ThemeSet) -> Self {
        Self { syntaxes, themes }
    }

    /// Names of loaded themes, sorted.
    #[must_use]
    pub fn theme_names(&self) -> Vec<String> {
        // ThemeSet stores themes in a BTreeMap, so keys are already sorted.
        self.themes.themes.keys().cloned().collect()
    }

    #[must_use]
    pub fn theme(&self, name: &str) -> Option<&Theme> {
        self.themes.themes.get(name)
    }

    /// Find a syntax by fence language token (`rust`, `rs`, `py`, ...).
    #[must_use]
    pub fn find_syntax(&self, lang: &str) -> Option<&SyntaxReference> {
        if lang.is_empty() {
            return None;
        }
        self.syntaxes.find_syntax_by_token(lang)
    }

    /// Highlight `code` as `lang` with the named theme.
    ///
    /// Returns `Ok(None)` when the language or theme is unknown, leaving the
    /// caller to fall back to plain rendering.
    pub fn highlight(
        &self,
        code: &str,
        lang: &str,
        theme: &str,
    ) -> Result<Option<String>, syntect::Error> {
        let (Some(syntax), Some(theme)) = (self.find_syntax(lang), self.theme(theme)) else {
            return Ok(None);
        };

        let mut html = String::with_capacity(code.len() * 4);
        html.push_str(r#"<pre class="highlight""#);
        if let Some(bg) = theme.settings.background {
            write!(
                html,
                r#" style="background-color:#{:02x}{:02x}{:02x};""#,
                bg.r, bg.g, bg.b
            )
            .unwrap();
        }
        write!(html, r#"><code class="language-{}">"#, escape_html(lang)).unwrap();

        let mut lines = HighlightLines::new(syntax, theme);
        for line in LinesWithEndings::from(code) {
            let regions = lines.highlight_line(line, &self.syntaxes)?;
            html.push_str(&styled_line_to_highlighted_html(
                &regions[..],
                IncludeBackground::No,
            )?);
        }
        html.push_str("</code></pre>");
        Ok(Some(html))
    }
}

impl fmt::Debug for Highlighter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Highlighter")
            .field("syntaxes", &self.syntaxes.syntaxes().len())
            .field("themes", &self.theme_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::LazyLock;

    static HIGHLIGHTER: LazyLock<Highlighter> = LazyLock::new(Highlighter::load_defaults);

    #[test]
    fn test_default_theme_loaded() {
        assert!(HIGHLIGHTER.theme(DEFAULT_THEME).is_some());
        assert!(
            HIGHLIGHTER
                .theme_names()
                .contains(&"base16-ocean.dark".to_owned())
        );
    }

    #[test]
    fn test_highlight_rust() {
        let html = HIGHLIGHTER
            .highlight("fn main() {}\n", "rust", DEFAULT_THEME)
            .unwrap()
            .unwrap();
        assert!(html.starts_with(r#"<pre class="highlight" style="background-color:#"#));
        assert!(html.contains(r#"<code class="language-rust">"#));
        assert!(html.contains("<span style=\"color:"));
        assert!(html.contains("main"));
        assert!(html.ends_with("</code></pre>"));
    }

    #[test]
    fn test_highlight_escapes_code() {
        let html = HIGHLIGHTER
            .highlight("a < b && c\n", "rust", DEFAULT_THEME)
            .unwrap()
            .unwrap();
        assert!(html.contains("&lt;"));
        assert!(!html.contains("a < b"));
    }

    #[test]
    fn test_unknown_language() {
        let result = HIGHLIGHTER.highlight("x", "not-a-language", DEFAULT_THEME);
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn test_empty_language() {
        assert!(HIGHLIGHTER.find_syntax("").is_none());
    }

    #[test]
    fn test_unknown_theme() {
        let result = HIGHLIGHTER.highlight("fn x() {}", "rust", "no-such-theme");
        assert!(result.unwrap().is_none());
    }
}
