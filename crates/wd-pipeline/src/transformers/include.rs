use std::borrow::Cow;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};
use wd_renderer::{MarkdownParser, RenderEnv, RuleError, SourceRule, escape_html};

use crate::transformer::{SetupError, Transformer};

/// Maximum nesting of included files.
pub const MAX_INCLUDE_DEPTH: usize = 10;

/// Reads an included file.
pub type FileReader = Arc<dyn Fn(&Path) -> io::Result<String> + Send + Sync>;

static INCLUDE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)!!!\s*include\s*\(\s*(.+?)\s*\)\s*!!!").unwrap());

/// Expands `!!!include(path)!!!` directives before parsing.
///
/// Paths are relative to the including file, starting at `root` for the
/// document itself, and may not leave `root`. Included files are expanded
/// recursively up to [`MAX_INCLUDE_DEPTH`] levels. A directive that cannot be
/// resolved is replaced with an HTML comment and reported as a warning.
#[derive(Clone)]
pub struct IncludeTransformer {
    root: PathBuf,
    reader: FileReader,
}

impl IncludeTransformer {
    /// Read included files from disk.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_reader(root, Arc::new(|path: &Path| std::fs::read_to_string(path)))
    }

    /// Read included files through `reader`.
    pub fn with_reader(root: impl Into<PathBuf>, reader: FileReader) -> Self {
        Self {
            root: root.into(),
            reader,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl fmt::Debug for IncludeTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncludeTransformer")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl Transformer for IncludeTransformer {
    fn name(&self) -> &str {
        "include"
    }

    fn priority(&self) -> i32 {
        80
    }

    fn apply(&self, parser: &mut MarkdownParser) -> Result<(), SetupError> {
        parser.set_source_rule(
            "include",
            IncludeRule {
                root: self.root.clone(),
                reader: Arc::clone(&self.reader),
            },
        );
        Ok(())
    }
}

struct IncludeRule {
    root: PathBuf,
    reader: FileReader,
}

impl SourceRule for IncludeRule {
    fn apply<'a>(&self, source: &'a str, env: &mut RenderEnv) -> Result<Cow<'a, str>, RuleError> {
        if !INCLUDE_PATTERN.is_match(source) {
            return Ok(Cow::Borrowed(source));
        }
        let mut chain = Vec::new();
        Ok(Cow::Owned(self.expand(source, &self.root, &mut chain, env)))
    }
}

impl IncludeRule {
    /// Expand directives in `text`, resolving paths against `base`.
    ///
    /// `chain` holds the files currently being expanded, outermost first.
    fn expand(
        &self,
        text: &str,
        base: &Path,
        chain: &mut Vec<PathBuf>,
        env: &mut RenderEnv,
    ) -> String {
        INCLUDE_PATTERN
            .replace_all(text, |caps: &Captures| {
                let target = &caps[1];
                self.include(target, base, chain, env)
            })
            .into_owned()
    }

    fn include(
        &self,
        target: &str,
        base: &Path,
        chain: &mut Vec<PathBuf>,
        env: &mut RenderEnv,
    ) -> String {
        let Some(path) = resolve_within(&self.root, base, target) else {
            return unresolved(env, target, "path is outside the include root");
        };
        if chain.len() >= MAX_INCLUDE_DEPTH {
            return unresolved(env, target, "include depth exceeded maximum of 10");
        }
        if chain.contains(&path) {
            return unresolved(env, target, "circular include");
        }

        let content = match (self.reader)(&path) {
            Ok(content) => content,
            Err(e) => return unresolved(env, target, &format!("cannot read file: {e}")),
        };

        let dir = path.parent().unwrap_or(&self.root).to_path_buf();
        chain.push(path);
        let expanded = self.expand(&content, &dir, chain, env);
        chain.pop();

        expanded.trim_end_matches('\n').to_owned()
    }
}

fn unresolved(env: &mut RenderEnv, target: &str, reason: &str) -> String {
    env.warn(format!("Include '{target}' not resolved: {reason}"));
    format!(
        "<!-- include not resolved: {} ({reason}) -->",
        escape_html(target)
    )
}

/// Join `relative` onto `base` without touching the filesystem, rejecting
/// absolute paths and any path that climbs above `root`.
fn resolve_within(root: &Path, base: &Path, relative: &str) -> Option<PathBuf> {
    let mut resolved = base.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if resolved.as_path() == root || !resolved.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    (resolved.starts_with(root) && resolved.as_path() != root).then_some(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    use pretty_assertions::assert_eq;

    fn memory_reader(files: &[(&str, &str)]) -> FileReader {
        let files: HashMap<PathBuf, String> = files
            .iter()
            .map(|(path, content)| (PathBuf::from(path), (*content).to_owned()))
            .collect();
        Arc::new(move |path: &Path| {
            files
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "not found"))
        })
    }

    fn render(reader: FileReader, markdown: &str) -> (String, Vec<String>) {
        let mut parser = MarkdownParser::new();
        IncludeTransformer::with_reader("/docs", reader)
            .apply(&mut parser)
            .unwrap();
        let mut env = RenderEnv::new();
        let html = parser.render(markdown, &mut env).unwrap();
        (html, env.warnings)
    }

    #[test]
    fn test_include_file() {
        let reader = memory_reader(&[("/docs/parts/intro.md", "**Included**\n")]);
        let (html, warnings) = render(reader, "Before\n\n!!!include(parts/intro.md)!!!\n\nAfter");
        assert_eq!(html, "<p>Before</p><p><strong>Included</strong></p><p>After</p>");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_nested_include_relative_to_parent() {
        let reader = memory_reader(&[
            ("/docs/parts/a.md", "A !!!include(b.md)!!!"),
            ("/docs/parts/b.md", "B"),
        ]);
        let (html, _) = render(reader, "!!!include(parts/a.md)!!!");
        assert_eq!(html, "<p>A B</p>");
    }

    #[test]
    fn test_missing_include_warns() {
        let (html, warnings) = render(memory_reader(&[]), "!!!include(missing.md)!!!");
        assert!(html.starts_with("<!-- include not resolved: missing.md (cannot read file"));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("missing.md"));
    }

    #[test]
    fn test_traversal_rejected() {
        let reader = memory_reader(&[("/etc/passwd", "secret")]);
        let (html, warnings) = render(reader, "!!!include(../etc/passwd)!!!");
        assert!(!html.contains("secret"));
        assert!(html.contains("outside the include root"));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_absolute_path_rejected() {
        let reader = memory_reader(&[("/docs/a.md", "A")]);
        let (html, _) = render(reader, "!!!include(/docs/a.md)!!!");
        assert!(html.contains("outside the include root"));
    }

    #[test]
    fn test_circular_include_stops() {
        let reader = memory_reader(&[
            ("/docs/a.md", "A !!!include(b.md)!!!"),
            ("/docs/b.md", "B !!!include(a.md)!!!"),
        ]);
        let (html, warnings) = render(reader, "!!!include(a.md)!!!");
        assert!(html.starts_with("<p>A B <!-- include not resolved: a.md (circular include) -->"));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_depth_limit() {
        let files: Vec<(String, String)> = (0..=MAX_INCLUDE_DEPTH + 1)
            .map(|i| (format!("/docs/{i}.md"), format!("{i} !!!include({}.md)!!!", i + 1)))
            .collect();
        let refs: Vec<(&str, &str)> = files
            .iter()
            .map(|(p, c)| (p.as_str(), c.as_str()))
            .collect();
        let (html, warnings) = render(memory_reader(&refs), "!!!include(0.md)!!!");
        assert!(html.contains("9 <!-- include not resolved: 10.md (include depth exceeded"));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_no_directive_borrows() {
        let rule = IncludeRule {
            root: PathBuf::from("/docs"),
            reader: memory_reader(&[]),
        };
        let result = rule.apply("plain text", &mut RenderEnv::new()).unwrap();
        assert!(matches!(result, Cow::Borrowed("plain text")));
    }

    #[test]
    fn test_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("snippet.md"), "From disk\n").unwrap();
        let mut parser = MarkdownParser::new();
        IncludeTransformer::new(dir.path())
            .apply(&mut parser)
            .unwrap();
        let html = parser
            .render_document("!!!include(snippet.md)!!!")
            .unwrap()
            .html;
        assert_eq!(html, "<p>From disk</p>");
    }

    #[test]
    fn test_resolve_within() {
        let root = Path::new("/docs");
        assert_eq!(
            resolve_within(root, root, "./a/../b.md"),
            Some(PathBuf::from("/docs/b.md"))
        );
        assert_eq!(resolve_within(root, root, "../x.md"), None);
        assert_eq!(resolve_within(root, Path::new("/docs/sub"), "../x.md"), Some(PathBuf::from("/docs/x.md")));
        assert_eq!(resolve_within(root, root, ".."), None);
    }
}
