//! `:::kind [title]` container blocks.
//!
//! pulldown-cmark has no extension point for custom block syntax, so
//! containers are found in a first parse of the source. A `:::` line counts
//! only where it starts a line of paragraph text: lines inside code blocks,
//! HTML blocks and headings are never touched, and indentation is judged by
//! the parser itself.
//!
//! Each container line is replaced in place by an HTML comment marker. The
//! text before it on the line (indentation, `>` or a list marker) is kept, so
//! the marker forms an HTML block inside the same list item or blockquote:
//!
//! ```text
//! - ::: warning Careful        - <!--wd-container:0-->
//!   Body text          =>        Body text
//!   :::                          <!--wd-container:1-->
//! ```
//!
//! The marker tag is chosen so that it never occurs in the source, so markers
//! cannot be forged by the document.

use std::fmt::Write;
use std::ops::Range;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

const MARKER_TAG: &str = "wd-container";

/// A container block handed to the container rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerBlock {
    /// Container type (the word after `:::`).
    pub kind: String,
    /// Title given after the type, if any.
    pub title: Option<String>,
}

impl ContainerBlock {
    /// Create a container block.
    #[must_use]
    pub fn new(kind: impl Into<String>, title: Option<String>) -> Self {
        Self {
            kind: kind.into(),
            title,
        }
    }

    /// Title to display: the explicit title or the capitalized kind.
    #[must_use]
    pub fn display_title(&self) -> String {
        if let Some(title) = &self.title {
            return title.clone();
        }
        let mut chars = self.kind.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// What a marker line stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Marker {
    /// Opens the container block with this index.
    Open(usize),
    /// Closes the container block with this index.
    Close(usize),
}

/// A container line replaced by a marker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct MarkerLine {
    pub(crate) marker: Marker,
    /// Original line, from `:::` to the end of the line.
    pub(crate) line: String,
}

/// Containers found in one document.
#[derive(Debug, Default)]
pub(crate) struct Containers {
    tag: String,
    blocks: Vec<ContainerBlock>,
    markers: Vec<MarkerLine>,
}

impl Containers {
    pub(crate) fn block(&self, index: usize) -> Option<&ContainerBlock> {
        self.blocks.get(index)
    }

    /// Look up the marker written as the text of an HTML event.
    pub(crate) fn marker(&self, html: &str) -> Option<&MarkerLine> {
        if self.markers.is_empty() {
            return None;
        }
        let id = html
            .trim()
            .strip_prefix("<!--")?
            .strip_prefix(self.tag.as_str())?
            .strip_prefix(':')?
            .strip_suffix("-->")?;
        self.markers.get(id.parse::<usize>().ok()?)
    }
}

/// Source with container lines replaced by markers.
#[derive(Debug)]
pub(crate) struct ExpandedSource {
    pub(crate) source: String,
    pub(crate) containers: Containers,
}

/// Open container seen during the scan.
struct OpenContainer {
    index: usize,
    /// Byte range of the list item or blockquote it was opened in.
    scope: Range<usize>,
    /// Length of the text before `:::` on the opening line.
    indent: usize,
}

/// Replace container lines of registered kinds with markers.
///
/// A bare `:::` closes the innermost container opened in the same list item
/// or blockquote. An unindented `:::` that the parser took as a lazy
/// continuation of a nested list item or blockquote closes it as well; the
/// marker that replaces it ends the nested block. Any other `:::` is left as
/// text. Containers that are never closed end with their list item or
/// blockquote, or with the document.
/// Returns `None` when the source contains no container of a registered kind.
pub(crate) fn expand_containers(
    source: &str,
    options: Options,
    is_registered: impl Fn(&str) -> bool,
) -> Option<ExpandedSource> {
    if !source.contains(":::") {
        return None;
    }

    let document = 0..source.len();
    let mut scopes: Vec<Range<usize>> = Vec::new();
    let mut open: Vec<OpenContainer> = Vec::new();
    let mut containers = Containers::default();
    let mut edits: Vec<Range<usize>> = Vec::new();
    let mut in_paragraph = false;
    let mut at_line_start = false;

    for (event, range) in Parser::new_ext(source, options).into_offset_iter() {
        let starts_line = matches!(
            event,
            Event::Start(Tag::Paragraph) | Event::SoftBreak | Event::HardBreak
        );
        match event {
            Event::Start(Tag::BlockQuote(_) | Tag::Item) => scopes.push(range),
            Event::End(TagEnd::BlockQuote(_) | TagEnd::Item) => {
                scopes.pop();
            }
            Event::Start(Tag::Paragraph) => in_paragraph = true,
            Event::End(TagEnd::Paragraph) => in_paragraph = false,
            Event::Text(_) if in_paragraph && at_line_start => {
                let start = range.start;
                let Some(rest) = source[start..].strip_prefix(":::") else {
                    at_line_start = false;
                    continue;
                };
                let end = start + 3 + rest.find('\n').unwrap_or(rest.len());
                let info = source[start + 3..end].trim();
                let scope = scopes.last().unwrap_or(&document).clone();
                let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
                let prefix = &source[line_start..start];
                while open.last().is_some_and(|o| o.scope.end <= start) {
                    open.pop();
                }

                let marker = if info.is_empty() {
                    let closes = |top: &OpenContainer| {
                        top.scope == scope
                            || (prefix.trim().is_empty() && prefix.len() <= top.indent)
                    };
                    if open.last().is_some_and(closes) {
                        open.pop().map(|top| Marker::Close(top.index))
                    } else {
                        None
                    }
                } else {
                    parse_opening(info, &is_registered).map(|block| {
                        let index = containers.blocks.len();
                        containers.blocks.push(block);
                        open.push(OpenContainer {
                            index,
                            scope,
                            indent: prefix.len(),
                        });
                        Marker::Open(index)
                    })
                };

                if let Some(marker) = marker {
                    containers.markers.push(MarkerLine {
                        marker,
                        line: source[start..end].trim_end().to_owned(),
                    });
                    edits.push(start..end);
                }
            }
            _ => {}
        }
        at_line_start = starts_line;
    }

    if containers.blocks.is_empty() {
        return None;
    }

    containers.tag = marker_tag(source);
    let mut expanded = String::with_capacity(source.len() + edits.len() * 24);
    let mut last = 0;
    for (id, edit) in edits.iter().enumerate() {
        expanded.push_str(&source[last..edit.start]);
        write!(expanded, "<!--{}:{id}-->", containers.tag).unwrap();
        last = edit.end;
    }
    expanded.push_str(&source[last..]);

    Some(ExpandedSource {
        source: expanded,
        containers,
    })
}

/// Pick a marker tag that does not occur anywhere in `source`.
fn marker_tag(source: &str) -> String {
    let mut tag = MARKER_TAG.to_owned();
    while source.contains(tag.as_str()) {
        tag.push('-');
    }
    tag
}

fn parse_opening(info: &str, is_registered: impl Fn(&str) -> bool) -> Option<ContainerBlock> {
    let (kind, title) = match info.split_once(char::is_whitespace) {
        Some((kind, title)) => (kind, title.trim()),
        None => (info, ""),
    };
    if !is_registered(kind) {
        return None;
    }
    let title = (!title.is_empty()).then(|| title.to_owned());
    Some(ContainerBlock::new(kind, title))
}
