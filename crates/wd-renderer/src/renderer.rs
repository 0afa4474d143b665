//! Event walker for a single render pass.

use std::fmt::Write;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Tag, TagEnd};

use crate::container::{Containers, Marker, MarkerLine};
use crate::env::RenderEnv;
use crate::fence::CodeBlock;
use crate::html::{AlertKind, alert_end, alert_start};
use crate::parser::MarkdownParser;
use crate::rules::{HeadingBlock, RuleError, write_plain_code};
use crate::state::{CodeBlockState, HeadingState, ImageState, TableState, escape_html};

/// Walks pulldown-cmark events and writes HTML, calling the parser's rules
/// for fenced code, headings and containers.
///
/// One pass renders one document; the pass borrows the environment mutably so
/// rules can append to the table of contents.
pub(crate) struct RenderPass<'p, 'e> {
    parser: &'p MarkdownParser,
    env: &'e mut RenderEnv,
    /// Containers found while expanding the source.
    containers: &'p Containers,
    /// Open containers as `(block index, depth)`, innermost last.
    open_containers: Vec<(usize, usize)>,
    /// Number of enclosing blockquotes and list items.
    depth: usize,
    output: String,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    heading: HeadingState,
    /// Stack of alert kinds for nested blockquotes (regular blockquote uses None).
    alert_stack: Vec<Option<AlertKind>>,
    /// Index of the next fenced code block.
    code_block_index: usize,
}

impl<'p, 'e> RenderPass<'p, 'e> {
    pub(crate) fn new(
        parser: &'p MarkdownParser,
        env: &'e mut RenderEnv,
        containers: &'p Containers,
    ) -> Self {
        Self {
            parser,
            env,
            containers,
            open_containers: Vec::new(),
            depth: 0,
            output: String::with_capacity(4096),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            heading: HeadingState::default(),
            alert_stack: Vec::new(),
            code_block_index: 0,
        }
    }

    /// Render all events and return the HTML.
    pub(crate) fn run<'a, I>(mut self, events: I) -> Result<String, RuleError>
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event)?;
        }
        self.close_containers_from(0)?;
        Ok(self.output)
    }

    /// Push content to output or heading buffer based on context.
    ///
    /// Markup inside image alt text is dropped; only its text is kept.
    fn push_inline(&mut self, content: &str) {
        if self.image.is_active() {
            return;
        }
        if self.heading.is_active() {
            self.heading.push_html(content);
        } else {
            self.output.push_str(content);
        }
    }

    fn process_event(&mut self, event: Event<'_>) -> Result<(), RuleError> {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => return self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) => return self.block_html(&html),
            Event::InlineHtml(html) => self.inline_html(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.push_inline("<br>"),
            Event::Rule => self.output.push_str("<hr>"),
            Event::TaskListMarker(checked) => self.task_list_marker(checked),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not supported
            }
        }
        Ok(())
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => {
                // Written in end_tag once the heading rule has the full text.
                self.heading.start(heading_level_to_num(level));
            }
            Tag::BlockQuote(kind) => {
                self.depth += 1;
                if let Some(bq_kind) = kind {
                    let alert_kind = AlertKind::from(bq_kind);
                    self.alert_stack.push(Some(alert_kind));
                    alert_start(alert_kind, &mut self.output);
                } else {
                    self.alert_stack.push(None);
                    self.output.push_str("<blockquote>");
                }
            }
            Tag::CodeBlock(kind) => match kind {
                CodeBlockKind::Fenced(info) => self.code.start(true, &info),
                CodeBlockKind::Indented => self.code.start(false, ""),
            },
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>"),
                Some(n) => write!(self.output, r#"<ol start="{n}">"#).unwrap(),
                None => self.output.push_str("<ul>"),
            },
            Tag::Item => {
                self.depth += 1;
                self.output.push_str("<li>");
            }
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let align = self.table.current_alignment_style();
                let tag = if self.table.is_in_head() { "th" } else { "td" };
                write!(self.output, "<{tag}{align}>").unwrap();
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<s>"),
            Tag::Link {
                dest_url, title, ..
            } => {
                let link_tag = if title.is_empty() {
                    format!(r#"<a href="{}">"#, escape_html(&dest_url))
                } else {
                    format!(
                        r#"<a href="{}" title="{}">"#,
                        escape_html(&dest_url),
                        escape_html(&title)
                    )
                };
                self.push_inline(&link_tag);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                // Alt text is collected until the image ends.
                self.image.start(&dest_url, &title);
            }
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
        }
    }

    fn end_tag(&mut self, tag: TagEnd) -> Result<(), RuleError> {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(_) => {
                if let Some((level, text, html)) = self.heading.complete() {
                    let heading = HeadingBlock { level, text, html };
                    self.parser
                        .heading_rule()
                        .render(&heading, self.env, &mut self.output)?;
                }
            }
            TagEnd::BlockQuote(_) => {
                self.leave_block()?;
                match self.alert_stack.pop() {
                    Some(Some(_)) => alert_end(&mut self.output),
                    _ => self.output.push_str("</blockquote>"),
                }
            }
            TagEnd::CodeBlock => {
                let (fenced, info, content) = self.code.end();
                if fenced {
                    let block = CodeBlock::new(&info, content, self.code_block_index);
                    self.code_block_index += 1;
                    self.parser
                        .fence_rule()
                        .render(&block, self.env, &mut self.output)?;
                } else {
                    write_plain_code(None, &content, &mut self.output);
                }
            }
            TagEnd::List(ordered) => {
                self.output
                    .push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            TagEnd::Item => {
                self.leave_block()?;
                self.output.push_str("</li>");
            }
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
            TagEnd::Image => {
                let (src, alt, title) = self.image.end();
                let title_attr = if title.is_empty() {
                    String::new()
                } else {
                    format!(r#" title="{}""#, escape_html(&title))
                };
                let img = format!(
                    r#"<img src="{}"{title_attr} alt="{}">"#,
                    escape_html(&src),
                    escape_html(&alt)
                );
                self.push_inline(&img);
            }
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead><tbody>");
                self.table.end_head();
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                self.output.push_str(if self.table.is_in_head() {
                    "</th>"
                } else {
                    "</td>"
                });
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</s>"),
            TagEnd::Link => self.push_inline("</a>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        // Priority: code > image > heading > normal text
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else if self.heading.is_active() {
            self.heading.push_text(text);
            self.heading.push_html(&escape_html(text));
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
            return;
        }
        if self.heading.is_active() {
            self.heading.push_text(code);
        }
        let html = format!("<code>{}</code>", escape_html(code));
        self.push_inline(&html);
    }

    fn block_html(&mut self, html: &str) -> Result<(), RuleError> {
        let containers = self.containers;
        if let Some(line) = containers.marker(html) {
            return self.container_line(line);
        }
        if self.parser.options().html {
            self.output.push_str(html);
        } else {
            self.output.push_str(&escape_html(html));
        }
        Ok(())
    }

    fn inline_html(&mut self, html: &str) {
        let containers = self.containers;
        if let Some(line) = containers.marker(html) {
            // Marker swallowed by a paragraph: the line was never a container.
            self.push_inline(&escape_html(&line.line));
        } else if self.parser.options().html {
            self.push_inline(html);
        } else {
            self.push_inline(&escape_html(html));
        }
    }

    /// Render a marker that forms its own HTML block.
    ///
    /// A close is honored only for the innermost open container. Markers that
    /// are not honored are written back as the original line.
    fn container_line(&mut self, line: &MarkerLine) -> Result<(), RuleError> {
        let honored = match line.marker {
            Marker::Open(index) => self.open_container(index)?,
            Marker::Close(index) => {
                if self.open_containers.last().is_some_and(|&(open, _)| open == index) {
                    self.open_containers.pop();
                    self.close_container(index)?;
                    true
                } else {
                    false
                }
            }
        };
        if !honored {
            write!(self.output, "<p>{}</p>", escape_html(&line.line)).unwrap();
        }
        Ok(())
    }

    fn open_container(&mut self, index: usize) -> Result<bool, RuleError> {
        let containers = self.containers;
        let Some(block) = containers.block(index) else {
            return Ok(false);
        };
        let Some(rule) = self.parser.container_rule(&block.kind) else {
            return Ok(false);
        };
        rule.open(block, self.env, &mut self.output)?;
        self.open_containers.push((index, self.depth));
        Ok(true)
    }

    fn close_container(&mut self, index: usize) -> Result<(), RuleError> {
        let containers = self.containers;
        if let Some(block) = containers.block(index)
            && let Some(rule) = self.parser.container_rule(&block.kind)
        {
            rule.close(block, self.env, &mut self.output)?;
        }
        Ok(())
    }

    /// Close containers opened at `depth` or deeper.
    fn close_containers_from(&mut self, depth: usize) -> Result<(), RuleError> {
        while let Some(&(index, open_depth)) = self.open_containers.last() {
            if open_depth < depth {
                break;
            }
            self.open_containers.pop();
            self.close_container(index)?;
        }
        Ok(())
    }

    /// End of a blockquote or list item: containers left open inside it end too.
    fn leave_block(&mut self) -> Result<(), RuleError> {
        self.close_containers_from(self.depth)?;
        self.depth = self.depth.saturating_sub(1);
        Ok(())
    }

    fn soft_break(&mut self) {
        if self.heading.is_active() {
            self.heading.push_text(" ");
        }
        self.push_inline("\n");
    }

    fn task_list_marker(&mut self, checked: bool) {
        if checked {
            self.output
                .push_str(r#"<input type="checkbox" checked disabled> "#);
        } else {
            self.output.push_str(r#"<input type="checkbox" disabled> "#);
        }
    }
}

fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
