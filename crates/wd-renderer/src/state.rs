//! Per-pass state for event rendering.
//!
//! These structs track context while pulldown-cmark events are walked. A fresh
//! set is created for every render pass, so nothing here outlives one document.

use pulldown_cmark::Alignment;

/// State for tracking code block rendering.
#[derive(Default)]
pub(crate) struct CodeBlockState {
    /// Whether we're inside a code block.
    active: bool,
    /// Whether the block was fenced (indented blocks skip the fence rule).
    fenced: bool,
    /// Raw fence info string (e.g., "rust title=main.rs").
    info: String,
    /// Buffer for code block content.
    buffer: String,
}

impl CodeBlockState {
    /// Start a new code block.
    pub(crate) fn start(&mut self, fenced: bool, info: &str) {
        self.active = true;
        self.fenced = fenced;
        self.info.clear();
        self.info.push_str(info);
        self.buffer.clear();
    }

    /// End the current code block and return `(fenced, info, content)`.
    pub(crate) fn end(&mut self) -> (bool, String, String) {
        self.active = false;
        (
            self.fenced,
            std::mem::take(&mut self.info),
            std::mem::take(&mut self.buffer),
        )
    }

    /// Check if we're inside a code block.
    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    /// Append text to the code block buffer.
    pub(crate) fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// State for tracking table rendering.
#[derive(Default)]
pub(crate) struct TableState {
    /// Whether we're inside the table header row.
    in_head: bool,
    /// Column alignments for current table.
    alignments: Vec<Alignment>,
    /// Current column index in table row.
    cell_index: usize,
}

impl TableState {
    /// Start a new table with column alignments.
    pub(crate) fn start(&mut self, alignments: Vec<Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.cell_index = 0;
    }

    pub(crate) fn start_head(&mut self) {
        self.in_head = true;
        self.cell_index = 0;
    }

    pub(crate) fn end_head(&mut self) {
        self.in_head = false;
    }

    pub(crate) fn start_row(&mut self) {
        self.cell_index = 0;
    }

    pub(crate) fn next_cell(&mut self) {
        self.cell_index += 1;
    }

    pub(crate) fn is_in_head(&self) -> bool {
        self.in_head
    }

    /// Get the alignment style for the current cell.
    pub(crate) fn current_alignment_style(&self) -> &'static str {
        match self.alignments.get(self.cell_index) {
            Some(Alignment::Left) => r#" style="text-align:left""#,
            Some(Alignment::Center) => r#" style="text-align:center""#,
            Some(Alignment::Right) => r#" style="text-align:right""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// State for tracking image alt text capture.
#[derive(Default)]
pub(crate) struct ImageState {
    active: bool,
    alt_text: String,
    src: String,
    title: String,
}

impl ImageState {
    /// Start capturing alt text for an image.
    pub(crate) fn start(&mut self, src: &str, title: &str) {
        self.active = true;
        self.alt_text.clear();
        self.src = src.to_owned();
        self.title = title.to_owned();
    }

    /// End image capture and return `(src, alt, title)`.
    pub(crate) fn end(&mut self) -> (String, String, String) {
        self.active = false;
        (
            std::mem::take(&mut self.src),
            std::mem::take(&mut self.alt_text),
            std::mem::take(&mut self.title),
        )
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.alt_text.push_str(text);
    }
}

/// Buffers for the heading currently being rendered.
///
/// Headings are written only when they end, because the heading rule needs
/// both the plain text (for slugs and the table of contents) and the inline
/// HTML.
#[derive(Default)]
pub(crate) struct HeadingState {
    /// Current heading level (None if not in a heading).
    current_level: Option<u8>,
    /// Plain text of the heading.
    text: String,
    /// Inline HTML of the heading.
    html: String,
}

impl HeadingState {
    pub(crate) fn is_active(&self) -> bool {
        self.current_level.is_some()
    }

    pub(crate) fn start(&mut self, level: u8) {
        self.current_level = Some(level);
        self.text.clear();
        self.html.clear();
    }

    /// Finish the heading and return `(level, text, html)`.
    pub(crate) fn complete(&mut self) -> Option<(u8, String, String)> {
        let level = self.current_level.take()?;
        let text = std::mem::take(&mut self.text);
        let html = std::mem::take(&mut self.html);
        Some((level, text.trim().to_owned(), html.trim().to_owned()))
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn push_html(&mut self, html: &str) {
        self.html.push_str(html);
    }
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
