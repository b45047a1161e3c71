//! State structs tracking context during event processing.

use pulldown_cmark::{Alignment, CodeBlockKind, HeadingLevel};

use crate::escape::escape_html_into;

/// Code block text, buffered until the block closes.
///
/// The content is written escaped in one piece so autolinking and raw HTML
/// filtering never see it.
#[derive(Default)]
pub(crate) struct CodeBlockState {
    language: Option<String>,
    /// `Some` while inside a block.
    content: Option<String>,
}

impl CodeBlockState {
    /// Enter a block; the language is the first word of a fence's info string.
    pub(crate) fn start(&mut self, kind: &CodeBlockKind<'_>) {
        self.language = match kind {
            CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_owned),
            CodeBlockKind::Indented => None,
        };
        self.content = Some(String::new());
    }

    pub(crate) fn is_active(&self) -> bool {
        self.content.is_some()
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        if let Some(content) = &mut self.content {
            content.push_str(text);
        }
    }

    /// Leave the block, writing it as `<pre><code>`.
    pub(crate) fn finish(&mut self, out: &mut String) {
        let content = self.content.take().unwrap_or_default();
        out.push_str("<pre><code");
        if let Some(language) = self.language.take() {
            out.push_str(r#" class="language-"#);
            escape_html_into(out, &language);
            out.push('"');
        }
        out.push('>');
        escape_html_into(out, &content);
        out.push_str("</code></pre>\n");
    }
}

/// Column alignments and position within a pipe table.
#[derive(Default)]
pub(crate) struct TableState {
    alignments: Vec<Alignment>,
    in_head: bool,
    column: usize,
}

impl TableState {
    pub(crate) fn start(&mut self, alignments: Vec<Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.column = 0;
    }

    pub(crate) fn start_head(&mut self) {
        self.in_head = true;
        self.column = 0;
    }

    pub(crate) fn end_head(&mut self) {
        self.in_head = false;
    }

    pub(crate) fn start_row(&mut self) {
        self.column = 0;
    }

    /// Write `<th>` or `<td>` for the current column, with its alignment.
    pub(crate) fn open_cell(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.cell_tag());
        out.push_str(match self.alignments.get(self.column) {
            Some(Alignment::Left) => r#" style="text-align:left""#,
            Some(Alignment::Center) => r#" style="text-align:center""#,
            Some(Alignment::Right) => r#" style="text-align:right""#,
            Some(Alignment::None) | None => "",
        });
        out.push('>');
    }

    /// Close the current cell and move to the next column.
    pub(crate) fn close_cell(&mut self, out: &mut String) {
        out.push_str("</");
        out.push_str(self.cell_tag());
        out.push_str(">\n");
        self.column += 1;
    }

    fn cell_tag(&self) -> &'static str {
        if self.in_head { "th" } else { "td" }
    }
}

/// State for capturing image alt text.
///
/// Images nested inside an image's alt text only contribute their own alt
/// text, so the state tracks nesting depth rather than a flag.
#[derive(Default)]
pub(crate) struct ImageState {
    depth: usize,
    alt_text: String,
}

impl ImageState {
    /// Enter an image; alt text resets only for the outermost one.
    pub(crate) fn start(&mut self) {
        if self.depth == 0 {
            self.alt_text.clear();
        }
        self.depth += 1;
    }

    /// Leave an image. Returns the alt text when the outermost image ends.
    pub(crate) fn end(&mut self) -> Option<String> {
        self.depth = self.depth.saturating_sub(1);
        (self.depth == 0).then(|| std::mem::take(&mut self.alt_text))
    }

    pub(crate) fn is_active(&self) -> bool {
        self.depth > 0
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.alt_text.push_str(text);
    }
}

/// Numbers headings in document order for `toc_N` anchors.
///
/// The content and TOC renderers each own one, so both passes over the same
/// input assign the same numbers.
#[derive(Default)]
pub(crate) struct AnchorCounter {
    next: usize,
}

impl AnchorCounter {
    /// Append the anchor id for the next heading to `out`.
    pub(crate) fn push_next(&mut self, prefix: Option<&str>, out: &mut String) {
        if let Some(prefix) = prefix {
            escape_html_into(out, prefix);
        }
        out.push_str("toc_");
        out.push_str(&self.next.to_string());
        self.next += 1;
    }
}

/// Convert heading level enum to number (1-6).
pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_block_state() {
        let mut state = CodeBlockState::default();
        assert!(!state.is_active());

        state.start(&CodeBlockKind::Fenced("rust ignore".into()));
        assert!(state.is_active());
        state.push_str("if a < b {}\n");

        let mut out = String::new();
        state.finish(&mut out);
        assert_eq!(
            out,
            "<pre><code class=\"language-rust\">if a &lt; b {}\n</code></pre>\n"
        );
        assert!(!state.is_active());

        state.start(&CodeBlockKind::Indented);
        state.push_str("x");
        out.clear();
        state.finish(&mut out);
        assert_eq!(out, "<pre><code>x</code></pre>\n");
    }

    #[test]
    fn test_table_state() {
        let mut state = TableState::default();
        state.start(vec![Alignment::Left, Alignment::None, Alignment::Right]);
        let mut out = String::new();

        state.start_head();
        for _ in 0..3 {
            state.open_cell(&mut out);
            state.close_cell(&mut out);
        }
        assert_eq!(
            out,
            concat!(
                "<th style=\"text-align:left\"></th>\n",
                "<th></th>\n",
                "<th style=\"text-align:right\"></th>\n",
            )
        );

        state.end_head();
        state.start_row();
        out.clear();
        state.open_cell(&mut out);
        state.close_cell(&mut out);
        assert_eq!(out, "<td style=\"text-align:left\"></td>\n");
    }

    #[test]
    fn test_image_state_nesting() {
        let mut state = ImageState::default();
        assert!(!state.is_active());

        state.start();
        state.push_str("outer ");
        state.start();
        assert!(state.is_active());
        state.push_str("inner");
        assert_eq!(state.end(), None);
        assert!(state.is_active());
        assert_eq!(state.end(), Some("outer inner".to_owned()));
        assert!(!state.is_active());
    }

    #[test]
    fn test_anchor_counter() {
        let mut counter = AnchorCounter::default();
        let mut out = String::new();
        counter.push_next(None, &mut out);
        out.push(' ');
        counter.push_next(Some("p_"), &mut out);
        assert_eq!(out, "toc_0 p_toc_1");
    }
}
