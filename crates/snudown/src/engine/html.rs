//! Content renderer.

use std::borrow::Cow;
use std::fmt::Write;

use pulldown_cmark::{Event, LinkType, Tag, TagEnd};

use super::Callbacks;
use super::autolink::{self, Segment};
use super::state::{AnchorCounter, CodeBlockState, ImageState, TableState, heading_level_to_num};
use crate::escape::{escape_href_into, escape_html_into};
use crate::flags::HtmlFlags;
use crate::options::RenderOptions;
use crate::policy::{LinkDecorator, RawHtmlFilter, is_safe_link};

/// Writes the HTML for one render call.
///
/// Blocks are separated by a blank line except at the start of the output
/// or of a container (blockquote or list item).
pub(super) struct HtmlWriter<'a> {
    out: &'a mut String,
    options: &'a RenderOptions,
    decorator: Option<&'a dyn LinkDecorator>,
    raw_html: RawHtmlFilter<'a>,
    autolink: bool,
    /// Output length right after the most recent container opened.
    container_mark: Option<usize>,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    anchors: AnchorCounter,
    /// `(src, title)` of the outermost open image.
    pending_image: Option<(String, String)>,
    /// One entry per open link; `true` when an anchor tag was written.
    links: Vec<bool>,
    /// Output offsets where open list items' content starts.
    items: Vec<usize>,
    html_block: Option<String>,
    pending_text: String,
}

impl<'a> HtmlWriter<'a> {
    pub(super) fn new(
        options: &'a RenderOptions,
        callbacks: &'a Callbacks,
        autolink: bool,
        out: &'a mut String,
    ) -> Self {
        Self {
            out,
            options,
            decorator: callbacks.link_attributes.as_deref(),
            raw_html: RawHtmlFilter::new(options.html_flags, callbacks.whitelist.as_deref()),
            autolink,
            container_mark: None,
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            anchors: AnchorCounter::default(),
            pending_image: None,
            links: Vec::new(),
            items: Vec::new(),
            html_block: None,
            pending_text: String::new(),
        }
    }

    pub(super) fn run<'e, I>(mut self, events: I)
    where
        I: Iterator<Item = Event<'e>>,
    {
        for event in events {
            self.process_event(event);
        }
        self.flush_text();
    }

    fn flag(&self, flag: HtmlFlags) -> bool {
        self.options.html_flags.contains(flag)
    }

    fn process_event(&mut self, event: Event<'_>) {
        if let Event::Text(text) = event {
            self.text(&text);
            return;
        }
        self.flush_text();

        if self.image.is_active() {
            self.alt_event(event);
            return;
        }

        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) => match &mut self.html_block {
                Some(block) => block.push_str(&html),
                None => self.block_html(&html),
            },
            Event::InlineHtml(html) => self.raw_html.apply(&html, self.out),
            Event::SoftBreak => self.out.push('\n'),
            Event::HardBreak => self.hard_break(),
            Event::Rule => self.horizontal_rule(),
            Event::Text(_)
            | Event::TaskListMarker(_)
            | Event::FootnoteReference(_)
            | Event::InlineMath(_)
            | Event::DisplayMath(_) => {}
        }
    }

    /// Events inside an image only contribute alt text.
    fn alt_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Image { .. }) => {
                self.image.start();
            }
            Event::End(TagEnd::Image) => {
                if let Some(alt) = self.image.end() {
                    self.write_image(&alt);
                }
            }
            Event::Code(code) => self.image.push_str(&code),
            Event::SoftBreak | Event::HardBreak => self.image.push_str(" "),
            _ => {}
        }
    }

    /// Separate a new block from preceding output.
    fn open_block(&mut self) {
        if !self.out.is_empty() && self.container_mark != Some(self.out.len()) {
            self.out.push('\n');
        }
    }

    fn mark_container(&mut self) {
        self.container_mark = Some(self.out.len());
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.open_block();
                self.out.push_str("<p>");
            }
            Tag::Heading { level, .. } => {
                self.open_block();
                write!(self.out, "<h{}", heading_level_to_num(level)).unwrap();
                if self.flag(HtmlFlags::TOC) {
                    self.out.push_str(r#" id=""#);
                    self.anchors
                        .push_next(self.options.toc_id_prefix.as_deref(), self.out);
                    self.out.push('"');
                }
                self.out.push('>');
            }
            Tag::BlockQuote(_) => {
                self.open_block();
                self.out.push_str("<blockquote>\n");
                self.mark_container();
            }
            Tag::CodeBlock(kind) => self.code.start(&kind),
            Tag::HtmlBlock => self.html_block = Some(String::new()),
            Tag::List(start) => {
                self.open_block();
                match start {
                    Some(1) => self.out.push_str("<ol>\n"),
                    Some(n) => writeln!(self.out, "<ol start=\"{n}\">").unwrap(),
                    None => self.out.push_str("<ul>\n"),
                }
            }
            Tag::Item => {
                self.out.push_str("<li>");
                self.items.push(self.out.len());
                self.mark_container();
            }
            Tag::Table(alignments) => {
                self.open_block();
                self.table.start(alignments);
                self.out.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.out.push_str("<thead>\n<tr>\n");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.out.push_str("<tr>\n");
            }
            Tag::TableCell => self.table.open_cell(self.out),
            Tag::Emphasis => self.out.push_str("<em>"),
            Tag::Strong => self.out.push_str("<strong>"),
            Tag::Strikethrough => self.out.push_str("<del>"),
            Tag::Superscript => self.out.push_str("<sup>"),
            Tag::Subscript => self.out.push_str("<sub>"),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => self.open_link(link_type, &dest_url, &title),
            Tag::Image {
                link_type,
                dest_url,
                title,
                ..
            } => {
                if self.flag(HtmlFlags::SKIP_IMAGES) {
                    self.out.push('!');
                    self.open_link(link_type, &dest_url, &title);
                } else {
                    self.image.start();
                    self.pending_image = Some((dest_url.into_string(), title.into_string()));
                }
            }
            Tag::FootnoteDefinition(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::MetadataBlock(_) => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.out.push_str("</p>\n"),
            TagEnd::Heading(level) => {
                writeln!(self.out, "</h{}>", heading_level_to_num(level)).unwrap();
            }
            TagEnd::BlockQuote(_) => self.out.push_str("</blockquote>\n"),
            TagEnd::CodeBlock => {
                self.open_block();
                self.code.finish(self.out);
            }
            TagEnd::HtmlBlock => {
                if let Some(block) = self.html_block.take() {
                    self.block_html(&block);
                }
            }
            TagEnd::List(ordered) => {
                self.out
                    .push_str(if ordered { "</ol>\n" } else { "</ul>\n" });
            }
            TagEnd::Item => {
                let start = self.items.pop().unwrap_or(0);
                while self.out.len() > start && self.out.ends_with('\n') {
                    self.out.pop();
                }
                self.out.push_str("</li>\n");
            }
            TagEnd::Table => self.out.push_str("</tbody></table>\n"),
            TagEnd::TableHead => {
                self.out.push_str("</tr>\n</thead><tbody>\n");
                self.table.end_head();
            }
            TagEnd::TableRow => self.out.push_str("</tr>\n"),
            TagEnd::TableCell => self.table.close_cell(self.out),
            TagEnd::Emphasis => self.out.push_str("</em>"),
            TagEnd::Strong => self.out.push_str("</strong>"),
            TagEnd::Strikethrough => self.out.push_str("</del>"),
            TagEnd::Superscript => self.out.push_str("</sup>"),
            TagEnd::Subscript => self.out.push_str("</sub>"),
            // Images only reach here when rendered as links.
            TagEnd::Link | TagEnd::Image => {
                if self.links.pop() == Some(true) {
                    self.out.push_str("</a>");
                }
            }
            TagEnd::FootnoteDefinition
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition
            | TagEnd::MetadataBlock(_) => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else {
            self.pending_text.push_str(text);
        }
    }

    /// Write buffered text, detecting bare links outside of anchors.
    fn flush_text(&mut self) {
        if self.pending_text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending_text);
        if self.autolink && self.links.is_empty() {
            for segment in autolink::split(&text) {
                match segment {
                    Segment::Text(plain) => escape_html_into(self.out, plain),
                    Segment::Link { href, text } => self.write_autolink(&href, text),
                }
            }
        } else {
            escape_html_into(self.out, &text);
        }
        self.pending_text = text;
        self.pending_text.clear();
    }

    fn write_autolink(&mut self, href: &str, text: &str) {
        if self.flag(HtmlFlags::SAFELINK) && !is_safe_link(href) {
            escape_html_into(self.out, text);
            return;
        }
        self.out.push_str(r#"<a href=""#);
        escape_href_into(self.out, href);
        self.out.push('"');
        if let Some(decorator) = self.decorator {
            decorator.decorate(href, self.options, self.out);
        }
        self.out.push('>');
        escape_html_into(self.out, text);
        self.out.push_str("</a>");
    }

    fn open_link(&mut self, link_type: LinkType, dest_url: &str, title: &str) {
        let url: Cow<'_, str> = if link_type == LinkType::Email {
            Cow::Owned(format!("mailto:{dest_url}"))
        } else {
            Cow::Borrowed(dest_url)
        };
        if self.flag(HtmlFlags::SAFELINK) && !is_safe_link(&url) {
            self.links.push(false);
            return;
        }

        self.out.push_str(r#"<a href=""#);
        escape_href_into(self.out, &url);
        self.out.push('"');
        if !title.is_empty() {
            self.out.push_str(r#" title=""#);
            escape_html_into(self.out, title);
            self.out.push('"');
        }
        if let Some(decorator) = self.decorator {
            decorator.decorate(&url, self.options, self.out);
        }
        self.out.push('>');
        self.links.push(true);
    }

    fn write_image(&mut self, alt: &str) {
        let Some((src, title)) = self.pending_image.take() else {
            return;
        };
        if self.flag(HtmlFlags::SAFELINK) && !is_safe_link(&src) {
            escape_html_into(self.out, alt);
            return;
        }

        self.out.push_str(r#"<img src=""#);
        escape_href_into(self.out, &src);
        self.out.push_str(r#"" alt=""#);
        escape_html_into(self.out, alt);
        self.out.push('"');
        if !title.is_empty() {
            self.out.push_str(r#" title=""#);
            escape_html_into(self.out, &title);
            self.out.push('"');
        }
        self.out
            .push_str(if self.flag(HtmlFlags::USE_XHTML) { "/>" } else { ">" });
    }

    fn inline_code(&mut self, code: &str) {
        self.out.push_str("<code>");
        escape_html_into(self.out, code);
        self.out.push_str("</code>");
    }

    /// Raw HTML blocks. Filtered blocks are wrapped in a paragraph.
    fn block_html(&mut self, html: &str) {
        let filter = self.raw_html;
        if filter.drops_all() {
            return;
        }
        self.open_block();
        if filter.passes_through() {
            self.out.push_str(html.trim_end_matches('\n'));
            self.out.push('\n');
            return;
        }
        self.out.push_str("<p>");
        filter.apply(html.strip_suffix('\n').unwrap_or(html), self.out);
        self.out.push_str("</p>\n");
    }

    fn hard_break(&mut self) {
        self.out.push_str(if self.flag(HtmlFlags::USE_XHTML) {
            "<br/>\n"
        } else {
            "<br>\n"
        });
    }

    fn horizontal_rule(&mut self) {
        self.open_block();
        self.out.push_str(if self.flag(HtmlFlags::USE_XHTML) {
            "<hr/>\n"
        } else {
            "<hr>\n"
        });
    }
}
