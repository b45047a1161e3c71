//! Table of contents renderer.
//!
//! Emits a nested list linking to each heading's `toc_N` anchor. Levels
//! are relative to the first heading, so a document starting at `###`
//! still gets a single top-level list.

use pulldown_cmark::{Event, Tag, TagEnd};

use super::state::{AnchorCounter, heading_level_to_num};
use crate::escape::escape_html_into;
use crate::options::RenderOptions;

pub(super) struct TocWriter<'a> {
    out: &'a mut String,
    prefix: Option<&'a str>,
    anchors: AnchorCounter,
    /// Nesting depth of the list currently open; 0 before the first heading.
    current_level: u8,
    level_offset: u8,
    in_heading: bool,
}

impl<'a> TocWriter<'a> {
    pub(super) fn new(options: &'a RenderOptions, out: &'a mut String) -> Self {
        Self {
            out,
            prefix: options.toc_id_prefix.as_deref(),
            anchors: AnchorCounter::default(),
            current_level: 0,
            level_offset: 0,
            in_heading: false,
        }
    }

    pub(super) fn run<'e, I>(mut self, events: I)
    where
        I: Iterator<Item = Event<'e>>,
    {
        for event in events {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    self.start_heading(heading_level_to_num(level));
                }
                Event::End(TagEnd::Heading(_)) => {
                    self.out.push_str("</a>\n");
                    self.in_heading = false;
                }
                event if self.in_heading => self.inline(event),
                _ => {}
            }
        }
        self.finish();
    }

    fn start_heading(&mut self, level: u8) {
        if self.current_level == 0 {
            self.level_offset = level.saturating_sub(1);
            self.out.push_str("<div class=\"toc\">\n");
        }
        let level = level.saturating_sub(self.level_offset).max(1);

        if level > self.current_level {
            while level > self.current_level {
                self.out.push_str("<ul>\n<li>\n");
                self.current_level += 1;
            }
        } else if level < self.current_level {
            self.out.push_str("</li>\n");
            while level < self.current_level {
                self.out.push_str("</ul>\n</li>\n");
                self.current_level -= 1;
            }
            self.out.push_str("<li>\n");
        } else {
            self.out.push_str("</li>\n<li>\n");
        }

        self.out.push_str("<a href=\"#");
        self.anchors.push_next(self.prefix, self.out);
        self.out.push_str("\">");
        self.in_heading = true;
    }

    /// Heading content; links are flattened to their text.
    fn inline(&mut self, event: Event<'_>) {
        match event {
            Event::Text(text) => escape_html_into(self.out, &text),
            Event::Code(code) => {
                self.out.push_str("<code>");
                escape_html_into(self.out, &code);
                self.out.push_str("</code>");
            }
            Event::SoftBreak | Event::HardBreak => self.out.push(' '),
            Event::Start(tag) => self.out.push_str(match tag {
                Tag::Emphasis => "<em>",
                Tag::Strong => "<strong>",
                Tag::Strikethrough => "<del>",
                Tag::Superscript => "<sup>",
                Tag::Subscript => "<sub>",
                _ => "",
            }),
            Event::End(tag) => self.out.push_str(match tag {
                TagEnd::Emphasis => "</em>",
                TagEnd::Strong => "</strong>",
                TagEnd::Strikethrough => "</del>",
                TagEnd::Superscript => "</sup>",
                TagEnd::Subscript => "</sub>",
                _ => "",
            }),
            _ => {}
        }
    }

    fn finish(&mut self) {
        if self.current_level == 0 {
            return;
        }
        while self.current_level > 0 {
            self.out.push_str("</li>\n</ul>\n");
            self.current_level -= 1;
        }
        self.out.push_str("</div>\n");
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use pulldown_cmark::Parser;

    use super::*;
    use crate::flags::HtmlFlags;

    fn toc(markdown: &str, prefix: Option<&str>) -> String {
        let options = RenderOptions {
            toc_id_prefix: prefix.map(str::to_owned),
            ..RenderOptions::new(HtmlFlags::empty())
        };
        let mut out = String::new();
        TocWriter::new(&options, &mut out).run(Parser::new(markdown));
        out
    }

    #[test]
    fn test_no_headings() {
        assert_eq!(toc("", None), "");
        assert_eq!(toc("just text\n\n- list", None), "");
    }

    #[test]
    fn test_single_heading_with_prefix() {
        assert_eq!(
            toc("### Test", Some("prefixed_")),
            "<div class=\"toc\">\n<ul>\n<li>\n<a href=\"#prefixed_toc_0\">Test</a>\n</li>\n</ul>\n</div>\n"
        );
    }

    #[test]
    fn test_nested_levels() {
        assert_eq!(
            toc("# A\n\n## B\n\n## C\n\n# D", None),
            concat!(
                "<div class=\"toc\">\n",
                "<ul>\n<li>\n<a href=\"#toc_0\">A</a>\n",
                "<ul>\n<li>\n<a href=\"#toc_1\">B</a>\n",
                "</li>\n<li>\n<a href=\"#toc_2\">C</a>\n",
                "</li>\n</ul>\n</li>\n<li>\n<a href=\"#toc_3\">D</a>\n",
                "</li>\n</ul>\n",
                "</div>\n",
            )
        );
    }

    #[test]
    fn test_levels_above_first_heading_clamp() {
        assert_eq!(
            toc("## A\n\n# B", None),
            concat!(
                "<div class=\"toc\">\n",
                "<ul>\n<li>\n<a href=\"#toc_0\">A</a>\n",
                "</li>\n<li>\n<a href=\"#toc_1\">B</a>\n",
                "</li>\n</ul>\n",
                "</div>\n",
            )
        );
    }

    #[test]
    fn test_heading_content_flattened() {
        assert_eq!(
            toc("# *Hi* [there](http://x.com) `a<b` & co", None),
            concat!(
                "<div class=\"toc\">\n<ul>\n<li>\n",
                "<a href=\"#toc_0\"><em>Hi</em> there <code>a&lt;b</code> &amp; co</a>\n",
                "</li>\n</ul>\n</div>\n",
            )
        );
    }

    #[test]
    fn test_prefix_escaped() {
        assert_eq!(
            toc("# A", Some("\"x")),
            "<div class=\"toc\">\n<ul>\n<li>\n<a href=\"#&quot;xtoc_0\">A</a>\n</li>\n</ul>\n</div>\n"
        );
    }
}
