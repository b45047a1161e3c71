//! Parsing and HTML rendering flags.

use bitflags::bitflags;
use pulldown_cmark::Options;

bitflags! {
    /// Markdown extensions enabled for parsing.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ParseFlags: u32 {
        /// `^superscript^`.
        const SUPERSCRIPT = 1 << 0;
        /// Bare URLs, e-mail addresses and community links become links.
        const AUTOLINK = 1 << 1;
        /// `~~strikethrough~~`.
        const STRIKETHROUGH = 1 << 2;
        /// Pipe tables.
        const TABLES = 1 << 3;
    }
}

bitflags! {
    /// Flags controlling HTML output and sanitization.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct HtmlFlags: u32 {
        /// Drop raw HTML.
        const SKIP_HTML = 1 << 0;
        /// Render images as plain links.
        const SKIP_IMAGES = 1 << 1;
        /// Only emit links with a known-safe scheme.
        const SAFELINK = 1 << 2;
        /// Escape raw HTML instead of passing it through.
        const ESCAPE = 1 << 3;
        /// Self-closing tags (`<br/>`, `<hr/>`, `<img .../>`).
        const USE_XHTML = 1 << 4;
        /// Let whitelisted elements and attributes through raw HTML filtering.
        const ALLOW_ELEMENT_WHITELIST = 1 << 5;
        /// Give headings anchor ids matching the table of contents.
        const TOC = 1 << 6;
    }
}

impl ParseFlags {
    /// Parser options for these flags.
    ///
    /// Autolinking is handled by the engine rather than the parser.
    #[must_use]
    pub fn parser_options(self) -> Options {
        let mut options = Options::empty();
        if self.contains(Self::SUPERSCRIPT) {
            options.insert(Options::ENABLE_SUPERSCRIPT);
        }
        if self.contains(Self::STRIKETHROUGH) {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.contains(Self::TABLES) {
            options.insert(Options::ENABLE_TABLES);
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_options_all() {
        let options = ParseFlags::all().parser_options();
        assert!(options.contains(Options::ENABLE_SUPERSCRIPT));
        assert!(options.contains(Options::ENABLE_STRIKETHROUGH));
        assert!(options.contains(Options::ENABLE_TABLES));
        assert!(!options.contains(Options::ENABLE_FOOTNOTES));
    }

    #[test]
    fn test_parser_options_empty() {
        assert_eq!(ParseFlags::empty().parser_options(), Options::empty());
        assert_eq!(ParseFlags::AUTOLINK.parser_options(), Options::empty());
    }
}
