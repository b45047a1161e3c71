//! HTML and URL escaping.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    escape_html_into(&mut result, s);
    result
}

/// Escape HTML special characters, appending to `out`.
pub(crate) fn escape_html_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

/// Bytes left as-is in an `href`; `&` and `'` are entity-escaped instead.
const HREF_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'(')
    .remove(b')')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b',')
    .remove(b';')
    .remove(b'#')
    .remove(b'%')
    .remove(b'&')
    .remove(b'\'');

/// Escape a URL for use inside a double-quoted `href`/`src` attribute.
///
/// Bytes outside the URL-safe set are percent-encoded, so the result is
/// always ASCII.
pub(crate) fn escape_href_into(out: &mut String, url: &str) {
    for chunk in utf8_percent_encode(url, HREF_ENCODE_SET) {
        for c in chunk.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '\'' => out.push_str("&#x27;"),
                _ => out.push(c),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn href(url: &str) -> String {
        let mut out = String::new();
        escape_href_into(&mut out, url);
        out
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html(r#""quoted""#), "&quot;quoted&quot;");
        assert_eq!(escape_html("it's"), "it&#39;s");
    }

    #[test]
    fn test_escape_href_passes_safe_characters() {
        assert_eq!(
            href("http://example.com/a_b?c=d#e"),
            "http://example.com/a_b?c=d#e"
        );
        assert_eq!(
            href("http://en.wikipedia.org/wiki/Link_(film)"),
            "http://en.wikipedia.org/wiki/Link_(film)"
        );
    }

    #[test]
    fn test_escape_href_encodes_unsafe_bytes() {
        assert_eq!(
            href("http://en.wikipedia.org/wiki/café_racer"),
            "http://en.wikipedia.org/wiki/caf%C3%A9_racer"
        );
        assert_eq!(href("http://bar\nbar"), "http://bar%0Abar");
        assert_eq!(href(r#"/a"onclick="x"#), "/a%22onclick=%22x");
        assert_eq!(href("/<b>"), "/%3Cb%3E");
    }

    #[test]
    fn test_escape_href_spaces_and_existing_escapes() {
        assert_eq!(href("/a b"), "/a%20b");
        assert_eq!(href("/a%20b"), "/a%20b");
        assert_eq!(href("/a\u{7f}`{|}"), "/a%7F%60%7B%7C%7D");
    }

    #[test]
    fn test_escape_href_entities() {
        assert_eq!(
            href("http://www.google.com?test&blah"),
            "http://www.google.com?test&amp;blah"
        );
        assert_eq!(href("/it's"), "/it&#x27;s");
    }
}
