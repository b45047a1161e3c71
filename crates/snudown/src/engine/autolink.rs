//! Detection of bare links inside text runs.
//!
//! Recognizes `http://`, `https://` and `ftp://` URLs, `www.` hosts,
//! e-mail addresses and community links (`/r/name`, `r/name`, `/u/name`,
//! `u/name`). Offsets are byte offsets into the text run; every trigger is
//! ASCII, so splits always fall on character boundaries.

/// A piece of a text run.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Text(&'a str),
    Link { href: String, text: &'a str },
}

/// Split a text run into plain text and detected links.
pub(crate) fn split(text: &str) -> Vec<Segment<'_>> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut cursor = 0;
    let mut i = 0;

    while i < bytes.len() {
        let found = match bytes[i] {
            b':' => url(bytes, cursor, i),
            b'w' | b'W' => www(bytes, cursor, i),
            b'@' => email(bytes, cursor, i),
            b'/' => community(bytes, cursor, i),
            _ => None,
        };

        let Some(found) = found else {
            i += 1;
            continue;
        };

        if found.start > cursor {
            segments.push(Segment::Text(&text[cursor..found.start]));
        }
        let link_text = &text[found.start..found.end];
        segments.push(Segment::Link {
            href: format!("{}{link_text}", found.href_prefix),
            text: link_text,
        });
        cursor = found.end;
        i = found.end;
    }

    if cursor < bytes.len() {
        segments.push(Segment::Text(&text[cursor..]));
    }
    segments
}

struct Found {
    start: usize,
    end: usize,
    href_prefix: &'static str,
}

const URL_SCHEMES: &[&str] = &["http", "https", "ftp"];

/// `scheme://host...` with the colon at `colon`.
fn url(bytes: &[u8], cursor: usize, colon: usize) -> Option<Found> {
    if !bytes[colon..].starts_with(b"://") {
        return None;
    }
    let start = bytes[cursor..colon]
        .iter()
        .rposition(|b| !b.is_ascii_alphabetic())
        .map_or(cursor, |pos| cursor + pos + 1);
    let scheme = &bytes[start..colon];
    if !URL_SCHEMES
        .iter()
        .any(|known| scheme.eq_ignore_ascii_case(known.as_bytes()))
    {
        return None;
    }
    if start > 0 && bytes[start - 1].is_ascii_alphanumeric() {
        return None;
    }

    let host = colon + 3;
    if !bytes.get(host).is_some_and(u8::is_ascii_alphanumeric) {
        return None;
    }
    let end = link_end(bytes, host);
    Some(Found {
        start,
        end,
        href_prefix: "",
    })
}

/// `www.host...` starting at `start`.
fn www(bytes: &[u8], cursor: usize, start: usize) -> Option<Found> {
    if bytes.len() < start + 5 || !bytes[start..start + 4].eq_ignore_ascii_case(b"www.") {
        return None;
    }
    if start > cursor && bytes[start - 1].is_ascii_alphanumeric() {
        return None;
    }
    if !bytes[start + 4].is_ascii_alphanumeric() {
        return None;
    }
    let end = link_end(bytes, start + 4);
    Some(Found {
        start,
        end,
        href_prefix: "http://",
    })
}

/// `local@domain.tld` with the at sign at `at`.
fn email(bytes: &[u8], cursor: usize, at: usize) -> Option<Found> {
    let is_local = |b: &u8| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'+' | b'-' | b'_');
    let start = bytes[cursor..at]
        .iter()
        .rposition(|b| !is_local(b))
        .map_or(cursor, |pos| cursor + pos + 1);
    if start == at {
        return None;
    }

    let is_domain = |b: &u8| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_');
    let mut end = at + 1;
    while end < bytes.len() && is_domain(&bytes[end]) {
        end += 1;
    }
    while end > at + 1 && !bytes[end - 1].is_ascii_alphanumeric() {
        end -= 1;
    }
    let domain = &bytes[at + 1..end];
    if domain.is_empty() || !domain.contains(&b'.') {
        return None;
    }
    Some(Found {
        start,
        end,
        href_prefix: "mailto:",
    })
}

/// `/r/name`, `r/name`, `/u/name` or `u/name` with the slash after the
/// letter at `slash`.
fn community(bytes: &[u8], cursor: usize, slash: usize) -> Option<Found> {
    if slash == 0 {
        return None;
    }
    let kind = bytes[slash - 1];
    if kind != b'r' && kind != b'u' {
        return None;
    }

    let letter = slash - 1;
    let start = match letter.checked_sub(1).map(|i| bytes[i]) {
        None => letter,
        Some(b'/') => letter - 1,
        Some(b) if is_boundary(b) => letter,
        Some(_) => return None,
    };
    if start > 0 && start < letter && !is_boundary(bytes[start - 1]) {
        return None;
    }
    if start < cursor {
        return None;
    }

    let mut end = slash + 1;
    if kind == b'r' {
        end = subreddit_names(bytes, end)?;
    } else {
        let name_start = end;
        while end < bytes.len()
            && (bytes[end].is_ascii_alphanumeric() || matches!(bytes[end], b'_' | b'-'))
        {
            end += 1;
        }
        if end - name_start < 2 || !bytes[name_start].is_ascii_alphanumeric() {
            return None;
        }
    }

    if bytes.get(end) == Some(&b'/') {
        while end < bytes.len()
            && (bytes[end].is_ascii_alphanumeric() || matches!(bytes[end], b'_' | b'/' | b'-'))
        {
            end += 1;
        }
    }

    Some(Found {
        start,
        end,
        href_prefix: if start == letter { "/" } else { "" },
    })
}

/// Byte allowed right before a community link.
fn is_boundary(byte: u8) -> bool {
    byte.is_ascii_punctuation() || byte.is_ascii_whitespace()
}

/// One or more subreddit names joined by `+` (or `-` after `all-`).
///
/// A name is `(t:)?[A-Za-z0-9][A-Za-z0-9_]*` of 2 to 24 bytes, or the
/// literal `reddit.com`. Returns the end offset of the last name.
fn subreddit_names(bytes: &[u8], mut end: usize) -> Option<usize> {
    const REDDIT_COM: &[u8] = b"reddit.com";

    let all_minus = bytes
        .get(end..end + 4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(b"all-"));

    loop {
        let start = end;
        let mut max_length = 24;
        if bytes
            .get(end..end + REDDIT_COM.len())
            .is_some_and(|name| name.eq_ignore_ascii_case(REDDIT_COM))
        {
            end += REDDIT_COM.len();
            max_length = REDDIT_COM.len();
        } else {
            if bytes
                .get(end..end + 2)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(b"t:"))
                && bytes.len() > end + 2
            {
                end += 2;
            }
            if !bytes.get(end).is_some_and(u8::is_ascii_alphanumeric) {
                return None;
            }
            end += 1;
        }

        while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
            end += 1;
        }
        if !(2..=max_length).contains(&(end - start)) {
            return None;
        }

        let joins = bytes
            .get(end)
            .is_some_and(|&b| b == b'+' || (all_minus && b == b'-'));
        if !joins {
            return Some(end);
        }
        end += 1;
    }
}

/// Extend a URL to the next whitespace or `<`, then drop trailing
/// punctuation and unbalanced closing brackets.
fn link_end(bytes: &[u8], from: usize) -> usize {
    let mut end = bytes[from..]
        .iter()
        .position(|b| b.is_ascii_whitespace() || *b == b'<')
        .map_or(bytes.len(), |pos| from + pos);

    while end > from {
        let last = bytes[end - 1];
        let trim = match last {
            b'?' | b'!' | b'.' | b',' | b':' | b';' | b'*' | b'_' | b'~' | b'"' | b'\'' => true,
            b')' => unbalanced(&bytes[from..end], b'(', b')'),
            b']' => unbalanced(&bytes[from..end], b'[', b']'),
            b'}' => unbalanced(&bytes[from..end], b'{', b'}'),
            _ => false,
        };
        if !trim {
            break;
        }
        end -= 1;
    }
    end
}

fn unbalanced(link: &[u8], open: u8, close: u8) -> bool {
    let opened = link.iter().filter(|&&b| b == open).count();
    let closed = link.iter().filter(|&&b| b == close).count();
    closed > opened
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn links(text: &str) -> Vec<(String, &str)> {
        split(text)
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::Link { href, text } => Some((href, text)),
                Segment::Text(_) => None,
            })
            .collect()
    }

    fn link(href: &str, text: &'static str) -> (String, &'static str) {
        (href.to_owned(), text)
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(split("just words"), vec![Segment::Text("just words")]);
        assert!(split("").is_empty());
    }

    #[test]
    fn test_url() {
        assert_eq!(
            split("see http://www.reddit.com now"),
            vec![
                Segment::Text("see "),
                Segment::Link {
                    href: "http://www.reddit.com".to_owned(),
                    text: "http://www.reddit.com",
                },
                Segment::Text(" now"),
            ]
        );
        assert_eq!(
            links("(http://tsfr.org)"),
            vec![link("http://tsfr.org", "http://tsfr.org")]
        );
        assert_eq!(
            links(".http://reddit.com"),
            vec![link("http://reddit.com", "http://reddit.com")]
        );
        assert_eq!(
            links("http://en.wikipedia.org/wiki/Link_(film)."),
            vec![link(
                "http://en.wikipedia.org/wiki/Link_(film)",
                "http://en.wikipedia.org/wiki/Link_(film)"
            )]
        );
        assert!(links("javascript://x").is_empty());
        assert!(links("xhttp://x.com").is_empty());
        assert!(links("http:// nothing").is_empty());
    }

    #[test]
    fn test_www() {
        assert_eq!(
            links(" www.a.co?with&test"),
            vec![link("http://www.a.co?with&test", "www.a.co?with&test")]
        );
        assert_eq!(
            links("www.http://example.com/"),
            vec![link(
                "http://www.http://example.com/",
                "www.http://example.com/"
            )]
        );
        assert!(links("awww.example.com").is_empty());
    }

    #[test]
    fn test_email() {
        assert_eq!(
            links("mail foo@example.com."),
            vec![link("mailto:foo@example.com", "foo@example.com")]
        );
        assert!(links("foo@localhost").is_empty());
        assert!(links("@example.com").is_empty());
    }

    #[test]
    fn test_subreddit() {
        assert_eq!(links("/r/test"), vec![link("/r/test", "/r/test")]);
        assert_eq!(
            links("Words words /r/test words"),
            vec![link("/r/test", "/r/test")]
        );
        assert_eq!(
            links("/r/multireddit+test+yay"),
            vec![link("/r/multireddit+test+yay", "/r/multireddit+test+yay")]
        );
        assert_eq!(
            links("/r/sr_with_underscores"),
            vec![link("/r/sr_with_underscores", "/r/sr_with_underscores")]
        );
        assert_eq!(
            links("/r/whatever: fork"),
            vec![link("/r/whatever", "/r/whatever")]
        );
        assert_eq!(
            links("/r/t:timereddit"),
            vec![link("/r/t:timereddit", "/r/t:timereddit")]
        );
        assert_eq!(
            links("/r/reddit.com"),
            vec![link("/r/reddit.com", "/r/reddit.com")]
        );
        assert_eq!(links("/r/not.cool"), vec![link("/r/not", "/r/not")]);
        assert_eq!(
            links("/r/all-minus-something"),
            vec![link("/r/all-minus-something", "/r/all-minus-something")]
        );
        assert_eq!(links("/r/notall-minus"), vec![link("/r/notall", "/r/notall")]);
        assert_eq!(
            links("/r/test/comments/test test"),
            vec![link("/r/test/comments/test", "/r/test/comments/test")]
        );
        assert_eq!(links("/r/www.example.com"), vec![link("/r/www", "/r/www")]);
        assert_eq!(
            links("a r/reddit.com"),
            vec![link("/r/reddit.com", "r/reddit.com")]
        );
        assert_eq!(
            links("foo:r/reddit.com"),
            vec![link("/r/reddit.com", "r/reddit.com")]
        );
    }

    #[test]
    fn test_subreddit_rejected() {
        assert!(links("/r/").is_empty());
        assert!(links("/R/reddit.com").is_empty());
        assert!(links("foobar/reddit.com").is_empty());
        assert!(links("/f/oobar").is_empty());
        assert!(links("a\u{3002}r/reddit.com").is_empty());
    }

    #[test]
    fn test_leading_slash_needs_boundary() {
        assert!(links("\u{e9}/r/rust").is_empty());
        assert!(links("abc/r/rust").is_empty());
        assert!(links("x/u/test").is_empty());
        assert_eq!(links("(/r/rust)"), vec![link("/r/rust", "/r/rust")]);
        assert_eq!(links("see:/u/test"), vec![link("/u/test", "/u/test")]);
    }

    #[test]
    fn test_user() {
        assert_eq!(links("/u/test"), vec![link("/u/test", "/u/test")]);
        assert_eq!(links("u/reddit"), vec![link("/u/reddit", "u/reddit")]);
        assert_eq!(links("a u/reddit"), vec![link("/u/reddit", "u/reddit")]);
        assert_eq!(
            links("a u/reddit/foobaz"),
            vec![link("/u/reddit/foobaz", "u/reddit/foobaz")]
        );
        assert_eq!(
            links("/u/test/m/test test"),
            vec![link("/u/test/m/test", "/u/test/m/test")]
        );
        assert!(links("u/m").is_empty());
        assert!(links("/u/m").is_empty());
        assert!(links("fuu/reddit").is_empty());
        assert!(links("/U/nope").is_empty());
    }

    #[test]
    fn test_user_followed_by_url() {
        assert_eq!(
            split("/u/http://www.reddit.com/user/reddit"),
            vec![
                Segment::Link {
                    href: "/u/http".to_owned(),
                    text: "/u/http",
                },
                Segment::Text("://"),
                Segment::Link {
                    href: "http://www.reddit.com/user/reddit".to_owned(),
                    text: "www.reddit.com/user/reddit",
                },
            ]
        );
    }
}
