//! Sanitization policy: link decoration and raw HTML whitelisting.
//!
//! The engine calls into two capabilities while rendering:
//! - [`LinkDecorator`] appends extra attributes to every emitted `<a>` tag
//! - [`HtmlWhitelist`] decides which raw HTML elements and attributes survive
//!
//! [`ModerationPolicy`] implements both with the built-in whitelists.

use crate::escape::escape_html_into;
use crate::flags::HtmlFlags;
use crate::options::RenderOptions;

/// Raw HTML elements allowed through in whitelisting modes.
pub const ELEMENT_WHITELIST: &[&str] = &[
    "tr", "th", "td", "table", "tbody", "thead", "tfoot", "caption",
];

/// Attributes allowed on whitelisted elements.
pub const ATTRIBUTE_WHITELIST: &[&str] =
    &["colspan", "rowspan", "cellspacing", "cellpadding", "scope"];

/// URL prefixes accepted by safe-link checking.
const SAFE_LINK_PREFIXES: &[&str] = &[
    "http://",
    "https://",
    "ftp://",
    "mailto:",
    "/",
    "git://",
    "steam://",
    "irc://",
    "ircs://",
    "news://",
    "mumble://",
    "ssh://",
    "ts3server://",
    "#",
];

/// Appends attributes to emitted links.
///
/// Called once per `<a>` tag, after `href` and `title` were written and
/// before the tag is closed.
pub trait LinkDecorator: Send + Sync {
    /// Append attribute text (with a leading space) for `link` to `out`.
    fn decorate(&self, link: &str, options: &RenderOptions, out: &mut String);
}

/// Element and attribute whitelist for raw HTML.
pub trait HtmlWhitelist: Send + Sync {
    /// Whether an element with this tag name may be emitted.
    fn allows_element(&self, name: &str) -> bool;

    /// Whether an attribute with this name may be emitted.
    fn allows_attribute(&self, name: &str) -> bool;
}

/// The built-in moderation policy.
#[derive(Clone, Copy, Debug, Default)]
pub struct ModerationPolicy;

impl LinkDecorator for ModerationPolicy {
    fn decorate(&self, _link: &str, options: &RenderOptions, out: &mut String) {
        if options.nofollow {
            out.push_str(r#" rel="nofollow""#);
        }
        if let Some(target) = &options.link_target {
            out.push_str(r#" target=""#);
            escape_html_into(out, target);
            out.push('"');
        }
    }
}

impl HtmlWhitelist for ModerationPolicy {
    fn allows_element(&self, name: &str) -> bool {
        ELEMENT_WHITELIST
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(name))
    }

    fn allows_attribute(&self, name: &str) -> bool {
        ATTRIBUTE_WHITELIST
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(name))
    }
}

/// Check whether a link URL uses a safe scheme.
///
/// The URL must start with a known prefix (case-insensitive) and continue
/// past it, so a bare `/` or `http://` is rejected.
///
/// # Examples
///
/// ```
/// use snudown::is_safe_link;
///
/// assert!(is_safe_link("http://example.com"));
/// assert!(is_safe_link("/r/rust"));
/// assert!(!is_safe_link("javascript:alert(1)"));
/// ```
#[must_use]
pub fn is_safe_link(url: &str) -> bool {
    let url = url.as_bytes();
    SAFE_LINK_PREFIXES.iter().any(|prefix| {
        url.len() > prefix.len() && url[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
    })
}

/// What happens to raw HTML that is not let through by the whitelist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Fallback {
    Escape,
    Drop,
    Pass,
}

/// Raw HTML handling derived from a set of flags.
///
/// Order: whitelist (when enabled and supplied), then escaping, then
/// skipping, then pass-through.
#[derive(Clone, Copy)]
pub(crate) struct RawHtmlFilter<'a> {
    whitelist: Option<&'a dyn HtmlWhitelist>,
    fallback: Fallback,
}

impl<'a> RawHtmlFilter<'a> {
    pub(crate) fn new(flags: HtmlFlags, whitelist: Option<&'a dyn HtmlWhitelist>) -> Self {
        let whitelist = whitelist.filter(|_| flags.contains(HtmlFlags::ALLOW_ELEMENT_WHITELIST));
        let fallback = if flags.contains(HtmlFlags::ESCAPE) {
            Fallback::Escape
        } else if flags.contains(HtmlFlags::SKIP_HTML) {
            Fallback::Drop
        } else {
            Fallback::Pass
        };
        Self {
            whitelist,
            fallback,
        }
    }

    /// Raw HTML is emitted untouched.
    pub(crate) fn passes_through(&self) -> bool {
        self.whitelist.is_none() && self.fallback == Fallback::Pass
    }

    /// Raw HTML is dropped entirely.
    pub(crate) fn drops_all(&self) -> bool {
        self.whitelist.is_none() && self.fallback == Fallback::Drop
    }

    /// Filter a fragment of raw HTML into `out`.
    pub(crate) fn apply(&self, html: &str, out: &mut String) {
        let Some(whitelist) = self.whitelist else {
            self.fall_back(html, out);
            return;
        };

        let mut rest = html;
        while let Some(lt) = rest.find('<') {
            self.fall_back(&rest[..lt], out);
            let candidate = &rest[lt..];
            let Some(gt) = candidate.find('>') else {
                self.fall_back(candidate, out);
                return;
            };
            let tag = &candidate[..=gt];
            match parse_tag(tag).filter(|parsed| whitelist.allows_element(parsed.name())) {
                Some(parsed) => write_tag(&parsed, whitelist, out),
                None => self.fall_back(tag, out),
            }
            rest = &candidate[gt + 1..];
        }
        self.fall_back(rest, out);
    }

    fn fall_back(&self, html: &str, out: &mut String) {
        match self.fallback {
            Fallback::Escape => escape_html_into(out, html),
            Fallback::Drop => {}
            Fallback::Pass => out.push_str(html),
        }
    }
}

/// A raw tag split into its name and the text after the name.
#[derive(Debug, PartialEq, Eq)]
enum RawTag<'a> {
    Open { name: &'a str, rest: &'a str },
    Close { name: &'a str },
}

impl RawTag<'_> {
    fn name(&self) -> &str {
        match self {
            Self::Open { name, .. } | Self::Close { name } => name,
        }
    }
}

/// Parse `<name ...>` or `</name>`; `tag` spans from `<` to `>` inclusive.
fn parse_tag(tag: &str) -> Option<RawTag<'_>> {
    let inner = tag.strip_prefix('<')?;
    let (closing, inner) = match inner.strip_prefix('/') {
        Some(stripped) => (true, stripped),
        None => (false, inner),
    };
    let name_len = inner
        .bytes()
        .take_while(u8::is_ascii_alphanumeric)
        .count();
    if name_len == 0 {
        return None;
    }
    let (name, rest) = inner.split_at(name_len);
    if !rest.starts_with(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/') {
        return None;
    }
    Some(if closing {
        RawTag::Close { name }
    } else {
        RawTag::Open { name, rest }
    })
}

/// Re-emit a whitelisted tag keeping only well-formed whitelisted attributes.
///
/// An attribute survives when it has a name, an `=`, and a non-empty value
/// in matching single or double quotes. A quote before `=`, a second `=`,
/// or whitespace outside a quoted value discards the attribute being read.
fn write_tag(tag: &RawTag<'_>, whitelist: &dyn HtmlWhitelist, out: &mut String) {
    let (name, rest) = match *tag {
        RawTag::Close { name } => {
            out.push_str("</");
            out.push_str(&name.to_ascii_lowercase());
            out.push('>');
            return;
        }
        RawTag::Open { name, rest } => (name, rest),
    };

    out.push('<');
    out.push_str(&name.to_ascii_lowercase());

    let mut attr = String::new();
    let mut value = String::new();
    let mut seen_equals = false;
    let mut quote: Option<char> = None;

    for c in rest.chars() {
        let mut reset = false;
        match c {
            '>' => break,
            '\'' | '"' => {
                if !seen_equals {
                    reset = true;
                } else if let Some(open) = quote {
                    if open == c {
                        if !attr.is_empty() && !value.is_empty() && whitelist.allows_attribute(&attr)
                        {
                            out.push(' ');
                            escape_html_into(out, &attr.to_ascii_lowercase());
                            out.push_str("=\"");
                            escape_html_into(out, &value);
                            out.push('"');
                        }
                        reset = true;
                    } else {
                        value.push(c);
                    }
                } else {
                    quote = Some(c);
                }
            }
            c if c.is_ascii_whitespace() => {
                if quote.is_some() {
                    value.push(c);
                } else {
                    reset = true;
                }
            }
            '=' => {
                if seen_equals {
                    reset = true;
                } else {
                    seen_equals = true;
                }
            }
            _ => {
                if !seen_equals {
                    attr.push(c);
                } else if quote.is_some() {
                    value.push(c);
                }
            }
        }

        if reset {
            attr.clear();
            value.clear();
            seen_equals = false;
            quote = None;
        }
    }

    out.push('>');
}
