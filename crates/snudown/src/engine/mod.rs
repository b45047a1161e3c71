//! Markdown engine turning bytes into sanitized HTML.
//!
//! An [`Engine`] is built once per mode and target and then shared. All
//! per-call state lives in the writer created for each render, so the
//! engine itself is immutable and safe to use from several threads.

mod autolink;
mod html;
mod state;
mod toc;

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use pulldown_cmark::Parser;

use crate::error::EngineError;
use crate::flags::{HtmlFlags, ParseFlags};
use crate::options::RenderOptions;
use crate::policy::{HtmlWhitelist, LinkDecorator};

use self::html::HtmlWriter;
use self::toc::TocWriter;

/// Capabilities the engine calls back into while rendering.
#[derive(Clone, Default)]
pub struct Callbacks {
    /// Appends attributes to emitted links.
    pub link_attributes: Option<Arc<dyn LinkDecorator>>,
    /// Element and attribute whitelist for raw HTML.
    pub whitelist: Option<Arc<dyn HtmlWhitelist>>,
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("link_attributes", &self.link_attributes.is_some())
            .field("whitelist", &self.whitelist.is_some())
            .finish()
    }
}

/// What an engine produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderTarget {
    /// Full document HTML.
    Html,
    /// Table of contents built from headings only.
    Toc,
}

/// A configured markdown renderer.
#[derive(Debug)]
pub struct Engine {
    parse_flags: ParseFlags,
    html_flags: HtmlFlags,
    callbacks: Callbacks,
    target: RenderTarget,
}

impl Engine {
    /// Build an engine.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingWhitelist`] if `html_flags` enables
    /// element whitelisting but `callbacks` carries no whitelist.
    pub fn new(
        parse_flags: ParseFlags,
        html_flags: HtmlFlags,
        callbacks: Callbacks,
        target: RenderTarget,
    ) -> Result<Self, EngineError> {
        if html_flags.contains(HtmlFlags::ALLOW_ELEMENT_WHITELIST) && callbacks.whitelist.is_none()
        {
            return Err(EngineError::MissingWhitelist);
        }
        Ok(Self {
            parse_flags,
            html_flags,
            callbacks,
            target,
        })
    }

    /// Baseline HTML flags this engine was built with.
    #[must_use]
    pub fn html_flags(&self) -> HtmlFlags {
        self.html_flags
    }

    /// Output produced by this engine.
    #[must_use]
    pub fn target(&self) -> RenderTarget {
        self.target
    }

    /// Render `input`, appending to `out`.
    ///
    /// Flags, link decoration and the anchor prefix are read from
    /// `options`; the engine's own baseline flags are not consulted.
    pub fn render(&self, options: &RenderOptions, input: &[u8], out: &mut String) {
        let text = normalize_input(input);
        if text.is_empty() {
            return;
        }
        let parser = Parser::new_ext(&text, self.parse_flags.parser_options());
        match self.target {
            RenderTarget::Html => HtmlWriter::new(
                options,
                &self.callbacks,
                self.parse_flags.contains(ParseFlags::AUTOLINK),
                out,
            )
            .run(parser),
            RenderTarget::Toc => TocWriter::new(options, out).run(parser),
        }
    }
}

/// Decode `input` as UTF-8 (lossily) and drop control characters other
/// than tab, line feed and carriage return.
pub(crate) fn normalize_input(input: &[u8]) -> Cow<'_, str> {
    let text = String::from_utf8_lossy(input);
    if !text.chars().any(is_stripped_control) {
        return text;
    }
    Cow::Owned(text.chars().filter(|&c| !is_stripped_control(c)).collect())
}

fn is_stripped_control(c: char) -> bool {
    matches!(c, '\0'..='\u{1f}') && !matches!(c, '\t' | '\n' | '\r')
}
