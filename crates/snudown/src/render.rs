//! Render calls: the optional TOC pass followed by the content pass.

use std::ops::{Deref, DerefMut};

use crate::error::RenderError;
use crate::flags::HtmlFlags;
use crate::mode::Mode;
use crate::options::RenderOptions;
use crate::registry::RendererRegistry;

/// Per-call rendering parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderRequest<'a> {
    /// Add `rel="nofollow"` to links.
    pub nofollow: bool,
    /// `target` attribute for links; omitted when `None`.
    pub link_target: Option<&'a str>,
    /// Prefix for `toc_N` heading anchors.
    pub toc_id_prefix: Option<&'a str>,
    /// Emit a table of contents before the content.
    pub enable_toc: bool,
}

impl<'a> RenderRequest<'a> {
    /// Set whether links get `rel="nofollow"`.
    #[must_use]
    pub fn with_nofollow(mut self, nofollow: bool) -> Self {
        self.nofollow = nofollow;
        self
    }

    /// Set the `target` attribute for links.
    #[must_use]
    pub fn with_link_target(mut self, target: &'a str) -> Self {
        self.link_target = Some(target);
        self
    }

    /// Set the prefix for heading anchors.
    #[must_use]
    pub fn with_toc_id_prefix(mut self, prefix: &'a str) -> Self {
        self.toc_id_prefix = Some(prefix);
        self
    }

    /// Set whether a table of contents is emitted.
    #[must_use]
    pub fn with_toc(mut self, enable_toc: bool) -> Self {
        self.enable_toc = enable_toc;
        self
    }
}

/// Holds options for the duration of one pass.
///
/// On drop the HTML flags return to their value at creation and the anchor
/// prefix is cleared, whether the pass finished or unwound.
struct OptionsScope<'a> {
    options: &'a mut RenderOptions,
    saved_flags: HtmlFlags,
}

impl<'a> OptionsScope<'a> {
    fn new(options: &'a mut RenderOptions) -> Self {
        let saved_flags = options.html_flags;
        Self {
            options,
            saved_flags,
        }
    }

    fn set_prefix(&mut self, prefix: Option<&str>) {
        self.options.toc_id_prefix = prefix.map(str::to_owned);
    }
}

impl Deref for OptionsScope<'_> {
    type Target = RenderOptions;

    fn deref(&self) -> &RenderOptions {
        self.options
    }
}

impl DerefMut for OptionsScope<'_> {
    fn deref_mut(&mut self) -> &mut RenderOptions {
        self.options
    }
}

impl Drop for OptionsScope<'_> {
    fn drop(&mut self) {
        self.options.html_flags = self.saved_flags;
        self.options.toc_id_prefix = None;
    }
}

impl RendererRegistry {
    /// Render `text` in `mode`.
    ///
    /// With `enable_toc` the output starts with the table of contents and
    /// headings in the content carry matching anchors. Empty input renders
    /// to empty output.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::EngineConstruction`] if the mode's engines
    /// cannot be built and [`RenderError::Allocation`] if the output buffer
    /// cannot be allocated. No output is produced in either case.
    pub fn render(
        &self,
        mode: Mode,
        text: &[u8],
        request: &RenderRequest<'_>,
    ) -> Result<Vec<u8>, RenderError> {
        self.render_string(mode, text, request)
            .map(String::into_bytes)
    }

    /// Render with the mode given as an integer index.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidMode`] for an unknown index, before any
    /// mode is touched, plus the errors of [`render`](Self::render).
    pub fn render_raw(
        &self,
        mode_index: i32,
        text: &[u8],
        request: &RenderRequest<'_>,
    ) -> Result<Vec<u8>, RenderError> {
        let mode = Mode::try_from(mode_index)?;
        self.render(mode, text, request)
    }

    /// Like [`render`](Self::render), returning the HTML as a `String`.
    ///
    /// # Errors
    ///
    /// Same as [`render`](Self::render).
    pub fn render_string(
        &self,
        mode: Mode,
        text: &[u8],
        request: &RenderRequest<'_>,
    ) -> Result<String, RenderError> {
        let entry = self.entry(mode)?;

        let mut out = String::new();
        out.try_reserve(text.len())?;

        let mut state = entry.lock();
        let state = &mut *state;
        state.content.nofollow = request.nofollow;
        state.content.link_target = request.link_target.map(str::to_owned);

        let mut content = OptionsScope::new(&mut state.content);
        if request.enable_toc {
            let mut toc = OptionsScope::new(&mut state.toc);
            toc.set_prefix(request.toc_id_prefix);
            entry.toc.render(&toc, text, &mut out);
            drop(toc);
            content.html_flags |= HtmlFlags::TOC;
        }
        content.set_prefix(request.toc_id_prefix);
        entry.content.render(&content, text, &mut out);
        drop(content);

        tracing::trace!(
            mode = %mode,
            input_len = text.len(),
            output_len = out.len(),
            toc = request.enable_toc,
            "Rendered markdown"
        );
        Ok(out)
    }
}

/// Render `text` with the process-wide registry.
///
/// # Errors
///
/// Returns [`RenderError::InvalidMode`] if `mode_index` is not a known
/// mode, or an error from [`RendererRegistry::render`].
///
/// # Examples
///
/// ```
/// let html = snudown::render(b"/r/rust", true, Some("_top"), None, 0, false).unwrap();
/// assert_eq!(
///     html,
///     b"<p><a href=\"/r/rust\" rel=\"nofollow\" target=\"_top\">/r/rust</a></p>\n"
/// );
/// ```
pub fn render(
    text: &[u8],
    nofollow: bool,
    link_target: Option<&str>,
    toc_id_prefix: Option<&str>,
    mode_index: i32,
    enable_toc: bool,
) -> Result<Vec<u8>, RenderError> {
    let request = RenderRequest {
        nofollow,
        link_target,
        toc_id_prefix,
        enable_toc,
    };
    RendererRegistry::global().render_raw(mode_index, text, &request)
}

/// Render user-submitted text with the process-wide registry.
///
/// # Errors
///
/// See [`RendererRegistry::render`].
pub fn markdown(text: &str, request: &RenderRequest<'_>) -> Result<String, RenderError> {
    RendererRegistry::global().render_string(Mode::PlainText, text.as_bytes(), request)
}

/// Render a wiki page with the process-wide registry.
///
/// # Errors
///
/// See [`RendererRegistry::render`].
pub fn markdown_wiki(text: &str, request: &RenderRequest<'_>) -> Result<String, RenderError> {
    RendererRegistry::global().render_string(Mode::Wiki, text.as_bytes(), request)
}
