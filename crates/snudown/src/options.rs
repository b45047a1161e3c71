//! Per-mode render options consumed by the engine.

use crate::flags::HtmlFlags;

/// Sanitization and policy state read by the engine during a render.
///
/// A registry entry owns one instance for the content renderer and one for
/// the TOC renderer. Between calls `toc_id_prefix` is `None` and
/// `html_flags` holds the mode's baseline; `nofollow` and `link_target`
/// keep the values of the most recent call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Add `rel="nofollow"` to emitted links.
    pub nofollow: bool,
    /// Value of the `target` attribute on emitted links.
    pub link_target: Option<String>,
    /// Prefix for heading anchor ids.
    pub toc_id_prefix: Option<String>,
    /// HTML rendering flags.
    pub html_flags: HtmlFlags,
}

impl RenderOptions {
    /// Options with the given baseline flags and no link decoration.
    #[must_use]
    pub fn new(html_flags: HtmlFlags) -> Self {
        Self {
            nofollow: false,
            link_target: None,
            toc_id_prefix: None,
            html_flags,
        }
    }
}
