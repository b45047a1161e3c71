//! Per-mode engine configuration.

use std::sync::Arc;

use crate::engine::{Callbacks, Engine, RenderTarget};
use crate::error::EngineError;
use crate::flags::{HtmlFlags, ParseFlags};
use crate::mode::Mode;
use crate::options::RenderOptions;
use crate::policy::{LinkDecorator, ModerationPolicy};

/// Parse flags shared by every mode.
pub const DEFAULT_PARSE_FLAGS: ParseFlags = ParseFlags::SUPERSCRIPT
    .union(ParseFlags::AUTOLINK)
    .union(ParseFlags::STRIKETHROUGH)
    .union(ParseFlags::TABLES);

/// HTML flags for user-submitted text.
pub const USERTEXT_HTML_FLAGS: HtmlFlags = HtmlFlags::SKIP_HTML
    .union(HtmlFlags::SKIP_IMAGES)
    .union(HtmlFlags::SAFELINK)
    .union(HtmlFlags::ESCAPE)
    .union(HtmlFlags::USE_XHTML);

/// HTML flags for wiki pages.
pub const WIKI_HTML_FLAGS: HtmlFlags = HtmlFlags::SKIP_HTML
    .union(HtmlFlags::SAFELINK)
    .union(HtmlFlags::ALLOW_ELEMENT_WHITELIST)
    .union(HtmlFlags::ESCAPE)
    .union(HtmlFlags::USE_XHTML);

/// Everything needed to build one engine.
#[derive(Clone, Debug)]
pub struct ModeConfig {
    /// Markdown extensions.
    pub parse_flags: ParseFlags,
    /// Baseline HTML flags.
    pub html_flags: HtmlFlags,
    /// Link decoration and whitelist capabilities.
    pub callbacks: Callbacks,
    /// Output the engine produces.
    pub target: RenderTarget,
}

impl ModeConfig {
    /// Built-in content configuration for `mode`.
    #[must_use]
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::PlainText => Self::usertext(),
            Mode::Wiki => Self::wiki(),
        }
    }

    /// Configuration for user-submitted text.
    #[must_use]
    pub fn usertext() -> Self {
        Self::with_policy(USERTEXT_HTML_FLAGS)
    }

    /// Configuration for wiki pages.
    #[must_use]
    pub fn wiki() -> Self {
        Self::with_policy(WIKI_HTML_FLAGS)
    }

    fn with_policy(html_flags: HtmlFlags) -> Self {
        let policy = Arc::new(ModerationPolicy);
        Self {
            parse_flags: DEFAULT_PARSE_FLAGS,
            html_flags,
            callbacks: Callbacks {
                link_attributes: Some(Arc::clone(&policy) as Arc<dyn LinkDecorator>),
                whitelist: Some(policy),
            },
            target: RenderTarget::Html,
        }
    }

    /// The same configuration targeting the table of contents.
    #[must_use]
    pub fn toc_variant(&self) -> Self {
        Self {
            target: RenderTarget::Toc,
            ..self.clone()
        }
    }

    /// Options an engine built from this configuration starts with.
    #[must_use]
    pub fn initial_options(&self) -> RenderOptions {
        RenderOptions::new(self.html_flags)
    }

    /// Build the engine.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if the flags and callbacks are inconsistent.
    pub fn build_engine(&self) -> Result<Engine, EngineError> {
        Engine::new(
            self.parse_flags,
            self.html_flags,
            self.callbacks.clone(),
            self.target,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_flags() {
        let usertext = ModeConfig::for_mode(Mode::PlainText);
        assert!(usertext.html_flags.contains(HtmlFlags::SKIP_IMAGES));
        assert!(!usertext.html_flags.contains(HtmlFlags::ALLOW_ELEMENT_WHITELIST));

        let wiki = ModeConfig::for_mode(Mode::Wiki);
        assert!(!wiki.html_flags.contains(HtmlFlags::SKIP_IMAGES));
        assert!(wiki.html_flags.contains(HtmlFlags::ALLOW_ELEMENT_WHITELIST));

        for config in [usertext, wiki] {
            assert_eq!(config.parse_flags, ParseFlags::all());
            assert!(config.callbacks.link_attributes.is_some());
            assert!(config.callbacks.whitelist.is_some());
            assert!(!config.html_flags.contains(HtmlFlags::TOC));
        }
    }

    #[test]
    fn test_policy_shared_between_capabilities() {
        let config = ModeConfig::usertext();
        let decorator = config.callbacks.link_attributes.unwrap();
        let whitelist = config.callbacks.whitelist.unwrap();
        assert_eq!(
            Arc::as_ptr(&decorator).cast::<()>(),
            Arc::as_ptr(&whitelist).cast::<()>()
        );
    }

    #[test]
    fn test_toc_variant() {
        let wiki = ModeConfig::wiki();
        let toc = wiki.toc_variant();
        assert_eq!(toc.target, RenderTarget::Toc);
        assert_eq!(toc.html_flags, wiki.html_flags);
        assert_eq!(toc.parse_flags, wiki.parse_flags);
        assert_eq!(wiki.target, RenderTarget::Html);
    }

    #[test]
    fn test_build_engine() {
        for mode in Mode::ALL {
            let config = ModeConfig::for_mode(mode);
            assert!(config.build_engine().is_ok());
            assert!(config.toc_variant().build_engine().is_ok());
        }
    }

    #[test]
    fn test_build_engine_without_whitelist() {
        let mut config = ModeConfig::wiki();
        config.callbacks.whitelist = None;
        assert_eq!(
            config.build_engine().unwrap_err(),
            EngineError::MissingWhitelist
        );
    }

    #[test]
    fn test_initial_options() {
        let options = ModeConfig::usertext().initial_options();
        assert_eq!(options, RenderOptions::new(USERTEXT_HTML_FLAGS));
    }
}
