//! Moderated markdown rendering.
//!
//! Turns user-submitted markdown into sanitized HTML under one of two
//! policies:
//! - [`Mode::PlainText`] ("usertext"): raw HTML escaped, images rendered as
//!   links
//! - [`Mode::Wiki`]: table elements and a few attributes let through raw
//!   HTML, images allowed
//!
//! Both modes autolink URLs and `/r/` and `/u/` community references, drop
//! links with unsafe schemes and can decorate links with `rel="nofollow"`
//! and a `target`. A table of contents can be prepended, with anchors
//! matching the ids given to headings.
//!
//! # Architecture
//!
//! A [`RendererRegistry`] builds an immutable [`Engine`] pair (content and
//! TOC) per mode on first use. Per-call settings live in [`RenderOptions`]
//! held by the registry and are restored after every call.
//!
//! # Example
//!
//! ```
//! use snudown::{RenderRequest, markdown};
//!
//! let request = RenderRequest::default().with_nofollow(true);
//! let html = markdown("see /r/rust", &request).unwrap();
//! assert_eq!(
//!     html,
//!     "<p>see <a href=\"/r/rust\" rel=\"nofollow\">/r/rust</a></p>\n"
//! );
//! ```

mod config;
mod engine;
mod error;
mod escape;
mod flags;
mod mode;
mod options;
mod policy;
mod registry;
mod render;

pub use config::{DEFAULT_PARSE_FLAGS, ModeConfig, USERTEXT_HTML_FLAGS, WIKI_HTML_FLAGS};
pub use engine::{Callbacks, Engine, RenderTarget};
pub use error::{EngineError, RenderError};
pub use escape::escape_html;
pub use flags::{HtmlFlags, ParseFlags};
pub use mode::{Mode, ParseModeError};
pub use options::RenderOptions;
pub use policy::{
    ATTRIBUTE_WHITELIST, ELEMENT_WHITELIST, HtmlWhitelist, LinkDecorator, ModerationPolicy,
    is_safe_link,
};
pub use registry::RendererRegistry;
pub use render::{RenderRequest, markdown, markdown_wiki, render};
