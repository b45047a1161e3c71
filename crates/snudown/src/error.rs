//! Error types for rendering.

use std::collections::TryReserveError;

use crate::mode::Mode;

/// Error constructing an [`Engine`](crate::Engine).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum EngineError {
    /// `ALLOW_ELEMENT_WHITELIST` was requested but no whitelist was supplied.
    #[error("element whitelist enforcement requires a whitelist")]
    MissingWhitelist,
}

/// Error returned by a render call.
///
/// Every variant is reported before any output is produced; there is no
/// partial or TOC-only result.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// Mode index outside the known set of modes.
    #[error("invalid renderer mode: {0}")]
    InvalidMode(i32),

    /// The engines for a mode could not be built. The mode stays unusable
    /// for the lifetime of the registry.
    #[error("failed to construct {mode} renderer")]
    EngineConstruction {
        /// Mode whose construction failed.
        mode: Mode,
        /// Underlying engine error.
        #[source]
        source: EngineError,
    },

    /// The output buffer could not be allocated.
    #[error("failed to allocate output buffer")]
    Allocation(#[from] TryReserveError),
}
