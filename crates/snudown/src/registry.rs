//! Lazily built per-mode renderers.

use std::fmt;
use std::sync::{LazyLock, Mutex, MutexGuard, OnceLock, PoisonError};

use crate::config::ModeConfig;
use crate::engine::Engine;
use crate::error::{EngineError, RenderError};
use crate::mode::Mode;
use crate::options::RenderOptions;

static GLOBAL: LazyLock<RendererRegistry> = LazyLock::new(RendererRegistry::new);

type Configure = dyn Fn(Mode) -> ModeConfig + Send + Sync;

/// Renderers for every mode, built on first use.
///
/// # Thread Safety
///
/// Designed for concurrent access without external locking:
/// - Each mode is built at most once through a `OnceLock`; concurrent first
///   callers wait for the winner instead of building twice
/// - A failed build is stored and returned to every later caller
/// - Calls on the same mode are serialized by the mode's `Mutex`; different
///   modes render in parallel
pub struct RendererRegistry {
    configure: Box<Configure>,
    entries: [OnceLock<Result<ModeEntry, EngineError>>; Mode::COUNT],
}

/// Engines and mutable options for one mode.
pub(crate) struct ModeEntry {
    pub(crate) content: Engine,
    pub(crate) toc: Engine,
    state: Mutex<ModeState>,
}

/// Options read by the content and TOC engines.
pub(crate) struct ModeState {
    pub(crate) content: RenderOptions,
    pub(crate) toc: RenderOptions,
}

impl ModeEntry {
    /// Lock the mode's options.
    ///
    /// A render that panicked has already restored the options through its
    /// scope guards, so a poisoned lock is recovered rather than propagated.
    pub(crate) fn lock(&self) -> MutexGuard<'_, ModeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RendererRegistry {
    /// Registry using the built-in mode configurations.
    #[must_use]
    pub fn new() -> Self {
        Self::with_configs(ModeConfig::for_mode)
    }

    /// Registry taking each mode's configuration from `configure`.
    ///
    /// `configure` is called at most once per mode, when the mode is first
    /// used.
    #[must_use]
    pub fn with_configs<F>(configure: F) -> Self
    where
        F: Fn(Mode) -> ModeConfig + Send + Sync + 'static,
    {
        Self {
            configure: Box::new(configure),
            entries: std::array::from_fn(|_| OnceLock::new()),
        }
    }

    /// Process-wide registry with the built-in configurations.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Build the engines for `mode` if that has not happened yet.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::EngineConstruction`] if the engines could not
    /// be built, now or on an earlier call.
    pub fn ensure(&self, mode: Mode) -> Result<(), RenderError> {
        self.entry(mode).map(|_| ())
    }

    /// Whether `mode` has been built successfully.
    #[must_use]
    pub fn is_initialized(&self, mode: Mode) -> bool {
        self.entries[mode.index()]
            .get()
            .is_some_and(Result::is_ok)
    }

    /// Snapshot of the content options of a built mode.
    #[must_use]
    pub fn options(&self, mode: Mode) -> Option<RenderOptions> {
        let entry = self.built(mode)?;
        Some(entry.lock().content.clone())
    }

    /// Snapshot of the TOC options of a built mode.
    #[must_use]
    pub fn toc_options(&self, mode: Mode) -> Option<RenderOptions> {
        let entry = self.built(mode)?;
        Some(entry.lock().toc.clone())
    }

    fn built(&self, mode: Mode) -> Option<&ModeEntry> {
        self.entries[mode.index()].get()?.as_ref().ok()
    }

    pub(crate) fn entry(&self, mode: Mode) -> Result<&ModeEntry, RenderError> {
        self.entries[mode.index()]
            .get_or_init(|| self.build(mode))
            .as_ref()
            .map_err(|source| RenderError::EngineConstruction {
                mode,
                source: source.clone(),
            })
    }

    fn build(&self, mode: Mode) -> Result<ModeEntry, EngineError> {
        let config = (self.configure)(mode);
        let toc_config = config.toc_variant();

        let built = build_entry(&config, &toc_config);

        match &built {
            Ok(_) => tracing::debug!(
                mode = %mode,
                html_flags = ?config.html_flags,
                "Built renderer"
            ),
            Err(e) => tracing::error!(mode = %mode, error = %e, "Failed to build renderer"),
        }
        built
    }
}

fn build_entry(config: &ModeConfig, toc_config: &ModeConfig) -> Result<ModeEntry, EngineError> {
    Ok(ModeEntry {
        content: config.build_engine()?,
        toc: toc_config.build_engine()?,
        state: Mutex::new(ModeState {
            content: config.initial_options(),
            toc: toc_config.initial_options(),
        }),
    })
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for mode in Mode::ALL {
            let state = match self.entries[mode.index()].get() {
                None => "pending",
                Some(Ok(_)) => "ready",
                Some(Err(_)) => "failed",
            };
            map.entry(&mode, &state);
        }
        map.finish()
    }
}
