//! `snudown` render command implementation.

use std::io::{Read, Write};
use std::path::PathBuf;

use clap::Args;
use snudown::{Mode, RendererRegistry};
use snudown_config::{CliSettings, Config, RenderConfig};

use crate::error::CliError;

/// Arguments for rendering a document.
#[derive(Args, Debug)]
pub(crate) struct RenderArgs {
    /// Markdown file to render (default: read stdin).
    file: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover snudown.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Moderation mode: usertext or wiki (overrides config).
    #[arg(short, long, env = "SNUDOWN_MODE")]
    mode: Option<Mode>,

    /// Add rel="nofollow" to links (`--nofollow=false` overrides config).
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    nofollow: Option<bool>,

    /// Target attribute for links (overrides config).
    #[arg(short, long)]
    target: Option<String>,

    /// Prepend a table of contents (`--toc=false` overrides config).
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    toc: Option<bool>,

    /// Prefix for heading anchor ids (overrides config).
    #[arg(long)]
    toc_id_prefix: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command, writing HTML to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the input cannot be read or
    /// rendering fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            mode: self.mode,
            nofollow: self.nofollow,
            target: self.target,
            toc: self.toc,
            toc_id_prefix: self.toc_id_prefix,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        let input = read_input(self.file)?;
        let mut stdout = std::io::stdout().lock();
        render_to(RendererRegistry::global(), &config.render, &input, &mut stdout)
    }
}

/// Read the whole input file, or stdin when no file is given.
fn read_input(file: Option<PathBuf>) -> Result<Vec<u8>, CliError> {
    match file {
        Some(path) => std::fs::read(&path).map_err(|source| CliError::Input { path, source }),
        None => {
            let mut input = Vec::new();
            std::io::stdin().lock().read_to_end(&mut input)?;
            Ok(input)
        }
    }
}

/// Render `input` with `render` settings and write the HTML to `out`.
fn render_to(
    registry: &RendererRegistry,
    render: &RenderConfig,
    input: &[u8],
    out: &mut impl Write,
) -> Result<(), CliError> {
    let html = registry.render(render.mode, input, &render.request())?;
    tracing::info!(
        mode = %render.mode,
        input_len = input.len(),
        output_len = html.len(),
        "Rendered document"
    );
    out.write_all(&html)?;
    out.flush()?;
    Ok(())
}
