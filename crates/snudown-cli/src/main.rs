//! snudown CLI - moderated markdown rendering.
//!
//! Reads markdown from a file or stdin and writes sanitized HTML to stdout.

mod error;
mod output;
mod render;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use output::Output;
use render::RenderArgs;

/// snudown - render markdown to sanitized HTML.
#[derive(Parser, Debug)]
#[command(name = "snudown", version, about)]
struct Cli {
    #[command(flatten)]
    render: RenderArgs,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.render.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = cli.render.execute() {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_args() {
        let cli = Cli::try_parse_from([
            "snudown",
            "page.md",
            "--mode",
            "wiki",
            "--nofollow",
            "--target",
            "_blank",
            "--toc",
            "--toc-id-prefix",
            "x-",
        ])
        .unwrap();
        let args = format!("{:?}", cli.render);
        assert!(args.contains("mode: Some(Wiki)"), "{args}");
        assert!(args.contains("nofollow: Some(true)"), "{args}");
        assert!(args.contains("toc: Some(true)"), "{args}");
    }

    #[test]
    fn test_parse_explicit_bool_flags() {
        let cli = Cli::try_parse_from(["snudown", "--nofollow=false", "--toc", "page.md"]).unwrap();
        let args = format!("{:?}", cli.render);
        assert!(args.contains("nofollow: Some(false)"), "{args}");
        assert!(args.contains("toc: Some(true)"), "{args}");
        assert!(args.contains("file: Some(\"page.md\")"), "{args}");

        let cli = Cli::try_parse_from(["snudown"]).unwrap();
        let args = format!("{:?}", cli.render);
        assert!(args.contains("nofollow: None"), "{args}");
        assert!(args.contains("toc: None"), "{args}");
    }

    #[test]
    fn test_parse_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["snudown", "--mode", "forum"]).is_err());
    }
}
