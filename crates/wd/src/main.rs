//! wd CLI - markdown pipeline.
//!
//! Provides commands for:
//! - `render`: Render a markdown file to HTML or JSON
//! - `themes`: List available highlighting themes

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{RenderArgs, ThemesArgs};
use output::Output;

/// wd - Markdown pipeline.
#[derive(Parser)]
#[command(name = "wd", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a markdown file.
    Render(RenderArgs),
    /// List available highlighting themes.
    Themes(ThemesArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Render(args) if args.verbose);

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Themes(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_themes_takes_no_arguments() {
        let cli = Cli::try_parse_from(["wd", "themes"]).unwrap();
        assert!(matches!(cli.command, Commands::Themes(ThemesArgs)));
        assert!(Cli::try_parse_from(["wd", "themes", "extra"]).is_err());
    }
}
