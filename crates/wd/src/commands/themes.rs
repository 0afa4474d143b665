//! `wd themes` command implementation.

use clap::Args;
use wd_pipeline::{DEFAULT_THEME, Highlighter};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the themes command.
#[derive(Args)]
pub(crate) struct ThemesArgs;

impl ThemesArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let highlighter = Highlighter::load_defaults();
        for name in highlighter.theme_names() {
            if name == DEFAULT_THEME {
                output.document(&format!("{name} (default)"))?;
            } else {
                output.document(&name)?;
            }
        }
        Ok(())
    }
}
