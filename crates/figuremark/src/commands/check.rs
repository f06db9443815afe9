//! `figuremark check` command implementation.

use std::path::PathBuf;

use clap::Args;
use figuremark_config::{CliSettings, Config};

use super::{convert_file, report_warnings};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Path to the document to check.
    input: PathBuf,

    /// Global attributes applied before the first line (overrides config).
    #[arg(long)]
    globals: Option<String>,

    /// Path to configuration file (default: auto-discover figuremark.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the input cannot be read, or
    /// the conversion produced any warning.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            globals: self.globals,
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let conversion = convert_file(&config, &self.input)?;
        report_warnings(&output, &self.input, &conversion);
        output.info(&conversion.summary());

        if conversion.warnings.is_empty() {
            output.success("No warnings.");
            Ok(())
        } else {
            Err(CliError::Warnings(conversion.warnings.len()))
        }
    }
}
