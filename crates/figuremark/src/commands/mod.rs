//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod convert;

pub(crate) use check::CheckArgs;
pub(crate) use convert::ConvertArgs;

use std::path::Path;

use figuremark_config::Config;
use figuremark_engine::{Conversion, Converter};

use crate::error::CliError;
use crate::output::Output;

/// Read `input` and convert it with the configured globals.
fn convert_file(config: &Config, input: &Path) -> Result<Conversion, CliError> {
    if !input.is_file() {
        return Err(CliError::Validation(format!(
            "Input file not found: {}",
            input.display()
        )));
    }

    let text = std::fs::read_to_string(input)?;
    let mut converter = Converter::new();
    if let Some(globals) = &config.convert.globals {
        converter = converter.with_globals(globals);
    }
    Ok(converter.convert(&text))
}

/// Print every warning of `conversion` in yellow.
fn report_warnings(output: &Output, input: &Path, conversion: &Conversion) {
    for warning in &conversion.warnings {
        output.warning(&format!("{}: {warning}", input.display()));
    }
}
