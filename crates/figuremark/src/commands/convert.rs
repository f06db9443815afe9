//! `figuremark convert` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use figuremark_config::{CliSettings, Config};

use super::{convert_file, report_warnings};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Path to the document to convert.
    input: PathBuf,

    /// Output file (default: `<stem><suffix>.<ext>` next to the input).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the converted document to stdout instead of a file.
    #[arg(long, conflicts_with = "output")]
    stdout: bool,

    /// Global attributes applied before the first line (overrides config).
    #[arg(long)]
    globals: Option<String>,

    /// Fail without writing when any warning is produced.
    #[arg(long)]
    strict: bool,

    /// Path to configuration file (default: auto-discover figuremark.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl ConvertArgs {
    /// Execute the convert command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the input cannot be read, the
    /// output cannot be written, or strict mode is on and warnings were produced.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            globals: self.globals.clone(),
            strict: self.strict.then_some(true),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let conversion = convert_file(&config, &self.input)?;
        report_warnings(&output, &self.input, &conversion);
        if config.convert.strict && !conversion.warnings.is_empty() {
            return Err(CliError::Warnings(conversion.warnings.len()));
        }

        if self.stdout {
            Output::document(&conversion.text)?;
            output.info(&conversion.summary());
            return Ok(());
        }

        let destination = self.destination(&config);
        if same_file(&destination, &self.input) {
            return Err(CliError::Validation(format!(
                "Refusing to overwrite input file: {}",
                self.input.display()
            )));
        }
        std::fs::write(&destination, &conversion.text)?;

        output.success(&format!(
            "{} Wrote {}",
            conversion.summary(),
            destination.display()
        ));
        Ok(())
    }

    /// Where the converted document goes.
    fn destination(&self, config: &Config) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| config.output.output_path(&self.input))
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: ConvertArgs,
    }

    struct Fixture {
        dir: tempfile::TempDir,
        input: PathBuf,
        config: PathBuf,
    }

    fn fixture(document: &str, config: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("guide.md");
        let config_path = dir.path().join("figuremark.toml");
        std::fs::write(&input, document).unwrap();
        std::fs::write(&config_path, config).unwrap();
        Fixture {
            dir,
            input,
            config: config_path,
        }
    }

    fn args(fixture: &Fixture) -> ConvertArgs {
        ConvertArgs {
            input: fixture.input.clone(),
            output: None,
            stdout: false,
            globals: None,
            strict: false,
            config: Some(fixture.config.clone()),
            verbose: false,
        }
    }

    #[test]
    fn test_writes_next_to_input() {
        let fixture = fixture("```figure T\n[a]{+}\n```\n", "");

        args(&fixture).execute().unwrap();

        let written = std::fs::read_to_string(fixture.dir.path().join("guide-converted.md")).unwrap();
        assert!(written.starts_with(r#"<figure id="figure-1""#));
        assert!(written.contains(r#"<span class="figuremark insert">a</span>"#));
    }

    #[test]
    fn test_suffix_from_config() {
        let fixture = fixture("```figure\nx\n```\n", "[output]\nsuffix = \".html\"\n");

        args(&fixture).execute().unwrap();

        assert!(fixture.dir.path().join("guide.html.md").exists());
    }

    #[test]
    fn test_explicit_output_and_globals() {
        let fixture = fixture("```figure\nx\n```\n", "[convert]\nglobals = \".file\"\n");
        let destination = fixture.dir.path().join("out.html");
        let mut args = args(&fixture);
        args.output = Some(destination.clone());
        args.globals = Some(".cli".to_owned());

        args.execute().unwrap();

        let written = std::fs::read_to_string(destination).unwrap();
        assert!(written.contains(r#"class="figuremark cli""#));
        assert!(!written.contains("figuremark file"));
    }

    #[test]
    fn test_strict_fails_without_writing() {
        let fixture = fixture("```figure {:bogus=1}\nx\n```\n", "");
        let mut args = args(&fixture);
        args.strict = true;

        let err = args.execute().unwrap_err();

        assert!(matches!(err, CliError::Warnings(1)));
        assert_eq!(err.to_string(), "1 warning(s) produced");
        assert!(!fixture.dir.path().join("guide-converted.md").exists());
    }

    #[test]
    fn test_warnings_are_not_fatal_by_default() {
        let fixture = fixture("```figure {:bogus=1}\nx\n```\n", "");

        args(&fixture).execute().unwrap();

        assert!(fixture.dir.path().join("guide-converted.md").exists());
    }

    #[test]
    fn test_refuses_to_overwrite_input() {
        let fixture = fixture("```figure\nx\n```\n", "");
        let mut args = args(&fixture);
        args.output = Some(fixture.input.clone());

        let err = args.execute().unwrap_err();

        assert!(matches!(err, CliError::Validation(_)));
        assert_eq!(
            std::fs::read_to_string(&fixture.input).unwrap(),
            "```figure\nx\n```\n"
        );
    }

    #[test]
    fn test_missing_config_file() {
        let fixture = fixture("x", "");
        let mut args = args(&fixture);
        args.config = Some(fixture.dir.path().join("nope.toml"));

        let err = args.execute().unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_parse_arguments() {
        let harness = Harness::try_parse_from([
            "figuremark",
            "doc.md",
            "-o",
            "out.md",
            "--globals",
            ".wide",
            "--strict",
            "-v",
        ])
        .unwrap();

        assert_eq!(harness.args.input, PathBuf::from("doc.md"));
        assert_eq!(harness.args.output, Some(PathBuf::from("out.md")));
        assert_eq!(harness.args.globals.as_deref(), Some(".wide"));
        assert!(harness.args.strict);
        assert!(harness.args.verbose);
        assert!(!harness.args.stdout);
    }

    #[test]
    fn test_stdout_conflicts_with_output() {
        let result =
            Harness::try_parse_from(["figuremark", "doc.md", "--stdout", "-o", "out.md"]);
        assert!(result.is_err());
    }
}
