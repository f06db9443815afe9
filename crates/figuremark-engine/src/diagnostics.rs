//! Conversion diagnostics.
//!
//! Conversion never fails. Anything worth complaining about is recorded as a
//! [`Warning`] and logged through `tracing` at the moment it is found.

/// A non-fatal problem found while converting a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Warning {
    /// An attribute string used a `:name=value` directive outside the allow-list.
    #[error("Unknown directive ':{name}', ignoring")]
    UnknownDirective {
        /// Directive name without the `:` prefix.
        name: String,
    },

    /// A known directive carried a value it does not accept.
    #[error("Invalid value '{value}' for directive ':{name}', using '{default}'")]
    InvalidDirectiveValue {
        /// Directive name without the `:` prefix.
        name: String,
        /// The rejected value.
        value: String,
        /// The value used instead.
        default: String,
    },

    /// Tag-stripped incept output did not reproduce the source block.
    #[error("Imperfect inception in figure {figure} (delta {delta})")]
    ImperfectInception {
        /// Number of the affected figure.
        figure: usize,
        /// Character count of the stripped output minus that of the source.
        delta: i64,
    },
}

/// Log a warning and append it to `sink`.
pub(crate) fn record(sink: &mut Vec<Warning>, warning: Warning) {
    match &warning {
        Warning::UnknownDirective { name } => {
            tracing::warn!(directive = %name, "Unknown directive, ignoring");
        }
        Warning::InvalidDirectiveValue {
            name,
            value,
            default,
        } => {
            tracing::warn!(directive = %name, value = %value, default = %default, "Invalid directive value");
        }
        Warning::ImperfectInception { figure, delta } => {
            tracing::warn!(figure, delta, "Imperfect inception");
        }
    }
    sink.push(warning);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_appends() {
        let mut sink = Vec::new();
        record(
            &mut sink,
            Warning::UnknownDirective {
                name: "bogus".to_owned(),
            },
        );
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_display() {
        let warning = Warning::ImperfectInception {
            figure: 3,
            delta: -2,
        };
        assert_eq!(
            warning.to_string(),
            "Imperfect inception in figure 3 (delta -2)"
        );

        let warning = Warning::InvalidDirectiveValue {
            name: "link-caption".to_owned(),
            value: "sometimes".to_owned(),
            default: "num".to_owned(),
        };
        assert_eq!(
            warning.to_string(),
            "Invalid value 'sometimes' for directive ':link-caption', using 'num'"
        );
    }
}
