//! Error types for configuration loading and validation.

use weft_arch::ArchError;

/// Errors that can occur when loading or validating a `weft.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A required field or table is missing or empty.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// The described architecture is inconsistent.
    #[error(transparent)]
    Arch(#[from] ArchError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing_field() {
        let err = ConfigError::MissingField("switch".to_string());
        assert_eq!(err.to_string(), "missing required field: switch");
    }

    #[test]
    fn display_parse_error() {
        let err = ConfigError::ParseError("expected '=' at line 3".to_string());
        assert_eq!(
            err.to_string(),
            "failed to parse configuration: expected '=' at line 3"
        );
    }

    #[test]
    fn arch_errors_pass_through() {
        let err: ConfigError = ArchError::UnknownSwitch("mux".to_string()).into();
        assert_eq!(err.to_string(), "unknown switch 'mux'");
    }

    #[test]
    fn display_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ConfigError::IoError(io_err);
        assert!(err.to_string().starts_with("failed to read configuration:"));
    }
}
