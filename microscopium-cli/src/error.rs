//! CLI error types and result alias.

use miette::Diagnostic;
use microscopium_mongodb::MongoError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// IO error
    #[error("IO error: {0}")]
    #[diagnostic(code(microscopium::io))]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(microscopium::config),
        help("see microscopium.toml or run `microscopium serve --help`")
    )]
    Config(String),

    /// Document store error
    #[error("Database error: {0}")]
    #[diagnostic(code(microscopium::database))]
    Database(#[from] MongoError),

    /// Server error
    #[error("Server error: {0}")]
    #[diagnostic(code(microscopium::server))]
    Server(String),
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        CliError::Config(format!("Failed to parse TOML: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CliError::Config("missing database".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing database");

        let err: CliError = MongoError::connection("refused").into();
        assert_eq!(err.to_string(), "Database error: connection error: refused");
    }

    #[test]
    fn test_from_toml_error() {
        let toml_err = toml::from_str::<toml::Value>("= nope").unwrap_err();
        let err: CliError = toml_err.into();
        assert!(matches!(err, CliError::Config(_)));
    }
}
