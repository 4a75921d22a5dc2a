//! Error handling for the MRH CLI

use thiserror::Error;
use std::path::PathBuf;

/// Main error type for MRH CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Input/Output error: {message}")]
    Io { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid dataset: {message}")]
    Dataset { message: String },

    #[error("Invalid view: {message}")]
    View { message: String },

    #[error("Rendering error: {message}")]
    Rendering { message: String },
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io { message: message.into() }
    }

    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    pub fn dataset<S: Into<String>>(message: S) -> Self {
        Self::Dataset { message: message.into() }
    }

    pub fn view<S: Into<String>>(message: S) -> Self {
        Self::View { message: message.into() }
    }

    pub fn rendering<S: Into<String>>(message: S) -> Self {
        Self::Rendering { message: message.into() }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(format!("TOML parsing error: {}", err))
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(err: toml::ser::Error) -> Self {
        Self::config(format!("TOML serialization error: {}", err))
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::dataset(format!("JSON parsing error: {}", err))
    }
}

impl From<mrh_core::MrhError> for CliError {
    fn from(err: mrh_core::MrhError) -> Self {
        Self::view(err.to_string())
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Provide helpful error messages and suggestions
pub fn format_error_with_suggestions(error: &CliError) -> String {
    let mut message = error.to_string();

    match error {
        CliError::FileNotFound { path } => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • Check that the file path is correct: {}\n\
                 • Ensure you have read permissions for the file",
                path.display()
            ));
        }

        CliError::Dataset { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • A dataset is a JSON object with dataset_id, headers and data\n\
                 • Every header needs name, start, stop, minscore and maxscore"
            );
        }

        CliError::View { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Use 'chr1:0-100K' or 'chr1:0-100K vs chr2:0-100K'\n\
                 • Run 'mrh chroms' to list the available chromosomes"
            );
        }

        CliError::Config { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your mrh.toml configuration file\n\
                 • Use 'mrh init-config' to generate a sample configuration"
            );
        }

        _ => {}
    }

    message
}

/// Print error with helpful suggestions and exit
pub fn print_error_and_exit(error: &CliError) -> ! {
    eprintln!("Error: {}", format_error_with_suggestions(error));
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CliError::config("test message");
        assert!(matches!(err, CliError::Config { .. }));
        assert_eq!(err.to_string(), "Configuration error: test message");
    }

    #[test]
    fn test_error_suggestions() {
        let err = CliError::file_not_found(PathBuf::from("contacts.json"));
        let formatted = format_error_with_suggestions(&err);
        assert!(formatted.contains("Suggestions:"));
        assert!(formatted.contains("Check that the file path is correct"));

        let err = CliError::view("bad region");
        assert!(format_error_with_suggestions(&err).contains("mrh chroms"));
    }

    #[test]
    fn test_conversions() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(matches!(cli_err, CliError::Io { .. }));

        let core_err: CliError = mrh_core::MrhError::UnknownChromosome("chrZ".into()).into();
        assert!(matches!(core_err, CliError::View { .. }));
    }
}
