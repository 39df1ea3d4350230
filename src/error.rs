//! Error types for configuration, query loading and batch output

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while assembling the run configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required secret is absent from the environment and `.env`
    #[error("Configuration Error: {0} not found in environment/.env")]
    MissingSecret(&'static str),

    /// Settings file could not be read
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not valid YAML for [`crate::config::Settings`]
    #[error("Invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Errors raised by a [`crate::queries::QuerySource`]
#[derive(Debug, Error)]
pub enum QuerySourceError {
    /// The input file could not be opened or read
    #[error("Failed to read query input {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be decoded
    #[error("Invalid JSON in {path} (record {record}): {source}")]
    Json {
        path: PathBuf,
        record: usize,
        #[source]
        source: serde_json::Error,
    },

    /// The requested column is absent from every record
    #[error("Query column '{column}' not found. Available columns: {available:?}")]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },
}

/// Errors raised while preparing or writing batch output
#[derive(Debug, Error)]
pub enum OutputError {
    /// A batch directory could not be created; fatal for the run
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A batch file could not be opened, written or flushed
    #[error("Failed to open/write batch file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_secret_message() {
        let err = ConfigError::MissingSecret("GOOGLE_CSE_ID");
        assert_eq!(
            err.to_string(),
            "Configuration Error: GOOGLE_CSE_ID not found in environment/.env"
        );
    }

    #[test]
    fn test_column_not_found_lists_columns() {
        let err = QuerySourceError::ColumnNotFound {
            column: "claim".to_string(),
            available: vec!["Statement".to_string(), "labels".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'claim'"));
        assert!(msg.contains("Statement"));
    }
}
