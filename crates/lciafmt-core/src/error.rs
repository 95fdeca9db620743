//! Error types and handling for LCIA formatting operations

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for mapping, collapsing and export operations
#[derive(Debug, Error)]
pub enum LciaError {
    /// A named mapping system has neither a bundled nor a configured table
    #[error("Unsupported mapping system: '{system}'")]
    UnsupportedMappingSystem { system: String },

    /// A supplied mapping table does not meet the mapping format
    #[error("Invalid mapping table: {message}")]
    InvalidMappingTable { message: String },

    /// Input table lacks columns required by the characterization schema
    #[error("Missing required columns: {}", columns.join(", "))]
    MissingIdentifierColumns { columns: Vec<String> },

    /// A write was attempted on a finalized package writer
    #[error("Writer is closed; no further writes are permitted")]
    WriterClosed,

    /// Method name did not resolve against the method registry
    #[error("Unknown method: '{name}'")]
    UnknownMethod { name: String },

    /// Row-level decoding errors in a characterization table
    #[error("Invalid table: {message}")]
    InvalidTable { message: String },

    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Package error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Remote retrieval errors from the file cache
    #[error("Download of '{url}' failed: {message}")]
    DownloadError { url: String, message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Mapping,
    Input,
    Writer,
    Config,
    Io,
    Download,
}

impl LciaError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LciaError::UnsupportedMappingSystem { .. } => ErrorKind::Mapping,
            LciaError::InvalidMappingTable { .. } => ErrorKind::Mapping,
            LciaError::MissingIdentifierColumns { .. } => ErrorKind::Input,
            LciaError::InvalidTable { .. } => ErrorKind::Input,
            LciaError::CsvError(_) => ErrorKind::Input,
            LciaError::JsonError(_) => ErrorKind::Input,
            LciaError::UnknownMethod { .. } => ErrorKind::Config,
            LciaError::ConfigError { .. } => ErrorKind::Config,
            LciaError::WriterClosed => ErrorKind::Writer,
            LciaError::ZipError(_) => ErrorKind::Writer,
            LciaError::IoError { .. } => ErrorKind::Io,
            LciaError::DownloadError { .. } => ErrorKind::Download,
        }
    }

    /// Check if the current operation can continue with other inputs.
    ///
    /// Writer lifecycle violations and schema violations abort the operation.
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Download)
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid mapping table error
    pub fn invalid_mapping(message: impl Into<String>) -> Self {
        Self::InvalidMappingTable {
            message: message.into(),
        }
    }

    /// Create a row decoding error
    pub fn invalid_table(message: impl Into<String>) -> Self {
        Self::InvalidTable {
            message: message.into(),
        }
    }

    pub fn missing_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingIdentifierColumns {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for LciaError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::new(),
            source: err,
        }
    }
}
