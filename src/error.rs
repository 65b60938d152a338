//! Module containing the definition of error types.

use thiserror::Error;

/// Enumeration of the different error kinds.
#[derive(Debug, Error)]
pub enum Kind {
    /// Configuration error.
    #[error("there was an error in the configuration: {message}")]
    Config {
        /// Error message.
        message: String,
    },
    /// Parsing error.
    #[error("there was an error in the parsing process")]
    Parse,
    /// Template name error.
    #[error("invalid template name: {message}")]
    TemplateName {
        /// Error message.
        message: String,
    },
    /// The package is not a ZIP archive.
    #[error("`{path}` is not a ZIP archive")]
    NotAnArchive {
        /// Path of the package.
        path: String,
    },
    /// The Unity container uses a layout this reader does not know.
    #[error("unsupported Unity container: {message}")]
    UnsupportedContainer {
        /// Error message.
        message: String,
    },
    /// The data ended before the structure being read.
    #[error("truncated data: needed {needed} bytes at offset {offset}")]
    Truncated {
        /// Offset of the read.
        offset: u64,
        /// Bytes needed.
        needed: u64,
    },
}
