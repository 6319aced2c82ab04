//! Error types for docflow library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for docflow operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading, editing or saving documents.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as DOCX.
    #[error("Unknown file format: not a valid DOCX package")]
    UnknownFormat,

    /// A required package part is missing.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// Malformed XML inside a package part.
    #[error("XML error: {0}")]
    Xml(String),

    /// Error reading or writing the zip container.
    #[error("Zip error: {0}")]
    Zip(String),

    /// A document could not be loaded.
    #[error("Failed to load {path}: {reason}")]
    DocumentLoad {
        /// Source document path
        path: PathBuf,
        /// Underlying cause
        reason: String,
    },

    /// A document could not be saved.
    #[error("Failed to save {path}: {reason}")]
    DocumentSave {
        /// Destination path
        path: PathBuf,
        /// Underlying cause
        reason: String,
    },

    /// Unexpected failure while applying rules or a font policy.
    #[error("Rule application error: {0}")]
    RuleApplication(String),

    /// A replacement rule failed validation.
    #[error("Invalid replacement rule: {0}")]
    InvalidRule(String),

    /// A font policy failed validation.
    #[error("Invalid font policy: {0}")]
    InvalidFontPolicy(String),

    /// The batch source directory does not exist.
    #[error("Source directory not found: {0}")]
    SourceNotFound(PathBuf),

    /// Two source documents derive the same output file.
    #[error("Output {path} already produced by {first}")]
    OutputCollision {
        /// Derived output path
        path: PathBuf,
        /// Source that claimed the output first
        first: PathBuf,
    },

    /// Rules turned a filename into something other than a plain file name.
    #[error("Derived output name {0:?} is not a plain file name")]
    InvalidOutputName(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Wrap an error raised while loading `path`.
    pub fn load(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Error::DocumentLoad {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// Wrap an error raised while saving to `path`.
    pub fn save(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Error::DocumentSave {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// Whether this error is a configuration problem detected before a batch starts.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidRule(_) | Error::InvalidFontPolicy(_) | Error::SourceNotFound(_)
        )
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            zip::result::ZipError::InvalidArchive(_) => Error::UnknownFormat,
            _ => Error::Zip(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Other(format!("JSON error: {}", err))
    }
}
