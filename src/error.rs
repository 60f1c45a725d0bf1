//! Error types for filekit.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for filekit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while manipulating files and PDFs.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not recognized as a PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF header carries a version we cannot read.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error serializing a PDF document.
    #[error("PDF write error: {0}")]
    PdfWrite(String),

    /// A caller-supplied argument is out of its valid domain.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The file extension is not accepted by any converter.
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// The external converter failed.
    #[error("Conversion failed: {0}")]
    Conversion(String),

    /// The external converter did not finish in time.
    #[error("Conversion timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The data is not a single-file zip archive we can unpack.
    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    /// Error reported by the zip codec.
    #[error("Archive error: {0}")]
    Archive(String),

    /// Deletion refused by the delete policy.
    #[error("Refusing to delete protected path: {}", .0.display())]
    ProtectedPath(PathBuf),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error means the input document could not be parsed.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownFormat
                | Error::UnsupportedVersion(_)
                | Error::PdfParse(_)
                | Error::Encrypted
        )
    }

    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            zip::result::ZipError::InvalidArchive(msg) => Error::InvalidArchive(msg.to_string()),
            _ => Error::Archive(err.to_string()),
        }
    }
}
