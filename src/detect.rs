//! File kind detection from magic bytes.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_VERSION_LEN: usize = 3; // e.g., "1.7"

/// Local file header signature of a zip archive.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
/// End-of-central-directory signature; an empty archive starts with it.
const ZIP_EMPTY_MAGIC: &[u8] = b"PK\x05\x06";

/// Number of leading bytes needed to classify a file.
pub const SNIFF_LEN: usize = 16;

/// What the leading bytes of a file say it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileKind {
    /// A PDF with the header version (e.g. "1.7").
    Pdf { version: String },
    /// A zip archive.
    Zip,
    /// Anything else.
    Unknown,
}

impl FileKind {
    /// Classify a byte prefix.
    pub fn sniff(data: &[u8]) -> Self {
        if data.starts_with(ZIP_MAGIC) || data.starts_with(ZIP_EMPTY_MAGIC) {
            return FileKind::Zip;
        }
        match pdf_version(data) {
            Ok(version) => FileKind::Pdf { version },
            Err(_) => FileKind::Unknown,
        }
    }

    /// Classify the file at `path` by reading its first bytes.
    pub fn sniff_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut header = Vec::with_capacity(SNIFF_LEN);
        File::open(path)?
            .take(SNIFF_LEN as u64)
            .read_to_end(&mut header)?;
        Ok(Self::sniff(&header))
    }
}

/// Read the PDF version out of a `%PDF-x.y` header.
///
/// Returns [`Error::UnknownFormat`] when the magic is missing and
/// [`Error::UnsupportedVersion`] when the version is not of the `d.d` form.
pub fn pdf_version(data: &[u8]) -> Result<String> {
    if data.len() < PDF_MAGIC.len() + PDF_VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let raw = &data[PDF_MAGIC.len()..PDF_MAGIC.len() + PDF_VERSION_LEN];
    match raw {
        [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit() => {
            Ok(String::from_utf8_lossy(raw).into_owned())
        }
        _ => Err(Error::UnsupportedVersion(
            String::from_utf8_lossy(raw).into_owned(),
        )),
    }
}

/// Check whether the bytes start like a PDF.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    pdf_version(data).is_ok()
}

/// Check whether the bytes start like a zip archive.
pub fn is_zip_bytes(data: &[u8]) -> bool {
    FileKind::sniff(data) == FileKind::Zip
}
