//! Input sources: a file on disk or a buffer already in memory.

use crate::error::Result;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Where an input document comes from.
///
/// Every operation that reads a document accepts `impl Into<Source>`, so
/// callers can pass a `&Path`, `&PathBuf`, `&[u8]` or `&Vec<u8>` directly.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    /// A file on disk.
    Path(&'a Path),
    /// Bytes already in memory.
    Bytes(&'a [u8]),
}

impl<'a> Source<'a> {
    /// Read the whole source into memory.
    ///
    /// In-memory sources are borrowed, not copied.
    pub fn read(&self) -> Result<Cow<'a, [u8]>> {
        match *self {
            Source::Path(path) => Ok(Cow::Owned(std::fs::read(path)?)),
            Source::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
        }
    }

    /// The path, if this source is a file.
    pub fn path(&self) -> Option<&'a Path> {
        match *self {
            Source::Path(path) => Some(path),
            Source::Bytes(_) => None,
        }
    }

    /// Short description for log messages.
    pub fn describe(&self) -> String {
        match self {
            Source::Path(path) => path.display().to_string(),
            Source::Bytes(bytes) => format!("<{} bytes in memory>", bytes.len()),
        }
    }
}

impl<'a> From<&'a Path> for Source<'a> {
    fn from(path: &'a Path) -> Self {
        Source::Path(path)
    }
}

impl<'a> From<&'a PathBuf> for Source<'a> {
    fn from(path: &'a PathBuf) -> Self {
        Source::Path(path.as_path())
    }
}

impl<'a> From<&'a [u8]> for Source<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Source::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for Source<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Source::Bytes(bytes.as_slice())
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Source<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        Source::Bytes(bytes.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_source_is_borrowed() {
        let data = vec![1u8, 2, 3];
        let source = Source::from(&data);
        let read = source.read().unwrap();
        assert!(matches!(read, Cow::Borrowed(_)));
        assert_eq!(&*read, &[1, 2, 3]);
        assert!(source.path().is_none());
    }

    #[test]
    fn test_path_source_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, b"hello").unwrap();

        let source = Source::from(&path);
        assert_eq!(source.path(), Some(path.as_path()));
        assert_eq!(&*source.read().unwrap(), b"hello");
    }

    #[test]
    fn test_missing_path_is_io_error() {
        let source = Source::from(Path::new("/definitely/not/here.pdf"));
        assert!(matches!(source.read(), Err(crate::Error::Io(_))));
    }

    #[test]
    fn test_describe() {
        assert_eq!(Source::from(b"abcd").describe(), "<4 bytes in memory>");
        assert_eq!(Source::from(Path::new("a.pdf")).describe(), "a.pdf");
    }
}
