//! Single-file zip helpers.
//!
//! [`zip_one_file`] packs one file or buffer into a deflated archive held
//! in memory; [`unzip_one_file`] is the inverse and insists the archive
//! holds exactly one regular file.

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::detect::is_zip_bytes;
use crate::error::{Error, Result};
use crate::source::Source;

/// Entry name used when the caller does not provide one.
fn default_entry_name(source: &Source<'_>) -> String {
    let stem = uuid::Uuid::new_v4().simple().to_string();
    match source {
        Source::Path(_) => format!("{}.pdf", stem),
        Source::Bytes(_) => stem,
    }
}

/// Compress a single file or buffer into an in-memory zip archive.
///
/// The entry is named `name` when given. Otherwise it gets a random hex
/// name, with a `.pdf` suffix for files read from disk.
///
/// # Example
///
/// ```
/// use filekit::archive::{unzip_one_file, zip_one_file};
///
/// let zipped = zip_one_file(b"hello", Some("greeting.txt"))?;
/// assert_eq!(unzip_one_file(&zipped)?, b"hello");
/// # Ok::<(), filekit::Error>(())
/// ```
pub fn zip_one_file<'a>(source: impl Into<Source<'a>>, name: Option<&str>) -> Result<Vec<u8>> {
    let source = source.into();
    let data = source.read()?;
    let entry_name = name
        .map(str::to_owned)
        .unwrap_or_else(|| default_entry_name(&source));

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    writer.start_file(entry_name.as_str(), options)?;
    writer.write_all(&data)?;
    let buffer = writer.finish()?.into_inner();

    log::debug!(
        "zipped {} as {:?} ({} -> {} bytes)",
        source.describe(),
        entry_name,
        data.len(),
        buffer.len()
    );
    Ok(buffer)
}

/// Extract the content of a zip archive holding exactly one file.
pub fn unzip_one_file<'a>(source: impl Into<Source<'a>>) -> Result<Vec<u8>> {
    let source = source.into();
    let data = source.read()?;

    if !is_zip_bytes(&data) {
        let signature: Vec<u8> = data.iter().take(4).copied().collect();
        return Err(Error::InvalidArchive(format!(
            "not a zip file, signature: {:?}",
            signature
        )));
    }

    let mut archive = ZipArchive::new(Cursor::new(&data[..]))?;
    match archive.len() {
        0 => return Err(Error::InvalidArchive("archive contains no files".into())),
        1 => {}
        _ => {
            let names: Vec<&str> = archive.file_names().collect();
            return Err(Error::InvalidArchive(format!(
                "expected a single file, archive contains {:?}",
                names
            )));
        }
    }

    let mut entry = archive.by_index(0)?;
    if entry.is_dir() {
        return Err(Error::InvalidArchive(format!(
            "the only entry is a directory: {}",
            entry.name()
        )));
    }

    let mut content = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut content)?;

    log::debug!(
        "unzipped {:?} from {} ({} bytes)",
        entry.name(),
        source.describe(),
        content.len()
    );
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_names(zipped: &[u8]) -> Vec<String> {
        let archive = ZipArchive::new(Cursor::new(zipped)).unwrap();
        archive.file_names().map(String::from).collect()
    }

    #[test]
    fn test_round_trip_with_name() {
        let zipped = zip_one_file(b"some content", Some("notes.txt")).unwrap();
        assert!(is_zip_bytes(&zipped));
        assert_eq!(entry_names(&zipped), vec!["notes.txt"]);
        assert_eq!(unzip_one_file(&zipped).unwrap(), b"some content");
    }

    #[test]
    fn test_default_name_for_bytes() {
        let zipped = zip_one_file(b"abc", None).unwrap();
        let names = entry_names(&zipped);
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].len(), 32);
        assert!(names[0].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_default_name_for_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.bin");
        std::fs::write(&path, b"on disk").unwrap();

        let zipped = zip_one_file(&path, None).unwrap();
        let names = entry_names(&zipped);
        assert!(names[0].ends_with(".pdf"));
        assert_eq!(unzip_one_file(&zipped).unwrap(), b"on disk");
    }

    #[test]
    fn test_unzip_rejects_non_zip() {
        let err = unzip_one_file(b"%PDF-1.7 not a zip").unwrap_err();
        match err {
            Error::InvalidArchive(msg) => assert!(msg.contains("[37, 80, 68, 70]")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unzip_rejects_multiple_entries() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for name in ["a.txt", "b.txt"] {
            writer.start_file(name, SimpleFileOptions::default()).unwrap();
            writer.write_all(name.as_bytes()).unwrap();
        }
        let zipped = writer.finish().unwrap().into_inner();

        let err = unzip_one_file(&zipped).unwrap_err();
        match err {
            Error::InvalidArchive(msg) => {
                assert!(msg.contains("a.txt"));
                assert!(msg.contains("b.txt"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unzip_rejects_empty_archive() {
        let zipped = ZipWriter::new(Cursor::new(Vec::new()))
            .finish()
            .unwrap()
            .into_inner();
        assert!(matches!(
            unzip_one_file(&zipped),
            Err(Error::InvalidArchive(_))
        ));
    }

    #[test]
    fn test_unzip_rejects_directory_entry() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .add_directory("folder/", SimpleFileOptions::default())
            .unwrap();
        let zipped = writer.finish().unwrap().into_inner();
        assert!(matches!(
            unzip_one_file(&zipped),
            Err(Error::InvalidArchive(_))
        ));
    }
}
