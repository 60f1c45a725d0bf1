//! Zip helpers on real files.

mod common;

use common::{create_test_pdf, page_markers};
use filekit::{unzip_one_file, zip_one_file, Error, FileKind};

#[test]
fn test_zip_pdf_from_disk_and_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.pdf");
    let pdf = create_test_pdf(3, 1);
    std::fs::write(&path, &pdf).unwrap();

    let zipped = zip_one_file(&path, Some("report.pdf")).unwrap();
    assert_eq!(FileKind::sniff(&zipped), FileKind::Zip);

    let archive_path = dir.path().join("report.zip");
    std::fs::write(&archive_path, &zipped).unwrap();
    let restored = unzip_one_file(&archive_path).unwrap();
    assert_eq!(restored, pdf);
    assert_eq!(page_markers(&restored), vec![1001, 1002, 1003]);
}

#[test]
fn test_zip_compresses_repetitive_data() {
    let data = vec![b'a'; 64 * 1024];
    let zipped = zip_one_file(&data, None).unwrap();
    assert!(zipped.len() < data.len() / 10);
    assert_eq!(unzip_one_file(&zipped).unwrap(), data);
}

#[test]
fn test_zip_empty_buffer() {
    let zipped = zip_one_file(b"", Some("empty")).unwrap();
    assert!(unzip_one_file(&zipped).unwrap().is_empty());
}

#[test]
fn test_zip_missing_file() {
    let err = zip_one_file(std::path::Path::new("/nonexistent/file.pdf"), None).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_unzip_truncated_archive() {
    let zipped = zip_one_file(b"some content that is long enough", Some("x")).unwrap();
    let truncated = &zipped[..zipped.len() / 2];
    assert!(unzip_one_file(truncated).is_err());
}
