//! PDF inputs need no conversion.

use crate::error::Result;
use std::path::Path;

use super::{clean_source, ConvertOptions, DocumentConverter};

/// Reads PDFs back unchanged.
#[derive(Debug, Clone, Default)]
pub struct PassthroughConverter {
    _private: (),
}

impl PassthroughConverter {
    /// Create a new passthrough converter.
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Async flavour of [`DocumentConverter::convert`].
    #[cfg(feature = "async")]
    pub async fn convert_async(&self, source: &Path, options: &ConvertOptions) -> Result<Vec<u8>> {
        let bytes = tokio::fs::read(source).await?;
        clean_source(source, options)?;
        Ok(bytes)
    }
}

impl DocumentConverter for PassthroughConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn name(&self) -> &str {
        "passthrough"
    }

    fn convert(&self, source: &Path, _out_dir: &Path, options: &ConvertOptions) -> Result<Vec<u8>> {
        let bytes = std::fs::read(source)?;
        clean_source(source, options)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_back_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.pdf");
        std::fs::write(&source, b"%PDF-1.4 body").unwrap();

        let converter = PassthroughConverter::new();
        let bytes = converter
            .convert(&source, dir.path(), &ConvertOptions::default())
            .unwrap();
        assert_eq!(bytes, b"%PDF-1.4 body");
        assert!(source.exists());
    }

    #[test]
    fn test_clean_source_removes_input() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.pdf");
        std::fs::write(&source, b"%PDF-1.4").unwrap();

        let options = ConvertOptions::new().with_clean_source(true);
        PassthroughConverter::new()
            .convert(&source, dir.path(), &options)
            .unwrap();
        assert!(!source.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
