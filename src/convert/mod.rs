//! Conversion of office documents and images to PDF.
//!
//! Converters are registered by file extension in a [`ConverterRegistry`].
//! PDFs pass straight through; office formats and images are handed to an
//! external headless office suite (LibreOffice's `soffice` by default).
//!
//! # Example
//!
//! ```no_run
//! use filekit::convert::{convert_to_pdf, ConvertOptions};
//! use std::path::Path;
//! use std::time::Duration;
//!
//! let options = ConvertOptions::new().with_timeout(Duration::from_secs(120));
//! let pdf = convert_to_pdf(Path::new("minutes.docx"), Path::new("/tmp/convert"), &options)?;
//! std::fs::write("minutes.pdf", pdf)?;
//! # Ok::<(), filekit::Error>(())
//! ```

mod office;
mod passthrough;

pub use office::OfficeConverter;
pub use passthrough::PassthroughConverter;

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Default converter executable.
pub const DEFAULT_PROGRAM: &str = "soffice";

/// Default wall-clock limit for one conversion.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3600);

/// Extensions handed to the office suite.
pub const OFFICE_EXTENSIONS: &[&str] = &["docx", "doc", "xls", "xlsx", "png", "jpg", "ppt", "pptx"];

/// Options for document conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Converter executable
    pub program: PathBuf,

    /// Arguments placed before the conversion arguments
    /// (e.g. `["run", "org.libreoffice.LibreOffice"]` for flatpak)
    pub launcher_args: Vec<OsString>,

    /// Wall-clock limit for the converter process
    pub timeout: Duration,

    /// Delete the source file after a successful conversion
    pub clean_source: bool,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the converter executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Add an argument placed before the conversion arguments.
    pub fn with_launcher_arg(mut self, arg: impl Into<OsString>) -> Self {
        self.launcher_args.push(arg.into());
        self
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Delete the source file once converted.
    pub fn with_clean_source(mut self, clean: bool) -> Self {
        self.clean_source = clean;
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            launcher_args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            clean_source: false,
        }
    }
}

/// Trait for document converters.
///
/// Implement this trait to add support for another input format.
pub trait DocumentConverter: Send + Sync {
    /// Get the supported file extensions for this converter.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["docx"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Get the name of this converter.
    fn name(&self) -> &str;

    /// Convert the file at `source` to PDF bytes.
    ///
    /// `out_dir` is where the converter may stage intermediate files; it
    /// must leave nothing behind there, on success or failure.
    fn convert(&self, source: &Path, out_dir: &Path, options: &ConvertOptions) -> Result<Vec<u8>>;

    /// Check if this converter supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry for document converters.
///
/// The registry maps file extensions to converters.
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<dyn DocumentConverter>>,
    by_name: HashMap<String, Arc<dyn DocumentConverter>>,
}

impl ConverterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the PDF passthrough and the office converter.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PassthroughConverter::new()));
        registry.register(Arc::new(OfficeConverter::new()));
        registry
    }

    /// Register a converter for all its supported extensions.
    ///
    /// A later registration replaces an earlier one for the same extension.
    pub fn register(&mut self, converter: Arc<dyn DocumentConverter>) {
        for ext in converter.supported_extensions() {
            self.converters.insert(ext.to_lowercase(), converter.clone());
        }
        self.by_name.insert(converter.name().to_lowercase(), converter);
    }

    /// Get a converter by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.converters.get(&ext.to_lowercase()).cloned()
    }

    /// Get a converter by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.converters.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions.
    pub fn supported_extensions(&self) -> Vec<&str> {
        self.converters.keys().map(|s| s.as_str()).collect()
    }

    /// Find the converter responsible for `path`.
    pub fn resolve(&self, path: &Path) -> Result<Arc<dyn DocumentConverter>> {
        let ext = extension_of(path)?;
        self.get_by_extension(ext)
            .ok_or_else(|| Error::UnsupportedFormat(format!(".{}", ext)))
    }

    /// Convert a file using the converter registered for its extension.
    pub fn convert(&self, source: &Path, out_dir: &Path, options: &ConvertOptions) -> Result<Vec<u8>> {
        let converter = self.resolve(source)?;
        log::info!(
            "converting {} with the {} converter",
            source.display(),
            converter.name()
        );
        converter.convert(source, out_dir, options)
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Convert `source` to PDF with the default registry.
///
/// PDFs are read back as-is. Other accepted types (`docx doc xls xlsx png
/// jpg ppt pptx`) go through the external converter, which works in a
/// fresh directory under `out_dir` that is removed before returning.
pub fn convert_to_pdf(source: &Path, out_dir: &Path, options: &ConvertOptions) -> Result<Vec<u8>> {
    ConverterRegistry::with_defaults().convert(source, out_dir, options)
}

/// Async flavour of [`convert_to_pdf`].
#[cfg(feature = "async")]
pub async fn convert_to_pdf_async(
    source: &Path,
    out_dir: &Path,
    options: &ConvertOptions,
) -> Result<Vec<u8>> {
    let ext = extension_of(source)?;
    if PassthroughConverter::new().supports_extension(ext) {
        PassthroughConverter::new().convert_async(source, options).await
    } else if OfficeConverter::new().supports_extension(ext) {
        OfficeConverter::new()
            .convert_async(source, out_dir, options)
            .await
    } else {
        Err(Error::UnsupportedFormat(format!(".{}", ext)))
    }
}

fn extension_of(path: &Path) -> Result<&str> {
    path.extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| Error::UnsupportedFormat(format!("{} has no extension", path.display())))
}

/// Delete the converted source when asked to. A source that is already
/// gone is not an error.
pub(crate) fn clean_source(source: &Path, options: &ConvertOptions) -> Result<()> {
    if !options.clean_source {
        return Ok(());
    }
    match std::fs::remove_file(source) {
        Ok(()) => {
            log::debug!("removed converted source {}", source.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new()
            .with_program("/opt/libreoffice/program/soffice")
            .with_launcher_arg("--norestore")
            .with_timeout(Duration::from_secs(30))
            .with_clean_source(true);

        assert_eq!(options.program, PathBuf::from("/opt/libreoffice/program/soffice"));
        assert_eq!(options.launcher_args, vec![OsString::from("--norestore")]);
        assert_eq!(options.timeout, Duration::from_secs(30));
        assert!(options.clean_source);
    }

    #[test]
    fn test_default_options() {
        let options = ConvertOptions::default();
        assert_eq!(options.program, PathBuf::from("soffice"));
        assert_eq!(options.timeout, Duration::from_secs(3600));
        assert!(!options.clean_source);
    }

    #[test]
    fn test_registry_with_defaults() {
        let registry = ConverterRegistry::with_defaults();
        for ext in ["pdf", "PDF", "docx", "doc", "xls", "xlsx", "png", "jpg", "ppt", "pptx"] {
            assert!(registry.supports(ext), "{} should be supported", ext);
        }
        assert!(!registry.supports("odt"));
        assert!(!registry.supports("jpeg"));
        assert_eq!(registry.supported_extensions().len(), 9);
    }

    #[test]
    fn test_registry_routes_by_extension() {
        let registry = ConverterRegistry::with_defaults();
        let pdf = registry.resolve(Path::new("a/report.PDF")).unwrap();
        assert_eq!(pdf.name(), "passthrough");
        let office = registry.resolve(Path::new("slides.pptx")).unwrap();
        assert_eq!(office.name(), "office");
        assert!(registry.get_by_name("OFFICE").is_some());
    }

    #[test]
    fn test_registry_rejects_unknown_and_missing_extension() {
        let registry = ConverterRegistry::with_defaults();
        let dir = std::env::temp_dir();
        assert!(matches!(
            registry.convert(Path::new("notes.txt"), &dir, &ConvertOptions::default()),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(matches!(
            registry.convert(Path::new("Makefile"), &dir, &ConvertOptions::default()),
            Err(Error::UnsupportedFormat(_))
        ));
    }
}
