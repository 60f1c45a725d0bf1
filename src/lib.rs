//! # filekit
//!
//! PDF page partitioning and small file utilities for Rust.
//!
//! The heart of the crate is the page partitioner: given a page count and a
//! divisor it produces an ordered plan of page ranges, which the PDF
//! operations then materialize as independent documents.
//!
//! ## Quick Start
//!
//! ```no_run
//! use filekit::{split_by_page, PageSplitMode};
//! use std::path::Path;
//!
//! fn main() -> filekit::Result<()> {
//!     // Split a report into chunks of ten pages, short chunk last
//!     let parts = split_by_page(Path::new("report.pdf"), 10, PageSplitMode::End)?;
//!     for (i, part) in parts.iter().enumerate() {
//!         std::fs::write(format!("report-{}.pdf", i + 1), part)?;
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Splitting**: by pages per part or by number of parts, with a
//!   choice of where the uneven part goes
//! - **Merging** and **page-range removal**
//! - **Office conversion**: docx, xlsx, pptx and images to PDF through a
//!   headless office suite, optionally async (`async` feature)
//! - **Zip helpers** for single-file archives held in memory
//! - **Guarded deletion** that refuses roots and protected directories
//! - **Parallel processing**: split parts are built on the rayon pool

pub mod archive;
pub mod backend;
pub mod convert;
pub mod detect;
pub mod error;
pub mod ops;
pub mod partition;
pub mod remove;
pub mod source;

// Re-export commonly used types
pub use archive::{unzip_one_file, zip_one_file};
pub use backend::{LopdfBackend, PdfBackend, Selection};
pub use convert::{convert_to_pdf, ConvertOptions, ConverterRegistry, DocumentConverter};
pub use detect::{pdf_version, FileKind};
pub use error::{Error, Result};
pub use ops::{
    drop_pages, merge, page_count, split_by_page, split_by_page_with_options, split_by_part,
    split_by_part_with_options, SplitOptions,
};
pub use partition::{PageRange, PageSplitMode, PartSplitMode, PartitionPlan};
pub use remove::{remove_paths, DeletePolicy, RemovalReport};
pub use source::Source;

#[cfg(feature = "async")]
pub use convert::convert_to_pdf_async;

/// Compute the split-by-page plan for a PDF without writing anything.
///
/// # Example
///
/// ```no_run
/// use filekit::{plan_split_by_page, PageSplitMode};
/// use std::path::Path;
///
/// let plan = plan_split_by_page(Path::new("report.pdf"), 3, PageSplitMode::Begin)?;
/// println!("{}", plan); // e.g. [1, 2-4, 5-7, 8-10]
/// # Ok::<(), filekit::Error>(())
/// ```
pub fn plan_split_by_page<'a>(
    source: impl Into<Source<'a>>,
    pages_per_part: u32,
    mode: PageSplitMode,
) -> Result<PartitionPlan> {
    partition::split_by_page_count(page_count(source)?, pages_per_part, mode)
}

/// Compute the split-by-part plan for a PDF without writing anything.
pub fn plan_split_by_part<'a>(
    source: impl Into<Source<'a>>,
    parts: u32,
    mode: PartSplitMode,
) -> Result<PartitionPlan> {
    partition::split_by_part_count(page_count(source)?, parts, mode)
}
