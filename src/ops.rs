//! PDF page operations: count, merge, split and drop.
//!
//! The public functions take any [`Source`] and return serialized PDF
//! bytes. Each one is a thin wrapper around a generic function over
//! [`PdfBackend`], which is where the work happens.

use rayon::prelude::*;

use crate::backend::{LopdfBackend, PdfBackend, Selection};
use crate::error::Result;
use crate::partition::{self, PageRange, PageSplitMode, PartSplitMode, PartitionPlan};
use crate::source::Source;

/// Options for materializing split parts.
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Serialize parts on the rayon thread pool
    pub parallel: bool,
}

impl SplitOptions {
    /// Create new split options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable parallel serialization.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel serialization.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Number of pages in a PDF.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
///
/// let pages = filekit::ops::page_count(Path::new("report.pdf"))?;
/// println!("{} pages", pages);
/// # Ok::<(), filekit::Error>(())
/// ```
pub fn page_count<'a>(source: impl Into<Source<'a>>) -> Result<u32> {
    Ok(LopdfBackend::load(source.into())?.page_count())
}

/// Concatenate PDFs, document by document, page by page.
pub fn merge<'a, I, S>(sources: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = S>,
    S: Into<Source<'a>>,
{
    let documents = sources
        .into_iter()
        .map(|source| LopdfBackend::load(source.into()))
        .collect::<Result<Vec<_>>>()?;
    merge_documents(&documents)?.into_bytes()
}

/// Split a PDF into parts of `pages_per_part` pages.
///
/// See [`partition::split_by_page_count`] for where the short part goes.
pub fn split_by_page<'a>(
    source: impl Into<Source<'a>>,
    pages_per_part: u32,
    mode: PageSplitMode,
) -> Result<Vec<Vec<u8>>> {
    split_by_page_with_options(source, pages_per_part, mode, &SplitOptions::default())
}

/// Split a PDF into parts of `pages_per_part` pages with custom options.
pub fn split_by_page_with_options<'a>(
    source: impl Into<Source<'a>>,
    pages_per_part: u32,
    mode: PageSplitMode,
    options: &SplitOptions,
) -> Result<Vec<Vec<u8>>> {
    let doc = LopdfBackend::load(source.into())?;
    let plan = partition::split_by_page_count(doc.page_count(), pages_per_part, mode)?;
    split_document(&doc, &plan, options)
}

/// Split a PDF into `parts` parts of near-equal size.
///
/// See [`partition::split_by_part_count`] for the rules, including the
/// one-page-per-part case when the document is shorter than `parts`.
pub fn split_by_part<'a>(
    source: impl Into<Source<'a>>,
    parts: u32,
    mode: PartSplitMode,
) -> Result<Vec<Vec<u8>>> {
    split_by_part_with_options(source, parts, mode, &SplitOptions::default())
}

/// Split a PDF into `parts` parts with custom options.
pub fn split_by_part_with_options<'a>(
    source: impl Into<Source<'a>>,
    parts: u32,
    mode: PartSplitMode,
    options: &SplitOptions,
) -> Result<Vec<Vec<u8>>> {
    let doc = LopdfBackend::load(source.into())?;
    let plan = partition::split_by_part_count(doc.page_count(), parts, mode)?;
    split_document(&doc, &plan, options)
}

/// Remove the pages covered by `ranges` from a PDF.
///
/// # Example
///
/// ```no_run
/// use filekit::PageRange;
/// use std::path::Path;
///
/// let ranges = PageRange::parse_list("2-4,4-6")?;
/// let trimmed = filekit::ops::drop_pages(Path::new("scan.pdf"), &ranges)?;
/// std::fs::write("trimmed.pdf", trimmed)?;
/// # Ok::<(), filekit::Error>(())
/// ```
pub fn drop_pages<'a>(source: impl Into<Source<'a>>, ranges: &[PageRange]) -> Result<Vec<u8>> {
    let doc = LopdfBackend::load(source.into())?;
    drop_from_document(&doc, ranges)?.into_bytes()
}

/// Concatenate loaded documents.
pub fn merge_documents<B: PdfBackend>(documents: &[B]) -> Result<B> {
    let selections: Vec<_> = documents.iter().map(Selection::all).collect();
    log::debug!("merging {} documents", documents.len());
    B::assemble(&selections)
}

/// Build one document per range of the plan.
pub fn extract_parts<B: PdfBackend>(
    document: &B,
    plan: &PartitionPlan,
    options: &SplitOptions,
) -> Result<Vec<B>> {
    let extract = |range: &PageRange| B::assemble(&[Selection::new(document, range.pages())]);

    if options.parallel {
        plan.ranges().par_iter().map(extract).collect()
    } else {
        plan.ranges().iter().map(extract).collect()
    }
}

/// Build and serialize one document per range of the plan.
///
/// Output order matches plan order. Any failure aborts the whole split.
pub fn split_document<B: PdfBackend>(
    document: &B,
    plan: &PartitionPlan,
    options: &SplitOptions,
) -> Result<Vec<Vec<u8>>> {
    let materialize = |range: &PageRange| -> Result<Vec<u8>> {
        B::assemble(&[Selection::new(document, range.pages())])?.into_bytes()
    };

    log::debug!("materializing {} parts", plan.len());
    if options.parallel {
        plan.ranges().par_iter().map(materialize).collect()
    } else {
        plan.ranges().iter().map(materialize).collect()
    }
}

/// Keep only the pages of `document` not covered by `ranges`.
pub fn drop_from_document<B: PdfBackend>(document: &B, ranges: &[PageRange]) -> Result<B> {
    let kept = partition::drop_pages(document.page_count(), ranges)?;
    B::assemble(&[Selection::new(document, kept)])
}
