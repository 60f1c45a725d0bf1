//! Page partitioning: the arithmetic behind split and drop.
//!
//! Everything here works on page counts and 1-based page numbers only;
//! no document is touched. The [`ops`](crate::ops) module turns the plans
//! into output documents.
//!
//! # Example
//!
//! ```
//! use filekit::partition::{split_by_page_count, split_by_part_count, PageSplitMode, PartSplitMode};
//!
//! let plan = split_by_page_count(10, 3, PageSplitMode::End).unwrap();
//! assert_eq!(plan.lengths(), vec![3, 3, 3, 1]);
//!
//! let plan = split_by_part_count(10, 3, PartSplitMode::Front).unwrap();
//! assert_eq!(plan.lengths(), vec![3, 3, 4]);
//! ```

mod range;

pub use range::PageRange;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Where the short part goes when splitting by page count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSplitMode {
    /// The short part comes first.
    Begin,
    /// The short part comes last.
    #[default]
    End,
}

/// Which parts may come up one page short when splitting by part count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartSplitMode {
    /// Earlier parts may be shorter; the last parts take the extra pages.
    Front,
    /// Later parts may be shorter; the first parts take the extra pages.
    #[default]
    Back,
}

impl FromStr for PageSplitMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "begin" => Ok(PageSplitMode::Begin),
            "end" => Ok(PageSplitMode::End),
            other => Err(Error::invalid_argument(format!(
                "unknown page split mode {:?} (expected \"begin\" or \"end\")",
                other
            ))),
        }
    }
}

impl FromStr for PartSplitMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "front" => Ok(PartSplitMode::Front),
            "back" => Ok(PartSplitMode::Back),
            other => Err(Error::invalid_argument(format!(
                "unknown part split mode {:?} (expected \"front\" or \"back\")",
                other
            ))),
        }
    }
}

/// Ordered, disjoint, contiguous page ranges covering a whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionPlan {
    page_count: u32,
    ranges: Vec<PageRange>,
}

impl PartitionPlan {
    /// Build a plan by handing out consecutive runs of the given lengths.
    ///
    /// Zero lengths are skipped.
    fn from_lengths(lengths: impl IntoIterator<Item = u32>) -> Self {
        let mut offset = 0;
        let mut ranges = Vec::new();
        for len in lengths.into_iter().filter(|&len| len > 0) {
            ranges.push(PageRange::from_offset(offset, len));
            offset += len;
        }
        Self {
            page_count: offset,
            ranges,
        }
    }

    /// The ranges, in output order.
    pub fn ranges(&self) -> &[PageRange] {
        &self.ranges
    }

    /// Page count of every part, in output order.
    pub fn lengths(&self) -> Vec<u32> {
        self.ranges.iter().map(PageRange::len).collect()
    }

    /// Number of parts.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Whether the plan produces no parts.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Total number of pages covered.
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Iterate over the ranges.
    pub fn iter(&self) -> std::slice::Iter<'_, PageRange> {
        self.ranges.iter()
    }
}

impl<'a> IntoIterator for &'a PartitionPlan {
    type Item = &'a PageRange;
    type IntoIter = std::slice::Iter<'a, PageRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

impl fmt::Display for PartitionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.ranges.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Split `page_count` pages into parts of `pages_per_part` pages.
///
/// When the count does not divide evenly one part is short; `mode` says
/// whether it comes first or last. An empty document yields an empty plan.
pub fn split_by_page_count(
    page_count: u32,
    pages_per_part: u32,
    mode: PageSplitMode,
) -> Result<PartitionPlan> {
    if pages_per_part == 0 {
        return Err(Error::invalid_argument("pages_per_part must be positive"));
    }

    let complete = page_count / pages_per_part;
    let remainder = page_count % pages_per_part;
    let full = std::iter::repeat(pages_per_part).take(complete as usize);

    let plan = match mode {
        PageSplitMode::Begin => PartitionPlan::from_lengths(std::iter::once(remainder).chain(full)),
        PageSplitMode::End => PartitionPlan::from_lengths(full.chain(std::iter::once(remainder))),
    };

    log::debug!(
        "split {} pages by {} per part ({:?}): {}",
        page_count,
        pages_per_part,
        mode,
        plan
    );
    Ok(plan)
}

/// Split `page_count` pages into `parts` parts of near-equal size.
///
/// With fewer pages than parts every page becomes its own part, so the
/// plan holds `page_count` parts rather than `parts`.
pub fn split_by_part_count(page_count: u32, parts: u32, mode: PartSplitMode) -> Result<PartitionPlan> {
    if parts == 0 {
        return Err(Error::invalid_argument("parts must be positive"));
    }

    let avg = page_count / parts;
    if avg == 0 {
        log::debug!(
            "{} pages cannot fill {} parts; emitting one part per page",
            page_count,
            parts
        );
        return Ok(PartitionPlan::from_lengths(
            std::iter::repeat(1).take(page_count as usize),
        ));
    }

    let rem = page_count % parts;
    let lengths = (0..parts).map(|idx| {
        let extra = match mode {
            PartSplitMode::Back => idx < rem,
            PartSplitMode::Front => idx >= parts - rem,
        };
        avg + u32::from(extra)
    });

    let plan = PartitionPlan::from_lengths(lengths);
    log::debug!(
        "split {} pages into {} parts ({:?}): {}",
        page_count,
        parts,
        mode,
        plan
    );
    Ok(plan)
}

/// Pages that survive removing `ranges` from a document of `page_count` pages.
///
/// Returns 1-based page numbers in document order. Overlapping ranges are
/// fine; a range reaching past the last page is rejected.
pub fn drop_pages(page_count: u32, ranges: &[PageRange]) -> Result<Vec<u32>> {
    for range in ranges {
        range.check_within(page_count)?;
    }

    let dropped: BTreeSet<u32> = ranges.iter().flat_map(PageRange::pages).collect();
    let kept: Vec<u32> = (1..=page_count)
        .filter(|page| !dropped.contains(page))
        .collect();

    log::debug!(
        "dropping {} of {} pages, {} remain",
        dropped.len(),
        page_count,
        kept.len()
    );
    Ok(kept)
}
