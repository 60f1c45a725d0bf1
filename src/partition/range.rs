//! Closed, 1-based page ranges.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Range, RangeInclusive};
use std::str::FromStr;

/// A closed interval of pages, `[start, end]`, 1-based and inclusive.
///
/// Deserialized values go through [`PageRange::new`], so every instance
/// satisfies `1 <= start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPageRange")]
pub struct PageRange {
    start: u32,
    end: u32,
}

/// Unchecked wire form of [`PageRange`].
#[derive(Deserialize)]
struct RawPageRange {
    start: u32,
    end: u32,
}

impl TryFrom<RawPageRange> for PageRange {
    type Error = Error;

    fn try_from(raw: RawPageRange) -> Result<Self> {
        Self::new(raw.start, raw.end)
    }
}

impl PageRange {
    /// Create a range, rejecting page 0 and inverted bounds.
    pub fn new(start: u32, end: u32) -> Result<Self> {
        if start == 0 {
            return Err(Error::invalid_argument("page numbers start at 1"));
        }
        if start > end {
            return Err(Error::invalid_argument(format!(
                "range {}-{} ends before it starts",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// A range holding a single page.
    pub fn single(page: u32) -> Result<Self> {
        Self::new(page, page)
    }

    /// Range of `len` pages starting at the 0-based `offset`.
    ///
    /// Callers guarantee `len >= 1`.
    pub(crate) fn from_offset(offset: u32, len: u32) -> Self {
        debug_assert!(len >= 1);
        Self {
            start: offset + 1,
            end: offset + len,
        }
    }

    /// First page (1-based).
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Last page (1-based, inclusive).
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of pages in the range. Never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u32 {
        self.end - self.start + 1
    }

    /// Whether the 1-based page lies in the range.
    pub fn contains(&self, page: u32) -> bool {
        (self.start..=self.end).contains(&page)
    }

    /// The 1-based page numbers in the range.
    pub fn pages(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }

    /// The 0-based indices in the range.
    pub fn indices(&self) -> Range<usize> {
        (self.start as usize - 1)..(self.end as usize)
    }

    /// Check the range against a document of `page_count` pages.
    pub fn check_within(&self, page_count: u32) -> Result<()> {
        if self.end > page_count {
            return Err(Error::invalid_argument(format!(
                "range {} exceeds document of {} pages",
                self, page_count
            )));
        }
        Ok(())
    }

    /// Parse a comma-separated list such as `"1,3-5,9"`.
    ///
    /// Order is kept and overlaps are allowed; the caller decides what
    /// overlapping ranges mean.
    pub fn parse_list(s: &str) -> Result<Vec<Self>> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

impl FromStr for PageRange {
    type Err = Error;

    /// Parse `"7"` or `"2-4"`.
    fn from_str(s: &str) -> Result<Self> {
        let parse_page = |text: &str| -> Result<u32> {
            text.trim()
                .parse()
                .map_err(|_| Error::invalid_argument(format!("invalid page number: {:?}", text)))
        };

        match s.trim().split_once('-') {
            Some((start, end)) => Self::new(parse_page(start)?, parse_page(end)?),
            None => Self::single(parse_page(s)?),
        }
    }
}

impl TryFrom<(u32, u32)> for PageRange {
    type Error = Error;

    fn try_from((start, end): (u32, u32)) -> Result<Self> {
        Self::new(start, end)
    }
}
