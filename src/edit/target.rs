//! Page targets for edits: a single zero-based page or every page.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Which pages an edit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTarget {
    /// A single zero-based page index.
    Index(u32),
    /// Every page, visited in ascending order.
    All,
}

impl PageTarget {
    /// Parse a page specifier: a non-negative integer or `all` (any case).
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        if spec.eq_ignore_ascii_case("all") {
            return Ok(PageTarget::All);
        }
        spec.parse::<u32>()
            .map(PageTarget::Index)
            .map_err(|_| Error::InvalidPageSpec(spec.to_string()))
    }

    /// Resolve to concrete zero-based indices for a document with
    /// `page_count` pages. An index past the end is an error.
    pub fn resolve(&self, page_count: u32) -> Result<Vec<u32>> {
        match *self {
            PageTarget::All => Ok((0..page_count).collect()),
            PageTarget::Index(i) if i < page_count => Ok(vec![i]),
            PageTarget::Index(i) => Err(Error::PageOutOfRange(i, page_count)),
        }
    }
}

impl FromStr for PageTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageTarget::Index(i) => write!(f, "{}", i),
            PageTarget::All => f.write_str("all"),
        }
    }
}
