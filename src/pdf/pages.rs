//! One-based page range specifications such as `"1-5,7,9-10"`.

use std::ops::RangeInclusive;

use crate::error::{Error, Result};

/// A set of one-based page numbers, stored as sorted, disjoint ranges.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageRanges {
    ranges: Vec<RangeInclusive<u32>>,
}

impl PageRanges {
    /// Parse a page range specification (e.g., "1-5,7,9-10").
    ///
    /// Duplicates collapse; a reversed range (`"5-3"`) or page `0` is an error.
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(Error::InvalidPageRange("empty page range".to_string()));
        }

        let invalid = |part: &str| Error::InvalidPageRange(format!("'{}' in '{}'", part, spec));
        let number = |s: &str, part: &str| -> Result<u32> {
            match s.trim().parse::<u32>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(invalid(part)),
            }
        };

        let mut ranges = Vec::new();
        for part in spec.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let start = number(start, part)?;
                let end = number(end, part)?;
                if start > end {
                    return Err(invalid(part));
                }
                ranges.push(start..=end);
            } else {
                let page = number(part, part)?;
                ranges.push(page..=page);
            }
        }

        ranges.sort_by_key(|r| *r.start());
        let mut merged: Vec<RangeInclusive<u32>> = Vec::with_capacity(ranges.len());
        for range in ranges {
            match merged.last_mut() {
                Some(last) if *range.start() <= last.end().saturating_add(1) => {
                    if range.end() > last.end() {
                        *last = *last.start()..=*range.end();
                    }
                }
                _ => merged.push(range),
            }
        }

        Ok(Self { ranges: merged })
    }

    /// Check if a one-based page number is selected.
    pub fn includes(&self, page: u32) -> bool {
        self.ranges.iter().any(|r| r.contains(&page))
    }

    /// Selected pages that exist in a document with `page_count` pages.
    pub fn within(&self, page_count: u32) -> Vec<u32> {
        self.ranges
            .iter()
            .filter(|r| *r.start() <= page_count)
            .flat_map(|r| *r.start()..=(*r.end()).min(page_count))
            .collect()
    }

    /// Number of selected pages.
    pub fn len(&self) -> u64 {
        self.ranges
            .iter()
            .map(|r| u64::from(*r.end()) - u64::from(*r.start()) + 1)
            .sum()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
