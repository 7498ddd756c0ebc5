//! Aggregate size and compression statistics of an archive
//!
//! A summary is either aggregated from the extracted entries or read from the
//! trailing summary line some listing generators print:
//!
//! ```text
//!  compressed uncompressed ratio uncompressed_name
//!  65061 192919 66.3% archive.tar
//! 152 files, 192919 bytes uncompressed, 65061 bytes compressed:  66.3%
//! ```

use crate::extract::ArchiveEntry;
use lazy_regex::{lazy_regex, Lazy, Regex};
use serde::Serialize;

/// Line printed instead of a summary for a zip archive without entries
pub const EMPTY_ZIP_SENTINEL: &str = "Empty zipfile.";

/// uncompressed size, ratio
static TAR_SUMMARY: Lazy<Regex> = lazy_regex!(r" +\d+ +(\d+) +([\d.]+)% +.+");

/// entry count, uncompressed size, compressed size, ratio
static ZIP_SUMMARY: Lazy<Regex> = lazy_regex!(
    r"(\d+) files?, (\d+) bytes? uncompressed, (\d+) bytes? compressed: +([\d.]+)%"
);

/// Percentage by which compression shrank the data.
///
/// An empty archive has a ratio of `0.0` rather than an undefined one.
pub fn compression_ratio(compressed_bytes: u64, uncompressed_bytes: u64) -> f64 {
    if uncompressed_bytes == 0 {
        return 0.0;
    }
    100.0 - (compressed_bytes as f64 / uncompressed_bytes as f64) * 100.0
}

/// Size statistics of one archive
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ArchiveSummary {
    pub entry_count: u64,
    pub compressed_bytes: u64,
    pub uncompressed_bytes: u64,
    /// `None` when the ratio is unknown
    pub compression_ratio_percent: Option<f64>,
}

impl ArchiveSummary {
    /// The summary of an archive without entries
    pub fn empty() -> Self {
        Self::default()
    }

    /// Aggregate extracted entries. The listing does not tell how large each
    /// entry is once compressed, so the compressed size of the whole archive
    /// is passed in.
    pub fn from_entries<'a, I>(entries: I, compressed_bytes: u64) -> Self
    where
        I: IntoIterator<Item = &'a ArchiveEntry>,
    {
        let mut totals = EntryTotals::default();
        for entry in entries {
            totals.add(entry);
        }
        totals.into_summary(Some(compressed_bytes))
    }

    /// Read the trailing summary of a zip listing.
    ///
    /// The last line that is either a summary or the empty archive sentinel
    /// wins. Returns `None` if the listing has neither.
    pub fn parse_zip_summary(listing: &str) -> Option<Self> {
        listing.lines().rev().find_map(|line| {
            if line.trim() == EMPTY_ZIP_SENTINEL {
                return Some(Self::empty());
            }
            let captures = ZIP_SUMMARY.captures(line)?;
            Some(Self {
                entry_count: captures[1].parse().ok()?,
                uncompressed_bytes: captures[2].parse().ok()?,
                compressed_bytes: captures[3].parse().ok()?,
                compression_ratio_percent: captures[4].parse().ok(),
            })
        })
    }
}

/// The figures of a gzip style summary line following a tar listing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TarSummaryLine {
    pub uncompressed_bytes: u64,
    pub compression_ratio_percent: Option<f64>,
}

impl TarSummaryLine {
    /// Find the last summary line of a tar listing
    pub fn parse(listing: &str) -> Option<Self> {
        listing.lines().rev().find_map(|line| {
            let captures = TAR_SUMMARY.captures(line)?;
            Some(Self {
                uncompressed_bytes: captures[1].parse().ok()?,
                compression_ratio_percent: captures[2].parse().ok(),
            })
        })
    }

    /// Override the uncompressed figures of an aggregated summary
    pub fn apply(&self, summary: &mut ArchiveSummary) {
        summary.uncompressed_bytes = self.uncompressed_bytes;
        summary.compression_ratio_percent = self.compression_ratio_percent;
    }
}

/// Running totals over entries, for building a summary while the entries are
/// streamed into a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryTotals {
    pub entry_count: u64,
    pub uncompressed_bytes: u64,
}

impl EntryTotals {
    pub fn add(&mut self, entry: &ArchiveEntry) {
        self.entry_count += 1;
        self.uncompressed_bytes = self
            .uncompressed_bytes
            .saturating_add(entry.size_bytes.unwrap_or(0));
    }

    /// Finish the summary given the compressed size of the archive. Without
    /// one the ratio stays unknown.
    pub fn into_summary(self, compressed_bytes: Option<u64>) -> ArchiveSummary {
        ArchiveSummary {
            entry_count: self.entry_count,
            compressed_bytes: compressed_bytes.unwrap_or(0),
            uncompressed_bytes: self.uncompressed_bytes,
            compression_ratio_percent: compressed_bytes
                .map(|compressed| compression_ratio(compressed, self.uncompressed_bytes)),
        }
    }
}
