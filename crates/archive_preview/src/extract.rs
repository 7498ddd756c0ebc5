//! Extraction of archive entries from listing text

use crate::{
    date::DateInterpreter,
    error::Result,
    format::ListingStyle,
    grammar::LineGrammar,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::BufRead;

/// One file or directory record taken from a listing line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveEntry {
    /// Slash separated path relative to the archive root
    pub path: String,
    /// Whether the entry is a directory
    pub is_directory: bool,
    /// Size in bytes as reported by the listing
    pub size_bytes: Option<u64>,
    /// Modification time, `None` when the listing date could not be read
    pub modified_at: Option<DateTime<Utc>>,
}

/// Turns listing lines into [`ArchiveEntry`] values using the grammar of one
/// listing style.
#[derive(Debug, Clone, Copy)]
pub struct EntryExtractor {
    grammar: &'static LineGrammar,
    dates: DateInterpreter,
}

impl EntryExtractor {
    /// Create an extractor for the given listing style
    pub fn new(style: ListingStyle, dates: DateInterpreter) -> Self {
        Self {
            grammar: LineGrammar::for_style(style),
            dates,
        }
    }

    /// The grammar lines are matched against
    pub fn grammar(&self) -> &'static LineGrammar {
        self.grammar
    }

    /// Parse a single line. Returns `None` for lines that are not entries and
    /// for entries that are never shown.
    pub fn parse_line(&self, line: &str) -> Option<ArchiveEntry> {
        let Some(fields) = self.grammar.match_line(line) else {
            tracing::trace!("skipping listing line {line:?}");
            return None;
        };

        let path = fields.path.trim_end_matches(['\r', '\n']);
        if path.trim().is_empty() {
            return None;
        }
        if self.grammar.is_excluded(path) {
            tracing::trace!("excluding synthetic entry {path}");
            return None;
        }

        Some(ArchiveEntry {
            path: path.to_string(),
            is_directory: fields.is_directory() || path.ends_with('/'),
            size_bytes: Some(fields.size.parse().unwrap_or(0)),
            modified_at: self.dates.interpret(fields.date, self.grammar.date_style()),
        })
    }

    /// Lazily extract the entries of a listing, in listing order
    pub fn entries<'a>(&'a self, listing: &'a str) -> impl Iterator<Item = ArchiveEntry> + 'a {
        listing.lines().filter_map(move |line| self.parse_line(line))
    }

    /// Extract all entries of a listing
    pub fn extract(&self, listing: &str) -> Vec<ArchiveEntry> {
        self.entries(listing).collect()
    }

    /// Extract entries from a line oriented reader. Failing to read is an
    /// error, lines that do not parse are not.
    pub fn read_entries<R: BufRead>(&self, reader: R) -> Result<Vec<ArchiveEntry>> {
        let mut entries = Vec::new();
        for line in reader.lines() {
            if let Some(entry) = self.parse_line(&line?) {
                entries.push(entry);
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PreviewError;
    use assert_matches::assert_matches;
    use chrono::{FixedOffset, TimeZone};
    use rstest::rstest;
    use std::io::{self, Read};

    fn extractor(style: ListingStyle) -> EntryExtractor {
        let reference = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();
        EntryExtractor::new(style, DateInterpreter::new(utc, reference))
    }

    #[rstest]
    #[case("drwxr-xr-x 0 user staff 0 Dec 29  2018 a/b", true)]
    #[case("dr-x------ 0 user staff 0 Dec 29  2018 a/b", true)]
    #[case("-rw-r--r-- 0 user staff 0 Dec 29  2018 a/b", false)]
    #[case("lrwxrwxrwx 0 user staff 0 Dec 29  2018 a/b", false)]
    fn test_directory_flag_follows_permissions(#[case] line: &str, #[case] is_directory: bool) {
        let entry = extractor(ListingStyle::Tar).parse_line(line).unwrap();
        assert_eq!(entry.is_directory, is_directory);
    }

    #[test]
    fn test_trailing_slash_implies_directory() {
        let entry = extractor(ListingStyle::Tar)
            .parse_line("-rw-r--r-- 0 user staff 0 Dec 29  2018 odd/")
            .unwrap();
        assert!(entry.is_directory);
    }

    #[test]
    fn test_tar_listing() {
        let listing = "\
drwxr-xr-x 0 user staff 0 Dec 29  2018 my-archive/
garbage that is not an entry

-rw-r--r-- 0 user staff 642 Mar 28 15:36 my-archive/file.ext
";
        let entries = extractor(ListingStyle::Tar).extract(listing);
        assert_eq!(
            entries,
            vec![
                ArchiveEntry {
                    path: "my-archive/".to_string(),
                    is_directory: true,
                    size_bytes: Some(0),
                    modified_at: Some(Utc.with_ymd_and_hms(2018, 12, 29, 0, 0, 0).unwrap()),
                },
                ArchiveEntry {
                    path: "my-archive/file.ext".to_string(),
                    is_directory: false,
                    size_bytes: Some(642),
                    modified_at: Some(Utc.with_ymd_and_hms(2024, 3, 28, 15, 36, 0).unwrap()),
                },
            ]
        );
    }

    #[test]
    fn test_zip_listing_skips_macosx_entries() {
        let listing = "\
Archive: archive.zip
Zip file size: 0 bytes, number of entries: 0
drwxr-xr-x 2.0 unx 0 bx stor 20-Jan-13 19:38 my-zip/
-rw-r--r-- 2.0 unx 1024 bx stor 20-Jan-13 19:38 my-zip/file.txt
drwxr-xr-x 2.0 unx 0 bx stor 20-Jan-13 19:38 __MACOSX/
-rw-r--r-- 2.0 unx 120 bx stor 20-Jan-13 19:38 __MACOSX/file.txt
2 files, 1144 bytes uncompressed, 900 bytes compressed:  21.3%";
        let entries = extractor(ListingStyle::Zip).extract(listing);
        let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["my-zip/", "my-zip/file.txt"]);
        assert_eq!(entries[1].size_bytes, Some(1024));
        assert_eq!(
            entries[1].modified_at,
            Some(Utc.with_ymd_and_hms(2020, 1, 13, 19, 38, 0).unwrap())
        );
    }

    #[test]
    fn test_macosx_line_yields_nothing() {
        let entry = extractor(ListingStyle::Zip)
            .parse_line("-rw-r--r-- 2.0 unx 120 bx stor 20-Jan-13 19:38 __MACOSX/file.txt");
        assert_eq!(entry, None);
    }

    #[test]
    fn test_unparseable_date_keeps_entry() {
        let entry = extractor(ListingStyle::Tar)
            .parse_line("-rw-r--r-- 0 user staff 5 Xyz 29 2018 file.txt")
            .unwrap();
        assert_eq!(entry.path, "file.txt");
        assert_eq!(entry.modified_at, None);
    }

    #[test]
    fn test_oversized_size_defaults_to_zero() {
        let entry = extractor(ListingStyle::Tar)
            .parse_line("-rw-r--r-- 0 user staff 99999999999999999999999 Dec 29 2018 big.bin")
            .unwrap();
        assert_eq!(entry.size_bytes, Some(0));
    }

    #[test]
    fn test_crlf_listing() {
        let listing = "-rw-r--r-- 0 user staff 3 Dec 29 2018 a.txt\r\n-rw-r--r-- 0 user staff 4 Dec 29 2018 b.txt\r\n";
        let entries = extractor(ListingStyle::Tar).extract(listing);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, "a.txt");
        assert_eq!(entries[1].path, "b.txt");
    }

    #[test]
    fn test_read_entries() {
        let listing = "x\n-rw-r--r-- 0 user staff 3 Dec 29 2018 a.txt\n";
        let entries = extractor(ListingStyle::Tar)
            .read_entries(listing.as_bytes())
            .unwrap();
        assert_eq!(entries.len(), 1);
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("archive reader went away"))
        }
    }

    #[test]
    fn test_read_entries_propagates_read_failures() {
        let result = extractor(ListingStyle::Tar).read_entries(io::BufReader::new(FailingReader));
        assert_matches!(result, Err(PreviewError::Io(_)));
    }
}
