//! Line grammars of the supported archive listing styles
//!
//! A grammar describes how a single entry line of a listing is laid out and
//! which captured group holds which field. The patterns are kept identical to
//! what `tar -tv` and `zipinfo` style generators emit:
//!
//! ```text
//! -rw-r--r--  0 user staff     642 Dec 29  2018 my-tar/file.ext
//! drwxr-xr-x  2.0 unx        0 bx stor 20-Jan-13 19:38 my-zip/dir/
//! ```

use crate::date::DateStyle;
use crate::format::ListingStyle;
use lazy_regex::{lazy_regex, Lazy, Regex};

/// permissions, size, date, path; link count, owner and group are skipped
static TAR_LINE: Lazy<Regex> =
    lazy_regex!(r"(.{10}) +\d+ +.+ +.+ +(\d+) +(\w{3} +\d+ +[\d:]+) +(.+)");

/// permissions, size, date, path; version, host and method are skipped
static ZIP_LINE: Lazy<Regex> = lazy_regex!(
    r"(.{10}) +.+ +.+ +(\d+) +.+ +.+ +(\d{2}-\w{3}-\d{2} +\d{2}:\d{2}) +(.+)"
);

static TAR_GRAMMAR: LineGrammar = LineGrammar {
    style: ListingStyle::Tar,
    pattern: &TAR_LINE,
    date_style: DateStyle::Tar,
    excluded_prefixes: &[],
};

static ZIP_GRAMMAR: LineGrammar = LineGrammar {
    style: ListingStyle::Zip,
    pattern: &ZIP_LINE,
    date_style: DateStyle::Zip,
    // resource fork directory added by the macOS archiver
    excluded_prefixes: &["__MACOSX"],
};

/// The raw fields of one matched listing line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineFields<'a> {
    /// Ten character permission string, `d` first for directories
    pub permissions: &'a str,
    /// Size column, digits only
    pub size: &'a str,
    /// Date token, still to be interpreted
    pub date: &'a str,
    /// Path of the entry relative to the archive root
    pub path: &'a str,
}

impl LineFields<'_> {
    /// Whether the permission string marks a directory
    pub fn is_directory(&self) -> bool {
        self.permissions.starts_with('d')
    }
}

/// Declarative description of one listing style
#[derive(Debug)]
pub struct LineGrammar {
    style: ListingStyle,
    pattern: &'static Lazy<Regex>,
    date_style: DateStyle,
    excluded_prefixes: &'static [&'static str],
}

impl LineGrammar {
    /// The grammar of the given listing style
    pub fn for_style(style: ListingStyle) -> &'static LineGrammar {
        match style {
            ListingStyle::Tar => &TAR_GRAMMAR,
            ListingStyle::Zip => &ZIP_GRAMMAR,
        }
    }

    /// The listing style this grammar describes
    pub fn style(&self) -> ListingStyle {
        self.style
    }

    /// How the date column of this style is encoded
    pub fn date_style(&self) -> DateStyle {
        self.date_style
    }

    /// Match a single line. Header, footer and blank lines simply do not
    /// match.
    pub fn match_line<'a>(&self, line: &'a str) -> Option<LineFields<'a>> {
        let captures = self.pattern.captures(line)?;
        Some(LineFields {
            permissions: captures.get(1)?.as_str(),
            size: captures.get(2)?.as_str(),
            date: captures.get(3)?.as_str(),
            path: captures.get(4)?.as_str(),
        })
    }

    /// Whether entries at this path are synthetic and never shown
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix))
    }
}
