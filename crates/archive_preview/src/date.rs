//! Interpretation of the modification dates found in archive listings
//!
//! Listing generators write dates in a fixed English locale and in one of a
//! handful of abbreviated forms:
//!
//! - `Mar 28 15:36` for entries modified in the current year (no year given)
//! - `Dec 29  2018` for entries modified in an earlier year (no time given)
//! - `20-Jan-13 19:38` in zip listings (two digit year first)
//!
//! Two digit years `69` to `99` are read as 19xx and `00` to `68` as 20xx,
//! so zip dates from 2069 onwards cannot round trip.
//!
//! None of these carry a time zone, so the [`DateInterpreter`] is configured
//! with one explicitly and always hands back UTC timestamps.

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc,
};

/// `chrono` format of a tar listing date in the current year.
const CURRENT_YEAR_FORMAT: &str = "%b %d %H:%M";

/// `chrono` format of a tar listing date in any other year.
const EXPLICIT_YEAR_FORMAT: &str = "%b %d  %Y";

/// `chrono` format of a zip listing date.
const ZIP_FORMAT: &str = "%y-%b-%d %H:%M";

/// Which family of date tokens a listing uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateStyle {
    /// Either `Mon dd HH:MM` or `Mon dd YYYY`, told apart by the colon
    Tar,
    /// `yy-Mon-dd HH:MM`
    Zip,
}

/// Parses and renders listing dates relative to a time zone and a reference
/// instant that defines the "current year".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateInterpreter {
    time_zone: FixedOffset,
    reference: DateTime<Utc>,
}

impl Default for DateInterpreter {
    fn default() -> Self {
        Self::utc()
    }
}

impl DateInterpreter {
    /// Create an interpreter for the given zone and reference instant
    pub fn new(time_zone: FixedOffset, reference: DateTime<Utc>) -> Self {
        Self {
            time_zone,
            reference,
        }
    }

    /// Interpreter working in UTC with the current time as reference
    pub fn utc() -> Self {
        Self::new(utc_offset(), Utc::now())
    }

    /// The zone listing dates are assumed to be written in
    pub fn time_zone(&self) -> FixedOffset {
        self.time_zone
    }

    /// The instant that decides which year is the current one
    pub fn reference(&self) -> DateTime<Utc> {
        self.reference
    }

    /// The year implied by dates that do not name one
    pub fn current_year(&self) -> i32 {
        self.reference.with_timezone(&self.time_zone).year()
    }

    /// Parse a date token. Anything that cannot be parsed yields `None`,
    /// which callers must treat as "unknown".
    pub fn interpret(&self, token: &str, style: DateStyle) -> Option<DateTime<Utc>> {
        let token = normalize_whitespace(token);
        let naive = match style {
            DateStyle::Tar if token.contains(':') => NaiveDateTime::parse_from_str(
                &format!("{} {token}", self.current_year()),
                "%Y %b %d %H:%M",
            )
            .ok()?,
            DateStyle::Tar => NaiveDate::parse_from_str(&token, "%b %d %Y")
                .ok()?
                .and_hms_opt(0, 0, 0)?,
            DateStyle::Zip => NaiveDateTime::parse_from_str(&token, ZIP_FORMAT).ok()?,
        };
        self.localize(&naive)
    }

    /// Attach the configured zone to a wall clock time and convert to UTC.
    pub fn localize(&self, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
        self.time_zone
            .from_local_datetime(naive)
            .single()
            .map(|local| local.with_timezone(&Utc))
    }

    /// Render a timestamp the way the given listing style writes it.
    pub fn render(&self, timestamp: DateTime<Utc>, style: DateStyle) -> String {
        let local = timestamp.with_timezone(&self.time_zone);
        let format = match style {
            DateStyle::Tar if local.year() == self.current_year() => CURRENT_YEAR_FORMAT,
            DateStyle::Tar => EXPLICIT_YEAR_FORMAT,
            DateStyle::Zip => ZIP_FORMAT,
        };
        local.format(format).to_string()
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

/// Collapse runs of whitespace, listings pad day numbers and years.
fn normalize_whitespace(token: &str) -> String {
    token.split_whitespace().collect::<Vec<_>>().join(" ")
}
