//! Conversion between epoch seconds and the editor's wall-clock display string
//!
//! The display form is `YYYY-MM-DDTHH:MM` in the viewer's timezone. Rendering
//! truncates to the minute, so a round trip loses up to 59 seconds.

use chrono::{DateTime, Local, LocalResult, NaiveDateTime, TimeZone};

use crate::error::{Error, Result};

/// Format of the display string.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Accepted input formats, tried in order.
const INPUT_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Render epoch seconds as a display string in `tz`.
///
/// `None` and `0` render as an empty string, as does a timestamp chrono cannot
/// represent.
pub fn epoch_to_display_in<Tz: TimeZone>(epoch: Option<i64>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let Some(secs) = epoch.filter(|secs| *secs != 0) else {
        return String::new();
    };
    match DateTime::from_timestamp(secs, 0) {
        Some(utc) => utc.with_timezone(tz).format(DISPLAY_FORMAT).to_string(),
        None => String::new(),
    }
}

/// Parse a display string, interpreted as wall-clock time in `tz`, into epoch
/// seconds.
///
/// When a local time is ambiguous (DST fall-back) the earlier instant wins.
/// Local times skipped by a DST jump are rejected.
pub fn display_to_epoch_in<Tz: TimeZone>(input: &str, tz: &Tz) -> Result<i64> {
    let trimmed = input.trim();
    let naive = INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| Error::invalid_timestamp(trimmed, "expected YYYY-MM-DDTHH:MM"))?;

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.timestamp()),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.timestamp()),
        LocalResult::None => Err(Error::invalid_timestamp(
            trimmed,
            "time does not exist in the local timezone",
        )),
    }
}

/// [`epoch_to_display_in`] for the viewer's local timezone.
pub fn epoch_to_local_display(epoch: Option<i64>) -> String {
    epoch_to_display_in(epoch, &Local)
}

/// [`display_to_epoch_in`] for the viewer's local timezone.
pub fn local_display_to_epoch(input: &str) -> Result<i64> {
    display_to_epoch_in(input, &Local)
}
