use crate::errors::{AppError, AppResult};
use chrono::{
    Datelike, Duration, FixedOffset, Local, LocalResult, NaiveDateTime, Offset, TimeZone, Utc,
};
use std::time::SystemTime;

/// Format of a hub timestamp once a year has been prepended.
const HUB_DATE_FORMAT: &str = "%Y %m/%d %H:%M";

/// Resolves a year-less hub timestamp (`MM/DD HH:MM`) to a full local date/time.
///
/// The hub reports backup creation times without a year. Backups always lie in
/// the past, so the partial date is tried in `now`'s year first and used if it is
/// strictly earlier than `now`; otherwise the previous year is used. A candidate
/// equal to `now` counts as not in the past.
///
/// # Errors
///
/// Returns `ParseError` if `partial` does not have the `MM/DD HH:MM` shape, or
/// names a day that exists in neither candidate year.
pub fn resolve_backup_time(partial: &str, now: NaiveDateTime) -> AppResult<NaiveDateTime> {
    let year = now.year();
    match parse_in_year(partial, year) {
        Ok(this_year) if this_year < now => Ok(this_year),
        Ok(_) => parse_in_year(partial, year - 1),
        // Feb 29 only exists in leap years
        Err(err) => parse_in_year(partial, year - 1).map_err(|_| err),
    }
}

fn parse_in_year(partial: &str, year: i32) -> AppResult<NaiveDateTime> {
    let candidate = format!("{year} {}", partial.trim());
    NaiveDateTime::parse_from_str(&candidate, HUB_DATE_FORMAT).map_err(|e| {
        AppError::ParseError(format!(
            "Invalid backup timestamp '{partial}' (expected MM/DD HH:MM): {e}"
        ))
    })
}

/// Converts a resolved local date/time into a filesystem timestamp.
///
/// Ambiguous local times (DST fall-back) take the earlier instant. Local times
/// skipped by a DST jump are read with the offset in force before the jump.
pub fn to_system_time(local: NaiveDateTime) -> SystemTime {
    match Local.from_local_datetime(&local) {
        LocalResult::Single(dt) => SystemTime::from(dt),
        LocalResult::Ambiguous(earliest, _) => SystemTime::from(earliest),
        LocalResult::None => {
            // A day earlier is outside any DST transition window
            let offset = match Local.offset_from_local_datetime(&(local - Duration::days(1))) {
                LocalResult::Single(offset) | LocalResult::Ambiguous(offset, _) => offset,
                LocalResult::None => Utc.fix(),
            };
            with_offset(local, offset)
        }
    }
}

fn with_offset(local: NaiveDateTime, offset: FixedOffset) -> SystemTime {
    let utc = local - Duration::seconds(i64::from(offset.local_minus_utc()));
    SystemTime::from(Utc.from_utc_datetime(&utc))
}
