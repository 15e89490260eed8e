//! Recency filter for new releases

use crate::models::Album;
use chrono::{Duration, NaiveDate};

/// Trailing window defining "recent" (three months)
pub const DEFAULT_RECENCY_WINDOW_DAYS: i64 = 90;

/// True iff the album was released on or after `as_of - window_days`
///
/// The boundary day is inclusive. Releases dated after `as_of` count as recent.
/// A window reaching past the earliest representable date covers all history.
pub fn is_recent(album: &Album, as_of: NaiveDate, window_days: i64) -> bool {
    match Duration::try_days(window_days).and_then(|window| as_of.checked_sub_signed(window)) {
        Some(cutoff) => album.release_date >= cutoff,
        None => true,
    }
}
