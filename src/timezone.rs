//! Local time for the timezone the server was configured with.

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

/// The UTC offset currently in effect for `canonical_timezone`, e.g. "Pacific/Auckland".
///
/// Returns `None` if the name is not a known IANA timezone.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    let timezone = time_tz::timezones::get_by_name(canonical_timezone)?;

    Some(timezone.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// The current time in `canonical_timezone`.
pub fn local_now(canonical_timezone: &str) -> Option<OffsetDateTime> {
    get_local_offset(canonical_timezone).map(|offset| OffsetDateTime::now_utc().to_offset(offset))
}
