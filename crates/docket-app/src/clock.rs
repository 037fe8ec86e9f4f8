use time::{Date, OffsetDateTime};
use tracing::warn;

/// Today's date in the local time zone.
///
/// Falls back to UTC when the local offset cannot be determined.
#[must_use]
pub fn local_today() -> Date {
    match OffsetDateTime::now_local() {
        Ok(now) => now.date(),
        Err(err) => {
            warn!("local time offset unavailable ({err}); using UTC");
            OffsetDateTime::now_utc().date()
        }
    }
}
