//! Helpers for getting back to the vehicle.
//!
//! Builds the directions link for a stored location and renders the
//! human-readable forms of a session's coordinates and timestamp.

use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};

use crate::session::Coordinates;

/// Display format for the time a session was recorded.
pub const RECORDED_AT_FORMAT: &str = "%d %b %Y, %I:%M %p";

/// Build a directions URL to `coordinates`.
///
/// `base` is a directions endpoint such as
/// `https://www.google.com/maps/dir/?api=1`; the destination is appended as
/// a query parameter.
#[must_use]
pub fn directions_url(base: &str, coordinates: Coordinates) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!(
        "{base}{separator}destination={},{}",
        coordinates.latitude, coordinates.longitude
    )
}

/// Render a recorded timestamp in the given time zone.
///
/// ```
/// use chrono::{FixedOffset, TimeZone, Utc};
/// use parkrecall::navigation::format_recorded_at;
///
/// let ts = Utc.with_ymd_and_hms(2026, 10, 18, 11, 37, 0).unwrap();
/// let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
/// assert_eq!(format_recorded_at(ts, &ist), "18 Oct 2026, 05:07 PM");
/// ```
#[must_use]
pub fn format_recorded_at<Tz>(ts: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    ts.with_timezone(tz).format(RECORDED_AT_FORMAT).to_string()
}

/// Render coordinates as `12.970000° N · 77.590000° E`.
#[must_use]
pub fn format_coordinates(coordinates: Coordinates) -> String {
    let ns = if coordinates.latitude < 0.0 { 'S' } else { 'N' };
    let ew = if coordinates.longitude < 0.0 { 'W' } else { 'E' };
    format!(
        "{:.6}° {ns} · {:.6}° {ew}",
        coordinates.latitude.abs(),
        coordinates.longitude.abs()
    )
}
