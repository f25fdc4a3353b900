// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Civil time zones on top of the atomic axis.
//!
//! Offsets are always resolved **at the instant in question**, never taken as
//! a fixed per-zone constant, so daylight-saving changes are honoured.

use chrono::{DateTime, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use log::debug;
use qtty::{Day, Hour, Hours};

use crate::error::{EventsError, EventsResult};
use crate::instant::TimeInstant;

/// Wire format of the moon-range endpoints.
pub const UTC_ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Look up an IANA zone identifier such as `America/Los_Angeles`.
pub fn parse_timezone(name: &str) -> EventsResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| EventsError::configuration(format!("unknown timezone '{name}'")))
}

fn utc_datetime(unix_seconds: f64) -> EventsResult<DateTime<Utc>> {
    if !unix_seconds.is_finite() {
        return Err(EventsError::TimeOutOfRange(unix_seconds));
    }
    let secs = unix_seconds.floor();
    let nanos = ((unix_seconds - secs) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::<Utc>::from_timestamp(secs as i64, nanos)
        .ok_or(EventsError::TimeOutOfRange(unix_seconds))
}

/// UTC offset of `tz`, in hours, in force at `unix_seconds`.
pub fn utc_offset_hours(tz: &Tz, unix_seconds: f64) -> EventsResult<Hours> {
    let utc = utc_datetime(unix_seconds)?;
    let seconds = tz
        .offset_from_utc_datetime(&utc.naive_utc())
        .fix()
        .local_minus_utc();
    Ok(Hours::new(f64::from(seconds) / 3600.0))
}

/// Convert a zoned wall-clock time to the atomic axis.
///
/// A repeated local time (DST fall-back) resolves to its earliest instant.
/// A skipped local time (DST spring-forward) is rejected.
pub fn to_atomic(local: NaiveDateTime, tz: &Tz) -> EventsResult<TimeInstant> {
    let zoned = tz.from_local_datetime(&local).earliest().ok_or_else(|| {
        EventsError::configuration(format!("local time {local} does not exist in {tz}"))
    })?;
    Ok(TimeInstant::from_utc(zoned.with_timezone(&Utc)))
}

/// Wall-clock rendering of an instant in `tz`.
pub fn to_local(t: TimeInstant, tz: &Tz) -> EventsResult<DateTime<Tz>> {
    t.to_utc()
        .map(|utc| utc.with_timezone(tz))
        .ok_or(EventsError::TimeOutOfRange(t.value()))
}

/// Local noon at or before `unix_seconds`, on the atomic axis.
///
/// Julian days start at 12:00, so shifting by the zone offset, flooring and
/// shifting back lands on the preceding local noon.  The offset is the one in
/// force at `unix_seconds`; across a DST change the result can be off by the
/// size of the change.
pub fn local_noon_preceding(tz: &Tz, unix_seconds: f64) -> EventsResult<TimeInstant> {
    let offset = utc_offset_hours(tz, unix_seconds)?.to::<Day>();
    let now = TimeInstant::from_unix_seconds(unix_seconds);
    let noon = TimeInstant::new((now + offset).value().floor()) - offset;
    debug!(
        "local noon for {tz} at unix {unix_seconds}: {noon} (offset {} h)",
        offset.to::<Hour>().value()
    );
    Ok(noon)
}

/// Parse a `YYYY-MM-DDTHH:MM:SSZ` timestamp.
pub fn from_utc_iso(text: &str) -> EventsResult<TimeInstant> {
    let naive = NaiveDateTime::parse_from_str(text.trim(), UTC_ISO_FORMAT).map_err(|e| {
        EventsError::configuration(format!("invalid UTC timestamp '{text}': {e}"))
    })?;
    Ok(TimeInstant::from_utc(naive.and_utc()))
}

/// Render an instant as `YYYY-MM-DDTHH:MM:SSZ`, rounded to the second.
pub fn to_utc_iso(t: TimeInstant) -> EventsResult<String> {
    let unix = t.unix_seconds().round();
    let utc = utc_datetime(unix)?;
    Ok(utc.format(UTC_ISO_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn unix(tz: &Tz, y: i32, m: u32, d: u32, h: u32, min: u32) -> f64 {
        tz.with_ymd_and_hms(y, m, d, h, min, 0)
            .single()
            .unwrap()
            .timestamp() as f64
    }

    #[test]
    fn unknown_zone_is_configuration_error() {
        let err = parse_timezone("Mars/Olympus_Mons").unwrap_err();
        assert!(matches!(err, EventsError::Configuration(ref m) if m.contains("Mars/Olympus_Mons")));
        assert!(parse_timezone("America/Los_Angeles").is_ok());
    }

    #[test]
    fn offset_follows_daylight_saving() {
        let tz = parse_timezone("America/Los_Angeles").unwrap();
        let june = unix(&tz, 2020, 6, 15, 12, 0);
        let january = unix(&tz, 2020, 1, 15, 12, 0);
        assert_eq!(utc_offset_hours(&tz, june).unwrap(), Hours::new(-7.0));
        assert_eq!(utc_offset_hours(&tz, january).unwrap(), Hours::new(-8.0));
    }

    #[test]
    fn local_noon_uses_offset_at_that_instant() {
        let tz = parse_timezone("America/Los_Angeles").unwrap();

        let june = local_noon_preceding(&tz, unix(&tz, 2020, 6, 15, 15, 0)).unwrap();
        let shifted = june.value() - 7.0 / 24.0;
        assert!((shifted - shifted.round()).abs() < 1e-9, "June noon: {june}");

        let january = local_noon_preceding(&tz, unix(&tz, 2020, 1, 15, 15, 0)).unwrap();
        let shifted = january.value() - 8.0 / 24.0;
        assert!((shifted - shifted.round()).abs() < 1e-9, "January noon: {january}");
    }

    #[test]
    fn local_noon_floors_to_the_preceding_noon() {
        let tz = parse_timezone("Australia/Perth").unwrap();
        let before = local_noon_preceding(&tz, unix(&tz, 2020, 6, 5, 11, 59)).unwrap();
        let after = local_noon_preceding(&tz, unix(&tz, 2020, 6, 5, 12, 0)).unwrap();
        assert!(((after - before).value() - 1.0).abs() < 1e-9);

        let local = to_local(after, &tz).unwrap();
        assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2020, 6, 5).unwrap());
        assert_eq!(local.hour(), 11);
        assert_eq!(local.minute(), 59);

        let local = to_local(before, &tz).unwrap();
        assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2020, 6, 4).unwrap());
    }

    #[test]
    fn to_atomic_resolves_dst_edge_cases() {
        let tz = parse_timezone("America/Los_Angeles").unwrap();

        // 2020-11-01 01:30 happens twice; the PDT one comes first.
        let repeated = NaiveDate::from_ymd_opt(2020, 11, 1)
            .unwrap()
            .and_hms_opt(1, 30, 0)
            .unwrap();
        let t = to_atomic(repeated, &tz).unwrap();
        let expected = TimeInstant::from_unix_seconds(unix(&tz, 2020, 11, 1, 0, 30) + 3600.0);
        assert!((t - expected).abs().value() < 1e-9);

        // 2020-03-08 02:30 never happens.
        let skipped = NaiveDate::from_ymd_opt(2020, 3, 8)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        assert!(matches!(
            to_atomic(skipped, &tz),
            Err(EventsError::Configuration(_))
        ));
    }

    #[test]
    fn iso_roundtrip() {
        let t = from_utc_iso("2020-08-02T03:04:05Z").unwrap();
        assert_eq!(to_utc_iso(t).unwrap(), "2020-08-02T03:04:05Z");
        assert!(from_utc_iso("2020-08-02 03:04:05").is_err());
    }
}
