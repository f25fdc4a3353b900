// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Time-scale marker types.
//!
//! Each zero-sized type encodes how values on its axis relate to the canonical
//! **Julian Date in TT**.
//!
//! | Marker | Description | Relation to TT |
//! |--------|-------------|----------------|
//! | [`TT`] | Terrestrial Time | identity |
//! | [`TAI`] | International Atomic Time | `TT = TAI + 32.184 s` |
//! | [`UTC`] | Julian day on the civil UTC axis | `TAI = UTC + leap seconds` |
//! | [`UnixTime`] | Days since 1970-01-01T00:00:00 UTC | as [`UTC`], shifted epoch |
//!
//! The ephemeris is evaluated in TT; sidereal time uses the UTC axis as its
//! UT1 proxy (|UT1 − UTC| < 0.9 s).

use super::instant::TimeScale;
use qtty::{Day, Days, Seconds};

/// Terrestrial Time, the argument of the ephemeris series.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct TT;

impl TimeScale for TT {
    const LABEL: &'static str = "TT";

    #[inline(always)]
    fn to_jd_tt(value: Days) -> Days {
        value
    }

    #[inline(always)]
    fn from_jd_tt(jd_tt: Days) -> Days {
        jd_tt
    }
}

/// International Atomic Time.
///
/// The uniform, leap-second-free axis every site event is expressed on.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct TAI;

const TT_MINUS_TAI: Seconds = Seconds::new(32.184);

impl TimeScale for TAI {
    const LABEL: &'static str = "TAI";

    #[inline(always)]
    fn to_jd_tt(value: Days) -> Days {
        value + TT_MINUS_TAI.to::<Day>()
    }

    #[inline(always)]
    fn from_jd_tt(jd_tt: Days) -> Days {
        jd_tt - TT_MINUS_TAI.to::<Day>()
    }
}

/// Leap-second table: (JD on the UTC axis at 00:00 of the day the new offset
/// takes effect, cumulative TAI − UTC in seconds).  Source: IERS Bulletin C.
const LEAP_SECONDS: [(f64, f64); 28] = [
    (2_441_317.5, 10.0), // 1972-01-01
    (2_441_499.5, 11.0), // 1972-07-01
    (2_441_683.5, 12.0), // 1973-01-01
    (2_442_048.5, 13.0), // 1974-01-01
    (2_442_413.5, 14.0), // 1975-01-01
    (2_442_778.5, 15.0), // 1976-01-01
    (2_443_144.5, 16.0), // 1977-01-01
    (2_443_509.5, 17.0), // 1978-01-01
    (2_443_874.5, 18.0), // 1979-01-01
    (2_444_239.5, 19.0), // 1980-01-01
    (2_444_786.5, 20.0), // 1981-07-01
    (2_445_151.5, 21.0), // 1982-07-01
    (2_445_516.5, 22.0), // 1983-07-01
    (2_446_247.5, 23.0), // 1985-07-01
    (2_447_161.5, 24.0), // 1988-01-01
    (2_447_892.5, 25.0), // 1990-01-01
    (2_448_257.5, 26.0), // 1991-01-01
    (2_448_804.5, 27.0), // 1992-07-01
    (2_449_169.5, 28.0), // 1993-07-01
    (2_449_534.5, 29.0), // 1994-07-01
    (2_450_083.5, 30.0), // 1996-01-01
    (2_450_630.5, 31.0), // 1997-07-01
    (2_451_179.5, 32.0), // 1999-01-01
    (2_453_736.5, 33.0), // 2006-01-01
    (2_454_832.5, 34.0), // 2009-01-01
    (2_456_109.5, 35.0), // 2012-07-01
    (2_457_204.5, 36.0), // 2015-07-01
    (2_457_754.5, 37.0), // 2017-01-01
];

/// Cumulative TAI − UTC in force at a Julian date on the UTC axis.
///
/// Before 1972 the initial 10 s offset is returned.
pub fn tai_minus_utc(jd_utc: f64) -> Seconds {
    let idx = LEAP_SECONDS.partition_point(|&(start, _)| start <= jd_utc);
    match idx {
        0 => Seconds::new(LEAP_SECONDS[0].1),
        i => Seconds::new(LEAP_SECONDS[i - 1].1),
    }
}

#[inline]
fn utc_to_tt(jd_utc: Days) -> Days {
    jd_utc + (tai_minus_utc(jd_utc.value()) + TT_MINUS_TAI).to::<Day>()
}

#[inline]
fn tt_to_utc(jd_tt: Days) -> Days {
    // Guess with the newest offset, then settle on the offset of that guess.
    let newest = Seconds::new(LEAP_SECONDS[LEAP_SECONDS.len() - 1].1);
    let guess = jd_tt - (newest + TT_MINUS_TAI).to::<Day>();
    jd_tt - (tai_minus_utc(guess.value()) + TT_MINUS_TAI).to::<Day>()
}

/// Julian day on the civil UTC axis.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct UTC;

impl TimeScale for UTC {
    const LABEL: &'static str = "UTC";

    #[inline]
    fn to_jd_tt(value: Days) -> Days {
        utc_to_tt(value)
    }

    #[inline]
    fn from_jd_tt(jd_tt: Days) -> Days {
        tt_to_utc(jd_tt)
    }
}

/// Unix time expressed in days since 1970-01-01T00:00:00 UTC.
///
/// Like POSIX, the count ignores leap seconds; the table above is applied when
/// moving onto the uniform axes.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct UnixTime;

/// JD of the Unix epoch on the UTC axis.
pub(crate) const UNIX_EPOCH_JD: Days = Days::new(2_440_587.5);

impl TimeScale for UnixTime {
    const LABEL: &'static str = "Unix";

    #[inline]
    fn to_jd_tt(value: Days) -> Days {
        utc_to_tt(value + UNIX_EPOCH_JD)
    }

    #[inline]
    fn from_jd_tt(jd_tt: Days) -> Days {
        tt_to_utc(jd_tt) - UNIX_EPOCH_JD
    }
}
