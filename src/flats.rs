// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Twilight sky-flat pointing.
//!
//! The flattest patch of twilight sky sits roughly 105° of altitude from the
//! Sun along its vertical circle.  When that lands past the zenith the point
//! is folded back onto the opposite azimuth.  [`compute_flat_vector`] gives
//! the J2000 pointing at both ends of a flat window and the linear drift
//! needed to track it.

use qtty::Hour;
use serde::{Deserialize, Serialize};

use crate::ephemeris::{Ephemeris, Equatorial, Horizontal};
use crate::error::{EventsError, EventsResult};
use crate::instant::TimeInstant;
use crate::site::{Observer, SiteContext};

/// Altitude added to the Sun's to reach the flat spot.
pub const FLAT_SPOT_OFFSET_DEGREES: f64 = 105.0;

/// Start and end pointing of a sky-flat window plus its drift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlatSpotVector {
    /// Hours, [0, 24).
    pub start_ra: f64,
    /// Degrees.
    pub start_dec: f64,
    pub end_ra: f64,
    pub end_dec: f64,
    /// Degrees of RA per hour, rounded to 4 decimals.
    pub ra_rate: f64,
    /// Degrees of declination per hour, rounded to 4 decimals.
    pub dec_rate: f64,
}

/// J2000 direction of the flat spot seen from `observer` at `t`.
pub fn flat_spot(ephemeris: &Ephemeris, observer: &Observer, t: TimeInstant) -> Equatorial {
    let sun = ephemeris.sun_altaz(observer, t);
    let mut altitude = sun.altitude.value() + FLAT_SPOT_OFFSET_DEGREES;
    let mut azimuth = sun.azimuth.value();
    if altitude > 90.0 {
        altitude = 180.0 - altitude;
        azimuth -= 180.0;
    }
    ephemeris.radec_from_altaz(observer, t, Horizontal::new(altitude, azimuth))
}

/// Flat-spot pointing at `t0` and `t1` and the drift between them.
///
/// Rates use the plain difference of right ascension in degrees, with no
/// wrap at 0h.
pub fn compute_flat_vector(
    context: &SiteContext<'_>,
    t0: TimeInstant,
    t1: TimeInstant,
) -> EventsResult<FlatSpotVector> {
    if t1 <= t0 {
        return Err(EventsError::configuration(format!(
            "flat window ends at {t1}, not after its start {t0}"
        )));
    }

    let start = flat_spot(context.ephemeris, &context.observer, t0);
    let end = flat_spot(context.ephemeris, &context.observer, t1);
    let span_hours = (t1 - t0).to::<Hour>().value();

    let ra_rate = (end.ra_hours() - start.ra_hours()) * 15.0 / span_hours;
    let dec_rate = (end.declination - start.declination).value() / span_hours;

    log::debug!(
        "flat spot {:.3}h {:+.2}° -> {:.3}h {:+.2}° over {span_hours:.2} h",
        start.ra_hours(),
        start.declination.value(),
        end.ra_hours(),
        end.declination.value()
    );

    Ok(FlatSpotVector {
        start_ra: start.ra_hours(),
        start_dec: start.declination.value(),
        end_ra: end.ra_hours(),
        end_dec: end.declination.value(),
        ra_rate: round4(ra_rate),
        dec_rate: round4(dec_rate),
    })
}

fn round4(x: f64) -> f64 {
    (x * 1e4).round() / 1e4
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2020-08-10 13:45 PDT
    const LA_AUGUST_10: f64 = 1_597_092_300.0;

    fn la_context(eph: &Ephemeris) -> SiteContext<'_> {
        SiteContext::build(eph, 34.0, -119.0, LA_AUGUST_10, "America/Los_Angeles").unwrap()
    }

    #[test]
    fn evening_window_matches_reference() {
        let eph = Ephemeris::new();
        let ctx = la_context(&eph);
        // Ops window start to end of evening sky flats.
        let t0 = TimeInstant::new(2_459_072.577_608_373_5);
        let t1 = TimeInstant::new(2_459_072.657_123_179_306);
        let v = compute_flat_vector(&ctx, t0, t1).unwrap();

        assert!((v.start_ra - 17.104_991_872_570_437).abs() < 0.05, "{v:?}");
        assert!((v.start_dec - 25.784_461_955_928_407).abs() < 0.05, "{v:?}");
        assert!((v.end_ra - 17.372_109_786_045_947).abs() < 0.05, "{v:?}");
        assert!((v.end_dec - 32.583_239_202_840_886).abs() < 0.05, "{v:?}");
        assert!((v.ra_rate - 2.0996).abs() < 0.05, "{v:?}");
        assert!((v.dec_rate - 3.5626).abs() < 0.05, "{v:?}");
    }

    #[test]
    fn morning_spot_rises_south_and_drifts_east() {
        let eph = Ephemeris::new();
        let ctx = la_context(&eph);
        let t0 = TimeInstant::new(2_459_073.011_403_007_75);
        let t1 = TimeInstant::new(2_459_073.049_259_029_1);
        let v = compute_flat_vector(&ctx, t0, t1).unwrap();

        assert!((v.start_ra - 1.472_957_757_594_652_6).abs() < 0.05, "{v:?}");
        assert!((v.start_dec - 32.471_636_109_223_944).abs() < 0.3, "{v:?}");
        assert!(v.ra_rate > 0.0 && v.dec_rate < 0.0, "{v:?}");
        assert!(v.end_dec < v.start_dec);
    }

    #[test]
    fn spot_is_105_degrees_from_the_sun() {
        let eph = Ephemeris::new();
        let observer = Observer::new(34.0, -119.0).unwrap();
        for jd in [2_459_072.58, 2_459_072.65, 2_459_073.02, 2_459_073.05] {
            let t = TimeInstant::new(jd);
            let spot = flat_spot(&eph, &observer, t);
            let sun = eph.radec_from_altaz(&observer, t, eph.sun_altaz(&observer, t));
            let sep = spot.separation(&sun).value();
            assert!((sep - FLAT_SPOT_OFFSET_DEGREES).abs() < 0.05, "{jd}: {sep}");
        }
    }

    #[test]
    fn rates_are_rounded() {
        let eph = Ephemeris::new();
        let ctx = la_context(&eph);
        let v = compute_flat_vector(
            &ctx,
            TimeInstant::new(2_459_072.58),
            TimeInstant::new(2_459_072.65),
        )
        .unwrap();
        for rate in [v.ra_rate, v.dec_rate] {
            assert!(((rate * 1e4).round() - rate * 1e4).abs() < 1e-6, "{rate}");
        }
    }

    #[test]
    fn empty_window_is_rejected() {
        let eph = Ephemeris::new();
        let ctx = la_context(&eph);
        let t = TimeInstant::new(2_459_072.6);
        assert!(matches!(
            compute_flat_vector(&ctx, t, t),
            Err(EventsError::Configuration(_))
        ));
    }

    #[test]
    fn serialises_with_snake_case_fields() {
        let v = FlatSpotVector {
            start_ra: 1.0,
            start_dec: 2.0,
            end_ra: 3.0,
            end_dec: 4.0,
            ra_rate: 5.0,
            dec_rate: 6.0,
        };
        let json = serde_json::to_value(v).unwrap();
        assert_eq!(json["start_ra"], 1.0);
        assert_eq!(json["dec_rate"], 6.0);
    }
}
