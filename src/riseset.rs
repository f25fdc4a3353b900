// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Sun altitude thresholds: sunrise/sunset and the twilight pairs.

use log::warn;
use qtty::{Days, Degrees};
use serde::Serialize;

use crate::ephemeris::Ephemeris;
use crate::error::{EventsError, EventsResult};
use crate::instant::TimeInstant;
use crate::period::Period;
use crate::scales::TAI;
use crate::search::{find_discrete, DiscretePredicate};
use crate::site::{Observer, SiteContext};

/// Sun-disk correction used for sunrise and sunset.
pub const SUNRISE_DEGREES: f64 = 0.25;
/// Civil twilight depression.
pub const CIVIL_DEGREES: f64 = 6.0;
/// Nautical twilight depression.
pub const NAUTICAL_DEGREES: f64 = 12.0;
/// Astronomical twilight depression.
pub const ASTRONOMICAL_DEGREES: f64 = 18.0;

/// The two crossings of one threshold inside a noon-to-noon window.
///
/// `rise` is the morning crossing and `set` the evening one, so within a
/// window that starts at local noon the `set` comes first on the clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiseSetPair {
    pub rise: TimeInstant,
    pub set: TimeInstant,
}

impl RiseSetPair {
    /// The span below the threshold, from `set` to `rise`.
    pub fn below(&self) -> Period<TAI> {
        Period::new(self.set, self.rise)
    }
}

/// "The Sun is higher than `-horizon`" as a searchable predicate.
pub struct SunAbove<'e> {
    ephemeris: &'e Ephemeris,
    observer: Observer,
    horizon: Degrees,
}

impl<'e> SunAbove<'e> {
    pub fn new(ephemeris: &'e Ephemeris, observer: Observer, horizon_degrees: f64) -> Self {
        Self {
            ephemeris,
            observer,
            horizon: Degrees::new(horizon_degrees),
        }
    }
}

impl DiscretePredicate for SunAbove<'_> {
    fn holds(&self, t: TimeInstant) -> bool {
        self.ephemeris.sun_altaz(&self.observer, t).altitude > -self.horizon
    }

    fn rough_period(&self) -> Days {
        Days::new(0.5)
    }
}

/// Morning and evening crossings of `-horizon_degrees` in the context window.
///
/// Fails with [`EventsError::NoCrossing`] unless the Sun both rises above and
/// sinks below the threshold in the window.
pub fn find_threshold_crossings(
    context: &SiteContext<'_>,
    horizon_degrees: f64,
) -> EventsResult<RiseSetPair> {
    let predicate = SunAbove::new(context.ephemeris, context.observer, horizon_degrees);
    let crossings = find_discrete(context.window, &predicate)?;

    if crossings.len() > 2 {
        warn!(
            "{} crossings of {horizon_degrees}° in {}; pairing the first of each direction",
            crossings.len(),
            context.window
        );
    }

    let rise = crossings.iter().find(|c| c.rising).map(|c| c.time);
    let set = crossings.iter().find(|c| !c.rising).map(|c| c.time);

    match (rise, set) {
        (Some(rise), Some(set)) => Ok(RiseSetPair { rise, set }),
        _ => Err(EventsError::NoCrossing {
            horizon_degrees,
            found: crossings.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2020-08-01 12:01 PDT
    const LA_AUGUST: f64 = 1_596_308_460.0;

    #[test]
    fn evening_set_precedes_morning_rise() {
        let eph = Ephemeris::new();
        let ctx = SiteContext::build(&eph, 34.0, -119.0, LA_AUGUST, "America/Los_Angeles").unwrap();
        let pair = find_threshold_crossings(&ctx, SUNRISE_DEGREES).unwrap();
        assert!(pair.set < pair.rise);
        assert!(ctx.window.contains(pair.set));
        assert!(ctx.window.contains(pair.rise));
        let night = pair.below().duration().value() * 24.0;
        assert!((9.5..11.0).contains(&night), "night of {night} h");
    }

    #[test]
    fn deeper_thresholds_nest_inside_shallower_ones() {
        let eph = Ephemeris::new();
        let ctx = SiteContext::build(&eph, 34.0, -119.0, LA_AUGUST, "America/Los_Angeles").unwrap();
        let mut previous: Option<RiseSetPair> = None;
        for deg in [SUNRISE_DEGREES, CIVIL_DEGREES, NAUTICAL_DEGREES, ASTRONOMICAL_DEGREES] {
            let pair = find_threshold_crossings(&ctx, deg).unwrap();
            if let Some(prev) = previous {
                assert!(pair.set > prev.set, "{deg}°");
                assert!(pair.rise < prev.rise, "{deg}°");
            }
            previous = Some(pair);
        }
    }

    #[test]
    fn crossings_sit_on_the_threshold() {
        let eph = Ephemeris::new();
        let ctx = SiteContext::build(&eph, 34.0, -119.0, LA_AUGUST, "America/Los_Angeles").unwrap();
        let pair = find_threshold_crossings(&ctx, CIVIL_DEGREES).unwrap();
        for t in [pair.rise, pair.set] {
            let alt = eph.sun_altaz(&ctx.observer, t).altitude.value();
            assert!((alt + CIVIL_DEGREES).abs() < 1e-4, "{alt}");
        }
    }

    #[test]
    fn midnight_sun_has_no_astronomical_night() {
        let eph = Ephemeris::new();
        // 2020-06-21 12:00 UTC, 70°N
        let ctx = SiteContext::build(&eph, 70.0, 20.0, 1_592_740_800.0, "Europe/Oslo").unwrap();
        let err = find_threshold_crossings(&ctx, ASTRONOMICAL_DEGREES).unwrap_err();
        assert_eq!(
            err,
            EventsError::NoCrossing {
                horizon_degrees: 18.0,
                found: 0
            }
        );
    }
}
