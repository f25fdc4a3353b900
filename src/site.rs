// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Observer position and the noon-to-noon observing window.

use chrono_tz::Tz;
use log::debug;
use qtty::{Days, Degrees};

use crate::ephemeris::Ephemeris;
use crate::error::{EventsError, EventsResult};
use crate::instant::TimeInstant;
use crate::period::Period;
use crate::scales::TAI;
use crate::zone;

/// A point on the Earth's surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    /// Geodetic latitude, degrees north.
    pub latitude: Degrees,
    /// Longitude, degrees east.
    pub longitude: Degrees,
}

impl Observer {
    /// Validated constructor: latitude in [-90, 90], longitude in [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> EventsResult<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(EventsError::configuration(format!(
                "latitude {latitude} outside [-90, 90]"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(EventsError::configuration(format!(
                "longitude {longitude} outside [-180, 180]"
            )));
        }
        Ok(Self {
            latitude: Degrees::new(latitude),
            longitude: Degrees::new(longitude),
        })
    }

    /// Accepts coordinates as numeric strings, as stored in site configs.
    pub fn parse(latitude: &str, longitude: &str) -> EventsResult<Self> {
        let parse = |name: &str, text: &str| {
            text.trim().parse::<f64>().map_err(|_| {
                EventsError::configuration(format!("{name} '{text}' is not a number"))
            })
        };
        Self::new(parse("latitude", latitude)?, parse("longitude", longitude)?)
    }
}

/// One local-noon-to-local-noon window at one site.
#[derive(Debug, Clone, Copy)]
pub struct SiteContext<'e> {
    pub window: Period<TAI>,
    pub observer: Observer,
    pub timezone: Tz,
    pub ephemeris: &'e Ephemeris,
}

impl<'e> SiteContext<'e> {
    /// Frame the night containing `unix_seconds` at the given site.
    pub fn build(
        ephemeris: &'e Ephemeris,
        latitude: f64,
        longitude: f64,
        unix_seconds: f64,
        timezone: &str,
    ) -> EventsResult<Self> {
        let observer = Observer::new(latitude, longitude)?;
        let timezone = zone::parse_timezone(timezone)?;
        let day_start = zone::local_noon_preceding(&timezone, unix_seconds)?;
        let window = Period::starting_at(day_start, Days::new(1.0));
        debug!("site context ({latitude}, {longitude}) {timezone}: {window}");
        Ok(Self {
            window,
            observer,
            timezone,
            ephemeris,
        })
    }

    pub fn day_start(&self) -> TimeInstant {
        self.window.start
    }

    pub fn day_end(&self) -> TimeInstant {
        self.window.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observer_ranges() {
        assert!(Observer::new(34.0, -119.0).is_ok());
        assert!(Observer::new(90.0, 180.0).is_ok());
        assert!(Observer::new(-90.0, -180.0).is_ok());
        assert!(matches!(Observer::new(91.0, 0.0), Err(EventsError::Configuration(_))));
        assert!(matches!(Observer::new(0.0, -180.5), Err(EventsError::Configuration(_))));
        assert!(Observer::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn observer_parses_numeric_strings() {
        let o = Observer::parse(" 34.5 ", "-119").unwrap();
        assert_eq!(o.latitude, Degrees::new(34.5));
        assert_eq!(o.longitude, Degrees::new(-119.0));
        assert!(Observer::parse("north", "0").is_err());
    }

    #[test]
    fn window_is_exactly_one_day() {
        let eph = Ephemeris::new();
        // 2020-08-01 12:01 PDT
        let ctx = SiteContext::build(&eph, 34.0, -119.0, 1_596_308_460.0, "America/Los_Angeles")
            .unwrap();
        assert_eq!(ctx.day_end() - ctx.day_start(), Days::new(1.0));
        assert!(ctx.window.contains(TimeInstant::from_unix_seconds(1_596_308_460.0)));
    }

    #[test]
    fn bad_inputs_are_configuration_errors() {
        let eph = Ephemeris::new();
        assert!(matches!(
            SiteContext::build(&eph, 34.0, -119.0, 1_596_308_460.0, "Pacific/Atlantis"),
            Err(EventsError::Configuration(_))
        ));
        assert!(matches!(
            SiteContext::build(&eph, 120.0, -119.0, 1_596_308_460.0, "UTC"),
            Err(EventsError::Configuration(_))
        ));
    }
}
