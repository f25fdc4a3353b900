// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Moon rise, set, meridian transit and illumination.

use log::{debug, warn};
use qtty::Days;
use serde::Serialize;

use crate::ephemeris::{Ephemeris, Precision};
use crate::error::{EventsError, EventsResult};
use crate::instant::TimeInstant;
use crate::period::Period;
use crate::search::{find_discrete, Crossing, DiscretePredicate};
use crate::site::{Observer, SiteContext};
use crate::zone;

/// How far past the starting instant a transit is searched for.
pub const TRANSIT_SEARCH_SPAN: Days = Days::new(1.1);

/// Moon events inside one observing window.
///
/// Rise and set are independent: either, both or neither may occur.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoonEvent {
    pub rise: Option<TimeInstant>,
    pub set: Option<TimeInstant>,
    pub transit: TimeInstant,
    /// Illuminated fraction at `transit`, in [0, 1].
    pub illumination: f64,
}

/// "The Moon's centre is above the horizon" (topocentric, no refraction).
pub struct MoonAbove<'e> {
    ephemeris: &'e Ephemeris,
    observer: Observer,
}

impl<'e> MoonAbove<'e> {
    pub fn new(ephemeris: &'e Ephemeris, observer: Observer) -> Self {
        Self { ephemeris, observer }
    }
}

impl DiscretePredicate for MoonAbove<'_> {
    fn holds(&self, t: TimeInstant) -> bool {
        self.ephemeris.moon_altaz(&self.observer, t).altitude.value() > 0.0
    }

    fn rough_period(&self) -> Days {
        Days::new(0.5)
    }
}

/// The Moon is west of the meridian (hour angle in [0°, 180°)).
///
/// Goes true at upper culmination and false at lower culmination.
struct MoonPastMeridian<'e> {
    ephemeris: &'e Ephemeris,
    observer: Observer,
}

impl DiscretePredicate for MoonPastMeridian<'_> {
    fn holds(&self, t: TimeInstant) -> bool {
        self.ephemeris
            .moon_hour_angle(&self.observer, t, Precision::Low)
            .value()
            >= 0.0
    }

    fn rough_period(&self) -> Days {
        Days::new(0.5)
    }
}

/// Next upper culmination of the Moon after `after`.
pub fn find_moon_transit(
    ephemeris: &Ephemeris,
    observer: &Observer,
    after: TimeInstant,
) -> EventsResult<TimeInstant> {
    let predicate = MoonPastMeridian {
        ephemeris,
        observer: *observer,
    };
    let crossings = find_discrete(Period::starting_at(after, TRANSIT_SEARCH_SPAN), &predicate)?;
    first_upper_culmination(&crossings, after)
}

fn first_upper_culmination(
    crossings: &[Crossing],
    after: TimeInstant,
) -> EventsResult<TimeInstant> {
    crossings
        .iter()
        .find(|c| c.rising)
        .map(|c| c.time)
        .ok_or(EventsError::NoTransit {
            after: after.value(),
            span_days: TRANSIT_SEARCH_SPAN.value(),
        })
}

/// Illuminated fraction of the lunar disk at `t`.
pub fn moon_illumination_at(ephemeris: &Ephemeris, t: TimeInstant) -> f64 {
    ephemeris.moon_illumination(t)
}

/// Moon rise/set in the window, plus transit and illumination.
///
/// If the window holds more than one rise (or set) the last one is kept.  The
/// transit is the first one after the rise, or after the window start when
/// the Moon does not rise.
pub fn find_moon_events(context: &SiteContext<'_>) -> EventsResult<MoonEvent> {
    let predicate = MoonAbove::new(context.ephemeris, context.observer);
    let crossings = find_discrete(context.window, &predicate)?;

    let rise = crossings.iter().rev().find(|c| c.rising).map(|c| c.time);
    let set = crossings.iter().rev().find(|c| !c.rising).map(|c| c.time);
    if rise.is_none() && set.is_none() {
        warn!("moon neither rises nor sets in {}", context.window);
    }

    let transit = find_moon_transit(
        context.ephemeris,
        &context.observer,
        rise.unwrap_or(context.day_start()),
    )?;
    let illumination = moon_illumination_at(context.ephemeris, transit);
    debug!("moon transit {transit}, illumination {illumination:.3}");

    Ok(MoonEvent {
        rise,
        set,
        transit,
        illumination,
    })
}

/// One complete rise-to-set passage of the Moon, as UTC ISO strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoonCycle {
    pub rise: String,
    pub set: String,
    pub transit: String,
    pub illumination: f64,
}

/// Every complete rise→set passage between two `YYYY-MM-DDTHH:MM:SSZ`
/// instants, with illumination at the transit following each rise.
///
/// A set before the first rise and a rise after the last set are dropped.
pub fn moon_rise_set_illumination(
    ephemeris: &Ephemeris,
    observer: &Observer,
    start_iso: &str,
    end_iso: &str,
) -> EventsResult<Vec<MoonCycle>> {
    let start = zone::from_utc_iso(start_iso)?;
    let end = zone::from_utc_iso(end_iso)?;
    if end <= start {
        return Err(EventsError::configuration(format!(
            "range end {end_iso} is not after start {start_iso}"
        )));
    }

    let predicate = MoonAbove::new(ephemeris, *observer);
    let found = find_discrete(Period::new(start, end), &predicate)?;
    let mut crossings: &[Crossing] = &found;

    if let Some((first, rest)) = crossings.split_first() {
        if !first.rising {
            crossings = rest;
        }
    }
    if let Some((last, rest)) = crossings.split_last() {
        if last.rising {
            crossings = rest;
        }
    }

    crossings
        .chunks_exact(2)
        .map(|pair| {
            let (rise, set) = (pair[0].time, pair[1].time);
            let transit = find_moon_transit(ephemeris, observer, rise)?;
            Ok(MoonCycle {
                rise: zone::to_utc_iso(rise)?,
                set: zone::to_utc_iso(set)?,
                transit: zone::to_utc_iso(transit)?,
                illumination: moon_illumination_at(ephemeris, transit),
            })
        })
        .collect()
}
