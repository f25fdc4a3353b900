// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! The nightly site-events compiler.
//!
//! [`compile_site_events`] frames one noon-to-noon night, finds the solar
//! threshold crossings, and derives the calibration and observing
//! checkpoints from them.  Every derived instant is a fixed offset on the TAI
//! axis from the event it hangs off.
//!
//! # Evening chain
//!
//! Built backwards from the ops window start (one hour before sunset):
//!
//! | Event | Instant |
//! |-------|---------|
//! | End Eve Scrn Flats | ops start − longest screen flat |
//! | Eve Scrn Flats | ↑ − screen-flat duration |
//! | End Eve Bias Dark | ↑ − longest dark |
//! | Eve Bias Dark | ↑ − bias/dark duration |
//!
//! # Morning chain
//!
//! Built forwards from sunrise and kept off the timeline in
//! [`MorningCalibration`]: screen flats start four minutes after sunrise,
//! then one longest-screen margin, the morning bias/dark block, one
//! longest-dark margin, and reductions begin.

use std::fmt;

use qtty::{Day, Days, Hours, Minutes};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::config::CalibrationDurations;
use crate::ephemeris::Ephemeris;
use crate::error::EventsResult;
use crate::flats::{compute_flat_vector, FlatSpotVector};
use crate::instant::TimeInstant;
use crate::lunar::{find_moon_events, MoonEvent};
use crate::period::Period;
use crate::riseset::{
    find_threshold_crossings, ASTRONOMICAL_DEGREES, CIVIL_DEGREES, NAUTICAL_DEGREES,
    SUNRISE_DEGREES,
};
use crate::scales::TAI;
use crate::site::SiteContext;

/// Sun depression that ends morning sky flats.
pub const SKY_FLAT_BRIGHT_DEGREES: f64 = 1.5;
/// Sun depression bounding the dark end of both sky-flat windows.
pub const SKY_FLAT_DARK_DEGREES: f64 = 11.75;

fn minutes(m: f64) -> Days {
    Minutes::new(m).to::<Day>()
}

fn hours(h: f64) -> Days {
    Hours::new(h).to::<Day>()
}

macro_rules! event_names {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// A named checkpoint of the observing night.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum EventName {
            $(
                #[serde(rename = $name)]
                $variant,
            )+
        }

        impl EventName {
            /// Display name, also used as the serialised key.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }
    };
}

event_names! {
    EveBiasDark => "Eve Bias Dark",
    EndEveBiasDark => "End Eve Bias Dark",
    EveScrnFlats => "Eve Scrn Flats",
    EndEveScrnFlats => "End Eve Scrn Flats",
    OpsWindowStart => "Ops Window Start",
    CoolDownOpen => "Cool Down Open",
    EveSkyFlats => "Eve Sky Flats",
    SunSet => "Sun Set",
    CivilDusk => "Civil Dusk",
    EndEveSkyFlats => "End Eve Sky Flats",
    ClockAndAutoFocus => "Clock & Auto Focus",
    NautDusk => "Naut Dusk",
    ObservingBegins => "Observing Begins",
    AstroDark => "Astro Dark",
    MiddleOfNight => "Middle of Night",
    EndAstroDark => "End Astro Dark",
    ObservingEnds => "Observing Ends",
    FinalClockAndAutoFocus => "Final Clock & Auto Focus",
    NautDawn => "Naut Dawn",
    MornSkyFlats => "Morn Sky Flats",
    CivilDawn => "Civil Dawn",
    EndMornSkyFlats => "End Morn Sky Flats",
    OpsWindowCloses => "Ops Window Closes",
    Sunrise => "Sunrise",
    MoonRise => "Moon Rise",
    MoonSet => "Moon Set",
}

impl EventName {
    /// Keys present in every timeline.
    pub const REQUIRED: [EventName; 24] = [
        Self::EveBiasDark,
        Self::EndEveBiasDark,
        Self::EveScrnFlats,
        Self::EndEveScrnFlats,
        Self::OpsWindowStart,
        Self::CoolDownOpen,
        Self::EveSkyFlats,
        Self::SunSet,
        Self::CivilDusk,
        Self::EndEveSkyFlats,
        Self::ClockAndAutoFocus,
        Self::NautDusk,
        Self::ObservingBegins,
        Self::AstroDark,
        Self::MiddleOfNight,
        Self::EndAstroDark,
        Self::ObservingEnds,
        Self::FinalClockAndAutoFocus,
        Self::NautDawn,
        Self::MornSkyFlats,
        Self::CivilDawn,
        Self::EndMornSkyFlats,
        Self::OpsWindowCloses,
        Self::Sunrise,
    ];
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named instants of one night, ascending in time.
///
/// Serialises as a JSON object of TAI Julian days in chronological order.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteEventTimeline {
    entries: Vec<(EventName, TimeInstant)>,
}

impl SiteEventTimeline {
    /// Sorts `events` by instant.  Ties keep their input order.
    pub fn from_events<I>(events: I) -> Self
    where
        I: IntoIterator<Item = (EventName, TimeInstant)>,
    {
        let mut entries: Vec<_> = events.into_iter().collect();
        entries.sort_by(|a, b| a.1.value().total_cmp(&b.1.value()));
        Self { entries }
    }

    pub fn get(&self, name: EventName) -> Option<TimeInstant> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, t)| t)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EventName, TimeInstant)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(name, TAI Julian day)` pairs, the shape handed to HTTP callers.
    pub fn to_julian_days(&self) -> Vec<(&'static str, f64)> {
        self.entries
            .iter()
            .map(|&(name, t)| (name.as_str(), t.value()))
            .collect()
    }
}

impl Serialize for SiteEventTimeline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, t) in &self.entries {
            map.serialize_entry(name.as_str(), &t.value())?;
        }
        map.end()
    }
}

/// Morning calibration blocks after sunrise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MorningCalibration {
    pub screen_flats: Period<TAI>,
    pub bias_dark: Period<TAI>,
    pub begin_reductions: TimeInstant,
}

impl MorningCalibration {
    fn after(sunrise: TimeInstant, durations: &CalibrationDurations) -> Self {
        let screen_start = sunrise + minutes(4.0);
        let screen_flats = Period::starting_at(screen_start, durations.screen_flat());
        let bias_start = screen_flats.end + durations.longest_screen();
        let bias_dark = Period::starting_at(bias_start, durations.morn_bias_dark());
        Self {
            screen_flats,
            bias_dark,
            begin_reductions: bias_dark.end + durations.longest_dark(),
        }
    }
}

/// Everything computed for one night.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteEvents {
    pub window: Period<TAI>,
    pub timeline: SiteEventTimeline,
    /// From the ops window start to the end of evening sky flats.
    pub evening_flats: FlatSpotVector,
    /// From the start of morning sky flats to sunrise.
    pub morning_flats: FlatSpotVector,
    pub morning_calibration: MorningCalibration,
    pub moon: MoonEvent,
}

/// Compile the night containing `unix_seconds` at the given site.
///
/// Any solar threshold without a crossing in the window fails the whole
/// night with [`EventsError::NoCrossing`](crate::EventsError::NoCrossing).
pub fn compile_site_events(
    ephemeris: &Ephemeris,
    latitude: f64,
    longitude: f64,
    unix_seconds: f64,
    timezone: &str,
    durations: &CalibrationDurations,
) -> EventsResult<SiteEvents> {
    durations.validate()?;
    let context = SiteContext::build(ephemeris, latitude, longitude, unix_seconds, timezone)?;

    let sun = find_threshold_crossings(&context, SUNRISE_DEGREES)?;
    let civil = find_threshold_crossings(&context, CIVIL_DEGREES)?;
    let nautical = find_threshold_crossings(&context, NAUTICAL_DEGREES)?;
    let astronomical = find_threshold_crossings(&context, ASTRONOMICAL_DEGREES)?;
    let sky_flat_bright = find_threshold_crossings(&context, SKY_FLAT_BRIGHT_DEGREES)?;
    let sky_flat_dark = find_threshold_crossings(&context, SKY_FLAT_DARK_DEGREES)?;

    let ops_window_start = sun.set - hours(1.0);
    let end_eve_screen_flats = ops_window_start - durations.longest_screen();
    let eve_screen_flats = end_eve_screen_flats - durations.screen_flat();
    let end_eve_bias_dark = eve_screen_flats - durations.longest_dark();
    let eve_bias_dark = end_eve_bias_dark - durations.bias_dark();

    let eve_sky_flats = sun.set - hours(0.5);
    let end_eve_sky_flats = sky_flat_dark.set;
    let morn_sky_flats = sky_flat_dark.rise;
    let end_morn_sky_flats = sky_flat_bright.rise;

    let evening_flats = compute_flat_vector(&context, ops_window_start, end_eve_sky_flats)?;
    let morning_flats = compute_flat_vector(&context, morn_sky_flats, sun.rise)?;
    let morning_calibration = MorningCalibration::after(sun.rise, durations);
    let moon = find_moon_events(&context)?;

    let mut events = vec![
        (EventName::EveBiasDark, eve_bias_dark),
        (EventName::EndEveBiasDark, end_eve_bias_dark),
        (EventName::EveScrnFlats, eve_screen_flats),
        (EventName::EndEveScrnFlats, end_eve_screen_flats),
        (EventName::OpsWindowStart, ops_window_start),
        (EventName::CoolDownOpen, ops_window_start + minutes(0.5)),
        (EventName::EveSkyFlats, eve_sky_flats),
        (EventName::SunSet, sun.set),
        (EventName::CivilDusk, civil.set),
        (EventName::EndEveSkyFlats, end_eve_sky_flats),
        (EventName::ClockAndAutoFocus, end_eve_sky_flats + minutes(1.0)),
        (EventName::NautDusk, nautical.set),
        (EventName::ObservingBegins, nautical.set + minutes(5.0)),
        (EventName::AstroDark, astronomical.set),
        (EventName::MiddleOfNight, sun.below().midpoint()),
        (EventName::EndAstroDark, astronomical.rise),
        (EventName::ObservingEnds, nautical.rise - minutes(5.0)),
        (EventName::FinalClockAndAutoFocus, nautical.rise - minutes(4.0)),
        (EventName::NautDawn, nautical.rise),
        (EventName::MornSkyFlats, morn_sky_flats),
        (EventName::CivilDawn, civil.rise),
        (EventName::EndMornSkyFlats, end_morn_sky_flats),
        (EventName::OpsWindowCloses, end_morn_sky_flats + minutes(0.5)),
        (EventName::Sunrise, sun.rise),
    ];
    events.extend(moon.rise.map(|t| (EventName::MoonRise, t)));
    events.extend(moon.set.map(|t| (EventName::MoonSet, t)));

    let timeline = SiteEventTimeline::from_events(events);
    log::debug!(
        "compiled {} events for ({latitude}, {longitude}) {timezone} in {}",
        timeline.len(),
        context.window
    );

    Ok(SiteEvents {
        window: context.window,
        timeline,
        evening_flats,
        morning_flats,
        morning_calibration,
        moon,
    })
}

/// Timeline for the night containing `unix_seconds`, with the shared
/// ephemeris and default calibration durations.
pub fn make_site_events(
    latitude: f64,
    longitude: f64,
    unix_seconds: f64,
    timezone: &str,
) -> EventsResult<SiteEventTimeline> {
    compile_site_events(
        Ephemeris::shared(),
        latitude,
        longitude,
        unix_seconds,
        timezone,
        &CalibrationDurations::default(),
    )
    .map(|events| events.timeline)
}
