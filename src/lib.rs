// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Site Events
//!
//! Nightly event timeline for an automated observatory.  Given a site's
//! latitude, longitude, IANA timezone and a reference Unix timestamp, the
//! crate frames the local-noon-to-local-noon night containing that moment and
//! computes sunrise, sunset and twilight, calibration windows, observing
//! limits, moon rise/set/transit/illumination and the twilight sky-flat
//! pointing.
//!
//! ```no_run
//! use site_events::{make_site_events, EventName};
//!
//! let timeline = make_site_events(34.0, -119.0, 1_596_308_460.0, "America/Los_Angeles")?;
//! let sunset = timeline.get(EventName::SunSet).expect("always present");
//! println!("sunset at {sunset}");
//! for (name, jd) in timeline.to_julian_days() {
//!     println!("{name:>25}  {jd:.6}");
//! }
//! # Ok::<(), site_events::EventsError>(())
//! ```
//!
//! # Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`instant`] | [`Time<S>`] and the [`TimeInstant`] (TAI) alias |
//! | [`scales`] | [`TT`], [`TAI`], [`UTC`], [`UnixTime`] markers and leap seconds |
//! | [`period`] | [`Period<S>`] windows |
//! | [`zone`] | IANA timezones, local noon, ISO UTC strings |
//! | [`ephemeris`] | Sun and Moon positions via `siderust` |
//! | [`site`] | [`Observer`] and the noon-to-noon [`SiteContext`] |
//! | [`search`] | generic discrete-event root finding |
//! | [`riseset`] | solar threshold crossings |
//! | [`lunar`] | moon rise/set, transit and illumination |
//! | [`flats`] | sky-flat pointing and drift |
//! | [`events`] | the nightly timeline compiler |
//! | [`config`] | calibration durations |
//!
//! # Time axes
//!
//! All instants are TAI Julian days.  Offsets are applied directly on that
//! axis, never through a calendar round-trip.  Leap seconds are applied when
//! converting to and from civil UTC.

pub mod config;
pub mod ephemeris;
mod error;
pub mod events;
pub mod flats;
pub mod instant;
pub mod lunar;
pub mod period;
pub mod riseset;
pub mod scales;
pub mod search;
pub mod site;
pub mod zone;

// ── Re-exports ────────────────────────────────────────────────────────────

pub use config::CalibrationDurations;
pub use ephemeris::{Ephemeris, Precision};
pub use error::{EventsError, EventsResult};
pub use events::{
    compile_site_events, make_site_events, EventName, MorningCalibration, SiteEventTimeline,
    SiteEvents,
};
pub use flats::{compute_flat_vector, FlatSpotVector};
pub use instant::{Time, TimeInstant, TimeScale};
pub use lunar::{find_moon_events, moon_rise_set_illumination, MoonCycle, MoonEvent};
pub use period::Period;
pub use riseset::{find_threshold_crossings, RiseSetPair};
pub use scales::{UnixTime, TAI, TT, UTC};
pub use site::{Observer, SiteContext};
