// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Solar and lunar positions from `siderust`.
//!
//! [`Ephemeris`] is the read-only handle every search evaluates against.  It
//! carries the `siderust` astronomical context (IERS Earth orientation
//! table); the process-wide instance is built lazily on first use by
//! [`Ephemeris::shared`] and never mutated afterwards.
//!
//! Instants are taken on the TAI axis.  The Sun comes from VSOP87 and the
//! Moon from ELP2000, both evaluated in TT.  Earth rotation uses UT1 from the
//! IERS `dUT1` series.

use once_cell::sync::Lazy;
use qtty::{AstronomicalUnit, Degrees, Kilometer, Meters};
use serde::{Deserialize, Serialize};
use siderust::astro::earth_rotation::jd_ut1_from_tt_eop;
use siderust::astro::nutation::nutation_iau2000b;
use siderust::astro::precession::precession_nutation_matrix;
use siderust::astro::sidereal::gast_iau2006;
use siderust::bodies::solar_system::{Moon, Sun};
use siderust::calculus::ephemeris::Ephemeris as _;
use siderust::calculus::lunar::meeus_ch47::moon_position_meeus_ch47;
use siderust::coordinates::centers::{Geocentric, Geodetic, Heliocentric};
use siderust::coordinates::transform::context::DefaultEphemeris;
use siderust::coordinates::transform::{AstroContext, FromHorizontal, Transform, TransformFrame};
use siderust::coordinates::{cartesian, frames, spherical};
use siderust::time::JulianDate;

use crate::instant::TimeInstant;
use crate::scales::{TT, UTC};
use crate::site::Observer;

/// Which lunar model to evaluate.
///
/// `Full` is the topocentric ELP2000 position; `Low` is the geocentric
/// Meeus ch. 47 model, enough to time a meridian transit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    #[default]
    Full,
    Low,
}

/// An equatorial direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Equatorial {
    pub right_ascension: Degrees,
    pub declination: Degrees,
}

impl Equatorial {
    /// Right ascension in hours, [0, 24).
    pub fn ra_hours(&self) -> f64 {
        wrap_360(self.right_ascension.value()) / 15.0
    }

    /// Great-circle distance to `other`.
    pub fn separation(&self, other: &Equatorial) -> Degrees {
        self.direction().angular_separation(&other.direction())
    }

    fn direction(&self) -> spherical::Direction<frames::EquatorialMeanJ2000> {
        spherical::Direction::new_raw(self.declination, self.right_ascension)
    }
}

/// Topocentric altitude and azimuth (azimuth from north through east).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Horizontal {
    pub altitude: Degrees,
    pub azimuth: Degrees,
}

impl Horizontal {
    pub fn new(altitude: f64, azimuth: f64) -> Self {
        Self {
            altitude: Degrees::new(altitude),
            azimuth: Degrees::new(azimuth),
        }
    }
}

static SHARED: Lazy<Ephemeris> = Lazy::new(Ephemeris::new);

/// Read-only ephemeris handle.
#[derive(Debug, Clone)]
pub struct Ephemeris {
    context: AstroContext,
}

impl Default for Ephemeris {
    fn default() -> Self {
        Self::new()
    }
}

fn site(observer: &Observer) -> Geodetic<frames::ECEF> {
    Geodetic::<frames::ECEF>::new(observer.longitude, observer.latitude, Meters::new(0.0))
}

#[inline]
fn jd_tt(t: TimeInstant) -> JulianDate {
    JulianDate::new(t.to::<TT>().value())
}

fn wrap_360(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

fn wrap_180(deg: f64) -> f64 {
    (deg + 180.0).rem_euclid(360.0) - 180.0
}

impl Ephemeris {
    /// Build a private ephemeris.  Most callers want [`Ephemeris::shared`].
    pub fn new() -> Self {
        log::debug!("ephemeris context ready (VSOP87, ELP2000, IERS EOP)");
        Self {
            context: AstroContext::default(),
        }
    }

    /// The process-wide ephemeris, initialised on first call.
    pub fn shared() -> &'static Ephemeris {
        &SHARED
    }

    fn jd_ut1(&self, t: TimeInstant) -> JulianDate {
        let eop = self.context.eop_at(JulianDate::new(t.to::<UTC>().value()));
        jd_ut1_from_tt_eop(jd_tt(t), &eop)
    }

    /// Geocentric apparent position of the Sun, true equator of date.
    pub fn sun_equatorial(&self, t: TimeInstant) -> Equatorial {
        let sun = Sun::get_apparent_geocentric_equ::<AstronomicalUnit>(jd_tt(t));
        Equatorial {
            right_ascension: sun.azimuth,
            declination: sun.polar,
        }
    }

    /// Apparent position of the Moon, true equator of date.
    ///
    /// `Full` is topocentric for `observer`; `Low` is geocentric.
    pub fn moon_equatorial(
        &self,
        observer: &Observer,
        t: TimeInstant,
        precision: Precision,
    ) -> Equatorial {
        match precision {
            Precision::Full => {
                let moon =
                    Moon::get_apparent_topocentric_equ::<Kilometer>(jd_tt(t), site(observer));
                Equatorial {
                    right_ascension: moon.azimuth,
                    declination: moon.polar,
                }
            }
            Precision::Low => {
                let moon = moon_position_meeus_ch47(jd_tt(t));
                Equatorial {
                    right_ascension: Degrees::new(moon.ra.value().to_degrees()),
                    declination: Degrees::new(moon.dec.value().to_degrees()),
                }
            }
        }
    }

    /// Local apparent sidereal time at the observer, [0, 360).
    pub fn local_sidereal_degrees(&self, observer: &Observer, t: TimeInstant) -> Degrees {
        let tt = jd_tt(t);
        let nut = nutation_iau2000b(tt);
        let gast = gast_iau2006(self.jd_ut1(t), tt, nut.dpsi, nut.true_obliquity());
        Degrees::new(wrap_360(gast.value().to_degrees() + observer.longitude.value()))
    }

    /// Hour angle of a right ascension at the observer, [-180, 180).
    pub fn hour_angle(&self, observer: &Observer, t: TimeInstant, ra: Degrees) -> Degrees {
        let lst = self.local_sidereal_degrees(observer, t).value();
        Degrees::new(wrap_180(lst - ra.value()))
    }

    /// Topocentric altitude/azimuth of the Sun, without refraction.
    pub fn sun_altaz(&self, observer: &Observer, t: TimeInstant) -> Horizontal {
        let sun = Sun::get_horizontal::<AstronomicalUnit>(jd_tt(t), site(observer));
        Horizontal {
            altitude: sun.polar,
            azimuth: sun.azimuth,
        }
    }

    /// Topocentric altitude/azimuth of the Moon's centre, without refraction.
    pub fn moon_altaz(&self, observer: &Observer, t: TimeInstant) -> Horizontal {
        let moon = Moon::get_horizontal::<Kilometer>(jd_tt(t), site(observer));
        Horizontal {
            altitude: moon.polar,
            azimuth: moon.azimuth,
        }
    }

    /// Hour angle of the Moon, [-180, 180).  Zero at upper culmination.
    pub fn moon_hour_angle(
        &self,
        observer: &Observer,
        t: TimeInstant,
        precision: Precision,
    ) -> Degrees {
        let moon = self.moon_equatorial(observer, t, precision);
        self.hour_angle(observer, t, moon.right_ascension)
    }

    /// Sky direction at `horizontal` as seen by the observer at `t`, in J2000.
    pub fn radec_from_altaz(
        &self,
        observer: &Observer,
        t: TimeInstant,
        horizontal: Horizontal,
    ) -> Equatorial {
        let tt = jd_tt(t);
        let altaz = spherical::Direction::<frames::Horizontal>::new_raw(
            horizontal.altitude,
            Degrees::new(wrap_360(horizontal.azimuth.value())),
        )
        .to_cartesian();
        let of_date = altaz.to_equatorial(&self.jd_ut1(t), &tt, &site(observer));

        let nut = nutation_iau2000b(tt);
        let [x, y, z] = precession_nutation_matrix(tt, nut.dpsi, nut.deps)
            .transpose()
            .apply_array([of_date.x(), of_date.y(), of_date.z()]);
        Equatorial {
            right_ascension: Degrees::new(wrap_360(y.atan2(x).to_degrees())),
            declination: Degrees::new(z.clamp(-1.0, 1.0).asin().to_degrees()),
        }
    }

    /// Illuminated fraction of the lunar disk, [0, 1], seen from the geocentre.
    pub fn moon_illumination(&self, t: TimeInstant) -> f64 {
        let tt = jd_tt(t);

        let helio = cartesian::position::EclipticMeanJ2000::<Kilometer, Heliocentric>::CENTER;
        let sun: cartesian::position::EquatorialMeanJ2000<Kilometer, Geocentric> =
            helio.transform(tt);
        let moon: cartesian::Position<Geocentric, frames::EquatorialMeanJ2000, Kilometer> =
            TransformFrame::to_frame(&DefaultEphemeris::moon_geocentric(tt));

        let s = [sun.x().value(), sun.y().value(), sun.z().value()];
        let m = [moon.x().value(), moon.y().value(), moon.z().value()];
        let to_sun = [s[0] - m[0], s[1] - m[1], s[2] - m[2]];
        let to_earth = [-m[0], -m[1], -m[2]];

        let dot: f64 = to_sun.iter().zip(&to_earth).map(|(a, b)| a * b).sum();
        let norm = |v: &[f64; 3]| v.iter().map(|c| c * c).sum::<f64>().sqrt();
        let cos_phase = (dot / (norm(&to_sun) * norm(&to_earth))).clamp(-1.0, 1.0);
        ((1.0 + cos_phase) / 2.0).clamp(0.0, 1.0)
    }
}
