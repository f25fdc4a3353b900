// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Scale-tagged Julian-day instants.
//!
//! [`Time<S>`] stores a single [`Days`] quantity whose meaning is fixed at
//! compile time by the marker `S: TimeScale`.  Every cross-scale conversion
//! routes through the canonical **JD(TT)** axis, so adding a scale only means
//! writing its two offset functions.
//!
//! The site-events engine works on [`TimeInstant`] (`Time<TAI>`): a uniform,
//! leap-second-free axis on which day-fraction offsets compose exactly.

use chrono::{DateTime, Utc};
use qtty::{Day, Days, Second, Seconds};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::scales::{UnixTime, TAI};

// ═══════════════════════════════════════════════════════════════════════════
// TimeScale trait
// ═══════════════════════════════════════════════════════════════════════════

/// Marker trait for time scales.
///
/// A scale defines a display label and the pair of conversions between its
/// native day count and an absolute Julian Day in Terrestrial Time.
pub trait TimeScale: Copy + Clone + std::fmt::Debug + PartialEq + PartialOrd + 'static {
    /// Display label used by [`Time`] formatting.
    const LABEL: &'static str;

    /// Convert a quantity in this scale's native unit to an absolute JD(TT).
    fn to_jd_tt(value: Days) -> Days;

    /// Convert an absolute JD(TT) back to this scale's native quantity.
    fn from_jd_tt(jd_tt: Days) -> Days;
}

// ═══════════════════════════════════════════════════════════════════════════
// Time<S>
// ═══════════════════════════════════════════════════════════════════════════

/// A point on time scale `S`.
///
/// `Time<S>` is layout-identical to a single `f64`; the marker is zero-sized.
/// Instances are immutable: arithmetic always yields a new value.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Time<S: TimeScale> {
    quantity: Days,
    _scale: PhantomData<S>,
}

/// The engine's instant type: a Julian day on the TAI axis.
pub type TimeInstant = Time<TAI>;

impl<S: TimeScale> Time<S> {
    /// Create from a raw scalar (days on this scale's axis).
    #[inline]
    pub const fn new(value: f64) -> Self {
        Self {
            quantity: Days::new(value),
            _scale: PhantomData,
        }
    }

    /// Create from a [`Days`] quantity.
    #[inline]
    pub const fn from_days(days: Days) -> Self {
        Self {
            quantity: days,
            _scale: PhantomData,
        }
    }

    /// The underlying quantity in days.
    #[inline]
    pub const fn quantity(&self) -> Days {
        self.quantity
    }

    /// The underlying scalar value in days.
    #[inline]
    pub const fn value(&self) -> f64 {
        self.quantity.value()
    }

    /// Absolute Julian Day (TT) corresponding to this instant.
    #[inline]
    pub fn julian_day(&self) -> Days {
        S::to_jd_tt(self.quantity)
    }

    /// Build an instant from an absolute Julian Day (TT).
    #[inline]
    pub fn from_julian_day(jd_tt: Days) -> Self {
        Self::from_days(S::from_jd_tt(jd_tt))
    }

    /// Convert this instant to another time scale through JD(TT).
    #[inline]
    pub fn to<T: TimeScale>(&self) -> Time<T> {
        Time::<T>::from_julian_day(S::to_jd_tt(self.quantity))
    }

    /// A new instant exactly `days` later (or earlier, when negative).
    ///
    /// This is a direct addition on the scale's own axis; no calendar
    /// round-trip is involved, so chained offsets do not accumulate rounding.
    #[inline]
    pub fn offset(self, days: Days) -> Self {
        self + days
    }

    /// Midpoint between two instants on the same scale.
    #[inline]
    pub fn mean(self, other: Self) -> Self {
        self.offset((other - self) * 0.5)
    }

    /// Earlier of two instants.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        if other < self {
            other
        } else {
            self
        }
    }

    /// Later of two instants.
    #[inline]
    pub fn max(self, other: Self) -> Self {
        if other > self {
            other
        } else {
            self
        }
    }

    /// Build an instant from a `chrono::DateTime<Utc>`.
    ///
    /// The civil timestamp is placed on the UTC axis and the leap-second
    /// offset in force at that date is applied on the way to the target scale.
    pub fn from_utc(datetime: DateTime<Utc>) -> Self {
        let seconds = Seconds::new(datetime.timestamp() as f64)
            + Seconds::new(datetime.timestamp_subsec_nanos() as f64 / 1e9);
        Time::<UnixTime>::from_days(seconds.to::<Day>()).to::<S>()
    }

    /// Build an instant from a Unix timestamp in (fractional) seconds.
    pub fn from_unix_seconds(seconds: f64) -> Self {
        Time::<UnixTime>::from_days(Seconds::new(seconds).to::<Day>()).to::<S>()
    }

    /// Unix timestamp in (fractional) seconds for this instant.
    pub fn unix_seconds(&self) -> f64 {
        self.to::<UnixTime>().quantity().to::<Second>().value()
    }

    /// Convert to a `chrono::DateTime<Utc>`.
    ///
    /// Returns `None` if the value falls outside chrono's representable range.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        let seconds = self.unix_seconds();
        if !seconds.is_finite() {
            return None;
        }
        let secs = seconds.floor();
        let nanos = ((seconds - secs) * 1e9).round().min(999_999_999.0) as u32;
        DateTime::<Utc>::from_timestamp(secs as i64, nanos)
    }
}

// ── Display ───────────────────────────────────────────────────────────────

impl<S: TimeScale> std::fmt::Display for Time<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", S::LABEL, self.quantity)
    }
}

// ── Serde ─────────────────────────────────────────────────────────────────

impl<S: TimeScale> Serialize for Time<S> {
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        serializer.serialize_f64(self.value())
    }
}

impl<'de, S: TimeScale> Deserialize<'de> for Time<S> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = f64::deserialize(deserializer)?;
        Ok(Self::new(v))
    }
}

// ── Arithmetic ────────────────────────────────────────────────────────────

impl<S: TimeScale> Add<Days> for Time<S> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Days) -> Self::Output {
        Self::from_days(self.quantity + rhs)
    }
}

impl<S: TimeScale> AddAssign<Days> for Time<S> {
    #[inline]
    fn add_assign(&mut self, rhs: Days) {
        self.quantity += rhs;
    }
}

impl<S: TimeScale> Sub<Days> for Time<S> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Days) -> Self::Output {
        Self::from_days(self.quantity - rhs)
    }
}

impl<S: TimeScale> SubAssign<Days> for Time<S> {
    #[inline]
    fn sub_assign(&mut self, rhs: Days) {
        self.quantity -= rhs;
    }
}

impl<S: TimeScale> Sub for Time<S> {
    type Output = Days;
    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        self.quantity - rhs.quantity
    }
}

impl<S: TimeScale> From<Time<S>> for Days {
    #[inline]
    fn from(time: Time<S>) -> Self {
        time.quantity
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
