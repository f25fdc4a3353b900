// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Time period implementation.
//!
//! [`Period<S>`] is a closed window `[start, end]` on a single time scale.
//! The observing night is a `Period<TAI>` spanning exactly one day.

use super::instant::{Time, TimeScale};
use qtty::Days;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a window between two instants on time scale `S`.
///
/// # Examples
///
/// ```
/// use site_events::{Period, TimeInstant};
/// use qtty::Days;
///
/// let start = TimeInstant::new(2_459_063.0);
/// let night = Period::new(start, start.offset(Days::new(1.0)));
/// assert_eq!(night.duration(), Days::new(1.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Period<S: TimeScale> {
    pub start: Time<S>,
    pub end: Time<S>,
}

impl<S: TimeScale> Period<S> {
    /// Creates a new period between two instants.
    pub fn new(start: Time<S>, end: Time<S>) -> Self {
        Period { start, end }
    }

    /// A period of `length` days beginning at `start`.
    pub fn starting_at(start: Time<S>, length: Days) -> Self {
        Self::new(start, start.offset(length))
    }

    /// Returns the duration of the period as the difference between end and start.
    pub fn duration(&self) -> Days {
        self.end - self.start
    }

    /// `true` when `t` lies inside the closed window.
    pub fn contains(&self, t: Time<S>) -> bool {
        self.start <= t && t <= self.end
    }

    /// Instant halfway between start and end.
    pub fn midpoint(&self) -> Time<S> {
        self.start.mean(self.end)
    }

    /// Clamp `t` into the window.
    pub fn clamp(&self, t: Time<S>) -> Time<S> {
        t.max(self.start).min(self.end)
    }

    /// Convert this period to another time scale.
    ///
    /// Each endpoint is converted preserving the represented absolute interval.
    pub fn to<T: TimeScale>(&self) -> Period<T> {
        Period::new(self.start.to::<T>(), self.end.to::<T>())
    }
}

impl<S: TimeScale> fmt::Display for Period<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}
