// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Error types for site-event computations.

/// Result type for site-event computations.
pub type EventsResult<T> = Result<T, EventsError>;

/// Error type for site-event computations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EventsError {
    /// Invalid coordinates, unknown timezone, unusable durations.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A horizon threshold was not crossed both ways inside the window.
    #[error("No crossing of the {horizon_degrees}° threshold: found {found} transition(s) in the window")]
    NoCrossing { horizon_degrees: f64, found: usize },

    /// The Moon did not cross the meridian westward inside the transit span.
    #[error("No meridian transit of the Moon within {span_days} days after JD {after}")]
    NoTransit { after: f64, span_days: f64 },

    /// Bisection could not bracket a transition to tolerance.
    #[error("Search did not converge between JD {lo} and JD {hi}")]
    NonConvergence { lo: f64, hi: f64 },

    /// An instant falls outside what the calendar types can represent.
    #[error("Time out of range: JD {0}")]
    TimeOutOfRange(f64),
}

impl EventsError {
    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        EventsError::Configuration(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        let e = EventsError::configuration("unknown timezone 'Mars/Olympus'");
        assert_eq!(
            e.to_string(),
            "Configuration error: unknown timezone 'Mars/Olympus'"
        );

        let e = EventsError::NoCrossing {
            horizon_degrees: 18.0,
            found: 0,
        };
        assert!(e.to_string().contains("18°"));
        assert!(e.to_string().contains("found 0"));

        let e = EventsError::NoTransit {
            after: 2_459_063.5,
            span_days: 1.1,
        };
        assert_eq!(
            e.to_string(),
            "No meridian transit of the Moon within 1.1 days after JD 2459063.5"
        );
    }
}
