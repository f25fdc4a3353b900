// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Discrete-event search over a boolean function of time.
//!
//! [`find_discrete`] samples a predicate across a window at a fraction of its
//! rough period, then bisects every sampled sign change down to
//! [`TOLERANCE`].  Every rise/set, twilight and moon search in the crate goes
//! through this one routine.

use log::{debug, trace};
use qtty::{Days, Second};
use serde::Serialize;

use crate::error::{EventsError, EventsResult};
use crate::instant::TimeInstant;
use crate::period::Period;
use crate::scales::TAI;

/// Samples taken per rough period of the predicate.
pub const SAMPLES_PER_PERIOD: f64 = 24.0;

/// Width of the final bracket around a transition (~8.6 ms).
pub const TOLERANCE: Days = Days::new(1e-7);

const MAX_BISECTIONS: u32 = 64;

/// Upper bound on the sample count of one search.
pub const MAX_SAMPLES: f64 = 1_000_000.0;

/// A boolean function of time with a known rough period.
///
/// The period bounds how far apart two transitions can be; sampling at a
/// fraction of it guarantees no pair of transitions falls between samples.
pub trait DiscretePredicate {
    fn holds(&self, t: TimeInstant) -> bool;

    fn rough_period(&self) -> Days;
}

/// Closure adapter for [`DiscretePredicate`].
pub struct FnPredicate<F> {
    f: F,
    rough_period: Days,
}

impl<F> FnPredicate<F>
where
    F: Fn(TimeInstant) -> bool,
{
    pub fn new(rough_period: Days, f: F) -> Self {
        Self { f, rough_period }
    }
}

impl<F> DiscretePredicate for FnPredicate<F>
where
    F: Fn(TimeInstant) -> bool,
{
    fn holds(&self, t: TimeInstant) -> bool {
        (self.f)(t)
    }

    fn rough_period(&self) -> Days {
        self.rough_period
    }
}

/// A transition of the predicate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Crossing {
    pub time: TimeInstant,
    /// `true` when the predicate goes from false to true.
    pub rising: bool,
}

/// Every transition of `predicate` inside `window`, in chronological order.
pub fn find_discrete<P>(window: Period<TAI>, predicate: &P) -> EventsResult<Vec<Crossing>>
where
    P: DiscretePredicate + ?Sized,
{
    let period = predicate.rough_period();
    if !(period.value().is_finite() && period.value() > 0.0) {
        return Err(EventsError::configuration(format!(
            "rough period must be positive, got {} days",
            period.value()
        )));
    }

    let span = window.duration();
    if span.value() <= 0.0 {
        return Ok(Vec::new());
    }

    let samples = samples_for(span, period);
    if !samples.is_finite() || samples > MAX_SAMPLES {
        return Err(EventsError::configuration(format!(
            "window of {} days needs {samples:.0} samples, limit is {MAX_SAMPLES}",
            span.value()
        )));
    }
    let intervals = samples.ceil().max(1.0) as u32;
    let step = span / f64::from(intervals);
    debug!(
        "searching {window} in {intervals} steps of {:.1} s",
        step.to::<Second>().value()
    );

    let mut crossings = Vec::new();
    let mut lo = window.start;
    let mut lo_value = predicate.holds(lo);

    for i in 1..=intervals {
        let hi = if i == intervals {
            window.end
        } else {
            window.start.offset(step * f64::from(i))
        };
        let hi_value = predicate.holds(hi);
        if hi_value != lo_value {
            let time = bisect(predicate, lo, hi, lo_value)?;
            trace!("transition at {time} (rising: {hi_value})");
            crossings.push(Crossing {
                time,
                rising: hi_value,
            });
        }
        lo = hi;
        lo_value = hi_value;
    }

    debug!("{} transition(s) found", crossings.len());
    Ok(crossings)
}

/// Shrink `[lo, hi]` around the single transition it brackets.
fn bisect<P>(
    predicate: &P,
    mut lo: TimeInstant,
    mut hi: TimeInstant,
    lo_value: bool,
) -> EventsResult<TimeInstant>
where
    P: DiscretePredicate + ?Sized,
{
    for _ in 0..MAX_BISECTIONS {
        if hi - lo <= TOLERANCE {
            return Ok(lo.mean(hi));
        }
        let mid = lo.mean(hi);
        if predicate.holds(mid) == lo_value {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Err(EventsError::NonConvergence {
        lo: lo.value(),
        hi: hi.value(),
    })
}

/// Number of samples a window of `span` needs for a predicate of `period`.
fn samples_for(span: Days, period: Days) -> f64 {
    (span.value() / period.value()) * SAMPLES_PER_PERIOD
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(start: f64, days: f64) -> Period<TAI> {
        Period::starting_at(TimeInstant::new(start), Days::new(days))
    }

    #[test]
    fn finds_square_wave_edges() {
        // True on [0.2, 0.7) of every day.
        let pred = FnPredicate::new(Days::new(0.5), |t: TimeInstant| {
            let frac = t.value().rem_euclid(1.0);
            (0.2..0.7).contains(&frac)
        });
        let found = find_discrete(window(100.0, 1.0), &pred).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[0].rising);
        assert!(!found[1].rising);
        assert!((found[0].time.value() - 100.2).abs() < 2e-7);
        assert!((found[1].time.value() - 100.7).abs() < 2e-7);
        assert!(found[0].time < found[1].time);
    }

    #[test]
    fn constant_predicate_has_no_crossings() {
        let pred = FnPredicate::new(Days::new(0.5), |_| true);
        assert!(find_discrete(window(0.0, 1.0), &pred).unwrap().is_empty());
    }

    #[test]
    fn empty_window_has_no_crossings() {
        let pred = FnPredicate::new(Days::new(0.5), |t: TimeInstant| t.value() > 0.5);
        assert!(find_discrete(window(0.0, 0.0), &pred).unwrap().is_empty());
    }

    #[test]
    fn invalid_period_is_rejected() {
        let pred = FnPredicate::new(Days::new(0.0), |_| true);
        assert!(matches!(
            find_discrete(window(0.0, 1.0), &pred),
            Err(EventsError::Configuration(_))
        ));
    }

    #[test]
    fn oversized_window_is_rejected() {
        let pred = FnPredicate::new(Days::new(0.5), |_| true);
        match find_discrete(window(0.0, 1e7), &pred) {
            Err(EventsError::Configuration(msg)) => assert!(msg.contains("samples"), "{msg}"),
            other => panic!("expected Configuration, got {other:?}"),
        }
    }

    #[test]
    fn sine_roots_match_analytic_values() {
        // sin(2π t) > 0 on (0, 0.5) of each unit.
        let pred = FnPredicate::new(Days::new(0.5), |t: TimeInstant| {
            (2.0 * std::f64::consts::PI * t.value()).sin() > 0.0
        });
        let found = find_discrete(window(0.25, 2.0), &pred).unwrap();
        let times: Vec<f64> = found.iter().map(|c| c.time.value()).collect();
        let expected = [0.5, 1.0, 1.5, 2.0];
        assert_eq!(times.len(), expected.len());
        for (got, want) in times.iter().zip(expected) {
            assert!((got - want).abs() < 2e-7, "{got} vs {want}");
        }
        assert_eq!(
            found.iter().map(|c| c.rising).collect::<Vec<_>>(),
            vec![false, true, false, true]
        );
    }

    #[test]
    fn sample_count_scales_with_period() {
        assert_eq!(samples_for(Days::new(1.0), Days::new(0.5)), 48.0);
        assert!(TOLERANCE.to::<Second>().value() < 0.01);
    }
}
