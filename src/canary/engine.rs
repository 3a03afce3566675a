//! Canary split decision.
//!
//! # Algorithm
//! ```text
//! Expiration "<N>h"  → now + N hours, RFC 3339
//! Forced outcome     → used as-is, no sample drawn
//! Otherwise          → r = source.next_unit()
//!                      r <  CanaryPercent → success
//!                      r >= CanaryPercent → fail
//! ```
//!
//! `decide` is pure: the clock and the random source are parameters, so a
//! pinned `(record, now, sample, forced)` always yields the same result.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand::Rng;

use crate::canary::error::{CanaryError, CanaryResult};
use crate::canary::types::{AppRecord, DecisionResult, KeyValue, Outcome};

/// A source of uniform samples in `[0, 1)`.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

/// Adapts any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Always yields the same sample.
#[derive(Debug, Clone, Copy)]
pub struct FixedSample(pub f64);

impl RandomSource for FixedSample {
    fn next_unit(&mut self) -> f64 {
        self.0
    }
}

/// Replays a fixed list of samples, then repeats the last one.
#[derive(Debug, Clone, Default)]
pub struct SampleSequence {
    samples: VecDeque<f64>,
    last: f64,
}

impl SampleSequence {
    pub fn new(samples: impl IntoIterator<Item = f64>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
            last: 0.0,
        }
    }

    /// Samples not yet drawn.
    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

impl RandomSource for SampleSequence {
    fn next_unit(&mut self) -> f64 {
        if let Some(sample) = self.samples.pop_front() {
            self.last = sample;
        }
        self.last
    }
}

/// Parse an expiration of the form `"<hours>h"` into whole hours.
pub fn parse_expiration(spec: &str) -> CanaryResult<u32> {
    let invalid = || CanaryError::InvalidDuration(spec.to_string());

    let digits = spec.strip_suffix('h').ok_or_else(invalid)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    digits.parse::<u32>().map_err(|_| invalid())
}

/// Absolute expiration for a cookie issued at `now`.
pub fn expiration_at(spec: &str, now: DateTime<Utc>) -> CanaryResult<String> {
    let hours = parse_expiration(spec)?;
    let expires = now
        .checked_add_signed(Duration::hours(i64::from(hours)))
        .ok_or_else(|| CanaryError::InvalidDuration(spec.to_string()))?;
    Ok(expires.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Pick a variant for `percent`, drawing from `source` only when no outcome is forced.
pub fn select_outcome(
    percent: f64,
    source: &mut dyn RandomSource,
    forced: Option<Outcome>,
) -> CanaryResult<Outcome> {
    if !(0.0..=1.0).contains(&percent) {
        return Err(CanaryError::InvalidPercent(percent));
    }

    if let Some(outcome) = forced {
        return Ok(outcome);
    }

    if source.next_unit() < percent {
        Ok(Outcome::Success)
    } else {
        Ok(Outcome::Fail)
    }
}

/// Compute the cookie a caller should set for `record`.
pub fn decide(
    record: &AppRecord,
    now: DateTime<Utc>,
    source: &mut dyn RandomSource,
    forced: Option<Outcome>,
) -> CanaryResult<DecisionResult> {
    let cookie = &record.cookie_info;
    let expiration = expiration_at(&cookie.expiration, now)?;
    let outcome = select_outcome(cookie.canary_percent, source, forced)?;

    let KeyValue { key, value } = match outcome {
        Outcome::Success => cookie.if_successful.clone(),
        Outcome::Fail => cookie.if_fail.clone(),
    };

    Ok(DecisionResult {
        key,
        value,
        expiration,
        canary_percent: cookie.canary_percent,
        mode: record.mode.clone(),
        disabled: record.disable.then_some(true),
        outcome,
    })
}
