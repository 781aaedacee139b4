//! Scheduled duration of a temporary override.
//!
//! An override either runs for a fixed number of seconds or stays active
//! indefinitely until cancelled. Durations order by effective length, with
//! indefinite longer than any finite span.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::{Error, Result};

/// Scheduled length of an override: a fixed span or open-ended.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverrideDuration {
    Finite { seconds: f64 },
    Indefinite,
}

impl OverrideDuration {
    /// Create a finite duration.
    ///
    /// Fails for zero, negative, or non-finite seconds. A zero-length
    /// override is meaningless; callers must validate user input before
    /// reaching this point.
    pub fn finite(seconds: f64) -> Result<Self> {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(Error::InvalidDuration(format!(
                "duration must be a positive number of seconds, got {}",
                seconds
            )));
        }
        Ok(OverrideDuration::Finite { seconds })
    }

    /// Effective length in seconds; `f64::INFINITY` when indefinite.
    pub fn as_seconds(&self) -> f64 {
        match self {
            OverrideDuration::Finite { seconds } => *seconds,
            OverrideDuration::Indefinite => f64::INFINITY,
        }
    }

    pub fn is_finite(&self) -> bool {
        matches!(self, OverrideDuration::Finite { .. })
    }

    pub fn is_indefinite(&self) -> bool {
        matches!(self, OverrideDuration::Indefinite)
    }
}

impl PartialOrd for OverrideDuration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        // as_seconds is never NaN for a validly-constructed duration
        self.as_seconds().partial_cmp(&other.as_seconds())
    }
}
