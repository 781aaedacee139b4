//! Temporary schedule overrides.
//!
//! A [`TemporaryScheduleOverride`] is a single time-bounded adjustment to the
//! baseline therapy schedule: it starts at an absolute instant, runs for a
//! finite or indefinite scheduled duration, and may be cancelled early. Its
//! active interval `[start_date, actual_end_date)` is half-open.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::duration::OverrideDuration;
use crate::schedule::TemporaryPreset;
use crate::timeline::DateInterval;
use crate::types::{ActivityPreset, PresetSettings};
use crate::{Error, Result};

/// Origin of an override; used for display and classification only
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum OverrideContext {
    PreMeal,
    Preset(TemporaryPreset),
    Activity(ActivityPreset),
    Custom,
}

/// Provenance of the enact action
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum EnactTrigger {
    Local,
    Remote(String),
}

/// How an override actually ended, relative to its scheduled end.
///
/// `Deleted` behaves like `Natural` for timeline math; it only excludes the
/// override from historical display, which is a store/UI concern.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum OverrideEnd {
    Natural,
    Early(DateTime<Utc>),
    Deleted,
}

/// A single enacted override instance
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TemporaryScheduleOverride {
    pub context: OverrideContext,
    pub settings: PresetSettings,
    pub start_date: DateTime<Utc>,
    duration: OverrideDuration,
    actual_end: OverrideEnd,
    pub enact_trigger: EnactTrigger,
    pub sync_identifier: Uuid,
}

impl TemporaryScheduleOverride {
    /// Create an override; fails for a non-positive duration
    pub fn new(
        context: OverrideContext,
        settings: PresetSettings,
        start_date: DateTime<Utc>,
        duration: OverrideDuration,
        enact_trigger: EnactTrigger,
        sync_identifier: Uuid,
    ) -> Result<Self> {
        Self::validate_duration(duration)?;
        Ok(TemporaryScheduleOverride {
            context,
            settings,
            start_date,
            duration,
            actual_end: OverrideEnd::Natural,
            enact_trigger,
            sync_identifier,
        })
    }

    fn validate_duration(duration: OverrideDuration) -> Result<()> {
        // Guards against a hand-built `Finite { seconds: 0.0 }` bypassing
        // the OverrideDuration::finite constructor.
        if !(duration.as_seconds() > 0.0) {
            return Err(Error::InvalidOverride(format!(
                "override duration must be positive, got {} seconds",
                duration.as_seconds()
            )));
        }
        Ok(())
    }

    pub fn duration(&self) -> OverrideDuration {
        self.duration
    }

    /// Replace the scheduled duration, re-validating the positivity invariant
    pub fn set_duration(&mut self, duration: OverrideDuration) -> Result<()> {
        Self::validate_duration(duration)?;
        self.duration = duration;
        Ok(())
    }

    pub fn actual_end(&self) -> OverrideEnd {
        self.actual_end
    }

    /// Instant the override is scheduled to end.
    ///
    /// Indefinite durations (and finite spans past the representable range)
    /// report the maximum representable instant.
    pub fn scheduled_end_date(&self) -> DateTime<Utc> {
        match self.duration {
            OverrideDuration::Finite { seconds } => self
                .start_date
                .checked_add_signed(Duration::milliseconds((seconds * 1000.0).round() as i64))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            OverrideDuration::Indefinite => DateTime::<Utc>::MAX_UTC,
        }
    }

    /// Move the scheduled end, deriving a consistent duration.
    ///
    /// The maximum representable instant maps to an indefinite duration.
    /// Fails when the new end does not come strictly after the start.
    pub fn set_scheduled_end_date(&mut self, end: DateTime<Utc>) -> Result<()> {
        if end <= self.start_date {
            return Err(Error::InvalidOverride(format!(
                "scheduled end {} must come after start {}",
                end, self.start_date
            )));
        }
        if end == DateTime::<Utc>::MAX_UTC {
            self.duration = OverrideDuration::Indefinite;
        } else {
            let millis = (end - self.start_date).num_milliseconds();
            self.duration = OverrideDuration::finite(millis as f64 / 1000.0)?;
        }
        Ok(())
    }

    /// Instant the override actually ends: the scheduled end unless it was
    /// cancelled early
    pub fn actual_end_date(&self) -> DateTime<Utc> {
        match self.actual_end {
            OverrideEnd::Early(end) => end,
            OverrideEnd::Natural | OverrideEnd::Deleted => self.scheduled_end_date(),
        }
    }

    /// Elapsed length of the override as actually run
    pub fn actual_duration(&self) -> OverrideDuration {
        if self.actual_end_date() == DateTime::<Utc>::MAX_UTC {
            return OverrideDuration::Indefinite;
        }
        let millis = (self.actual_end_date() - self.start_date).num_milliseconds();
        OverrideDuration::Finite {
            seconds: millis as f64 / 1000.0,
        }
    }

    /// Half-open interval during which the override applies
    pub fn active_interval(&self) -> DateInterval {
        DateInterval::new(self.start_date, self.actual_end_date())
    }

    pub fn scheduled_interval(&self) -> DateInterval {
        DateInterval::new(self.start_date, self.scheduled_end_date())
    }

    /// True iff `at` falls within the half-open active interval
    pub fn is_active(&self, at: DateTime<Utc>) -> bool {
        self.active_interval().contains(at)
    }

    /// True iff `relative_to` is strictly past the actual end
    pub fn has_finished(&self, relative_to: DateTime<Utc>) -> bool {
        relative_to > self.actual_end_date()
    }

    /// Cancel the override at `at`, before its scheduled end.
    ///
    /// `at` must fall within `[start_date, scheduled_end_date]`. Cancelling
    /// an already-cancelled override is rejected rather than overwritten.
    pub fn end_early(&mut self, at: DateTime<Utc>) -> Result<()> {
        if matches!(self.actual_end, OverrideEnd::Early(_)) {
            return Err(Error::InvalidOverride(
                "override has already been ended early".into(),
            ));
        }
        if at < self.start_date || at > self.scheduled_end_date() {
            return Err(Error::InvalidOverride(format!(
                "cancellation instant {} is outside the scheduled interval",
                at
            )));
        }
        tracing::debug!(
            sync_identifier = %self.sync_identifier,
            at = %at,
            "Ending override early"
        );
        self.actual_end = OverrideEnd::Early(at);
        Ok(())
    }

    /// Mark the override removed from history; timeline math is unaffected
    pub fn mark_deleted(&mut self) {
        self.actual_end = OverrideEnd::Deleted;
    }
}
