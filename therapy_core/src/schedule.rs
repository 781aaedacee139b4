//! Repeating preset schedules and next-occurrence computation.
//!
//! A preset may be bound to a weekly schedule: an anchor instant supplying
//! the time of day, plus a set of weekday flags. The scheduler computes the
//! next occurrence strictly after a given instant, in a caller-supplied
//! timezone.

use chrono::{DateTime, Datelike, Days, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::duration::OverrideDuration;
use crate::overrides::{EnactTrigger, OverrideContext, TemporaryScheduleOverride};
use crate::types::PresetSettings;
use crate::Result;

// ============================================================================
// Repeat Days
// ============================================================================

/// Set of weekdays a preset repeats on, one bit per day (bit 0 = Sunday)
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct RepeatDays(u8);

impl RepeatDays {
    pub const NONE: RepeatDays = RepeatDays(0);
    pub const SUNDAY: RepeatDays = RepeatDays(1 << 0);
    pub const MONDAY: RepeatDays = RepeatDays(1 << 1);
    pub const TUESDAY: RepeatDays = RepeatDays(1 << 2);
    pub const WEDNESDAY: RepeatDays = RepeatDays(1 << 3);
    pub const THURSDAY: RepeatDays = RepeatDays(1 << 4);
    pub const FRIDAY: RepeatDays = RepeatDays(1 << 5);
    pub const SATURDAY: RepeatDays = RepeatDays(1 << 6);
    pub const EVERY_DAY: RepeatDays = RepeatDays(0x7f);
    pub const WEEKDAYS: RepeatDays = RepeatDays(0x3e);
    pub const WEEKENDS: RepeatDays = RepeatDays(0x41);

    /// Build from a raw bitmask; bits above the seven weekdays are dropped
    pub fn from_bits(bits: u8) -> Self {
        RepeatDays(bits & 0x7f)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 & 0x7f == 0
    }

    pub fn union(self, other: RepeatDays) -> RepeatDays {
        RepeatDays(self.0 | other.0)
    }

    pub fn insert(&mut self, weekday: Weekday) {
        self.0 |= 1 << weekday.num_days_from_sunday();
    }

    pub fn contains(&self, weekday: Weekday) -> bool {
        self.0 & (1 << weekday.num_days_from_sunday()) != 0
    }

    /// The set days in Sunday-first order
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        const DAYS: [Weekday; 7] = [
            Weekday::Sun,
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
        ];
        DAYS.into_iter().filter(move |day| self.contains(*day))
    }
}

// ============================================================================
// Temporary Preset
// ============================================================================

/// A named, reusable override definition, optionally bound to a weekly
/// schedule.
///
/// `schedule_start_date` anchors the time of day; `repeat_days` selects the
/// weekdays. An empty repeat set with an anchor is a one-shot schedule. A
/// non-empty repeat set is only meaningful when the anchor is present.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TemporaryPreset {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub settings: PresetSettings,
    pub duration: OverrideDuration,
    #[serde(default)]
    pub schedule_start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub repeat_days: RepeatDays,
}

impl TemporaryPreset {
    /// Enact this preset as an override beginning at `beginning_at`
    pub fn create_override(
        &self,
        enact_trigger: EnactTrigger,
        beginning_at: DateTime<Utc>,
    ) -> Result<TemporaryScheduleOverride> {
        TemporaryScheduleOverride::new(
            OverrideContext::Preset(self.clone()),
            self.settings.clone(),
            beginning_at,
            self.duration,
            enact_trigger,
            Uuid::new_v4(),
        )
    }

    /// Next scheduled occurrence strictly after `after`, or `None`.
    ///
    /// One-shot presets (empty repeat set) return the anchor only while it is
    /// still in the future; "after" is strict, so exact equality yields
    /// `None`. Repeating presets combine the anchor's local time of day with
    /// the first matching weekday whose resulting instant comes strictly
    /// after `after`. Day boundaries and weekday numbering follow `tz`.
    ///
    /// Pure function of its inputs; safe to call concurrently.
    pub fn next_scheduled_start_after<Tz: TimeZone>(
        &self,
        after: DateTime<Utc>,
        tz: &Tz,
    ) -> Option<DateTime<Utc>> {
        let anchor = self.schedule_start_date?;

        if self.repeat_days.is_empty() {
            return if anchor > after { Some(anchor) } else { None };
        }

        let time_of_day = anchor.with_timezone(tz).time();
        let first_day = after.with_timezone(tz).date_naive();

        // Every weekday is reachable within 7 days; the extra day covers a
        // match on the query day whose time of day has already passed.
        for offset in 0..=7u64 {
            let day = first_day.checked_add_days(Days::new(offset))?;
            if !self.repeat_days.contains(day.weekday()) {
                continue;
            }
            // A local time erased by a DST gap has no instant on that day
            let Some(candidate) = tz.from_local_datetime(&day.and_time(time_of_day)).earliest()
            else {
                continue;
            };
            let candidate = candidate.with_timezone(&Utc);
            if candidate > after {
                tracing::debug!(
                    preset = %self.id,
                    next = %candidate,
                    "Found next scheduled preset start"
                );
                return Some(candidate);
            }
        }
        None
    }
}
