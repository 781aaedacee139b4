//! Timeline overlay: merging overrides into baseline schedules.
//!
//! Given a baseline piecewise-constant timeline and a set of overrides, these
//! functions produce a new timeline with override spans merged in. The
//! sensitivity, basal, and carb-ratio policies share one cursor-merge
//! primitive that walks baseline entries and overrides in a single pass; the
//! target policy is a whole-tail replacement with different semantics.
//!
//! Overrides are ordered chronologically by start date internally, so caller
//! ordering never affects the result. When overrides overlap, the earlier
//! start wins for the overlapping span.

use chrono::{DateTime, Utc};

use crate::overrides::TemporaryScheduleOverride;
use crate::timeline::ScheduleEntry;
use crate::types::{GlucoseUnit, Quantity, QuantityRange};

/// Overlay overrides onto an insulin-sensitivity timeline.
///
/// Higher activity lowers insulin need, which raises effective sensitivity,
/// so baseline values are divided by the scale factor.
pub fn apply_sensitivity(
    overrides: &[TemporaryScheduleOverride],
    timeline: &[ScheduleEntry<f64>],
) -> Vec<ScheduleEntry<f64>> {
    apply_transform(overrides, timeline, |value, ovr| {
        value / ovr.settings.effective_insulin_needs_scale_factor()
    })
}

/// Unit-tagged variant of [`apply_sensitivity`].
///
/// Values are normalized to mg/dL before dividing and re-tagged with that
/// unit on output.
pub fn apply_sensitivity_quantity(
    overrides: &[TemporaryScheduleOverride],
    timeline: &[ScheduleEntry<Quantity>],
) -> Vec<ScheduleEntry<Quantity>> {
    apply_transform(overrides, timeline, |quantity, ovr| {
        let value = quantity.value_in(GlucoseUnit::MilligramsPerDeciliter);
        Quantity::new(
            value / ovr.settings.effective_insulin_needs_scale_factor(),
            GlucoseUnit::MilligramsPerDeciliter,
        )
    })
}

/// Overlay overrides onto a basal-rate timeline by scaling rates up with the
/// insulin-needs factor
pub fn apply_basal(
    overrides: &[TemporaryScheduleOverride],
    timeline: &[ScheduleEntry<f64>],
) -> Vec<ScheduleEntry<f64>> {
    apply_transform(overrides, timeline, |value, ovr| {
        value * ovr.settings.effective_insulin_needs_scale_factor()
    })
}

/// Overlay overrides onto a carb-ratio timeline; same scaling direction as
/// basal
pub fn apply_carb_ratio(
    overrides: &[TemporaryScheduleOverride],
    timeline: &[ScheduleEntry<f64>],
) -> Vec<ScheduleEntry<f64>> {
    apply_transform(overrides, timeline, |value, ovr| {
        value * ovr.settings.effective_insulin_needs_scale_factor()
    })
}

/// Overlay overrides onto a glucose-target timeline.
///
/// Unlike the cursor merge used for sensitivity, basal, and carb ratio, this
/// is a whole-tail replacement: the first override (chronologically) that is
/// active at `at` or starts before the timeline's end replaces everything
/// from its start date through the end of the query window — not merely
/// through its own end, and later overlapping overrides are never consulted.
/// That asymmetry is the established product behavior; it is preserved here
/// deliberately and is pending product review rather than a merge bug.
///
/// An override without a target range suppresses replacement entirely, even
/// when a later override does carry one.
pub fn apply_target(
    overrides: &[TemporaryScheduleOverride],
    timeline: &[ScheduleEntry<QuantityRange>],
    at: DateTime<Utc>,
) -> Vec<ScheduleEntry<QuantityRange>> {
    let Some(last) = timeline.last() else {
        return Vec::new();
    };
    let schedule_end = last.end_date;

    let ordered = sorted_by_start(overrides);

    // First active-or-future override wins
    let applicable = ordered
        .iter()
        .find(|o| o.actual_end_date() > at && o.start_date < schedule_end);

    let Some(ovr) = applicable else {
        return timeline.to_vec();
    };
    let Some(target) = ovr.settings.target_range else {
        return timeline.to_vec();
    };

    tracing::debug!(
        sync_identifier = %ovr.sync_identifier,
        from = %ovr.start_date,
        "Applying target override over schedule tail"
    );

    let override_start = ovr.start_date;
    let mut result = Vec::with_capacity(timeline.len() + 1);
    for entry in timeline {
        if entry.start_date < override_start {
            if entry.end_date > override_start {
                result.push(ScheduleEntry {
                    start_date: entry.start_date,
                    end_date: override_start,
                    value: entry.value,
                });
            } else {
                result.push(entry.clone());
            }
        }
    }
    result.push(ScheduleEntry {
        start_date: override_start,
        end_date: schedule_end,
        value: target,
    });
    result
}

fn sorted_by_start(
    overrides: &[TemporaryScheduleOverride],
) -> Vec<&TemporaryScheduleOverride> {
    let mut ordered: Vec<_> = overrides.iter().collect();
    ordered.sort_by_key(|o| o.start_date);
    ordered
}

/// Cursor-merge primitive shared by the per-value transform policies.
///
/// Walks baseline entries in order while advancing a monotonic override
/// cursor, so the whole merge is O(entries + overrides). Sub-entry boundaries
/// are clipped to the intersection of the baseline entry's span and the
/// override's active interval; spans with no active override keep the
/// baseline value. An override spilling past the current baseline entry is
/// held for the next one rather than consumed.
fn apply_transform<T, F>(
    overrides: &[TemporaryScheduleOverride],
    timeline: &[ScheduleEntry<T>],
    transform: F,
) -> Vec<ScheduleEntry<T>>
where
    T: Clone,
    F: Fn(&T, &TemporaryScheduleOverride) -> T,
{
    if timeline.is_empty() {
        return Vec::new();
    }

    let ordered = sorted_by_start(overrides);
    let mut result: Vec<ScheduleEntry<T>> = Vec::with_capacity(timeline.len());
    let mut cursor = 0;

    for entry in timeline {
        let mut start = entry.start_date;

        while cursor < ordered.len() {
            // The entry is fully covered; a later override reaching this
            // boundary would otherwise emit a zero-width sub-entry.
            if start >= entry.end_date {
                break;
            }

            let ovr = ordered[cursor];
            let ovr_end = ovr.actual_end_date();

            // Consumed: the active interval lies at or before the merge
            // position and can never affect later output (half-open ends
            // contribute nothing at their boundary instant).
            if ovr_end <= start {
                cursor += 1;
                continue;
            }

            if ovr.is_active(start) {
                let end = entry.end_date.min(ovr_end);
                result.push(ScheduleEntry {
                    start_date: start,
                    end_date: end,
                    value: transform(&entry.value, ovr),
                });
                if entry.end_date > end {
                    cursor += 1;
                }
                if ovr_end > entry.end_date {
                    // Spills into the next baseline entry
                    break;
                }
                start = end;
            } else if ovr.start_date < entry.end_date {
                result.push(ScheduleEntry {
                    start_date: start,
                    end_date: ovr.start_date,
                    value: entry.value.clone(),
                });
                let end = entry.end_date.min(ovr_end);
                if end > ovr.start_date {
                    result.push(ScheduleEntry {
                        start_date: ovr.start_date,
                        end_date: end,
                        value: transform(&entry.value, ovr),
                    });
                }
                start = end.max(ovr.start_date);
                if ovr_end > entry.end_date {
                    break;
                }
                cursor += 1;
            } else {
                // Next override starts beyond this baseline entry
                break;
            }
        }

        if start < entry.end_date {
            result.push(ScheduleEntry {
                start_date: start,
                end_date: entry.end_date,
                value: entry.value.clone(),
            });
        }
    }

    result
}
