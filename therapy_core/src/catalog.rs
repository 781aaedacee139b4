//! Built-in activity preset catalog.
//!
//! Provides the stock workout/activity presets shipped with the system.

use crate::duration::OverrideDuration;
use crate::types::{ActivityPreset, ActivityType};

/// Build the default activity presets, one per built-in activity type, each
/// carrying its stock target range and insulin-needs scale factor
pub fn build_default_activity_presets(duration: OverrideDuration) -> Vec<ActivityPreset> {
    ActivityType::ALL
        .into_iter()
        .map(|activity_type| ActivityPreset {
            activity_type,
            preset: activity_type.default_preset(duration),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GlucoseUnit, Quantity};

    #[test]
    fn test_default_catalog_covers_all_activities() {
        let duration = OverrideDuration::finite(3600.0).unwrap();
        let presets = build_default_activity_presets(duration);

        assert_eq!(presets.len(), ActivityType::ALL.len());
        for preset in &presets {
            assert_eq!(preset.preset.duration, duration);
            assert!(!preset.is_modified_from_default());

            let factor = preset.preset.settings.effective_insulin_needs_scale_factor();
            assert!(factor > 0.0 && factor < 1.0);

            let range = preset.preset.settings.target_range.unwrap();
            assert!(range.contains(Quantity::new(160.0, GlucoseUnit::MilligramsPerDeciliter)));
        }
    }

    #[test]
    fn test_jogging_has_lowest_insulin_needs() {
        let duration = OverrideDuration::Indefinite;
        let presets = build_default_activity_presets(duration);

        let jogging = presets
            .iter()
            .find(|p| p.activity_type == ActivityType::Jogging)
            .unwrap();
        assert_eq!(
            jogging.preset.settings.effective_insulin_needs_scale_factor(),
            0.2
        );
    }
}
