//! Core domain types for therapy settings.
//!
//! This module defines the fundamental value types used throughout the engine:
//! - Glucose units and unit-tagged quantities
//! - Target glucose ranges
//! - Override settings bundles
//! - Built-in activity preset definitions

use serde::{Deserialize, Serialize};

use crate::duration::OverrideDuration;
use crate::schedule::{RepeatDays, TemporaryPreset};
use crate::{Error, Result};

// ============================================================================
// Units and Quantities
// ============================================================================

/// Display/storage unit for blood glucose values
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GlucoseUnit {
    MilligramsPerDeciliter,
    MillimolesPerLiter,
}

impl Default for GlucoseUnit {
    fn default() -> Self {
        GlucoseUnit::MilligramsPerDeciliter
    }
}

impl GlucoseUnit {
    /// Molar mass of glucose gives 18.015588 mg/dL per mmol/L
    pub const MGDL_PER_MMOLL: f64 = 18.015588;

    fn factor_to_mgdl(&self) -> f64 {
        match self {
            GlucoseUnit::MilligramsPerDeciliter => 1.0,
            GlucoseUnit::MillimolesPerLiter => Self::MGDL_PER_MMOLL,
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            GlucoseUnit::MilligramsPerDeciliter => "mg/dL",
            GlucoseUnit::MillimolesPerLiter => "mmol/L",
        }
    }
}

/// A unit-tagged glucose value
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Quantity {
    pub value: f64,
    pub unit: GlucoseUnit,
}

impl Quantity {
    pub fn new(value: f64, unit: GlucoseUnit) -> Self {
        Quantity { value, unit }
    }

    /// The value expressed in `unit`
    pub fn value_in(&self, unit: GlucoseUnit) -> f64 {
        if self.unit == unit {
            self.value
        } else {
            self.value * self.unit.factor_to_mgdl() / unit.factor_to_mgdl()
        }
    }
}

/// A closed glucose range with both bounds sharing one unit
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct QuantityRange {
    lower: f64,
    upper: f64,
    unit: GlucoseUnit,
}

impl QuantityRange {
    /// Create a range; fails when the bounds are inverted or non-finite
    pub fn new(lower: f64, upper: f64, unit: GlucoseUnit) -> Result<Self> {
        if !lower.is_finite() || !upper.is_finite() || lower > upper {
            return Err(Error::InvalidRange(format!(
                "range bounds must be finite with lower <= upper, got {}..{}",
                lower, upper
            )));
        }
        Ok(QuantityRange { lower, upper, unit })
    }

    pub fn lower(&self) -> Quantity {
        Quantity::new(self.lower, self.unit)
    }

    pub fn upper(&self) -> Quantity {
        Quantity::new(self.upper, self.unit)
    }

    pub fn unit(&self) -> GlucoseUnit {
        self.unit
    }

    /// Both bounds expressed in `unit`
    pub fn bounds_in(&self, unit: GlucoseUnit) -> (f64, f64) {
        (self.lower().value_in(unit), self.upper().value_in(unit))
    }

    /// The same range re-expressed in `unit`
    pub fn with_unit(&self, unit: GlucoseUnit) -> QuantityRange {
        let (lower, upper) = self.bounds_in(unit);
        QuantityRange { lower, upper, unit }
    }

    pub fn contains(&self, quantity: Quantity) -> bool {
        let value = quantity.value_in(self.unit);
        self.lower <= value && value <= self.upper
    }
}

// ============================================================================
// Override Settings
// ============================================================================

/// Value bundle an override carries while active.
///
/// The insulin-needs scale factor is a positive multiplier applied to basal
/// and carb-ratio math, and inversely to sensitivity. Absent values fall back
/// to the baseline schedule (factor 1.0, no target replacement).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PresetSettings {
    pub target_range: Option<QuantityRange>,
    insulin_needs_scale_factor: Option<f64>,
}

impl PresetSettings {
    /// Create a settings bundle; fails for a non-positive scale factor
    pub fn new(
        target_range: Option<QuantityRange>,
        insulin_needs_scale_factor: Option<f64>,
    ) -> Result<Self> {
        if let Some(factor) = insulin_needs_scale_factor {
            if !factor.is_finite() || factor <= 0.0 {
                return Err(Error::InvalidOverride(format!(
                    "insulin needs scale factor must be positive, got {}",
                    factor
                )));
            }
        }
        Ok(PresetSettings {
            target_range,
            insulin_needs_scale_factor,
        })
    }

    pub fn insulin_needs_scale_factor(&self) -> Option<f64> {
        self.insulin_needs_scale_factor
    }

    /// Scale factor with the no-adjustment default applied
    pub fn effective_insulin_needs_scale_factor(&self) -> f64 {
        self.insulin_needs_scale_factor.unwrap_or(1.0)
    }
}

// ============================================================================
// Activity Presets
// ============================================================================

/// Built-in activity classifications with stock override settings
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Biking,
    Jogging,
    Walking,
    StrengthTraining,
}

impl ActivityType {
    pub const ALL: [ActivityType; 4] = [
        ActivityType::Biking,
        ActivityType::Jogging,
        ActivityType::Walking,
        ActivityType::StrengthTraining,
    ];

    fn slug(&self) -> &'static str {
        match self {
            ActivityType::Biking => "biking",
            ActivityType::Jogging => "jogging",
            ActivityType::Walking => "walking",
            ActivityType::StrengthTraining => "strength_training",
        }
    }

    /// Stable preset identifier, e.g. `activity-biking`
    pub fn id(&self) -> String {
        format!("activity-{}", self.slug())
    }

    pub fn from_id(id: &str) -> Option<Self> {
        let slug = id.strip_prefix("activity-")?;
        Self::ALL.into_iter().find(|t| t.slug() == slug)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ActivityType::Biking => "figure.outdoor.cycle",
            ActivityType::Jogging => "figure.run",
            ActivityType::Walking => "figure.walk",
            ActivityType::StrengthTraining => "figure.strengthtraining.traditional",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActivityType::Biking => "Biking",
            ActivityType::Jogging => "Jogging",
            ActivityType::Walking => "Walking",
            ActivityType::StrengthTraining => "Strength Training",
        }
    }

    pub fn default_insulin_needs_scale_factor(&self) -> f64 {
        match self {
            ActivityType::Biking => 0.25,
            ActivityType::Jogging => 0.2,
            ActivityType::Walking => 0.25,
            ActivityType::StrengthTraining => 0.35,
        }
    }

    pub fn default_target_range(&self) -> QuantityRange {
        QuantityRange {
            lower: 150.0,
            upper: 170.0,
            unit: GlucoseUnit::MilligramsPerDeciliter,
        }
    }

    /// Stock preset for this activity with the given duration
    pub fn default_preset(&self, duration: OverrideDuration) -> TemporaryPreset {
        TemporaryPreset {
            id: self.id(),
            symbol: self.symbol().to_string(),
            name: self.name().to_string(),
            settings: PresetSettings {
                target_range: Some(self.default_target_range()),
                insulin_needs_scale_factor: Some(self.default_insulin_needs_scale_factor()),
            },
            duration,
            schedule_start_date: None,
            repeat_days: RepeatDays::NONE,
        }
    }
}

/// A preset bound to one of the built-in activity types
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ActivityPreset {
    pub activity_type: ActivityType,
    pub preset: TemporaryPreset,
}

impl ActivityPreset {
    pub fn new(activity_type: ActivityType, preset: TemporaryPreset) -> Self {
        ActivityPreset {
            activity_type,
            preset,
        }
    }

    /// Recover the activity type from a preset's identifier
    pub fn from_preset(preset: TemporaryPreset) -> Option<Self> {
        let activity_type = ActivityType::from_id(&preset.id)?;
        Some(ActivityPreset {
            activity_type,
            preset,
        })
    }

    /// True when the user has edited the stock settings or duration
    pub fn is_modified_from_default(&self) -> bool {
        self.preset != self.activity_type.default_preset(self.preset.duration)
    }
}
