#![forbid(unsafe_code)]

//! Core domain model and override-timeline engine for diabetes therapy
//! settings.
//!
//! This crate provides:
//! - Domain types (durations, quantities, preset settings, schedule entries)
//! - Temporary schedule overrides with actual-vs-scheduled end semantics
//! - Recurring preset next-occurrence scheduling
//! - Timeline overlay for sensitivity, basal, carb-ratio, and target policies
//! - Configuration and logging
//!
//! All engine operations are pure functions over immutable value inputs and
//! may be called from any thread without synchronization. Persistence and
//! delivery of overrides belong to collaborating stores, not this crate.

pub mod duration;
pub mod error;
pub mod schedule;
pub mod types;
pub mod timeline;
pub mod overrides;
pub mod overlay;
pub mod catalog;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use catalog::build_default_activity_presets;
pub use config::Config;
pub use duration::OverrideDuration;
pub use error::{Error, Result};
pub use overlay::{
    apply_basal, apply_carb_ratio, apply_sensitivity, apply_sensitivity_quantity, apply_target,
};
pub use overrides::{EnactTrigger, OverrideContext, OverrideEnd, TemporaryScheduleOverride};
pub use schedule::{RepeatDays, TemporaryPreset};
pub use timeline::{is_continuous_timeline, DateInterval, ScheduleEntry};
pub use types::*;
