use chrono::{DateTime, FixedOffset, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use therapy_core::*;

#[derive(Parser)]
#[command(name = "therapy")]
#[command(about = "Therapy override timeline inspector", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in activity presets
    Presets,

    /// Compute the next scheduled occurrence for presets in a JSON file
    Next {
        /// JSON file containing an array of presets
        #[arg(long)]
        presets: PathBuf,

        /// Compute occurrences strictly after this instant (RFC 3339);
        /// defaults to now
        #[arg(long)]
        after: Option<String>,

        /// Local timezone as a whole-hours offset from UTC
        #[arg(long, default_value_t = 0)]
        utc_offset_hours: i32,
    },

    /// Show active/finished state for overrides in a JSON file
    Status {
        /// JSON file containing an array of overrides
        #[arg(long)]
        overrides: PathBuf,

        /// Instant to evaluate (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<String>,
    },

    /// Apply an overlay policy to a baseline timeline and print the result
    Overlay {
        /// One of: sensitivity, basal, carb-ratio, target
        #[arg(long)]
        policy: String,

        /// JSON file containing the baseline timeline
        #[arg(long)]
        baseline: PathBuf,

        /// JSON file containing an array of overrides
        #[arg(long)]
        overrides: PathBuf,

        /// Reference instant for the target policy (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<String>,
    },
}

fn main() -> Result<()> {
    therapy_core::logging::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Presets => cmd_presets(),
        Commands::Next {
            presets,
            after,
            utc_offset_hours,
        } => cmd_next(&presets, after.as_deref(), utc_offset_hours),
        Commands::Status { overrides, at } => cmd_status(&overrides, at.as_deref()),
        Commands::Overlay {
            policy,
            baseline,
            overrides,
            at,
        } => cmd_overlay(&policy, &baseline, &overrides, at.as_deref()),
    }
}

fn parse_instant(value: Option<&str>) -> Result<DateTime<Utc>> {
    match value {
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Error::Other(format!("Invalid RFC 3339 instant '{}': {}", s, e))),
        None => Ok(Utc::now()),
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn cmd_presets() -> Result<()> {
    let config = Config::load()?;
    let duration = OverrideDuration::finite(config.presets.default_duration_seconds)?;
    let unit = config.display.unit;

    println!("Built-in activity presets:");
    for activity in build_default_activity_presets(duration) {
        let settings = &activity.preset.settings;
        let factor = settings.effective_insulin_needs_scale_factor();
        let target = settings
            .target_range
            .map(|range| {
                let (lower, upper) = range.bounds_in(unit);
                format!("{:.1}-{:.1} {}", lower, upper, unit.abbreviation())
            })
            .unwrap_or_else(|| "baseline".into());

        println!(
            "  {:<18} insulin needs x{:.2}, target {}",
            activity.preset.name, factor, target
        );
    }

    Ok(())
}

fn cmd_next(presets_path: &Path, after: Option<&str>, utc_offset_hours: i32) -> Result<()> {
    let after = parse_instant(after)?;
    let tz = FixedOffset::east_opt(utc_offset_hours * 3600)
        .ok_or_else(|| Error::Other(format!("Invalid UTC offset: {}h", utc_offset_hours)))?;

    let presets: Vec<TemporaryPreset> = load_json(presets_path)?;
    if presets.is_empty() {
        println!("No presets found in {}", presets_path.display());
        return Ok(());
    }

    println!("Next occurrences after {}:", after.to_rfc3339());
    for preset in &presets {
        match preset.next_scheduled_start_after(after, &tz) {
            Some(next) => println!("  {:<18} {}", preset.name, next.to_rfc3339()),
            None => println!("  {:<18} no upcoming occurrence", preset.name),
        }
    }

    Ok(())
}

fn cmd_status(overrides_path: &Path, at: Option<&str>) -> Result<()> {
    let at = parse_instant(at)?;
    let overrides: Vec<TemporaryScheduleOverride> = load_json(overrides_path)?;

    println!("Override status at {}:", at.to_rfc3339());
    for (index, ovr) in overrides.iter().enumerate() {
        let state = if ovr.is_active(at) {
            let end = ovr.actual_end_date();
            if end == DateTime::<Utc>::MAX_UTC {
                "active indefinitely".to_string()
            } else {
                format!("active until {}", end.to_rfc3339())
            }
        } else if ovr.has_finished(at) {
            format!("finished at {}", ovr.actual_end_date().to_rfc3339())
        } else {
            format!("starts at {}", ovr.start_date.to_rfc3339())
        };

        println!("  [{}] {} ({})", index, state, describe_context(&ovr.context));
    }

    Ok(())
}

fn describe_context(context: &OverrideContext) -> &str {
    match context {
        OverrideContext::PreMeal => "pre-meal",
        OverrideContext::Preset(preset) => preset.name.as_str(),
        OverrideContext::Activity(activity) => activity.activity_type.name(),
        OverrideContext::Custom => "custom",
    }
}

fn cmd_overlay(
    policy: &str,
    baseline_path: &Path,
    overrides_path: &Path,
    at: Option<&str>,
) -> Result<()> {
    let overrides: Vec<TemporaryScheduleOverride> = load_json(overrides_path)?;

    let output = match policy {
        "sensitivity" => {
            let baseline: Vec<ScheduleEntry<f64>> = load_json(baseline_path)?;
            serde_json::to_string_pretty(&apply_sensitivity(&overrides, &baseline))?
        }
        "basal" => {
            let baseline: Vec<ScheduleEntry<f64>> = load_json(baseline_path)?;
            serde_json::to_string_pretty(&apply_basal(&overrides, &baseline))?
        }
        "carb-ratio" => {
            let baseline: Vec<ScheduleEntry<f64>> = load_json(baseline_path)?;
            serde_json::to_string_pretty(&apply_carb_ratio(&overrides, &baseline))?
        }
        "target" => {
            let at = parse_instant(at)?;
            let baseline: Vec<ScheduleEntry<QuantityRange>> = load_json(baseline_path)?;
            serde_json::to_string_pretty(&apply_target(&overrides, &baseline, at))?
        }
        other => {
            return Err(Error::Other(format!(
                "Unknown policy '{}'; expected sensitivity, basal, carb-ratio, or target",
                other
            )));
        }
    };

    println!("{}", output);
    Ok(())
}
