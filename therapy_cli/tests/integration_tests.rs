use assert_cmd::Command;
use chrono::{DateTime, TimeZone, Utc};
use predicates::prelude::*;
use uuid::Uuid;

use therapy_core::{
    EnactTrigger, OverrideContext, OverrideDuration, PresetSettings, RepeatDays, ScheduleEntry,
    TemporaryPreset, TemporaryScheduleOverride,
};

fn date(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
}

fn write_json<T: serde::Serialize>(dir: &tempfile::TempDir, name: &str, value: &T) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

fn scale_override(start: DateTime<Utc>, seconds: f64, factor: f64) -> TemporaryScheduleOverride {
    TemporaryScheduleOverride::new(
        OverrideContext::Custom,
        PresetSettings::new(None, Some(factor)).unwrap(),
        start,
        OverrideDuration::finite(seconds).unwrap(),
        EnactTrigger::Local,
        Uuid::new_v4(),
    )
    .unwrap()
}

#[test]
fn test_presets_lists_builtin_activities() {
    let mut cmd = Command::cargo_bin("therapy").unwrap();
    cmd.arg("presets")
        .assert()
        .success()
        .stdout(predicate::str::contains("Biking"))
        .stdout(predicate::str::contains("Jogging"))
        .stdout(predicate::str::contains("Walking"))
        .stdout(predicate::str::contains("Strength Training"));
}

#[test]
fn test_status_reports_active_override() {
    let dir = tempfile::tempdir().unwrap();
    let overrides = vec![scale_override(date(1, 6), 7200.0, 0.5)];
    let path = write_json(&dir, "overrides.json", &overrides);

    let mut cmd = Command::cargo_bin("therapy").unwrap();
    cmd.arg("status")
        .arg("--overrides")
        .arg(&path)
        .arg("--at")
        .arg("2024-01-01T07:00:00Z")
        .assert()
        .success()
        .stdout(predicate::str::contains("active until"))
        .stdout(predicate::str::contains("custom"));
}

#[test]
fn test_status_reports_finished_override() {
    let dir = tempfile::tempdir().unwrap();
    let overrides = vec![scale_override(date(1, 6), 3600.0, 0.5)];
    let path = write_json(&dir, "overrides.json", &overrides);

    let mut cmd = Command::cargo_bin("therapy").unwrap();
    cmd.arg("status")
        .arg("--overrides")
        .arg(&path)
        .arg("--at")
        .arg("2024-01-01T09:00:00Z")
        .assert()
        .success()
        .stdout(predicate::str::contains("finished at"));
}

#[test]
fn test_overlay_basal_splits_timeline() {
    let dir = tempfile::tempdir().unwrap();

    let baseline = vec![ScheduleEntry::new(date(1, 0), date(2, 0), 100.0).unwrap()];
    let overrides = vec![scale_override(date(1, 6), 7200.0, 0.5)];

    let baseline_path = write_json(&dir, "baseline.json", &baseline);
    let overrides_path = write_json(&dir, "overrides.json", &overrides);

    let mut cmd = Command::cargo_bin("therapy").unwrap();
    let output = cmd
        .arg("overlay")
        .arg("--policy")
        .arg("basal")
        .arg("--baseline")
        .arg(&baseline_path)
        .arg("--overrides")
        .arg(&overrides_path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let result: Vec<ScheduleEntry<f64>> = serde_json::from_slice(&output).unwrap();
    assert_eq!(
        result,
        vec![
            ScheduleEntry::new(date(1, 0), date(1, 6), 100.0).unwrap(),
            ScheduleEntry::new(date(1, 6), date(1, 8), 50.0).unwrap(),
            ScheduleEntry::new(date(1, 8), date(2, 0), 100.0).unwrap(),
        ]
    );
}

#[test]
fn test_next_reports_one_shot_preset() {
    let dir = tempfile::tempdir().unwrap();

    let preset = TemporaryPreset {
        id: "afternoon-walk".into(),
        symbol: "figure.walk".into(),
        name: "Afternoon Walk".into(),
        settings: PresetSettings::new(None, Some(0.8)).unwrap(),
        duration: OverrideDuration::finite(1800.0).unwrap(),
        schedule_start_date: Some(date(20, 14)),
        repeat_days: RepeatDays::NONE,
    };
    let path = write_json(&dir, "presets.json", &vec![preset]);

    let mut cmd = Command::cargo_bin("therapy").unwrap();
    cmd.arg("next")
        .arg("--presets")
        .arg(&path)
        .arg("--after")
        .arg("2024-01-15T10:00:00Z")
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-01-20T14:00:00"));
}

#[test]
fn test_next_after_anchor_reports_no_occurrence() {
    let dir = tempfile::tempdir().unwrap();

    let preset = TemporaryPreset {
        id: "afternoon-walk".into(),
        symbol: "figure.walk".into(),
        name: "Afternoon Walk".into(),
        settings: PresetSettings::new(None, Some(0.8)).unwrap(),
        duration: OverrideDuration::finite(1800.0).unwrap(),
        schedule_start_date: Some(date(10, 14)),
        repeat_days: RepeatDays::NONE,
    };
    let path = write_json(&dir, "presets.json", &vec![preset]);

    let mut cmd = Command::cargo_bin("therapy").unwrap();
    cmd.arg("next")
        .arg("--presets")
        .arg(&path)
        .arg("--after")
        .arg("2024-01-15T10:00:00Z")
        .assert()
        .success()
        .stdout(predicate::str::contains("no upcoming occurrence"));
}

#[test]
fn test_overlay_rejects_unknown_policy() {
    let dir = tempfile::tempdir().unwrap();
    let baseline = vec![ScheduleEntry::new(date(1, 0), date(2, 0), 100.0).unwrap()];
    let overrides: Vec<TemporaryScheduleOverride> = vec![];

    let baseline_path = write_json(&dir, "baseline.json", &baseline);
    let overrides_path = write_json(&dir, "overrides.json", &overrides);

    let mut cmd = Command::cargo_bin("therapy").unwrap();
    cmd.arg("overlay")
        .arg("--policy")
        .arg("bolus")
        .arg("--baseline")
        .arg(&baseline_path)
        .arg("--overrides")
        .arg(&overrides_path)
        .assert()
        .failure();
}
