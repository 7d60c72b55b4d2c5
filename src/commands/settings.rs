use crate::commands::db::ensure_data_dir;
use crate::error::{DepreciationError, Result};
use crate::schedule::policy::{MonthCounting, SchedulePolicy, ZeroElapsedPolicy};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_SCHEMA_VERSION: i64 = 1;

pub async fn get_settings(data_dir: String) -> Result<Value> {
    load_settings_from_disk(&data_dir)
}

pub async fn save_settings(data_dir: String, settings: Value) -> Result<Value> {
    save_settings_to_disk(&data_dir, settings)
}

pub fn load_schedule_policy(data_dir: &str) -> Result<SchedulePolicy> {
    let settings = load_settings_from_disk(data_dir)?;
    Ok(policy_from_settings(&settings))
}

pub fn policy_from_settings(settings: &Value) -> SchedulePolicy {
    let defaults = SchedulePolicy::default();

    let zero_elapsed = settings
        .get("zeroElapsedPolicy")
        .cloned()
        .and_then(|v| serde_json::from_value::<ZeroElapsedPolicy>(v).ok())
        .unwrap_or(defaults.zero_elapsed);

    let month_counting = settings
        .get("monthCounting")
        .cloned()
        .and_then(|v| serde_json::from_value::<MonthCounting>(v).ok())
        .unwrap_or(defaults.month_counting);

    let floor_at_zero = settings
        .get("floorAtZero")
        .and_then(Value::as_bool)
        .unwrap_or(defaults.floor_at_zero);

    SchedulePolicy {
        zero_elapsed,
        month_counting,
        floor_at_zero,
    }
}

pub fn load_settings_from_disk(data_dir: &str) -> Result<Value> {
    let path = settings_path(data_dir);
    ensure_data_dir(data_dir)?;

    let original = if path.exists() {
        let raw = fs::read_to_string(&path).map_err(|e| {
            DepreciationError::Settings(format!("Failed to read settings.json: {e}"))
        })?;
        serde_json::from_str::<Value>(&raw).unwrap_or_else(|_| {
            log::warn!("settings.json is not valid JSON, falling back to defaults");
            json!({})
        })
    } else {
        json!({})
    };

    let migrated = migrate_settings(original.clone());
    if migrated != original || !path.exists() {
        write_settings_file(&path, &migrated)?;
    }

    Ok(migrated)
}

pub fn save_settings_to_disk(data_dir: &str, settings: Value) -> Result<Value> {
    if !settings.is_object() {
        return Err(DepreciationError::validation("settings must be a JSON object"));
    }

    let path = settings_path(data_dir);
    let mut merged = load_settings_from_disk(data_dir).unwrap_or_else(|_| default_settings());
    merge_settings(&mut merged, &settings);

    let migrated = migrate_settings(merged);
    write_settings_file(&path, &migrated)?;
    Ok(migrated)
}

fn settings_path(data_dir: &str) -> PathBuf {
    Path::new(data_dir).join("settings.json")
}

fn write_settings_file(path: &Path, settings: &Value) -> Result<()> {
    let raw = serde_json::to_string_pretty(settings)
        .map_err(|e| DepreciationError::Settings(format!("Failed to serialize settings: {e}")))?;
    fs::write(path, raw)
        .map_err(|e| DepreciationError::Settings(format!("Failed to write settings.json: {e}")))
}

fn migrate_settings(input: Value) -> Value {
    let defaults = default_settings();
    let mut out = match input {
        Value::Object(map) => Value::Object(map),
        _ => Value::Object(Map::new()),
    };

    let version = out
        .get("schema_version")
        .and_then(Value::as_i64)
        .unwrap_or(0);
    if version > SETTINGS_SCHEMA_VERSION {
        log::warn!(
            "settings.json schema version {version} is newer than {SETTINGS_SCHEMA_VERSION}"
        );
    }

    deep_merge_defaults(&mut out, &defaults);
    sanitize_settings(&mut out);
    if let Some(obj) = out.as_object_mut() {
        obj.insert("schema_version".to_string(), json!(SETTINGS_SCHEMA_VERSION));
    }

    out
}

fn default_settings() -> Value {
    let policy = SchedulePolicy::default();
    json!({
        "schema_version": SETTINGS_SCHEMA_VERSION,
        "zeroElapsedPolicy": policy.zero_elapsed,
        "monthCounting": policy.month_counting,
        "floorAtZero": policy.floor_at_zero
    })
}

fn deep_merge_defaults(target: &mut Value, defaults: &Value) {
    let Some(target_obj) = target.as_object_mut() else {
        return;
    };
    let Some(default_obj) = defaults.as_object() else {
        return;
    };

    for (key, default_value) in default_obj {
        match target_obj.get_mut(key) {
            Some(existing) => {
                if existing.is_object() && default_value.is_object() {
                    deep_merge_defaults(existing, default_value);
                }
            }
            None => {
                target_obj.insert(key.clone(), default_value.clone());
            }
        }
    }
}

fn merge_settings(target: &mut Value, incoming: &Value) {
    match (target, incoming) {
        (Value::Object(target_obj), Value::Object(incoming_obj)) => {
            for (key, value) in incoming_obj {
                if let Some(existing) = target_obj.get_mut(key) {
                    merge_settings(existing, value);
                } else {
                    target_obj.insert(key.clone(), value.clone());
                }
            }
        }
        (target_slot, incoming_value) => {
            *target_slot = incoming_value.clone();
        }
    }
}

fn sanitize_settings(settings: &mut Value) {
    let Some(obj) = settings.as_object_mut() else {
        return;
    };

    sanitize_enum(obj, "zeroElapsedPolicy", &["fullYear", "singleMonth"], "fullYear");
    sanitize_enum(obj, "monthCounting", &["approximate", "calendar"], "approximate");
    ensure_bool(obj, "floorAtZero", true);
}

fn sanitize_enum(map: &mut Map<String, Value>, key: &str, allowed: &[&str], default: &str) {
    let valid = map
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| allowed.contains(value))
        .unwrap_or(default);
    map.insert(key.to_string(), json!(valid));
}

fn ensure_bool(map: &mut Map<String, Value>, key: &str, default: bool) {
    let value = map.get(key).and_then(Value::as_bool).unwrap_or(default);
    map.insert(key.to_string(), json!(value));
}
