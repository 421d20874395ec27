//! Rendering of the stats record for the polling monitor.

use herakles_proc_probe::{ProbeError, StatsRecord};
use serde_json::Value;

/// The whole record as pretty-printed JSON.
pub fn render_record(record: &StatsRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(record)
}

/// Fails with `UnknownKey` unless `key` names a record field.
pub fn check_key(key: &str) -> Result<(), ProbeError> {
    match StatsRecord::new().field(key) {
        Some(_) => Ok(()),
        None => Err(ProbeError::UnknownKey(key.to_string())),
    }
}

/// A single field. Scalars are printed bare so monitors can parse them
/// directly; an absent parent PID renders as an empty string.
pub fn render_field(record: &StatsRecord, key: &str) -> Result<String, ProbeError> {
    let value = record
        .field(key)
        .ok_or_else(|| ProbeError::UnknownKey(key.to_string()))?;

    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    })
}
