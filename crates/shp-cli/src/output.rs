//! Output formatting utilities.

use chrono::DateTime;
use serde_json::{json, Value};
use shp_core::{SecurityEvent, VerificationResult};

/// Formats a value as pretty JSON.
pub fn format_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Prints one verification outcome, plus the security-event descriptor
/// on failure.
pub fn print_verification(result: &VerificationResult, event: Option<&SecurityEvent>, now: u64) {
    let verified_at = DateTime::from_timestamp(now as i64, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| now.to_string());

    let mut value = json!({
        "isValid": result.is_valid,
        "verifiedAt": verified_at,
    });
    if let Some(kind) = result.error_kind {
        value["errorKind"] = serde_json::to_value(kind).unwrap_or(Value::Null);
    }
    if let Some(age) = result.age {
        value["age"] = json!(age.as_secs());
    }
    println!("{}", format_json(&value));

    if let Some(event) = event {
        eprintln!(
            "security-event: {}",
            serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string())
        );
    }
}
