//! Tool argument extraction
//!
//! Tool schemas declare numbers as JSON `number`, so clients may send `10`
//! or `10.0`; both are accepted.

use bridge_core::{Arguments, ToolResult};

/// A non-empty string argument
pub fn string<'a>(arguments: &'a Arguments, key: &str) -> Option<&'a str> {
    arguments
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// A string argument, accepting numbers as their decimal rendering
///
/// Project and page identifiers are often numeric but may be sent either way.
pub fn identifier(arguments: &Arguments, key: &str) -> Option<String> {
    match arguments.get(key)? {
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => string(arguments, key).map(str::to_string),
    }
}

/// A non-negative integer argument, clamped to `u32`
pub fn count(arguments: &Arguments, key: &str) -> Option<u32> {
    let value = arguments.get(key)?;
    let n = value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0)
            .map(|f| f as u64)
    })?;
    Some(u32::try_from(n).unwrap_or(u32::MAX))
}

/// The text result for a missing required argument
pub fn missing(key: &str) -> ToolResult {
    ToolResult::error(format!("Error: {} is required", key))
}
