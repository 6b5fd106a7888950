use serde_json::Value;

/// Helpers for dynamically typed document values
pub struct JsonUtils;

impl JsonUtils {
    /// Get JSON value type name
    pub fn value_type_name(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Signed, unsigned and floating numbers as one representation
    pub fn as_f64(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .map(|i| i as f64)
                .or_else(|| n.as_u64().map(|u| u as f64))
                .or_else(|| n.as_f64()),
            _ => None,
        }
    }

    /// Integers, or floats with no fractional part
    pub fn is_integral(value: &Value) -> bool {
        match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => true,
            Value::Number(n) => n.as_f64().map_or(false, |f| f.is_finite() && f.fract() == 0.0),
            _ => false,
        }
    }

    /// String form used when comparing heterogeneous values
    pub fn canonical_string(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            other => other.to_string(),
        }
    }
}
