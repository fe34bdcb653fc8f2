use crate::domain::model::{ForecastDocument, RawResponse};
use crate::utils::error::{ForecastError, Result};
use serde_json::Value;

/// Parses the body and checks for a top-level `list` array.
pub fn decode(raw: RawResponse) -> Result<ForecastDocument> {
    let root: Value = serde_json::from_slice(&raw.body).map_err(|e| ForecastError::Decode {
        message: format!("malformed JSON: {}", e),
    })?;

    let Value::Object(mut fields) = root else {
        return Err(ForecastError::Decode {
            message: "top-level value is not an object".to_string(),
        });
    };

    match fields.remove("list") {
        Some(Value::Array(list)) => {
            tracing::debug!("Decoded forecast document with {} entries", list.len());
            Ok(ForecastDocument { list })
        }
        Some(other) => Err(ForecastError::Decode {
            message: format!("field `list` is not an array (found {})", type_name(&other)),
        }),
        None => Err(ForecastError::Decode {
            message: "missing required field `list`".to_string(),
        }),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
