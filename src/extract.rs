//! Recovery of the product array from free-form provider text.
//!
//! Providers are asked for bare JSON but regularly wrap it in prose, code
//! fences or a `{"products": [...]}` envelope. The cascade below is a
//! heuristic: deeply nested or adversarial text can still be mis-extracted.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::{Result, SearchError};
use crate::product::ProductRecord;

/// An array of objects, or an object with a `products` array.
static STRICT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)\[\s*\{.*\}\s*\]|\{\s*"products"\s*:\s*\[.*\]\s*\}"#)
        .expect("strict product pattern is valid")
});

/// Any bracketed or braced span.
static LOOSE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[[\s\S]*\]|\{[\s\S]*\}").expect("loose product pattern is valid")
});

/// Extracts product records from provider text.
pub fn extract(text: &str) -> Result<Vec<ProductRecord>> {
    Ok(extract_json(text)?
        .iter()
        .map(ProductRecord::from_value)
        .collect())
}

/// Extracts the raw product mappings from provider text.
pub fn extract_json(text: &str) -> Result<Vec<Value>> {
    let parsed = STRICT_PATTERN
        .find(text)
        .and_then(|m| match serde_json::from_str::<Value>(m.as_str()) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(error = %e, "strict match is not valid JSON");
                None
            }
        })
        .or_else(|| serde_json::from_str::<Value>(text).ok());

    if let Some(value) = parsed {
        return unwrap_products(value);
    }

    let spans: Vec<&str> = LOOSE_PATTERN.find_iter(text).map(|m| m.as_str()).collect();
    debug!(candidates = spans.len(), "falling back to loose JSON scan");

    for (i, span) in spans.iter().enumerate() {
        match serde_json::from_str::<Value>(span) {
            Ok(value) if is_product_container(&value) => return unwrap_products(value),
            Ok(_) => debug!(candidate = i + 1, "JSON candidate holds no product list"),
            Err(e) => debug!(candidate = i + 1, error = %e, "JSON candidate does not parse"),
        }
    }

    Err(SearchError::MalformedResponse {
        raw: text.to_string(),
    })
}

fn is_product_container(value: &Value) -> bool {
    match value {
        Value::Array(_) => true,
        Value::Object(obj) => obj.contains_key("products"),
        _ => false,
    }
}

fn unwrap_products(mut value: Value) -> Result<Vec<Value>> {
    if let Some(Value::Array(items)) = value.get_mut("products") {
        return Ok(std::mem::take(items));
    }
    match value {
        Value::Array(items) => Ok(items),
        other => Err(SearchError::UnexpectedShape { value: other }),
    }
}
