use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Placeholder shown for any field the provider left out.
pub const MISSING: &str = "N/A";

/// Secondary price normalization requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceObjective {
    #[default]
    None,
    Unit,
    Kg,
    Liter,
    Package,
}

impl PriceObjective {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceObjective::None => "none",
            PriceObjective::Unit => "unit",
            PriceObjective::Kg => "kg",
            PriceObjective::Liter => "liter",
            PriceObjective::Package => "package",
        }
    }

    /// JSON key the provider is asked to fill, e.g. `price_per_kg`.
    pub fn price_key(&self) -> Option<String> {
        match self {
            PriceObjective::None => None,
            other => Some(format!("price_per_{}", other.as_str())),
        }
    }

    /// Human label of the unit. `unit` falls back to "unit" without a custom label.
    pub fn unit_label(&self, custom: Option<&str>) -> Option<String> {
        match self {
            PriceObjective::None => None,
            PriceObjective::Unit => Some(
                custom
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .unwrap_or("unit")
                    .to_string(),
            ),
            other => Some(other.as_str().to_string()),
        }
    }
}

impl fmt::Display for PriceObjective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceObjective {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(PriceObjective::None),
            "unit" => Ok(PriceObjective::Unit),
            "kg" => Ok(PriceObjective::Kg),
            "liter" | "litre" | "l" => Ok(PriceObjective::Liter),
            "package" => Ok(PriceObjective::Package),
            other => Err(format!(
                "unknown price objective '{}' (expected none, unit, kg, liter or package)",
                other
            )),
        }
    }
}

/// `price_per_<unit>` value reported by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitPrice {
    pub unit: String,
    pub value: f64,
}

/// One product as reported by the provider. Every field may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub provider: Option<String>,
    pub provider_website: Option<String>,
    pub provider_url: Option<String>,
    pub product_name: Option<String>,
    pub product_properties: Map<String, Value>,
    pub product_sku: Option<String>,
    /// EUR.
    pub product_price: Option<f64>,
    pub unit_price: Option<UnitPrice>,
    pub unit_type: Option<String>,
    pub evaluation: Option<String>,
    raw: Value,
}

impl ProductRecord {
    /// Builds a record from a loosely shaped provider mapping. Never fails:
    /// unknown keys are ignored and wrongly typed values count as missing.
    pub fn from_value(value: &Value) -> Self {
        let empty = Map::new();
        let obj = value.as_object().unwrap_or(&empty);
        let text = |key: &str| obj.get(key).and_then(text_field);

        let unit_price = obj.iter().find_map(|(key, v)| {
            let unit = key.strip_prefix("price_per_")?;
            Some(UnitPrice {
                unit: unit.to_string(),
                value: decimal_field(v)?,
            })
        });

        Self {
            provider: text("provider"),
            provider_website: text("provider_website"),
            provider_url: text("provider_url"),
            product_name: text("product_name"),
            product_properties: obj
                .get("product_properties")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
            product_sku: text("product_sku"),
            product_price: obj.get("product_price").and_then(decimal_field),
            unit_price,
            unit_type: text("unit_type"),
            evaluation: text("evaluation"),
            raw: value.clone(),
        }
    }

    /// The mapping exactly as the provider returned it.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn display_name(&self) -> &str {
        self.product_name.as_deref().unwrap_or("Unknown Product")
    }

    pub fn display_price(&self) -> String {
        self.product_price
            .map(|p| format!("{:.2}", p))
            .unwrap_or_else(|| MISSING.to_string())
    }

    pub fn display_unit_price(&self) -> Option<String> {
        let price = self.unit_price.as_ref()?;
        let unit = self.unit_type.as_deref().unwrap_or(&price.unit);
        Some(format!("€{:.2} / {}", price.value, unit))
    }
}

/// Renders a property value without JSON quoting for plain strings.
pub fn property_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => MISSING.to_string(),
        other => other.to_string(),
    }
}

fn text_field(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn decimal_field(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
}

/// Accepts "12.99", "12,99 €", "€ 1,299.99" and "1.299,99 €". The last `.`
/// or `,` is the decimal point; earlier ones group thousands.
fn parse_decimal(s: &str) -> Option<f64> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();
    let normalized = match cleaned.rfind(['.', ',']) {
        Some(point) => {
            let (whole, fraction) = cleaned.split_at(point);
            let whole: String = whole.chars().filter(|c| !matches!(c, '.' | ',')).collect();
            format!("{}.{}", whole, &fraction[1..])
        }
        None => cleaned,
    };
    normalized.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_record_is_read_field_by_field() {
        let value = json!({
            "provider": "Gintarine vaistine",
            "provider_website": "gintarine.lt",
            "provider_url": "https://www.gintarine.lt/vitaminas-d3",
            "product_name": "Vitaminas D3 2000 TV, 90 kaps.",
            "product_properties": {"dose": "2000 TV", "count": 90},
            "product_sku": "SKU-123",
            "product_price": 7.49,
            "price_per_unit": 0.083,
            "unit_type": "capsule",
            "evaluation": "Meets every requirement."
        });

        let record = ProductRecord::from_value(&value);
        assert_eq!(record.provider.as_deref(), Some("Gintarine vaistine"));
        assert_eq!(record.product_price, Some(7.49));
        assert_eq!(
            record.unit_price,
            Some(UnitPrice {
                unit: "unit".into(),
                value: 0.083
            })
        );
        assert_eq!(record.display_unit_price().as_deref(), Some("€0.08 / capsule"));
        assert_eq!(record.raw(), &value);
    }

    #[test]
    fn properties_keep_insertion_order() {
        let record = ProductRecord::from_value(&json!({
            "product_properties": {"zeta": "1", "alpha": "2", "mid": "3"}
        }));
        let keys: Vec<&str> = record.product_properties.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn missing_fields_render_as_placeholders() {
        let record = ProductRecord::from_value(&json!({}));
        assert_eq!(record.display_name(), "Unknown Product");
        assert_eq!(record.display_price(), MISSING);
        assert!(record.provider_url.is_none());
        assert!(record.product_properties.is_empty());
        assert!(record.display_unit_price().is_none());
    }

    #[test]
    fn string_prices_and_empty_urls_are_tolerated() {
        let record = ProductRecord::from_value(&json!({
            "product_price": "12,99 €",
            "provider_url": "  ",
            "price_per_kg": "not a number"
        }));
        assert_eq!(record.product_price, Some(12.99));
        assert!(record.provider_url.is_none());
        assert!(record.unit_price.is_none());
    }

    #[test]
    fn grouped_prices_use_the_last_separator_as_decimal_point() {
        assert_eq!(parse_decimal("1.299,99 €"), Some(1299.99));
        assert_eq!(parse_decimal("€1,299.99"), Some(1299.99));
        assert_eq!(parse_decimal("1 299,99"), Some(1299.99));
        assert_eq!(parse_decimal("12,99 €"), Some(12.99));
        assert_eq!(parse_decimal("45"), Some(45.0));
        assert_eq!(parse_decimal("N/A"), None);

        let record = ProductRecord::from_value(&json!({"product_price": "1.299,99 €"}));
        assert_eq!(record.display_price(), "1299.99");
    }

    #[test]
    fn non_object_values_yield_empty_records() {
        let record = ProductRecord::from_value(&json!("just text"));
        assert!(record.product_name.is_none());
        assert_eq!(record.raw(), &json!("just text"));
    }

    #[test]
    fn objective_parsing_and_keys() {
        assert_eq!("KG".parse::<PriceObjective>(), Ok(PriceObjective::Kg));
        assert_eq!("litre".parse::<PriceObjective>(), Ok(PriceObjective::Liter));
        assert!("gram".parse::<PriceObjective>().is_err());
        assert_eq!(PriceObjective::None.price_key(), None);
        assert_eq!(PriceObjective::Package.price_key().as_deref(), Some("price_per_package"));
        assert_eq!(
            PriceObjective::Unit.unit_label(Some(" tablet ")).as_deref(),
            Some("tablet")
        );
        assert_eq!(PriceObjective::Unit.unit_label(None).as_deref(), Some("unit"));
        assert_eq!(PriceObjective::Kg.unit_label(Some("ignored")).as_deref(), Some("kg"));
    }

    #[test]
    fn property_text_unquotes_strings() {
        assert_eq!(property_text(&json!("6 GB")), "6 GB");
        assert_eq!(property_text(&json!(128)), "128");
        assert_eq!(property_text(&Value::Null), MISSING);
    }
}
