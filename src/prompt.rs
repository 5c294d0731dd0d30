use crate::product::PriceObjective;

/// System message sent with single-phase searches.
pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant specialized in Lithuanian market product analysis. Your responses should be accurate, structured as requested, and focused on product information available in Lithuania. Always format product data as proper JSON.";

const GUIDELINES: &str = r#"Follow these guidelines:
1. Tik Lietuviški puslapiai (išskyrus katalogas.cpo.lt, zuza.lt)
2. Verify the product is currently available for purchase
3. Gather accurate pricing in EUR
4. Evaluate technical specification requirements one by one"#;

const SCHEMA_HEAD: &str = r#"[
  {
    "provider": "Company selling the product",
    "provider_website": "Main website domain (e.g., telia.lt)",
    "provider_url": "Full URL to the specific product page",
    "product_name": "Complete product name with model",
    "product_properties": {
      "key_spec1": "value1",
      "key_spec2": "value2"
    },
    "product_sku": "Any product identifiers (SKU, UPC, model number)",
    "product_price": 299.99,"#;

const SCHEMA_TAIL: &str = r#"    "evaluation": "Detailed assessment of how the product meets or fails each technical specification"
  }
]"#;

const JSON_ONLY: &str =
    "DO NOT include any explanation, preamble, or additional text - ONLY provide the JSON array.";

/// Prompt for a single-phase search. The domain allow-list travels in the
/// request's domain filter, not here.
pub fn build_prompt(spec: &str, objective: PriceObjective, unit: Option<&str>) -> String {
    let mut prompt = format!(
        "Analyze the Lithuanian market and gather detailed product information according to the following technical specification:\n{}\n\n{}\n",
        spec.trim(),
        GUIDELINES
    );
    push_normalization(&mut prompt, objective, unit);
    push_schema(&mut prompt, objective, unit);
    prompt
}

/// Phase one of a two-phase search: ask only for product pages.
pub fn build_discovery_prompt(spec: &str, domains: &[String]) -> String {
    let domain_line = if domains.is_empty() {
        "Search Lithuanian online shops.".to_string()
    } else {
        format!("Search only these websites: {}.", domains.join(", "))
    };

    format!(
        "Find product pages in the Lithuanian market that match the following technical specification:\n{}\n\n{}\nList each relevant product page with its title and full URL. Only include pages where the product is currently available for purchase.",
        spec.trim(),
        domain_line
    )
}

/// Phase two: structured extraction from one exact product page.
pub fn build_detail_prompt(
    spec: &str,
    url: &str,
    objective: PriceObjective,
    unit: Option<&str>,
) -> String {
    let mut prompt = format!(
        "Extract product information from this page: {}\n\nCompare the product against the following technical specification:\n{}\n\nOnly report products shown on that page. Gather accurate pricing in EUR and evaluate the technical specification requirements one by one.\n",
        url,
        spec.trim()
    );
    push_normalization(&mut prompt, objective, unit);
    push_schema(&mut prompt, objective, unit);
    prompt
}

fn push_normalization(prompt: &mut String, objective: PriceObjective, unit: Option<&str>) {
    let line = match objective {
        PriceObjective::None => return,
        PriceObjective::Unit => format!(
            "5. Calculate the price per single {} (price_per_unit) for each product by dividing the price by the number of units in the package.",
            objective.unit_label(unit).unwrap_or_default()
        ),
        PriceObjective::Kg => "5. Calculate the price per kilogram (price_per_kg) for each product based on its net weight.".to_string(),
        PriceObjective::Liter => "5. Calculate the price per liter (price_per_liter) for each product based on its volume.".to_string(),
        PriceObjective::Package => "5. Calculate the price per package (price_per_package) for each product, accounting for multi-pack offers.".to_string(),
    };
    prompt.push_str(&line);
    prompt.push('\n');
}

fn push_schema(prompt: &mut String, objective: PriceObjective, unit: Option<&str>) {
    prompt.push_str(
        "\nIMPORTANT: Your response MUST be formatted EXACTLY as a valid JSON array of product objects.\nEach product in the array should have the following fields:\n\n",
    );
    prompt.push_str(SCHEMA_HEAD);
    prompt.push('\n');
    if let (Some(key), Some(label)) = (objective.price_key(), objective.unit_label(unit)) {
        prompt.push_str(&format!("    \"{}\": 12.50,\n", key));
        prompt.push_str(&format!("    \"unit_type\": \"{}\",\n", label));
    }
    prompt.push_str(SCHEMA_TAIL);
    prompt.push_str("\n\n");
    prompt.push_str(JSON_ONLY);
    prompt.push('\n');
}
