//! Plain-text views for the terminal.

use crate::product::{property_text, ProductRecord, MISSING};
use crate::provider::SearchOutcome;
use crate::session::SearchHistoryEntry;

const PREVIEW_CHARS: usize = 50;

pub fn product_header(index: usize, product: &ProductRecord) -> String {
    format!(
        "{}. {} - €{}",
        index + 1,
        product.display_name(),
        product.display_price()
    )
}

/// Full product list with details.
pub fn products(products: &[ProductRecord]) -> String {
    if products.is_empty() {
        return "No products found.\n".to_string();
    }

    let mut out = format!("Found {} Products\n", products.len());
    for (i, product) in products.iter().enumerate() {
        out.push('\n');
        out.push_str(&product_detail(i, product));
    }
    out
}

pub fn product_detail(index: usize, product: &ProductRecord) -> String {
    let or_missing = |field: &Option<String>| field.clone().unwrap_or_else(|| MISSING.to_string());

    let mut out = format!("{}\n", product_header(index, product));
    out.push_str(&format!("   Provider: {}\n", or_missing(&product.provider)));
    out.push_str(&format!("   Website: {}\n", or_missing(&product.provider_website)));
    if let Some(url) = &product.provider_url {
        out.push_str(&format!("   Product Link: {}\n", url));
    }
    out.push_str(&format!("   SKU/ID: {}\n", or_missing(&product.product_sku)));
    out.push_str(&format!("   Price: €{}\n", product.display_price()));
    if let Some(unit_price) = product.display_unit_price() {
        out.push_str(&format!("   Unit price: {}\n", unit_price));
    }

    out.push_str("   Product Properties:\n");
    if product.product_properties.is_empty() {
        out.push_str("     No detailed properties available.\n");
    } else {
        for (key, value) in &product.product_properties {
            out.push_str(&format!("     {}: {}\n", key, property_text(value)));
        }
    }

    out.push_str("   Technical Evaluation:\n");
    out.push_str(&format!(
        "     {}\n",
        product
            .evaluation
            .as_deref()
            .unwrap_or("No evaluation available.")
    ));
    out
}

/// Past searches, newest first.
pub fn history(entries: &[SearchHistoryEntry]) -> String {
    if entries.is_empty() {
        return "No search history yet. Search for products to see your history here.\n"
            .to_string();
    }

    let mut out = String::new();
    for (n, entry) in entries.iter().rev().enumerate() {
        let objective = match (&entry.unit, entry.objective.unit_label(entry.unit.as_deref())) {
            (Some(_), Some(label)) => format!("{} ({})", entry.objective, label),
            _ => entry.objective.to_string(),
        };
        out.push_str(&format!(
            "[{}] {} - {}...\n",
            n + 1,
            entry.timestamp,
            preview(&entry.spec)
        ));
        out.push_str(&format!("    Search Query: {}\n", entry.spec));
        out.push_str(&format!(
            "    Provider: {} | Price objective: {}\n",
            entry.provider, objective
        ));
        out.push_str(&format!("    Results: {} products found\n", entry.products.len()));
        for (i, product) in entry.products.iter().enumerate() {
            out.push_str(&format!("      {}\n", product_header(i, product)));
            out.push_str(&format!(
                "         Provider: {} | {}\n",
                product.provider.as_deref().unwrap_or(MISSING),
                product.provider_url.as_deref().unwrap_or("#")
            ));
        }
        out.push('\n');
    }
    out
}

/// Provider answers and parsed products, for manual inspection.
pub fn raw(outcome: &SearchOutcome) -> String {
    let mut out = String::new();
    for response in &outcome.raw_responses {
        out.push_str(&format!("--- {} ---\n{}\n", response.label, response.content));
    }

    let parsed: Vec<_> = outcome.products.iter().map(|p| p.raw().clone()).collect();
    out.push_str("--- parsed products ---\n");
    out.push_str(&serde_json::to_string_pretty(&parsed).unwrap_or_else(|_| "[]".to_string()));
    out.push('\n');
    out
}

/// Discovery notes, visited pages and skipped-page warnings of a two-phase
/// search. Empty for single-phase outcomes.
pub fn pages(outcome: &SearchOutcome) -> String {
    let mut out = String::new();
    if let Some(notes) = outcome.commentary.as_deref().map(str::trim) {
        if !notes.is_empty() {
            out.push_str(&format!("Provider notes: {}\n", notes));
        }
    }
    if !outcome.pages.is_empty() {
        out.push_str("Product pages:\n");
        for (i, page) in outcome.pages.iter().enumerate() {
            let title = if page.title.is_empty() { &page.url } else { &page.title };
            out.push_str(&format!("  {}. {} <{}>\n", i + 1, title, page.url));
        }
    }
    for warning in &outcome.warnings {
        out.push_str(&format!("Warning: skipped {}: {}\n", warning.url, warning.reason));
    }
    out
}

fn preview(spec: &str) -> String {
    spec.chars()
        .take(PREVIEW_CHARS)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrumentation::RunLog;
    use crate::llm::Citation;
    use crate::product::PriceObjective;
    use crate::provider::{ExtractionWarning, RawResponse};
    use serde_json::json;

    fn record(value: serde_json::Value) -> ProductRecord {
        ProductRecord::from_value(&value)
    }

    #[test]
    fn missing_fields_show_placeholders() {
        let text = product_detail(0, &record(json!({})));
        assert!(text.starts_with("1. Unknown Product - €N/A\n"));
        assert!(text.contains("Provider: N/A"));
        assert!(text.contains("SKU/ID: N/A"));
        assert!(!text.contains("Product Link"));
        assert!(text.contains("No detailed properties available."));
        assert!(text.contains("No evaluation available."));
    }

    #[test]
    fn properties_render_in_order() {
        let text = product_detail(
            2,
            &record(json!({
                "product_name": "Phone",
                "product_price": 299.99,
                "provider_url": "https://telia.lt/phone",
                "product_properties": {"RAM": "8 GB", "Storage": 128}
            })),
        );
        assert!(text.starts_with("3. Phone - €299.99\n"));
        assert!(text.contains("Product Link: https://telia.lt/phone"));
        let ram = text.find("RAM: 8 GB").unwrap();
        let storage = text.find("Storage: 128").unwrap();
        assert!(ram < storage);
    }

    #[test]
    fn empty_list_reports_no_products() {
        assert_eq!(products(&[]), "No products found.\n");
    }

    #[test]
    fn history_is_newest_first_with_preview() {
        let long_spec = "x".repeat(80);
        let entries = vec![
            SearchHistoryEntry::new(
                "older search",
                PriceObjective::None,
                None,
                "perplexity",
                vec![record(json!({"product_name": "A", "product_price": 1}))],
            ),
            SearchHistoryEntry::new(&long_spec, PriceObjective::Unit, Some("tablet"), "openai", vec![]),
        ];

        let text = history(&entries);
        let newer = text.find(&format!("- {}...", "x".repeat(50))).unwrap();
        let older = text.find("- older search...").unwrap();
        assert!(newer < older);
        assert!(text.contains("Price objective: unit (tablet)"));
        assert!(text.contains("1. A - €1.00"));
        assert!(text.contains("Provider: N/A | #"));
    }

    #[test]
    fn raw_view_lists_responses_and_pages_show_warnings() {
        let outcome = SearchOutcome {
            products: vec![record(json!({"product_name": "A"}))],
            prompt: "p".into(),
            raw_responses: vec![RawResponse {
                label: "search".into(),
                content: "[{\"product_name\": \"A\"}]".into(),
            }],
            pages: vec![Citation {
                title: String::new(),
                url: "https://a.lt/1".into(),
            }],
            warnings: vec![ExtractionWarning {
                url: "https://a.lt/2".into(),
                reason: "bad".into(),
            }],
            commentary: None,
            run: RunLog::new("test", "none"),
        };

        let text = raw(&outcome);
        assert!(text.contains("--- search ---"));
        assert!(text.contains("\"product_name\": \"A\""));

        let text = pages(&outcome);
        assert!(!text.contains("Provider notes"));
        assert!(text.contains("1. https://a.lt/1 <https://a.lt/1>"));
        assert!(text.contains("Warning: skipped https://a.lt/2: bad"));
    }

    #[test]
    fn discovery_notes_lead_the_page_list() {
        let mut outcome = SearchOutcome {
            products: Vec::new(),
            prompt: "p".into(),
            raw_responses: Vec::new(),
            pages: vec![Citation {
                title: "Kettle Alpha".into(),
                url: "https://shop.lt/alpha".into(),
            }],
            warnings: Vec::new(),
            commentary: Some("  I found one kettle on shop.lt.\n".into()),
            run: RunLog::new("test", "none"),
        };

        let text = pages(&outcome);
        assert!(text.starts_with("Provider notes: I found one kettle on shop.lt.\nProduct pages:\n"));
        assert!(text.contains("1. Kettle Alpha <https://shop.lt/alpha>"));

        outcome.commentary = Some("   ".into());
        assert!(pages(&outcome).starts_with("Product pages:"));
    }
}
