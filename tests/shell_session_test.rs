use httpmock::prelude::*;
use market_scout::instrumentation::{RunLog, RunLogger};
use market_scout::llm::ChatClient;
use market_scout::{shell, PerplexityProvider, PriceObjective};
use serde_json::json;
use tempfile::TempDir;

fn completion(content: &str) -> serde_json::Value {
    json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
}

#[tokio::test]
async fn test_session_searches_and_keeps_history() {
    let server = MockServer::start_async().await;
    let found = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .body_contains("Vitamin D3 2000 IU")
                .body_contains(r#""manovaistine.lt","pigu.lt"]"#)
                .body_contains("price_per_kg");
            then.status(200).json_body(completion(
                r#"[{"provider": "Pigu", "product_name": "D3 2000 IU", "product_price": 6.5}]"#,
            ));
        })
        .await;
    let nothing = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .body_contains("Unobtainium");
            then.status(200).json_body(completion("No products match."));
        })
        .await;

    let provider = PerplexityProvider::new(
        ChatClient::new("pplx-test", &server.url("/chat/completions")),
        "sonar-pro",
    );

    let logs = TempDir::new().unwrap();
    let logger = RunLogger::new(logs.path().to_str().unwrap()).unwrap();

    let input = "\
:objective kg
:add pigu.lt
:add pigu.lt
Vitamin D3 2000 IU
Unobtainium
:history
:raw
:quit
Never searched
";
    let mut output = Vec::new();
    let session = shell::run(&provider, Some(&logger), input.as_bytes(), &mut output)
        .await
        .unwrap();
    let output = String::from_utf8(output).unwrap();

    found.assert_async().await;
    nothing.assert_async().await;

    assert_eq!(session.objective, PriceObjective::Kg);
    assert!(session.domains.contains("pigu.lt"));
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history()[0].spec, "Vitamin D3 2000 IU");
    assert_eq!(session.history()[0].products[0].display_name(), "D3 2000 IU");

    assert!(output.contains("Added pigu.lt"));
    assert!(output.contains("pigu.lt is already in the list"));
    assert!(output.contains("Found 1 Products"));
    assert!(output.contains("1. D3 2000 IU - €6.50"));
    assert!(output.contains("Error: Could not extract a valid product list"));
    assert!(output.contains("Raw content:\nNo products match."));
    assert!(output.contains("Results: 1 products found"));
    assert!(!output.contains("Never searched"));

    let runs: Vec<RunLog> = std::fs::read_to_string(logger.path())
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].objective, "kg");
    assert!(logger.path().ends_with("searches.jsonl"));

    let line: serde_json::Value =
        serde_json::from_str(std::fs::read_to_string(logger.path()).unwrap().trim()).unwrap();
    assert_eq!(line["spec"], "Vitamin D3 2000 IU");
    assert_eq!(
        line["domains"].as_array().unwrap().last(),
        Some(&json!("pigu.lt"))
    );
}

#[tokio::test]
async fn test_domain_commands_shape_the_filter() {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .body_contains(r#""search_domain_filter":["kainos.lt"]"#);
            then.status(200).json_body(completion("[]"));
        })
        .await;

    let provider = PerplexityProvider::new(
        ChatClient::new("pplx-test", &server.url("/chat/completions")),
        "sonar-pro",
    );

    let input = "\
:remove vaistai.lt
:remove kaina24.lt
:remove gintarine.lt
:remove eurovaistine.lt
:remove manovaistine.lt
:domains
Any laptop
:reset
";
    let mut output = Vec::new();
    let session = shell::run(&provider, None, input.as_bytes(), &mut output)
        .await
        .unwrap();
    let output = String::from_utf8(output).unwrap();

    api_mock.assert_async().await;
    assert!(output.contains("No products found."));
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history()[0].spec, "Any laptop");
    assert!(session.history()[0].products.is_empty());
    assert_eq!(session.domains.len(), 6);
}
