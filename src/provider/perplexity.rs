use async_trait::async_trait;
use std::time::Instant;
use tracing::{info, warn};

use super::{RawResponse, SearchOutcome, SearchProvider, SearchQuery};
use crate::error::Result;
use crate::extract::extract;
use crate::instrumentation::{RunLog, StepLog};
use crate::llm::{ChatClient, ChatRequest};
use crate::prompt::{build_prompt, SYSTEM_PROMPT};

/// Single-phase search: one prompt, the domain set as the provider's
/// search filter, and the answer parsed straight into products.
pub struct PerplexityProvider {
    client: ChatClient,
    model: String,
}

impl PerplexityProvider {
    pub fn new(client: ChatClient, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl SearchProvider for PerplexityProvider {
    fn name(&self) -> &'static str {
        "perplexity"
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchOutcome> {
        query.validate()?;

        let start = Instant::now();
        let mut run = RunLog::new(self.name(), query.objective.as_str());
        let prompt = build_prompt(&query.spec, query.objective, query.unit.as_deref());

        let request = ChatRequest {
            model: self.model.clone(),
            system: Some(SYSTEM_PROMPT.to_string()),
            user: prompt.clone(),
            domain_filter: (!query.domains.is_empty()).then(|| query.domains.clone()),
            web_search: None,
        };

        info!(
            model = %self.model,
            domains = query.domains.len(),
            objective = %query.objective,
            "searching products"
        );

        let response = self.client.complete(&request).await?;
        let products = match extract(&response.content) {
            Ok(products) => products,
            Err(e) => {
                warn!(error = %e, "provider answer holds no product list");
                return Err(e);
            }
        };

        run.record(StepLog::ok(
            "search",
            None,
            response.latency_ms,
            products.len(),
        ));
        run.finish(start.elapsed().as_millis() as u64, products.len());
        info!(products = products.len(), "search finished");

        Ok(SearchOutcome {
            products,
            prompt,
            raw_responses: vec![RawResponse {
                label: "search".to_string(),
                content: response.content,
            }],
            pages: response.citations,
            warnings: Vec::new(),
            commentary: None,
            run,
        })
    }
}
