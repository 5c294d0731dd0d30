use async_trait::async_trait;
use tracing::info;

use super::two_phase::{run_two_phase, Discovery, TwoPhaseSource, UrlExtraction};
use super::{SearchOutcome, SearchProvider, SearchQuery};
use crate::error::Result;
use crate::extract::extract;
use crate::llm::{ChatClient, ChatRequest, WebSearchOptions};
use crate::product::PriceObjective;
use crate::prompt::{build_detail_prompt, build_discovery_prompt};

/// OpenAI search-preview models: URLs come from the answer's citation
/// annotations, then every page is queried on its own.
pub struct OpenAiTwoPhaseProvider {
    client: ChatClient,
    model: String,
    web_search: WebSearchOptions,
}

impl OpenAiTwoPhaseProvider {
    pub fn new(client: ChatClient, model: &str, search_context_size: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
            web_search: WebSearchOptions {
                search_context_size: search_context_size.to_string(),
            },
        }
    }

    fn request(&self, prompt: String) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            system: None,
            user: prompt,
            domain_filter: None,
            web_search: Some(self.web_search.clone()),
        }
    }
}

#[async_trait]
impl TwoPhaseSource for OpenAiTwoPhaseProvider {
    async fn discover_urls(&self, spec: &str, domains: &[String]) -> Result<Discovery> {
        let prompt = build_discovery_prompt(spec, domains);
        info!(model = %self.model, domains = domains.len(), "discovering product pages");

        let response = self.client.complete(&self.request(prompt.clone())).await?;

        Ok(Discovery {
            prompt,
            pages: response.citations,
            commentary: response.content,
        })
    }

    async fn extract_from_url(
        &self,
        spec: &str,
        url: &str,
        objective: PriceObjective,
        unit: Option<&str>,
    ) -> Result<UrlExtraction> {
        let prompt = build_detail_prompt(spec, url, objective, unit);
        info!(url = %url, "extracting product page");

        let response = self.client.complete(&self.request(prompt)).await?;
        let products = extract(&response.content)?;

        Ok(UrlExtraction {
            products,
            content: response.content,
        })
    }
}

#[async_trait]
impl SearchProvider for OpenAiTwoPhaseProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchOutcome> {
        run_two_phase(self, self.name(), query).await
    }
}
