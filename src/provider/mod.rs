pub mod openai;
pub mod perplexity;
pub mod two_phase;

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

use crate::config::Config;
use crate::error::{Result, SearchError};
use crate::instrumentation::RunLog;
use crate::llm::{ChatClient, Citation};
use crate::product::{PriceObjective, ProductRecord};

pub use openai::OpenAiTwoPhaseProvider;
pub use perplexity::PerplexityProvider;
pub use two_phase::{run_two_phase, Discovery, TwoPhaseSource, UrlExtraction};

/// Everything a provider needs for one search. The domain set is copied in
/// so it cannot change while the search runs.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub spec: String,
    pub domains: Vec<String>,
    pub objective: PriceObjective,
    pub unit: Option<String>,
}

impl SearchQuery {
    pub fn new(spec: &str, domains: &[String], objective: PriceObjective, unit: Option<&str>) -> Self {
        Self {
            spec: spec.trim().to_string(),
            domains: domains.to_vec(),
            objective,
            unit: unit.map(str::to_string),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.spec.trim().is_empty() {
            return Err(SearchError::EmptySpecification);
        }
        Ok(())
    }
}

/// A provider answer kept for manual inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub label: String,
    pub content: String,
}

/// A product page that could not be turned into products. Non-fatal.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionWarning {
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub products: Vec<ProductRecord>,
    /// The prompt that started the search.
    pub prompt: String,
    pub raw_responses: Vec<RawResponse>,
    pub pages: Vec<Citation>,
    pub warnings: Vec<ExtractionWarning>,
    pub commentary: Option<String>,
    pub run: RunLog,
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search(&self, query: &SearchQuery) -> Result<SearchOutcome>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Perplexity,
    OpenAi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Perplexity => "perplexity",
            ProviderKind::OpenAi => "openai",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "perplexity" | "pplx" => Ok(ProviderKind::Perplexity),
            "openai" => Ok(ProviderKind::OpenAi),
            other => Err(format!(
                "unknown provider '{}' (expected perplexity or openai)",
                other
            )),
        }
    }
}

/// Builds the provider for `kind`, failing when its API key is not configured.
pub fn build_provider(kind: ProviderKind, config: &Config) -> anyhow::Result<Box<dyn SearchProvider>> {
    let api_key = config.api_key(kind)?;
    let provider: Box<dyn SearchProvider> = match kind {
        ProviderKind::Perplexity => Box::new(PerplexityProvider::new(
            ChatClient::new(api_key, &config.perplexity_url),
            &config.perplexity_model,
        )),
        ProviderKind::OpenAi => Box::new(OpenAiTwoPhaseProvider::new(
            ChatClient::new(api_key, &config.openai_url),
            &config.openai_model,
            &config.search_context_size,
        )),
    };
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_trims_spec_and_rejects_blank() {
        let query = SearchQuery::new("  laptop  \n", &[], PriceObjective::None, None);
        assert_eq!(query.spec, "laptop");
        assert!(query.validate().is_ok());

        let blank = SearchQuery::new(" \n\t", &[], PriceObjective::None, None);
        assert!(matches!(blank.validate(), Err(SearchError::EmptySpecification)));
    }

    #[test]
    fn provider_kind_parses() {
        assert_eq!("OpenAI".parse::<ProviderKind>(), Ok(ProviderKind::OpenAi));
        assert_eq!("perplexity".parse::<ProviderKind>(), Ok(ProviderKind::Perplexity));
        assert!("bing".parse::<ProviderKind>().is_err());
        assert_eq!(ProviderKind::OpenAi.to_string(), "openai");
    }
}
