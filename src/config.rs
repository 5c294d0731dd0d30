use anyhow::{Context, Result};

use crate::provider::ProviderKind;

pub const DEFAULT_PERPLEXITY_URL: &str = "https://api.perplexity.ai/chat/completions";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";

const SEARCH_CONTEXT_SIZES: [&str; 3] = ["low", "medium", "high"];

#[derive(Debug, Clone)]
pub struct Config {
    pub perplexity_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub perplexity_url: String,
    pub openai_url: String,
    pub perplexity_model: String,
    pub openai_model: String,
    pub search_context_size: String,
    pub run_log_dir: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let search_context_size = var("SEARCH_CONTEXT_SIZE")
            .map(|v| v.trim().to_ascii_lowercase())
            .unwrap_or_else(|| "medium".into());
        if !SEARCH_CONTEXT_SIZES.contains(&search_context_size.as_str()) {
            anyhow::bail!(
                "SEARCH_CONTEXT_SIZE must be one of low, medium or high (got '{}')",
                search_context_size
            );
        }

        Ok(Self {
            perplexity_api_key: var("PERPLEXITY_API_KEY"),
            openai_api_key: var("OPENAI_API_KEY"),
            perplexity_url: var("PERPLEXITY_API_URL").unwrap_or_else(|| DEFAULT_PERPLEXITY_URL.into()),
            openai_url: var("OPENAI_API_URL").unwrap_or_else(|| DEFAULT_OPENAI_URL.into()),
            perplexity_model: var("PERPLEXITY_MODEL").unwrap_or_else(|| "sonar-pro".into()),
            openai_model: var("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-search-preview".into()),
            search_context_size,
            run_log_dir: var("RUN_LOG_DIR"),
        })
    }

    /// The credential for `provider`, or a setup instruction when it is missing.
    pub fn api_key(&self, provider: ProviderKind) -> Result<&str> {
        let (key, var) = match provider {
            ProviderKind::Perplexity => (&self.perplexity_api_key, "PERPLEXITY_API_KEY"),
            ProviderKind::OpenAi => (&self.openai_api_key, "OPENAI_API_KEY"),
        };
        key.as_deref().with_context(|| {
            format!(
                "{var} not found.\n\n1. Create a `.env` file next to where you run market-scout:\n\n    {var}=your_{provider}_api_key\n\n   (or export {var} in your shell)\n\n2. Run the command again.",
                var = var,
                provider = provider.as_str(),
            )
        })
    }
}
