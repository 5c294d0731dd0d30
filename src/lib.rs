pub mod config;
pub mod error;
pub mod extract;
pub mod instrumentation;
pub mod llm;
pub mod product;
pub mod prompt;
pub mod provider;
pub mod render;
pub mod session;
pub mod shell;

pub use config::Config;
pub use error::{Result, SearchError};
pub use extract::{extract, extract_json};
pub use product::{PriceObjective, ProductRecord};
pub use prompt::{build_detail_prompt, build_discovery_prompt, build_prompt};
pub use provider::{
    build_provider, OpenAiTwoPhaseProvider, PerplexityProvider, ProviderKind, SearchOutcome,
    SearchProvider, SearchQuery,
};
pub use session::{DomainSet, SearchHistoryEntry, Session};
