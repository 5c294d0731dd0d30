//! Two-phase search: discover product pages, then extract each page on its
//! own. A page that fails is skipped with a warning; the rest still count.
//!
//! Pages are processed one after another. Products reachable from two pages
//! are reported twice.

use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

use super::{ExtractionWarning, RawResponse, SearchOutcome, SearchQuery};
use crate::error::Result;
use crate::instrumentation::{RunLog, StepLog};
use crate::llm::Citation;
use crate::product::{PriceObjective, ProductRecord};

/// Result of the URL discovery phase.
#[derive(Debug, Clone, PartialEq)]
pub struct Discovery {
    pub prompt: String,
    /// Cited pages in the order the provider reported them.
    pub pages: Vec<Citation>,
    pub commentary: String,
}

/// Products extracted from one page, plus the answer they came from.
#[derive(Debug, Clone)]
pub struct UrlExtraction {
    pub products: Vec<ProductRecord>,
    pub content: String,
}

#[async_trait]
pub trait TwoPhaseSource: Send + Sync {
    async fn discover_urls(&self, spec: &str, domains: &[String]) -> Result<Discovery>;

    async fn extract_from_url(
        &self,
        spec: &str,
        url: &str,
        objective: PriceObjective,
        unit: Option<&str>,
    ) -> Result<UrlExtraction>;
}

pub async fn run_two_phase<S: TwoPhaseSource + ?Sized>(
    source: &S,
    provider: &str,
    query: &SearchQuery,
) -> Result<SearchOutcome> {
    query.validate()?;

    let run_start = Instant::now();
    let mut run = RunLog::new(provider, query.objective.as_str());

    let discovery_start = Instant::now();
    let discovery = source.discover_urls(&query.spec, &query.domains).await?;
    let discovery_latency = discovery_start.elapsed().as_millis() as u64;

    let cited = discovery.pages.len();
    let pages = select_pages(discovery.pages, &query.domains);
    run.record(StepLog::ok("discovery", None, discovery_latency, 0));
    info!(cited, selected = pages.len(), "discovered product pages");

    let mut products: Vec<ProductRecord> = Vec::new();
    let mut warnings: Vec<ExtractionWarning> = Vec::new();
    let mut raw_responses = vec![RawResponse {
        label: "discovery".to_string(),
        content: discovery.commentary.clone(),
    }];

    for (i, page) in pages.iter().enumerate() {
        let step_start = Instant::now();
        let outcome = source
            .extract_from_url(
                &query.spec,
                &page.url,
                query.objective,
                query.unit.as_deref(),
            )
            .await;
        let latency = step_start.elapsed().as_millis() as u64;

        match outcome {
            Ok(extraction) => {
                debug!(
                    page = i + 1,
                    url = %page.url,
                    products = extraction.products.len(),
                    latency_ms = latency,
                    "extracted product page"
                );
                run.record(StepLog::ok(
                    "extract",
                    Some(page.url.as_str()),
                    latency,
                    extraction.products.len(),
                ));
                raw_responses.push(RawResponse {
                    label: page.url.clone(),
                    content: extraction.content,
                });
                products.extend(extraction.products);
            }
            Err(e) => {
                warn!(page = i + 1, url = %page.url, error = %e, "skipping product page");
                if let Some(raw) = e.raw_payload() {
                    raw_responses.push(RawResponse {
                        label: page.url.clone(),
                        content: raw,
                    });
                }
                run.record(StepLog::failed(
                    "extract",
                    Some(page.url.as_str()),
                    latency,
                    e.to_string(),
                ));
                warnings.push(ExtractionWarning {
                    url: page.url.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    run.finish(run_start.elapsed().as_millis() as u64, products.len());
    info!(
        products = products.len(),
        skipped = warnings.len(),
        "two-phase search finished"
    );

    Ok(SearchOutcome {
        products,
        prompt: discovery.prompt,
        raw_responses,
        pages,
        warnings,
        commentary: Some(discovery.commentary),
        run,
    })
}

/// Drops repeated URLs and, with a non-empty allow-list, pages on other hosts.
fn select_pages(pages: Vec<Citation>, domains: &[String]) -> Vec<Citation> {
    let mut seen = HashSet::new();
    pages
        .into_iter()
        .filter(|page| {
            if !seen.insert(page.url.clone()) {
                return false;
            }
            if domains.is_empty() || host_allowed(&page.url, domains) {
                return true;
            }
            debug!(url = %page.url, "dropping page outside the domain allow-list");
            false
        })
        .collect()
}

fn host_allowed(url: &str, domains: &[String]) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    domains.iter().any(|domain| {
        let domain = domain.trim().to_ascii_lowercase();
        let domain = domain.strip_prefix("www.").unwrap_or(&domain);
        host == domain || host.ends_with(&format!(".{}", domain))
    })
}
