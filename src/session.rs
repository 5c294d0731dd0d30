//! Per-session state owned by the presentation layer. Nothing here is
//! persisted; it lives as long as the process.

use crate::product::{PriceObjective, ProductRecord};
use crate::provider::SearchOutcome;

pub const DEFAULT_DOMAINS: [&str; 6] = [
    "vaistai.lt",
    "kainos.lt",
    "kaina24.lt",
    "gintarine.lt",
    "eurovaistine.lt",
    "manovaistine.lt",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddDomain {
    Added,
    AlreadyPresent,
    Empty,
}

/// Ordered set of domains the provider's search is restricted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSet {
    domains: Vec<String>,
}

impl Default for DomainSet {
    fn default() -> Self {
        Self {
            domains: DEFAULT_DOMAINS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl DomainSet {
    /// Adds one domain. Only exact duplicates are rejected.
    pub fn add(&mut self, domain: &str) -> AddDomain {
        let domain = domain.trim();
        if domain.is_empty() {
            return AddDomain::Empty;
        }
        if self.contains(domain) {
            return AddDomain::AlreadyPresent;
        }
        self.domains.push(domain.to_string());
        AddDomain::Added
    }

    /// Deselects a domain. Returns whether it was present.
    pub fn remove(&mut self, domain: &str) -> bool {
        let before = self.domains.len();
        self.domains.retain(|d| d != domain.trim());
        self.domains.len() != before
    }

    /// Keeps only the given domains, in their given order.
    pub fn replace(&mut self, domains: &[String]) {
        self.domains.clear();
        for domain in domains {
            self.add(domain);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.domains.iter().any(|d| d == domain)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.domains
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

/// One completed search.
#[derive(Debug, Clone)]
pub struct SearchHistoryEntry {
    /// Local time at completion, `%Y-%m-%d %H:%M:%S`.
    pub timestamp: String,
    pub spec: String,
    pub objective: PriceObjective,
    pub unit: Option<String>,
    pub provider: String,
    pub products: Vec<ProductRecord>,
}

impl SearchHistoryEntry {
    pub fn new(
        spec: &str,
        objective: PriceObjective,
        unit: Option<&str>,
        provider: &str,
        products: Vec<ProductRecord>,
    ) -> Self {
        Self {
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            spec: spec.to_string(),
            objective,
            unit: unit.map(str::to_string),
            provider: provider.to_string(),
            products,
        }
    }
}

/// Interactive session: search settings, history and the last outcome.
#[derive(Debug, Default)]
pub struct Session {
    pub domains: DomainSet,
    pub objective: PriceObjective,
    pub unit: Option<String>,
    history: Vec<SearchHistoryEntry>,
    last: Option<SearchOutcome>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a history entry for a completed search, empty or not, and
    /// keeps the outcome for inspection.
    pub fn record(&mut self, spec: &str, provider: &str, outcome: SearchOutcome) {
        self.history.push(SearchHistoryEntry::new(
            spec,
            self.objective,
            self.unit.as_deref(),
            provider,
            outcome.products.clone(),
        ));
        self.last = Some(outcome);
    }

    /// Completed searches, oldest first.
    pub fn history(&self) -> &[SearchHistoryEntry] {
        &self.history
    }

    pub fn last_outcome(&self) -> Option<&SearchOutcome> {
        self.last.as_ref()
    }
}
