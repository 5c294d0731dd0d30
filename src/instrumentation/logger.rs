use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// One outbound request within a search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepLog {
    pub step: String,
    pub target: Option<String>,
    pub latency_ms: u64,
    pub num_products: u32,
    pub error: Option<String>,
}

impl StepLog {
    pub fn ok(step: &str, target: Option<&str>, latency_ms: u64, num_products: usize) -> Self {
        Self {
            step: step.to_string(),
            target: target.map(str::to_string),
            latency_ms,
            num_products: num_products as u32,
            error: None,
        }
    }

    pub fn failed(step: &str, target: Option<&str>, latency_ms: u64, error: String) -> Self {
        Self {
            step: step.to_string(),
            target: target.map(str::to_string),
            latency_ms,
            num_products: 0,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLog {
    pub id: String,
    pub timestamp: String,
    pub provider: String,
    pub objective: String,
    pub steps: Vec<StepLog>,
    pub total_latency_ms: u64,
    pub total_products: u32,
}

impl RunLog {
    pub fn new(provider: &str, objective: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            provider: provider.to_string(),
            objective: objective.to_string(),
            steps: Vec::new(),
            total_latency_ms: 0,
            total_products: 0,
        }
    }

    pub fn record(&mut self, step: StepLog) {
        self.steps.push(step);
    }

    pub fn finish(&mut self, total_latency_ms: u64, total_products: usize) {
        self.total_latency_ms = total_latency_ms;
        self.total_products = total_products as u32;
    }

    pub fn failed_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.error.is_some()).count()
    }

    pub fn summary(&self) -> String {
        format!(
            "Provider: {} | Requests: {} (failed: {}) | Products: {} | Total latency: {:.1}s",
            self.provider,
            self.steps.len(),
            self.failed_steps(),
            self.total_products,
            self.total_latency_ms as f64 / 1000.0,
        )
    }
}

/// File under the log directory that collects one line per search.
pub const SEARCH_LOG_FILE: &str = "searches.jsonl";

/// A search as written to the log: what was asked, where, and how the
/// requests went.
#[derive(Debug, Serialize)]
struct SearchLogLine<'a> {
    spec: &'a str,
    domains: &'a [String],
    #[serde(flatten)]
    run: &'a RunLog,
}

/// Appends finished searches as JSON lines to `<dir>/searches.jsonl`.
pub struct RunLogger {
    dir: PathBuf,
}

impl RunLogger {
    pub fn new(dir: &str) -> Result<Self> {
        let dir = PathBuf::from(dir);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create search log directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(SEARCH_LOG_FILE)
    }

    pub fn write(&self, spec: &str, domains: &[String], run: &RunLog) -> Result<()> {
        let line = SearchLogLine { spec, domains, run };
        let json = serde_json::to_string(&line).context("Failed to serialize search log")?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path())
            .context("Failed to open search log")?;
        writeln!(file, "{}", json).context("Failed to write search log")?;

        Ok(())
    }
}
