use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::debug;

use crate::error::{Result, SearchError};

/// Low sampling temperature biases providers toward factual output.
pub const TEMPERATURE: f64 = 0.2;

/// Chat-completions client shared by every provider.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebSearchOptions {
    pub search_context_size: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_domain_filter: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    web_search_options: Option<&'a WebSearchOptions>,
    temperature: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
    annotations: Option<Vec<Annotation>>,
}

#[derive(Debug, Clone, Deserialize)]
struct Annotation {
    #[serde(rename = "type")]
    kind: String,
    url_citation: Option<UrlCitation>,
}

#[derive(Debug, Clone, Deserialize)]
struct UrlCitation {
    url: String,
    title: Option<String>,
}

/// One request: an optional system message, one user message and the
/// provider-specific search parameters.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub model: String,
    pub system: Option<String>,
    pub user: String,
    pub domain_filter: Option<Vec<String>>,
    pub web_search: Option<WebSearchOptions>,
}

/// A page the provider cited while answering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub citations: Vec<Citation>,
    /// Full response body, kept for inspection.
    pub raw: Value,
    pub latency_ms: u64,
}

impl ChatClient {
    pub fn new(api_key: &str, endpoint: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            endpoint: endpoint.to_string(),
        }
    }

    /// Sends exactly one request. Non-success statuses become `SearchError::Api`.
    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let mut messages = Vec::new();
        if let Some(system) = request.system.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.user,
        });

        let body = ChatCompletionRequest {
            model: &request.model,
            messages,
            search_domain_filter: request.domain_filter.as_deref(),
            web_search_options: request.web_search.as_ref(),
            temperature: TEMPERATURE,
        };

        debug!(
            endpoint = %self.endpoint,
            model = %request.model,
            prompt_chars = request.user.len(),
            "sending chat completion request"
        );

        let start = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .header("authorization", format!("Bearer {}", &self.api_key))
            .header("accept", "application/json")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let latency_ms = start.elapsed().as_millis() as u64;

        if !status.is_success() {
            return Err(SearchError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let raw: Value = match serde_json::from_str(&text) {
            Ok(raw) => raw,
            Err(_) => return Err(SearchError::MalformedResponse { raw: text }),
        };
        let envelope: ChatCompletionResponse = match serde_json::from_value(raw.clone()) {
            Ok(envelope) => envelope,
            Err(_) => return Err(SearchError::MalformedResponse { raw: text }),
        };

        let message = envelope.choices.into_iter().next().map(|c| c.message);
        let content = message
            .as_ref()
            .and_then(|m| m.content.clone())
            .unwrap_or_default();
        let citations = message
            .and_then(|m| m.annotations)
            .unwrap_or_default()
            .into_iter()
            .filter(|a| a.kind == "url_citation")
            .filter_map(|a| a.url_citation)
            .map(|c| Citation {
                title: c.title.unwrap_or_default(),
                url: c.url,
            })
            .collect::<Vec<_>>();

        debug!(
            latency_ms,
            content_chars = content.len(),
            citations = citations.len(),
            "chat completion received"
        );

        Ok(ChatResponse {
            content,
            citations,
            raw,
            latency_ms,
        })
    }
}
