use thiserror::Error;

/// Failures surfaced by the search core.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("API request failed with status code {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to reach search API: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Could not extract a valid product list from the response")]
    MalformedResponse { raw: String },

    #[error("The response format is not as expected: {value}")]
    UnexpectedShape { value: serde_json::Value },

    #[error("Technical specification is empty")]
    EmptySpecification,
}

impl SearchError {
    /// Raw payload worth showing to the user next to the error, if any.
    pub fn raw_payload(&self) -> Option<String> {
        match self {
            SearchError::Api { body, .. } => Some(body.clone()),
            SearchError::MalformedResponse { raw } => Some(raw.clone()),
            SearchError::UnexpectedShape { value } => serde_json::to_string_pretty(value).ok(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
