pub mod client;

pub use client::{ChatClient, ChatRequest, ChatResponse, Citation, WebSearchOptions};
