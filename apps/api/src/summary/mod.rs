//! Summary service: the single point of entry for all LLM completions in RoleReady.
//!
//! Every call is one synchronous request at temperature 0. Nothing is retried:
//! transport, quota and empty-content failures surface as `SummaryError`.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

use prompts::{SUMMARY_PROMPT_TEMPLATE, SUMMARY_SYSTEM_TEMPLATE};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all summaries. Hardcoded so outputs stay comparable.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 1024;
/// Fixed decoding temperature: identical input yields identical output.
const TEMPERATURE: f32 = 0.0;

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Word-count window a summary must fit into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordBudget {
    pub min: u32,
    pub max: u32,
}

impl WordBudget {
    pub const fn between(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub const fn at_most(max: u32) -> Self {
        Self { min: 0, max }
    }

    fn describe(&self) -> String {
        if self.min == 0 {
            format!("no more than {} words", self.max)
        } else {
            format!("between {} and {} words", self.min, self.max)
        }
    }
}

/// Text summarization seam. `LlmClient` is the production backend; tests swap in fakes.
#[async_trait]
pub trait SummaryService: Send + Sync {
    async fn summarize(&self, text: &str, budget: WordBudget) -> Result<String, SummaryError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Anthropic Messages API client.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }

    /// Makes one raw call to the Claude API, returning the full response object.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, SummaryError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(SummaryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        Ok(llm_response)
    }
}

#[async_trait]
impl SummaryService for LlmClient {
    async fn summarize(&self, text: &str, budget: WordBudget) -> Result<String, SummaryError> {
        let (system, prompt) = build_summary_prompt(text, budget);
        let response = self.call(&prompt, &system).await?;
        let summary = response.text().map(str::trim).unwrap_or_default();
        if summary.is_empty() {
            return Err(SummaryError::EmptyContent);
        }
        Ok(summary.to_string())
    }
}

fn build_summary_prompt(text: &str, budget: WordBudget) -> (String, String) {
    let system = SUMMARY_SYSTEM_TEMPLATE.replace("{budget}", &budget.describe());
    let prompt = SUMMARY_PROMPT_TEMPLATE
        .replace("{budget}", &budget.describe())
        .replace("{text}", text);
    (system, prompt)
}
