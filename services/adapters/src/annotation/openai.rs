//! OpenAI Responses API annotator
//!
//! One `POST {base_url}/responses` per cycle. The numeric snapshot goes in
//! as a JSON string under `input`; the model is told to answer with a JSON
//! object `symbol -> [reason, reason]` and nothing else.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use movers_types::{AnnotationInput, ReasonMap};

use crate::annotation::{Annotator, MAX_REASON_CHARS, REASONS_PER_SYMBOL};
use crate::common::{endpoint_url, send_json};
use crate::{AdapterError, Result};

const ENDPOINT: &str = "responses";

const INSTRUCTIONS: &str = "You are a crypto futures market reporter. \
Never invent events such as upgrades, partnerships, listings or rumors. \
Interpret only the numbers provided (returns, turnover, funding, open interest, RSI, EMA). \
For each symbol write exactly two very short reasons, each at most 35 characters. \
Output JSON only, as an object mapping symbol to an array of two strings. No code blocks.";

/// Annotator backed by the OpenAI Responses API
#[derive(Clone)]
pub struct OpenAiAnnotator {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout_ms: u64,
}

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    input: String,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsesReply {
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Default, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentPart {
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl ResponsesReply {
    fn text(&self) -> String {
        if let Some(text) = self.output_text.as_deref().filter(|t| !t.trim().is_empty()) {
            return text.to_string();
        }
        self.output
            .iter()
            .flat_map(|item| item.content.iter())
            .filter(|part| part.kind == "output_text")
            .filter_map(|part| part.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

impl OpenAiAnnotator {
    /// Create an annotator; an empty key disables it
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout_ms: u64,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            timeout_ms,
        }
    }

    /// Whether an API key is configured
    pub fn is_enabled(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[async_trait]
impl Annotator for OpenAiAnnotator {
    async fn summarize(&self, items: &[AnnotationInput]) -> Result<ReasonMap> {
        if !self.is_enabled() {
            return Err(AdapterError::Disabled("annotator".to_string()));
        }

        let url = endpoint_url(&self.base_url, ENDPOINT)?;
        let input = serde_json::to_string(&json!({ "items": items }))
            .map_err(|e| AdapterError::decode(ENDPOINT, e))?;
        let body = ResponsesRequest {
            model: &self.model,
            instructions: INSTRUCTIONS,
            input,
        };

        let request = self.http.post(url).bearer_auth(&self.api_key).json(&body);
        let reply: ResponsesReply = send_json(ENDPOINT, request, self.timeout_ms).await?;

        let text = reply.text();
        debug!(chars = text.len(), model = %self.model, "Annotation reply received");
        parse_reasons(&text)
    }
}

/// Parse the model's answer into a normalized [`ReasonMap`]
///
/// Accepts an optional code fence around the JSON. Values may be an array of
/// reasons or a single string. Each reason is trimmed and cut to
/// [`MAX_REASON_CHARS`]; at most [`REASONS_PER_SYMBOL`] are kept.
pub fn parse_reasons(text: &str) -> Result<ReasonMap> {
    let body = strip_code_fence(text.trim());
    let value: Value = serde_json::from_str(body).map_err(|e| AdapterError::decode(ENDPOINT, e))?;

    let Value::Object(entries) = value else {
        return Err(AdapterError::decode(ENDPOINT, "reply is not a JSON object"));
    };

    let mut reasons = ReasonMap::new();
    for (symbol, value) in entries {
        let raw: Vec<&Value> = match &value {
            Value::Array(list) => list.iter().collect(),
            Value::Null => Vec::new(),
            other => vec![other],
        };

        let cleaned: Vec<String> = raw
            .into_iter()
            .map(|v| match v {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            })
            .filter(|s| !s.is_empty())
            .map(|s| s.chars().take(MAX_REASON_CHARS).collect::<String>().trim_end().to_string())
            .take(REASONS_PER_SYMBOL)
            .collect();

        reasons.insert(symbol, cleaned);
    }
    Ok(reasons)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop an optional language tag on the opening fence
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
