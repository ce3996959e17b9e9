use anyhow::Context as _;
use async_trait::async_trait;
use serde::Deserialize;
use shared::protocol::{IntentRequest, StatusReport};

/// Turns free-form operator text into an ordered list of structured intents.
#[async_trait]
pub trait CommandInterpreter: Send + Sync {
    async fn interpret(&self, command: &str) -> anyhow::Result<Vec<IntentRequest>>;
}

/// Renders a completed action plus the robot's raw report into a
/// human-readable status line for the operator.
#[async_trait]
pub trait StatusFormatter: Send + Sync {
    async fn format_status(&self, report: &StatusReport) -> anyhow::Result<String>;
}

const ANALYZE_PROMPT: &str = r#"You analyze movement commands from an operator and reply with JSON only.

Return a JSON object of the form:
{"actions": [{"intent": "<one of: tien, lui, re_trai, re_phai, dung_lai, nang, ha>", "params": {}}]}

Rules:
- Keep the actions in the order the operator stated them; keep repeats.
- An action without parameters gets "params": {}.
- A quantity with a unit splits into a numeric value plus "unit",
  e.g. "distance": 5, "unit": "m" or "angle": 90, "unit": "deg".
- A turn with no stated angle defaults to "angle": 90, "unit": "deg".
- Reply with valid JSON and nothing else.

Command:
"#;

const STATUS_PROMPT: &str = r#"You describe the outcome of a single robot action for its operator.
If the report indicates success, reply exactly "OK: <short description of the action>".
If it indicates failure, reply exactly "ERROR: <short description of the problem>".
One line, no markup, no extra characters."#;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini-backed implementation of both collaborators.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.into(),
        }
    }

    async fn generate(&self, prompt: String) -> anyhow::Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });
        let response: GenerateResponse = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| anyhow::anyhow!("model returned no candidates"))
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: String,
}

#[async_trait]
impl CommandInterpreter for GeminiClient {
    async fn interpret(&self, command: &str) -> anyhow::Result<Vec<IntentRequest>> {
        let raw = self.generate(format!("{ANALYZE_PROMPT}{command}")).await?;
        extract_intents(&raw)
    }
}

#[async_trait]
impl StatusFormatter for GeminiClient {
    async fn format_status(&self, report: &StatusReport) -> anyhow::Result<String> {
        let context = serde_json::to_string_pretty(report)?;
        let raw = self
            .generate(format!("{STATUS_PROMPT}\nCurrent report:\n{context}"))
            .await?;
        Ok(raw.trim().to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ActionList {
    actions: Vec<IntentRequest>,
}

/// Model output is JSON, frequently wrapped in a markdown code fence.
fn extract_intents(raw: &str) -> anyhow::Result<Vec<IntentRequest>> {
    let stripped = strip_code_fence(raw);
    let parsed: ActionList =
        serde_json::from_str(stripped).context("model output is not a valid action list")?;
    Ok(parsed.actions)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    let inner = inner.trim_start();
    let inner = inner
        .strip_prefix("json")
        .or_else(|| inner.strip_prefix("JSON"))
        .unwrap_or(inner);
    inner.trim()
}
