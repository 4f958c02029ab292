//! Language model abstraction and the Gemini implementation.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::Config;
use crate::error::{CommitgenError, Result};
use crate::message::{Role, ToolCall, Turn, TurnContent};
use crate::tool::ToolDeclaration;

/// One model turn: either free text or a single tool-call request.
///
/// Exactly one field is populated per well-formed response; the agent loop
/// treats anything else as a protocol violation.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    pub text: Option<String>,
    pub tool_call: Option<ToolCall>,
}

impl ModelResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            tool_call: None,
        }
    }

    pub fn tool_call(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            text: None,
            tool_call: Some(ToolCall {
                name: name.into(),
                arguments,
            }),
        }
    }
}

/// Minimal abstraction over one "generate the next turn" round trip.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(
        &self,
        transcript: &[Turn],
        instruction: &str,
        tools: &[ToolDeclaration],
    ) -> Result<ModelResponse>;
}

fn coalesce_error(status: reqwest::StatusCode, body: &str) -> CommitgenError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return CommitgenError::LanguageModel(format!("gemini rate limit exceeded: {body}"));
    }
    CommitgenError::LanguageModel(format!("gemini request failed with {status}: {body}"))
}

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    model: String,
    api_key: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .map_err(|err| CommitgenError::LanguageModel(format!("http client error: {err}")))?,
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
            endpoint: cfg.endpoint.clone(),
        })
    }

    fn to_contents(&self, transcript: &[Turn]) -> Vec<GeminiContent> {
        transcript
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    Role::User => "user",
                    Role::Model => "model",
                };
                let part = match &turn.content {
                    TurnContent::Text { text } => GeminiPart {
                        text: Some(text.clone()),
                        ..GeminiPart::default()
                    },
                    TurnContent::ToolCall(call) => GeminiPart {
                        function_call: Some(GeminiFunctionCall {
                            name: call.name.clone(),
                            args: call.arguments.clone(),
                        }),
                        ..GeminiPart::default()
                    },
                    TurnContent::ToolResult(output) => GeminiPart {
                        function_response: Some(GeminiFunctionResponse {
                            name: output.name.clone(),
                            response: json!({ "result": output.payload }),
                        }),
                        ..GeminiPart::default()
                    },
                };
                GeminiContent {
                    role: role.to_string(),
                    parts: vec![part],
                }
            })
            .collect()
    }

    fn to_declarations(&self, tools: &[ToolDeclaration]) -> Option<Value> {
        if tools.is_empty() {
            return None;
        }
        let declarations: Vec<Value> = tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.parameters,
                })
            })
            .collect();
        Some(json!([{ "functionDeclarations": declarations }]))
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(
        &self,
        transcript: &[Turn],
        instruction: &str,
        tools: &[ToolDeclaration],
    ) -> Result<ModelResponse> {
        let mut payload = json!({
            "contents": self.to_contents(transcript),
            "systemInstruction": { "parts": [{ "text": instruction }] },
        });
        if let Some(declarations) = self.to_declarations(tools) {
            payload["tools"] = declarations;
        }

        tracing::debug!(model = %self.model, turns = transcript.len(), "calling Gemini");

        let resp = self
            .http
            .post(format!(
                "{}/models/{}:generateContent?key={}",
                self.endpoint, self.model, self.api_key
            ))
            .json(&payload)
            .send()
            .await
            .map_err(|err| CommitgenError::LanguageModel(format!("gemini request error: {err}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(coalesce_error(status, &body));
        }

        let parsed: GeminiResponse = resp.json().await.map_err(|err| {
            CommitgenError::LanguageModel(format!("gemini response parse error: {err}"))
        })?;

        let parts = parsed
            .candidates
            .into_iter()
            .next()
            .map(|cand| cand.content.parts)
            .unwrap_or_default();

        let mut text = String::new();
        let mut tool_call = None;
        for part in parts {
            if let Some(chunk) = part.text {
                text.push_str(&chunk);
            }
            if tool_call.is_none() {
                if let Some(call) = part.function_call {
                    tool_call = Some(ToolCall {
                        name: call.name,
                        arguments: call.args,
                    });
                }
            }
        }

        // A function call takes precedence over any accompanying text so the
        // response always carries exactly one of the two.
        if tool_call.is_some() {
            return Ok(ModelResponse { text: None, tool_call });
        }
        Ok(ModelResponse {
            text: if text.is_empty() { None } else { Some(text) },
            tool_call: None,
        })
    }
}

/// Scripted model for tests: pops one canned response per call.
pub struct StubModel {
    responses: Mutex<VecDeque<ModelResponse>>,
}

impl StubModel {
    pub fn new(responses: Vec<ModelResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
        })
    }
}

#[async_trait]
impl LanguageModel for StubModel {
    async fn generate(
        &self,
        _transcript: &[Turn],
        _instruction: &str,
        _tools: &[ToolDeclaration],
    ) -> Result<ModelResponse> {
        let mut locked = self.responses.lock().expect("stub model poisoned");
        locked.pop_front().ok_or_else(|| {
            CommitgenError::LanguageModel("StubModel ran out of scripted responses".into())
        })
    }
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "functionCall", skip_serializing_if = "Option::is_none")]
    function_call: Option<GeminiFunctionCall>,
    #[serde(rename = "functionResponse", skip_serializing_if = "Option::is_none")]
    function_response: Option<GeminiFunctionResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}
