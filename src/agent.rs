use std::sync::Arc;

use crate::error::{CommitgenError, Result};
use crate::llm::LanguageModel;
use crate::message::Turn;
use crate::prompt::DEFAULT_INSTRUCTION;
use crate::tool::{declarations, ToolDeclaration, ToolKind, Toolbox};
use crate::transcript::Transcript;

/// Synthetic user turn inserted between a tool call and its result. The
/// Gemini API misbehaves when a function response arrives without an
/// accompanying user query, so the result is prefaced with this text.
const TOOL_RESULT_PREFACE: &str = "Here is the result of the function call, \
now please continue the conversation based on this information";

/// An agent that alternates between the model and the commit tools until the
/// model produces a final text answer.
///
/// Owns the transcript for one session; repeated `process` calls keep
/// accumulating turns, which is what makes interactive mode multi-turn.
pub struct Agent<M: LanguageModel> {
    instruction: String,
    model: Arc<M>,
    toolbox: Toolbox,
    tool_declarations: Vec<ToolDeclaration>,
    transcript: Transcript,
    max_tool_calls: usize,
}

impl<M: LanguageModel> Agent<M> {
    pub fn new(model: Arc<M>) -> Self {
        Self {
            instruction: DEFAULT_INSTRUCTION.to_string(),
            model,
            toolbox: Toolbox::default(),
            tool_declarations: declarations(),
            transcript: Transcript::new(),
            max_tool_calls: 8,
        }
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    pub fn with_toolbox(mut self, toolbox: Toolbox) -> Self {
        self.toolbox = toolbox;
        self
    }

    /// Cap on tool calls serviced within one `process` call. A model that
    /// never converges to a text answer fails with `ToolLoopExceeded`
    /// instead of looping (and billing) forever.
    pub fn with_max_tool_calls(mut self, max_tool_calls: usize) -> Self {
        self.max_tool_calls = max_tool_calls.max(1);
        self
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Run one exchange: append the user's input, then alternate between the
    /// model and tool dispatch until the model returns text.
    pub async fn process(&mut self, line: impl Into<String>) -> Result<String> {
        self.transcript.push(Turn::user(line));

        let mut served = 0;
        loop {
            let response = self
                .model
                .generate(self.transcript.snapshot(), &self.instruction, &self.tool_declarations)
                .await?;

            let call = match (response.text, response.tool_call) {
                (Some(text), None) => {
                    self.transcript.push(Turn::model_text(&text));
                    return Ok(text);
                }
                (None, Some(call)) => call,
                (Some(_), Some(_)) => {
                    return Err(CommitgenError::Protocol(
                        "model response carried both text and a tool call".into(),
                    ));
                }
                (None, None) => {
                    return Err(CommitgenError::Protocol(
                        "model response carried neither text nor a tool call".into(),
                    ));
                }
            };

            // Unknown names are fatal before anything runs.
            let kind = ToolKind::from_name(&call.name)
                .ok_or_else(|| CommitgenError::ToolNotFound(call.name.clone()))?;

            if served == self.max_tool_calls {
                return Err(CommitgenError::ToolLoopExceeded(self.max_tool_calls));
            }
            served += 1;

            tracing::debug!(tool = kind.name(), "dispatching tool call");
            self.transcript
                .push(Turn::tool_call(&call.name, call.arguments.clone()));
            let payload = self.toolbox.dispatch(kind, &call.arguments).await;
            self.transcript.push(Turn::user(TOOL_RESULT_PREFACE));
            self.transcript.push(Turn::tool_result(&call.name, payload));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::llm::{ModelResponse, StubModel};
    use crate::message::{Role, TurnContent};

    #[tokio::test]
    async fn returns_text_without_tool_calls() {
        let model = StubModel::new(vec![ModelResponse::text("chore: no changes")]);
        let mut agent = Agent::new(model);

        let reply = agent.process("").await.unwrap();

        assert_eq!(reply, "chore: no changes");
        assert_eq!(agent.transcript().len(), 2);
    }

    #[tokio::test]
    async fn malformed_response_is_a_protocol_error() {
        let model = StubModel::new(vec![ModelResponse {
            text: None,
            tool_call: None,
        }]);
        let mut agent = Agent::new(model);

        let err = agent.process("").await.unwrap_err();
        assert!(matches!(err, CommitgenError::Protocol(_)));
    }

    #[tokio::test]
    async fn both_fields_populated_is_a_protocol_error() {
        let model = StubModel::new(vec![ModelResponse {
            text: Some("feat: x".into()),
            tool_call: Some(crate::message::ToolCall {
                name: "diff".into(),
                arguments: json!({}),
            }),
        }]);
        let mut agent = Agent::new(model);

        let err = agent.process("").await.unwrap_err();
        assert!(matches!(err, CommitgenError::Protocol(_)));
    }

    #[tokio::test]
    async fn unknown_tool_is_fatal_before_dispatch() {
        let model = StubModel::new(vec![ModelResponse::tool_call("format_disk", json!({}))]);
        let mut agent = Agent::new(model);

        let err = agent.process("").await.unwrap_err();
        assert!(matches!(err, CommitgenError::ToolNotFound(name) if name == "format_disk"));
        // The model tool-call turn was never appended; only the user input is.
        assert_eq!(agent.transcript().len(), 1);
    }

    #[tokio::test]
    async fn runaway_tool_calls_hit_the_cap() {
        let dir = tempfile::tempdir().unwrap();
        let responses = (0..4)
            .map(|_| ModelResponse::tool_call("list_files", json!({})))
            .collect();
        let model = StubModel::new(responses);
        let mut agent = Agent::new(model)
            .with_toolbox(Toolbox::new(dir.path()))
            .with_max_tool_calls(3);

        let err = agent.process("").await.unwrap_err();
        assert!(matches!(err, CommitgenError::ToolLoopExceeded(3)));
    }

    #[tokio::test]
    async fn transcript_accumulates_across_process_calls() {
        let model = StubModel::new(vec![
            ModelResponse::text("feat: first"),
            ModelResponse::text("feat: second"),
        ]);
        let mut agent = Agent::new(model);

        agent.process("summarize").await.unwrap();
        agent.process("again").await.unwrap();

        assert_eq!(agent.transcript().len(), 4);
        let roles: Vec<Role> = agent.transcript().iter().map(|turn| turn.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Model, Role::User, Role::Model]);
    }

    #[tokio::test]
    async fn tool_call_turn_is_followed_by_its_result() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.rs"), "fn main() {}\n").unwrap();

        let model = StubModel::new(vec![
            ModelResponse::tool_call("read_file", json!({ "name": "main.rs" })),
            ModelResponse::text("feat: add entry point"),
        ]);
        let mut agent = Agent::new(model).with_toolbox(Toolbox::new(dir.path()));

        agent.process("").await.unwrap();

        let turns = agent.transcript().snapshot();
        let call_idx = turns
            .iter()
            .position(|turn| matches!(turn.content, TurnContent::ToolCall(_)))
            .unwrap();
        match &turns[call_idx + 2].content {
            TurnContent::ToolResult(output) => {
                assert_eq!(output.name, "read_file");
                assert_eq!(output.payload, "fn main() {}\n");
            }
            other => panic!("expected tool result after filler turn, got {other:?}"),
        }
    }
}
