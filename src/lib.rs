//! LLM-driven commit message generation for Mercurial working copies.
//!
//! The crate provides a small agent runtime with:
//! - A language model abstraction (`LanguageModel`) and a Gemini client.
//! - A closed tool set (`ToolKind`/`Toolbox`): list files, read a file, hg diff.
//! - An `Agent` that loops between the model and tools, accumulating a
//!   `Transcript`, until the model emits a final commit message.

mod agent;
mod config;
mod error;
mod llm;
mod message;
mod prompt;
mod tool;
mod tools;
mod transcript;

pub use agent::Agent;
pub use config::Config;
pub use error::{CommitgenError, Result};
pub use llm::{GeminiClient, LanguageModel, ModelResponse, StubModel};
pub use message::{Role, ToolCall, ToolOutput, Turn, TurnContent};
pub use prompt::DEFAULT_INSTRUCTION;
pub use tool::{declarations, ToolDeclaration, ToolKind, Toolbox};
pub use transcript::Transcript;
