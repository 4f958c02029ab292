use std::path::PathBuf;

use serde_json::{json, Value};

use crate::error::CommitgenError;
use crate::tools;

/// The closed set of tools the model may call. Dispatch is by variant, not
/// by string comparison; adding a tool means extending this enum and the
/// match arms below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    ListFiles,
    ReadFile,
    Diff,
}

impl ToolKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "list_files" => Some(Self::ListFiles),
            "read_file" => Some(Self::ReadFile),
            "diff" => Some(Self::Diff),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::ListFiles => "list_files",
            Self::ReadFile => "read_file",
            Self::Diff => "diff",
        }
    }
}

/// Static metadata advertised to the model for one tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// The declaration set is fixed for the process lifetime; build it once at
/// agent construction and reuse it on every model call.
pub fn declarations() -> Vec<ToolDeclaration> {
    vec![
        ToolDeclaration {
            name: ToolKind::ListFiles.name().into(),
            description:
                "List regular files in the current working directory. Lists only files, not directories."
                    .into(),
            parameters: json!({
                "type": "object",
                "properties": {}
            }),
        },
        ToolDeclaration {
            name: ToolKind::ReadFile.name().into(),
            description:
                "Read the full contents of the named file. The contents may contain newline characters."
                    .into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "File name relative to the working directory"
                    }
                },
                "required": ["name"]
            }),
        },
        ToolDeclaration {
            name: ToolKind::Diff.name().into(),
            description: "Return the output of `hg diff --git` for the working directory.".into(),
            parameters: json!({
                "type": "object",
                "properties": {}
            }),
        },
    ]
}

/// Executes tool calls against one working directory.
///
/// Every dispatch resolves to a string payload. Tool-level failures (missing
/// file, absent `hg` binary) are folded into the payload so the model can see
/// them and recover; they never abort the agent loop.
#[derive(Debug, Clone)]
pub struct Toolbox {
    workdir: PathBuf,
}

impl Default for Toolbox {
    fn default() -> Self {
        Self {
            workdir: PathBuf::from("."),
        }
    }
}

impl Toolbox {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub async fn dispatch(&self, kind: ToolKind, arguments: &Value) -> String {
        let outcome = match kind {
            ToolKind::ListFiles => tools::fs::list_files(&self.workdir).await,
            ToolKind::ReadFile => match arguments.get("name").and_then(Value::as_str) {
                Some(name) => tools::fs::read_file(&self.workdir, name).await,
                None => Err(CommitgenError::ToolInvocation {
                    name: ToolKind::ReadFile.name().into(),
                    source: "missing `name` argument".into(),
                }),
            },
            ToolKind::Diff => return tools::hg::diff(&self.workdir).await,
        };

        match outcome {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(tool = kind.name(), error = %err, "tool call failed");
                format!("error: {err}")
            }
        }
    }
}
