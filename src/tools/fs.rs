//! Filesystem tools: list files in the working directory, read one file.

use std::path::Path;

use tokio::fs;

use crate::error::{CommitgenError, Result};

/// Names of regular files (not directories) directly under `dir`, as a JSON
/// array. Sorted lexicographically so repeated calls are deterministic.
pub async fn list_files(dir: &Path) -> Result<String> {
    let mut entries = fs::read_dir(dir).await.map_err(|err| io_error("list_files", err))?;
    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|err| io_error("list_files", err))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|err| io_error("list_files", err))?;
        if file_type.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(serde_json::to_string(&names)?)
}

/// Full contents of the named file under `dir`.
pub async fn read_file(dir: &Path, name: &str) -> Result<String> {
    fs::read_to_string(dir.join(name))
        .await
        .map_err(|err| io_error("read_file", err))
}

fn io_error(tool: &str, err: std::io::Error) -> CommitgenError {
    CommitgenError::ToolInvocation {
        name: tool.into(),
        source: Box::new(err),
    }
}
