//! External tool invocation (ffprobe / ffmpeg)
//!
//! Payloads are written to a temporary file, the tool is run with an explicit argument
//! list (never through a shell), and stdout is returned on success.

use std::path::Path;
use std::process::Stdio;

use bytes::Bytes;
use tempfile::NamedTempFile;
use tokio::process::Command;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid tool path: {0}")]
    InvalidPath(String),

    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} failed: {stderr}")]
    Failed { tool: String, stderr: String },

    #[error("{tool} produced no JPEG frame")]
    NoFrame { tool: String },

    #[error("Failed to stage payload for {tool}: {source}")]
    Staging {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

/// Validate that a tool path doesn't contain shell metacharacters or traversal
pub fn validate_tool_path(path: &str) -> Result<(), ToolError> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.is_empty() || path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(ToolError::InvalidPath(path.to_string()));
    }

    if path.contains("..") {
        return Err(ToolError::InvalidPath(path.to_string()));
    }

    if !path
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '/' | '-' | '_' | '.' | '\\' | ':' | ' '))
    {
        return Err(ToolError::InvalidPath(path.to_string()));
    }

    Ok(())
}

/// Write a payload to a temporary file the tool can read. The file is removed when the
/// returned handle is dropped.
pub async fn stage_payload(tool: &str, data: &Bytes) -> Result<NamedTempFile, ToolError> {
    let staging = |source| ToolError::Staging {
        tool: tool.to_string(),
        source,
    };
    let temp_file = NamedTempFile::new().map_err(staging)?;
    tokio::fs::write(temp_file.path(), data)
        .await
        .map_err(staging)?;
    Ok(temp_file)
}

/// Run `program leading.. input trailing..` and collect stdout.
pub async fn run_tool(
    program: &str,
    leading: &[&str],
    input: &Path,
    trailing: &[&str],
) -> Result<Vec<u8>, ToolError> {
    let output = Command::new(program)
        .args(leading)
        .arg(input)
        .args(trailing)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|source| ToolError::Spawn {
            tool: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        tracing::debug!(tool = program, stderr = %stderr, "Tool exited with failure");
        return Err(ToolError::Failed {
            tool: program.to_string(),
            stderr,
        });
    }

    Ok(output.stdout)
}

/// Accept tool stdout only if it starts with a JPEG SOI marker
pub fn ensure_jpeg(tool: &str, stdout: Vec<u8>) -> Result<Bytes, ToolError> {
    if !stdout.starts_with(&[0xFF, 0xD8]) {
        return Err(ToolError::NoFrame {
            tool: tool.to_string(),
        });
    }
    Ok(Bytes::from(stdout))
}
