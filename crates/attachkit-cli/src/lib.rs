use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use attachkit_core::{Attachment, AttachmentInput, AttachmentOptions, ErrorMetadata};
use attachkit_processing::{
    content_type_for_filename, content_type_matches_filename, AttachmentBuilder,
};
use serde::Serialize;

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// One line of the `build` table output
#[derive(Debug, Serialize, PartialEq)]
pub struct AttachmentRow {
    pub filename: String,
    pub kind: &'static str,
    pub size_kb: f64,
    pub dimensions: String,
    pub send_as_file: bool,
    pub compressed: bool,
}

impl AttachmentRow {
    pub fn from_attachment(attachment: &Attachment) -> Self {
        let dimensions = match (attachment.quick(), attachment.audio()) {
            (Some(quick), _) => match quick.duration {
                Some(duration) => format!("{}x{} {:.1}s", quick.width, quick.height, duration),
                None => format!("{}x{}", quick.width, quick.height),
            },
            (None, Some(audio)) => format!("{:.1}s", audio.duration),
            (None, None) => "-".to_string(),
        };

        Self {
            filename: attachment.filename.clone(),
            kind: attachment.media.kind(),
            size_kb: attachment.size_bytes as f64 / 1024.0,
            dimensions,
            send_as_file: attachment.should_send_as_file,
            compressed: attachment.compressed_ref.is_some(),
        }
    }
}

pub fn print_attachment_table(attachments: &[Attachment]) {
    println!(
        "{:<32} {:<6} {:>10} {:<18} {:<5} {:<10}",
        "FILENAME", "KIND", "SIZE (KB)", "QUICK", "FILE", "COMPRESSED"
    );
    for attachment in attachments {
        let row = AttachmentRow::from_attachment(attachment);
        println!(
            "{:<32} {:<6} {:>10.1} {:<18} {:<5} {:<10}",
            truncate_string(&row.filename, 32),
            row.kind,
            row.size_kb,
            row.dimensions,
            if row.send_as_file { "yes" } else { "no" },
            if row.compressed { "yes" } else { "no" },
        );
    }
}

fn mime_type_for(path: &Path, filename: &str, mime: Option<&str>) -> String {
    match mime {
        Some(mime) => {
            if !content_type_matches_filename(filename, mime) {
                tracing::warn!(
                    path = %path.display(),
                    mime_type = mime,
                    "Mime type does not match the file extension"
                );
            }
            mime.to_string()
        }
        None => content_type_for_filename(filename)
            .unwrap_or(FALLBACK_MIME_TYPE)
            .to_string(),
    }
}

/// Read a file from disk into a build input.
pub async fn read_input(
    path: &Path,
    mime: Option<&str>,
    options: &AttachmentOptions,
) -> anyhow::Result<AttachmentInput> {
    let payload = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("Not a file path: {}", path.display()))?;
    let mime_type = mime_type_for(path, &filename, mime);

    Ok(AttachmentInput::new(filename, mime_type, payload).with_options(options.clone()))
}

/// A file that did not produce an attachment
#[derive(Debug)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub attachments: Vec<Attachment>,
    pub failures: Vec<BatchFailure>,
}

/// Build every file concurrently. A file that cannot be read or built is recorded as a
/// failure and the rest of the batch carries on.
pub async fn build_batch(
    builder: Arc<AttachmentBuilder>,
    files: Vec<PathBuf>,
    mime: Option<&str>,
    options: &AttachmentOptions,
) -> anyhow::Result<BatchOutcome> {
    let mut outcome = BatchOutcome::default();
    let mut tasks = Vec::with_capacity(files.len());

    for path in files {
        let input = match read_input(&path, mime, options).await {
            Ok(input) => input,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable file");
                outcome.failures.push(BatchFailure {
                    path,
                    message: format!("{:#}", e),
                });
                continue;
            }
        };
        let builder = builder.clone();
        tasks.push((path, tokio::spawn(async move { builder.build(input).await })));
    }

    for (path, task) in tasks {
        match task.await.context("Build task panicked")? {
            Ok(attachment) => outcome.attachments.push(attachment),
            Err(e) => {
                let message = format!(
                    "{} [{}]{}",
                    e.client_message(),
                    e.error_code(),
                    e.suggested_action()
                        .map(|action| format!(" - {}", action))
                        .unwrap_or_default()
                );
                outcome.failures.push(BatchFailure { path, message });
            }
        }
    }

    Ok(outcome)
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
