//! Filename helpers: extension to content type mapping and extension rewriting

use std::path::Path;

fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

fn content_types_for_extension(extension: &str) -> &'static [&'static str] {
    match extension {
        // Images
        "jpg" | "jpeg" => &["image/jpeg"],
        "png" => &["image/png"],
        "gif" => &["image/gif"],
        "webp" => &["image/webp"],
        "avif" => &["image/avif"],
        "svg" => &["image/svg+xml"],
        "bmp" => &["image/bmp"],
        "ico" => &["image/x-icon", "image/vnd.microsoft.icon"],
        // Videos
        "mp4" => &["video/mp4"],
        "webm" => &["video/webm"],
        "mov" => &["video/quicktime"],
        "avi" => &["video/x-msvideo"],
        "mkv" => &["video/x-matroska"],
        "m4v" => &["video/x-m4v"],
        // Audio
        "mp3" => &["audio/mpeg", "audio/mp3"],
        "wav" => &["audio/wav", "audio/wave", "audio/x-wav"],
        "ogg" | "oga" | "opus" => &["audio/ogg", "application/ogg"],
        "m4a" => &["audio/mp4", "audio/x-m4a"],
        "flac" => &["audio/flac"],
        "aac" => &["audio/aac"],
        // Documents
        "pdf" => &["application/pdf"],
        "doc" => &["application/msword"],
        "docx" => &["application/vnd.openxmlformats-officedocument.wordprocessingml.document"],
        "xls" => &["application/vnd.ms-excel"],
        "xlsx" => &["application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"],
        "txt" => &["text/plain"],
        "csv" => &["text/csv"],
        "zip" => &["application/zip"],
        "gz" => &["application/gzip"],
        _ => &[],
    }
}

/// Content type a file with this name most likely has
pub fn content_type_for_filename(filename: &str) -> Option<&'static str> {
    let extension = extension_of(filename)?;
    content_types_for_extension(&extension).first().copied()
}

/// Canonical file extension for a content type
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    match attachkit_core::config::normalize_mime(content_type).as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "video/mp4" => Some("mp4"),
        "video/webm" => Some("webm"),
        "video/quicktime" => Some("mov"),
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "audio/ogg" => Some("ogg"),
        _ => None,
    }
}

/// Whether `content_type` is plausible for the file's extension. Unknown extensions
/// are not cross-checked.
pub fn content_type_matches_filename(filename: &str, content_type: &str) -> bool {
    let Some(extension) = extension_of(filename) else {
        return true;
    };
    let expected = content_types_for_extension(&extension);
    if expected.is_empty() {
        tracing::debug!(
            extension = %extension,
            content_type = %content_type,
            "Unknown extension, skipping content type cross-check"
        );
        return true;
    }

    let normalized = attachkit_core::config::normalize_mime(content_type);
    expected.iter().any(|ct| *ct == normalized)
}

/// Replace the trailing `.ext` of `filename` with `.{extension}`.
///
/// Only a non-empty final dot-suffix without `/` counts as an extension. Names
/// without one are returned unchanged.
pub fn replace_extension(filename: &str, extension: &str) -> String {
    match filename.rfind('.') {
        Some(dot) if dot + 1 < filename.len() && !filename[dot + 1..].contains('/') => {
            format!("{}.{}", &filename[..dot], extension)
        }
        _ => filename.to_string(),
    }
}
