//! Link helpers for the safe-link confirmation flow.

const SCHEME_ONLY_PREFIXES: &[&str] = &["mailto:", "tg:", "tel:"];

/// Make a user-visible URL openable: keep it when it already names a scheme,
/// otherwise assume `https://`. Blank input yields `None`.
pub fn ensure_protocol(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    let lower = url.to_lowercase();
    if lower.contains("://")
        || SCHEME_ONLY_PREFIXES
            .iter()
            .any(|prefix| lower.starts_with(prefix))
    {
        return Some(url.to_string());
    }

    Some(format!("https://{}", url))
}
