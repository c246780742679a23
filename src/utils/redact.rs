//! Helpers for keeping credentials and oversized upstream bodies out of logs
//! and error messages.

const VISIBLE_PREFIX: usize = 6;
const MAX_BODY_CHARS: usize = 200;

/// Mask a secret down to a short prefix, e.g. `sk-or-...(32 chars)`.
/// Short secrets are hidden entirely.
pub fn mask_secret(secret: &str) -> String {
    let len = secret.chars().count();
    if len <= VISIBLE_PREFIX * 2 {
        return "***".to_string();
    }
    let prefix: String = secret.chars().take(VISIBLE_PREFIX).collect();
    format!("{}...({} chars)", prefix, len)
}

/// Replace every occurrence of `secret` in `text` with its masked form.
pub fn redact_secret(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        return text.to_string();
    }
    text.replace(secret, &mask_secret(secret))
}

/// Truncate an upstream error body on a char boundary.
pub fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_BODY_CHARS) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

/// Sanitize an upstream error body before it reaches a log line or a client.
pub fn sanitize_body(body: &str, secret: &str) -> String {
    truncate_body(&redact_secret(body, secret))
}
