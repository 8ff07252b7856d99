use crate::models::Payload;
use html_escape::decode_html_entities;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

// ── Embedded room payload ─────────────────────────────────────────────────────

static PAYLOAD_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"prop-initial-display-rooms\s*=\s*"([^"]+)""#).expect("payload regex")
});

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("prop-initial-display-rooms not found in page")]
    MarkerNotFound,

    #[error("malformed room payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

/// Pull the `prop-initial-display-rooms` attribute out of the page,
/// unescape it and parse it as the room payload.
pub fn extract_payload(html: &str) -> Result<Payload, ExtractError> {
    let raw = PAYLOAD_ATTR
        .captures(html)
        .and_then(|c| c.get(1))
        .ok_or(ExtractError::MarkerNotFound)?;

    let json = decode_html_entities(raw.as_str());
    Ok(serde_json::from_str(&json)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
