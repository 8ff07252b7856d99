//! Push notifications through the LINE broadcast API.

use crate::config::NotifierConfig;
use crate::scraper::http_client::HttpClient;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

// ── Broadcaster trait ─────────────────────────────────────────────────────────

/// Sends one text message to every subscriber.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn broadcast(&self, text: &str) -> Result<()>;
}

/// `<header><target_date>` / rooms joined by ` / ` / page url
pub fn compose_message(header: &str, target_date: &str, rooms: &[String], url: &str) -> String {
    format!("{}{}\n{}\n{}", header, target_date, rooms.join(" / "), url)
}

// ── LINE ──────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct BroadcastRequest<'a> {
    messages: [TextMessage<'a>; 1],
}

#[derive(Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

pub struct LineBroadcaster {
    client: HttpClient,
    endpoint: String,
    token: Option<String>,
}

impl LineBroadcaster {
    pub fn new(config: &NotifierConfig) -> Result<Self> {
        let user_agent = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
        Ok(Self {
            client: HttpClient::new(user_agent, Duration::from_secs(config.timeout_secs))?,
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
        })
    }
}

#[async_trait]
impl Broadcaster for LineBroadcaster {
    async fn broadcast(&self, text: &str) -> Result<()> {
        let token = self
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .context("LINE_TOKEN is not set")?;

        let body = BroadcastRequest {
            messages: [TextMessage { kind: "text", text }],
        };

        self.client
            .post_json(&self.endpoint, token, &body)
            .await
            .context("LINE broadcast failed")?;

        info!("Broadcast sent ({} chars)", text.chars().count());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(endpoint: String, token: Option<&str>) -> NotifierConfig {
        NotifierConfig {
            endpoint,
            token: token.map(String::from),
            ..NotifierConfig::default()
        }
    }

    #[test]
    fn test_compose_message() {
        let msg = compose_message(
            "【空き発見】",
            "2025-09-21",
            &["Room A".to_string(), "Room B".to_string()],
            "https://example.com/plan?adult=4",
        );
        assert_eq!(
            msg,
            "【空き発見】2025-09-21\nRoom A / Room B\nhttps://example.com/plan?adult=4"
        );
    }

    #[tokio::test]
    async fn test_broadcast_body_and_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/bot/message/broadcast"))
            .and(header("authorization", "Bearer line-token"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"messages": [{"type": "text", "text": "hello"}]})))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let line = LineBroadcaster::new(&config(
            format!("{}/v2/bot/message/broadcast", server.uri()),
            Some("line-token"),
        ))
        .unwrap();
        line.broadcast("hello").await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_token_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        for token in [None, Some("")] {
            let line = LineBroadcaster::new(&config(server.uri(), token)).unwrap();
            let err = line.broadcast("hello").await.unwrap_err();
            assert!(err.to_string().contains("LINE_TOKEN"));
        }
    }
}
