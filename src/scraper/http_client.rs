use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Longest slice of an error body kept in the error message.
const ERROR_BODY_SNIPPET: usize = 200;

pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            // Accept cookies so session-based pages work
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { inner })
    }

    /// Fetch a URL as text. Any non-2xx status is an error; there is no retry.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);

        let resp = self
            .inner
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let status = resp.status();
        if !status.is_success() {
            bail!("HTTP error {} from GET {}", status, url);
        }

        resp.text().await.context("Failed to read response body")
    }

    /// POST a JSON body with a bearer token. Any non-2xx status is an error.
    pub async fn post_json<T>(&self, url: &str, token: &str, body: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        debug!("POST {}", url);

        let resp = self
            .inner
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let snippet: String = text.chars().take(ERROR_BODY_SNIPPET).collect();
            bail!("HTTP error {} from POST {}: {}", status, url, snippet);
        }

        Ok(())
    }
}
