//! Remote rendering/extraction service tier.
//!
//! Sends `GET <endpoint>/<target-url>` with a bearer key and takes the
//! response body as already-extracted text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use contentgate_shared::{ContentGateError, Result};
use contentgate_text::{REMOTE_RENDER_LIMIT, normalize_with_limit};

use super::{ExtractionAttempt, FetchStrategy, StrategyKind, read_ok_body};

/// Highest-priority tier; only built when a render key is configured.
pub struct RemoteRenderStrategy {
    client: Client,
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl RemoteRenderStrategy {
    pub fn new(client: Client, endpoint: &str, api_key: &str, timeout: Duration) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout,
        }
    }

    /// The service URL for a target page.
    fn render_url(&self, target: &url::Url) -> String {
        format!("{}/{}", self.endpoint, target)
    }
}

#[async_trait]
impl FetchStrategy for RemoteRenderStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::PrimaryRemote
    }

    async fn fetch(&self, attempt: &ExtractionAttempt) -> Result<String> {
        let render_url = self.render_url(&attempt.url);
        debug!(url = %attempt.url, "requesting remote render");

        let response = self
            .client
            .get(&render_url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                ContentGateError::Network(format!("{}: render request failed: {e}", attempt.url))
            })?;

        let body = read_ok_body(response, &attempt.url).await?;
        Ok(normalize_with_limit(&body, REMOTE_RENDER_LIMIT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_url_embeds_target() {
        let strategy = RemoteRenderStrategy::new(
            Client::new(),
            "https://r.jina.ai/",
            "key",
            Duration::from_secs(30),
        );
        let target = url::Url::parse("https://example.com/a?b=1").unwrap();
        assert_eq!(
            strategy.render_url(&target),
            "https://r.jina.ai/https://example.com/a?b=1"
        );
    }
}
