//! Direct structured-fetch tier: GET the page, strip chrome, read the main region.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use tracing::debug;

use contentgate_shared::{ContentGateError, Result};
use contentgate_text::normalize;

use super::html::main_content_text;
use super::{ExtractionAttempt, FetchStrategy, StrategyKind, ensure_markup, read_ok_body};

pub struct DirectStrategy {
    client: Client,
    timeout: Duration,
}

impl DirectStrategy {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl FetchStrategy for DirectStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Direct
    }

    async fn fetch(&self, attempt: &ExtractionAttempt) -> Result<String> {
        debug!(url = %attempt.url, "direct fetch");

        let response = self
            .client
            .get(attempt.url.as_str())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ContentGateError::Network(format!("{}: {e}", attempt.url)))?;

        ensure_markup(&response, &attempt.url)?;
        let body = read_ok_body(response, &attempt.url).await?;

        Ok(extract(&body))
    }
}

/// Parse and extract synchronously; `Html` must not live across an await.
fn extract(body: &str) -> String {
    let doc = Html::parse_document(body);
    normalize(&main_content_text(&doc))
}
