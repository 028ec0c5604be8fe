//! Aggressive fallback tier: keep everything except scripts and styles.
//!
//! Volume over precision. Navigation text is kept, which is often enough to
//! clear the lower minimum when the main region is thin.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use tracing::debug;

use contentgate_shared::{ContentGateError, Result};
use contentgate_text::normalize;

use super::html::{FALLBACK_STRIP_TAGS, document_text};
use super::{ExtractionAttempt, FetchStrategy, StrategyKind, ensure_markup, read_ok_body};

pub struct FallbackStrategy {
    client: Client,
    timeout: Duration,
}

impl FallbackStrategy {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl FetchStrategy for FallbackStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Fallback
    }

    async fn fetch(&self, attempt: &ExtractionAttempt) -> Result<String> {
        debug!(url = %attempt.url, "fallback fetch");

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

fn extract(body: &str) -> String {
    let doc = Html::parse_document(body);
    normalize(&document_text(&doc, FALLBACK_STRIP_TAGS))
}
