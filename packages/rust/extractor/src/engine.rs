//! Single-URL extraction and bounded concurrent batch extraction.
//!
//! The [`Extractor`] runs the [`StrategyChain`] for each URL, keeps
//! cumulative [`ExtractionStats`], and fans batches out over tokio tasks
//! bounded by a semaphore.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, instrument, warn};
use url::Url;

use contentgate_shared::{ContentGateError, ExtractorConfig, Result};

use crate::stats::{ExtractionStats, StatsSnapshot};
use crate::strategies::{StrategyChain, StrategyKind};

// ---------------------------------------------------------------------------
// ExtractionOutcome
// ---------------------------------------------------------------------------

/// Result of extracting one URL. Exactly one per URL per batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub url: String,
    /// Cleaned text; `None` on total failure.
    pub content: Option<String>,
    /// Tier that produced `content`.
    pub strategy_used: Option<StrategyKind>,
    pub success: bool,
}

impl ExtractionOutcome {
    fn succeeded(url: &str, content: String, strategy: StrategyKind) -> Self {
        Self {
            url: url.to_string(),
            content: Some(content),
            strategy_used: Some(strategy),
            success: true,
        }
    }

    fn failed(url: &str) -> Self {
        Self {
            url: url.to_string(),
            content: None,
            strategy_used: None,
            success: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Observer for batch extraction progress.
pub trait BatchProgress: Send + Sync {
    /// Called once per distinct URL as its extraction finishes.
    fn url_finished(&self, url: &str, success: bool, done: usize, total: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl BatchProgress for SilentProgress {
    fn url_finished(&self, _url: &str, _success: bool, _done: usize, _total: usize) {}
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

/// Content extractor: strategy chain plus cumulative statistics.
///
/// Cloning is cheap and clones share the same chain and counters.
#[derive(Clone)]
pub struct Extractor {
    chain: Arc<StrategyChain>,
    stats: Arc<ExtractionStats>,
    concurrency: usize,
}

impl Extractor {
    /// Create an extractor with the standard strategy chain.
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        let chain = StrategyChain::new(config)?;
        info!(
            remote_render = chain.has_remote_render(),
            concurrency = config.concurrency,
            "content extractor ready"
        );
        Ok(Self::with_chain(chain, config.concurrency))
    }

    /// Create an extractor around an explicit chain.
    pub fn with_chain(chain: StrategyChain, concurrency: usize) -> Self {
        Self {
            chain: Arc::new(chain),
            stats: Arc::new(ExtractionStats::new()),
            concurrency: concurrency.max(1),
        }
    }

    /// Default batch width.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Extract one URL, returning its cleaned text or `None`.
    pub async fn extract_one(&self, url: &str) -> Option<String> {
        self.extract_outcome(url).await.content
    }

    /// Extract one URL, returning the full outcome record.
    ///
    /// Never fails: invalid URLs and exhausted chains both come back as an
    /// unsuccessful outcome and count as one failed attempt.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn extract_outcome(&self, url: &str) -> ExtractionOutcome {
        self.stats.record_attempt();

        let parsed = match parse_http_url(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "rejecting URL before fetch");
                self.stats.record_failure();
                return ExtractionOutcome::failed(url);
            }
        };

        match self.chain.run(&parsed).await {
            Some((content, strategy)) => {
                self.stats.record_success(strategy);
                ExtractionOutcome::succeeded(url, content, strategy)
            }
            None => {
                warn!("all strategies exhausted");
                self.stats.record_failure();
                ExtractionOutcome::failed(url)
            }
        }
    }

    /// Extract many URLs with at most `concurrency` in flight.
    ///
    /// The returned map has exactly one entry per distinct input URL.
    pub async fn extract_batch(
        &self,
        urls: &[String],
        concurrency: usize,
    ) -> HashMap<String, Option<String>> {
        self.extract_batch_outcomes(urls, concurrency, &SilentProgress)
            .await
            .into_iter()
            .map(|(url, outcome)| (url, outcome.content))
            .collect()
    }

    /// Batch variant returning full outcomes and reporting progress.
    #[instrument(skip_all, fields(urls = urls.len(), concurrency = concurrency))]
    pub async fn extract_batch_outcomes(
        &self,
        urls: &[String],
        concurrency: usize,
        progress: &dyn BatchProgress,
    ) -> HashMap<String, ExtractionOutcome> {
        let mut seen = HashSet::new();
        let distinct: Vec<String> = urls
            .iter()
            .filter(|url| seen.insert(url.as_str()))
            .cloned()
            .collect();
        let total = distinct.len();

        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for url in &distinct {
            let extractor = self.clone();
            let sem = Arc::clone(&semaphore);
            let url = url.clone();

            tasks.spawn(async move {
                let _permit = sem.acquire_owned().await.expect("semaphore closed");
                let outcome = extractor.extract_outcome(&url).await;
                (url, outcome)
            });
        }

        let mut results: HashMap<String, ExtractionOutcome> = HashMap::with_capacity(total);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((url, outcome)) => {
                    progress.url_finished(&url, outcome.success, results.len() + 1, total);
                    results.insert(url, outcome);
                }
                Err(e) => warn!(error = %e, "extraction task failed"),
            }
        }

        // A task that died never reported back; its URL still gets an entry
        // and its already-counted attempt is closed as a failure.
        for url in distinct {
            if let Entry::Vacant(slot) = results.entry(url) {
                self.stats.record_failure();
                let outcome = ExtractionOutcome::failed(slot.key());
                slot.insert(outcome);
            }
        }

        let succeeded = results.values().filter(|o| o.success).count();
        info!(total, succeeded, failed = total - succeeded, "batch extraction completed");

        results
    }

    /// Snapshot of the cumulative counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.chain.has_remote_render())
    }

    /// Zero the cumulative counters.
    pub fn reset_stats(&self) {
        self.stats.reset();
        info!("extraction stats reset");
    }

    /// Nothing is cached; kept so callers can treat extractors uniformly.
    pub fn clear_cache(&self) -> bool {
        info!("cache cleared");
        true
    }
}

/// Accept only absolute `http://` / `https://` URLs.
pub fn parse_http_url(url: &str) -> Result<Url> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ContentGateError::invalid_url(url, "only http and https URLs are supported"));
    }
    Url::parse(url).map_err(|e| ContentGateError::invalid_url(url, e.to_string()))
}
