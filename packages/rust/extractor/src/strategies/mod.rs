//! Fetch strategies and the ordered chain that tries them.
//!
//! Each strategy is one tier of the fallback chain. Tiers are tried in
//! priority order; a tier "misses" when its request fails or its cleaned
//! output does not clear the tier's minimum length, and the chain moves on.
//! Only exhaustion of every tier is reported to the caller.

mod direct;
mod fallback;
mod html;
mod remote;

use std::fmt;
use std::sync::LazyLock;

use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue};
use regex::bytes::Regex;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use contentgate_shared::{ContentGateError, ExtractorConfig, Result};
use contentgate_text::char_count;

pub use direct::DirectStrategy;
pub use fallback::FallbackStrategy;
pub use remote::RemoteRenderStrategy;

pub(crate) const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

// ---------------------------------------------------------------------------
// StrategyKind
// ---------------------------------------------------------------------------

/// The tiers of the fallback chain, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Remote rendering/extraction service (needs a credential).
    PrimaryRemote,
    /// Direct GET with structured main-content extraction.
    Direct,
    /// Direct GET keeping everything but scripts and styles.
    Fallback,
}

impl StrategyKind {
    /// All tiers in chain order.
    pub const ALL: [StrategyKind; 3] = [Self::PrimaryRemote, Self::Direct, Self::Fallback];

    /// Cleaned output must be strictly longer than this many characters.
    pub const fn min_length(self) -> usize {
        match self {
            Self::PrimaryRemote | Self::Direct => 100,
            Self::Fallback => 50,
        }
    }

    /// Stable lowercase name for logs and serialized output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PrimaryRemote => "primary_remote",
            Self::Direct => "direct",
            Self::Fallback => "fallback",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::PrimaryRemote => 0,
            Self::Direct => 1,
            Self::Fallback => 2,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ExtractionAttempt
// ---------------------------------------------------------------------------

/// One tier's attempt at one URL. Built fresh for every attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionAttempt {
    pub url: Url,
    pub strategy: StrategyKind,
    pub min_length_threshold: usize,
}

impl ExtractionAttempt {
    pub fn new(url: Url, strategy: StrategyKind) -> Self {
        Self {
            url,
            strategy,
            min_length_threshold: strategy.min_length(),
        }
    }

    /// Whether cleaned `content` clears this attempt's length bar.
    pub fn accepts(&self, content: &str) -> bool {
        char_count(content) > self.min_length_threshold
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A single tier of the fetch chain.
///
/// Implementations return normalized text; any `Err` is a miss for this tier only.
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    /// Which tier this is.
    fn kind(&self) -> StrategyKind;

    /// Fetch and clean the content for `attempt.url`.
    async fn fetch(&self, attempt: &ExtractionAttempt) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// Holds the configured strategies in priority order.
pub struct StrategyChain {
    strategies: Vec<Box<dyn FetchStrategy>>,
}

impl StrategyChain {
    /// Build the standard chain. The remote-render tier is included only
    /// when a render key is configured.
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        config.validate()?;
        let client = build_client(config)?;

        let mut strategies: Vec<Box<dyn FetchStrategy>> = Vec::with_capacity(3);
        if let Some(key) = &config.render_api_key {
            strategies.push(Box::new(RemoteRenderStrategy::new(
                client.clone(),
                &config.render_endpoint,
                key,
                config.remote_timeout,
            )));
        }
        strategies.push(Box::new(DirectStrategy::new(
            client.clone(),
            config.direct_timeout,
        )));
        strategies.push(Box::new(FallbackStrategy::new(
            client,
            config.fallback_timeout,
        )));

        Ok(Self { strategies })
    }

    /// Build a chain from explicit strategies, tried in the given order.
    pub fn from_strategies(strategies: Vec<Box<dyn FetchStrategy>>) -> Self {
        Self { strategies }
    }

    /// Tiers in the order they will be tried.
    pub fn kinds(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    /// Whether the remote-render tier is part of this chain.
    pub fn has_remote_render(&self) -> bool {
        self.strategies
            .iter()
            .any(|s| s.kind() == StrategyKind::PrimaryRemote)
    }

    /// Try each tier until one qualifies. `None` means every tier missed.
    pub async fn run(&self, url: &Url) -> Option<(String, StrategyKind)> {
        for strategy in &self.strategies {
            let kind = strategy.kind();
            let attempt = ExtractionAttempt::new(url.clone(), kind);

            match strategy.fetch(&attempt).await {
                Ok(content) if attempt.accepts(&content) => {
                    info!(%url, strategy = %kind, chars = char_count(&content), "tier succeeded");
                    return Some((content, kind));
                }
                Ok(content) => {
                    debug!(
                        %url,
                        strategy = %kind,
                        chars = char_count(&content),
                        min = attempt.min_length_threshold,
                        "content below tier minimum, trying next tier"
                    );
                }
                Err(e) => {
                    warn!(%url, strategy = %kind, error = %e, "tier failed, trying next tier");
                }
            }
        }

        None
    }
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Build the shared HTTP client with browser-like default headers.
pub(crate) fn build_client(config: &ExtractorConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_str(&config.accept_language).map_err(|e| {
            ContentGateError::config(format!("invalid accept_language header: {e}"))
        })?,
    );
    headers.insert(HeaderName::from_static("dnt"), HeaderValue::from_static("1"));

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| ContentGateError::Network(format!("failed to build HTTP client: {e}")))
}

/// How far into the body a `<meta charset>` declaration is looked for.
const CHARSET_SNIFF_BYTES: usize = 1024;

static META_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]*charset\s*=\s*["']?([a-z0-9_.:\-]+)"#).expect("valid regex")
});

/// Require HTTP 200 and decode the body.
///
/// Charset comes from the `Content-Type` header, else from a `<meta>`
/// declaration near the top of the document, else UTF-8.
pub(crate) async fn read_ok_body(response: Response, url: &Url) -> Result<String> {
    let status = response.status();
    if status != StatusCode::OK {
        return Err(ContentGateError::Network(format!("{url}: HTTP {status}")));
    }

    let header_charset = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(charset_param)
        .map(str::to_string);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ContentGateError::Network(format!("{url}: body read failed: {e}")))?;

    Ok(decode_body(&bytes, header_charset.as_deref()))
}

/// `charset` parameter of a `Content-Type` value.
fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

fn decode_body(bytes: &[u8], header_charset: Option<&str>) -> String {
    let encoding = header_charset
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .or_else(|| sniff_meta_charset(bytes))
        .unwrap_or(UTF_8);

    // A byte-order mark still wins over both declarations.
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!(encoding = used.name(), "body contained undecodable bytes");
    }
    text.into_owned()
}

fn sniff_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(CHARSET_SNIFF_BYTES)];
    let label = META_CHARSET_RE.captures(head)?.get(1)?;
    Encoding::for_label(label.as_bytes())
}

/// Reject bodies that are clearly not markup before handing them to the parser.
pub(crate) fn ensure_markup(response: &Response, url: &Url) -> Result<()> {
    let Some(content_type) = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return Ok(());
    };

    let mime = content_type.to_ascii_lowercase();
    let binary = ["image/", "audio/", "video/", "font/"]
        .iter()
        .any(|p| mime.starts_with(p))
        || mime.starts_with("application/pdf")
        || mime.starts_with("application/octet-stream")
        || mime.starts_with("application/zip");

    if binary {
        return Err(ContentGateError::parse(format!(
            "{url}: cannot extract text from {content_type}"
        )));
    }
    Ok(())
}
