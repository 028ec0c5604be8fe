//! Tiered content extraction for caller-supplied URLs.
//!
//! This crate provides:
//! - [`strategies`] — the fetch tiers (remote render, direct, fallback) and [`StrategyChain`]
//! - [`engine`] — [`Extractor`], single-URL and bounded concurrent batch extraction
//! - [`stats`] — cumulative [`ExtractionStats`] shared across batch tasks

pub mod engine;
pub mod stats;
pub mod strategies;

pub use engine::{BatchProgress, ExtractionOutcome, Extractor, SilentProgress, parse_http_url};
pub use stats::{ExtractionStats, StatsSnapshot};
pub use strategies::{
    DirectStrategy, ExtractionAttempt, FallbackStrategy, FetchStrategy, RemoteRenderStrategy,
    StrategyChain, StrategyKind,
};
