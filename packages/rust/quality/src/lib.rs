//! Content quality scoring for extracted text.
//!
//! This crate provides:
//! - [`rubric`] — the declarative scoring tables, one per factor
//! - [`report`] — [`QualityReport`], [`QualityLevel`], [`BatchQualitySummary`]
//! - [`validator`] — [`QualityValidator`], single and batch validation plus summaries
//!
//! Scoring is a pure function of `(content, url)` and the validator's config.

pub mod report;
pub mod rubric;
pub mod validator;

pub use report::{BatchQualitySummary, QualityLevel, QualityReport};
pub use validator::QualityValidator;
